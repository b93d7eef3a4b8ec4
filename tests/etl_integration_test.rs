use anyhow::Result;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use retail_etl::config::{DatabaseConfig, EtlConfig, LoadMode, SourcesConfig};
use retail_etl::pipeline::ingestion::csv_source::read_csv;
use retail_etl::pipeline::processing::normalize::normalize_records;
use retail_etl::{run_etl, TableName, Value};

const CUSTOMERS: &str = "\
customer_id,name,email,gender,signup_date,dob
1,Asha,  USER@X.COM ,Unknown, 1990-05-02 ,02/05/1990
 2 ,Ben,ben@y.com,,not-a-date,
3,Cara,nan,Female,15/03/2021,1988-12-01
";

const ORDERS: &str = "\
order_id,customer_id,order_date,order_status,payment_method,total_amount
101,1,05/01/2024,,COD,250.5
102,2,2024-01-07,,,
103,3,bad-date,Shipped,Card,99
104,C-9,2024-02-01,Delivered,UPI,10
";

const ORDER_ITEMS: &str = "\
order_item_id,order_id,product_id,quantity,price
1,101,P1,2,10.0
2,102,P2,,5.5
";

const REVIEWS: &str = "\
review_id,order_id,customer_id,product_id,rating,review_text,review_date
R1,101,1,P1,5,Great,2024-01-10
R2,102,2,P2,N/A,,11/01/2024
R3,103,3,P1,,ok,
";

/// Writes every fixture except products, which is left missing on purpose.
fn write_fixtures(dir: &Path) -> Result<()> {
    fs::write(dir.join("customers.csv"), CUSTOMERS)?;
    fs::write(dir.join("orders.csv"), ORDERS)?;
    fs::write(dir.join("order_items.csv"), ORDER_ITEMS)?;
    fs::write(dir.join("reviews.csv"), REVIEWS)?;
    Ok(())
}

fn config_for(dir: &Path, load_mode: LoadMode) -> EtlConfig {
    EtlConfig {
        database: DatabaseConfig {
            path: dir.join("retail.db"),
            load_mode,
        },
        sources: SourcesConfig {
            data_dir: dir.to_path_buf(),
            ..SourcesConfig::default()
        },
        ..EtlConfig::default()
    }
}

fn text(conn: &Connection, sql: &str) -> Result<Option<String>> {
    Ok(conn.query_row(sql, [], |r| r.get(0))?)
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [], |r| r.get(0))?)
}

#[test]
fn full_run_loads_cleaned_tables_and_skips_the_broken_one() -> Result<()> {
    let dir = tempdir()?;
    write_fixtures(dir.path())?;
    let config = config_for(dir.path(), LoadMode::Replace);

    let summary = run_etl(&config, &TableName::ALL)?;

    assert_eq!(summary.tables.len(), 5);
    let failed: Vec<TableName> = summary.failed().map(|t| t.table).collect();
    assert_eq!(failed, vec![TableName::Products]);
    assert_eq!(summary.outcome(TableName::Orders).unwrap().rows_written, Some(4));

    let conn = Connection::open(&config.database.path)?;
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'products'")?,
        0
    );

    // Orders
    let status = |id: i64| -> Result<(String, String)> {
        Ok(conn.query_row(
            "SELECT order_status, payment_method FROM orders WHERE order_id = ?1",
            [id.to_string()],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?)
    };
    assert_eq!(status(101)?, ("Shipped".into(), "COD".into()));
    assert_eq!(status(102)?, ("Pending".into(), "Unknown".into()));
    assert_eq!(status(103)?, ("Shipped".into(), "COD".into()));
    assert_eq!(status(104)?, ("Delivered".into(), "UPI".into()));
    assert_eq!(
        text(&conn, "SELECT order_date FROM orders WHERE order_id = '101'")?.as_deref(),
        Some("2024-01-05")
    );
    assert_eq!(text(&conn, "SELECT order_date FROM orders WHERE order_id = '103'")?, None);
    let amount: f64 =
        conn.query_row("SELECT total_amount FROM orders WHERE order_id = '102'", [], |r| r.get(0))?;
    assert_eq!(amount, 0.0);

    // Customers
    assert_eq!(
        text(&conn, "SELECT email FROM customers WHERE customer_id = '1'")?.as_deref(),
        Some("user@x.com")
    );
    assert_eq!(text(&conn, "SELECT email FROM customers WHERE customer_id = '3'")?, None);
    assert_eq!(text(&conn, "SELECT gender FROM customers WHERE customer_id = '1'")?, None);
    assert_eq!(
        text(&conn, "SELECT signup_date FROM customers WHERE customer_id = '1'")?.as_deref(),
        Some("1990-05-02")
    );
    assert_eq!(text(&conn, "SELECT signup_date FROM customers WHERE customer_id = '2'")?, None);

    // Reviews
    assert_eq!(text(&conn, "SELECT rating FROM reviews WHERE review_id = 'R2'")?, None);
    assert_eq!(
        text(&conn, "SELECT review_text FROM reviews WHERE review_id = 'R2'")?.as_deref(),
        Some("")
    );
    let mean: f64 = conn.query_row("SELECT AVG(rating) FROM reviews", [], |r| r.get(0))?;
    assert_eq!(mean, 5.0);

    Ok(())
}

#[test]
fn id_columns_join_across_tables_as_bounded_text() -> Result<()> {
    let dir = tempdir()?;
    write_fixtures(dir.path())?;
    let config = config_for(dir.path(), LoadMode::Replace);
    run_etl(&config, &TableName::ALL)?;

    let conn = Connection::open(&config.database.path)?;
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM orders o JOIN customers c ON o.customer_id = c.customer_id")?,
        3
    );
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM order_items i JOIN orders o ON i.order_id = o.order_id")?,
        2
    );
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM order_items WHERE typeof(order_id) = 'text'")?,
        2
    );

    let declared = |table: &str, column: &str| -> Result<String> {
        Ok(conn.query_row(
            &format!("SELECT type FROM pragma_table_info('{}') WHERE name = ?1", table),
            [column],
            |r| r.get(0),
        )?)
    };
    assert_eq!(declared("customers", "customer_id")?, "VARCHAR(50)");
    assert_eq!(declared("orders", "order_id")?, "VARCHAR(50)");
    assert_eq!(declared("order_items", "order_item_id")?, "VARCHAR(50)");
    assert_eq!(declared("reviews", "review_id")?, "VARCHAR(50)");
    assert_eq!(declared("orders", "order_date")?, "DATE");
    Ok(())
}

#[test]
fn wide_numeric_ids_keep_every_digit_across_tables() -> Result<()> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("customers.csv"),
        "customer_id,name\n12345678901234567890,Asha\nC-1,Ben\n",
    )?;
    fs::write(
        dir.path().join("orders.csv"),
        "order_id,customer_id,order_status,payment_method\n1,12345678901234567890,Shipped,COD\n",
    )?;
    let config = config_for(dir.path(), LoadMode::Replace);

    let summary = run_etl(&config, &[TableName::Customers, TableName::Orders])?;
    assert_eq!(summary.failed().count(), 0);

    let conn = Connection::open(&config.database.path)?;
    assert_eq!(
        text(&conn, "SELECT customer_id FROM orders")?.as_deref(),
        Some("12345678901234567890")
    );
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM orders o JOIN customers c ON o.customer_id = c.customer_id")?,
        1
    );
    Ok(())
}

#[test]
fn rows_wider_than_the_header_fail_only_their_table() -> Result<()> {
    let dir = tempdir()?;
    write_fixtures(dir.path())?;
    fs::write(
        dir.path().join("order_items.csv"),
        "order_item_id,order_id,product_id,quantity,price\n1,101,P1,2,10.0,EXTRA\n",
    )?;
    let config = config_for(dir.path(), LoadMode::Replace);

    let summary = run_etl(&config, &[TableName::OrderItems, TableName::Orders])?;
    let failed: Vec<TableName> = summary.failed().map(|t| t.table).collect();
    assert_eq!(failed, vec![TableName::OrderItems]);
    assert!(summary
        .outcome(TableName::OrderItems)
        .and_then(|t| t.error.as_deref())
        .is_some_and(|e| e.contains("expected 5 fields, found 6")));
    Ok(())
}

#[test]
fn rerunning_replaces_and_append_mode_accumulates() -> Result<()> {
    let dir = tempdir()?;
    write_fixtures(dir.path())?;

    let replace = config_for(dir.path(), LoadMode::Replace);
    run_etl(&replace, &[TableName::Orders])?;
    run_etl(&replace, &[TableName::Orders])?;
    let conn = Connection::open(&replace.database.path)?;
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM orders")?, 4);
    drop(conn);

    let append = config_for(dir.path(), LoadMode::Append);
    run_etl(&append, &[TableName::Orders])?;
    let conn = Connection::open(&append.database.path)?;
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM orders")?, 8);
    Ok(())
}

#[test]
fn generic_normalization_is_idempotent_on_real_extracts() -> Result<()> {
    let dir = tempdir()?;
    write_fixtures(dir.path())?;

    for (table, file) in [
        (TableName::Customers, "customers.csv"),
        (TableName::Orders, "orders.csv"),
        (TableName::OrderItems, "order_items.csv"),
        (TableName::Reviews, "reviews.csv"),
    ] {
        let raw = read_csv(&dir.path().join(file))?;
        let once = normalize_records(raw, Some(table));
        let twice = normalize_records(once.clone(), Some(table));
        assert_eq!(once, twice, "{}", table);

        for column in once.columns() {
            for value in &column.values {
                if let Value::Text(s) = value {
                    assert!(!s.trim().is_empty() && s != "nan", "{}.{}", table, column.name);
                }
            }
        }
    }
    Ok(())
}
