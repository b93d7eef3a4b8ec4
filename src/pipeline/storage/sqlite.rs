use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use tracing::debug;

use super::{resolve_column_types, SqlType, TableSink, TypeOverrides};
use crate::config::LoadMode;
use crate::error::{EtlError, Result};
use crate::types::{RecordSet, Value};

/// Writes tables into a SQLite database, one transaction per table.
pub struct SqliteSink {
    conn: Connection,
    load_mode: LoadMode,
}

impl SqliteSink {
    pub fn open<P: AsRef<Path>>(path: P, load_mode: LoadMode) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn, load_mode })
    }

    pub fn in_memory(load_mode: LoadMode) -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            load_mode,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TableSink for SqliteSink {
    fn write_table(
        &mut self,
        records: &RecordSet,
        target: &str,
        overrides: Option<&TypeOverrides>,
    ) -> Result<usize> {
        let types = resolve_column_types(records, overrides);
        if types.is_empty() {
            return Err(EtlError::NoColumns(target.to_string()));
        }
        check_widths(records, target, &types)?;

        let table = quote_ident(target);
        let column_defs = types
            .iter()
            .map(|(name, ty)| format!("{} {}", quote_ident(name), ty))
            .collect::<Vec<_>>()
            .join(", ");
        let column_names = types
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=types.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.transaction()?;
        if self.load_mode == LoadMode::Replace {
            tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        }
        tx.execute(
            &format!("CREATE TABLE IF NOT EXISTS {} ({})", table, column_defs),
            [],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table, column_names, placeholders
            ))?;
            for i in 0..records.height() {
                stmt.execute(params_from_iter(records.row(i).into_iter().map(to_sql_value)))?;
            }
        }
        tx.commit()?;

        debug!(table = target, rows = records.height(), "wrote table");
        Ok(records.height())
    }
}

/// Bounded text columns reject values longer than their width.
fn check_widths(records: &RecordSet, target: &str, types: &[(String, SqlType)]) -> Result<()> {
    for (column, (name, ty)) in records.columns().iter().zip(types) {
        let SqlType::VarChar(width) = ty else {
            continue;
        };
        let too_long = column
            .values
            .iter()
            .filter_map(Value::to_text)
            .any(|s| s.chars().count() > *width);
        if too_long {
            return Err(EtlError::ValueTooLong {
                table: target.to_string(),
                column: name.clone(),
                width: *width,
            });
        }
    }
    Ok(())
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Missing => SqlValue::Null,
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
