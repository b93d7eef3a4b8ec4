//! Table-agnostic cleaning applied to every record set before table rules.

pub mod dates;

pub use dates::parse_date_dayfirst;

use tracing::debug;

use crate::constants::{date_columns, nullable_numeric_columns, ID_COLUMNS, TEXT_MISSING_TOKENS};
use crate::types::{Column, ColumnKind, RecordSet, TableName, Value};

/// Apply the generic cleaning pass.
///
/// 1. Trim text; blank and `nan` text becomes missing.
/// 2. Missing numbers become zero (except the table's nullable numeric columns).
/// 3. Parse the table's date columns day-first; failures become missing.
/// 4. Stringify every ID column that is present.
///
/// Without a table name only steps 1, 2 and 4 apply. Running the pass twice
/// gives the same result as running it once.
pub fn normalize_records(mut records: RecordSet, table: Option<TableName>) -> RecordSet {
    let keep_missing = table.map_or(&[][..], nullable_numeric_columns);

    for column in records.columns_mut() {
        match column.kind {
            ColumnKind::Text => clean_text(column),
            ColumnKind::Integer | ColumnKind::Float => {
                if !keep_missing.contains(&column.name.as_str()) {
                    fill_missing_numbers(column);
                }
            }
            ColumnKind::Date => {}
        }
    }

    if let Some(table) = table {
        for name in date_columns(table) {
            if let Some(column) = records.column_mut(name) {
                parse_dates(column);
            }
        }
    }

    for name in ID_COLUMNS {
        if let Some(column) = records.column_mut(name) {
            stringify_ids(column);
        }
    }

    for column in records.columns() {
        debug!(
            table = table.map_or("-", |t| t.as_str()),
            column = %column.name,
            kind = %column.kind,
            "normalized column"
        );
    }

    records
}

fn clean_text(column: &mut Column) {
    for value in column.values.iter_mut() {
        if let Value::Text(s) = value {
            let trimmed = s.trim();
            *value = if TEXT_MISSING_TOKENS.contains(&trimmed) {
                Value::Missing
            } else {
                Value::Text(trimmed.to_string())
            };
        }
    }
}

fn fill_missing_numbers(column: &mut Column) {
    let zero = match column.kind {
        ColumnKind::Float => Value::Float(0.0),
        _ => Value::Integer(0),
    };
    for value in column.values.iter_mut().filter(|v| v.is_missing()) {
        *value = zero.clone();
    }
}

fn parse_dates(column: &mut Column) {
    for value in column.values.iter_mut() {
        if matches!(value, Value::Date(_)) {
            continue;
        }
        *value = value
            .to_text()
            .and_then(|s| parse_date_dayfirst(&s))
            .map_or(Value::Missing, Value::Date);
    }
    column.kind = ColumnKind::Date;
}

fn stringify_ids(column: &mut Column) {
    for value in column.values.iter_mut() {
        *value = value
            .to_text()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map_or(Value::Missing, Value::Text);
    }
    column.kind = ColumnKind::Text;
}
