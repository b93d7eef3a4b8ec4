//! Loading raw table extracts into record sets.

pub mod csv_source;

pub use csv_source::CsvSource;

use std::collections::HashMap;

use crate::constants::ID_COLUMNS;
use crate::error::{EtlError, Result};
use crate::types::{Column, ColumnKind, RecordSet, TableName, Value};

/// Anything that can hand the pipeline one table's raw records.
pub trait TableSource {
    /// Load all records of `table`, columns named, rows in source order.
    fn load(&self, table: TableName) -> Result<RecordSet>;

    /// Human-readable location of `table`'s data, used in diagnostics.
    fn describe(&self, table: TableName) -> String;
}

/// Fixed in-memory tables, for callers that already hold the data.
#[derive(Debug, Default)]
pub struct InMemorySource {
    tables: HashMap<TableName, RecordSet>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableName, records: RecordSet) -> Self {
        self.tables.insert(table, records);
        self
    }
}

impl TableSource for InMemorySource {
    fn load(&self, table: TableName) -> Result<RecordSet> {
        self.tables.get(&table).cloned().ok_or_else(|| {
            EtlError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory data for {}", table),
            ))
        })
    }

    fn describe(&self, table: TableName) -> String {
        format!("memory://{}", table)
    }
}

/// Build a typed column from raw cells the way a CSV reader would guess types.
///
/// Blank cells become missing. A column is `Integer` if every non-blank cell
/// parses as an integer, `Float` if every non-blank cell parses as a number,
/// and `Text` otherwise. Text cells keep their original spacing; the generic
/// normalizer trims them.
///
/// An ID column holding an integer too wide for `i64` stays `Text`, so its
/// digits are never rounded through a float.
pub fn infer_column(name: &str, cells: Vec<String>) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();

    let kind = if present.is_empty() {
        ColumnKind::Text
    } else if ID_COLUMNS.contains(&name) && present.iter().any(|c| is_wide_integer(c)) {
        ColumnKind::Text
    } else if present.iter().all(|c| c.parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if present.iter().all(|c| parse_number(c).is_some()) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    };

    let values = cells
        .into_iter()
        .map(|cell| {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                return Value::Missing;
            }
            match kind {
                ColumnKind::Integer => trimmed.parse().map_or(Value::Missing, Value::Integer),
                ColumnKind::Float => parse_number(trimmed).map_or(Value::Missing, Value::Float),
                _ => Value::Text(cell),
            }
        })
        .collect();

    Column::new(name, kind, values)
}

/// All digits, but out of `i64` range.
fn is_wide_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').or_else(|| s.strip_prefix('+')).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && s.parse::<i64>().is_err()
}

/// Finite decimal numbers only; `"nan"` and `"inf"` are text here.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}
