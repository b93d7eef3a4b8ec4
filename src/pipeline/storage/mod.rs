//! Persisting cleaned record sets as relational tables.

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemorySink;
pub use sqlite::SqliteSink;

use std::collections::HashMap;
use std::fmt;

use crate::constants::{id_type_overrides, ID_TEXT_WIDTH};
use crate::error::Result;
use crate::types::{ColumnKind, RecordSet, TableName};

/// Column types understood by the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    BigInt,
    Double,
    Date,
    /// Bounded text with a maximum width in characters.
    VarChar(usize),
}

impl SqlType {
    pub fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => SqlType::Text,
            ColumnKind::Integer => SqlType::BigInt,
            ColumnKind::Float => SqlType::Double,
            ColumnKind::Date => SqlType::Date,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Text => f.write_str("TEXT"),
            SqlType::BigInt => f.write_str("BIGINT"),
            SqlType::Double => f.write_str("DOUBLE PRECISION"),
            SqlType::Date => f.write_str("DATE"),
            SqlType::VarChar(width) => write!(f, "VARCHAR({})", width),
        }
    }
}

/// Explicit column types that win over the inferred ones.
pub type TypeOverrides = HashMap<String, SqlType>;

/// Bounded text overrides for `table`'s ID columns.
pub fn id_overrides(table: TableName) -> TypeOverrides {
    id_type_overrides(table)
        .iter()
        .map(|c| (c.to_string(), SqlType::VarChar(ID_TEXT_WIDTH)))
        .collect()
}

/// Resolve the store type of every column of `records`, in column order.
pub fn resolve_column_types(
    records: &RecordSet,
    overrides: Option<&TypeOverrides>,
) -> Vec<(String, SqlType)> {
    records
        .columns()
        .iter()
        .map(|c| {
            let ty = overrides
                .and_then(|o| o.get(&c.name))
                .copied()
                .unwrap_or_else(|| SqlType::for_kind(c.kind));
            (c.name.clone(), ty)
        })
        .collect()
}

/// Destination for cleaned tables.
pub trait TableSink {
    /// Persist `records` as table `target` and return the number of rows written.
    ///
    /// A table is written completely or not at all.
    fn write_table(
        &mut self,
        records: &RecordSet,
        target: &str,
        overrides: Option<&TypeOverrides>,
    ) -> Result<usize>;
}
