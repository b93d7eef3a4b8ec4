use std::collections::HashMap;
use tracing::debug;

use super::{resolve_column_types, SqlType, TableSink, TypeOverrides};
use crate::config::LoadMode;
use crate::error::{EtlError, Result};
use crate::types::RecordSet;

/// A written table as the in-memory sink holds it.
#[derive(Debug, Clone)]
pub struct StoredTable {
    pub records: RecordSet,
    pub column_types: Vec<(String, SqlType)>,
}

/// In-memory sink implementation for development/testing
#[derive(Debug, Default)]
pub struct InMemorySink {
    tables: HashMap<String, StoredTable>,
    load_mode: LoadMode,
}

impl InMemorySink {
    pub fn new(load_mode: LoadMode) -> Self {
        Self {
            tables: HashMap::new(),
            load_mode,
        }
    }

    pub fn table(&self, name: &str) -> Option<&StoredTable> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl TableSink for InMemorySink {
    fn write_table(
        &mut self,
        records: &RecordSet,
        target: &str,
        overrides: Option<&TypeOverrides>,
    ) -> Result<usize> {
        let column_types = resolve_column_types(records, overrides);
        if column_types.is_empty() {
            return Err(EtlError::NoColumns(target.to_string()));
        }

        if self.load_mode == LoadMode::Append {
            if let Some(existing) = self.tables.get_mut(target) {
                if existing.records.column_names() != records.column_names() {
                    return Err(EtlError::Config(format!(
                        "cannot append to {}: column sets differ",
                        target
                    )));
                }
                for (dst, src) in existing.records.columns_mut().iter_mut().zip(records.columns()) {
                    dst.values.extend(src.values.iter().cloned());
                }
                debug!(table = target, rows = records.height(), "appended table in memory");
                return Ok(records.height());
            }
        }

        self.tables.insert(
            target.to_string(),
            StoredTable {
                records: records.clone(),
                column_types,
            },
        );

        debug!(table = target, rows = records.height(), "stored table in memory");
        Ok(records.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, Value};

    fn ids(values: &[&str]) -> RecordSet {
        RecordSet::new(vec![Column::text(
            "product_id",
            &values.iter().map(|v| Some(*v)).collect::<Vec<_>>(),
        )])
    }

    #[test]
    fn replace_overwrites() {
        let mut sink = InMemorySink::new(LoadMode::Replace);
        sink.write_table(&ids(&["a", "b"]), "products", None).unwrap();
        sink.write_table(&ids(&["c"]), "products", None).unwrap();
        assert_eq!(sink.table("products").unwrap().records.height(), 1);
    }

    #[test]
    fn append_extends_matching_columns() {
        let mut sink = InMemorySink::new(LoadMode::Append);
        sink.write_table(&ids(&["a"]), "products", None).unwrap();
        sink.write_table(&ids(&["b"]), "products", None).unwrap();
        let stored = &sink.table("products").unwrap().records;
        assert_eq!(stored.get("product_id", 1), Some(&Value::text("b")));
    }
}
