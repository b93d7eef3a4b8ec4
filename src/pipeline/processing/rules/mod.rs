//! Business rules that only make sense for one table.

pub mod customers;
pub mod orders;
pub mod registry;
pub mod reviews;

pub use customers::CustomerRules;
pub use orders::OrderRules;
pub use registry::RuleRegistry;
pub use reviews::ReviewRules;

use crate::error::{EtlError, Result};
use crate::types::{Column, ColumnKind, RecordSet, TableName, Value};

/// Table-specific cleaning, applied after the generic pass.
pub trait TableRules: Send + Sync {
    /// Apply this table's rules to an already-normalized record set.
    fn apply(&self, records: RecordSet) -> Result<RecordSet>;

    /// The table these rules are registered for.
    fn table(&self) -> TableName;

    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;
}

/// Borrow a column the rules cannot do without.
pub(crate) fn required_column<'a>(
    records: &'a mut RecordSet,
    table: TableName,
    column: &str,
) -> Result<&'a mut Column> {
    records
        .column_mut(column)
        .ok_or_else(|| EtlError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
}

/// Retype a column as text once a rule has written text into it.
pub(crate) fn mark_text_if_written(column: &mut Column) {
    if column.values.iter().any(|v| matches!(v, Value::Text(_))) {
        column.kind = ColumnKind::Text;
    }
}
