use std::collections::HashMap;
use tracing::debug;

use super::{CustomerRules, OrderRules, ReviewRules, TableRules};
use crate::error::Result;
use crate::types::{RecordSet, TableName};

/// Maps each table to its table-specific rules. Tables without an entry pass
/// through unchanged.
pub struct RuleRegistry {
    rules: HashMap<TableName, Box<dyn TableRules>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Create a registry with the built-in rules registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(OrderRules::new()));
        registry.register(Box::new(ReviewRules::new()));
        registry.register(Box::new(CustomerRules::new()));
        registry
    }

    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register rules under the table they declare, replacing any previous entry.
    pub fn register(&mut self, rules: Box<dyn TableRules>) {
        self.rules.insert(rules.table(), rules);
    }

    pub fn get_rules(&self, table: TableName) -> Option<&dyn TableRules> {
        self.rules.get(&table).map(|r| r.as_ref())
    }

    /// Apply the rules registered for `table`, if any.
    pub fn apply(&self, table: TableName, records: RecordSet) -> Result<RecordSet> {
        match self.get_rules(table) {
            Some(rules) => {
                debug!(rules = rules.name(), table = %table, "Applying table rules");
                rules.apply(records)
            }
            None => {
                debug!(table = %table, "No table rules registered");
                Ok(records)
            }
        }
    }

    /// List the tables that have rules registered.
    pub fn list_tables(&self) -> Vec<TableName> {
        let mut tables: Vec<TableName> = self.rules.keys().copied().collect();
        tables.sort();
        tables
    }
}
