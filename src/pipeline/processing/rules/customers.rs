use super::TableRules;
use crate::error::Result;
use crate::types::{RecordSet, TableName, Value};

const GENDER_UNKNOWN: &str = "Unknown";

/// Drops placeholder genders and lower-cases email addresses.
#[derive(Debug, Default)]
pub struct CustomerRules;

impl CustomerRules {
    pub fn new() -> Self {
        Self
    }
}

impl TableRules for CustomerRules {
    fn apply(&self, mut records: RecordSet) -> Result<RecordSet> {
        if let Some(gender) = records.column_mut("gender") {
            for value in gender.values.iter_mut() {
                if matches!(value.as_text(), Some("") | Some(GENDER_UNKNOWN)) {
                    *value = Value::Missing;
                }
            }
        }

        if let Some(email) = records.column_mut("email") {
            // Missing stays missing; only text is touched.
            for value in email.values.iter_mut() {
                if let Value::Text(s) = value {
                    *s = s.to_lowercase();
                }
            }
        }

        Ok(records)
    }

    fn table(&self) -> TableName {
        TableName::Customers
    }

    fn name(&self) -> &str {
        "customer field normalization"
    }
}
