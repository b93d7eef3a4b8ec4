use tracing::debug;

use super::{mark_text_if_written, TableRules};
use crate::constants::RATING_MISSING_TOKENS;
use crate::error::Result;
use crate::pipeline::ingestion::parse_number;
use crate::types::{ColumnKind, RecordSet, TableName, Value};

/// Coerces ratings to numbers and fills absent review text.
///
/// Unparseable or placeholder ratings become missing and stay missing, so
/// they drop out of averages instead of counting as zero.
#[derive(Debug, Default)]
pub struct ReviewRules;

impl ReviewRules {
    pub fn new() -> Self {
        Self
    }
}

impl TableRules for ReviewRules {
    fn apply(&self, mut records: RecordSet) -> Result<RecordSet> {
        if let Some(rating) = records.column_mut("rating") {
            for value in rating.values.iter_mut() {
                *value = coerce_rating(value);
            }
            rating.kind = if rating.values.iter().all(|v| matches!(v, Value::Integer(_))) {
                ColumnKind::Integer
            } else {
                ColumnKind::Float
            };
        }

        if let Some(text) = records.column_mut("review_text") {
            for value in text.values.iter_mut().filter(|v| v.is_missing()) {
                *value = Value::text("");
            }
            mark_text_if_written(text);
        }

        debug!(mean_rating = ?mean_rating(&records), "applied review rules");
        Ok(records)
    }

    fn table(&self) -> TableName {
        TableName::Reviews
    }

    fn name(&self) -> &str {
        "review rating coercion"
    }
}

fn coerce_rating(value: &Value) -> Value {
    match value {
        Value::Integer(_) | Value::Float(_) => value.clone(),
        Value::Text(s) if RATING_MISSING_TOKENS.contains(&s.as_str()) => Value::Missing,
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::Integer)
                .ok()
                .or_else(|| parse_number(s).map(Value::Float))
                .unwrap_or(Value::Missing)
        }
        Value::Missing | Value::Date(_) => Value::Missing,
    }
}

/// Average of the present ratings; `None` when no review has one.
pub fn mean_rating(records: &RecordSet) -> Option<f64> {
    let ratings: Vec<f64> = records
        .column("rating")?
        .values
        .iter()
        .filter_map(|v| match v {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        })
        .collect();
    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}
