//! Column conventions shared by every stage of a run.

use crate::types::TableName;

/// Columns that reference an entity across tables. Always normalized to trimmed text.
pub const ID_COLUMNS: [&str; 4] = ["order_id", "customer_id", "order_item_id", "product_id"];

/// Text values that the generic pass treats as absent (after trimming, so
/// whitespace-only cells land on the empty string).
pub const TEXT_MISSING_TOKENS: [&str; 3] = ["", "nan", "NaN"];

/// Rating spellings the review rules treat as absent before numeric parsing.
pub const RATING_MISSING_TOKENS: [&str; 6] = ["", " ", "nan", "NaN", "N/A", "null"];

/// Width of the bounded text type used for ID columns in the store.
pub const ID_TEXT_WIDTH: usize = 50;

/// Date columns parsed by the generic pass for each table.
pub fn date_columns(table: TableName) -> &'static [&'static str] {
    match table {
        TableName::Customers => &["signup_date", "dob"],
        TableName::Orders => &["order_date"],
        TableName::Reviews => &["review_date"],
        TableName::Products | TableName::OrderItems => &[],
    }
}

/// Numeric columns exempt from the generic zero-fill because a later rule
/// needs to see which values were absent.
pub fn nullable_numeric_columns(table: TableName) -> &'static [&'static str] {
    match table {
        TableName::Reviews => &["rating"],
        _ => &[],
    }
}

/// Columns forced to bounded text when a table is written, so joins never
/// compare integers with text.
pub fn id_type_overrides(table: TableName) -> &'static [&'static str] {
    match table {
        TableName::Customers => &["customer_id"],
        TableName::Orders => &["order_id", "customer_id"],
        TableName::Products => &["product_id"],
        TableName::OrderItems => &["order_item_id", "order_id", "product_id"],
        TableName::Reviews => &["review_id", "order_id", "customer_id", "product_id"],
    }
}
