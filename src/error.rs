use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Table {table} is missing required column: {column}")]
    MissingColumn { table: String, column: String },

    #[error("Table {0} has no columns")]
    NoColumns(String),

    #[error("Value in {table}.{column} exceeds {width} characters")]
    ValueTooLong {
        table: String,
        column: String,
        width: usize,
    },

    #[error("Malformed row in {path} at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        path: String,
        line: u64,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;
