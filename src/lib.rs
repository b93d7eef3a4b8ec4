//! Batch cleaning and loading of the retail analytics extracts.
//!
//! Each table is read from CSV, passed through the generic normalizer and its
//! table rules, and written to the relational store, one table at a time.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

pub use config::EtlConfig;
pub use error::{EtlError, Result};
pub use pipeline::{run_etl, Pipeline, RunSummary, TableOutcome};
pub use types::{Column, ColumnKind, RecordSet, TableName, Value};
