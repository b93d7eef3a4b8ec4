use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{infer_column, TableSource};
use crate::config::SourcesConfig;
use crate::error::{EtlError, Result};
use crate::types::{RecordSet, TableName};

/// Reads each table from its own header-first CSV file.
#[derive(Debug, Clone)]
pub struct CsvSource {
    sources: SourcesConfig,
}

impl CsvSource {
    pub fn new(sources: SourcesConfig) -> Self {
        Self { sources }
    }

    pub fn path_for(&self, table: TableName) -> PathBuf {
        self.sources.path_for(table)
    }
}

impl TableSource for CsvSource {
    fn load(&self, table: TableName) -> Result<RecordSet> {
        read_csv(&self.path_for(table))
    }

    fn describe(&self, table: TableName) -> String {
        self.path_for(table).display().to_string()
    }
}

/// Read a CSV file into a record set, inferring a kind for each column.
///
/// A row with more fields than the header fails the read.
pub fn read_csv(path: &Path) -> Result<RecordSet> {
    // Short rows are padded with blanks; only over-long rows are rejected.
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(EtlError::MalformedRow {
                path: path.display().to_string(),
                line: record.position().map_or(0, |p| p.line()),
                expected: headers.len(),
                found: record.len(),
            });
        }
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect::<Vec<_>>();

    for column in &columns {
        debug!(column = %column.name, kind = %column.kind, "inferred column kind");
    }

    Ok(RecordSet::new(columns))
}
