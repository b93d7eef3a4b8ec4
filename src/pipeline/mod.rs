// Data cleaning pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod processing;
pub mod storage;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::config::EtlConfig;
use crate::error::Result;
use crate::types::{RecordSet, TableName};
use ingestion::{CsvSource, TableSource};
use processing::normalize::normalize_records;
use processing::rules::RuleRegistry;
use storage::{id_overrides, SqliteSink, TableSink};

/// What happened to one table during a run.
#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    pub table: TableName,
    pub source: String,
    pub rows_read: Option<usize>,
    pub rows_written: Option<usize>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl TableOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a complete run over all requested tables.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<TableOutcome>,
}

impl RunSummary {
    pub fn failed(&self) -> impl Iterator<Item = &TableOutcome> {
        self.tables.iter().filter(|t| !t.succeeded())
    }

    pub fn total_rows_written(&self) -> usize {
        self.tables.iter().filter_map(|t| t.rows_written).sum()
    }

    pub fn outcome(&self, table: TableName) -> Option<&TableOutcome> {
        self.tables.iter().find(|t| t.table == table)
    }

    /// Persist the summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Drives tables one at a time from a source, through cleaning, into a sink.
pub struct Pipeline<S, K> {
    source: S,
    sink: K,
    rules: RuleRegistry,
}

impl<S: TableSource, K: TableSink> Pipeline<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            rules: RuleRegistry::new(),
        }
    }

    pub fn with_rules(mut self, rules: RuleRegistry) -> Self {
        self.rules = rules;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Ingest, normalize and apply table rules without writing anything.
    pub fn clean_table(&self, table: TableName) -> Result<RecordSet> {
        let raw = self.source.load(table)?;
        self.clean(table, raw)
    }

    fn clean(&self, table: TableName, raw: RecordSet) -> Result<RecordSet> {
        let normalized = normalize_records(raw, Some(table));
        self.rules.apply(table, normalized)
    }

    /// Process `tables` in order. A failing table is logged and recorded in
    /// the summary; the remaining tables still run.
    pub fn run(&mut self, tables: &[TableName]) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(run_id = %run_id, tables = tables.len(), "Starting ETL run");

        let mut outcomes = Vec::with_capacity(tables.len());
        for &table in tables {
            let span = info_span!("etl_table", table = %table, run_id = %run_id);
            let _enter = span.enter();
            outcomes.push(self.run_table(table));
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            tables: outcomes,
        };
        info!(
            run_id = %run_id,
            failed = summary.failed().count(),
            rows_written = summary.total_rows_written(),
            "Finished ETL run"
        );
        summary
    }

    fn run_table(&mut self, table: TableName) -> TableOutcome {
        let started = Instant::now();
        let source = self.source.describe(table);
        let mut outcome = TableOutcome {
            table,
            source: source.clone(),
            rows_read: None,
            rows_written: None,
            error: None,
            duration_ms: 0,
        };

        info!("Starting ETL for table: {}", table);
        let result = self.load_clean_write(table, &source, &mut outcome);

        match result {
            Ok(rows) => {
                info!("Inserted {} rows into {} table", rows, table);
                counter!("etl_rows_loaded_total", "table" => table.as_str()).increment(rows as u64);
                outcome.rows_written = Some(rows);
            }
            Err(e) => {
                error!("Error in ETL for {}: {}", table, e);
                counter!("etl_tables_failed_total", "table" => table.as_str()).increment(1);
                outcome.error = Some(e.to_string());
            }
        }

        histogram!("etl_table_duration_seconds", "table" => table.as_str())
            .record(started.elapsed().as_secs_f64());
        outcome.duration_ms = started.elapsed().as_millis() as u64;
        outcome
    }

    fn load_clean_write(
        &mut self,
        table: TableName,
        source: &str,
        outcome: &mut TableOutcome,
    ) -> Result<usize> {
        let raw = self.source.load(table)?;
        info!("Loaded {} rows from {}", raw.height(), source);
        outcome.rows_read = Some(raw.height());

        let cleaned = self.clean(table, raw)?;
        let overrides = id_overrides(table);
        self.sink.write_table(&cleaned, table.as_str(), Some(&overrides))
    }
}

/// Run the CSV → SQLite load described by `config` for `tables`.
///
/// Only failing to open the store aborts the run; per-table failures are
/// reported in the summary.
pub fn run_etl(config: &EtlConfig, tables: &[TableName]) -> Result<RunSummary> {
    let source = CsvSource::new(config.sources.clone());
    let sink = SqliteSink::open(&config.database.path, config.database.load_mode)?;
    let mut pipeline = Pipeline::new(source, sink);
    Ok(pipeline.run(tables))
}
