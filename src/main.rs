use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use retail_etl::config::{EtlConfig, DEFAULT_CONFIG_PATH};
use retail_etl::constants::{date_columns, id_type_overrides};
use retail_etl::logging;
use retail_etl::pipeline::ingestion::CsvSource;
use retail_etl::pipeline::storage::InMemorySink;
use retail_etl::pipeline::{run_etl, Pipeline};
use retail_etl::TableName;

#[derive(Parser)]
#[command(name = "retail_etl")]
#[command(about = "Clean retail analytics CSV extracts and load them into the store")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and load tables into the store
    Run {
        /// Specific tables to run (comma-separated). Defaults to all tables.
        #[arg(long)]
        tables: Option<String>,
        /// Write the run summary as JSON to this path
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
    /// Clean one table and print it without writing to the store
    Preview {
        #[arg(long)]
        table: String,
        /// Number of rows to print
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
    /// List the known tables and their column conventions
    Tables,
}

fn parse_tables(list: Option<&str>) -> anyhow::Result<Vec<TableName>> {
    match list {
        Some(list) => list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<TableName>().map_err(anyhow::Error::from))
            .collect(),
        None => Ok(TableName::ALL.to_vec()),
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = EtlConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let _guard = logging::init_logging(&config.logging);

    match cli.command {
        Commands::Run {
            tables,
            summary_json,
        } => {
            let tables = parse_tables(tables.as_deref())?;
            println!("🚀 Running ETL for {} table(s)...", tables.len());
            info!(database = %config.database.path.display(), "Opening store");

            let summary = run_etl(&config, &tables)
                .with_context(|| format!("opening store {}", config.database.path.display()))?;

            println!("\n📊 ETL Results (run {}):", summary.run_id);
            for outcome in &summary.tables {
                match &outcome.error {
                    None => println!(
                        "   ✅ {}: {} rows loaded from {}",
                        outcome.table,
                        outcome.rows_written.unwrap_or(0),
                        outcome.source
                    ),
                    Some(e) => println!("   ❌ {}: {}", outcome.table, e),
                }
            }
            println!("   Total rows written: {}", summary.total_rows_written());

            if let Some(path) = summary_json {
                summary.write_json(&path)?;
                println!("💾 Saved run summary to {}", path.display());
            }

            let failed = summary.failed().count();
            if failed > 0 {
                error!("{} table(s) failed", failed);
                println!("\n⚠️  {} table(s) failed; see log for details", failed);
            }
        }
        Commands::Preview { table, rows } => {
            let table: TableName = table.parse()?;
            let pipeline = Pipeline::new(
                CsvSource::new(config.sources.clone()),
                InMemorySink::default(),
            );
            let records = pipeline.clean_table(table)?;

            println!("🔎 {} ({} rows)", table, records.height());
            for column in records.columns() {
                println!("   {:<20} {}", column.name, column.kind);
            }
            println!();
            println!("{}", records.column_names().join(" | "));
            for i in 0..records.height().min(rows) {
                let row: Vec<String> = records.row(i).iter().map(|v| v.to_string()).collect();
                println!("{}", row.join(" | "));
            }
        }
        Commands::Tables => {
            for table in TableName::ALL {
                println!("{}", table);
                println!("   source:      {}", config.sources.path_for(table).display());
                println!("   date cols:   {}", date_columns(table).join(", "));
                println!("   VARCHAR(50): {}", id_type_overrides(table).join(", "));
            }
        }
    }
    Ok(())
}
