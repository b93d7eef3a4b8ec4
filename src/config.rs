use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{EtlError, Result};
use crate::types::TableName;

pub const DEFAULT_CONFIG_PATH: &str = "etl.toml";

/// Everything a run needs to know about its surroundings. Built once and
/// handed to the pipeline; nothing here is read from global state later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub database: DatabaseConfig,
    pub sources: SourcesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub load_mode: LoadMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("retail_analytics.db"),
            load_mode: LoadMode::Replace,
        }
    }
}

/// What happens to an existing table with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    #[default]
    Replace,
    Append,
}

impl FromStr for LoadMode {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(LoadMode::Replace),
            "append" => Ok(LoadMode::Append),
            other => Err(EtlError::Config(format!("Unknown load mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub data_dir: PathBuf,
    /// Per-table file overrides, keyed by table name.
    #[serde(flatten)]
    pub files: BTreeMap<TableName, PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("raw data"),
            files: BTreeMap::new(),
        }
    }
}

impl SourcesConfig {
    /// Source file for `table`: the explicit override, else `<data_dir>/<table>.csv`.
    pub fn path_for(&self, table: TableName) -> PathBuf {
        self.files
            .get(&table)
            .cloned()
            .unwrap_or_else(|| self.data_dir.join(format!("{}.csv", table.as_str())))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "etl.log".to_string(),
        }
    }
}

impl EtlConfig {
    /// Load configuration from `path` and apply environment overrides.
    ///
    /// A missing file is not an error; the defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_var("ETL_DATABASE_PATH") {
            self.database.path = PathBuf::from(v);
        }
        if let Some(v) = env_var("ETL_LOAD_MODE") {
            self.database.load_mode = v.parse()?;
        }
        if let Some(v) = env_var("ETL_DATA_DIR") {
            self.sources.data_dir = PathBuf::from(v);
        }
        if let Some(v) = env_var("ETL_LOG_DIR") {
            self.logging.dir = PathBuf::from(v);
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_raw_data_dir() {
        let config = EtlConfig::default();
        assert_eq!(
            config.sources.path_for(TableName::OrderItems),
            PathBuf::from("raw data").join("order_items.csv")
        );
        assert_eq!(config.database.load_mode, LoadMode::Replace);
    }

    #[test]
    fn parses_toml_with_per_table_overrides() {
        let config = EtlConfig::from_toml(
            r#"
            [database]
            path = "/tmp/retail.db"
            load_mode = "append"

            [sources]
            data_dir = "/data"
            reviews = "/elsewhere/reviews_2024.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/retail.db"));
        assert_eq!(config.database.load_mode, LoadMode::Append);
        assert_eq!(
            config.sources.path_for(TableName::Reviews),
            PathBuf::from("/elsewhere/reviews_2024.csv")
        );
        assert_eq!(
            config.sources.path_for(TableName::Orders),
            PathBuf::from("/data/orders.csv")
        );
        assert_eq!(config.logging.file_name, "etl.log");
    }

    #[test]
    fn rejects_unknown_load_mode() {
        assert!("upsert".parse::<LoadMode>().is_err());
        assert_eq!(" Append ".parse::<LoadMode>().unwrap(), LoadMode::Append);
    }
}
