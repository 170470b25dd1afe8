use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{store::StoreConfig, view::SortKey};

pub const DEFAULT_CONFIG_PATH: &str = "./rollcall.jsonc";
const SCHEMA_FILE_NAME: &str = "rollcall.schema.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

fn default_enabled_true() -> bool {
    true
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Applied when the listed kind supports it, otherwise by-name.
    #[serde(default)]
    pub default_sort: SortKey,
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize rollcall config")?;

        if !config.logging.dir.is_absolute() {
            config.logging.dir = config_base.join(&config.logging.dir);
        }

        Ok(config)
    }
}

/// `$schema` wins when present; otherwise the schema must sit next to the config.
fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    let schema_path = match config_value.get("$schema").and_then(Value::as_str) {
        Some(declared) => config_base.join(declared),
        None => config_base.join(SCHEMA_FILE_NAME),
    };
    if !schema_path.is_file() {
        bail!(
            "rollcall config schema not found at {} (set \"$schema\" or keep {SCHEMA_FILE_NAME} beside the config)",
            schema_path.display()
        );
    }
    Ok(schema_path)
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema: Value = fs::read_to_string(schema_path)
        .map_err(anyhow::Error::from)
        .and_then(|text| serde_json::from_str(&text).map_err(anyhow::Error::from))
        .with_context(|| format!("failed to load rollcall schema {}", schema_path.display()))?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("rollcall schema {} is invalid: {err}", schema_path.display()))?;

    let Err(errors) = compiled.validate(config_value) else {
        return Ok(());
    };
    let problems: Vec<String> = errors.map(|error| describe_violation(&error)).collect();
    bail!("rollcall config is invalid: {}", problems.join("; "))
}

fn describe_violation(error: &ValidationError<'_>) -> String {
    let location = error.instance_path.to_string();
    if location.is_empty() {
        error.to_string()
    } else {
        format!("{location}: {error}")
    }
}
