//! TOML configuration file.
//!
//! ```toml
//! [table]
//! required_columns = ["itis_tsn", "count"]
//! persist_columns = true
//! validation_concurrency = 8
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use survey_table::TableConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub table: TableConfig,
}

impl CliConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse configuration")
    }

    /// Load `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("load configuration {}", path.display()))
    }
}
