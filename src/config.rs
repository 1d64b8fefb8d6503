use crate::core::db::query::DEFAULT_ROW_LIMIT;
use crate::core::{DbPeekError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration structure parsed from a TOML file.
///
/// The core only observes the query row limit; anything else in the file
/// belongs to the presentation layer and is ignored here.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub query: Option<QueryConfig>,
}

/// Query-related configuration.
#[derive(Debug, Default, Deserialize)]
pub struct QueryConfig {
    pub row_limit: Option<usize>,
}

impl Config {
    /// Resolves the pagination row limit, falling back to the default cap.
    pub fn row_limit(&self) -> usize {
        self.query
            .as_ref()
            .and_then(|q| q.row_limit)
            .unwrap_or(DEFAULT_ROW_LIMIT)
    }
}

/// Loads configuration from a TOML file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| DbPeekError::Config(e.to_string()))
}
