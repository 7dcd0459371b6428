//! Configuration loaded from `filterkit.toml`.
//!
//! ```toml
//! [compile]
//! strict_negation = false
//!
//! [apply]
//! strict_null_analogue = false
//! strict_group_composition = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FilterError, FilterResult};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "filterkit.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub compile: CompileConfig,
    pub apply: ApplyConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// A nested `$not` toggles negation instead of forcing it on.
    pub strict_negation: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplyConfig {
    /// Inside an OR group, `where_null` becomes `or_where_null` rather than
    /// `or_where_not_null`.
    pub strict_null_analogue: bool,
    /// A nested group joins its siblings with the enclosing group's
    /// combinator instead of its own.
    pub strict_group_composition: bool,
}

impl Config {
    /// Parse TOML text.
    pub fn from_toml(content: &str) -> FilterResult<Self> {
        toml::from_str(content).map_err(|e| FilterError::config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_path(path: &Path) -> FilterResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| FilterError::config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve the configuration.
    ///
    /// An explicit path must exist. Otherwise the first of
    /// [`Config::search_paths`] that exists is used, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> FilterResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(FilterError::config(format!(
                    "{} not found",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "loading config");
            return Self::from_path(path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                debug!(path = %candidate.display(), "loading config");
                return Self::from_path(&candidate);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// `./filterkit.toml`, then `<config dir>/filterkit/config.toml`.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("filterkit").join("config.toml"));
        }
        paths
    }
}
