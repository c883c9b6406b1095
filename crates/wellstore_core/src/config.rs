//! Store configuration resolved from defaults and environment.
//!
//! # Invariants
//! - Blank environment values fall back to defaults instead of failing.
//! - An unknown layout name is an error, never silently mirrored.

use crate::store::{StorageLayout, DEFAULT_NAMESPACE};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "WELLSTORE_DB_PATH";
pub const NAMESPACE_ENV: &str = "WELLSTORE_NAMESPACE";
pub const LAYOUT_ENV: &str = "WELLSTORE_LAYOUT";

const DEFAULT_DB_FILE_NAME: &str = "wellstore.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLayout(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLayout(message) => write!(f, "{LAYOUT_ENV}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Location and shape of a persisted well store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellStoreConfig {
    /// SQLite file holding the preference namespace.
    pub db_path: PathBuf,
    /// Preference namespace the well keys live in.
    pub namespace: String,
    pub layout: StorageLayout,
}

impl Default for WellStoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            namespace: DEFAULT_NAMESPACE.to_string(),
            layout: StorageLayout::default(),
        }
    }
}

impl WellStoreConfig {
    /// Resolves configuration from `WELLSTORE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(namespace) = non_blank(NAMESPACE_ENV) {
            config.namespace = namespace;
        }
        if let Some(layout) = non_blank(LAYOUT_ENV) {
            config.layout = layout.parse().map_err(ConfigError::InvalidLayout)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WellStoreConfig, DB_PATH_ENV, LAYOUT_ENV, NAMESPACE_ENV};
    use crate::store::StorageLayout;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(vars: &[(&str, &str)]) -> Result<WellStoreConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        WellStoreConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(resolve(&[]).unwrap(), WellStoreConfig::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = resolve(&[
            (DB_PATH_ENV, " /data/wells.sqlite3 "),
            (NAMESPACE_ENV, "field_team"),
            (LAYOUT_ENV, "canonical"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/wells.sqlite3"));
        assert_eq!(config.namespace, "field_team");
        assert_eq!(config.layout, StorageLayout::Canonical);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = resolve(&[(NAMESPACE_ENV, "   "), (LAYOUT_ENV, "")]).unwrap();
        assert_eq!(config.namespace, "well_data_store");
        assert_eq!(config.layout, StorageLayout::Mirrored);
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let err = resolve(&[(LAYOUT_ENV, "dual")]).unwrap_err();
        assert!(err.to_string().contains("dual"));
    }
}
