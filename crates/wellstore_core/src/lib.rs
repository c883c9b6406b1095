//! Core persistence for the well monitoring app.
//! Owns the well record model and its durable preference-backed storage.

pub mod config;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod store;

pub use config::{ConfigError, WellStoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::well::{WellData, WellId};
pub use prefs::{PrefError, PrefResult, PreferenceStore, Preferences, PreferencesEdit};
pub use store::{
    StorageLayout, WellListWatcher, WellStore, WellStoreError, WellStoreResult, WELLS_KEY,
    WELL_LIST_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
