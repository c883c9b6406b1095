//! Well collection persistence on top of the preference store.
//!
//! # Responsibility
//! - Provide CRUD over the persisted well list.
//! - Keep the `well_list` mirror in step with `wells` when mirroring is on.
//! - Expose a change-driven view of the observed list.
//!
//! # Invariants
//! - Every mutation is one preference edit, so it commits atomically.
//! - Stored JSON that fails to decode is reported, never silently replaced.

use crate::prefs::PrefError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod codec;
mod watch;
mod well_store;

pub use watch::WellListWatcher;
pub use well_store::WellStore;

/// Canonical collection key.
pub const WELLS_KEY: &str = "wells";
/// Mirror collection key, also the key observed in mirrored layout.
pub const WELL_LIST_KEY: &str = "well_list";
/// Default preference namespace for well data.
pub const DEFAULT_NAMESPACE: &str = "well_data_store";

/// Physical layout of the persisted collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageLayout {
    /// `wells` plus a `well_list` mirror that `save_list` can overwrite alone.
    #[default]
    Mirrored,
    /// `wells` only; the observed list is derived from it.
    Canonical,
}

impl StorageLayout {
    /// Key read by `observe_list` and written by `save_list`.
    pub fn list_key(self) -> &'static str {
        match self {
            Self::Mirrored => WELL_LIST_KEY,
            Self::Canonical => WELLS_KEY,
        }
    }

    pub fn mirrors(self) -> bool {
        matches!(self, Self::Mirrored)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mirrored => "mirrored",
            Self::Canonical => "canonical",
        }
    }
}

impl FromStr for StorageLayout {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mirrored" => Ok(Self::Mirrored),
            "canonical" => Ok(Self::Canonical),
            other => Err(format!(
                "unsupported storage layout `{other}`; expected mirrored|canonical"
            )),
        }
    }
}

pub type WellStoreResult<T> = Result<T, WellStoreError>;

#[derive(Debug)]
pub enum WellStoreError {
    Pref(PrefError),
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
    /// The underlying store was dropped while a watcher was waiting.
    Closed,
}

impl Display for WellStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pref(err) => write!(f, "{err}"),
            Self::Decode { key, source } => {
                write!(f, "invalid well list stored under `{key}`: {source}")
            }
            Self::Encode(err) => write!(f, "failed to encode well list: {err}"),
            Self::Closed => write!(f, "well store is closed"),
        }
    }
}

impl Error for WellStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pref(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::Closed => None,
        }
    }
}

impl From<PrefError> for WellStoreError {
    fn from(value: PrefError) -> Self {
        Self::Pref(value)
    }
}
