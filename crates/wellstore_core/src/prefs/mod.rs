//! Durable key-value preference storage.
//!
//! # Responsibility
//! - Persist string preferences per namespace in SQLite.
//! - Apply schema migrations before any preference is read or written.
//! - Serialize read-modify-write edits and publish committed snapshots.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Every edit runs inside one SQLite transaction.
//! - Subscribers only ever see committed state.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod edit;
pub mod migrations;
mod open;
mod store;

pub use edit::PreferencesEdit;
pub use store::PreferenceStore;

/// Immutable key -> value mapping of one namespace.
pub type Preferences = BTreeMap<String, String>;

pub type PrefResult<T> = Result<T, PrefError>;

#[derive(Debug)]
pub enum PrefError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Another live handle already serves this file and namespace.
    AlreadyOpen { path: PathBuf, namespace: String },
    /// A previous edit panicked while holding the connection.
    Poisoned,
    /// The blocking edit task was cancelled or panicked.
    EditAborted(String),
}

impl Display for PrefError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "preference schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::AlreadyOpen { path, namespace } => write!(
                f,
                "preference namespace `{namespace}` in `{}` is already open in this process",
                path.display()
            ),
            Self::Poisoned => write!(f, "preference connection lock is poisoned"),
            Self::EditAborted(reason) => write!(f, "preference edit aborted: {reason}"),
        }
    }
}

impl Error for PrefError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::AlreadyOpen { .. }
            | Self::Poisoned
            | Self::EditAborted(_) => None,
        }
    }
}

impl From<rusqlite::Error> for PrefError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
