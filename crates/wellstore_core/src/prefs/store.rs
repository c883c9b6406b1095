//! Namespaced preference store with transactional edits and change
//! notifications.
//!
//! # Responsibility
//! - Own the single SQLite connection of a store and serialize edits on it.
//! - Keep the latest committed snapshot and push it to subscribers.
//!
//! # Invariants
//! - Snapshots are published while the connection lock is still held, so
//!   subscribers observe commits in commit order.
//! - A failed transform writes and publishes nothing.
//! - At most one live handle per database file and namespace per process;
//!   reads come from the cached snapshot, so a second handle would go stale.

use super::edit::PreferencesEdit;
use super::open::{open_connection, OpenMode};
use super::{PrefError, PrefResult, Preferences};
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::watch;

/// Handle to one preference namespace.
///
/// Clones share the same connection and notification channel.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<StoreInner>,
}

type ClaimKey = (PathBuf, String);

static OPEN_NAMESPACES: Lazy<Mutex<HashSet<ClaimKey>>> = Lazy::new(|| Mutex::new(HashSet::new()));

struct StoreInner {
    namespace: String,
    conn: Mutex<Connection>,
    snapshots: watch::Sender<Arc<Preferences>>,
    _claim: Option<NamespaceClaim>,
}

/// Registration of a file-backed namespace, released on drop.
struct NamespaceClaim {
    key: ClaimKey,
}

impl NamespaceClaim {
    fn acquire(path: &Path, namespace: &str) -> PrefResult<Self> {
        // Canonical form so `./a.db` and `/abs/a.db` share one claim.
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let key = (path, namespace.to_string());
        let mut open = OPEN_NAMESPACES.lock().map_err(|_| PrefError::Poisoned)?;
        if !open.insert(key.clone()) {
            warn!(
                "event=prefs_open module=prefs status=error namespace={} error_code=already_open",
                namespace
            );
            let (path, namespace) = key;
            return Err(PrefError::AlreadyOpen { path, namespace });
        }
        Ok(Self { key })
    }
}

impl Drop for NamespaceClaim {
    fn drop(&mut self) {
        if let Ok(mut open) = OPEN_NAMESPACES.lock() {
            open.remove(&self.key);
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("namespace", &self.inner.namespace)
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Opens `namespace` inside the database file at `path`.
    ///
    /// Share the returned handle by cloning it; the claim on the namespace
    /// is released once every clone is dropped.
    ///
    /// # Errors
    /// - `PrefError::AlreadyOpen` while another handle for the same file and
    ///   namespace is alive in this process.
    ///
    /// # Side effects
    /// - Creates the file and applies migrations when needed.
    /// - Emits `prefs_open` logging events.
    pub fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> PrefResult<Self> {
        let namespace = namespace.into();
        let conn = open_connection(OpenMode::File(path.as_ref()))?;
        let claim = NamespaceClaim::acquire(path.as_ref(), &namespace)?;
        Self::from_connection(conn, namespace, Some(claim))
    }

    /// Opens `namespace` in a private in-memory database.
    pub fn open_in_memory(namespace: impl Into<String>) -> PrefResult<Self> {
        let conn = open_connection(OpenMode::Memory)?;
        Self::from_connection(conn, namespace.into(), None)
    }

    fn from_connection(
        conn: Connection,
        namespace: String,
        claim: Option<NamespaceClaim>,
    ) -> PrefResult<Self> {
        let initial = load_namespace(&conn, &namespace)?;
        let (snapshots, _) = watch::channel(Arc::new(initial));
        Ok(Self {
            inner: Arc::new(StoreInner {
                namespace,
                conn: Mutex::new(conn),
                snapshots,
                _claim: claim,
            }),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Returns the latest committed snapshot.
    pub fn data(&self) -> Arc<Preferences> {
        Arc::clone(&self.inner.snapshots.borrow())
    }

    /// Subscribes to committed snapshots.
    ///
    /// The receiver starts at the current snapshot and only keeps the latest
    /// value; the channel closes when the last store handle is dropped.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Preferences>> {
        self.inner.snapshots.subscribe()
    }

    /// Applies `transform` atomically to the current namespace contents.
    ///
    /// The transform sees the latest persisted values, and its changes are
    /// committed together or not at all. Runs on the blocking pool.
    ///
    /// # Errors
    /// - Returns the transform's own error unchanged (nothing is written).
    /// - Returns SQLite, lock or task failures converted through `E: From<PrefError>`.
    pub async fn edit<F, T, E>(&self, transform: F) -> Result<T, E>
    where
        F: FnOnce(&mut PreferencesEdit) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<PrefError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        match tokio::task::spawn_blocking(move || inner.apply_edit(transform)).await {
            Ok(result) => result,
            Err(join_err) => {
                error!(
                    "event=prefs_edit module=prefs status=error namespace={} error_code=edit_aborted error={}",
                    self.inner.namespace, join_err
                );
                Err(E::from(PrefError::EditAborted(join_err.to_string())))
            }
        }
    }
}

impl StoreInner {
    fn apply_edit<F, T, E>(&self, transform: F) -> Result<T, E>
    where
        F: FnOnce(&mut PreferencesEdit) -> Result<T, E>,
        E: From<PrefError>,
    {
        let started_at = Instant::now();
        let mut conn = self.conn.lock().map_err(|_| E::from(PrefError::Poisoned))?;
        let tx = conn.transaction().map_err(sqlite_err::<E>)?;

        let current = load_namespace(&tx, &self.namespace).map_err(E::from)?;
        let mut edit = PreferencesEdit::new(current);
        let value = transform(&mut edit)?;

        if !edit.is_dirty() {
            debug!(
                "event=prefs_edit module=prefs status=ok namespace={} changed_keys=0 duration_ms={}",
                self.namespace,
                started_at.elapsed().as_millis()
            );
            return Ok(value);
        }

        let (values, touched) = edit.into_parts();
        for key in &touched {
            let written = match values.get(key) {
                Some(stored) => tx.execute(
                    "INSERT INTO preferences (namespace, key, value)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT (namespace, key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
                    params![self.namespace, key, stored],
                ),
                None => tx.execute(
                    "DELETE FROM preferences WHERE namespace = ?1 AND key = ?2;",
                    params![self.namespace, key],
                ),
            };
            written.map_err(sqlite_err::<E>)?;
        }
        tx.commit().map_err(sqlite_err::<E>)?;

        self.snapshots.send_replace(Arc::new(values));
        debug!(
            "event=prefs_edit module=prefs status=ok namespace={} changed_keys={} duration_ms={}",
            self.namespace,
            touched.len(),
            started_at.elapsed().as_millis()
        );
        Ok(value)
    }
}

fn sqlite_err<E: From<PrefError>>(err: rusqlite::Error) -> E {
    E::from(PrefError::Sqlite(err))
}

fn load_namespace(conn: &Connection, namespace: &str) -> PrefResult<Preferences> {
    let mut stmt =
        conn.prepare("SELECT key, value FROM preferences WHERE namespace = ?1 ORDER BY key;")?;
    let rows = stmt.query_map([namespace], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let values = rows.collect::<rusqlite::Result<Preferences>>()?;
    Ok(values)
}
