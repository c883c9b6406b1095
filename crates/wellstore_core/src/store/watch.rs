//! Change-driven view of the observed well list.

use super::codec::{decode_wells, EMPTY_LIST_JSON};
use super::{WellStoreError, WellStoreResult};
use crate::model::well::WellData;
use crate::prefs::Preferences;
use std::sync::Arc;
use tokio::sync::watch;

/// Subscription to the observed well list.
///
/// The first [`next`](Self::next) yields the value current at subscribe time;
/// each later call waits for the next committed store change. Only the latest
/// snapshot is kept, so commits landing between two calls are coalesced.
#[derive(Debug)]
pub struct WellListWatcher {
    snapshots: watch::Receiver<Arc<Preferences>>,
    key: &'static str,
    primed: bool,
}

impl WellListWatcher {
    pub(crate) fn new(snapshots: watch::Receiver<Arc<Preferences>>, key: &'static str) -> Self {
        Self {
            snapshots,
            key,
            primed: false,
        }
    }

    /// Waits for the next list value.
    ///
    /// # Errors
    /// - `WellStoreError::Closed` once every store handle has been dropped.
    /// - `WellStoreError::Decode` when the stored list is malformed.
    pub async fn next(&mut self) -> WellStoreResult<Vec<WellData>> {
        if self.primed {
            self.snapshots
                .changed()
                .await
                .map_err(|_| WellStoreError::Closed)?;
        }
        self.primed = true;
        self.current()
    }

    /// Decodes the latest snapshot without waiting and marks it as seen.
    pub fn current(&mut self) -> WellStoreResult<Vec<WellData>> {
        let snapshot = Arc::clone(&self.snapshots.borrow_and_update());
        decode_list_or_empty(&snapshot, self.key)
    }
}

pub(super) fn decode_list_or_empty(
    prefs: &Preferences,
    key: &'static str,
) -> WellStoreResult<Vec<WellData>> {
    let json = prefs.get(key).map_or(EMPTY_LIST_JSON, String::as_str);
    decode_wells(key, json)
}
