//! Well CRUD facade over the preference store.
//!
//! # Responsibility
//! - Map well use cases onto single atomic preference edits.
//! - Emit metadata-only `well_*` logging events.
//!
//! # Invariants
//! - Upsert replaces every record matching the id, or appends when none does.
//! - A `None` id matches records stored without an id, and appends when
//!   there are none.
//! - Mirrored layout rewrites `well_list` on every upsert/delete.

use super::codec::{decode_wells, encode_wells};
use super::watch::{decode_list_or_empty, WellListWatcher};
use super::{StorageLayout, WellStoreResult, WELLS_KEY, WELL_LIST_KEY};
use crate::config::WellStoreConfig;
use crate::model::well::{WellData, WellId};
use crate::prefs::{PreferenceStore, PreferencesEdit};
use log::{debug, error, info, warn};
use std::time::Instant;

/// Durable CRUD over the persisted well collection.
///
/// Cheap to clone; clones share one underlying store.
#[derive(Debug, Clone)]
pub struct WellStore {
    prefs: PreferenceStore,
    layout: StorageLayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertOutcome {
    Inserted,
    Replaced(usize),
}

impl WellStore {
    pub fn new(prefs: PreferenceStore, layout: StorageLayout) -> Self {
        Self { prefs, layout }
    }

    /// Opens the store described by `config`.
    pub fn open(config: &WellStoreConfig) -> WellStoreResult<Self> {
        let prefs = PreferenceStore::open(&config.db_path, config.namespace.as_str())?;
        info!(
            "event=well_store_open module=store status=ok namespace={} layout={}",
            config.namespace,
            config.layout.as_str()
        );
        Ok(Self::new(prefs, config.layout))
    }

    pub fn layout(&self) -> StorageLayout {
        self.layout
    }

    /// Underlying preference store, for raw key inspection.
    pub fn preferences(&self) -> &PreferenceStore {
        &self.prefs
    }

    /// Inserts `record`, or replaces the stored records with id `well_id`.
    ///
    /// # Errors
    /// - `WellStoreError::Decode` when `wells` holds malformed JSON.
    pub async fn upsert(&self, well_id: Option<WellId>, record: WellData) -> WellStoreResult<()> {
        let started_at = Instant::now();
        let mirror = self.layout.mirrors();
        let result = self
            .prefs
            .edit(move |prefs| -> WellStoreResult<(UpsertOutcome, usize)> {
                let mut wells = read_wells(prefs)?;
                let outcome = upsert_into(&mut wells, well_id, record);
                write_wells(prefs, &wells, mirror)?;
                Ok((outcome, wells.len()))
            })
            .await;

        match result {
            Ok((outcome, count)) => {
                if let UpsertOutcome::Replaced(replaced) = outcome {
                    if replaced > 1 {
                        warn!(
                            "event=well_upsert module=store status=ok well_id={} duplicates_replaced={}",
                            display_id(well_id),
                            replaced
                        );
                    }
                }
                info!(
                    "event=well_upsert module=store status=ok well_id={} mode={} count={} duration_ms={}",
                    display_id(well_id),
                    outcome.label(),
                    count,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=well_upsert module=store status=error well_id={} duration_ms={} error={}",
                    display_id(well_id),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Removes every stored record with id `well_id`.
    ///
    /// Both keys are rewritten even when nothing matched.
    pub async fn delete_by_id(&self, well_id: WellId) -> WellStoreResult<()> {
        let started_at = Instant::now();
        let mirror = self.layout.mirrors();
        let result = self
            .prefs
            .edit(move |prefs| -> WellStoreResult<usize> {
                let mut wells = read_wells(prefs)?;
                let before = wells.len();
                wells.retain(|well| !well.matches_id(Some(well_id)));
                write_wells(prefs, &wells, mirror)?;
                Ok(before - wells.len())
            })
            .await;

        match result {
            Ok(removed) => {
                info!(
                    "event=well_delete module=store status=ok well_id={} removed={} duration_ms={}",
                    well_id,
                    removed,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=well_delete module=store status=error well_id={} error={}",
                    well_id, err
                );
                Err(err)
            }
        }
    }

    /// Returns the first stored record with id `well_id`.
    pub async fn get_by_id(&self, well_id: WellId) -> WellStoreResult<Option<WellData>> {
        let snapshot = self.prefs.data();
        let Some(json) = snapshot.get(WELLS_KEY) else {
            debug!("event=well_get module=store status=ok well_id={well_id} found=false");
            return Ok(None);
        };
        let found = decode_wells(WELLS_KEY, json)?
            .into_iter()
            .find(|well| well.matches_id(Some(well_id)));
        debug!(
            "event=well_get module=store status=ok well_id={} found={}",
            well_id,
            found.is_some()
        );
        Ok(found)
    }

    /// Overwrites the observed list key with `records`, order preserved.
    ///
    /// In mirrored layout this leaves `wells` untouched, so the two keys can
    /// drift apart until the next upsert or delete.
    pub async fn save_list(&self, records: Vec<WellData>) -> WellStoreResult<()> {
        let key = self.layout.list_key();
        let count = records.len();
        let encoded = encode_wells(&records)?;
        self.prefs
            .edit(move |prefs| -> WellStoreResult<()> {
                prefs.set(key, encoded);
                Ok(())
            })
            .await?;
        info!("event=well_save_list module=store status=ok key={key} count={count}");
        Ok(())
    }

    /// Removes both collection keys, leaving them absent rather than empty.
    pub async fn reset(&self) -> WellStoreResult<()> {
        self.prefs
            .edit(|prefs| -> WellStoreResult<()> {
                prefs.remove(WELL_LIST_KEY);
                prefs.remove(WELLS_KEY);
                Ok(())
            })
            .await?;
        info!("event=well_reset module=store status=ok");
        Ok(())
    }

    /// Subscribes to the observed list.
    pub fn observe_list(&self) -> WellListWatcher {
        WellListWatcher::new(self.prefs.subscribe(), self.layout.list_key())
    }

    /// Decodes the observed list from the latest snapshot.
    pub fn list_snapshot(&self) -> WellStoreResult<Vec<WellData>> {
        decode_list_or_empty(&self.prefs.data(), self.layout.list_key())
    }
}

impl UpsertOutcome {
    fn label(self) -> &'static str {
        match self {
            Self::Inserted => "insert",
            Self::Replaced(_) => "replace",
        }
    }
}

fn read_wells(prefs: &PreferencesEdit) -> WellStoreResult<Vec<WellData>> {
    match prefs.get(WELLS_KEY) {
        Some(json) => decode_wells(WELLS_KEY, json),
        None => Ok(Vec::new()),
    }
}

fn write_wells(prefs: &mut PreferencesEdit, wells: &[WellData], mirror: bool) -> WellStoreResult<()> {
    let encoded = encode_wells(wells)?;
    if mirror {
        prefs.set(WELL_LIST_KEY, encoded.as_str());
    }
    prefs.set(WELLS_KEY, encoded);
    Ok(())
}

fn upsert_into(wells: &mut Vec<WellData>, well_id: Option<WellId>, record: WellData) -> UpsertOutcome {
    let matching = wells.iter().filter(|well| well.matches_id(well_id)).count();
    if matching == 0 {
        wells.push(record);
        return UpsertOutcome::Inserted;
    }

    for slot in wells.iter_mut().filter(|well| well.matches_id(well_id)) {
        *slot = record.clone();
    }
    UpsertOutcome::Replaced(matching)
}

fn display_id(well_id: Option<WellId>) -> String {
    well_id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::{upsert_into, UpsertOutcome};
    use crate::model::well::WellData;

    fn named(id: Option<i32>, name: &str) -> WellData {
        WellData::new(id).with_field("name", name)
    }

    #[test]
    fn upsert_appends_when_no_match() {
        let mut wells = vec![named(Some(1), "A")];
        let outcome = upsert_into(&mut wells, Some(2), named(Some(2), "B"));
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(wells, vec![named(Some(1), "A"), named(Some(2), "B")]);
    }

    #[test]
    fn upsert_replaces_every_duplicate_in_place() {
        let mut wells = vec![named(Some(1), "A"), named(Some(2), "B"), named(Some(1), "A-dup")];
        let outcome = upsert_into(&mut wells, Some(1), named(Some(1), "A2"));
        assert_eq!(outcome, UpsertOutcome::Replaced(2));
        assert_eq!(
            wells,
            vec![named(Some(1), "A2"), named(Some(2), "B"), named(Some(1), "A2")]
        );
    }

    #[test]
    fn upsert_with_none_id_appends_when_no_anonymous_record_exists() {
        let mut wells = vec![named(Some(1), "A")];
        let outcome = upsert_into(&mut wells, None, named(None, "first"));
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(wells, vec![named(Some(1), "A"), named(None, "first")]);
    }

    #[test]
    fn upsert_with_none_id_replaces_every_anonymous_record() {
        let mut wells = vec![named(None, "first"), named(Some(1), "A"), named(None, "other")];
        let outcome = upsert_into(&mut wells, None, named(None, "second"));
        assert_eq!(outcome, UpsertOutcome::Replaced(2));
        assert_eq!(
            wells,
            vec![named(None, "second"), named(Some(1), "A"), named(None, "second")]
        );
    }
}
