//! FFI use-case API for the mobile UI.
//!
//! # Responsibility
//! - Expose well CRUD to Dart via FRB with JSON-string payloads.
//! - Keep error semantics simple: envelopes with `ok` and a message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One store handle per process, opened lazily from `WELLSTORE_*` env.

use log::warn;
use tokio::sync::OnceCell;
use wellstore_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    WellData, WellId, WellStore, WellStoreConfig,
};

static WELL_STORE: OnceCell<WellStore> = OnceCell::const_new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling log files.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result envelope for well mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellActionResponse {
    pub ok: bool,
    /// Human-readable outcome for diagnostics/UI.
    pub message: String,
}

impl WellActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Result envelope for reads; `payload_json` is a record or a JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellQueryResponse {
    pub ok: bool,
    /// `None` when the lookup found nothing or failed.
    pub payload_json: Option<String>,
    pub message: String,
}

impl WellQueryResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            payload_json: None,
            message: message.into(),
        }
    }
}

/// Saves one record, replacing stored records with the same id.
///
/// `well_id = None` always appends.
pub async fn well_save(well_id: Option<WellId>, record_json: String) -> WellActionResponse {
    let record = match WellData::from_json(&record_json) {
        Ok(record) => record,
        Err(err) => return WellActionResponse::failure(format!("well_save invalid record: {err}")),
    };
    let store = match shared_store().await {
        Ok(store) => store,
        Err(message) => return WellActionResponse::failure(message),
    };
    match store.upsert(well_id, record).await {
        Ok(()) => WellActionResponse::success("Well saved."),
        Err(err) => WellActionResponse::failure(format!("well_save failed: {err}")),
    }
}

pub async fn well_delete(well_id: WellId) -> WellActionResponse {
    let store = match shared_store().await {
        Ok(store) => store,
        Err(message) => return WellActionResponse::failure(message),
    };
    match store.delete_by_id(well_id).await {
        Ok(()) => WellActionResponse::success("Well deleted."),
        Err(err) => WellActionResponse::failure(format!("well_delete failed: {err}")),
    }
}

pub async fn well_get(well_id: WellId) -> WellQueryResponse {
    let store = match shared_store().await {
        Ok(store) => store,
        Err(message) => return WellQueryResponse::failure(message),
    };
    let found = match store.get_by_id(well_id).await {
        Ok(found) => found,
        Err(err) => return WellQueryResponse::failure(format!("well_get failed: {err}")),
    };
    match found.map(|well| well.to_json()).transpose() {
        Ok(Some(json)) => WellQueryResponse {
            ok: true,
            payload_json: Some(json),
            message: "Well found.".to_string(),
        },
        Ok(None) => WellQueryResponse {
            ok: true,
            payload_json: None,
            message: "No well with that id.".to_string(),
        },
        Err(err) => WellQueryResponse::failure(format!("well_get encode failed: {err}")),
    }
}

/// Replaces the observed list with a JSON array of records.
pub async fn well_save_list(records_json: String) -> WellActionResponse {
    let records: Vec<WellData> = match serde_json::from_str(&records_json) {
        Ok(records) => records,
        Err(err) => {
            return WellActionResponse::failure(format!("well_save_list invalid list: {err}"))
        }
    };
    let store = match shared_store().await {
        Ok(store) => store,
        Err(message) => return WellActionResponse::failure(message),
    };
    let count = records.len();
    match store.save_list(records).await {
        Ok(()) => WellActionResponse::success(format!("Saved {count} well(s).")),
        Err(err) => WellActionResponse::failure(format!("well_save_list failed: {err}")),
    }
}

pub async fn well_reset() -> WellActionResponse {
    let store = match shared_store().await {
        Ok(store) => store,
        Err(message) => return WellActionResponse::failure(message),
    };
    match store.reset().await {
        Ok(()) => WellActionResponse::success("All well data removed."),
        Err(err) => WellActionResponse::failure(format!("well_reset failed: {err}")),
    }
}

/// Returns the observed list as a JSON array.
pub async fn well_list() -> WellQueryResponse {
    let store = match shared_store().await {
        Ok(store) => store,
        Err(message) => return WellQueryResponse::failure(message),
    };
    let encoded = store
        .list_snapshot()
        .map_err(|err| err.to_string())
        .and_then(|wells| serde_json::to_string(&wells).map_err(|err| err.to_string()));
    match encoded {
        Ok(json) => WellQueryResponse {
            ok: true,
            payload_json: Some(json),
            message: "Well list loaded.".to_string(),
        },
        Err(err) => WellQueryResponse::failure(format!("well_list failed: {err}")),
    }
}

async fn shared_store() -> Result<&'static WellStore, String> {
    WELL_STORE.get_or_try_init(open_shared_store).await
}

async fn open_shared_store() -> Result<WellStore, String> {
    let config = WellStoreConfig::from_env().map_err(|err| format!("well store config: {err}"))?;
    WellStore::open(&config).map_err(|err| {
        warn!("event=ffi_store_open module=ffi status=error error={err}");
        format!("well store open failed: {err}")
    })
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, well_delete, well_get, well_list, well_save,
        well_save_list,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(error.contains("verbose"));
    }

    #[tokio::test]
    async fn well_save_rejects_malformed_record() {
        let response = well_save(Some(1), "{not json".to_string()).await;
        assert!(!response.ok);
        assert!(response.message.contains("invalid record"));
    }

    #[tokio::test]
    async fn well_save_list_rejects_non_array() {
        let response = well_save_list(r#"{"id":1}"#.to_string()).await;
        assert!(!response.ok);
    }

    #[tokio::test]
    async fn well_save_get_delete_flow() {
        let id = unique_id();
        let saved = well_save(Some(id), format!(r#"{{"id":{id},"name":"ffi"}}"#)).await;
        assert!(saved.ok, "{}", saved.message);

        let found = well_get(id).await;
        assert!(found.ok, "{}", found.message);
        let payload: serde_json::Value =
            serde_json::from_str(found.payload_json.as_deref().unwrap()).unwrap();
        assert_eq!(payload["name"], "ffi");

        let listed = well_list().await;
        assert!(listed.ok, "{}", listed.message);

        let deleted = well_delete(id).await;
        assert!(deleted.ok, "{}", deleted.message);
        let missing = well_get(id).await;
        assert!(missing.ok);
        assert!(missing.payload_json.is_none());
    }

    fn unique_id() -> i32 {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .subsec_nanos();
        i32::try_from(nanos).unwrap_or(0) + 1
    }
}
