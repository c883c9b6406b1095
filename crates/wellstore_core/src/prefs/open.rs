//! Connection bootstrap for the preference database.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Every open emits one `prefs_open` start event and one outcome event.

use super::migrations::apply_migrations;
use super::PrefResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) enum OpenMode<'a> {
    File(&'a Path),
    Memory,
}

impl OpenMode<'_> {
    fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// Opens and bootstraps a connection, logging duration and outcome.
pub(super) fn open_connection(mode: OpenMode<'_>) -> PrefResult<Connection> {
    let started_at = Instant::now();
    let label = mode.label();
    info!("event=prefs_open module=prefs status=start mode={label}");

    let opened = match mode {
        OpenMode::File(path) => Connection::open(path),
        OpenMode::Memory => Connection::open_in_memory(),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=prefs_open module=prefs status=error mode={label} duration_ms={} error_code=prefs_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    if let Err(err) = bootstrap_connection(&mut conn) {
        error!(
            "event=prefs_open module=prefs status=error mode={label} duration_ms={} error_code=prefs_bootstrap_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    info!(
        "event=prefs_open module=prefs status=ok mode={label} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> PrefResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
