//! Domain model for well monitoring records.
//!
//! # Responsibility
//! - Define the record shape persisted by the well store.
//! - Keep non-identity fields opaque so payloads round-trip untouched.
//!
//! # Invariants
//! - Only `WellData::id` participates in matching; everything else is payload.

pub mod well;
