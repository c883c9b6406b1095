//! Flutter-facing bindings for the well store.

pub mod api;
