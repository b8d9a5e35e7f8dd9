//! Persistence layer: JSON snapshots of the event catalog.
//!
//! Saves the registry's events to a single human-readable file and rebuilds
//! them from it. Observers are runtime wiring and are never persisted.

pub mod json_store;

pub use json_store::{JsonEventStore, load_events, save_events, try_load_events};
