//! Service layer: catalog orchestration.
//!
//! Coordinates the event registry, entity operations, status output and
//! snapshot persistence for drivers such as the demo binary.

pub mod catalog_service;

pub use catalog_service::{CatalogService, RestoreSummary};
