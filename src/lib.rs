//! # event-catalog
//!
//! Catalog of scheduled events (conferences, concerts) with capacity-bound
//! participant registration, asynchronous cancellation notices and JSON
//! snapshots.
//!
//! The crate holds the core only: entities, observers and their delivery
//! tasks, the registry, and the persistence gateway. Console output,
//! argument handling and process lifetime belong to the driver (see the
//! `event-catalog` binary).
//!
//! ## Architecture
//!
//! ```text
//! Driver (binary, tests)
//!     │
//!     ├── CatalogService (service/) ── StatusSink (sink)
//!     │
//!     ├── EventRegistry (domain/)
//!     ├── Event / Participant / Speaker (domain/)
//!     ├── ObserverSet → DeliveryBatch (domain/)
//!     │
//!     └── JSON snapshot file (persistence/)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod sink;
