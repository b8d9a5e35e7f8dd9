//! Domain layer: events, participants, observers and the event registry.
//!
//! This module contains the entity model (events with their capacity-bound
//! roster, participants, speakers), the observer capability with its
//! asynchronous delivery tasks, and the registry that keeps event ids
//! unique.

pub mod delivery;
pub mod event;
pub mod event_id;
pub mod event_registry;
pub mod observer;
pub mod participant;

pub use delivery::{DeliveryBatch, DeliveryHandle, DeliveryId, DeliveryOutcome, DeliveryReport};
pub use event::{Concert, Conference, Event, EventDetails};
pub use event_id::EventId;
pub use event_registry::{EventHandle, EventRegistry};
pub use observer::{Observer, ObserverSet};
pub use participant::{Organizer, Participant, Speaker};
