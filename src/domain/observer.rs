//! Observer capability and the per-event observer list.
//!
//! Every event owns an [`ObserverSet`]. Observers are shared handles
//! (`Arc<dyn Observer>`) kept in registration order; the same observer may
//! appear more than once and then receives each message once per entry.
//! The set is transient: it is never serialized.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::EventId;
use super::delivery::DeliveryBatch;

/// Simulated delay applied to every delivery unless overridden.
pub const DEFAULT_DELIVERY_DELAY: Duration = Duration::from_secs(2);

/// A party that receives lifecycle messages from an event.
pub trait Observer: fmt::Debug + Send + Sync {
    /// Stable identity of the observer.
    fn observer_id(&self) -> &str;

    /// Human-readable name, used in log lines.
    fn display_name(&self) -> &str;

    /// Accepts a delivered message. Called from a delivery task once the
    /// simulated delay has elapsed.
    fn receive(&self, message: &str);

    /// Returns `true` if `other` denotes the same observer.
    fn same_observer(&self, other: &dyn Observer) -> bool {
        self.observer_id() == other.observer_id() && self.display_name() == other.display_name()
    }
}

/// Ordered list of observers attached to one event.
#[derive(Debug, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn Observer>>,
    delivery_delay: Duration,
}

impl ObserverSet {
    /// Creates an empty set using [`DEFAULT_DELIVERY_DELAY`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            delivery_delay: DEFAULT_DELIVERY_DELAY,
        }
    }

    /// Appends an observer. No uniqueness check is performed.
    pub fn register(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Removes the first entry equal to `observer`.
    ///
    /// Returns `false` (and changes nothing) if it was not registered.
    pub fn unregister(&mut self, observer: &dyn Observer) -> bool {
        let Some(pos) = self
            .observers
            .iter()
            .position(|o| o.same_observer(observer))
        else {
            return false;
        };
        self.observers.remove(pos);
        true
    }

    /// Launches one delivery task per registered observer and returns
    /// immediately with their handles.
    pub fn notify(&self, event_id: &EventId, message: &str) -> DeliveryBatch {
        DeliveryBatch::launch(event_id, &self.observers, message, self.delivery_delay)
    }

    /// Returns the ids of all registered observers, in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.observer_id()).collect()
    }

    /// Iterates over the registered observers.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Observer>> {
        self.observers.iter()
    }

    /// Number of registered entries (duplicates counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if nobody observes the event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Delay each delivery waits before reaching its observer.
    #[must_use]
    pub const fn delivery_delay(&self) -> Duration {
        self.delivery_delay
    }

    /// Overrides the simulated delivery delay.
    pub fn set_delivery_delay(&mut self, delay: Duration) {
        self.delivery_delay = delay;
    }
}

impl Default for ObserverSet {
    fn default() -> Self {
        Self::new()
    }
}
