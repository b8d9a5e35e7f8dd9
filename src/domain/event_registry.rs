//! Concurrent event storage with per-event locking.
//!
//! [`EventRegistry`] stores all events in an ordered map where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. The outer lock is
//! held only for the duration of one map operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::EventId;
use super::event::Event;
use crate::error::CatalogError;

/// Shared handle on one stored event.
pub type EventHandle = Arc<RwLock<Event>>;

/// Keyed store of all known events. Event ids are unique.
///
/// The registry is an ordinary value: build one with [`EventRegistry::new`]
/// and share it (typically behind an `Arc`) with whoever needs it. Tests get
/// isolation simply by constructing a fresh instance.
///
/// # Concurrency
///
/// - `add`, `remove`, `find` and the listing operations serialize on the
///   outer map lock.
/// - Mutating one event (e.g. registering a participant) takes only that
///   event's lock.
/// - Iteration order is ascending by id.
#[derive(Debug)]
pub struct EventRegistry {
    events: RwLock<BTreeMap<EventId, EventHandle>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(BTreeMap::new()),
        }
    }

    /// Inserts a new event.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateEvent`] if an event with the same id
    /// is already stored; the stored event is left unchanged.
    pub async fn add(&self, event: Event) -> Result<EventHandle, CatalogError> {
        let id = event.id().clone();
        let mut map = self.events.write().await;
        if map.contains_key(&id) {
            return Err(CatalogError::DuplicateEvent(id));
        }
        tracing::debug!(event_id = %id, kind = event.kind_str(), "event added");
        let handle = Arc::new(RwLock::new(event));
        map.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    /// Looks up an event. Absence is a normal outcome.
    pub async fn find(&self, id: &str) -> Option<EventHandle> {
        self.events.read().await.get(id).cloned()
    }

    /// Removes an event, returning its handle if it was present.
    ///
    /// Removing an unknown id does nothing.
    pub async fn remove(&self, id: &str) -> Option<EventHandle> {
        let removed = self.events.write().await.remove(id);
        if removed.is_some() {
            tracing::info!(event_id = id, "event removed");
        } else {
            tracing::debug!(event_id = id, "remove ignored: unknown event");
        }
        removed
    }

    /// Returns all events whose location equals `location`, ignoring case.
    pub async fn filter_by_location(&self, location: &str) -> Vec<EventHandle> {
        let needle = location.to_lowercase();
        let handles = self.all().await;
        let mut matched = Vec::new();
        for handle in handles {
            if handle.read().await.location().to_lowercase() == needle {
                matched.push(handle);
            }
        }
        matched
    }

    /// Returns handles on every stored event.
    pub async fn all(&self) -> Vec<EventHandle> {
        self.events.read().await.values().cloned().collect()
    }

    /// Returns a copy of every stored event, suitable for persistence.
    pub async fn snapshot(&self) -> Vec<Event> {
        let handles = self.all().await;
        let mut events = Vec::with_capacity(handles.len());
        for handle in handles {
            events.push(handle.read().await.clone());
        }
        events
    }

    /// Returns the ids of all stored events.
    pub async fn ids(&self) -> Vec<EventId> {
        self.events.read().await.keys().cloned().collect()
    }

    /// Returns the number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the registry holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::{Concert, Conference, EventDetails};
    use chrono::{NaiveDate, NaiveDateTime};

    fn date() -> NaiveDateTime {
        let Some(dt) =
            NaiveDate::from_ymd_opt(2025, 8, 15).and_then(|d| d.and_hms_opt(20, 0, 0))
        else {
            panic!("valid date");
        };
        dt
    }

    fn conference(id: &str, name: &str, location: &str) -> Event {
        let Ok(details) = EventDetails::new(id, name, date(), location, 100) else {
            panic!("valid details");
        };
        Conference::new(details, "Topic", Vec::new()).into()
    }

    fn concert(id: &str, location: &str) -> Event {
        let Ok(details) = EventDetails::new(id, "Rock Festival", date(), location, 5000) else {
            panic!("valid details");
        };
        Concert::new(details, "Various Artists", "Rock").into()
    }

    #[tokio::test]
    async fn add_and_find() {
        let registry = EventRegistry::new();
        let result = registry.add(conference("CONF001", "Dev Summit", "Online")).await;
        assert!(result.is_ok());

        let Some(found) = registry.find("CONF001").await else {
            panic!("event should be present");
        };
        assert_eq!(found.read().await.name(), "Dev Summit");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn find_unknown_is_none() {
        let registry = EventRegistry::new();
        assert!(registry.find("NON_EXISTENT_ID").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_is_rejected_and_original_kept() {
        let registry = EventRegistry::new();
        let _ = registry.add(conference("CONF002", "Original", "Offline")).await;

        let result = registry.add(conference("CONF002", "Impostor", "Offline")).await;
        assert!(
            matches!(result, Err(CatalogError::DuplicateEvent(ref id)) if id.as_str() == "CONF002")
        );
        assert_eq!(registry.len().await, 1);

        let Some(stored) = registry.find("CONF002").await else {
            panic!("event should be present");
        };
        assert_eq!(stored.read().await.name(), "Original");
    }

    #[tokio::test]
    async fn remove_present_and_absent() {
        let registry = EventRegistry::new();
        let _ = registry.add(conference("CONF007", "Removal Test", "Hall B")).await;

        assert!(registry.remove("CONF007").await.is_some());
        assert!(registry.find("CONF007").await.is_none());
        assert!(registry.is_empty().await);

        assert!(registry.remove("NON_EXISTENT_ID").await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn filter_by_location_ignores_case() {
        let registry = EventRegistry::new();
        let _ = registry.add(conference("C009", "Local Dev Meetup", "Online")).await;
        let _ = registry.add(conference("C010", "Cloud Computing Conf", "Offline")).await;
        let _ = registry.add(concert("CONC002", "Offline")).await;
        let _ = registry.add(conference("C011", "Remote Work Conf", "Online")).await;

        for query in ["Online", "online", "ONLINE"] {
            let found = registry.filter_by_location(query).await;
            let mut ids = Vec::new();
            for handle in &found {
                ids.push(handle.read().await.id().clone());
            }
            assert_eq!(ids, vec![EventId::from("C009"), EventId::from("C011")]);
        }
        assert_eq!(registry.filter_by_location("offline").await.len(), 2);
        assert!(registry.filter_by_location("Unknown").await.is_empty());
    }

    #[tokio::test]
    async fn filter_on_empty_registry() {
        let registry = EventRegistry::new();
        assert!(registry.filter_by_location("Anywhere").await.is_empty());
    }

    #[tokio::test]
    async fn mutations_through_handle_are_visible() {
        let registry = EventRegistry::new();
        let Ok(handle) = registry.add(conference("C001", "Summit", "Online")).await else {
            panic!("add failed");
        };
        let participant = crate::domain::Participant::new("P001", "Alice", "alice@test.com");
        assert!(handle.write().await.register_participant(participant).is_ok());

        let snapshot = registry.snapshot().await;
        let Some(first) = snapshot.first() else {
            panic!("one event expected");
        };
        assert_eq!(first.details().participants().len(), 1);
    }

    #[tokio::test]
    async fn all_and_ids_are_ordered_by_id() {
        let registry = EventRegistry::new();
        let _ = registry.add(concert("P001", "Stadium")).await;
        let _ = registry.add(conference("C001", "Summit", "Online")).await;
        assert_eq!(registry.ids().await, vec![EventId::from("C001"), EventId::from("P001")]);
        assert_eq!(registry.all().await.len(), 2);
    }

    #[tokio::test]
    async fn separate_instances_are_isolated() {
        let a = EventRegistry::new();
        let b = EventRegistry::default();
        let _ = a.add(conference("C001", "Summit", "Online")).await;
        assert!(b.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_with_same_id_admit_one() {
        const RACERS: usize = 16;
        let registry = Arc::new(EventRegistry::new());
        let tasks: Vec<_> = (0..RACERS)
            .map(|n| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry
                        .add(conference("C001", &format!("Racer {n}"), "Online"))
                        .await
                })
            })
            .collect();

        let mut added = 0_usize;
        let mut duplicates = 0_usize;
        for task in tasks {
            match task.await {
                Ok(Ok(_)) => added += 1,
                Ok(Err(CatalogError::DuplicateEvent(id))) => {
                    assert_eq!(id.as_str(), "C001");
                    duplicates += 1;
                }
                Ok(Err(e)) => panic!("unexpected error: {e}"),
                Err(e) => panic!("task failed: {e}"),
            }
        }
        assert_eq!(added, 1);
        assert_eq!(duplicates, RACERS - 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_add_remove_find_stay_consistent() {
        let registry = Arc::new(EventRegistry::new());
        let tasks: Vec<_> = (0..32_usize)
            .map(|n| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let id = format!("E{n:02}");
                    let _ = registry.add(concert(&id, "Hall")).await;
                    assert!(registry.find(&id).await.is_some());
                    if n % 2 == 0 {
                        assert!(registry.remove(&id).await.is_some());
                        assert!(registry.find(&id).await.is_none());
                    }
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.is_ok());
        }
        assert_eq!(registry.len().await, 16);
    }
}
