//! Catalog service: orchestrates registry, entities, sink and snapshots.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::observer::DEFAULT_DELIVERY_DELAY;
use crate::domain::{
    DeliveryBatch, Event, EventHandle, EventId, EventRegistry, Observer, Participant,
};
use crate::error::CatalogError;
use crate::persistence::JsonEventStore;
use crate::sink::StatusSink;

/// Outcome of rebuilding the registry from a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Events read from the file.
    pub loaded: usize,
    /// Events inserted into the registry.
    pub added: usize,
    /// Ids skipped because the registry already held them.
    pub skipped: Vec<EventId>,
}

/// Orchestration layer used by drivers.
///
/// Stateless coordinator: owns references to the [`EventRegistry`] for
/// state, a [`JsonEventStore`] for snapshots and a [`StatusSink`] for
/// status lines. Every mutation follows the pattern: look up → lock →
/// mutate → emit status → return result.
#[derive(Debug, Clone)]
pub struct CatalogService {
    registry: Arc<EventRegistry>,
    store: JsonEventStore,
    sink: Arc<dyn StatusSink>,
    delivery_delay: Duration,
}

impl CatalogService {
    /// Creates a new `CatalogService` using [`DEFAULT_DELIVERY_DELAY`].
    #[must_use]
    pub fn new(
        registry: Arc<EventRegistry>,
        store: JsonEventStore,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            registry,
            store,
            sink,
            delivery_delay: DEFAULT_DELIVERY_DELAY,
        }
    }

    /// Sets the delivery delay applied to events added through this service.
    #[must_use]
    pub fn with_delivery_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay = delay;
        self
    }

    /// Returns a reference to the inner [`EventRegistry`].
    #[must_use]
    pub const fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    /// Returns a reference to the snapshot store.
    #[must_use]
    pub const fn store(&self) -> &JsonEventStore {
        &self.store
    }

    /// Adds an event to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateEvent`] if the id is taken.
    pub async fn add_event(&self, mut event: Event) -> Result<EventHandle, CatalogError> {
        event
            .details_mut()
            .observers_mut()
            .set_delivery_delay(self.delivery_delay);
        let name = event.name().to_string();
        let handle = self.registry.add(event).await?;
        self.sink.emit(&format!("Event added: {name}"));
        Ok(handle)
    }

    /// Registers a participant for the given event.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EventNotFound`] if the event is unknown and
    /// [`CatalogError::CapacityExceeded`] if it is full.
    pub async fn register_participant(
        &self,
        event_id: &str,
        participant: Participant,
    ) -> Result<(), CatalogError> {
        let handle = self.lookup(event_id).await?;
        let mut event = handle.write().await;
        let who = participant.name.clone();
        event.register_participant(participant)?;
        self.sink.emit(&format!("{who} registered for {}", event.name()));
        Ok(())
    }

    /// Attaches an observer to the given event.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EventNotFound`] if the event is unknown.
    pub async fn observe(
        &self,
        event_id: &str,
        observer: Arc<dyn Observer>,
    ) -> Result<(), CatalogError> {
        let handle = self.lookup(event_id).await?;
        let mut event = handle.write().await;
        let line = format!(
            "{} is now observing {}",
            observer.display_name(),
            event.name()
        );
        event.register_observer(observer);
        self.sink.emit(&line);
        Ok(())
    }

    /// Cancels the given event and returns the launched deliveries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EventNotFound`] if the event is unknown.
    pub async fn cancel_event(&self, event_id: &str) -> Result<DeliveryBatch, CatalogError> {
        let handle = self.lookup(event_id).await?;
        let event = handle.read().await;
        self.sink.emit(&format!("Event {} has been cancelled.", event.name()));
        Ok(event.cancel())
    }

    /// Emits and returns the description of every event.
    pub async fn describe_all(&self) -> Vec<String> {
        let mut descriptions = Vec::new();
        for handle in self.registry.all().await {
            let text = handle.read().await.describe();
            self.sink.emit(&text);
            descriptions.push(text);
        }
        descriptions
    }

    /// Writes the current registry content to the snapshot file.
    ///
    /// Returns the number of events written.
    ///
    /// # Errors
    ///
    /// Returns the persistence error unchanged; no rollback is attempted.
    pub async fn save_snapshot(&self) -> Result<usize, CatalogError> {
        let events = self.registry.snapshot().await;
        self.store.save(&events)?;
        self.sink.emit(&format!("Events saved to {}", self.store.path().display()));
        Ok(events.len())
    }

    /// Loads the snapshot file and adds every event it contains.
    ///
    /// Unreadable files count as empty. Events whose id is already present
    /// are skipped and reported.
    pub async fn restore_snapshot(&self) -> RestoreSummary {
        let events = self.store.load();
        let mut summary = RestoreSummary {
            loaded: events.len(),
            ..RestoreSummary::default()
        };
        self.sink.emit(&format!(
            "Loaded {} events from {}",
            summary.loaded,
            self.store.path().display()
        ));
        for event in events {
            match self.add_event(event).await {
                Ok(_) => summary.added = summary.added.saturating_add(1),
                Err(CatalogError::DuplicateEvent(id)) => {
                    self.sink.emit(&format!("Skipping duplicate event: {id}"));
                    summary.skipped.push(id);
                }
                Err(e) => tracing::warn!(error = %e, "event not restored"),
            }
        }
        summary
    }

    async fn lookup(&self, event_id: &str) -> Result<EventHandle, CatalogError> {
        self.registry
            .find(event_id)
            .await
            .ok_or_else(|| CatalogError::EventNotFound(EventId::from(event_id)))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Concert, Conference, EventDetails, Speaker};
    use crate::sink::MemorySink;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date() -> NaiveDateTime {
        let Some(dt) =
            NaiveDate::from_ymd_opt(2025, 7, 10).and_then(|d| d.and_hms_opt(9, 0, 0))
        else {
            panic!("valid date");
        };
        dt
    }

    fn conference(capacity: i64) -> Event {
        let Ok(details) =
            EventDetails::new("C001", "AI Future Summit", date(), "Online", capacity)
        else {
            panic!("valid details");
        };
        Conference::new(
            details,
            "Future of AI",
            vec![Speaker::new("S001", "Dr. Chana", "AI Danger")],
        )
        .into()
    }

    fn concert() -> Event {
        let Ok(details) =
            EventDetails::new("P001", "Summer Beats", date(), "Olembe Stadium", 5000)
        else {
            panic!("valid details");
        };
        Concert::new(details, "Beyonce", "POP").into()
    }

    fn service(dir: &tempfile::TempDir) -> (CatalogService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let svc = CatalogService::new(
            Arc::new(EventRegistry::new()),
            JsonEventStore::new(dir.path().join("events.json")),
            Arc::clone(&sink) as Arc<dyn StatusSink>,
        )
        .with_delivery_delay(Duration::from_millis(50));
        (svc, sink)
    }

    #[tokio::test]
    async fn add_event_emits_status_and_rejects_duplicates() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let (svc, sink) = service(&dir);
        assert!(svc.add_event(conference(5)).await.is_ok());
        let dup = svc.add_event(conference(5)).await;
        assert!(matches!(dup, Err(CatalogError::DuplicateEvent(_))));
        assert_eq!(sink.lines(), vec!["Event added: AI Future Summit".to_string()]);
    }

    #[tokio::test]
    async fn register_participant_by_id() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let (svc, sink) = service(&dir);
        let _ = svc.add_event(conference(1)).await;

        let first = svc
            .register_participant("C001", Participant::new("P001", "Raoul", "raoul@example.com"))
            .await;
        assert!(first.is_ok());
        let second = svc
            .register_participant("C001", Participant::new("P002", "Pierre", "pierre@example.com"))
            .await;
        assert!(matches!(second, Err(CatalogError::CapacityExceeded { .. })));

        let missing = svc
            .register_participant("NOPE", Participant::new("P003", "Rene", "rene@example.com"))
            .await;
        assert!(matches!(missing, Err(CatalogError::EventNotFound(_))));
        assert!(sink.lines().contains(&"Raoul registered for AI Future Summit".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_event_delivers_to_observers() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let (svc, sink) = service(&dir);
        let _ = svc.add_event(conference(5)).await;
        let p1 = Arc::new(Participant::new("P001", "Raoul", "raoul@example.com"));
        assert!(svc.observe("C001", Arc::clone(&p1) as Arc<dyn Observer>).await.is_ok());

        let Ok(batch) = svc.cancel_event("C001").await else {
            panic!("cancel failed");
        };
        assert_eq!(batch.len(), 1);
        let reports = batch.wait_all().await;
        assert!(reports.iter().all(|r| r.is_delivered()));
        assert_eq!(p1.received().len(), 1);
        assert!(sink.lines().contains(&"Event AI Future Summit has been cancelled.".to_string()));

        assert!(matches!(svc.cancel_event("NOPE").await, Err(CatalogError::EventNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn each_status_line_is_emitted_once() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let (svc, sink) = service(&dir);
        let _ = svc.add_event(conference(5)).await;
        let p1 = Arc::new(Participant::new("P001", "Raoul", "raoul@example.com"));
        let _ = svc.register_participant("C001", Participant::clone(&p1)).await;
        let _ = svc.observe("C001", Arc::clone(&p1) as Arc<dyn Observer>).await;
        let Ok(batch) = svc.cancel_event("C001").await else {
            panic!("cancel failed");
        };
        let _ = batch.wait_all().await;

        assert_eq!(
            sink.lines(),
            vec![
                "Event added: AI Future Summit".to_string(),
                "Raoul registered for AI Future Summit".to_string(),
                "Raoul is now observing AI Future Summit".to_string(),
                "Event AI Future Summit has been cancelled.".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn describe_all_emits_each_event() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let (svc, sink) = service(&dir);
        let _ = svc.add_event(conference(5)).await;
        let _ = svc.add_event(concert()).await;
        let descriptions = svc.describe_all().await;
        assert_eq!(descriptions.len(), 2);
        assert!(sink.lines().iter().any(|l| l.contains("Artist: Beyonce")));
    }

    #[tokio::test]
    async fn save_then_restore_into_fresh_registry() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let (svc, _sink) = service(&dir);
        let _ = svc.add_event(conference(5)).await;
        let _ = svc.add_event(concert()).await;
        assert!(matches!(svc.save_snapshot().await, Ok(2)));

        let (fresh, _sink) = service(&dir);
        let summary = fresh.restore_snapshot().await;
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.added, 2);
        assert!(summary.skipped.is_empty());
        assert_eq!(fresh.registry().snapshot().await, svc.registry().snapshot().await);

        let again = fresh.restore_snapshot().await;
        assert_eq!(again.added, 0);
        assert_eq!(again.skipped, vec![EventId::from("C001"), EventId::from("P001")]);
    }

    #[tokio::test]
    async fn restore_without_file_is_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let (svc, _sink) = service(&dir);
        let summary = svc.restore_snapshot().await;
        assert_eq!(summary, RestoreSummary::default());
        assert!(svc.registry().is_empty().await);
    }
}
