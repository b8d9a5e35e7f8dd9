//! Events: the common roster/observer core and the closed set of variants.
//!
//! [`Event`] is a tagged sum of [`Conference`] and [`Concert`]. Both embed an
//! [`EventDetails`] holding identity, schedule, capacity, the participant
//! roster and the (transient) observer list. On the wire the variant is
//! selected by the `"type"` discriminator and the details are flattened into
//! the same JSON object.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::EventId;
use super::delivery::DeliveryBatch;
use super::observer::{Observer, ObserverSet};
use super::participant::{Participant, Speaker};
use crate::error::CatalogError;

/// Fields and behaviour shared by every event variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    id: EventId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Start date and time (local, no zone).
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDateTime,
    /// Venue; matched case-insensitively by location filters.
    #[serde(default)]
    pub location: String,
    /// Maximum number of registered participants.
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(skip)]
    observers: ObserverSet,
}

impl EventDetails {
    /// Creates the common part of an event.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCapacity`] if `capacity` is negative
    /// or does not fit in a `u32`.
    pub fn new(
        id: impl Into<EventId>,
        name: impl Into<String>,
        date: NaiveDateTime,
        location: impl Into<String>,
        capacity: i64,
    ) -> Result<Self, CatalogError> {
        let capacity =
            u32::try_from(capacity).map_err(|_| CatalogError::InvalidCapacity(capacity))?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            date,
            location: location.into(),
            capacity,
            participants: Vec::new(),
            observers: ObserverSet::new(),
        })
    }

    /// Event identity.
    #[must_use]
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    /// Registered participants, in registration order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Returns `true` when no further participant can register.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.capacity as usize
    }

    /// Appends a participant to the roster.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CapacityExceeded`] if the roster already
    /// holds `capacity` participants; the roster is left untouched.
    pub fn register_participant(&mut self, participant: Participant) -> Result<(), CatalogError> {
        if self.is_full() {
            return Err(CatalogError::CapacityExceeded {
                event: self.id.clone(),
                capacity: self.capacity,
            });
        }
        tracing::debug!(
            event_id = %self.id,
            participant_id = participant.id(),
            "participant registered"
        );
        self.participants.push(participant);
        Ok(())
    }

    /// Removes the first registered participant with the given id.
    pub fn remove_participant(&mut self, participant_id: &str) -> Option<Participant> {
        let pos = self
            .participants
            .iter()
            .position(|p| p.id() == participant_id)?;
        Some(self.participants.remove(pos))
    }

    /// Observers currently attached to this event.
    #[must_use]
    pub const fn observers(&self) -> &ObserverSet {
        &self.observers
    }

    /// Mutable access to the observer list (e.g. to tune the delay).
    pub fn observers_mut(&mut self) -> &mut ObserverSet {
        &mut self.observers
    }

    /// Attaches an observer. The same observer may be attached twice.
    pub fn register_observer(&mut self, observer: Arc<dyn Observer>) {
        tracing::debug!(
            event_id = %self.id,
            observer_id = observer.observer_id(),
            "observer attached"
        );
        self.observers.register(observer);
    }

    /// Detaches the first matching observer; unknown observers are ignored.
    pub fn unregister_observer(&mut self, observer: &dyn Observer) -> bool {
        let removed = self.observers.unregister(observer);
        if removed {
            tracing::debug!(
                event_id = %self.id,
                observer_id = observer.observer_id(),
                "observer detached"
            );
        }
        removed
    }

    /// Fans `message` out to every observer without waiting for delivery.
    pub fn notify_observers(&self, message: &str) -> DeliveryBatch {
        tracing::debug!(
            event_id = %self.id,
            observers = self.observers.len(),
            "notifying observers"
        );
        self.observers.notify(&self.id, message)
    }

    /// Announces the cancellation to all observers.
    ///
    /// No cancelled state is recorded; the event stays as it was.
    pub fn cancel(&self) -> DeliveryBatch {
        tracing::debug!(event_id = %self.id, "cancellation announced");
        self.notify_observers(&cancellation_message(&self.name))
    }
}

// Observers are runtime wiring, not data.
impl PartialEq for EventDetails {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.date == other.date
            && self.location == other.location
            && self.capacity == other.capacity
            && self.participants == other.participants
    }
}

/// Accepts ISO-8601 local date-times with or without the seconds field
/// (`2025-08-15T20:00:00` and `2025-08-15T20:00`).
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M"))
        .map_err(serde::de::Error::custom)
}

/// Message delivered to observers when an event is cancelled.
#[must_use]
pub fn cancellation_message(event_name: &str) -> String {
    format!("Event '{event_name}' has been cancelled.")
}

/// A conference with a theme and a speaker line-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    /// Common event fields.
    #[serde(flatten)]
    pub details: EventDetails,
    /// Conference theme.
    #[serde(default)]
    pub theme: String,
    /// Speakers, in programme order.
    #[serde(default)]
    pub speakers: Vec<Speaker>,
}

impl Conference {
    /// Creates a conference.
    #[must_use]
    pub fn new(details: EventDetails, theme: impl Into<String>, speakers: Vec<Speaker>) -> Self {
        Self {
            details,
            theme: theme.into(),
            speakers,
        }
    }
}

/// A concert by one artist in one genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concert {
    /// Common event fields.
    #[serde(flatten)]
    pub details: EventDetails,
    /// Performing artist.
    #[serde(default)]
    pub artist: String,
    /// Musical genre.
    #[serde(default)]
    pub genre: String,
}

impl Concert {
    /// Creates a concert.
    #[must_use]
    pub fn new(details: EventDetails, artist: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            details,
            artist: artist.into(),
            genre: genre.into(),
        }
    }
}

/// Any event held by the catalog.
///
/// Serialized with a `"type"` discriminator (`"conference"` or
/// `"concert"`); unknown discriminators are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A conference.
    Conference(Conference),
    /// A concert.
    Concert(Concert),
}

impl Event {
    /// Shared event fields.
    #[must_use]
    pub const fn details(&self) -> &EventDetails {
        match self {
            Self::Conference(c) => &c.details,
            Self::Concert(c) => &c.details,
        }
    }

    /// Mutable shared event fields.
    pub fn details_mut(&mut self) -> &mut EventDetails {
        match self {
            Self::Conference(c) => &mut c.details,
            Self::Concert(c) => &mut c.details,
        }
    }

    /// Event identity.
    #[must_use]
    pub const fn id(&self) -> &EventId {
        self.details().id()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.details().name
    }

    /// Venue.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.details().location
    }

    /// Returns the discriminator as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Conference(_) => "conference",
            Self::Concert(_) => "concert",
        }
    }

    /// See [`EventDetails::register_participant`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CapacityExceeded`] if the event is full.
    pub fn register_participant(&mut self, participant: Participant) -> Result<(), CatalogError> {
        self.details_mut().register_participant(participant)
    }

    /// See [`EventDetails::register_observer`].
    pub fn register_observer(&mut self, observer: Arc<dyn Observer>) {
        self.details_mut().register_observer(observer);
    }

    /// See [`EventDetails::unregister_observer`].
    pub fn unregister_observer(&mut self, observer: &dyn Observer) -> bool {
        self.details_mut().unregister_observer(observer)
    }

    /// See [`EventDetails::notify_observers`].
    pub fn notify_observers(&self, message: &str) -> DeliveryBatch {
        self.details().notify_observers(message)
    }

    /// See [`EventDetails::cancel`].
    pub fn cancel(&self) -> DeliveryBatch {
        self.details().cancel()
    }

    /// Human-readable multi-line summary.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl From<Conference> for Event {
    fn from(conference: Conference) -> Self {
        Self::Conference(conference)
    }
}

impl From<Concert> for Event {
    fn from(concert: Concert) -> Self {
        Self::Concert(concert)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.details();
        let title = match self {
            Self::Conference(_) => "Conference",
            Self::Concert(_) => "Concert",
        };
        writeln!(f, "--- {title} Details ---")?;
        writeln!(f, "ID: {}", d.id)?;
        writeln!(f, "Name: {}", d.name)?;
        writeln!(f, "Date: {}", d.date.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "Location: {}", d.location)?;
        writeln!(f, "Capacity: {}", d.capacity)?;
        match self {
            Self::Conference(c) => {
                writeln!(f, "Theme: {}", c.theme)?;
                writeln!(f, "Speakers:")?;
                if c.speakers.is_empty() {
                    writeln!(f, "  No speakers listed.")?;
                }
                for s in &c.speakers {
                    writeln!(f, "  - {} ({})", s.name, s.specialty)?;
                }
            }
            Self::Concert(c) => {
                writeln!(f, "Artist: {}", c.artist)?;
                writeln!(f, "Genre: {}", c.genre)?;
            }
        }
        write!(f, "Registered Participants: {}", d.participants.len())
    }
}
