//! People attached to events: participants, organizers and speakers.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::EventId;
use super::observer::Observer;

/// A person who can register for events and observe them.
///
/// The delivered-message inbox is shared by all clones of the same
/// participant and is never serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Participant {
    id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact address.
    #[serde(default)]
    pub email: String,
    #[serde(skip)]
    inbox: Arc<Mutex<Vec<String>>>,
}

impl Participant {
    /// Creates a participant with an empty inbox.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            inbox: Arc::default(),
        }
    }

    /// Participant identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Messages delivered so far, oldest first.
    #[must_use]
    pub fn received(&self) -> Vec<String> {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.email == other.email
    }
}

impl Eq for Participant {}

impl Observer for Participant {
    fn observer_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn receive(&self, message: &str) {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        tracing::info!(participant = %self.id, name = %self.name, message, "notification received");
    }
}

/// A participant who also organises events.
///
/// Only the ids of organised events are tracked; the events themselves
/// live in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organizer {
    /// Personal details; also the observer identity.
    pub participant: Participant,
    organized: Vec<EventId>,
}

impl Organizer {
    /// Creates an organizer with no organised events.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            participant: Participant::new(id, name, email),
            organized: Vec::new(),
        }
    }

    /// Records that this organizer runs the given event.
    pub fn add_organized_event(&mut self, event_id: EventId) {
        self.organized.push(event_id);
    }

    /// Ids of the organised events, in the order they were added.
    #[must_use]
    pub fn organized_events(&self) -> &[EventId] {
        &self.organized
    }
}

impl Observer for Organizer {
    fn observer_id(&self) -> &str {
        self.participant.observer_id()
    }

    fn display_name(&self) -> &str {
        self.participant.display_name()
    }

    fn receive(&self, message: &str) {
        self.participant.receive(message);
    }
}

/// A conference speaker. Plain data, owned by exactly one conference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    /// Speaker identity.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Field of expertise.
    #[serde(default)]
    pub specialty: String,
}

impl Speaker {
    /// Creates a speaker.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialty: specialty.into(),
        }
    }
}
