//! Catalog error types with stable numeric codes.
//!
//! [`CatalogError`] is the central error type for the crate. Business-rule
//! violations (duplicate id, full event) are synchronous and recoverable;
//! persistence failures carry the offending path and the underlying cause.

use std::path::PathBuf;

use crate::domain::EventId;

/// Crate-wide error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category        |
/// |-----------|-----------------|
/// | 1000–1999 | Validation      |
/// | 2000–2999 | State/Not Found |
/// | 3000–3999 | Persistence     |
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// An event with the same id is already held by the registry.
    #[error("event {0} already exists")]
    DuplicateEvent(EventId),

    /// The event roster already holds `capacity` participants.
    #[error("capacity reached for event {event} (max {capacity})")]
    CapacityExceeded {
        /// Event that rejected the registration.
        event: EventId,
        /// Maximum capacity of the event.
        capacity: u32,
    },

    /// Capacity given at construction time is negative or out of range.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(i64),

    /// No event with the given id is held by the registry.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Reading or writing the snapshot file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not a valid event document.
    #[error("malformed event document {}: {source}", path.display())]
    MalformedDocument {
        /// File being parsed (or written).
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidCapacity(_) => 1001,
            Self::DuplicateEvent(_) => 2001,
            Self::EventNotFound(_) => 2002,
            Self::CapacityExceeded { .. } => 2003,
            Self::Io { .. } => 3001,
            Self::MalformedDocument { .. } => 3002,
        }
    }

    /// Returns `true` for errors raised by the persistence gateway.
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::MalformedDocument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_ranges() {
        assert_eq!(CatalogError::InvalidCapacity(-1).error_code(), 1001);
        assert_eq!(
            CatalogError::DuplicateEvent(EventId::from("C001")).error_code(),
            2001
        );
        let full = CatalogError::CapacityExceeded {
            event: EventId::from("C001"),
            capacity: 5,
        };
        assert_eq!(full.error_code(), 2003);
        assert!(!full.is_persistence());
    }

    #[test]
    fn io_error_mentions_path() {
        let err = CatalogError::Io {
            path: PathBuf::from("/tmp/events.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/events.json"));
        assert!(msg.contains("denied"));
        assert!(err.is_persistence());
    }

    #[test]
    fn capacity_message_names_event() {
        let err = CatalogError::CapacityExceeded {
            event: EventId::from("C001"),
            capacity: 5,
        };
        assert_eq!(err.to_string(), "capacity reached for event C001 (max 5)");
    }
}
