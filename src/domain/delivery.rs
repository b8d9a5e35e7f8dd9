//! Asynchronous, per-observer delivery tasks.
//!
//! [`DeliveryBatch::launch`] spawns one Tokio task per observer and returns
//! at once. Each task waits out the simulated delay, then hands the message
//! to its observer. Callers that need completion keep the batch and call
//! [`DeliveryBatch::wait_all`]; dropping it detaches the tasks.
//!
//! Failures never escape a delivery: interruption, abort and panics are
//! logged and reported as a [`DeliveryOutcome`], not as an error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::EventId;
use super::observer::Observer;

/// Identifier of a single delivery task, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeliveryId(uuid::Uuid);

impl DeliveryId {
    /// Creates a new random `DeliveryId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DeliveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a delivery task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The observer received the message.
    Delivered,
    /// The task was interrupted or aborted before delivery.
    Interrupted,
    /// The task died (e.g. the observer panicked).
    Failed {
        /// Reason reported by the runtime.
        reason: String,
    },
}

/// Final report for one delivery task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Task identifier.
    pub delivery_id: DeliveryId,
    /// Observer the message was addressed to.
    pub observer_id: String,
    /// How the task ended.
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    /// Returns `true` if the message reached its observer.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.outcome == DeliveryOutcome::Delivered
    }
}

/// Awaitable handle on one running delivery.
#[derive(Debug)]
pub struct DeliveryHandle {
    delivery_id: DeliveryId,
    observer_id: String,
    interrupt: Option<oneshot::Sender<()>>,
    task: JoinHandle<DeliveryOutcome>,
}

impl DeliveryHandle {
    /// Task identifier.
    #[must_use]
    pub const fn delivery_id(&self) -> DeliveryId {
        self.delivery_id
    }

    /// Observer this delivery is addressed to.
    #[must_use]
    pub fn observer_id(&self) -> &str {
        &self.observer_id
    }

    /// Asks the task to stop before delivering. The signal is consumed on
    /// first use; later calls do nothing.
    pub fn interrupt(&mut self) {
        if let Some(tx) = self.interrupt.take() {
            let _ = tx.send(());
        }
    }

    /// Cancels the task outright.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Returns `true` once the task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the task and reports its outcome. Never fails.
    pub async fn wait(self) -> DeliveryReport {
        let outcome = match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                tracing::warn!(
                    delivery_id = %self.delivery_id,
                    observer_id = %self.observer_id,
                    "delivery aborted"
                );
                DeliveryOutcome::Interrupted
            }
            Err(e) => {
                tracing::error!(
                    delivery_id = %self.delivery_id,
                    observer_id = %self.observer_id,
                    error = %e,
                    "delivery failed"
                );
                DeliveryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        DeliveryReport {
            delivery_id: self.delivery_id,
            observer_id: self.observer_id,
            outcome,
        }
    }
}

/// The set of deliveries launched by one notification.
#[derive(Debug, Default)]
#[must_use = "dropping the batch detaches its deliveries; call `wait_all` to await them"]
pub struct DeliveryBatch {
    handles: Vec<DeliveryHandle>,
}

impl DeliveryBatch {
    /// Spawns one delivery per observer, in observer order, on the current
    /// Tokio runtime.
    ///
    /// Outside a runtime nothing can be scheduled: the condition is logged
    /// and an empty batch is returned.
    pub fn launch(
        event_id: &EventId,
        observers: &[Arc<dyn Observer>],
        message: &str,
        delay: Duration,
    ) -> Self {
        if observers.is_empty() {
            return Self::default();
        }
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(
                %event_id,
                observers = observers.len(),
                "no async runtime; notifications dropped"
            );
            return Self::default();
        };

        let message: Arc<str> = Arc::from(message);
        let handles = observers
            .iter()
            .map(|observer| {
                let delivery_id = DeliveryId::new();
                let (tx, rx) = oneshot::channel();
                tracing::debug!(
                    %event_id,
                    %delivery_id,
                    observer_id = observer.observer_id(),
                    "delivery scheduled"
                );
                let task = runtime.spawn(deliver(
                    delivery_id,
                    Arc::clone(observer),
                    Arc::clone(&message),
                    delay,
                    rx,
                ));
                DeliveryHandle {
                    delivery_id,
                    observer_id: observer.observer_id().to_string(),
                    interrupt: Some(tx),
                    task,
                }
            })
            .collect();
        Self { handles }
    }

    /// Number of launched deliveries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if nothing was launched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Interrupts every delivery that has not completed yet.
    pub fn interrupt_all(&mut self) {
        for handle in &mut self.handles {
            handle.interrupt();
        }
    }

    /// Appends the deliveries of another batch.
    pub fn extend(&mut self, other: Self) {
        self.handles.extend(other.handles);
    }

    /// Gives up the batch, returning the individual handles.
    #[must_use]
    pub fn into_handles(self) -> Vec<DeliveryHandle> {
        self.handles
    }

    /// Waits for every delivery. Reports come back in launch order.
    pub async fn wait_all(self) -> Vec<DeliveryReport> {
        join_all(self.handles.into_iter().map(DeliveryHandle::wait)).await
    }
}

/// One delivery: sleep, then hand over the message, unless interrupted.
async fn deliver(
    delivery_id: DeliveryId,
    observer: Arc<dyn Observer>,
    message: Arc<str>,
    delay: Duration,
    interrupt: oneshot::Receiver<()>,
) -> DeliveryOutcome {
    // A dropped sender means nobody can interrupt any more, not an interrupt.
    let interrupted = async {
        if interrupt.await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = tokio::time::sleep(delay) => {
            observer.receive(&message);
            tracing::debug!(
                %delivery_id,
                observer_id = observer.observer_id(),
                "delivery completed"
            );
            DeliveryOutcome::Delivered
        }
        () = interrupted => {
            tracing::warn!(
                %delivery_id,
                observer = observer.display_name(),
                "notification was interrupted"
            );
            DeliveryOutcome::Interrupted
        }
    }
}
