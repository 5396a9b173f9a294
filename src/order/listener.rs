/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Listener registration and dispatch.
//!
//! Listeners are held for as long as the [`Subscription`] returned at
//! registration is alive. Dispatch is synchronous, on the mutating thread,
//! in registration order. A panicking listener is isolated: the panic is
//! caught and logged, and the remaining listeners still run.

use super::event::ParticipantOrderChangeEvent;
use std::any::Any;
use std::fmt;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::broadcast;
use tracing::{error, trace};

/// Consumer of order change events.
///
/// Implemented for every `Fn(&ParticipantOrderChangeEvent) + Send + Sync`
/// closure.
///
/// Implementations must not call mutating operations on the manager that is
/// notifying them; such calls fail with
/// [`OrderError::ReentrantMutation`](super::OrderError::ReentrantMutation).
/// Read operations are allowed.
pub trait OrderChangeListener: Send + Sync {
    /// Called once per committed mutation.
    fn participant_order_changed(&self, event: &ParticipantOrderChangeEvent);
}

impl<F> OrderChangeListener for F
where
    F: Fn(&ParticipantOrderChangeEvent) + Send + Sync,
{
    fn participant_order_changed(&self, event: &ParticipantOrderChangeEvent) {
        self(event);
    }
}

type SharedListener = Arc<dyn OrderChangeListener>;

/// The listeners of one manager.
pub(crate) struct ListenerSet {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, SharedListener)>>,
    faults: AtomicU64,
}

impl ListenerSet {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
            faults: AtomicU64::new(0),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(u64, SharedListener)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `listener` and returns the handle that keeps it attached.
    pub(crate) fn subscribe(self: &Arc<Self>, listener: SharedListener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().push((id, listener));
        Subscription {
            id,
            set: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }

    pub(crate) fn fault_count(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Delivers `event` to every listener. Returns the number of listeners
    /// that panicked.
    ///
    /// The entry list is snapshotted first so that listeners may subscribe or
    /// drop subscriptions while being notified.
    pub(crate) fn notify(&self, event: &ParticipantOrderChangeEvent) -> usize {
        let snapshot: Vec<(u64, SharedListener)> = self
            .entries()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        let mut failed = 0;
        for (id, listener) in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                listener.participant_order_changed(event);
            }));
            if let Err(payload) = outcome {
                failed += 1;
                self.faults.fetch_add(1, Ordering::Relaxed);
                error!(
                    listener = id,
                    sequence = event.sequence_num,
                    family = %event.family,
                    category = event.category.name(),
                    "order change listener panicked: {}",
                    panic_message(&*payload)
                );
            }
        }
        failed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Handle that keeps a listener attached to its manager.
///
/// Dropping the handle, or calling [`unsubscribe`](Self::unsubscribe),
/// detaches the listener. A handle that outlives its manager is inert.
#[must_use = "dropping a Subscription immediately detaches the listener"]
pub struct Subscription {
    id: u64,
    set: Weak<ListenerSet>,
}

impl Subscription {
    /// Registration id, unique within the manager.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns `true` while the listener is still registered.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.set
            .upgrade()
            .is_some_and(|set| set.entries().iter().any(|(id, _)| *id == self.id))
    }

    /// Detaches the listener.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(set) = self.set.upgrade() {
            set.remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Listener that forwards every event into a `tokio` broadcast channel.
///
/// Sending never blocks; slow receivers observe
/// [`RecvError::Lagged`](tokio::sync::broadcast::error::RecvError::Lagged)
/// instead of holding up the mutating thread.
#[derive(Debug, Clone)]
pub struct BroadcastListener {
    sender: broadcast::Sender<ParticipantOrderChangeEvent>,
}

impl BroadcastListener {
    /// Creates a listener with a channel of `capacity` buffered events and
    /// returns it together with a first receiver.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> (Self, broadcast::Receiver<ParticipantOrderChangeEvent>) {
        let (sender, receiver) = broadcast::channel(capacity.get());
        (Self { sender }, receiver)
    }

    /// Creates another receiver that sees events sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ParticipantOrderChangeEvent> {
        self.sender.subscribe()
    }
}

impl OrderChangeListener for BroadcastListener {
    fn participant_order_changed(&self, event: &ParticipantOrderChangeEvent) {
        if self.sender.send(event.clone()).is_err() {
            trace!(sequence = event.sequence_num, "no broadcast receivers for order event");
        }
    }
}
