/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Core order manager implementation.
//!
//! This module provides the [`OrderManager`] that owns the participant to
//! order value mapping of one (family, category) pair, serializes every
//! structural mutation, and notifies listeners of each committed change with
//! a monotonically numbered event.

use super::category::OrderCategory;
use super::error::OrderError;
use super::event::{ChangeType, ParticipantChange, ParticipantOrderChangeEvent};
use super::key::OrderParticipantKey;
use super::listener::{BroadcastListener, ListenerSet, OrderChangeListener, Subscription};
use super::policy::CompactionPolicy;
use super::state::OrderState;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::thread::{self, ThreadId};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Thread-safe z-order arbiter for one (family, category) pair.
///
/// Mutations run to completion on the calling thread. One exclusive lock is
/// held across the state change and the listener dispatch, so listeners
/// always observe a fully compacted state and no two mutations interleave.
/// The state lock itself is released before dispatch: listeners may call
/// the read operations of the manager that notifies them, but a mutating
/// call from a listener fails with [`OrderError::ReentrantMutation`].
///
/// # Examples
///
/// ```
/// use layer_order::{OrderCategory, OrderManager, OrderParticipantKey};
///
/// # fn example() -> Result<(), layer_order::OrderError> {
/// let category = OrderCategory::new("Image.Data", 0, 9)?;
/// let manager = OrderManager::new("Image.Layer.Family", category.clone());
/// let key = |id: &str| OrderParticipantKey::new("Image.Layer.Family", category.clone(), id);
///
/// manager.activate_participants(&[key("a"), key("b"), key("c")])?;
/// manager.move_below(&key("c"), &key("a"))?;
/// assert_eq!(manager.active_participants(), vec![key("c"), key("a"), key("b")]);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct OrderManager {
    /// Family served by this manager.
    family: String,

    /// Category band served by this manager.
    category: OrderCategory,

    /// Participant mapping; write-locked only while a mutation computes.
    state: RwLock<OrderState>,

    /// Serializes mutations together with their dispatch.
    mutation: Mutex<()>,

    /// Thread currently delivering an event, if any.
    dispatching: Mutex<Option<ThreadId>>,

    /// Registered listeners.
    listeners: Arc<ListenerSet>,

    /// Sequence number of the last emitted event.
    sequence: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OrderManager {
    /// Creates a manager with the default [`CompactionPolicy::Eager`].
    #[must_use]
    pub fn new(family: impl Into<String>, category: OrderCategory) -> Self {
        Self::with_policy(family, category, CompactionPolicy::default())
    }

    /// Creates a manager with an explicit compaction policy.
    ///
    /// # Arguments
    ///
    /// * `family` - Family of every participant this manager accepts
    /// * `category` - Band the order values are drawn from
    /// * `policy` - When removals renumber the remaining participants
    #[must_use]
    pub fn with_policy(
        family: impl Into<String>,
        category: OrderCategory,
        policy: CompactionPolicy,
    ) -> Self {
        let family = family.into();
        Self {
            state: RwLock::new(OrderState::new(family.clone(), category.clone(), policy)),
            family,
            category,
            mutation: Mutex::new(()),
            dispatching: Mutex::new(None),
            listeners: Arc::new(ListenerSet::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Family served by this manager.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Category served by this manager.
    #[must_use]
    pub fn category(&self) -> &OrderCategory {
        &self.category
    }

    /// Compaction policy in effect.
    #[must_use]
    pub fn policy(&self) -> CompactionPolicy {
        self.read().policy()
    }

    fn read(&self) -> RwLockReadGuard<'_, OrderState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OrderState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `operation` against the state and dispatches the resulting
    /// changes, all under the mutation lock.
    fn mutate<R>(
        &self,
        change_type: ChangeType,
        operation: impl FnOnce(&mut OrderState) -> Result<(R, Vec<ParticipantChange>), OrderError>,
    ) -> Result<R, OrderError> {
        if *lock(&self.dispatching) == Some(thread::current().id()) {
            return Err(OrderError::ReentrantMutation {
                family: self.family.clone(),
                category: self.category.name().to_string(),
            });
        }

        let _serial = lock(&self.mutation);
        let (result, changes) = {
            let mut state = self.write();
            operation(&mut *state)?
        };

        if changes.is_empty() {
            trace!(
                family = %self.family,
                category = self.category.name(),
                ?change_type,
                "order operation changed nothing"
            );
            return Ok(result);
        }

        let event = ParticipantOrderChangeEvent {
            sequence_num: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            timestamp_ns: nanos_since_epoch(),
            family: self.family.clone(),
            category: self.category.clone(),
            change_type,
            changes,
        };
        debug!(
            family = %self.family,
            category = self.category.name(),
            sequence = event.sequence_num,
            ?change_type,
            changes = event.changes.len(),
            "participant order changed"
        );
        self.dispatch(&event);
        Ok(result)
    }

    fn dispatch(&self, event: &ParticipantOrderChangeEvent) {
        *lock(&self.dispatching) = Some(thread::current().id());
        self.listeners.notify(event);
        *lock(&self.dispatching) = None;
    }

    /// Activates a participant and returns its order value.
    ///
    /// A new participant is placed on top of the active set. A participant
    /// previously deactivated with
    /// [`deactivate_participant`](Self::deactivate_participant) is restored
    /// directly above the participant it sat on, when that one is still
    /// active. Activating an active participant returns its current value and
    /// notifies nobody.
    ///
    /// # Errors
    ///
    /// - [`OrderError::CapacityExceeded`] if the category band is full
    /// - [`OrderError::ForeignParticipant`] if the key belongs elsewhere
    pub fn activate_participant(&self, key: &OrderParticipantKey) -> Result<i32, OrderError> {
        self.mutate(ChangeType::Activated, |state| state.activate(key))
            .inspect_err(|e| warn!(key = %key, error = %e, "activation failed"))
    }

    /// Activates `keys` on top of the active set, in the given order, with a
    /// single notification.
    ///
    /// Keys already active are left where they are.
    ///
    /// # Errors
    ///
    /// Fails atomically with [`OrderError::CapacityExceeded`] if the whole
    /// batch does not fit, or [`OrderError::ForeignParticipant`] if any key
    /// belongs elsewhere.
    pub fn activate_participants(&self, keys: &[OrderParticipantKey]) -> Result<(), OrderError> {
        self.mutate(ChangeType::Activated, |state| {
            state.activate_all(keys).map(|changes| ((), changes))
        })
        .inspect_err(|e| warn!(count = keys.len(), error = %e, "batch activation failed"))
    }

    /// Removes a participant from the active ordering but remembers where it
    /// sat, and compacts the rest.
    ///
    /// Returns the order value it held, or `None` if it was not active here,
    /// in which case nothing changes. A key of another family or category is
    /// never active here.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::ReentrantMutation`] when called from a listener
    /// of this manager.
    pub fn deactivate_participant(
        &self,
        key: &OrderParticipantKey,
    ) -> Result<Option<i32>, OrderError> {
        self.mutate(ChangeType::Deactivated, |state| state.deactivate(key))
            .inspect(|value| {
                if value.is_none() {
                    warn!(key = %key, "deactivation of a participant that is not active");
                }
            })
    }

    /// Removes a participant entirely and compacts the rest.
    ///
    /// Returns the order value it held immediately before removal, or `None`
    /// if it was not active here, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::ReentrantMutation`] when called from a listener
    /// of this manager.
    pub fn expunge_participant(&self, key: &OrderParticipantKey) -> Result<Option<i32>, OrderError> {
        self.mutate(ChangeType::Expunged, |state| {
            let (mut removed, changes) = state.expunge_all(std::slice::from_ref(key));
            Ok((removed.pop().flatten(), changes))
        })
        .inspect(|value| {
            if value.is_none() {
                warn!(key = %key, "expunge of a participant that is not active");
            }
        })
    }

    /// Removes several participants with one compaction pass and one
    /// notification.
    ///
    /// The final ordering is the same as expunging the keys one at a time in
    /// any order. Keys that are not active here are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::ReentrantMutation`] when called from a listener
    /// of this manager.
    pub fn expunge_participants(&self, keys: &[OrderParticipantKey]) -> Result<(), OrderError> {
        let missing = self.mutate(ChangeType::Expunged, |state| {
            let (removed, changes) = state.expunge_all(keys);
            Ok((removed.iter().filter(|value| value.is_none()).count(), changes))
        })?;
        if missing > 0 {
            warn!(count = keys.len(), missing, "batch expunge skipped participants that are not active");
        }
        Ok(())
    }

    /// Places `key` directly above `reference`, shifting the participants in
    /// between by one slot.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`] if `key` is not active
    /// - [`OrderError::InvalidReference`] if `reference` is not active
    pub fn move_above(
        &self,
        key: &OrderParticipantKey,
        reference: &OrderParticipantKey,
    ) -> Result<(), OrderError> {
        self.mutate(ChangeType::Reordered, |state| {
            state.move_relative(key, reference, true).map(|changes| ((), changes))
        })
        .inspect_err(|e| warn!(key = %key, reference = %reference, error = %e, "move above failed"))
    }

    /// Places `key` directly below `reference`, shifting the participants in
    /// between by one slot.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`] if `key` is not active
    /// - [`OrderError::InvalidReference`] if `reference` is not active
    pub fn move_below(
        &self,
        key: &OrderParticipantKey,
        reference: &OrderParticipantKey,
    ) -> Result<(), OrderError> {
        self.mutate(ChangeType::Reordered, |state| {
            state.move_relative(key, reference, false).map(|changes| ((), changes))
        })
        .inspect_err(|e| warn!(key = %key, reference = %reference, error = %e, "move below failed"))
    }

    /// Moves `key` above every other active participant.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] if `key` is not active.
    pub fn move_to_top(&self, key: &OrderParticipantKey) -> Result<(), OrderError> {
        self.mutate(ChangeType::Reordered, |state| {
            state.move_to_extreme(key, true).map(|changes| ((), changes))
        })
        .inspect_err(|e| warn!(key = %key, error = %e, "move to top failed"))
    }

    /// Moves `key` below every other active participant.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] if `key` is not active.
    pub fn move_to_bottom(&self, key: &OrderParticipantKey) -> Result<(), OrderError> {
        self.mutate(ChangeType::Reordered, |state| {
            state.move_to_extreme(key, false).map(|changes| ((), changes))
        })
        .inspect_err(|e| warn!(key = %key, error = %e, "move to bottom failed"))
    }

    /// Snapshot of every active participant and its order value.
    #[must_use]
    pub fn participant_map(&self) -> HashMap<OrderParticipantKey, i32> {
        self.read().participant_map()
    }

    /// Every active participant with its order value, bottom to top.
    ///
    /// Unlike [`participant_map`](Self::participant_map) the result is
    /// ordered, and it serializes directly with `serde`.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(OrderParticipantKey, i32)> {
        self.read().snapshot()
    }

    /// Active participants, bottom to top.
    #[must_use]
    pub fn active_participants(&self) -> Vec<OrderParticipantKey> {
        self.read().ordered()
    }

    /// Order value of `key`, if active.
    #[must_use]
    pub fn order_of(&self, key: &OrderParticipantKey) -> Option<i32> {
        self.read().order_of(key)
    }

    /// Returns `true` if `key` is active.
    #[must_use]
    pub fn is_active(&self, key: &OrderParticipantKey) -> bool {
        self.order_of(key).is_some()
    }

    /// Returns `true` if `key` was deactivated and will be restored to its
    /// former position on activation.
    #[must_use]
    pub fn is_deactivated(&self, key: &OrderParticipantKey) -> bool {
        self.read().is_remembered(key)
    }

    /// The participant drawn last.
    #[must_use]
    pub fn top_participant(&self) -> Option<OrderParticipantKey> {
        self.read().top().cloned()
    }

    /// The participant drawn first.
    #[must_use]
    pub fn bottom_participant(&self) -> Option<OrderParticipantKey> {
        self.read().bottom().cloned()
    }

    /// Number of active participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no participant is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of unused values below the top participant. Always zero under
    /// [`CompactionPolicy::Eager`].
    #[must_use]
    pub fn gap_count(&self) -> usize {
        self.read().gap_count()
    }

    /// Registers a listener.
    ///
    /// The listener stays attached while the returned [`Subscription`] is
    /// alive.
    ///
    /// # Arguments
    ///
    /// * `listener` - Called synchronously for each committed mutation
    pub fn add_participant_change_listener<L>(&self, listener: L) -> Subscription
    where
        L: OrderChangeListener + 'static,
    {
        self.listeners.subscribe(Arc::new(listener))
    }

    /// Detaches the listener behind `subscription`.
    pub fn remove_participant_change_listener(&self, subscription: Subscription) {
        subscription.unsubscribe();
    }

    /// Registers a [`BroadcastListener`] with a channel of `capacity` events
    /// and returns its subscription and a receiver.
    pub fn subscribe_broadcast(
        &self,
        capacity: NonZeroUsize,
    ) -> (Subscription, broadcast::Receiver<ParticipantOrderChangeEvent>) {
        let (listener, receiver) = BroadcastListener::new(capacity);
        (self.add_participant_change_listener(listener), receiver)
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of listener invocations that panicked so far.
    #[must_use]
    pub fn listener_fault_count(&self) -> u64 {
        self.listeners.fault_count()
    }

    /// Sequence number of the last emitted event, `0` before the first.
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderManager")
            .field("family", &self.family)
            .field("category", &self.category)
            .field("active", &self.len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Returns the current time in nanoseconds since the Unix epoch.
#[inline]
fn nanos_since_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
