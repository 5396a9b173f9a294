/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Order change events.
//!
//! Every committed mutation of an [`OrderManager`] produces exactly one
//! [`ParticipantOrderChangeEvent`] listing all participants whose order value
//! changed, appeared or disappeared.
//!
//! [`OrderManager`]: super::OrderManager

use super::category::OrderCategory;
use super::key::OrderParticipantKey;
use serde::{Deserialize, Serialize};

/// The logical operation that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    /// Participants were activated. Restoring a deactivated participant may
    /// also shift others.
    Activated,

    /// Participants were deactivated and the rest compacted.
    Deactivated,

    /// Participants were expunged and the rest compacted.
    Expunged,

    /// An explicit move changed relative order.
    Reordered,
}

/// One participant's transition.
///
/// `old_order` is `None` for a newly activated participant and `new_order`
/// is `None` for a removed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantChange {
    /// The participant.
    pub key: OrderParticipantKey,

    /// Order value before the operation.
    pub old_order: Option<i32>,

    /// Order value after the operation.
    pub new_order: Option<i32>,
}

impl ParticipantChange {
    /// Creates a change record.
    #[must_use]
    pub fn new(key: OrderParticipantKey, old_order: Option<i32>, new_order: Option<i32>) -> Self {
        Self {
            key,
            old_order,
            new_order,
        }
    }
}

/// Event emitted after one logical operation on an [`OrderManager`].
///
/// Events of one manager carry monotonically increasing sequence numbers
/// starting at 1, in the order the mutations were committed.
///
/// # Examples
///
/// ```
/// use layer_order::{ChangeType, OrderCategory, ParticipantChange, ParticipantOrderChangeEvent};
/// # use layer_order::OrderParticipantKey;
///
/// # let key = OrderParticipantKey::new("F", OrderCategory::FEATURE, "a");
/// let event = ParticipantOrderChangeEvent {
///     sequence_num: 1,
///     timestamp_ns: 0,
///     family: "F".to_string(),
///     category: OrderCategory::FEATURE,
///     change_type: ChangeType::Activated,
///     changes: vec![ParticipantChange::new(key.clone(), None, Some(300_000))],
/// };
/// assert_eq!(event.new_order(&key), Some(300_000));
/// ```
///
/// [`OrderManager`]: super::OrderManager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantOrderChangeEvent {
    /// Per-manager sequence number.
    pub sequence_num: u64,

    /// Nanosecond timestamp when the mutation was committed.
    pub timestamp_ns: u64,

    /// Family of the emitting manager.
    pub family: String,

    /// Category of the emitting manager.
    pub category: OrderCategory,

    /// What kind of operation this was.
    pub change_type: ChangeType,

    /// All participants affected by the operation.
    pub changes: Vec<ParticipantChange>,
}

impl ParticipantOrderChangeEvent {
    /// Returns the change record for `key`, if the event touched it.
    #[must_use]
    pub fn change_for(&self, key: &OrderParticipantKey) -> Option<&ParticipantChange> {
        self.changes.iter().find(|change| &change.key == key)
    }

    /// Returns `true` if the event touched `key`.
    #[must_use]
    pub fn contains(&self, key: &OrderParticipantKey) -> bool {
        self.change_for(key).is_some()
    }

    /// Order value of `key` after the operation, if the event touched it and
    /// it is still active.
    #[must_use]
    pub fn new_order(&self, key: &OrderParticipantKey) -> Option<i32> {
        self.change_for(key).and_then(|change| change.new_order)
    }

    /// Order value of `key` before the operation, if the event touched it and
    /// it was active.
    #[must_use]
    pub fn old_order(&self, key: &OrderParticipantKey) -> Option<i32> {
        self.change_for(key).and_then(|change| change.old_order)
    }

    /// Number of participants touched.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if no participant was touched.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
