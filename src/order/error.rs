/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Error types for the ordering engine.

use thiserror::Error;

/// Errors that can occur when mutating an [`OrderManager`].
///
/// None of these leave the manager in a partially modified state: a failed
/// operation changes nothing and notifies nobody.
///
/// [`OrderManager`]: super::OrderManager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Activation would need more order values than the category band holds.
    #[error("category {category} exhausted: capacity {capacity}, requested {requested}")]
    CapacityExceeded {
        /// Name of the category whose band is full.
        category: String,
        /// Number of slots in the band.
        capacity: usize,
        /// Number of active participants the operation would have produced.
        requested: usize,
    },

    /// The participant is not active in the manager.
    #[error("participant {key} is not active")]
    NotFound {
        /// Display form of the missing key.
        key: String,
    },

    /// The reference participant of a relative move is not active.
    #[error("reference participant {key} is not active")]
    InvalidReference {
        /// Display form of the missing reference key.
        key: String,
    },

    /// The key belongs to a different family or category than the manager.
    #[error("participant {key} does not belong to family {family} / category {category}")]
    ForeignParticipant {
        /// Display form of the rejected key.
        key: String,
        /// Family of the manager.
        family: String,
        /// Category name of the manager.
        category: String,
    },

    /// A category was constructed with `min > max`.
    #[error("invalid order range for category {name}: [{min}, {max}]")]
    InvalidRange {
        /// Category name.
        name: String,
        /// Requested minimum.
        min: i32,
        /// Requested maximum.
        max: i32,
    },

    /// A listener tried to mutate the manager that is notifying it.
    #[error("re-entrant mutation of order manager {family} / {category} from a listener")]
    ReentrantMutation {
        /// Family of the manager.
        family: String,
        /// Category name of the manager.
        category: String,
    },
}

impl OrderError {
    /// Returns `true` for the errors callers may treat as idempotent no-ops:
    /// [`NotFound`](Self::NotFound) and [`InvalidReference`](Self::InvalidReference).
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidReference { .. })
    }
}
