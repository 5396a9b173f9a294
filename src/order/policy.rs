/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Compaction policy.

use serde::{Deserialize, Serialize};

/// Controls when removals renumber the remaining participants.
///
/// # Examples
///
/// ```
/// use layer_order::CompactionPolicy;
///
/// assert_eq!(CompactionPolicy::default(), CompactionPolicy::Eager);
/// let policy: CompactionPolicy = serde_json::from_str(r#"{"Tolerant":{"max_gaps":8}}"#).unwrap();
/// assert_eq!(policy, CompactionPolicy::Tolerant { max_gaps: 8 });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompactionPolicy {
    /// Close every gap as soon as it appears. Active values are always
    /// `min, min + 1, ..., min + k - 1`.
    #[default]
    Eager,

    /// Leave holes behind removals until more than `max_gaps` exist, then
    /// close all of them in one pass.
    ///
    /// Relative order is still preserved; only the absolute values differ
    /// from [`Eager`](Self::Eager) while holes are pending.
    Tolerant {
        /// Number of holes allowed below the top participant.
        max_gaps: usize,
    },
}

impl CompactionPolicy {
    /// Returns `true` if `gaps` holes must be closed now.
    #[inline]
    #[must_use]
    pub fn must_compact(&self, gaps: usize) -> bool {
        match self {
            Self::Eager => gaps > 0,
            Self::Tolerant { max_gaps } => gaps > *max_gaps,
        }
    }
}
