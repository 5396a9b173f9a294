/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Ordering state of one manager, without locking or dispatch.
//!
//! Every mutating method either fails without touching anything or commits
//! and returns the list of participant transitions it caused. The manager
//! turns a non-empty list into one event.

use super::category::OrderCategory;
use super::error::OrderError;
use super::event::ParticipantChange;
use super::key::OrderParticipantKey;
use super::policy::CompactionPolicy;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Where a deactivated participant returns to when re-activated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    /// It was the bottom participant.
    Bottom,
    /// It sat directly above this participant.
    Above(OrderParticipantKey),
}

pub(crate) struct OrderState {
    family: String,
    category: OrderCategory,
    policy: CompactionPolicy,
    by_order: BTreeMap<i32, OrderParticipantKey>,
    by_key: HashMap<OrderParticipantKey, i32>,
    inactive: HashMap<OrderParticipantKey, Anchor>,
}

type Changes = Vec<ParticipantChange>;

impl OrderState {
    pub(crate) fn new(family: String, category: OrderCategory, policy: CompactionPolicy) -> Self {
        Self {
            family,
            category,
            policy,
            by_order: BTreeMap::new(),
            by_key: HashMap::new(),
            inactive: HashMap::new(),
        }
    }

    pub(crate) fn policy(&self) -> CompactionPolicy {
        self.policy
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn order_of(&self, key: &OrderParticipantKey) -> Option<i32> {
        self.by_key.get(key).copied()
    }

    pub(crate) fn participant_map(&self) -> HashMap<OrderParticipantKey, i32> {
        self.by_key.clone()
    }

    /// Active participants with their values, bottom to top.
    pub(crate) fn snapshot(&self) -> Vec<(OrderParticipantKey, i32)> {
        self.by_order
            .iter()
            .map(|(&value, key)| (key.clone(), value))
            .collect()
    }

    /// Active participants, bottom to top.
    pub(crate) fn ordered(&self) -> Vec<OrderParticipantKey> {
        self.by_order.values().cloned().collect()
    }

    pub(crate) fn top(&self) -> Option<&OrderParticipantKey> {
        self.by_order.values().next_back()
    }

    pub(crate) fn bottom(&self) -> Option<&OrderParticipantKey> {
        self.by_order.values().next()
    }

    pub(crate) fn is_remembered(&self, key: &OrderParticipantKey) -> bool {
        self.inactive.contains_key(key)
    }

    /// Number of unused values between the band minimum and the top value.
    pub(crate) fn gap_count(&self) -> usize {
        match self.by_order.keys().next_back() {
            Some(&top) => {
                let span = (i64::from(top) - i64::from(self.category.min_order()) + 1) as usize;
                span - self.by_order.len()
            }
            None => 0,
        }
    }

    /// Order value of the participant at `rank` in a compact layout.
    fn slot(&self, rank: usize) -> i32 {
        (i64::from(self.category.min_order()) + rank as i64) as i32
    }

    fn is_member(&self, key: &OrderParticipantKey) -> bool {
        key.family() == self.family && key.category() == &self.category
    }

    fn check_membership(&self, key: &OrderParticipantKey) -> Result<(), OrderError> {
        if !self.is_member(key) {
            return Err(OrderError::ForeignParticipant {
                key: key.to_string(),
                family: self.family.clone(),
                category: self.category.name().to_string(),
            });
        }
        Ok(())
    }

    fn check_capacity(&self, additional: usize) -> Result<(), OrderError> {
        let requested = self.len() + additional;
        if requested > self.category.capacity() {
            return Err(OrderError::CapacityExceeded {
                category: self.category.name().to_string(),
                capacity: self.category.capacity(),
                requested,
            });
        }
        Ok(())
    }

    fn not_found(key: &OrderParticipantKey) -> OrderError {
        OrderError::NotFound {
            key: key.to_string(),
        }
    }

    fn insert(&mut self, key: OrderParticipantKey, value: i32) {
        self.by_order.insert(value, key.clone());
        self.by_key.insert(key, value);
    }

    fn remove(&mut self, key: &OrderParticipantKey) -> Option<i32> {
        let value = self.by_key.remove(key)?;
        self.by_order.remove(&value);
        Some(value)
    }

    /// Renumbers `layout` (bottom to top) onto `min, min + 1, ...` and records
    /// a change for every participant whose value differs from before.
    fn relayout(&mut self, layout: Vec<OrderParticipantKey>, changes: &mut Changes) {
        let mut by_order = BTreeMap::new();
        let mut by_key = HashMap::with_capacity(layout.len());
        for (rank, key) in layout.into_iter().enumerate() {
            let value = self.slot(rank);
            let old = self.by_key.get(&key).copied();
            if old != Some(value) {
                changes.push(ParticipantChange::new(key.clone(), old, Some(value)));
            }
            by_order.insert(value, key.clone());
            by_key.insert(key, value);
        }
        self.by_order = by_order;
        self.by_key = by_key;
    }

    fn compact(&mut self, changes: &mut Changes) {
        let layout = self.ordered();
        self.relayout(layout, changes);
    }

    /// First of `count` consecutive free values on top of the active set,
    /// compacting first if the band end would be crossed.
    fn reserve_top(&mut self, count: usize, changes: &mut Changes) -> i32 {
        let next = self
            .by_order
            .keys()
            .next_back()
            .map_or(i64::from(self.category.min_order()), |&top| i64::from(top) + 1);
        let last = next + count as i64 - 1;
        if last > i64::from(self.category.max_order()) {
            self.compact(changes);
            return self.slot(self.len());
        }
        next as i32
    }

    /// Applies the compaction policy after a removal.
    fn settle(&mut self, changes: &mut Changes) {
        if self.policy.must_compact(self.gap_count()) {
            self.compact(changes);
        }
    }

    /// Activates one participant, returning its order value.
    ///
    /// A remembered participant is restored next to its anchor; any other
    /// participant goes on top.
    pub(crate) fn activate(
        &mut self,
        key: &OrderParticipantKey,
    ) -> Result<(i32, Changes), OrderError> {
        self.check_membership(key)?;
        if let Some(value) = self.order_of(key) {
            return Ok((value, Vec::new()));
        }
        self.check_capacity(1)?;

        let mut changes = Vec::new();
        match self.inactive.remove(key) {
            Some(anchor) => {
                let mut layout = self.ordered();
                let rank = match anchor {
                    Anchor::Bottom => 0,
                    Anchor::Above(below) => layout
                        .iter()
                        .position(|k| *k == below)
                        .map_or(layout.len(), |index| index + 1),
                };
                layout.insert(rank, key.clone());
                self.relayout(layout, &mut changes);
            }
            None => {
                let value = self.reserve_top(1, &mut changes);
                self.insert(key.clone(), value);
                changes.push(ParticipantChange::new(key.clone(), None, Some(value)));
            }
        }

        let value = self
            .order_of(key)
            .ok_or_else(|| Self::not_found(key))?;
        Ok((value, changes))
    }

    /// Activates `keys` on top of the active set in the given order.
    ///
    /// Already active keys and duplicates are skipped. Capacity is checked for
    /// the whole batch before anything changes.
    pub(crate) fn activate_all(&mut self, keys: &[OrderParticipantKey]) -> Result<Changes, OrderError> {
        for key in keys {
            self.check_membership(key)?;
        }

        let mut seen = HashSet::with_capacity(keys.len());
        let fresh: Vec<&OrderParticipantKey> = keys
            .iter()
            .filter(|key| !self.by_key.contains_key(*key) && seen.insert(*key))
            .collect();
        if fresh.is_empty() {
            return Ok(Vec::new());
        }
        self.check_capacity(fresh.len())?;

        let mut changes = Vec::new();
        let start = self.reserve_top(fresh.len(), &mut changes);
        for (offset, key) in fresh.into_iter().enumerate() {
            let value = start + offset as i32;
            self.inactive.remove(key);
            self.insert(key.clone(), value);
            changes.push(ParticipantChange::new(key.clone(), None, Some(value)));
        }
        Ok(changes)
    }

    /// Deactivates one participant and remembers its position.
    ///
    /// A key that is not active here, including one of another family or
    /// category, is a no-op.
    pub(crate) fn deactivate(
        &mut self,
        key: &OrderParticipantKey,
    ) -> Result<(Option<i32>, Changes), OrderError> {
        if !self.is_member(key) {
            return Ok((None, Vec::new()));
        }
        let Some(&value) = self.by_key.get(key) else {
            return Ok((None, Vec::new()));
        };

        let anchor = self
            .by_order
            .range(..value)
            .next_back()
            .map_or(Anchor::Bottom, |(_, below)| Anchor::Above(below.clone()));
        self.remove(key);
        self.inactive.insert(key.clone(), anchor);

        let mut changes = vec![ParticipantChange::new(key.clone(), Some(value), None)];
        self.settle(&mut changes);
        Ok((Some(value), changes))
    }

    /// Removes `keys` entirely with a single compaction pass.
    ///
    /// Keys that are inactive but remembered are forgotten without producing
    /// a change; keys of another family or category are never active here and
    /// are skipped. Returns the removed participants' former values in the
    /// order of `keys`.
    pub(crate) fn expunge_all(&mut self, keys: &[OrderParticipantKey]) -> (Vec<Option<i32>>, Changes) {
        let mut removed = Vec::with_capacity(keys.len());
        let mut changes = Vec::new();
        for key in keys {
            self.inactive.remove(key);
            let value = self.remove(key);
            if let Some(value) = value {
                changes.push(ParticipantChange::new(key.clone(), Some(value), None));
            }
            removed.push(value);
        }

        if !changes.is_empty() {
            self.settle(&mut changes);
        }
        (removed, changes)
    }

    /// Moves `key` directly above (`above == true`) or below `reference`.
    pub(crate) fn move_relative(
        &mut self,
        key: &OrderParticipantKey,
        reference: &OrderParticipantKey,
        above: bool,
    ) -> Result<Changes, OrderError> {
        self.check_membership(key)?;
        self.check_membership(reference)?;
        if !self.by_key.contains_key(key) {
            return Err(Self::not_found(key));
        }
        if !self.by_key.contains_key(reference) {
            return Err(OrderError::InvalidReference {
                key: reference.to_string(),
            });
        }
        if key == reference {
            return Ok(Vec::new());
        }

        let mut layout = self.ordered();
        layout.retain(|k| k != key);
        let index = layout
            .iter()
            .position(|k| k == reference)
            .ok_or_else(|| OrderError::InvalidReference {
                key: reference.to_string(),
            })?;
        let rank = if above { index + 1 } else { index };
        layout.insert(rank, key.clone());

        let mut changes = Vec::new();
        self.relayout(layout, &mut changes);
        Ok(changes)
    }

    /// Moves `key` to the top (`to_top == true`) or bottom of the active set.
    pub(crate) fn move_to_extreme(
        &mut self,
        key: &OrderParticipantKey,
        to_top: bool,
    ) -> Result<Changes, OrderError> {
        self.check_membership(key)?;
        if !self.by_key.contains_key(key) {
            return Err(Self::not_found(key));
        }
        let extreme = if to_top { self.top() } else { self.bottom() };
        if extreme == Some(key) {
            return Ok(Vec::new());
        }

        let mut layout = self.ordered();
        layout.retain(|k| k != key);
        if to_top {
            layout.push(key.clone());
        } else {
            layout.insert(0, key.clone());
        }

        let mut changes = Vec::new();
        self.relayout(layout, &mut changes);
        Ok(changes)
    }
}
