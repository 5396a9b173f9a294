/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Registry of order managers.
//!
//! The registry is an owned table, normally held by the application's
//! top-level context, mapping each (family, category) pair to the single
//! [`OrderManager`] that serves it. Managers are created lazily on first
//! lookup; creation happens under the table's shard lock, so concurrent
//! lookups of the same pair always observe the same instance.

use super::category::OrderCategory;
use super::key::OrderParticipantKey;
use super::manager::OrderManager;
use super::policy::CompactionPolicy;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

type ManagerKey = (String, OrderCategory);

/// Lazily populated table of [`OrderManager`]s, one per (family, category).
///
/// # Examples
///
/// ```
/// use layer_order::{OrderCategory, OrderManagerRegistry};
/// use std::sync::Arc;
///
/// let registry = OrderManagerRegistry::new();
/// let a = registry.get_order_manager("Image.Layer.Family", &OrderCategory::IMAGE_DATA);
/// let b = registry.get_order_manager("Image.Layer.Family", &OrderCategory::IMAGE_DATA);
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct OrderManagerRegistry {
    managers: DashMap<ManagerKey, Arc<OrderManager>>,
    policy: CompactionPolicy,
}

impl OrderManagerRegistry {
    /// Creates an empty registry whose managers use the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose managers use `policy`.
    #[must_use]
    pub fn with_policy(policy: CompactionPolicy) -> Self {
        Self {
            managers: DashMap::new(),
            policy,
        }
    }

    /// Compaction policy given to newly created managers.
    #[must_use]
    pub fn policy(&self) -> CompactionPolicy {
        self.policy
    }

    /// Returns the manager for `(family, category)`, creating it on first use.
    pub fn get_order_manager(&self, family: &str, category: &OrderCategory) -> Arc<OrderManager> {
        let key = (family.to_string(), category.clone());
        if let Some(existing) = self.managers.get(&key) {
            return Arc::clone(existing.value());
        }

        self.warn_on_overlap(family, category);
        let entry = self.managers.entry(key).or_insert_with(|| {
            debug!(family, category = category.name(), policy = ?self.policy, "creating order manager");
            Arc::new(OrderManager::with_policy(family, category.clone(), self.policy))
        });
        Arc::clone(entry.value())
    }

    /// Returns the manager responsible for `key`, creating it on first use.
    pub fn get_order_manager_for(&self, key: &OrderParticipantKey) -> Arc<OrderManager> {
        self.get_order_manager(key.family(), key.category())
    }

    /// Returns the manager for `(family, category)` without creating it.
    #[must_use]
    pub fn existing(&self, family: &str, category: &OrderCategory) -> Option<Arc<OrderManager>> {
        self.managers
            .get(&(family.to_string(), category.clone()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Removes the manager for `(family, category)` from the registry.
    ///
    /// Holders of the returned `Arc` keep a working manager, but later lookups
    /// create a fresh one.
    pub fn dispose(&self, family: &str, category: &OrderCategory) -> Option<Arc<OrderManager>> {
        self.managers
            .remove(&(family.to_string(), category.clone()))
            .map(|(_, manager)| manager)
    }

    /// Number of live managers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Returns `true` if no manager has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Families with at least one live manager, sorted.
    #[must_use]
    pub fn families(&self) -> Vec<String> {
        self.managers
            .iter()
            .map(|entry| entry.key().0.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn warn_on_overlap(&self, family: &str, category: &OrderCategory) {
        for entry in &self.managers {
            let (other_family, other) = entry.key();
            if other_family == family && other != category && other.overlaps(category) {
                warn!(
                    family,
                    category = %category,
                    other = %other,
                    "order category bands overlap within family"
                );
            }
        }
    }
}
