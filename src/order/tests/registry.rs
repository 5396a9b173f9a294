/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Tests for the manager registry.

#[cfg(test)]
mod tests {
    use crate::order::{
        CompactionPolicy, OrderCategory, OrderManagerRegistry, OrderParticipantKey, families,
    };
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_one_manager_per_pair() {
        let registry = OrderManagerRegistry::new();

        let image = registry.get_order_manager(families::IMAGE_LAYER_FAMILY, &OrderCategory::IMAGE_DATA);
        let same = registry.get_order_manager(families::IMAGE_LAYER_FAMILY, &OrderCategory::IMAGE_DATA);
        let base = registry.get_order_manager(families::IMAGE_LAYER_FAMILY, &OrderCategory::IMAGE_BASE_MAP);
        let feature = registry.get_order_manager(families::FEATURE_LAYER_FAMILY, &OrderCategory::IMAGE_DATA);

        assert!(Arc::ptr_eq(&image, &same));
        assert!(!Arc::ptr_eq(&image, &base));
        assert!(!Arc::ptr_eq(&image, &feature));
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.families(),
            vec![
                families::FEATURE_LAYER_FAMILY.to_string(),
                families::IMAGE_LAYER_FAMILY.to_string()
            ]
        );
    }

    #[test]
    fn test_concurrent_lookups_yield_single_instance() {
        let registry = Arc::new(OrderManagerRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.get_order_manager(families::ELEVATION_FAMILY, &OrderCategory::ELEVATION)
                })
            })
            .collect();
        let managers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for manager in &managers[1..] {
            assert!(Arc::ptr_eq(&managers[0], manager));
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_by_key_and_existing() {
        let registry = OrderManagerRegistry::new();
        let key = OrderParticipantKey::new(families::FEATURE_LAYER_FAMILY, OrderCategory::FEATURE, "tracks");

        assert!(registry.existing(families::FEATURE_LAYER_FAMILY, &OrderCategory::FEATURE).is_none());

        let manager = registry.get_order_manager_for(&key);
        assert_eq!(manager.family(), families::FEATURE_LAYER_FAMILY);
        assert_eq!(manager.category(), &OrderCategory::FEATURE);
        assert_eq!(manager.activate_participant(&key).unwrap(), 300_000);

        let existing = registry
            .existing(families::FEATURE_LAYER_FAMILY, &OrderCategory::FEATURE)
            .unwrap();
        assert_eq!(existing.order_of(&key), Some(300_000));
    }

    #[test]
    fn test_dispose_creates_fresh_manager_on_next_lookup() {
        let registry = OrderManagerRegistry::new();
        let key = OrderParticipantKey::new("F", OrderCategory::IMAGE_OVERLAY, "a");
        registry.get_order_manager_for(&key).activate_participant(&key).unwrap();

        let disposed = registry.dispose("F", &OrderCategory::IMAGE_OVERLAY).unwrap();
        assert!(registry.is_empty());
        assert!(disposed.is_active(&key));

        let fresh = registry.get_order_manager_for(&key);
        assert!(!Arc::ptr_eq(&disposed, &fresh));
        assert!(fresh.is_empty());
        assert!(registry.dispose("F", &OrderCategory::FEATURE).is_none());
    }

    #[test]
    fn test_registry_policy_applies_to_managers() {
        let policy = CompactionPolicy::Tolerant { max_gaps: 4 };
        let registry = OrderManagerRegistry::with_policy(policy);

        let manager = registry.get_order_manager("F", &OrderCategory::FEATURE);
        assert_eq!(registry.policy(), policy);
        assert_eq!(manager.policy(), policy);
    }
}
