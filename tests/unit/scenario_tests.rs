use layer_order::{OrderCategory, OrderManager, OrderParticipantKey};

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILY: &str = "Image.Layer.Family";

    fn zero_gap_category() -> OrderCategory {
        OrderCategory::new("Image.Data", 0, 999).unwrap()
    }

    fn keys(category: &OrderCategory, count: usize) -> Vec<OrderParticipantKey> {
        (1..=count)
            .map(|i| OrderParticipantKey::new(FAMILY, category.clone(), format!("k{i}")))
            .collect()
    }

    fn assert_orders(manager: &OrderManager, expected: &[(&OrderParticipantKey, i32)]) {
        let map = manager.participant_map();
        assert_eq!(map.len(), expected.len());
        for (key, value) in expected {
            assert_eq!(map.get(*key), Some(value), "order of {key}");
        }
    }

    // --- Activate, expunge, batch activate, batch expunge ---

    #[test]
    fn test_activation_and_expunge_scenario() {
        let category = zero_gap_category();
        let manager = OrderManager::new(FAMILY, category.clone());
        let k = keys(&category, 6);

        for (expected, key) in k[..5].iter().enumerate() {
            assert_eq!(manager.activate_participant(key).unwrap(), expected as i32);
        }

        assert_eq!(manager.expunge_participant(&k[1]).unwrap(), Some(1));
        assert_orders(&manager, &[(&k[0], 0), (&k[2], 1), (&k[3], 2), (&k[4], 3)]);

        manager
            .activate_participants(&[k[1].clone(), k[5].clone()])
            .unwrap();
        assert_orders(
            &manager,
            &[(&k[0], 0), (&k[2], 1), (&k[3], 2), (&k[4], 3), (&k[1], 4), (&k[5], 5)],
        );

        manager
            .expunge_participants(&[k[0].clone(), k[3].clone()])
            .unwrap();
        assert_orders(&manager, &[(&k[2], 0), (&k[4], 1), (&k[1], 2), (&k[5], 3)]);
    }

    // --- moveAbove / moveToTop ---

    #[test]
    fn test_move_scenario() {
        let category = zero_gap_category();
        let manager = OrderManager::new(FAMILY, category.clone());
        let k = keys(&category, 4);
        manager.activate_participants(&k).unwrap();
        assert_orders(&manager, &[(&k[0], 0), (&k[1], 1), (&k[2], 2), (&k[3], 3)]);

        manager.move_above(&k[1], &k[2]).unwrap();
        assert_orders(&manager, &[(&k[0], 0), (&k[2], 1), (&k[1], 2), (&k[3], 3)]);

        manager.move_to_top(&k[1]).unwrap();
        assert_orders(&manager, &[(&k[0], 0), (&k[2], 1), (&k[3], 2), (&k[1], 3)]);

        manager.move_above(&k[1], &k[0]).unwrap();
        assert_orders(&manager, &[(&k[0], 0), (&k[1], 1), (&k[2], 2), (&k[3], 3)]);
    }

    // --- Properties ---

    #[test]
    fn test_single_expunge_preserves_pairwise_order() {
        let category = zero_gap_category();
        let k = keys(&category, 8);

        for removed in 0..k.len() {
            let manager = OrderManager::new(FAMILY, category.clone());
            manager.activate_participants(&k).unwrap();
            // scramble a little so order differs from activation order
            manager.move_to_top(&k[2]).unwrap();
            manager.move_below(&k[6], &k[1]).unwrap();
            let before = manager.participant_map();

            manager.expunge_participant(&k[removed]).unwrap();
            let after = manager.participant_map();

            for a in after.keys() {
                for b in after.keys() {
                    assert_eq!(before[a] < before[b], after[a] < after[b]);
                }
            }
        }
    }

    #[test]
    fn test_compaction_contiguity_from_band_minimum() {
        let category = OrderCategory::new("Offset", 500, 599).unwrap();
        let manager = OrderManager::new(FAMILY, category.clone());
        let k = keys(&category, 10);
        manager.activate_participants(&k).unwrap();

        manager
            .expunge_participants(&[k[0].clone(), k[4].clone(), k[9].clone()])
            .unwrap();
        manager.expunge_participant(&k[5]).unwrap();

        let mut values: Vec<i32> = manager.participant_map().into_values().collect();
        values.sort_unstable();
        assert_eq!(values, (500..506).collect::<Vec<_>>());
    }

    #[test]
    fn test_move_above_only_shifts_range_between() {
        let category = zero_gap_category();
        let manager = OrderManager::new(FAMILY, category.clone());
        let k = keys(&category, 8);
        manager.activate_participants(&k).unwrap();
        let before = manager.participant_map();

        // k2 (1) goes directly above k6 (5)
        manager.move_above(&k[1], &k[5]).unwrap();
        let after = manager.participant_map();

        assert_eq!(after[&k[1]], after[&k[5]] + 1);
        for key in &k[2..=5] {
            assert_eq!(after[key], before[key] - 1);
        }
        for key in [&k[0], &k[6], &k[7]] {
            assert_eq!(after[key], before[key]);
        }
    }

    #[test]
    fn test_not_found_is_idempotent() {
        let category = zero_gap_category();
        let manager = OrderManager::new(FAMILY, category.clone());
        let k = keys(&category, 4);
        manager.activate_participants(&k[..3]).unwrap();
        let before = manager.participant_map();

        assert_eq!(manager.expunge_participant(&k[3]).unwrap(), None);
        assert_eq!(manager.expunge_participant(&k[3]).unwrap(), None);
        assert!(manager.move_to_top(&k[3]).unwrap_err().is_not_found());
        assert_eq!(manager.participant_map(), before);
    }

    #[test]
    fn test_categories_keep_managers_apart() {
        let base = OrderManager::new(FAMILY, OrderCategory::IMAGE_BASE_MAP);
        let data = OrderManager::new(FAMILY, OrderCategory::IMAGE_DATA);

        let map = OrderParticipantKey::new(FAMILY, OrderCategory::IMAGE_BASE_MAP, "osm");
        let wms = OrderParticipantKey::new(FAMILY, OrderCategory::IMAGE_DATA, "wms");
        let base_value = base.activate_participant(&map).unwrap();
        let data_value = data.activate_participant(&wms).unwrap();

        assert!(base_value < data_value);
        assert!(OrderCategory::IMAGE_BASE_MAP.contains(base_value));
        assert!(OrderCategory::IMAGE_DATA.contains(data_value));
    }
}
