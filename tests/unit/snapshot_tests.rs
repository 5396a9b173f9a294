use layer_order::{
    ChangeType, OrderCategory, OrderManager, OrderParticipantKey, ParticipantOrderChangeEvent,
};
use std::sync::{Arc, Mutex};

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILY: &str = "Feature.Layer.Family";

    #[test]
    fn test_event_json_round_trip() {
        let category = OrderCategory::new("Feature", 10, 19).unwrap();
        let manager = OrderManager::new(FAMILY, category.clone());
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let _subscription =
            manager.add_participant_change_listener(move |event: &ParticipantOrderChangeEvent| {
                events_clone.lock().unwrap().push(event.clone());
            });

        let key = OrderParticipantKey::new(FAMILY, category.clone(), "tracks");
        manager.activate_participant(&key).unwrap();

        let event = events.lock().unwrap()[0].clone();
        let json = serde_json::to_string(&event).unwrap();
        let decoded: ParticipantOrderChangeEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, event);
        assert_eq!(decoded.change_type, ChangeType::Activated);
        assert_eq!(decoded.new_order(&key), Some(10));
        assert_eq!(decoded.category.order_range(), 10..=19);
    }

    #[test]
    fn test_participant_snapshot_exports_as_json() {
        let category = OrderCategory::new("Feature", 0, 9).unwrap();
        let manager = OrderManager::new(FAMILY, category.clone());
        let keys: Vec<_> = ["roads", "rivers"]
            .iter()
            .map(|id| OrderParticipantKey::new(FAMILY, category.clone(), *id))
            .collect();
        manager.activate_participants(&keys).unwrap();

        manager.move_to_top(&keys[0]).unwrap();

        let snapshot = manager.snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json[0][0]["id"], "rivers");
        assert_eq!(json[0][1], 0);
        assert_eq!(json[1][0]["id"], "roads");
        assert_eq!(json[1][0]["category"]["name"], "Feature");
        assert_eq!(json[1][1], 1);

        let decoded: Vec<(OrderParticipantKey, i32)> = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
