/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # Layer Order
//!
//! A z-order arbitration engine for map layers, image tiles and overlays.
//!
//! Participants are identified by an [`OrderParticipantKey`] and ranked by an
//! [`OrderManager`] that owns one (family, category) pair. Each
//! [`OrderCategory`] reserves a fixed, inclusive band of integer order values
//! so that managers of different categories never collide when their layers
//! are composited together (base maps always render below data layers, and
//! so on).
//!
//! ## Guarantees
//!
//! - Order values of active participants are distinct and stay inside the
//!   category band.
//! - Relative order is preserved across activations and removals; only an
//!   explicit move changes it.
//! - Removing participants compacts the remaining ones back into a contiguous
//!   block starting at the band minimum (under the default
//!   [`CompactionPolicy::Eager`]), independent of removal order.
//! - Every mutation is broadcast to registered [`OrderChangeListener`]s as a
//!   single [`ParticipantOrderChangeEvent`], synchronously, before the
//!   mutating call returns.
//!
//! ## Example
//!
//! ```
//! use layer_order::{OrderCategory, OrderManagerRegistry, OrderParticipantKey};
//!
//! # fn example() -> Result<(), layer_order::OrderError> {
//! let registry = OrderManagerRegistry::new();
//! let category = OrderCategory::new("Image.Data", 0, 99)?;
//! let manager = registry.get_order_manager("Image.Layer.Family", &category);
//!
//! let _subscription = manager.add_participant_change_listener(|event: &layer_order::ParticipantOrderChangeEvent| {
//!     println!("{:?}: {} changes", event.change_type, event.changes.len());
//! });
//!
//! let roads = OrderParticipantKey::new("Image.Layer.Family", category.clone(), "roads");
//! let rivers = OrderParticipantKey::new("Image.Layer.Family", category.clone(), "rivers");
//! assert_eq!(manager.activate_participant(&roads)?, 0);
//! assert_eq!(manager.activate_participant(&rivers)?, 1);
//!
//! manager.move_to_bottom(&rivers)?;
//! assert_eq!(manager.order_of(&rivers), Some(0));
//! assert_eq!(manager.order_of(&roads), Some(1));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod order;

pub use order::{
    BroadcastListener, ChangeType, CompactionPolicy, OrderCategory, OrderChangeListener,
    OrderError, OrderManager, OrderManagerRegistry, OrderParticipantKey, ParticipantChange,
    ParticipantOrderChangeEvent, Subscription, families,
};
