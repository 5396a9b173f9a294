/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Layer ordering engine.
//!
//! This module assigns and maintains integer z-order values for a dynamic set
//! of participants that are activated, deactivated and reordered at runtime.
//!
//! # Architecture
//!
//! - [`OrderParticipantKey`] identifies one participant inside a family and
//!   category
//! - [`OrderCategory`] reserves the numeric band a manager may hand out
//! - [`OrderManager`] owns the live mapping for one (family, category) pair
//!   and serializes every structural mutation behind a single lock
//! - Each mutation produces one [`ParticipantOrderChangeEvent`] that is
//!   delivered synchronously to every [`OrderChangeListener`]
//! - [`OrderManagerRegistry`] lazily creates at most one manager per pair
//!
//! # Examples
//!
//! ```
//! use layer_order::{OrderCategory, OrderManager, OrderParticipantKey};
//!
//! # fn example() -> Result<(), layer_order::OrderError> {
//! let category = OrderCategory::new("Overlay", 0, 9)?;
//! let manager = OrderManager::new("Feature.Layer.Family", category.clone());
//!
//! let keys: Vec<_> = ["a", "b", "c"]
//!     .iter()
//!     .map(|id| OrderParticipantKey::new("Feature.Layer.Family", category.clone(), *id))
//!     .collect();
//! manager.activate_participants(&keys)?;
//!
//! manager.expunge_participant(&keys[0])?;
//! assert_eq!(manager.order_of(&keys[1]), Some(0));
//! assert_eq!(manager.order_of(&keys[2]), Some(1));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod category;
pub mod error;
pub mod event;
pub mod key;
pub mod listener;
pub mod manager;
pub mod policy;
pub mod registry;
mod state;

#[cfg(test)]
mod tests;

// Re-export main types
pub use category::{OrderCategory, families};
pub use error::OrderError;
pub use event::{ChangeType, ParticipantChange, ParticipantOrderChangeEvent};
pub use key::OrderParticipantKey;
pub use listener::{BroadcastListener, OrderChangeListener, Subscription};
pub use manager::OrderManager;
pub use policy::CompactionPolicy;
pub use registry::OrderManagerRegistry;
