/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Participant keys.

use super::category::OrderCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one ranked participant.
///
/// Equality and hashing cover family, category and id. Keys are immutable;
/// a layer controller creates one when its layer becomes order-eligible and
/// drops it when the layer is destroyed.
///
/// # Examples
///
/// ```
/// use layer_order::{OrderCategory, OrderParticipantKey};
///
/// let key = OrderParticipantKey::new("Image.Layer.Family", OrderCategory::IMAGE_DATA, "wms-1");
/// assert_eq!(key.id(), "wms-1");
/// assert_eq!(key.to_string(), "Image.Layer.Family/Image.Data/wms-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderParticipantKey {
    family: String,
    category: OrderCategory,
    id: String,
}

impl OrderParticipantKey {
    /// Creates a key.
    #[must_use]
    pub fn new(family: impl Into<String>, category: OrderCategory, id: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            category,
            id: id.into(),
        }
    }

    /// Creates a key with a random UUID v4 id.
    #[must_use]
    pub fn generated(family: impl Into<String>, category: OrderCategory) -> Self {
        Self::new(family, category, Uuid::new_v4().to_string())
    }

    /// Family the participant belongs to.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Category the participant belongs to.
    #[must_use]
    pub fn category(&self) -> &OrderCategory {
        &self.category
    }

    /// Id, unique within family and category.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for OrderParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.family, self.category.name(), self.id)
    }
}
