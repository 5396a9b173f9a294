/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Order categories.
//!
//! A category reserves an inclusive band of integer order values for one
//! class of participants. Well-known categories are disjoint and ascending,
//! so a renderer that sorts by order value draws base maps first, then image
//! data, overlays, features and finally elevation annotations.

use super::error::OrderError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::RangeInclusive;

/// Family names used by the well-known layer types.
pub mod families {
    /// Imagery and tile layers.
    pub const IMAGE_LAYER_FAMILY: &str = "Image.Layer.Family";
    /// Vector feature layers.
    pub const FEATURE_LAYER_FAMILY: &str = "Feature.Layer.Family";
    /// Terrain and elevation providers.
    pub const ELEVATION_FAMILY: &str = "Elevation.Family";
}

/// Immutable named band of order values.
///
/// Equality and hashing use the name only: categories are meant to be
/// singleton constants, and two categories with the same name are the same
/// category.
///
/// # Examples
///
/// ```
/// use layer_order::OrderCategory;
///
/// let category = OrderCategory::new("Tracks", 1_000_000, 1_000_099).unwrap();
/// assert_eq!(category.capacity(), 100);
/// assert!(category.contains(1_000_050));
/// assert!(!category.overlaps(&OrderCategory::IMAGE_BASE_MAP));
/// assert!(OrderCategory::new("Legacy", 50, 60).unwrap().overlaps(&OrderCategory::IMAGE_BASE_MAP));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCategory {
    name: Cow<'static, str>,
    min: i32,
    max: i32,
}

impl OrderCategory {
    /// Base imagery, drawn below everything else.
    pub const IMAGE_BASE_MAP: Self = Self::from_static("Image.BaseMap", 0, 99_999);

    /// Image data layers.
    pub const IMAGE_DATA: Self = Self::from_static("Image.Data", 100_000, 199_999);

    /// Image overlays drawn above image data.
    pub const IMAGE_OVERLAY: Self = Self::from_static("Image.Overlay", 200_000, 299_999);

    /// Vector feature layers.
    pub const FEATURE: Self = Self::from_static("Feature", 300_000, 399_999);

    /// Elevation providers.
    pub const ELEVATION: Self = Self::from_static("Elevation", 400_000, 499_999);

    /// Creates a category covering `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidRange`] if `min > max`.
    pub fn new(name: impl Into<String>, min: i32, max: i32) -> Result<Self, OrderError> {
        let name = name.into();
        if min > max {
            return Err(OrderError::InvalidRange { name, min, max });
        }
        Ok(Self {
            name: Cow::Owned(name),
            min,
            max,
        })
    }

    /// Creates a category from a static name, for constants.
    ///
    /// The caller is responsible for `min <= max`; an inverted band has zero
    /// capacity.
    #[must_use]
    pub const fn from_static(name: &'static str, min: i32, max: i32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            min,
            max,
        }
    }

    /// Category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The inclusive band of legal order values.
    #[must_use]
    pub fn order_range(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }

    /// Lowest legal order value.
    #[inline]
    #[must_use]
    pub fn min_order(&self) -> i32 {
        self.min
    }

    /// Highest legal order value.
    #[inline]
    #[must_use]
    pub fn max_order(&self) -> i32 {
        self.max
    }

    /// Number of distinct order values in the band.
    #[must_use]
    pub fn capacity(&self) -> usize {
        if self.min > self.max {
            return 0;
        }
        (i64::from(self.max) - i64::from(self.min) + 1) as usize
    }

    /// Returns `true` if `value` lies in the band.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        self.min <= value && value <= self.max
    }

    /// Returns `true` if the two bands share at least one value.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

impl PartialEq for OrderCategory {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for OrderCategory {}

impl Hash for OrderCategory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for OrderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}]", self.name, self.min, self.max)
    }
}
