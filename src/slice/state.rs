//! Base trait for slice state.

use std::fmt::Debug;

/// Marker trait for the value held by one slice.
///
/// Slice states should be:
/// - Cheap to clone (selectors hand out clones)
/// - Comparable (PartialEq lets the store keep unchanged slices shared)
/// - Defaultable (the default is what a freshly registered slice starts from)
pub trait SliceState: Clone + PartialEq + Default + Debug + Send + Sync + 'static {}

impl<T> SliceState for T where T: Clone + PartialEq + Default + Debug + Send + Sync + 'static {}
