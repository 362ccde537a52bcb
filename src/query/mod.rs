//! Spatial predicate evaluation over equipment collections.

mod core;

pub use self::core::{DistanceMode, SpatialQuery, SpatialQueryEngine, distance};
