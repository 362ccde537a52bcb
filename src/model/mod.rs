//! Spatial data model: read-only projections of the building store.
//!
//! Entities are never mutated by this crate. Edits go to the store and the
//! viewer re-fetches.

mod core;
pub mod scan;

pub use self::core::{
    Building, Equipment, EquipmentStatus, Floor, FloorConfidence, FloorSpatialData,
    PositionConfidence, Room, by_id,
};
pub use scan::{ScanRegion, coverage_ratio};
