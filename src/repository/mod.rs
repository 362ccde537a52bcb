//! Read-only access to the persistent spatial store.
//!
//! Core logic only ever talks to [`SpatialRepository`]. The in-memory and
//! JSON snapshot implementations share [`RepositorySnapshot`] for lookups.

mod json;
mod memory;
mod snapshot;

pub use json::JsonFileRepository;
pub use memory::InMemoryRepository;
pub use snapshot::{BuildingSnapshot, RepositorySnapshot};

use crate::error::Result;
use crate::model::{Building, Equipment, Floor, ScanRegion};
use crate::query::SpatialQuery;

/// Queries the viewer issues against the building store.
pub trait SpatialRepository {
    /// `NotFound` when the building does not exist.
    fn get_building(&self, id: &str) -> Result<Building>;

    /// Floors ordered by number.
    fn get_floors(&self, building_id: &str) -> Result<Vec<Floor>>;

    /// Equipment of one building filtered by `query`, in query result order.
    fn get_equipment_positions(
        &self,
        building_id: &str,
        query: &SpatialQuery,
    ) -> Result<Vec<Equipment>>;

    fn get_scanned_regions(&self, building_id: &str) -> Result<Vec<ScanRegion>>;
}

impl<R: SpatialRepository + ?Sized> SpatialRepository for &R {
    fn get_building(&self, id: &str) -> Result<Building> {
        (**self).get_building(id)
    }

    fn get_floors(&self, building_id: &str) -> Result<Vec<Floor>> {
        (**self).get_floors(building_id)
    }

    fn get_equipment_positions(
        &self,
        building_id: &str,
        query: &SpatialQuery,
    ) -> Result<Vec<Equipment>> {
        (**self).get_equipment_positions(building_id, query)
    }

    fn get_scanned_regions(&self, building_id: &str) -> Result<Vec<ScanRegion>> {
        (**self).get_scanned_regions(building_id)
    }
}
