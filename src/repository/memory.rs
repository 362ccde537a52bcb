use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, SpatialError};
use crate::model::{Building, Equipment, Floor, ScanRegion};
use crate::query::SpatialQuery;

use super::SpatialRepository;
use super::snapshot::{BuildingSnapshot, RepositorySnapshot};

/// In-process store for tests and demos.
///
/// `fail_with` makes every call return `DataUnavailable` until
/// `clear_failure` is called.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    snapshot: RepositorySnapshot,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: RepositorySnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    pub fn with_building(mut self, building: BuildingSnapshot) -> Self {
        self.insert(building);
        self
    }

    pub fn insert(&mut self, building: BuildingSnapshot) {
        self.snapshot.upsert(building);
    }

    pub fn snapshot(&self) -> &RepositorySnapshot {
        &self.snapshot
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.into());
        }
    }

    pub fn clear_failure(&self) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = None;
        }
    }

    /// Number of repository calls served or failed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn enter(&self, building_id: &str) -> Result<&BuildingSnapshot> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let injected = self.failure.lock().ok().and_then(|failure| failure.clone());
        if let Some(message) = injected {
            return Err(SpatialError::DataUnavailable(message));
        }
        self.snapshot.find(building_id)
    }
}

impl SpatialRepository for InMemoryRepository {
    fn get_building(&self, id: &str) -> Result<Building> {
        self.enter(id).map(|snapshot| snapshot.building.clone())
    }

    fn get_floors(&self, building_id: &str) -> Result<Vec<Floor>> {
        self.enter(building_id).map(BuildingSnapshot::sorted_floors)
    }

    fn get_equipment_positions(
        &self,
        building_id: &str,
        query: &SpatialQuery,
    ) -> Result<Vec<Equipment>> {
        self.enter(building_id)?.query_equipment(query)
    }

    fn get_scanned_regions(&self, building_id: &str) -> Result<Vec<ScanRegion>> {
        self.enter(building_id).map(BuildingSnapshot::sorted_scans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point2D, Point3D};
    use crate::model::PositionConfidence;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new().with_building(
            BuildingSnapshot::new(Building::new("b1", "HQ"))
                .with_floor(Floor::new("f2", "b1", 2, "Upper"))
                .with_floor(Floor::new("f1", "b1", 1, "Ground"))
                .with_floor(Floor::new("fb", "b1", -1, "Basement"))
                .with_equipment(
                    Equipment::new("E2", "Panel", "panel")
                        .on_floor(1)
                        .at(Point3D::new(4.0, 4.0, 0.0)),
                )
                .with_equipment(
                    Equipment::new("E1", "AHU", "hvac")
                        .on_floor(1)
                        .at(Point3D::new(1.0, 1.0, 0.0)),
                )
                .with_equipment(Equipment::new("E3", "Pump", "plumbing").on_floor(2))
                .with_scan(ScanRegion {
                    id: "s1".into(),
                    building_id: "b1".into(),
                    floor: 1,
                    bounds: BoundingBox::planar(Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0))
                        .unwrap(),
                    scanned_at_ms: 0,
                    point_count: 1200,
                    confidence: PositionConfidence::High,
                }),
        )
    }

    #[test]
    fn floors_are_ordered_by_number() {
        let numbers: Vec<i32> = repo()
            .get_floors("b1")
            .unwrap()
            .iter()
            .map(|floor| floor.number)
            .collect();
        assert_eq!(numbers, vec![-1, 1, 2]);
    }

    #[test]
    fn unknown_building_is_not_found() {
        let err = repo().get_building("nope").unwrap_err();
        assert!(matches!(err, SpatialError::NotFound { kind: "building", .. }));
    }

    #[test]
    fn equipment_queries_use_the_engine() {
        let ids: Vec<String> = repo()
            .get_equipment_positions("b1", &SpatialQuery::floor(1))
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec!["E1", "E2"]);

        let err = repo()
            .get_equipment_positions("b1", &SpatialQuery::radius(Point3D::default(), -1.0))
            .unwrap_err();
        assert!(matches!(err, SpatialError::InvalidQuery(_)));
    }

    #[test]
    fn injected_failure_applies_until_cleared() {
        let repo = repo();
        repo.fail_with("connection reset");
        let err = repo.get_floors("b1").unwrap_err();
        assert!(matches!(err, SpatialError::DataUnavailable(ref msg) if msg == "connection reset"));
        repo.clear_failure();
        assert!(repo.get_floors("b1").is_ok());
        assert_eq!(repo.call_count(), 2);
    }

    #[test]
    fn scanned_regions_are_returned() {
        let scans = repo().get_scanned_regions("b1").unwrap();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].point_count, 1200);
    }

    fn building_name<R: SpatialRepository>(repo: R) -> String {
        repo.get_building("b1").unwrap().name
    }

    #[test]
    fn references_delegate_to_the_repository() {
        let repo = repo();
        assert_eq!(building_name(&repo), "HQ");
    }
}
