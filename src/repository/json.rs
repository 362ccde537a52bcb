use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpatialError};
use crate::model::{Building, Equipment, Floor, ScanRegion};
use crate::query::SpatialQuery;

use super::SpatialRepository;
use super::snapshot::{BuildingSnapshot, RepositorySnapshot};

/// Store adapter backed by a JSON snapshot on disk.
///
/// The file is re-read on every call so external edits show up on the next
/// refresh. Read and decode failures surface as `DataUnavailable`.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `snapshot` to the backing file, replacing its contents.
    pub fn write_snapshot(&self, snapshot: &RepositorySnapshot) -> Result<()> {
        fs::write(&self.path, snapshot.to_json_string()?)?;
        Ok(())
    }

    pub fn load(&self) -> Result<RepositorySnapshot> {
        let raw = fs::read_to_string(&self.path).map_err(|err| {
            SpatialError::DataUnavailable(format!("reading {}: {err}", self.path.display()))
        })?;
        RepositorySnapshot::from_json_str(&raw).map_err(|err| {
            SpatialError::DataUnavailable(format!("decoding {}: {err}", self.path.display()))
        })
    }

    fn with_building<T>(
        &self,
        building_id: &str,
        read: impl FnOnce(&BuildingSnapshot) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.load()?;
        read(snapshot.find(building_id)?)
    }
}

impl SpatialRepository for JsonFileRepository {
    fn get_building(&self, id: &str) -> Result<Building> {
        self.with_building(id, |snapshot| Ok(snapshot.building.clone()))
    }

    fn get_floors(&self, building_id: &str) -> Result<Vec<Floor>> {
        self.with_building(building_id, |snapshot| Ok(snapshot.sorted_floors()))
    }

    fn get_equipment_positions(
        &self,
        building_id: &str,
        query: &SpatialQuery,
    ) -> Result<Vec<Equipment>> {
        self.with_building(building_id, |snapshot| snapshot.query_equipment(query))
    }

    fn get_scanned_regions(&self, building_id: &str) -> Result<Vec<ScanRegion>> {
        self.with_building(building_id, |snapshot| Ok(snapshot.sorted_scans()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3D;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("floorgrid-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn reads_snapshot_written_to_disk() {
        let path = temp_path("roundtrip");
        let repo = JsonFileRepository::new(&path);
        let mut snapshot = RepositorySnapshot::default();
        snapshot.upsert(
            BuildingSnapshot::new(Building::new("b1", "HQ"))
                .with_floor(Floor::new("f1", "b1", 1, "Ground"))
                .with_equipment(
                    Equipment::new("E1", "AHU", "hvac")
                        .on_floor(1)
                        .at(Point3D::new(2.0, 3.0, 0.0)),
                ),
        );
        repo.write_snapshot(&snapshot).unwrap();

        assert_eq!(repo.get_building("b1").unwrap().name, "HQ");
        assert_eq!(repo.get_floors("b1").unwrap().len(), 1);
        let items = repo
            .get_equipment_positions("b1", &SpatialQuery::floor(1))
            .unwrap();
        assert_eq!(items[0].id, "E1");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let repo = JsonFileRepository::new(temp_path("missing-never-written"));
        let err = repo.get_building("b1").unwrap_err();
        assert!(matches!(err, SpatialError::DataUnavailable(_)));
    }

    #[test]
    fn malformed_file_is_data_unavailable() {
        let path = temp_path("malformed");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileRepository::new(&path).get_floors("b1").unwrap_err();
        assert!(matches!(err, SpatialError::DataUnavailable(ref msg) if msg.contains("decoding")));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn unknown_building_is_not_found() {
        let path = temp_path("empty-store");
        JsonFileRepository::new(&path)
            .write_snapshot(&RepositorySnapshot::default())
            .unwrap();
        let err = JsonFileRepository::new(&path).get_building("b9").unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(matches!(err, SpatialError::NotFound { .. }));
        fs::remove_file(&path).ok();
    }
}
