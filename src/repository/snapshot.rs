use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::model::{Building, Equipment, Floor, ScanRegion};
use crate::query::{SpatialQuery, SpatialQueryEngine};

/// Everything stored for one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub building: Building,
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub scans: Vec<ScanRegion>,
}

impl BuildingSnapshot {
    pub fn new(building: Building) -> Self {
        Self {
            building,
            floors: Vec::new(),
            equipment: Vec::new(),
            scans: Vec::new(),
        }
    }

    pub fn with_floor(mut self, floor: Floor) -> Self {
        self.floors.push(floor);
        self
    }

    pub fn with_equipment(mut self, item: Equipment) -> Self {
        self.equipment.push(item);
        self
    }

    pub fn with_scan(mut self, region: ScanRegion) -> Self {
        self.scans.push(region);
        self
    }

    pub fn sorted_floors(&self) -> Vec<Floor> {
        let mut floors = self.floors.clone();
        floors.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
        floors
    }

    pub fn query_equipment(&self, query: &SpatialQuery) -> Result<Vec<Equipment>> {
        SpatialQueryEngine::new().query(&self.equipment, query)
    }

    pub fn sorted_scans(&self) -> Vec<ScanRegion> {
        let mut scans = self.scans.clone();
        scans.sort_by(|a, b| a.floor.cmp(&b.floor).then_with(|| a.id.cmp(&b.id)));
        scans
    }
}

/// Serialized form of a whole store: `{"buildings": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    #[serde(default)]
    pub buildings: Vec<BuildingSnapshot>,
}

impl RepositorySnapshot {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn find(&self, building_id: &str) -> Result<&BuildingSnapshot> {
        self.buildings
            .iter()
            .find(|snapshot| snapshot.building.id == building_id)
            .ok_or_else(|| SpatialError::not_found("building", building_id))
    }

    /// Insert or replace the snapshot for its building id.
    pub fn upsert(&mut self, snapshot: BuildingSnapshot) {
        match self
            .buildings
            .iter_mut()
            .find(|existing| existing.building.id == snapshot.building.id)
        {
            Some(existing) => *existing = snapshot,
            None => self.buildings.push(snapshot),
        }
    }
}
