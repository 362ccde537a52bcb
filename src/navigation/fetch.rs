use crate::error::Result;
use crate::model::{Building, Equipment, Floor};
use crate::query::SpatialQuery;
use crate::repository::SpatialRepository;

use super::core::{NavEvent, NavNode};

/// Identity of one issued fetch. Only the most recent ticket is honored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    /// Node whose data the fetch loads.
    pub node: NavNode,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKind {
    /// Building record plus its floors.
    Building { building_id: String },
    /// Equipment positioned on one floor.
    FloorEquipment {
        building_id: String,
        floor_number: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub kind: FetchKind,
}

impl FetchRequest {
    /// Wrap the fetch outcome as the event that feeds it back.
    pub fn complete(self, result: Result<FetchPayload>) -> NavEvent {
        NavEvent::DataReady {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchPayload {
    Building {
        building: Building,
        floors: Vec<Floor>,
    },
    FloorEquipment {
        floor_number: i32,
        equipment: Vec<Equipment>,
    },
}

/// Run `request` against the store.
pub fn execute<R>(repo: &R, request: &FetchRequest) -> Result<FetchPayload>
where
    R: SpatialRepository + ?Sized,
{
    match &request.kind {
        FetchKind::Building { building_id } => {
            let building = repo.get_building(building_id)?;
            let floors = repo.get_floors(building_id)?;
            Ok(FetchPayload::Building { building, floors })
        }
        FetchKind::FloorEquipment {
            building_id,
            floor_number,
        } => {
            let equipment =
                repo.get_equipment_positions(building_id, &SpatialQuery::floor(*floor_number))?;
            Ok(FetchPayload::FloorEquipment {
                floor_number: *floor_number,
                equipment,
            })
        }
    }
}
