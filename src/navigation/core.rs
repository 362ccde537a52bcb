use std::collections::HashMap;

use crate::error::{Result, SpatialError};
use crate::model::{Building, Equipment, Floor, FloorSpatialData, Room, by_id};

use super::fetch::{FetchKind, FetchPayload, FetchRequest, FetchTicket};

const PATH_SEPARATOR: &str = " > ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavLevel {
    Building,
    Floor,
    Room,
    Equipment,
}

impl NavLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Floor => "floor",
            Self::Room => "room",
            Self::Equipment => "equipment",
        }
    }
}

/// Position in the drill-down hierarchy. Each variant carries its owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavNode {
    Building {
        building_id: String,
    },
    Floor {
        building_id: String,
        floor_number: i32,
    },
    Room {
        building_id: String,
        floor_number: i32,
        room_id: String,
    },
    Equipment {
        building_id: String,
        floor_number: i32,
        room_id: Option<String>,
        equipment_id: String,
    },
}

impl NavNode {
    pub fn level(&self) -> NavLevel {
        match self {
            Self::Building { .. } => NavLevel::Building,
            Self::Floor { .. } => NavLevel::Floor,
            Self::Room { .. } => NavLevel::Room,
            Self::Equipment { .. } => NavLevel::Equipment,
        }
    }

    pub fn building_id(&self) -> &str {
        match self {
            Self::Building { building_id }
            | Self::Floor { building_id, .. }
            | Self::Room { building_id, .. }
            | Self::Equipment { building_id, .. } => building_id,
        }
    }

    pub fn floor_number(&self) -> Option<i32> {
        match self {
            Self::Building { .. } => None,
            Self::Floor { floor_number, .. }
            | Self::Room { floor_number, .. }
            | Self::Equipment { floor_number, .. } => Some(*floor_number),
        }
    }

    /// The node whose fetch supplies this node's data. Room and equipment
    /// views reuse their floor's equipment.
    fn data_owner(&self) -> NavNode {
        match self.floor_number() {
            None => NavNode::Building {
                building_id: self.building_id().to_string(),
            },
            Some(floor_number) => NavNode::Floor {
                building_id: self.building_id().to_string(),
                floor_number,
            },
        }
    }
}

/// Breadcrumb entry for a node entered by selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub node: NavNode,
}

/// Selectable entry at the current level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub node: NavNode,
}

#[derive(Debug)]
pub enum NavEvent {
    MoveCursor(isize),
    Select,
    Up,
    Home,
    Refresh,
    DataReady {
        ticket: FetchTicket,
        result: Result<FetchPayload>,
    },
}

impl NavEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveCursor(_) => "move_cursor",
            Self::Select => "select",
            Self::Up => "up",
            Self::Home => "home",
            Self::Refresh => "refresh",
            Self::DataReady { .. } => "data_ready",
        }
    }
}

/// What happened to a delivered fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDisposition {
    Applied,
    Failed,
    /// Ticket did not match the pending fetch; nothing was touched.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavOutcome {
    /// Visible state changed and the view should be redrawn.
    pub changed: bool,
    pub fetch: Option<FetchRequest>,
    /// Set only for `DataReady` events.
    pub disposition: Option<FetchDisposition>,
}

impl NavOutcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn moved(fetch: Option<FetchRequest>) -> Self {
        Self {
            changed: true,
            fetch,
            disposition: None,
        }
    }

    fn delivered(disposition: FetchDisposition) -> Self {
        Self {
            changed: disposition != FetchDisposition::Stale,
            fetch: None,
            disposition: Some(disposition),
        }
    }
}

/// Drill-down state for one building session.
///
/// Data arrives only through `DataReady`; a failed fetch leaves the last
/// good data in place and records the error.
#[derive(Debug)]
pub struct NavigationController {
    root: NavNode,
    breadcrumb: Vec<Crumb>,
    cursor: usize,
    building: Option<Building>,
    floors: Vec<Floor>,
    floor_equipment: HashMap<i32, Vec<Equipment>>,
    pending: Option<FetchTicket>,
    generation: u64,
    last_error: Option<SpatialError>,
}

impl NavigationController {
    pub fn new(building_id: impl Into<String>) -> Self {
        Self {
            root: NavNode::Building {
                building_id: building_id.into(),
            },
            breadcrumb: Vec::new(),
            cursor: 0,
            building: None,
            floors: Vec::new(),
            floor_equipment: HashMap::new(),
            pending: None,
            generation: 0,
            last_error: None,
        }
    }

    /// Initial fetch for the building level.
    pub fn start(&mut self) -> NavOutcome {
        NavOutcome {
            changed: false,
            fetch: self.ensure_loaded(),
            disposition: None,
        }
    }

    pub fn handle(&mut self, event: NavEvent) -> NavOutcome {
        match event {
            NavEvent::MoveCursor(delta) => self.move_cursor(delta),
            NavEvent::Select => self.select(),
            NavEvent::Up => self.up(),
            NavEvent::Home => self.home(),
            NavEvent::Refresh => self.refresh(),
            NavEvent::DataReady { ticket, result } => self.apply(ticket, result),
        }
    }

    pub fn node(&self) -> &NavNode {
        self.breadcrumb
            .last()
            .map(|crumb| &crumb.node)
            .unwrap_or(&self.root)
    }

    pub fn level(&self) -> NavLevel {
        self.node().level()
    }

    pub fn building_id(&self) -> &str {
        self.root.building_id()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn breadcrumb(&self) -> &[Crumb] {
        &self.breadcrumb
    }

    /// Building name followed by every crumb label.
    pub fn breadcrumb_path(&self) -> String {
        let root = self
            .building
            .as_ref()
            .map(|building| building.name.as_str())
            .unwrap_or_else(|| self.building_id());
        std::iter::once(root)
            .chain(self.breadcrumb.iter().map(|crumb| crumb.label.as_str()))
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    pub fn last_error(&self) -> Option<&SpatialError> {
        self.last_error.as_ref()
    }

    pub fn pending(&self) -> Option<&FetchTicket> {
        self.pending.as_ref()
    }

    pub fn building(&self) -> Option<&Building> {
        self.building.as_ref()
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor_equipment(&self, floor_number: i32) -> Option<&[Equipment]> {
        self.floor_equipment
            .get(&floor_number)
            .map(|items| items.as_slice())
    }

    pub fn current_floor(&self) -> Option<&Floor> {
        self.node()
            .floor_number()
            .and_then(|number| self.find_floor(number))
    }

    pub fn current_room(&self) -> Option<&Room> {
        let room_id = match self.node() {
            NavNode::Room { room_id, .. } => room_id.as_str(),
            NavNode::Equipment {
                room_id: Some(room_id),
                ..
            } => room_id.as_str(),
            _ => return None,
        };
        self.current_floor()?
            .rooms
            .iter()
            .find(|room| room.id == room_id)
    }

    pub fn current_equipment(&self) -> Option<&Equipment> {
        match self.node() {
            NavNode::Equipment {
                floor_number,
                equipment_id,
                ..
            } => self
                .floor_equipment(*floor_number)?
                .iter()
                .find(|item| &item.id == equipment_id),
            _ => None,
        }
    }

    /// Render input for the current floor. Equipment is empty until loaded.
    pub fn floor_data(&self) -> Option<FloorSpatialData> {
        let floor = self.current_floor()?;
        let equipment = self
            .floor_equipment(floor.number)
            .map(|items| items.to_vec())
            .unwrap_or_default();
        Some(FloorSpatialData::new(floor.clone(), equipment))
    }

    /// Selectable entries at the current level, in display order.
    pub fn items(&self) -> Vec<NavItem> {
        match self.node() {
            NavNode::Building { building_id } => self
                .floors
                .iter()
                .map(|floor| NavItem {
                    label: floor.label(),
                    node: NavNode::Floor {
                        building_id: building_id.clone(),
                        floor_number: floor.number,
                    },
                })
                .collect(),
            NavNode::Floor {
                building_id,
                floor_number,
            } => {
                let Some(floor) = self.find_floor(*floor_number) else {
                    return Vec::new();
                };
                if floor.rooms.is_empty() {
                    return self
                        .sorted_equipment(*floor_number, |_| true)
                        .into_iter()
                        .map(|item| equipment_item(building_id, *floor_number, None, item))
                        .collect();
                }
                let mut rooms: Vec<&Room> = floor.rooms.iter().collect();
                rooms.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
                rooms
                    .into_iter()
                    .map(|room| NavItem {
                        label: room.label(),
                        node: NavNode::Room {
                            building_id: building_id.clone(),
                            floor_number: *floor_number,
                            room_id: room.id.clone(),
                        },
                    })
                    .collect()
            }
            NavNode::Room {
                building_id,
                floor_number,
                room_id,
            } => {
                let Some(room) = self.current_room() else {
                    return Vec::new();
                };
                self.sorted_equipment(*floor_number, |item| {
                    room.equipment_ids.contains(&item.id)
                        || item.room_id.as_deref() == Some(room.id.as_str())
                })
                .into_iter()
                .map(|item| equipment_item(building_id, *floor_number, Some(room_id), item))
                .collect()
            }
            NavNode::Equipment { .. } => Vec::new(),
        }
    }

    fn move_cursor(&mut self, delta: isize) -> NavOutcome {
        let last = self.items().len().saturating_sub(1);
        let next = self.cursor.saturating_add_signed(delta).min(last);
        if next == self.cursor {
            return NavOutcome::unchanged();
        }
        self.cursor = next;
        NavOutcome::moved(None)
    }

    fn select(&mut self) -> NavOutcome {
        let Some(item) = self.items().into_iter().nth(self.cursor) else {
            return NavOutcome::unchanged();
        };
        self.breadcrumb.push(Crumb {
            label: item.label,
            node: item.node,
        });
        self.cursor = 0;
        NavOutcome::moved(self.ensure_loaded())
    }

    fn up(&mut self) -> NavOutcome {
        if self.breadcrumb.pop().is_none() {
            return NavOutcome::unchanged();
        }
        self.cursor = 0;
        NavOutcome::moved(self.ensure_loaded())
    }

    fn home(&mut self) -> NavOutcome {
        let changed = !self.breadcrumb.is_empty() || self.cursor != 0;
        self.breadcrumb.clear();
        self.cursor = 0;
        NavOutcome {
            changed,
            fetch: self.ensure_loaded(),
            disposition: None,
        }
    }

    fn refresh(&mut self) -> NavOutcome {
        let owner = self.node().data_owner();
        NavOutcome {
            changed: false,
            fetch: Some(self.issue(owner)),
            disposition: None,
        }
    }

    fn apply(&mut self, ticket: FetchTicket, result: Result<FetchPayload>) -> NavOutcome {
        if self.pending.as_ref() != Some(&ticket) {
            return NavOutcome::delivered(FetchDisposition::Stale);
        }
        self.pending = None;

        match result {
            Ok(payload) => {
                self.store(payload);
                self.last_error = None;
                let last = self.items().len().saturating_sub(1);
                self.cursor = self.cursor.min(last);
                NavOutcome::delivered(FetchDisposition::Applied)
            }
            Err(err) => {
                self.last_error = Some(as_fetch_failure(err));
                NavOutcome::delivered(FetchDisposition::Failed)
            }
        }
    }

    fn store(&mut self, payload: FetchPayload) {
        match payload {
            FetchPayload::Building {
                building,
                mut floors,
            } => {
                floors.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
                self.building = Some(building);
                self.floors = floors;
            }
            FetchPayload::FloorEquipment {
                floor_number,
                equipment,
            } => {
                self.floor_equipment.insert(floor_number, equipment);
            }
        }
    }

    /// Fetch for the current node's data unless it is loaded or in flight.
    fn ensure_loaded(&mut self) -> Option<FetchRequest> {
        let owner = self.node().data_owner();
        let loaded = match &owner {
            NavNode::Floor { floor_number, .. } => {
                self.floor_equipment.contains_key(floor_number)
            }
            _ => self.building.is_some(),
        };
        let in_flight = self
            .pending
            .as_ref()
            .is_some_and(|ticket| ticket.node == owner);
        if loaded || in_flight {
            return None;
        }
        Some(self.issue(owner))
    }

    /// New ticket for `owner`, superseding whatever was pending.
    fn issue(&mut self, owner: NavNode) -> FetchRequest {
        self.generation += 1;
        let kind = match &owner {
            NavNode::Floor {
                building_id,
                floor_number,
            } => FetchKind::FloorEquipment {
                building_id: building_id.clone(),
                floor_number: *floor_number,
            },
            other => FetchKind::Building {
                building_id: other.building_id().to_string(),
            },
        };
        let ticket = FetchTicket {
            node: owner,
            generation: self.generation,
        };
        self.pending = Some(ticket.clone());
        FetchRequest { ticket, kind }
    }

    fn find_floor(&self, number: i32) -> Option<&Floor> {
        self.floors.iter().find(|floor| floor.number == number)
    }

    fn sorted_equipment(
        &self,
        floor_number: i32,
        keep: impl Fn(&Equipment) -> bool,
    ) -> Vec<&Equipment> {
        let mut items: Vec<&Equipment> = self
            .floor_equipment(floor_number)
            .map(|all| all.iter().filter(|&item| keep(item)).collect())
            .unwrap_or_default();
        items.sort_by(|a, b| by_id(a, b));
        items
    }
}

fn equipment_item(
    building_id: &str,
    floor_number: i32,
    room_id: Option<&String>,
    item: &Equipment,
) -> NavItem {
    NavItem {
        label: item.label(),
        node: NavNode::Equipment {
            building_id: building_id.to_string(),
            floor_number,
            room_id: room_id.cloned(),
            equipment_id: item.id.clone(),
        },
    }
}

fn as_fetch_failure(err: SpatialError) -> SpatialError {
    if err.is_fetch_failure() {
        err
    } else {
        SpatialError::DataUnavailable(err.to_string())
    }
}
