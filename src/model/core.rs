use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geometry::{BoundingBox, Point2D, Point3D};

/// Building record as returned by the spatial store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at_ms: u64,
    #[serde(default)]
    pub updated_at_ms: u64,
}

impl Building {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            description: String::new(),
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }
}

/// How a floor's geometry was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorConfidence {
    High,
    Medium,
    #[default]
    Low,
}

impl FloorConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    pub building_id: String,
    /// Display ordering key. Not guaranteed contiguous.
    pub number: i32,
    pub name: String,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
    #[serde(default)]
    pub confidence: FloorConfidence,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Floor {
    pub fn new(
        id: impl Into<String>,
        building_id: impl Into<String>,
        number: i32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            building_id: building_id.into(),
            number,
            name: name.into(),
            height: 0.0,
            elevation: 0.0,
            bounds: None,
            confidence: FloorConfidence::default(),
            rooms: Vec::new(),
        }
    }

    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Planar extent covering the positioned equipment and every room footprint.
    pub fn derive_bounds(&self, equipment: &[Equipment]) -> Option<BoundingBox> {
        let equipment_box = BoundingBox::from_points(
            equipment
                .iter()
                .filter_map(|item| item.position)
                .map(|pos| Point3D::new(pos.x, pos.y, 0.0)),
        );
        self.rooms
            .iter()
            .map(Room::extent)
            .fold(equipment_box, |acc, extent| match acc {
                Some(current) => Some(current.union(&extent)),
                None => Some(extent),
            })
    }

    /// Stored bounds, falling back to the derived extent.
    pub fn effective_bounds(&self, equipment: &[Equipment]) -> Option<BoundingBox> {
        self.bounds.or_else(|| self.derive_bounds(equipment))
    }

    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("Floor {}", self.number)
        } else {
            format!("Floor {}: {}", self.number, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub number: String,
    #[serde(default)]
    pub name: String,
    pub center: Point2D,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub equipment_ids: Vec<String>,
}

impl Room {
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
        center: Point2D,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            name: String::new(),
            center,
            width,
            height,
            equipment_ids: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_equipment<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equipment_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Footprint rectangle. Negative dimensions are treated as their magnitude.
    pub fn extent(&self) -> BoundingBox {
        let half_w = self.width.abs() / 2.0;
        let half_h = self.height.abs() / 2.0;
        BoundingBox {
            min: Point3D::new(self.center.x - half_w, self.center.y - half_h, 0.0),
            max: Point3D::new(self.center.x + half_w, self.center.y + half_h, 0.0),
        }
    }

    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("Room {}", self.number)
        } else {
            format!("Room {}: {}", self.number, self.name)
        }
    }

    /// Text stamped inside the footprint on the canvas.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.number
        } else {
            &self.name
        }
    }
}

/// Lifecycle status. Unknown strings are preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EquipmentStatus {
    #[default]
    Operational,
    Maintenance,
    Offline,
    Other(String),
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Operational => "operational",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
            Self::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "operational" => Self::Operational,
            "maintenance" => Self::Maintenance,
            "offline" => Self::Offline,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EquipmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EquipmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Ordinal quality of a recorded position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PositionConfidence {
    #[default]
    Estimated,
    Low,
    Medium,
    High,
}

impl PositionConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estimated => "estimated",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: EquipmentStatus,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub position: Option<Point3D>,
    #[serde(default)]
    pub confidence: PositionConfidence,
    #[serde(default)]
    pub position_source: String,
}

impl Equipment {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            status: EquipmentStatus::default(),
            floor: None,
            room_id: None,
            position: None,
            confidence: PositionConfidence::default(),
            position_source: String::new(),
        }
    }

    pub fn at(mut self, position: Point3D) -> Self {
        self.position = Some(position);
        self
    }

    pub fn on_floor(mut self, number: i32) -> Self {
        self.floor = Some(number);
        self
    }

    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_confidence(
        mut self,
        confidence: PositionConfidence,
        source: impl Into<String>,
    ) -> Self {
        self.confidence = confidence;
        self.position_source = source.into();
        self
    }

    pub fn is_positioned(&self) -> bool {
        self.position.is_some()
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

/// Ascending id order, the deterministic tie-break used across the crate.
pub fn by_id(a: &Equipment, b: &Equipment) -> Ordering {
    a.id.cmp(&b.id)
}

/// Render input: one floor plus the equipment loaded for it.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorSpatialData {
    pub floor: Floor,
    pub equipment: Vec<Equipment>,
}

impl FloorSpatialData {
    pub fn new(floor: Floor, equipment: Vec<Equipment>) -> Self {
        Self { floor, equipment }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.floor.effective_bounds(&self.equipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_ordinal() {
        assert!(PositionConfidence::Estimated < PositionConfidence::Low);
        assert!(PositionConfidence::Low < PositionConfidence::Medium);
        assert!(PositionConfidence::Medium < PositionConfidence::High);
    }

    #[test]
    fn status_keeps_unknown_values() {
        let status: EquipmentStatus = serde_json::from_str("\"decommissioned\"").unwrap();
        assert_eq!(status, EquipmentStatus::Other("decommissioned".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"decommissioned\"");
        let known: EquipmentStatus = serde_json::from_str("\"Maintenance\"").unwrap();
        assert_eq!(known, EquipmentStatus::Maintenance);
    }

    #[test]
    fn equipment_type_uses_wire_name() {
        let json = r#"{"id":"E1","name":"AHU","type":"hvac","position":{"x":1.0,"y":2.0}}"#;
        let item: Equipment = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, "hvac");
        assert_eq!(item.position, Some(Point3D::new(1.0, 2.0, 0.0)));
        assert_eq!(item.confidence, PositionConfidence::Estimated);
    }

    #[test]
    fn floor_bounds_cover_rooms_and_equipment() {
        let floor = Floor::new("f1", "b1", 1, "Ground").with_rooms(vec![Room::new(
            "r1",
            "101",
            Point2D::new(5.0, 5.0),
            4.0,
            2.0,
        )]);
        let equipment = vec![
            Equipment::new("E1", "AHU", "hvac").at(Point3D::new(12.0, 1.0, 3.0)),
            Equipment::new("E2", "Loose", "outlet"),
        ];
        let bounds = floor.derive_bounds(&equipment).unwrap();
        assert_eq!(bounds.min, Point3D::new(3.0, 1.0, 0.0));
        assert_eq!(bounds.max, Point3D::new(12.0, 6.0, 0.0));
    }

    #[test]
    fn empty_floor_has_null_bounds() {
        let floor = Floor::new("f1", "b1", 1, "Ground");
        assert!(floor.derive_bounds(&[]).is_none());
        assert!(floor.effective_bounds(&[]).is_none());
    }
}
