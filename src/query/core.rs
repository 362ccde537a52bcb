use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::geometry::{BoundingBox, Point3D};
use crate::model::{Equipment, PositionConfidence, by_id};

/// How radius queries measure distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    /// X/Y only; equipment on different heights of the same floor compare equal.
    #[default]
    Planar,
    /// Full X/Y/Z Euclidean distance.
    Euclidean3d,
}

/// Spatial filter descriptor. Exactly one predicate per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpatialQuery {
    Radius {
        center: Point3D,
        radius: f64,
        #[serde(default)]
        mode: DistanceMode,
    },
    BoundingBox {
        min: Point3D,
        max: Point3D,
    },
    Floor {
        number: i32,
    },
    Type {
        value: String,
    },
    MinConfidence {
        level: PositionConfidence,
    },
}

impl SpatialQuery {
    pub fn radius(center: Point3D, radius: f64) -> Self {
        Self::Radius {
            center,
            radius,
            mode: DistanceMode::default(),
        }
    }

    pub fn radius_3d(center: Point3D, radius: f64) -> Self {
        Self::Radius {
            center,
            radius,
            mode: DistanceMode::Euclidean3d,
        }
    }

    pub fn bbox(min: Point3D, max: Point3D) -> Self {
        Self::BoundingBox { min, max }
    }

    pub fn floor(number: i32) -> Self {
        Self::Floor { number }
    }

    pub fn of_type(value: impl Into<String>) -> Self {
        Self::Type {
            value: value.into(),
        }
    }

    /// Reject malformed descriptors before any filtering happens.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Radius { radius, .. } => {
                if radius.is_nan() || *radius < 0.0 {
                    return Err(SpatialError::InvalidQuery(format!(
                        "radius must be non-negative, got {radius}"
                    )));
                }
                Ok(())
            }
            Self::BoundingBox { min, max } => BoundingBox::new(*min, *max).map(|_| ()),
            Self::Floor { .. } | Self::Type { .. } | Self::MinConfidence { .. } => Ok(()),
        }
    }
}

pub fn distance(a: &Point3D, b: &Point3D, mode: DistanceMode) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    match mode {
        DistanceMode::Planar => (dx * dx + dy * dy).sqrt(),
        DistanceMode::Euclidean3d => {
            let dz = a.z - b.z;
            (dx * dx + dy * dy + dz * dz).sqrt()
        }
    }
}

/// Stateless evaluator for [`SpatialQuery`] descriptors.
///
/// Every call is a pure function of its inputs: nothing is cached and the
/// input slice is never reordered, so filters compose by chaining calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialQueryEngine;

impl SpatialQueryEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn query(&self, equipment: &[Equipment], query: &SpatialQuery) -> Result<Vec<Equipment>> {
        query.validate()?;

        match query {
            SpatialQuery::Radius {
                center,
                radius,
                mode,
            } => Ok(self.within_radius(equipment, center, *radius, *mode)),
            SpatialQuery::BoundingBox { min, max } => {
                let bbox = BoundingBox::new(*min, *max)?;
                Ok(sorted_by_id(equipment.iter().filter(|item| {
                    item.position
                        .as_ref()
                        .map(|pos| bbox.contains(pos))
                        .unwrap_or(false)
                })))
            }
            SpatialQuery::Floor { number } => Ok(sorted_by_id(
                equipment.iter().filter(|item| item.floor == Some(*number)),
            )),
            SpatialQuery::Type { value } => Ok(sorted_by_id(
                equipment.iter().filter(|item| same_type(&item.kind, value)),
            )),
            SpatialQuery::MinConfidence { level } => Ok(sorted_by_id(
                equipment.iter().filter(|item| item.confidence >= *level),
            )),
        }
    }

    /// Closest positioned item to `point`, optionally restricted to one type.
    pub fn nearest(
        &self,
        equipment: &[Equipment],
        point: &Point3D,
        mode: DistanceMode,
        type_filter: Option<&str>,
    ) -> Option<(Equipment, f64)> {
        equipment
            .iter()
            .filter(|item| {
                type_filter
                    .map(|kind| same_type(&item.kind, kind))
                    .unwrap_or(true)
            })
            .filter_map(|item| {
                item.position
                    .as_ref()
                    .map(|pos| (item, distance(point, pos, mode)))
            })
            .min_by(|a, b| compare_ranked(a, b))
            .map(|(item, dist)| (item.clone(), dist))
    }

    fn within_radius(
        &self,
        equipment: &[Equipment],
        center: &Point3D,
        radius: f64,
        mode: DistanceMode,
    ) -> Vec<Equipment> {
        let mut ranked: Vec<(&Equipment, f64)> = equipment
            .iter()
            .filter_map(|item| {
                let pos = item.position.as_ref()?;
                let dist = distance(center, pos, mode);
                (dist <= radius).then_some((item, dist))
            })
            .collect();
        ranked.sort_by(compare_ranked);
        ranked.into_iter().map(|(item, _)| item.clone()).collect()
    }
}

/// Case-insensitive type comparison, Unicode aware.
fn same_type(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn compare_ranked(a: &(&Equipment, f64), b: &(&Equipment, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| by_id(a.0, b.0))
}

fn sorted_by_id<'a>(items: impl Iterator<Item = &'a Equipment>) -> Vec<Equipment> {
    let mut out: Vec<Equipment> = items.cloned().collect();
    out.sort_by(by_id);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, kind: &str, pos: Option<(f64, f64, f64)>) -> Equipment {
        let base = Equipment::new(id, format!("{kind} {id}"), kind);
        match pos {
            Some((x, y, z)) => base.at(Point3D::new(x, y, z)),
            None => base,
        }
    }

    fn sample() -> Vec<Equipment> {
        vec![
            item("E3", "hvac", Some((3.0, 4.0, 0.0))),
            item("E1", "Electrical", Some((1.0, 0.0, 0.0))),
            item("E2", "hvac", Some((0.0, 1.0, 2.0))),
            item("E4", "outlet", None),
            item("E0", "lighting", Some((10.0, 10.0, 0.0))),
        ]
    }

    fn ids(items: &[Equipment]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn radius_orders_by_distance_then_id() {
        let engine = SpatialQueryEngine::new();
        let results = engine
            .query(&sample(), &SpatialQuery::radius(Point3D::default(), 5.0))
            .unwrap();
        // E1 and E2 are both 1.0 away in planar mode.
        assert_eq!(ids(&results), vec!["E1", "E2", "E3"]);
    }

    #[test]
    fn radius_3d_includes_height() {
        let engine = SpatialQueryEngine::new();
        let results = engine
            .query(&sample(), &SpatialQuery::radius_3d(Point3D::default(), 2.0))
            .unwrap();
        assert_eq!(ids(&results), vec!["E1"]);
    }

    #[test]
    fn negative_radius_is_rejected() {
        let engine = SpatialQueryEngine::new();
        let err = engine
            .query(&sample(), &SpatialQuery::radius(Point3D::default(), -1.0))
            .unwrap_err();
        assert!(matches!(err, SpatialError::InvalidQuery(_)));
    }

    #[test]
    fn zero_radius_matches_exact_position_only() {
        let engine = SpatialQueryEngine::new();
        let results = engine
            .query(
                &sample(),
                &SpatialQuery::radius(Point3D::new(1.0, 0.0, 0.0), 0.0),
            )
            .unwrap();
        assert_eq!(ids(&results), vec!["E1"]);
    }

    #[test]
    fn radius_results_grow_with_radius() {
        let engine = SpatialQueryEngine::new();
        let data = sample();
        let center = Point3D::new(2.0, 2.0, 0.0);
        let radii = [0.0, 1.0, 2.5, 3.0, 8.0, 20.0];
        for pair in radii.windows(2) {
            let small = engine
                .query(&data, &SpatialQuery::radius(center, pair[0]))
                .unwrap();
            let large = engine
                .query(&data, &SpatialQuery::radius(center, pair[1]))
                .unwrap();
            for found in &small {
                assert!(large.iter().any(|other| other.id == found.id));
            }
        }
    }

    #[test]
    fn bbox_is_inclusive_and_skips_unpositioned() {
        let engine = SpatialQueryEngine::new();
        let results = engine
            .query(
                &sample(),
                &SpatialQuery::bbox(Point3D::new(0.0, 0.0, 0.0), Point3D::new(3.0, 4.0, 0.0)),
            )
            .unwrap();
        assert_eq!(ids(&results), vec!["E1", "E3"]);
    }

    #[test]
    fn inverted_bbox_is_rejected() {
        let engine = SpatialQueryEngine::new();
        let err = engine
            .query(
                &sample(),
                &SpatialQuery::bbox(Point3D::new(0.0, 5.0, 0.0), Point3D::new(3.0, 4.0, 0.0)),
            )
            .unwrap_err();
        assert!(matches!(err, SpatialError::InvalidQuery(_)));
    }

    #[test]
    fn floor_filter_is_exact_subset_in_id_order() {
        let engine = SpatialQueryEngine::new();
        let data = vec![
            item("B", "hvac", None).on_floor(2),
            item("A", "hvac", Some((0.0, 0.0, 0.0))).on_floor(2),
            item("C", "hvac", None).on_floor(3),
            item("D", "hvac", None),
        ];
        let before = data.clone();
        let results = engine.query(&data, &SpatialQuery::floor(2)).unwrap();
        assert_eq!(ids(&results), vec!["A", "B"]);
        assert_eq!(data, before);
        assert!(engine.query(&data, &SpatialQuery::floor(7)).unwrap().is_empty());
    }

    #[test]
    fn type_match_ignores_case() {
        let engine = SpatialQueryEngine::new();
        let results = engine
            .query(&sample(), &SpatialQuery::of_type("HVAC"))
            .unwrap();
        assert_eq!(ids(&results), vec!["E2", "E3"]);
        let results = engine
            .query(&sample(), &SpatialQuery::of_type("electrical"))
            .unwrap();
        assert_eq!(ids(&results), vec!["E1"]);
    }

    #[test]
    fn min_confidence_filters_ordinally() {
        let engine = SpatialQueryEngine::new();
        let data = vec![
            item("A", "hvac", None).with_confidence(PositionConfidence::Low, "manual"),
            item("B", "hvac", None).with_confidence(PositionConfidence::High, "scanned"),
            item("C", "hvac", None).with_confidence(PositionConfidence::Medium, "imported"),
        ];
        let results = engine
            .query(
                &data,
                &SpatialQuery::MinConfidence {
                    level: PositionConfidence::Medium,
                },
            )
            .unwrap();
        assert_eq!(ids(&results), vec!["B", "C"]);
    }

    #[test]
    fn chained_filters_compose() {
        let engine = SpatialQueryEngine::new();
        let near = engine
            .query(&sample(), &SpatialQuery::radius(Point3D::default(), 6.0))
            .unwrap();
        let hvac = engine.query(&near, &SpatialQuery::of_type("hvac")).unwrap();
        assert_eq!(ids(&hvac), vec!["E2", "E3"]);
    }

    #[test]
    fn nearest_respects_type_filter() {
        let engine = SpatialQueryEngine::new();
        let (found, dist) = engine
            .nearest(
                &sample(),
                &Point3D::new(9.0, 9.0, 0.0),
                DistanceMode::Planar,
                Some("hvac"),
            )
            .unwrap();
        assert_eq!(found.id, "E3");
        assert!((dist - (36.0f64 + 25.0).sqrt()).abs() < 1e-9);
        assert!(
            engine
                .nearest(&sample(), &Point3D::default(), DistanceMode::Planar, Some("camera"))
                .is_none()
        );
    }

    #[test]
    fn query_descriptor_round_trips_as_tagged_json() {
        let query: SpatialQuery =
            serde_json::from_str(r#"{"kind":"radius","center":{"x":1.0,"y":2.0},"radius":3.0}"#)
                .unwrap();
        assert_eq!(
            query,
            SpatialQuery::Radius {
                center: Point3D::new(1.0, 2.0, 0.0),
                radius: 3.0,
                mode: DistanceMode::Planar,
            }
        );
    }
}
