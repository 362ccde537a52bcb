//! Scanned-region coverage metadata.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::geometry::{BoundingBox, Point2D};

use super::PositionConfidence;

/// Area of a floor captured by a site scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRegion {
    pub id: String,
    pub building_id: String,
    pub floor: i32,
    pub bounds: BoundingBox,
    #[serde(default)]
    pub scanned_at_ms: u64,
    #[serde(default)]
    pub point_count: u64,
    #[serde(default)]
    pub confidence: PositionConfidence,
}

/// Samples per axis never exceed this, whatever the requested resolution.
pub const MAX_AXIS_SAMPLES: u64 = 1024;

/// Fraction (0.0..=1.0) of `bounds` covered by at least one region.
///
/// Sampled on a lattice of `resolution` meters; cell centers decide coverage.
/// The lattice is coarsened per axis to at most [`MAX_AXIS_SAMPLES`] cells.
/// Zero-area bounds report 0.0.
pub fn coverage_ratio(
    bounds: &BoundingBox,
    regions: &[ScanRegion],
    resolution: f64,
) -> Result<f64> {
    if !(resolution > 0.0) || !resolution.is_finite() {
        return Err(SpatialError::InvalidConfig(format!(
            "coverage resolution must be positive, got {resolution}"
        )));
    }

    let step_x = resolution.max(bounds.width() / MAX_AXIS_SAMPLES as f64);
    let step_y = resolution.max(bounds.height() / MAX_AXIS_SAMPLES as f64);
    let cols = ((bounds.width() / step_x).ceil() as u64).min(MAX_AXIS_SAMPLES);
    let rows = ((bounds.height() / step_y).ceil() as u64).min(MAX_AXIS_SAMPLES);
    if cols == 0 || rows == 0 {
        return Ok(0.0);
    }

    let mut covered = 0u64;
    for row in 0..rows {
        for col in 0..cols {
            let sample = Point2D::new(
                (bounds.min.x + (col as f64 + 0.5) * step_x).min(bounds.max.x),
                (bounds.min.y + (row as f64 + 0.5) * step_y).min(bounds.max.y),
            );
            if regions
                .iter()
                .any(|region| region.bounds.contains_planar(&sample))
            {
                covered += 1;
            }
        }
    }

    Ok(covered as f64 / (cols * rows) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: &str, min: (f64, f64), max: (f64, f64)) -> ScanRegion {
        ScanRegion {
            id: id.into(),
            building_id: "b1".into(),
            floor: 1,
            bounds: BoundingBox::planar(Point2D::new(min.0, min.1), Point2D::new(max.0, max.1))
                .unwrap(),
            scanned_at_ms: 0,
            point_count: 1_000,
            confidence: PositionConfidence::High,
        }
    }

    fn floor_bounds() -> BoundingBox {
        BoundingBox::planar(Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)).unwrap()
    }

    #[test]
    fn half_covered_floor() {
        let ratio = coverage_ratio(&floor_bounds(), &[region("s1", (0.0, 0.0), (5.0, 10.0))], 1.0)
            .unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn overlapping_regions_count_once() {
        let regions = [
            region("s1", (0.0, 0.0), (10.0, 10.0)),
            region("s2", (2.0, 2.0), (8.0, 8.0)),
        ];
        let ratio = coverage_ratio(&floor_bounds(), &regions, 0.5).unwrap();
        assert!((ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn no_regions_means_no_coverage() {
        assert_eq!(coverage_ratio(&floor_bounds(), &[], 1.0).unwrap(), 0.0);
    }

    #[test]
    fn tiny_resolution_uses_a_bounded_lattice() {
        let regions = [region("s1", (0.0, 0.0), (5.0, 10.0))];
        for resolution in [1e-9, f64::MIN_POSITIVE] {
            let ratio = coverage_ratio(&floor_bounds(), &regions, resolution).unwrap();
            assert!((ratio - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn resolution_must_be_positive() {
        let err = coverage_ratio(&floor_bounds(), &[], 0.0).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidConfig(_)));
    }
}
