//! One-shot entry points composing repository, query engine and renderer.

use crate::error::{Result, SpatialError};
use crate::geometry::Size;
use crate::model::{Floor, FloorSpatialData, coverage_ratio};
use crate::query::SpatialQuery;
use crate::render::{GridRenderer, RenderOptions};
use crate::repository::SpatialRepository;

/// Render one floor of a building with the default symbol set.
pub fn render_floor<R>(
    repo: &R,
    building_id: &str,
    floor_number: i32,
    opts: &RenderOptions,
    viewport: Size,
) -> Result<String>
where
    R: SpatialRepository + ?Sized,
{
    render_floor_with(
        repo,
        &GridRenderer::with_default(),
        building_id,
        floor_number,
        opts,
        viewport,
    )
}

/// Same as [`render_floor`] with a caller-owned renderer (custom symbols).
pub fn render_floor_with<R>(
    repo: &R,
    renderer: &GridRenderer,
    building_id: &str,
    floor_number: i32,
    opts: &RenderOptions,
    viewport: Size,
) -> Result<String>
where
    R: SpatialRepository + ?Sized,
{
    opts.validate()?;
    let data = load_floor(repo, building_id, floor_number)?;
    renderer.render_to_string(&data, opts, viewport)
}

/// Floor record plus its equipment, straight from the store.
pub fn load_floor<R>(repo: &R, building_id: &str, floor_number: i32) -> Result<FloorSpatialData>
where
    R: SpatialRepository + ?Sized,
{
    let floor = find_floor(repo, building_id, floor_number)?;
    let equipment =
        repo.get_equipment_positions(building_id, &SpatialQuery::floor(floor_number))?;
    Ok(FloorSpatialData::new(floor, equipment))
}

/// Fraction of the floor's extent covered by scanned regions on that floor.
pub fn floor_coverage<R>(
    repo: &R,
    building_id: &str,
    floor_number: i32,
    resolution: f64,
) -> Result<f64>
where
    R: SpatialRepository + ?Sized,
{
    let data = load_floor(repo, building_id, floor_number)?;
    let Some(bounds) = data.bounds() else {
        return Ok(0.0);
    };
    let regions: Vec<_> = repo
        .get_scanned_regions(building_id)?
        .into_iter()
        .filter(|region| region.floor == floor_number)
        .collect();
    coverage_ratio(&bounds, &regions, resolution)
}

fn find_floor<R>(repo: &R, building_id: &str, floor_number: i32) -> Result<Floor>
where
    R: SpatialRepository + ?Sized,
{
    repo.get_building(building_id)?;
    repo.get_floors(building_id)?
        .into_iter()
        .find(|floor| floor.number == floor_number)
        .ok_or_else(|| SpatialError::not_found("floor", format!("{building_id}/{floor_number}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point2D, Point3D};
    use crate::model::{Building, Equipment, PositionConfidence, ScanRegion};
    use crate::repository::{BuildingSnapshot, InMemoryRepository};

    fn repo() -> InMemoryRepository {
        let bounds = BoundingBox::planar(Point2D::new(0.0, 0.0), Point2D::new(20.0, 15.0)).unwrap();
        InMemoryRepository::new().with_building(
            BuildingSnapshot::new(Building::new("b1", "HQ"))
                .with_floor(Floor::new("f1", "b1", 1, "Ground").with_bounds(bounds))
                .with_floor(Floor::new("f3", "b1", 3, "Empty"))
                .with_equipment(
                    Equipment::new("E1", "AHU", "hvac")
                        .on_floor(1)
                        .at(Point3D::new(10.5, 15.2, 0.0)),
                )
                .with_scan(ScanRegion {
                    id: "s1".into(),
                    building_id: "b1".into(),
                    floor: 1,
                    bounds: BoundingBox::planar(Point2D::new(0.0, 0.0), Point2D::new(10.0, 15.0))
                        .unwrap(),
                    scanned_at_ms: 0,
                    point_count: 4_000,
                    confidence: PositionConfidence::Medium,
                })
                .with_scan(ScanRegion {
                    id: "s2".into(),
                    building_id: "b1".into(),
                    floor: 3,
                    bounds: BoundingBox::planar(Point2D::new(0.0, 0.0), Point2D::new(20.0, 15.0))
                        .unwrap(),
                    scanned_at_ms: 0,
                    point_count: 4_000,
                    confidence: PositionConfidence::Medium,
                }),
        )
    }

    #[test]
    fn renders_floor_from_repository() {
        let output =
            render_floor(&repo(), "b1", 1, &RenderOptions::default(), Size::new(80, 40)).unwrap();
        assert!(output.starts_with("Floor 1: Ground"));
        assert!(output.contains("Equipment (1)"));
        assert!(output.contains("E1"));
    }

    #[test]
    fn empty_floor_still_renders() {
        let output =
            render_floor(&repo(), "b1", 3, &RenderOptions::default(), Size::new(80, 40)).unwrap();
        assert!(!output.is_empty());
        assert!(output.contains("┌─┐"));
        assert!(output.contains("Legend:"));
        assert!(output.contains("Equipment (0)"));
    }

    #[test]
    fn missing_floor_is_not_found() {
        let err = render_floor(&repo(), "b1", 7, &RenderOptions::default(), Size::new(80, 40))
            .unwrap_err();
        assert!(matches!(err, SpatialError::NotFound { kind: "floor", ref id } if id == "b1/7"));
    }

    #[test]
    fn missing_building_is_not_found() {
        let err = render_floor(&repo(), "b2", 1, &RenderOptions::default(), Size::new(80, 40))
            .unwrap_err();
        assert!(matches!(err, SpatialError::NotFound { kind: "building", .. }));
    }

    #[test]
    fn invalid_scale_fails_before_fetching() {
        let repo = repo();
        let opts = RenderOptions::default().with_scale(0.0);
        let err = render_floor(&repo, "b1", 1, &opts, Size::new(80, 40)).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidConfig(_)));
        assert_eq!(repo.call_count(), 0);
    }

    #[test]
    fn coverage_uses_regions_of_the_same_floor() {
        let ratio = floor_coverage(&repo(), "b1", 1, 0.5).unwrap();
        assert!((ratio - 0.5).abs() < 1e-9);
        assert_eq!(floor_coverage(&repo(), "b1", 3, 0.5).unwrap(), 0.0);
    }
}
