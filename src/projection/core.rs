use crate::error::{Result, SpatialError};
use crate::geometry::{BoundingBox, Point2D, Size};

/// Smallest canvas edge used for degenerate floors so walls stay visible.
pub const MIN_CANVAS_CELLS: u16 = 3;

/// Grid cell produced for a continuous position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Projection {
    pub x: i64,
    pub y: i64,
    /// Cell falls outside a viewport that is smaller than the floor.
    pub clipped: bool,
}

impl Projection {
    /// Cell coordinates when they fall inside `canvas`.
    pub fn cell_within(&self, canvas: Size) -> Option<(u16, u16)> {
        let inside = self.x >= 0
            && self.y >= 0
            && self.x < i64::from(canvas.width)
            && self.y < i64::from(canvas.height);
        inside.then(|| (self.x as u16, self.y as u16))
    }
}

/// Maps floor-local meters onto integer grid cells at a fixed scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateProjector {
    scale: f64,
}

impl CoordinateProjector {
    /// `scale` is meters per cell and must be finite and positive.
    pub fn new(scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SpatialError::InvalidConfig(format!(
                "scale must be a positive number of meters per cell, got {scale}"
            )));
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Floor-rounded cell for `pos`, relative to the floor's min corner.
    ///
    /// Flooring keeps the mapping stable: a coordinate never jumps cells
    /// because of round-to-nearest on values like `x.4999`.
    pub fn cell(&self, pos: Point2D, bounds: &BoundingBox) -> (i64, i64) {
        let x = ((pos.x - bounds.min.x) / self.scale).floor() as i64;
        let y = ((pos.y - bounds.min.y) / self.scale).floor() as i64;
        (x, y)
    }

    /// Cells needed to cover the floor at this scale, before viewport clamping.
    pub fn natural_extent(&self, bounds: &BoundingBox) -> (u64, u64) {
        let width = (bounds.width() / self.scale).ceil();
        let height = (bounds.height() / self.scale).ceil();
        (width.max(0.0) as u64, height.max(0.0) as u64)
    }

    pub fn exceeds_viewport(&self, bounds: &BoundingBox, viewport: Size) -> bool {
        let (width, height) = self.natural_extent(bounds);
        width > u64::from(viewport.width) || height > u64::from(viewport.height)
    }

    pub fn project(&self, pos: Point2D, bounds: &BoundingBox, viewport: Size) -> Projection {
        let (x, y) = self.cell(pos, bounds);
        let outside = x < 0
            || y < 0
            || x >= i64::from(viewport.width)
            || y >= i64::from(viewport.height);
        Projection {
            x,
            y,
            clipped: outside && self.exceeds_viewport(bounds, viewport),
        }
    }

    /// Canvas dimensions: the natural extent clamped to the viewport.
    ///
    /// Floors without bounds or with zero area get [`MIN_CANVAS_CELLS`] per
    /// axis, still never more than the viewport.
    pub fn canvas_size(&self, bounds: Option<&BoundingBox>, viewport: Size) -> Size {
        let (width, height) = bounds
            .map(|bbox| self.natural_extent(bbox))
            .unwrap_or((0, 0));
        Size::new(
            clamp_axis(width, viewport.width),
            clamp_axis(height, viewport.height),
        )
    }
}

fn clamp_axis(natural: u64, limit: u16) -> u16 {
    let floor = u64::from(MIN_CANVAS_CELLS);
    natural.max(floor).min(u64::from(limit)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(w: f64, h: f64) -> BoundingBox {
        BoundingBox::planar(Point2D::new(0.0, 0.0), Point2D::new(w, h)).unwrap()
    }

    #[test]
    fn non_positive_scale_is_invalid_config() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = CoordinateProjector::new(scale).unwrap_err();
            assert!(matches!(err, SpatialError::InvalidConfig(_)));
        }
    }

    #[test]
    fn scenario_point_projects_without_clipping() {
        let projector = CoordinateProjector::new(0.5).unwrap();
        let floor = bounds(20.0, 15.0);
        for viewport in [Size::new(40, 30), Size::new(80, 40), Size::new(200, 100)] {
            let projection = projector.project(Point2D::new(10.5, 15.2), &floor, viewport);
            assert_eq!(
                projection,
                Projection {
                    x: 21,
                    y: 30,
                    clipped: false
                }
            );
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let projector = CoordinateProjector::new(0.3).unwrap();
        let floor = bounds(17.3, 9.1);
        let viewport = Size::new(25, 12);
        let first = projector.project(Point2D::new(11.7, 4.45), &floor, viewport);
        for _ in 0..100 {
            assert_eq!(
                projector.project(Point2D::new(11.7, 4.45), &floor, viewport),
                first
            );
        }
    }

    #[test]
    fn flooring_assigns_boundaries_consistently() {
        let projector = CoordinateProjector::new(1.0).unwrap();
        let floor = bounds(10.0, 10.0);
        assert_eq!(projector.cell(Point2D::new(2.0, 2.0), &floor), (2, 2));
        assert_eq!(projector.cell(Point2D::new(2.999, 2.5), &floor), (2, 2));
        assert_eq!(projector.cell(Point2D::new(-0.5, 0.0), &floor), (-1, 0));
    }

    #[test]
    fn oversized_floor_clips_outside_viewport() {
        let projector = CoordinateProjector::new(1.0).unwrap();
        let floor = bounds(100.0, 50.0);
        let viewport = Size::new(40, 20);
        assert!(projector.exceeds_viewport(&floor, viewport));
        assert!(!projector.project(Point2D::new(39.5, 19.5), &floor, viewport).clipped);
        assert!(projector.project(Point2D::new(40.0, 5.0), &floor, viewport).clipped);
        assert!(projector.project(Point2D::new(5.0, 20.0), &floor, viewport).clipped);
        assert_eq!(projector.canvas_size(Some(&floor), viewport), viewport);
    }

    #[test]
    fn canvas_never_exceeds_viewport() {
        let projector = CoordinateProjector::new(0.25).unwrap();
        let floor = bounds(30.0, 30.0);
        for viewport in [Size::new(1, 1), Size::new(2, 50), Size::new(80, 24)] {
            let canvas = projector.canvas_size(Some(&floor), viewport);
            assert!(canvas.width <= viewport.width);
            assert!(canvas.height <= viewport.height);
        }
    }

    #[test]
    fn degenerate_floor_gets_minimum_canvas() {
        let projector = CoordinateProjector::new(1.0).unwrap();
        let point_floor = bounds(0.0, 0.0);
        assert_eq!(
            projector.canvas_size(Some(&point_floor), Size::new(80, 24)),
            Size::new(3, 3)
        );
        assert_eq!(projector.canvas_size(None, Size::new(80, 24)), Size::new(3, 3));
        assert_eq!(projector.canvas_size(None, Size::new(2, 1)), Size::new(2, 1));
    }

    #[test]
    fn cell_within_rejects_negative_and_overflow() {
        let canvas = Size::new(10, 5);
        let inside = Projection {
            x: 9,
            y: 4,
            clipped: false,
        };
        assert_eq!(inside.cell_within(canvas), Some((9, 4)));
        let negative = Projection {
            x: -1,
            y: 0,
            clipped: false,
        };
        assert_eq!(negative.cell_within(canvas), None);
        let overflow = Projection {
            x: 10,
            y: 0,
            clipped: false,
        };
        assert_eq!(overflow.cell_within(canvas), None);
    }
}
