//! Geometry primitives shared by the query engine, projector and renderer.
//!
//! Continuous coordinates are meters in floor-local space. Discrete sizes are
//! measured in terminal character cells.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};

/// Integer size measured in terminal character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Planar point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Floor-local position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

impl From<Point2D> for Point3D {
    fn from(point: Point2D) -> Self {
        Point3D::new(point.x, point.y, 0.0)
    }
}

/// Axis-aligned box with `min <= max` on every axis.
///
/// Planar boxes carry `z = 0` on both corners. An empty point set has no
/// bounding box at all (`None`), never a zero-sized one. Decoding goes
/// through [`BoundingBox::new`], so stored boxes cannot be inverted either.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundingBoxRepr")]
pub struct BoundingBox {
    pub min: Point3D,
    pub max: Point3D,
}

#[derive(Deserialize)]
struct BoundingBoxRepr {
    min: Point3D,
    max: Point3D,
}

impl TryFrom<BoundingBoxRepr> for BoundingBox {
    type Error = SpatialError;

    fn try_from(raw: BoundingBoxRepr) -> Result<Self> {
        Self::new(raw.min, raw.max)
    }
}

impl BoundingBox {
    /// Build a box, rejecting inverted corners.
    pub fn new(min: Point3D, max: Point3D) -> Result<Self> {
        let inverted = [
            ("x", min.x, max.x),
            ("y", min.y, max.y),
            ("z", min.z, max.z),
        ]
        .into_iter()
        .find(|(_, lo, hi)| !(lo <= hi));

        match inverted {
            Some((axis, lo, hi)) => Err(SpatialError::InvalidQuery(format!(
                "bounding box min.{axis} ({lo}) exceeds max.{axis} ({hi})"
            ))),
            None => Ok(Self { min, max }),
        }
    }

    pub fn planar(min: Point2D, max: Point2D) -> Result<Self> {
        Self::new(min.into(), max.into())
    }

    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3D>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for point in iter {
            bbox.expand_to(point);
        }
        Some(bbox)
    }

    pub fn expand_to(&mut self, point: Point3D) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut merged = *self;
        merged.expand_to(other.min);
        merged.expand_to(other.max);
        merged
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Inclusive containment on all three axes.
    pub fn contains(&self, point: &Point3D) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Inclusive containment ignoring Z.
    pub fn contains_planar(&self, point: &Point2D) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}
