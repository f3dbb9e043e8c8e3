#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::WarpError;

/// A real-valued 2D point.
///
/// Used both for normalized unit-square coordinates and for unrestricted
/// world-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 2]", into = "[f64; 2]"))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise clamp to [0, 1].
    pub fn clamp_unit(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }

    /// Component-wise product.
    pub fn scale(self, s: Point2) -> Self {
        Self {
            x: self.x * s.x,
            y: self.y * s.y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2 {
    fn from(p: [f64; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl std::ops::Add for Point2 {
    type Output = Point2;
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point2 {
    type Output = Point2;
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Semantic position of a corner within a [`CornerSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn from_index(index: usize) -> Result<Corner, WarpError> {
        Corner::ALL
            .get(index)
            .copied()
            .ok_or(WarpError::CornerIndex(index))
    }

    /// The unit-square corner this quad corner is mapped from.
    pub fn unit(self) -> Point2 {
        match self {
            Corner::TopLeft => Point2::new(0.0, 0.0),
            Corner::TopRight => Point2::new(1.0, 0.0),
            Corner::BottomRight => Point2::new(1.0, 1.0),
            Corner::BottomLeft => Point2::new(0.0, 1.0),
        }
    }
}

/// Exactly four points in the fixed order top-left, top-right, bottom-right,
/// bottom-left.
///
/// Points are never reordered; callers must supply them in this order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[[f64; 2]; 4]", into = "[[f64; 2]; 4]"))]
pub struct CornerSet {
    points: [Point2; 4],
}

impl CornerSet {
    /// The unit square (0,0), (1,0), (1,1), (0,1).
    pub const UNIT: CornerSet = CornerSet {
        points: [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ],
    };

    pub const fn new(points: [Point2; 4]) -> Self {
        Self { points }
    }

    /// Build a corner set from a slice that must hold exactly four points.
    pub fn from_slice(points: &[Point2]) -> Result<Self, WarpError> {
        let points: [Point2; 4] = points
            .try_into()
            .map_err(|_| WarpError::CornerCount(points.len()))?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point2; 4] {
        &self.points
    }

    pub fn corner(&self, corner: Corner) -> Point2 {
        self.points[corner as usize]
    }

    pub fn get(&self, index: usize) -> Result<Point2, WarpError> {
        self.points
            .get(index)
            .copied()
            .ok_or(WarpError::CornerIndex(index))
    }

    pub fn set(&mut self, index: usize, p: Point2) -> Result<(), WarpError> {
        let slot = self
            .points
            .get_mut(index)
            .ok_or(WarpError::CornerIndex(index))?;
        *slot = p;
        Ok(())
    }

    /// Copy with every point clamped to [0, 1].
    pub fn clamped(&self) -> Self {
        Self {
            points: self.points.map(Point2::clamp_unit),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point2> {
        self.points.iter()
    }
}

impl Default for CornerSet {
    fn default() -> Self {
        CornerSet::UNIT
    }
}

impl From<[[f64; 2]; 4]> for CornerSet {
    fn from(p: [[f64; 2]; 4]) -> Self {
        Self {
            points: p.map(Point2::from),
        }
    }
}

impl From<CornerSet> for [[f64; 2]; 4] {
    fn from(c: CornerSet) -> Self {
        c.points.map(<[f64; 2]>::from)
    }
}
