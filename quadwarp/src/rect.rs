#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fit::{RectFit, RectLayout, RectSpace};
use crate::geom::Point2;

/// Placement of a rectangle inside a parent rectangle.
///
/// `position` is the world position of the pivot. The rendered size is
/// `size_delta + parent_size * (anchor_max - anchor_min)` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RectTransform {
    pub position: Point2,
    /// In-plane rotation in radians.
    pub rotation: f64,
    pub lossy_scale: Point2,
    pub pivot: Point2,
    pub anchor_min: Point2,
    pub anchor_max: Point2,
    pub size_delta: Point2,
    pub parent_size: Point2,
}

impl Default for RectTransform {
    fn default() -> Self {
        Self {
            position: Point2::ZERO,
            rotation: 0.0,
            lossy_scale: Point2::new(1.0, 1.0),
            pivot: Point2::new(0.5, 0.5),
            anchor_min: Point2::new(0.5, 0.5),
            anchor_max: Point2::new(0.5, 0.5),
            size_delta: Point2::new(100.0, 100.0),
            parent_size: Point2::new(100.0, 100.0),
        }
    }
}

impl RectTransform {
    /// Rendered width and height in local units.
    pub fn rect_size(&self) -> Point2 {
        Point2::new(
            self.size_delta.x + self.parent_size.x * (self.anchor_max.x - self.anchor_min.x),
            self.size_delta.y + self.parent_size.y * (self.anchor_max.y - self.anchor_min.y),
        )
    }

    pub fn layout(&self) -> RectLayout {
        RectLayout {
            pivot: self.pivot,
            anchor_min: self.anchor_min,
            anchor_max: self.anchor_max,
            parent_size: self.parent_size,
            lossy_scale: self.lossy_scale,
        }
    }

    pub fn apply_fit(&mut self, fit: &RectFit) {
        self.position = fit.position;
        self.size_delta = fit.size_delta;
    }

    /// Copy of this transform with `fit` applied.
    pub fn with_fit(&self, fit: &RectFit) -> Self {
        let mut rect = *self;
        rect.apply_fit(fit);
        rect
    }
}

impl RectSpace for RectTransform {
    fn to_local(&self, world: Point2) -> Point2 {
        let d = world - self.position;
        let (sin, cos) = self.rotation.sin_cos();
        let rx = cos * d.x + sin * d.y;
        let ry = -sin * d.x + cos * d.y;
        let sx = if self.lossy_scale.x != 0.0 {
            rx / self.lossy_scale.x
        } else {
            0.0
        };
        let sy = if self.lossy_scale.y != 0.0 {
            ry / self.lossy_scale.y
        } else {
            0.0
        };
        Point2::new(sx, sy)
    }

    fn to_world(&self, local: Point2) -> Point2 {
        let s = local.scale(self.lossy_scale);
        let (sin, cos) = self.rotation.sin_cos();
        Point2::new(
            self.position.x + cos * s.x - sin * s.y,
            self.position.y + sin * s.x + cos * s.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_size_follows_anchors() {
        let rect = RectTransform {
            anchor_min: Point2::new(0.0, 0.25),
            anchor_max: Point2::new(1.0, 0.75),
            size_delta: Point2::new(-20.0, 10.0),
            parent_size: Point2::new(200.0, 100.0),
            ..Default::default()
        };
        assert_eq!(rect.rect_size(), Point2::new(180.0, 60.0));
    }

    #[test]
    fn local_world_inverse() {
        let rect = RectTransform {
            position: Point2::new(3.0, -7.0),
            rotation: 0.6,
            lossy_scale: Point2::new(2.0, 0.5),
            ..Default::default()
        };
        let p = Point2::new(12.5, 4.25);
        let back = rect.to_world(rect.to_local(p));
        assert!((back.x - p.x).abs() < 1e-9, "x={}", back.x);
        assert!((back.y - p.y).abs() < 1e-9, "y={}", back.y);
    }

    #[test]
    fn quarter_turn_rotates_axes() {
        let rect = RectTransform {
            rotation: std::f64::consts::FRAC_PI_2,
            ..Default::default()
        };
        let w = rect.to_world(Point2::new(1.0, 0.0));
        assert!(w.x.abs() < 1e-12 && (w.y - 1.0).abs() < 1e-12, "{w:?}");
    }

    #[test]
    fn zero_scale_maps_to_origin() {
        let rect = RectTransform {
            lossy_scale: Point2::ZERO,
            ..Default::default()
        };
        assert_eq!(rect.to_local(Point2::new(4.0, 9.0)), Point2::ZERO);
    }
}
