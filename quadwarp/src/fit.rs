//! Fitting a rectangle around a world-space quad and expressing the quad's
//! corners as normalized coordinates inside that rectangle.
//!
//! The rectangle's affine placement is owned by the caller and reached only
//! through [`RectSpace`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::geom::{CornerSet, Point2};

/// The affine transform pair tied to a rectangle's current placement.
///
/// Local space has its origin at the rectangle's pivot and is unscaled.
pub trait RectSpace {
    fn to_local(&self, world: Point2) -> Point2;
    fn to_world(&self, local: Point2) -> Point2;
}

impl<T: RectSpace + ?Sized> RectSpace for &T {
    fn to_local(&self, world: Point2) -> Point2 {
        (**self).to_local(world)
    }

    fn to_world(&self, local: Point2) -> Point2 {
        (**self).to_world(local)
    }
}

/// Axis-aligned bounds of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds {
    /// Per-axis min/max over the four points.
    ///
    /// This is not an oriented bound: for a rotated quad it can be looser
    /// than the quad itself.
    pub fn from_points(points: &[Point2; 4]) -> Self {
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Bounds { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Read-only layout parameters of the rectangle being fitted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RectLayout {
    pub pivot: Point2,
    pub anchor_min: Point2,
    pub anchor_max: Point2,
    /// Local size of the parent rectangle.
    pub parent_size: Point2,
    /// Current world scale of the rectangle.
    pub lossy_scale: Point2,
}

impl Default for RectLayout {
    fn default() -> Self {
        Self {
            pivot: Point2::new(0.5, 0.5),
            anchor_min: Point2::new(0.5, 0.5),
            anchor_max: Point2::new(0.5, 0.5),
            parent_size: Point2::ZERO,
            lossy_scale: Point2::new(1.0, 1.0),
        }
    }
}

/// Rectangle placement that encloses a world quad.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RectFit {
    pub bounds: Bounds,
    /// World position of the rectangle's pivot.
    pub position: Point2,
    /// Size delta to assign under the layout's anchors.
    pub size_delta: Point2,
    /// Unscaled width and height the rectangle renders at.
    pub local_size: Point2,
}

/// Result of [`world_to_normalized`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    pub fit: RectFit,
    pub corners: CornerSet,
}

fn div_or_zero(num: f64, den: f64) -> f64 {
    if den != 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Size delta along one axis so the rendered size equals `local` under the
/// given anchors.
fn axis_size_delta(local: f64, anchor_min: f64, anchor_max: f64, parent: f64) -> f64 {
    if anchor_min != anchor_max {
        let anchor_rate = anchor_max - anchor_min;
        -(parent * anchor_rate - local)
    } else {
        local
    }
}

/// Compute the rectangle placement enclosing the world quad.
pub fn fit_bounds(world: &[Point2; 4], layout: &RectLayout) -> RectFit {
    let bounds = Bounds::from_points(world);
    let width = bounds.width();
    let height = bounds.height();

    let position = Point2::new(
        bounds.min.x + width * layout.pivot.x,
        bounds.min.y + height * layout.pivot.y,
    );

    let local_size = Point2::new(
        div_or_zero(width, layout.lossy_scale.x),
        div_or_zero(height, layout.lossy_scale.y),
    );

    let size_delta = Point2::new(
        axis_size_delta(
            local_size.x,
            layout.anchor_min.x,
            layout.anchor_max.x,
            layout.parent_size.x,
        ),
        axis_size_delta(
            local_size.y,
            layout.anchor_min.y,
            layout.anchor_max.y,
            layout.parent_size.y,
        ),
    );

    RectFit {
        bounds,
        position,
        size_delta,
        local_size,
    }
}

/// Express world corners as clamped [0, 1] coordinates of a rectangle of
/// `local_size` whose placement is given by `space`.
pub fn normalize_corners<S: RectSpace + ?Sized>(
    world: &[Point2; 4],
    local_size: Point2,
    pivot: Point2,
    space: &S,
) -> CornerSet {
    let inverse_scale = Point2::new(
        div_or_zero(1.0, local_size.x),
        div_or_zero(1.0, local_size.y),
    );
    let pivot_offset = local_size.scale(pivot);

    let points = world.map(|p| {
        let local = space.to_local(p) + pivot_offset;
        local.scale(inverse_scale).clamp_unit()
    });
    CornerSet::new(points)
}

/// Fit a rectangle around `world` and express its corners in normalized form.
///
/// `place` receives the computed fit and must return the rectangle's affine
/// space after that fit is applied; normalization happens in that space.
pub fn world_to_normalized<S, F>(world: &[Point2; 4], layout: &RectLayout, place: F) -> Placement
where
    S: RectSpace,
    F: FnOnce(&RectFit) -> S,
{
    let fit = fit_bounds(world, layout);
    let space = place(&fit);
    let corners = normalize_corners(world, fit.local_size, layout.pivot, &space);
    Placement { fit, corners }
}

/// Map a normalized corner back to world space.
pub fn normalized_to_world<S: RectSpace + ?Sized>(
    index: usize,
    corners: &CornerSet,
    rect_size: Point2,
    pivot: Point2,
    space: &S,
) -> Result<Point2, WarpError> {
    let local = corners.get(index)?.scale(rect_size) - rect_size.scale(pivot);
    Ok(space.to_world(local))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Translation plus per-axis scale, pivot at `origin`.
    struct Shifted {
        origin: Point2,
        scale: Point2,
    }

    impl RectSpace for Shifted {
        fn to_local(&self, world: Point2) -> Point2 {
            let d = world - self.origin;
            Point2::new(d.x / self.scale.x, d.y / self.scale.y)
        }

        fn to_world(&self, local: Point2) -> Point2 {
            local.scale(self.scale) + self.origin
        }
    }

    fn quad() -> [Point2; 4] {
        [
            Point2::new(10.0, 20.0),
            Point2::new(30.0, 22.0),
            Point2::new(28.0, 40.0),
            Point2::new(12.0, 38.0),
        ]
    }

    #[test]
    fn bounds_are_per_axis() {
        let b = Bounds::from_points(&quad());
        assert_eq!(b.min, Point2::new(10.0, 20.0));
        assert_eq!(b.max, Point2::new(30.0, 40.0));
        assert_eq!(b.width(), 20.0);
        assert_eq!(b.height(), 20.0);
    }

    #[test]
    fn fit_places_pivot_and_unscales() {
        let layout = RectLayout {
            pivot: Point2::new(0.25, 0.75),
            lossy_scale: Point2::new(2.0, 4.0),
            ..Default::default()
        };
        let fit = fit_bounds(&quad(), &layout);
        assert_eq!(fit.position, Point2::new(15.0, 35.0));
        assert_eq!(fit.local_size, Point2::new(10.0, 5.0));
        assert_eq!(fit.size_delta, Point2::new(10.0, 5.0));
    }

    #[test]
    fn zero_scale_gives_zero_size() {
        let layout = RectLayout {
            lossy_scale: Point2::new(0.0, 1.0),
            ..Default::default()
        };
        let fit = fit_bounds(&quad(), &layout);
        assert_eq!(fit.local_size, Point2::new(0.0, 20.0));
        assert!(fit.size_delta.is_finite());
    }

    #[test]
    fn stretch_anchors_offset_size_delta() {
        let layout = RectLayout {
            anchor_min: Point2::new(0.0, 0.5),
            anchor_max: Point2::new(1.0, 0.5),
            parent_size: Point2::new(200.0, 300.0),
            ..Default::default()
        };
        let fit = fit_bounds(&quad(), &layout);
        // rendered width = size_delta + parent * anchor_rate
        assert_eq!(fit.size_delta.x, -180.0);
        assert_eq!(fit.size_delta.x + 200.0, fit.local_size.x);
        assert_eq!(fit.size_delta.y, 20.0);
    }

    #[test]
    fn world_round_trip() {
        let layout = RectLayout {
            pivot: Point2::new(0.25, 0.75),
            lossy_scale: Point2::new(2.0, 3.0),
            ..Default::default()
        };
        let world = quad();
        let placement = world_to_normalized(&world, &layout, |fit| Shifted {
            origin: fit.position,
            scale: layout.lossy_scale,
        });
        let space = Shifted {
            origin: placement.fit.position,
            scale: layout.lossy_scale,
        };

        for (i, want) in world.iter().enumerate() {
            let got = normalized_to_world(
                i,
                &placement.corners,
                placement.fit.local_size,
                layout.pivot,
                &space,
            )
            .unwrap();
            assert!(
                (got.x - want.x).abs() < 1e-9 && (got.y - want.y).abs() < 1e-9,
                "corner {i}: expected ({}, {}), got ({}, {})",
                want.x,
                want.y,
                got.x,
                got.y,
            );
        }
    }

    #[test]
    fn normalized_corners_are_clamped() {
        let layout = RectLayout::default();
        let world = quad();
        // A space offset from the fitted one pushes every corner outside [0, 1].
        let placement = world_to_normalized(&world, &layout, |fit| Shifted {
            origin: fit.position + Point2::new(-500.0, 500.0),
            scale: Point2::new(1.0, 1.0),
        });
        for p in placement.corners.iter() {
            assert_eq!(*p, Point2::new(1.0, 0.0));
        }
    }

    #[test]
    fn degenerate_world_quad_normalizes_to_zero() {
        let world = [Point2::new(5.0, 5.0); 4];
        let placement = world_to_normalized(&world, &RectLayout::default(), |fit| Shifted {
            origin: fit.position,
            scale: Point2::new(1.0, 1.0),
        });
        assert_eq!(placement.fit.local_size, Point2::ZERO);
        for p in placement.corners.iter() {
            assert_eq!(*p, Point2::ZERO);
        }
    }

    #[test]
    fn normalized_to_world_rejects_bad_index() {
        let space = Shifted {
            origin: Point2::ZERO,
            scale: Point2::new(1.0, 1.0),
        };
        let r = normalized_to_world(
            4,
            &CornerSet::UNIT,
            Point2::new(1.0, 1.0),
            Point2::ZERO,
            &space,
        );
        assert_eq!(r, Err(WarpError::CornerIndex(4)));
    }
}
