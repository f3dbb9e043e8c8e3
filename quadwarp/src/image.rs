//! A warped image: a rectangle plus four normalized corners, with the
//! homography pair kept in sync with every corner change.

use crate::error::WarpError;
use crate::fit::{normalized_to_world, world_to_normalized, RectSpace};
use crate::geom::{CornerSet, Point2};
use crate::homography::{Homography, InverseHomography};
use crate::rect::RectTransform;

/// Uniform name the inverse homography is published under.
pub const INV_HOMOGRAPHY_UNIFORM: &str = "_InvHomography";

/// Receiver of the inverse homography, typically a material or shader
/// binding owned by the renderer.
pub trait UniformSink {
    fn set_float_array(&mut self, name: &str, values: &[f32; 9]);
}

impl<F: FnMut(&str, &[f32; 9])> UniformSink for F {
    fn set_float_array(&mut self, name: &str, values: &[f32; 9]) {
        self(name, values)
    }
}

/// Owns a [`CornerSet`] and the rectangle it lives in.
///
/// The homography and its inverse are recomputed eagerly on every corner
/// mutation. Sinks are notified only when the inverse exists; after a
/// singular recomputation they keep the last valid uniform.
pub struct QuadImage {
    rect: RectTransform,
    corners: CornerSet,
    homography: Homography,
    inverse: Result<InverseHomography, WarpError>,
    sinks: Vec<Box<dyn UniformSink>>,
}

impl QuadImage {
    /// Create an image with unit-square corners.
    pub fn new(rect: RectTransform) -> Self {
        Self::with_corners(rect, CornerSet::UNIT)
    }

    /// Create an image with the given corners, clamped to [0, 1].
    pub fn with_corners(rect: RectTransform, corners: CornerSet) -> Self {
        let mut image = QuadImage {
            rect,
            corners: corners.clamped(),
            homography: Homography::IDENTITY,
            inverse: Ok(InverseHomography {
                data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            }),
            sinks: Vec::new(),
        };
        image.refresh();
        image
    }

    pub fn rect(&self) -> &RectTransform {
        &self.rect
    }

    /// Replace the rectangle placement. Normalized corners are kept, so the
    /// world-space quad moves with the rectangle.
    pub fn set_rect(&mut self, rect: RectTransform) {
        self.rect = rect;
    }

    pub fn corners(&self) -> &CornerSet {
        &self.corners
    }

    pub fn homography(&self) -> &Homography {
        &self.homography
    }

    /// The inverse of the current homography, or the reason it has none.
    pub fn inverse_homography(&self) -> Result<&InverseHomography, WarpError> {
        self.inverse.as_ref().map_err(|e| e.clone())
    }

    /// Register a sink and push the current inverse to it.
    pub fn subscribe<S: UniformSink + 'static>(&mut self, mut sink: S) {
        if let Ok(inv) = &self.inverse {
            sink.set_float_array(INV_HOMOGRAPHY_UNIFORM, &inv.to_uniform());
        }
        self.sinks.push(Box::new(sink));
    }

    pub fn get_point(&self, index: usize) -> Result<Point2, WarpError> {
        self.corners.get(index)
    }

    /// Set one normalized corner, clamped to [0, 1].
    pub fn set_point(&mut self, index: usize, p: Point2) -> Result<(), WarpError> {
        self.corners.set(index, p.clamp_unit())?;
        self.refresh();
        Ok(())
    }

    /// Replace all four normalized corners, clamped to [0, 1].
    pub fn set_points(&mut self, corners: CornerSet) {
        self.corners = corners.clamped();
        self.refresh();
    }

    /// Fit the rectangle around four world-space points and store them as
    /// normalized corners.
    pub fn set_points_world(&mut self, world: &[Point2]) -> Result<(), WarpError> {
        let world = *CornerSet::from_slice(world)?.points();
        let rect = self.rect;
        let placement = world_to_normalized(&world, &rect.layout(), |fit| rect.with_fit(fit));
        self.rect.apply_fit(&placement.fit);
        self.corners = placement.corners;
        self.refresh();
        Ok(())
    }

    /// World position of one corner under the current rectangle.
    pub fn get_point_world(&self, index: usize) -> Result<Point2, WarpError> {
        normalized_to_world(
            index,
            &self.corners,
            self.rect.rect_size(),
            self.rect.pivot,
            &self.rect,
        )
    }

    /// All four corners in world space.
    pub fn points_world(&self) -> [Point2; 4] {
        let size = self.rect.rect_size();
        let pivot_offset = size.scale(self.rect.pivot);
        self.corners
            .points()
            .map(|p| self.rect.to_world(p.scale(size) - pivot_offset))
    }

    /// Recompute the homography pair and publish the inverse.
    pub fn refresh(&mut self) {
        self.homography = Homography::from_corners(&self.corners);
        self.inverse = self.homography.inverse();

        match &self.inverse {
            Ok(inv) => {
                tracing::debug!(
                    "homography recomputed: {:?}, inverse: {:?}",
                    self.homography.params,
                    inv.to_array()
                );
                let uniform = inv.to_uniform();
                for sink in &mut self.sinks {
                    sink.set_float_array(INV_HOMOGRAPHY_UNIFORM, &uniform);
                }
            }
            Err(e) => {
                tracing::warn!("degenerate corners {:?}: {}", self.corners.points(), e);
            }
        }
    }
}

impl Default for QuadImage {
    fn default() -> Self {
        QuadImage::new(RectTransform::default())
    }
}

impl std::fmt::Debug for QuadImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadImage")
            .field("rect", &self.rect)
            .field("corners", &self.corners)
            .field("homography", &self.homography)
            .field("inverse", &self.inverse)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
