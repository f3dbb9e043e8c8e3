use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::geom::{CornerSet, Point2};
use crate::image::QuadImage;
use crate::rect::RectTransform;

/// Serde-driven description of a warped image.
///
/// At most one of `corners` (normalized) and `world_corners` may be given;
/// with neither, the image keeps unit-square corners.
///
/// ```toml
/// world_corners = [[0.0, 0.0], [120.0, 10.0], [110.0, 90.0], [5.0, 80.0]]
///
/// [rect]
/// pivot = [0.5, 0.5]
/// lossy_scale = [1.0, 1.0]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarpScene {
    #[serde(default)]
    pub corners: Option<CornerSet>,
    #[serde(default)]
    pub world_corners: Option<[[f64; 2]; 4]>,
    #[serde(default)]
    pub rect: RectTransform,
}

impl WarpScene {
    pub fn from_toml_str(s: &str) -> Result<WarpScene, WarpError> {
        toml::from_str(s).map_err(|e| WarpError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, WarpError> {
        toml::to_string(self).map_err(|e| WarpError::Config(e.to_string()))
    }

    /// Build the image this scene describes.
    pub fn build(&self) -> Result<QuadImage, WarpError> {
        let mut image = QuadImage::new(self.rect);
        match (&self.corners, &self.world_corners) {
            (Some(_), Some(_)) => {
                return Err(WarpError::Config(
                    "corners and world_corners are mutually exclusive".to_string(),
                ))
            }
            (Some(corners), None) => image.set_points(*corners),
            (None, Some(world)) => image.set_points_world(&(*world).map(Point2::from))?,
            (None, None) => {}
        }
        Ok(image)
    }
}
