pub mod error;
pub mod geom;
pub mod homography;
pub mod fit;
pub mod rect;
pub mod image;
#[cfg(feature = "serde")]
pub mod config;

pub use error::WarpError;
pub use geom::{Corner, CornerSet, Point2};
pub use homography::{compute, invert, Homography, InverseHomography};
pub use fit::{normalized_to_world, world_to_normalized, RectSpace};
pub use rect::RectTransform;
pub use image::{QuadImage, UniformSink, INV_HOMOGRAPHY_UNIFORM};
