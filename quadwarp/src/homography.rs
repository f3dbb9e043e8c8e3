#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::geom::{CornerSet, Point2};

/// A unit-square to quadrilateral homography.
///
/// Stored as the 8 independent parameters `[h11, h12, h13, h21, h22, h23, h31, h32]`
/// of a row-major 3x3 matrix whose bottom-right entry is fixed at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Homography {
    pub params: [f64; 8],
}

impl Homography {
    pub const IDENTITY: Homography = Homography {
        params: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    };

    /// Compute the homography mapping the unit-square corners
    /// (0,0), (1,0), (1,1), (0,1) onto the four corners, in order.
    ///
    /// Closed form, no linear solve. A degenerate quad (parallel opposite
    /// edges in the wrong configuration, collinear corners) makes the
    /// denominators vanish and yields non-finite parameters; check
    /// [`Homography::is_finite`] before use.
    pub fn from_corners(corners: &CornerSet) -> Self {
        let [p00, p10, p11, p01] = *corners.points();

        let (x00, y00) = (p00.x, p00.y);
        let (x10, y10) = (p10.x, p10.y);
        let (x11, y11) = (p11.x, p11.y);
        let (x01, y01) = (p01.x, p01.y);

        let a = x10 - x11;
        let b = x01 - x11;
        let c = x00 - x01 - x10 + x11;
        let d = y10 - y11;
        let e = y01 - y11;
        let f = y00 - y01 - y10 + y11;

        let h13 = x00;
        let h23 = y00;
        let h32 = (c * d - a * f) / (b * d - a * e);
        let h31 = (c * e - b * f) / (a * e - b * d);
        let h11 = x10 - x00 + h31 * x10;
        let h12 = x01 - x00 + h32 * x01;
        let h21 = y10 - y00 + h31 * y10;
        let h22 = y01 - y00 + h32 * y01;

        Homography {
            params: [h11, h12, h13, h21, h22, h23, h31, h32],
        }
    }

    /// The full 3x3 matrix with `h33 = 1`.
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        let h = &self.params;
        [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]]
    }

    /// The 9 row-major matrix values, `h33 = 1` included.
    pub fn to_array(&self) -> [f64; 9] {
        let h = &self.params;
        [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]
    }

    pub fn is_finite(&self) -> bool {
        self.params.iter().all(|v| v.is_finite())
    }

    /// Project a point from unit-square space to quad space.
    pub fn project(&self, u: f64, v: f64) -> Point2 {
        project_matrix(&self.to_matrix(), u, v)
    }

    /// Compute the inverse homography.
    pub fn inverse(&self) -> Result<InverseHomography, WarpError> {
        invert(self)
    }
}

/// The true inverse of a [`Homography`], mapping quad space back to the unit
/// square. All 9 entries are independent; `data[2][2]` is generally not 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InverseHomography {
    pub data: [[f64; 3]; 3],
}

impl InverseHomography {
    /// Row-major values `[o11, o12, o13, o21, o22, o23, o31, o32, o33]`.
    pub fn to_array(&self) -> [f64; 9] {
        let m = &self.data;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }

    /// Values narrowed to `f32` in uniform order, ready for a shader upload.
    pub fn to_uniform(&self) -> [f32; 9] {
        self.to_array().map(|v| v as f32)
    }

    /// Project a point from quad space back into unit-square space.
    pub fn project(&self, x: f64, y: f64) -> Point2 {
        project_matrix(&self.data, x, y)
    }

    /// Invert this matrix again as a full 3x3 matrix.
    pub fn inverse(&self) -> Result<InverseHomography, WarpError> {
        invert_matrix(&self.data).map(|data| InverseHomography { data })
    }
}

/// Compute the homography for a corner set. See [`Homography::from_corners`].
pub fn compute(corners: &CornerSet) -> Homography {
    Homography::from_corners(corners)
}

/// Invert a homography, treating it as a full 3x3 matrix with `h33 = 1`.
pub fn invert(h: &Homography) -> Result<InverseHomography, WarpError> {
    invert_matrix(&h.to_matrix()).map(|data| InverseHomography { data })
}

/// Signed cofactor of entry `(r, c)`.
///
/// Taking the minor's rows and columns in cyclic order folds the
/// checkerboard sign into the product.
fn cofactor(m: &[[f64; 3]; 3], r: usize, c: usize) -> f64 {
    let (r1, r2) = ((r + 1) % 3, (r + 2) % 3);
    let (c1, c2) = ((c + 1) % 3, (c + 2) % 3);
    m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]
}

/// Cofactor expansion along the first row.
pub fn determinant(m: &[[f64; 3]; 3]) -> f64 {
    (0..3).map(|c| m[0][c] * cofactor(m, 0, c)).sum()
}

/// Adjugate inverse of a 3x3 matrix: the transposed cofactor matrix over
/// the determinant.
///
/// Fails with [`WarpError::SingularMatrix`] when the determinant is zero or
/// not finite.
pub fn invert_matrix(m: &[[f64; 3]; 3]) -> Result<[[f64; 3]; 3], WarpError> {
    let det = determinant(m);
    if det == 0.0 || !det.is_finite() {
        return Err(WarpError::SingularMatrix(det));
    }

    let inv_det = 1.0 / det;
    Ok(std::array::from_fn(|r| {
        std::array::from_fn(|c| cofactor(m, c, r) * inv_det)
    }))
}

fn project_matrix(h: &[[f64; 3]; 3], x: f64, y: f64) -> Point2 {
    let [px, py, w] = h.map(|row| row[0] * x + row[1] * y + row[2]);
    Point2::new(px / w, py / w)
}
