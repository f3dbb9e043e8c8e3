use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarpError {
    #[error("matrix is singular (determinant {0})")]
    SingularMatrix(f64),

    #[error("corner index {0} out of range, expected 0..4")]
    CornerIndex(usize),

    #[error("expected 4 corners, got {0}")]
    CornerCount(usize),

    #[error("invalid scene config: {0}")]
    Config(String),
}
