use thiserror::Error;

/// Failures raised by the dense linear-algebra routines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("invalid matrices: cannot multiply {left_rows}x{left_cols} by {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("matrix must be square and non-empty, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("right-hand side has length {actual}, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("zero diagonal entry at index {index}")]
    ZeroDiagonal { index: usize },

    #[error("matrix is singular")]
    SingularMatrix,
}

pub type MatrixResult<T> = std::result::Result<T, MatrixError>;
