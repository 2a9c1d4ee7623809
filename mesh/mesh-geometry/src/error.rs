//! Error types for geometric queries.

use thiserror::Error;

/// Result type for geometric queries that can fail.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors that can occur in geometric computations.
///
/// Most utilities resolve ambiguous geometry with a documented fallback
/// instead of failing; the `_checked` variants surface the reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Not enough points for the operation.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// Points are collinear or coincident and define no plane.
    #[error("points do not define a plane")]
    DegeneratePlane,

    /// The knife segment is parallel to the view direction or has zero length.
    #[error("cut segment defines no cutting plane")]
    DegenerateCutPlane,

    /// The view-projection matrix cannot be inverted.
    #[error("view-projection matrix is not invertible")]
    NotInvertible,
}
