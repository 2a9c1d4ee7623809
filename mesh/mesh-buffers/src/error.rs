//! Error types for buffer synthesis and welding.
//!
//! Synthesis itself never fails; these errors come from operations that
//! take caller-supplied buffers or reuse buffers against a changed mesh.

use mesh_types::VertexId;
use thiserror::Error;

/// Errors that can occur when working with render buffers.
///
/// # Example
///
/// ```
/// use mesh_buffers::{BufferError, BufferResult};
///
/// fn check(len: usize) -> BufferResult<()> {
///     if len % 3 == 0 { Ok(()) } else { Err(BufferError::RaggedPositions(len)) }
/// }
/// assert!(check(7).is_err());
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BufferError {
    /// A flat position array whose length is not a multiple of three.
    #[error("position array length {0} is not a multiple of 3")]
    RaggedPositions(usize),

    /// An index array whose length is not a multiple of three.
    #[error("index array length {0} is not a multiple of 3")]
    RaggedIndices(usize),

    /// An index points past the end of the vertex arrays.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices in the buffer.
        vertex_count: usize,
    },

    /// A buffer vertex refers to a topology vertex that no longer exists.
    ///
    /// The buffers must be synthesized again.
    #[error("buffer refers to deleted vertex {0}")]
    StaleVertex(VertexId),

    /// The weld tolerance is not a positive finite number.
    #[error("weld tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
}

/// Result type for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_ragged() {
        let msg = format!("{}", BufferError::RaggedPositions(7));
        assert!(msg.contains('7'));
        let msg = format!("{}", BufferError::RaggedIndices(4));
        assert!(msg.contains("multiple of 3"));
    }

    #[test]
    fn test_error_display_index_out_of_range() {
        let err = BufferError::IndexOutOfRange {
            index: 12,
            vertex_count: 8,
        };
        let msg = format!("{err}");
        assert!(msg.contains("12"));
        assert!(msg.contains('8'));
    }

    #[test]
    fn test_error_display_stale_vertex() {
        let msg = format!("{}", BufferError::StaleVertex(VertexId(3)));
        assert!(msg.contains("v3"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BufferError>();
    }
}
