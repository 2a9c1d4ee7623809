//! Error types for snapshot restoration.

use thiserror::Error;

use crate::ids::{EdgeId, FaceId, VertexId};

/// Result type for topology operations that can fail.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors raised while rebuilding a mesh from a snapshot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The same id appears twice, or an edge duplicates an existing vertex pair.
    #[error("duplicate id {0}")]
    DuplicateId(String),

    /// A record references a vertex that does not exist.
    #[error("{referenced_by} references unknown vertex {vertex}")]
    UnknownVertex {
        /// The missing vertex.
        vertex: VertexId,
        /// The record holding the reference.
        referenced_by: String,
    },

    /// An edge record joins a vertex to itself.
    #[error("edge {edge} is a self-loop")]
    SelfLoop {
        /// The offending edge.
        edge: EdgeId,
    },

    /// A face record has fewer than three distinct corners.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// The offending face.
        face: FaceId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TopologyError::UnknownVertex {
            vertex: VertexId(7),
            referenced_by: "f2".to_string(),
        };
        assert_eq!(format!("{err}"), "f2 references unknown vertex v7");

        let err = TopologyError::SelfLoop { edge: EdgeId(1) };
        assert!(format!("{err}").contains("e1"));
    }
}
