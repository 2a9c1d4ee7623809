//! Error types for editing operations.
//!
//! Every operation validates its input and returns an error before touching
//! the store, so an `Err` always means nothing happened.

use mesh_types::{EdgeId, FaceId, SelectionMode, TopologyError};
use thiserror::Error;

use crate::gesture::{GestureState, ToolKind};

/// Result type for editing operations.
pub type EditResult<T> = std::result::Result<T, EditError>;

/// Errors that can occur during editing operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    /// The selection holds nothing, or nothing that still exists.
    #[error("selection is empty")]
    EmptySelection,

    /// The operation does not accept this selection mode.
    #[error("{operation} does not accept a {mode:?} selection")]
    WrongMode {
        /// The operation that was called.
        operation: &'static str,
        /// The mode it was given.
        mode: SelectionMode,
    },

    /// The selection references elements that no longer exist.
    #[error("selection references {0} missing element(s)")]
    StaleSelection(usize),

    /// A loop traversal reached a face that is not a quad.
    #[error("edge loop crosses non-quad face {face}")]
    NonQuadLoop {
        /// The face that stopped the loop.
        face: FaceId,
    },

    /// The start edge has no quad to walk across.
    #[error("no edge loop through edge {edge}")]
    NoLoop {
        /// The start edge.
        edge: EdgeId,
    },

    /// The knife segment crosses nothing it can cut.
    #[error("knife segment has no intersections")]
    NoIntersections,

    /// The result would have fewer than three distinct corners.
    #[error("resulting face would be degenerate")]
    DegenerateFace,

    /// A face with the same corners already exists.
    #[error("face {0} already spans these vertices")]
    DuplicateFace(FaceId),

    /// Two faces to bridge have different corner counts.
    #[error("cannot bridge a {0}-gon to a {1}-gon")]
    FaceCountMismatch(usize, usize),

    /// Subdivision was asked for zero cuts.
    #[error("invalid cut count: {0} (must be at least 1)")]
    InvalidCuts(u32),

    /// Subdivision would exceed the face limit.
    #[error("subdivision would create {projected} faces, exceeding limit of {max}")]
    TooManyFaces {
        /// Projected face count.
        projected: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The knife segment is parallel to the view or has no length.
    #[error("knife segment defines no cutting plane")]
    DegenerateCutPlane,

    /// The edit session refused the request.
    #[error(transparent)]
    Gesture(#[from] GestureError),
}

/// Errors raised by the gesture state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GestureError {
    /// The requested action is not allowed in the current state.
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        /// State the session was in.
        from: GestureState,
        /// The attempted action.
        action: &'static str,
    },

    /// Another tool owns the active gesture.
    #[error("{active:?} tool is already active")]
    Busy {
        /// The tool holding the session.
        active: ToolKind,
    },

    /// The pre-gesture snapshot could not be restored; the gesture stays active.
    #[error("failed to roll back gesture: {0}")]
    Rollback(#[from] TopologyError),
}
