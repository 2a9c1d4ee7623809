//! Result types for subdivision.

// Face counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use mesh_types::{FaceId, Selection, VertexId};

/// Result of subdividing a face selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdivisionResult {
    /// Number of faces selected for the first pass.
    pub original_faces: usize,

    /// Number of faces produced by the last pass.
    pub final_faces: usize,

    /// Faces produced by the last pass.
    pub faces: Vec<FaceId>,

    /// Midpoint and center vertices created by every pass.
    pub new_vertices: Vec<VertexId>,

    /// Unselected neighbors that received midpoints without being split.
    pub repaired_faces: Vec<FaceId>,

    /// Number of passes performed.
    pub iterations: u32,
}

impl SubdivisionResult {
    /// Get the face multiplication factor.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            1.0
        } else {
            self.final_faces as f64 / self.original_faces as f64
        }
    }

    /// Check if any subdivision occurred.
    #[must_use]
    pub const fn was_subdivided(&self) -> bool {
        self.iterations > 0 && self.final_faces > self.original_faces
    }

    /// The produced faces as a selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection::faces(self.faces.iter().copied())
    }
}

impl std::fmt::Display for SubdivisionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Subdivision: {} → {} faces ({:.1}x), {} iterations",
            self.original_faces,
            self.final_faces,
            self.face_ratio(),
            self.iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(original: usize, fin: usize, iterations: u32) -> SubdivisionResult {
        SubdivisionResult {
            original_faces: original,
            final_faces: fin,
            faces: Vec::new(),
            new_vertices: Vec::new(),
            repaired_faces: Vec::new(),
            iterations,
        }
    }

    #[test]
    fn test_face_ratio() {
        assert!((result(2, 8, 1).face_ratio() - 4.0).abs() < 0.001);
        assert!((result(0, 0, 1).face_ratio() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_was_subdivided() {
        assert!(!result(3, 3, 0).was_subdivided());
        assert!(result(1, 4, 1).was_subdivided());
    }

    #[test]
    fn test_display() {
        let text = format!("{}", result(1, 16, 2));
        assert!(text.contains("1 → 16 faces"));
        assert!(text.contains("16.0x"));
    }
}
