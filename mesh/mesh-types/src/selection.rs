//! Element selection handed to editing operations.

use std::collections::BTreeSet;

use crate::ids::{EdgeId, FaceId, VertexId};
use crate::mesh::BRepMesh;

/// Which kind of element a selection holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// Vertices.
    Vertex,
    /// Edges.
    Edge,
    /// Faces.
    Face,
}

/// A set of selected elements of exactly one kind.
///
/// Selections may go stale as the mesh is edited; operations call
/// [`Selection::retain_existing`] before acting.
///
/// # Example
///
/// ```
/// use mesh_types::{Selection, SelectionMode, unit_cube};
///
/// let cube = unit_cube();
/// let top = cube.face_ids()[1];
/// let selection = Selection::faces([top]);
///
/// assert_eq!(selection.mode(), SelectionMode::Face);
/// assert_eq!(selection.vertices(&cube).len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Selected vertices.
    Vertex(BTreeSet<VertexId>),
    /// Selected edges.
    Edge(BTreeSet<EdgeId>),
    /// Selected faces.
    Face(BTreeSet<FaceId>),
}

impl Selection {
    /// Select vertices.
    pub fn vertices_of(ids: impl IntoIterator<Item = VertexId>) -> Self {
        Self::Vertex(ids.into_iter().collect())
    }

    /// Select edges.
    pub fn edges(ids: impl IntoIterator<Item = EdgeId>) -> Self {
        Self::Edge(ids.into_iter().collect())
    }

    /// Select faces.
    pub fn faces(ids: impl IntoIterator<Item = FaceId>) -> Self {
        Self::Face(ids.into_iter().collect())
    }

    /// The selection mode.
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        match self {
            Self::Vertex(_) => SelectionMode::Vertex,
            Self::Edge(_) => SelectionMode::Edge,
            Self::Face(_) => SelectionMode::Face,
        }
    }

    /// Number of selected elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Vertex(ids) => ids.len(),
            Self::Edge(ids) => ids.len(),
            Self::Face(ids) => ids.len(),
        }
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop ids that no longer exist in `mesh`. Returns how many were dropped.
    pub fn retain_existing(&mut self, mesh: &BRepMesh) -> usize {
        let before = self.len();
        match self {
            Self::Vertex(ids) => ids.retain(|&id| mesh.contains_vertex(id)),
            Self::Edge(ids) => ids.retain(|&id| mesh.contains_edge(id)),
            Self::Face(ids) => ids.retain(|&id| mesh.contains_face(id)),
        }
        before - self.len()
    }

    /// Every live vertex touched by the selection, in ascending order.
    #[must_use]
    pub fn vertices(&self, mesh: &BRepMesh) -> BTreeSet<VertexId> {
        match self {
            Self::Vertex(ids) => ids
                .iter()
                .copied()
                .filter(|&v| mesh.contains_vertex(v))
                .collect(),
            Self::Edge(ids) => ids
                .iter()
                .filter_map(|&e| mesh.edge(e))
                .flat_map(|e| e.vertices())
                .collect(),
            Self::Face(ids) => ids
                .iter()
                .filter_map(|&f| mesh.face(f))
                .flat_map(|f| f.vertices().iter().copied())
                .collect(),
        }
    }

    /// Selected face ids, if this is a face selection.
    #[must_use]
    pub const fn as_faces(&self) -> Option<&BTreeSet<FaceId>> {
        match self {
            Self::Face(ids) => Some(ids),
            _ => None,
        }
    }

    /// Selected edge ids, if this is an edge selection.
    #[must_use]
    pub const fn as_edges(&self) -> Option<&BTreeSet<EdgeId>> {
        match self {
            Self::Edge(ids) => Some(ids),
            _ => None,
        }
    }

    /// Selected vertex ids, if this is a vertex selection.
    #[must_use]
    pub const fn as_vertices(&self) -> Option<&BTreeSet<VertexId>> {
        match self {
            Self::Vertex(ids) => Some(ids),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_cube;

    #[test]
    fn retain_existing_drops_stale_ids() {
        let mut cube = unit_cube();
        let faces = cube.face_ids();
        let mut selection = Selection::faces([faces[0], faces[1], FaceId(99)]);

        cube.delete_face(faces[0]);
        assert_eq!(selection.retain_existing(&cube), 2);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn edge_selection_vertices() {
        let cube = unit_cube();
        let e = cube.edge_ids()[0];
        let selection = Selection::edges([e]);
        assert_eq!(selection.vertices(&cube).len(), 2);
        assert_eq!(selection.mode(), SelectionMode::Edge);
        assert!(selection.as_faces().is_none());
    }

    #[test]
    fn empty_selection() {
        let selection = Selection::vertices_of([]);
        assert!(selection.is_empty());
    }
}
