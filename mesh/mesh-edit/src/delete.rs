//! Deletion, duplication and separation of selections.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use mesh_types::{BRepMesh, EdgeId, FaceId, Selection, SelectionMode, VertexId};
use tracing::info;

use crate::error::EditResult;
use crate::rebuild::{Corner, add_polygon, corners};
use crate::selection::{live_edges, live_faces, live_vertices};

/// Counts of what a deletion removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deletion {
    /// Vertices removed.
    pub vertices: usize,
    /// Edges removed.
    pub edges: usize,
    /// Faces removed.
    pub faces: usize,
}

impl std::fmt::Display for Deletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "deleted {} vertices, {} edges, {} faces",
            self.vertices, self.edges, self.faces
        )
    }
}

/// Delete a selection.
///
/// - **Faces**: only the faces go; their edges and vertices stay.
/// - **Edges**: the edges and every face using them go, then endpoints
///   left without edges or faces.
/// - **Vertices**: the vertices and everything incident to them go.
///
/// # Errors
///
/// Returns [`crate::EditError::EmptySelection`] or
/// [`crate::EditError::StaleSelection`] when nothing live is selected.
pub fn delete_selection(mesh: &mut BRepMesh, selection: &Selection) -> EditResult<Deletion> {
    let (v0, e0, f0) = (mesh.vertex_count(), mesh.edge_count(), mesh.face_count());
    match selection.mode() {
        SelectionMode::Face => {
            for f in live_faces(mesh, selection, "delete")? {
                mesh.delete_face(f);
            }
        }
        SelectionMode::Edge => {
            let edges = live_edges(mesh, selection, "delete")?;
            let mut endpoints = BTreeSet::new();
            for e in edges {
                let Some(edge) = mesh.edge(e) else { continue };
                endpoints.extend(edge.vertices());
                let faces: Vec<FaceId> = edge.faces().iter().copied().collect();
                for f in faces {
                    mesh.delete_face(f);
                }
                mesh.delete_edge(e);
            }
            for v in endpoints {
                mesh.delete_vertex_if_isolated(v);
            }
        }
        SelectionMode::Vertex => {
            for v in live_vertices(mesh, selection, "delete")? {
                mesh.delete_vertex(v);
            }
        }
    }

    let deletion = Deletion {
        vertices: v0 - mesh.vertex_count(),
        edges: e0 - mesh.edge_count(),
        faces: f0 - mesh.face_count(),
    };
    info!(mode = ?selection.mode(), "{deletion}");
    Ok(deletion)
}

/// A disjoint copy of a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplication {
    /// Original vertex to its copy.
    pub vertex_map: BTreeMap<VertexId, VertexId>,
    /// Copied faces.
    pub faces: Vec<FaceId>,
    /// Copied edges, including those created with the faces.
    pub edges: Vec<EdgeId>,
}

impl Duplication {
    /// Selection of the copy in the same mode as the source.
    #[must_use]
    pub fn selection(&self, mode: SelectionMode) -> Selection {
        match mode {
            SelectionMode::Face => Selection::faces(self.faces.iter().copied()),
            SelectionMode::Edge => Selection::edges(self.edges.iter().copied()),
            SelectionMode::Vertex => Selection::vertices_of(self.vertex_map.values().copied()),
        }
    }
}

/// Copy a selection onto new vertices, leaving the original in place.
///
/// Faces keep their winding, UVs and material. Edge selections copy the
/// edges; vertex selections copy the vertices plus every edge and face lying
/// entirely inside the selection.
///
/// # Errors
///
/// Returns [`crate::EditError::EmptySelection`] or
/// [`crate::EditError::StaleSelection`] when nothing live is selected.
///
/// # Example
///
/// ```
/// use mesh_edit::duplicate;
/// use mesh_types::{Selection, unit_cube};
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// let copy = duplicate(&mut cube, &Selection::faces([top]))?;
///
/// assert_eq!(copy.vertex_map.len(), 4);
/// assert_eq!(cube.face_count(), 7);
/// # Ok::<(), mesh_edit::EditError>(())
/// ```
pub fn duplicate(mesh: &mut BRepMesh, selection: &Selection) -> EditResult<Duplication> {
    let (faces, edges): (Vec<FaceId>, Vec<EdgeId>) = match selection.mode() {
        SelectionMode::Face => (live_faces(mesh, selection, "duplicate")?, Vec::new()),
        SelectionMode::Edge => (Vec::new(), live_edges(mesh, selection, "duplicate")?),
        SelectionMode::Vertex => {
            let chosen: BTreeSet<VertexId> = live_vertices(mesh, selection, "duplicate")?.into_iter().collect();
            let inside_edges: Vec<EdgeId> = mesh
                .edges()
                .filter(|e| chosen.contains(&e.v1) && chosen.contains(&e.v2))
                .map(|e| e.id)
                .collect();
            let inside_faces: Vec<FaceId> = mesh
                .faces()
                .filter(|f| f.vertices().iter().all(|v| chosen.contains(v)))
                .map(|f| f.id)
                .collect();
            let mut duplication = copy_elements(mesh, &inside_faces, &inside_edges);
            // Lone vertices are copied too.
            for v in chosen {
                if let Entry::Vacant(slot) = duplication.vertex_map.entry(v) {
                    if let Some(p) = mesh.position(v) {
                        slot.insert(mesh.add_vertex(p));
                    }
                }
            }
            info!(vertices = duplication.vertex_map.len(), "Duplicated selection");
            return Ok(duplication);
        }
    };

    let duplication = copy_elements(mesh, &faces, &edges);
    info!(
        vertices = duplication.vertex_map.len(),
        faces = duplication.faces.len(),
        "Duplicated selection"
    );
    Ok(duplication)
}

fn copy_elements(mesh: &mut BRepMesh, faces: &[FaceId], edges: &[EdgeId]) -> Duplication {
    let sources: Vec<(Vec<Corner>, u32)> = faces
        .iter()
        .filter_map(|&f| mesh.face(f))
        .map(|f| (corners(f), f.material))
        .collect();
    let pairs: Vec<[VertexId; 2]> = edges.iter().filter_map(|&e| mesh.edge(e)).map(|e| e.vertices()).collect();

    let mut vertex_map = BTreeMap::new();
    let touched: BTreeSet<VertexId> = sources
        .iter()
        .flat_map(|(c, _)| c.iter().map(|c| c.vertex))
        .chain(pairs.iter().flatten().copied())
        .collect();
    for v in touched {
        if let Some(p) = mesh.position(v) {
            vertex_map.insert(v, mesh.add_vertex(p));
        }
    }

    let mut copied_faces = Vec::with_capacity(sources.len());
    for (face_corners, material) in &sources {
        let mapped: Option<Vec<Corner>> = face_corners
            .iter()
            .map(|c| vertex_map.get(&c.vertex).map(|&vertex| Corner { vertex, uv: c.uv }))
            .collect();
        if let Some(mapped) = mapped {
            copied_faces.extend(add_polygon(mesh, &mapped, *material));
        }
    }

    let mut copied_edges: BTreeSet<EdgeId> = copied_faces
        .iter()
        .filter_map(|&f| mesh.face(f))
        .flat_map(|f| f.edges().iter().copied())
        .collect();
    for [a, b] in pairs {
        if let (Some(&da), Some(&db)) = (vertex_map.get(&a), vertex_map.get(&b)) {
            copied_edges.extend(mesh.add_edge(da, db));
        }
    }

    Duplication {
        vertex_map,
        faces: copied_faces,
        edges: copied_edges.into_iter().collect(),
    }
}

/// Move a selection into a disjoint piece: duplicate it, then delete the
/// original along with any edges and vertices it leaves unused.
///
/// # Errors
///
/// Same as [`duplicate`].
pub fn separate(mesh: &mut BRepMesh, selection: &Selection) -> EditResult<Duplication> {
    let original_faces: Vec<FaceId> = selection
        .as_faces()
        .map(|ids| ids.iter().copied().filter(|&f| mesh.contains_face(f)).collect())
        .unwrap_or_default();
    let duplication = duplicate(mesh, selection)?;

    let sources: Vec<VertexId> = duplication.vertex_map.keys().copied().collect();
    match selection.mode() {
        SelectionMode::Face => {
            for &f in &original_faces {
                mesh.delete_face(f);
            }
        }
        SelectionMode::Edge => {
            for e in selection.as_edges().into_iter().flatten() {
                if mesh.edge(*e).is_some_and(|edge| edge.faces().is_empty()) {
                    mesh.delete_edge(*e);
                }
            }
        }
        SelectionMode::Vertex => {
            for &v in &sources {
                mesh.delete_vertex(v);
            }
        }
    }

    // Clean up what the removal orphaned.
    let orphan_edges: Vec<EdgeId> = sources
        .iter()
        .filter_map(|&v| mesh.vertex(v))
        .flat_map(|v| v.edges().iter().copied())
        .collect();
    for e in orphan_edges {
        mesh.delete_edge_if_unused(e);
    }
    for v in sources {
        mesh.delete_vertex_if_isolated(v);
    }

    info!(
        vertices = duplication.vertex_map.len(),
        faces = duplication.faces.len(),
        "Separated selection"
    );
    Ok(duplication)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use mesh_types::{Point3, unit_cube, unit_quad, validate_topology};

    #[test]
    fn face_delete_leaves_edges() {
        let mut cube = unit_cube();
        let deletion = delete_selection(&mut cube, &Selection::faces([FaceId(1)])).unwrap_or_default();
        assert_eq!(
            deletion,
            Deletion {
                vertices: 0,
                edges: 0,
                faces: 1
            }
        );
        assert_eq!(cube.edge_count(), 12);
        assert!(validate_topology(&cube).is_valid());
    }

    #[test]
    fn edge_delete_cascades_to_faces_and_orphans() {
        let mut quad = unit_quad();
        let e = quad.edge_ids()[0];
        let deletion = delete_selection(&mut quad, &Selection::edges([e])).unwrap_or_default();
        assert_eq!(deletion.faces, 1);
        assert_eq!(deletion.edges, 1);
        // Both endpoints still have other edges.
        assert_eq!(deletion.vertices, 0);
        assert!(validate_topology(&quad).is_valid());

        let mut mesh = BRepMesh::new();
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let e = mesh.add_edge(a, b).unwrap_or_else(|| panic!("add_edge failed"));
        let deletion = delete_selection(&mut mesh, &Selection::edges([e])).unwrap_or_default();
        assert_eq!(deletion.vertices, 2);
        assert!(mesh.is_empty());
    }

    #[test]
    fn vertex_delete_cascades() {
        let mut cube = unit_cube();
        let deletion = delete_selection(&mut cube, &Selection::vertices_of([VertexId(0)])).unwrap_or_default();
        assert_eq!(
            deletion,
            Deletion {
                vertices: 1,
                edges: 3,
                faces: 3
            }
        );
        assert!(validate_topology(&cube).is_valid());
        assert_eq!(format!("{deletion}"), "deleted 1 vertices, 3 edges, 3 faces");
    }

    #[test]
    fn duplicate_face_is_disjoint() {
        let mut cube = unit_cube();
        let copy = duplicate(&mut cube, &Selection::faces([FaceId(1)])).unwrap_or_default();
        assert_eq!(copy.faces.len(), 1);
        assert_eq!(copy.edges.len(), 4);
        assert_eq!(cube.vertex_count(), 12);
        let face = cube.face(copy.faces[0]);
        assert!(face.is_some_and(|f| f.vertices().iter().all(|v| v.0 >= 8)));
        assert_eq!(copy.selection(SelectionMode::Face).len(), 1);
        assert!(validate_topology(&cube).is_valid());
    }

    #[test]
    fn duplicate_vertices_copies_inner_edges() {
        let mut quad = unit_quad();
        let copy = duplicate(&mut quad, &Selection::vertices_of([VertexId(0), VertexId(1), VertexId(3)]))
            .unwrap_or_default();
        assert_eq!(copy.vertex_map.len(), 3);
        assert!(copy.faces.is_empty());
        assert_eq!(copy.edges.len(), 2);
    }

    #[test]
    fn separate_detaches_face() {
        let mut cube = unit_cube();
        let piece = separate(&mut cube, &Selection::faces([FaceId(1)])).unwrap_or_default();
        assert_eq!(piece.faces.len(), 1);
        assert_eq!(cube.face_count(), 6);
        // The top ring stays, since the side faces still use it.
        assert_eq!(cube.vertex_count(), 12);
        let report = validate_topology(&cube);
        assert!(report.is_valid(), "{report}");
        assert_eq!(report.boundary_edge_count, 8);
    }

    #[test]
    fn separate_whole_quad_moves_everything() {
        let mut quad = unit_quad();
        let all = Selection::faces(quad.face_ids());
        let piece = separate(&mut quad, &all).unwrap_or_default();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.edge_count(), 4);
        assert!(quad.vertex_ids().iter().all(|v| v.0 >= 4));
        assert_eq!(piece.vertex_map.len(), 4);
    }

    #[test]
    fn empty_selection_errors() {
        let mut quad = unit_quad();
        assert_eq!(delete_selection(&mut quad, &Selection::edges([])), Err(EditError::EmptySelection));
        assert_eq!(duplicate(&mut quad, &Selection::faces([])), Err(EditError::EmptySelection));
    }
}
