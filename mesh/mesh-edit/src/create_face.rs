//! Face creation from picked vertices, and bridging two faces.

use std::collections::BTreeSet;

use mesh_geometry::{best_fit_normal, orient_against_neighbors, sort_ccw};
use mesh_types::{BRepMesh, FaceId, Point3, Selection, SelectionMode, VertexId};
use tracing::{debug, info};

use crate::error::{EditError, EditResult};

/// Outcome of [`create_face`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedFace {
    /// A single new face.
    Face(FaceId),
    /// Two faces replaced by the quads joining their boundaries.
    Bridge(Bridge),
}

/// Faces created by bridging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bridge {
    /// One quad per boundary edge pair.
    pub side_faces: Vec<FaceId>,
    /// The two bridged faces, now removed.
    pub removed_faces: [FaceId; 2],
}

/// Create a face from the selection.
///
/// A vertex or edge selection is fitted with a plane, its vertices sorted
/// counter-clockwise around it, and the winding flipped if the faces on
/// shared edges disagree with it. A selection of exactly two faces bridges
/// them instead.
///
/// # Errors
///
/// - [`EditError::DegenerateFace`] with fewer than three vertices
/// - [`EditError::DuplicateFace`] if a face already spans the vertices,
///   including a single selected face
/// - [`EditError::WrongMode`] for a selection of three or more faces
/// - the errors of [`bridge_faces`]
///
/// # Example
///
/// ```
/// use mesh_edit::{CreatedFace, create_face};
/// use mesh_types::{BRepMesh, Point3, Selection};
///
/// let mut mesh = BRepMesh::new();
/// let ids: Vec<_> = [(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]
///     .iter()
///     .map(|&(x, y)| mesh.add_vertex(Point3::new(x, y, 0.0)))
///     .collect();
///
/// let created = create_face(&mut mesh, &Selection::vertices_of(ids))?;
/// assert!(matches!(created, CreatedFace::Face(_)));
/// assert_eq!(mesh.edge_count(), 4);
/// # Ok::<(), mesh_edit::EditError>(())
/// ```
pub fn create_face(mesh: &mut BRepMesh, selection: &Selection) -> EditResult<CreatedFace> {
    if selection.is_empty() {
        return Err(EditError::EmptySelection);
    }
    if let Some(faces) = selection.as_faces() {
        let live: Vec<FaceId> = faces.iter().copied().filter(|&f| mesh.contains_face(f)).collect();
        return match live.as_slice() {
            [] => Err(EditError::StaleSelection(faces.len())),
            [single] => Err(EditError::DuplicateFace(*single)),
            [a, b] => bridge_faces(mesh, *a, *b).map(CreatedFace::Bridge),
            _ => Err(EditError::WrongMode {
                operation: "create face",
                mode: SelectionMode::Face,
            }),
        };
    }

    let vertices: Vec<VertexId> = selection.vertices(mesh).into_iter().collect();
    if vertices.len() < 3 {
        return Err(EditError::DegenerateFace);
    }
    let positions: Vec<Point3<f64>> = vertices.iter().filter_map(|&v| mesh.position(v)).collect();

    let normal = best_fit_normal(&positions);
    let mut ordered: Vec<VertexId> = sort_ccw(&positions, &normal).into_iter().map(|i| vertices[i]).collect();
    orient_against_neighbors(mesh, &mut ordered);

    let wanted: BTreeSet<VertexId> = ordered.iter().copied().collect();
    if let Some(existing) = mesh
        .faces()
        .find(|f| f.len() == wanted.len() && f.vertices().iter().all(|v| wanted.contains(v)))
    {
        return Err(EditError::DuplicateFace(existing.id));
    }

    let face = mesh.add_face(&ordered, None, 0).ok_or(EditError::DegenerateFace)?;
    info!(face = %face, corners = ordered.len(), "Created face");
    Ok(CreatedFace::Face(face))
}

/// Join two faces with a ring of quads and remove them.
///
/// The second face's boundary is reversed and rotated so that the summed
/// distance between paired corners is smallest. Side quads take the first
/// face's material.
///
/// # Errors
///
/// - [`EditError::StaleSelection`] if either face is missing
/// - [`EditError::FaceCountMismatch`] if the corner counts differ
/// - [`EditError::DegenerateFace`] if the faces share a vertex or are the
///   same face
pub fn bridge_faces(mesh: &mut BRepMesh, a: FaceId, b: FaceId) -> EditResult<Bridge> {
    let (Some(fa), Some(fb)) = (mesh.face(a), mesh.face(b)) else {
        let missing = [a, b].iter().filter(|&&f| !mesh.contains_face(f)).count();
        return Err(EditError::StaleSelection(missing));
    };
    if fa.len() != fb.len() {
        return Err(EditError::FaceCountMismatch(fa.len(), fb.len()));
    }
    if a == b || fa.vertices().iter().any(|&v| fb.contains_vertex(v)) {
        return Err(EditError::DegenerateFace);
    }

    let ring_a = fa.vertices().to_vec();
    let mut ring_b = fb.vertices().to_vec();
    ring_b.reverse();
    let material = fa.material;

    let pa: Vec<Point3<f64>> = ring_a.iter().filter_map(|&v| mesh.position(v)).collect();
    let pb: Vec<Point3<f64>> = ring_b.iter().filter_map(|&v| mesh.position(v)).collect();
    let n = ring_a.len();
    if pa.len() != n || pb.len() != n {
        return Err(EditError::DegenerateFace);
    }

    let cost = |k: usize| (0..n).map(|i| (pa[i] - pb[(i + k) % n]).norm()).sum::<f64>();
    let best = (0..n)
        .min_by(|&x, &y| cost(x).total_cmp(&cost(y)))
        .unwrap_or(0);
    ring_b.rotate_left(best);
    debug!(corners = n, rotation = best, "Bridge alignment");

    mesh.delete_face(a);
    mesh.delete_face(b);
    let mut side_faces = Vec::with_capacity(n);
    for i in 0..n {
        let j = (i + 1) % n;
        side_faces.extend(mesh.add_face(&[ring_a[i], ring_a[j], ring_b[j], ring_b[i]], None, material));
    }

    info!(sides = side_faces.len(), "Bridged faces");
    Ok(Bridge {
        side_faces,
        removed_faces: [a, b],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_geometry::face_normal;
    use mesh_types::{Vector3, from_polygons, unit_cube, unit_quad, validate_topology};

    #[test]
    fn fills_cube_hole_consistently() {
        let mut cube = unit_cube();
        cube.delete_face(FaceId(1));
        let selection = Selection::vertices_of([VertexId(6), VertexId(4), VertexId(7), VertexId(5)]);
        let created = create_face(&mut cube, &selection).unwrap_or_else(|e| panic!("{e}"));

        let CreatedFace::Face(face) = created else {
            panic!("expected a single face");
        };
        assert!(cube.face(face).is_some_and(|f| f.has_directed_side(VertexId(4), VertexId(5))));
        let n = face_normal(&cube, face).unwrap_or_else(Vector3::zeros);
        assert!(n.z > 0.99);
        let report = validate_topology(&cube);
        assert!(report.is_valid(), "{report}");
        assert!(report.is_closed());
    }

    #[test]
    fn edge_selection_uses_endpoints() {
        let mut mesh = BRepMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let e1 = mesh.add_edge(a, b).unwrap_or_else(|| panic!("add_edge failed"));
        let e2 = mesh.add_edge(b, c).unwrap_or_else(|| panic!("add_edge failed"));
        let created = create_face(&mut mesh, &Selection::edges([e1, e2]));
        assert!(matches!(created, Ok(CreatedFace::Face(_))));
        assert_eq!(mesh.edge_count(), 3);
    }

    #[test]
    fn existing_face_is_not_duplicated() {
        let mut quad = unit_quad();
        let revision = quad.revision();
        let corners = Selection::vertices_of(quad.vertex_ids());
        assert_eq!(
            create_face(&mut quad, &corners),
            Err(EditError::DuplicateFace(FaceId(0)))
        );
        assert_eq!(
            create_face(&mut quad, &Selection::faces([FaceId(0)])),
            Err(EditError::DuplicateFace(FaceId(0)))
        );
        assert_eq!(quad.revision(), revision);
    }

    #[test]
    fn too_few_vertices() {
        let mut quad = unit_quad();
        assert_eq!(
            create_face(&mut quad, &Selection::vertices_of([VertexId(0), VertexId(1)])),
            Err(EditError::DegenerateFace)
        );
    }

    fn facing_quads() -> BRepMesh {
        from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
            ],
            &[vec![0, 1, 2, 3], vec![4, 5, 6, 7]],
        )
    }

    #[test]
    fn bridge_builds_tube() {
        let mut mesh = facing_quads();
        let created = create_face(&mut mesh, &Selection::faces([FaceId(0), FaceId(1)]));
        let Ok(CreatedFace::Bridge(bridge)) = created else {
            panic!("expected a bridge");
        };
        assert_eq!(bridge.side_faces.len(), 4);
        assert_eq!(mesh.face_count(), 4);
        let report = validate_topology(&mesh);
        assert!(report.is_valid(), "{report}");
        assert_eq!(report.boundary_edge_count, 8);

        // Sides pair each corner with the one straight above it.
        for f in mesh.faces() {
            let positions = mesh.face_positions(f.id).unwrap_or_default();
            let verticals = positions
                .iter()
                .zip(positions.iter().cycle().skip(1))
                .filter(|(p, q)| (p.x - q.x).abs() < 1e-12 && (p.y - q.y).abs() < 1e-12)
                .count();
            assert_eq!(verticals, 2);
        }
        // Outward normals on the front side.
        let front = bridge
            .side_faces
            .iter()
            .filter_map(|&f| face_normal(&mesh, f))
            .find(|n| n.y.abs() > 0.99);
        assert!(front.is_some_and(|n| n.dot(&Vector3::new(0.0, -1.0, 0.0)).abs() > 0.99));
    }

    #[test]
    fn bridge_rejects_mismatched_faces() {
        let mut mesh = from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            &[vec![0, 1, 2, 3], vec![4, 6, 5]],
        );
        assert_eq!(
            bridge_faces(&mut mesh, FaceId(0), FaceId(1)),
            Err(EditError::FaceCountMismatch(4, 3))
        );

        let mut cube = unit_cube();
        // Bottom and front share an edge.
        assert_eq!(bridge_faces(&mut cube, FaceId(0), FaceId(2)), Err(EditError::DegenerateFace));
    }
}
