//! Flat face normals and averaged vertex normals.

use hashbrown::HashMap;
use mesh_types::{BRepMesh, FaceId, VertexId};
use nalgebra::{Point3, Vector3};

use crate::polygon::{centroid, newell_normal, newell_vector, normalize_or_default};

/// Unit normal of a face by Newell's method.
///
/// Degenerate faces get `+Z`. Returns `None` for an unknown face.
///
/// # Example
///
/// ```
/// use mesh_geometry::face_normal;
/// use mesh_types::unit_quad;
///
/// let quad = unit_quad();
/// let n = face_normal(&quad, quad.face_ids()[0]).unwrap();
/// assert!((n.z - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn face_normal(mesh: &BRepMesh, face: FaceId) -> Option<Vector3<f64>> {
    mesh.face_positions(face).map(|points| newell_normal(&points))
}

/// Area of a (possibly non-planar) face, half the Newell vector's length.
#[must_use]
pub fn face_area(mesh: &BRepMesh, face: FaceId) -> Option<f64> {
    mesh.face_positions(face)
        .map(|points| newell_vector(&points).norm() * 0.5)
}

/// Mean of a face's corner positions.
#[must_use]
pub fn face_centroid(mesh: &BRepMesh, face: FaceId) -> Option<Point3<f64>> {
    mesh.face_positions(face).map(|points| centroid(&points))
}

/// Flat normals of every live face.
#[must_use]
pub fn face_normals(mesh: &BRepMesh) -> HashMap<FaceId, Vector3<f64>> {
    mesh.faces()
        .filter_map(|f| face_normal(mesh, f.id).map(|n| (f.id, n)))
        .collect()
}

/// Normal of a vertex: the renormalized sum of its incident face normals.
///
/// Vertices without faces, or whose face normals cancel out, get `+Z`.
#[must_use]
pub fn vertex_normal(mesh: &BRepMesh, vertex: VertexId) -> Option<Vector3<f64>> {
    let v = mesh.vertex(vertex)?;
    let sum = v
        .faces()
        .iter()
        .filter_map(|&f| face_normal(mesh, f))
        .fold(Vector3::zeros(), |acc, n| acc + n);
    Some(normalize_or_default(sum))
}

/// Averaged normals of every live vertex, reusing precomputed face normals.
#[must_use]
pub fn vertex_normals(
    mesh: &BRepMesh,
    face_normals: &HashMap<FaceId, Vector3<f64>>,
) -> HashMap<VertexId, Vector3<f64>> {
    mesh.vertices()
        .map(|v| {
            let sum = v
                .faces()
                .iter()
                .filter_map(|f| face_normals.get(f))
                .fold(Vector3::zeros(), |acc, n| acc + n);
            (v.id, normalize_or_default(sum))
        })
        .collect()
}

/// Average of the flat normals of a set of faces, `+Z` if they cancel.
#[must_use]
pub fn average_normal(mesh: &BRepMesh, faces: impl IntoIterator<Item = FaceId>) -> Vector3<f64> {
    let sum = faces
        .into_iter()
        .filter_map(|f| face_normal(mesh, f))
        .fold(Vector3::zeros(), |acc, n| acc + n);
    normalize_or_default(sum)
}
