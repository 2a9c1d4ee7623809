//! Orientation of new faces against the existing surface.
//!
//! Each neighbor sharing an edge with the candidate polygon is folded about
//! the shared edge until it lies on the candidate's side, then its normal
//! votes. A consistently wound neighbor folded onto the candidate ends up
//! facing the opposite way, so a majority of agreeing normals means the
//! candidate is wound against the surface and must be reversed.

use mesh_types::{BRepMesh, VertexId};
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use tracing::debug;

use crate::normals::{face_centroid, face_normal};
use crate::polygon::{centroid, newell_normal};

/// Net orientation vote of the faces neighboring a candidate loop.
///
/// Positive means the candidate should be reversed, negative means it
/// matches, zero is a tie (or there are no neighbors). `loop_vertices` are
/// live vertex ids in the proposed winding order.
#[must_use]
pub fn orientation_vote(mesh: &BRepMesh, loop_vertices: &[VertexId]) -> i32 {
    let positions: Option<Vec<Point3<f64>>> =
        loop_vertices.iter().map(|&v| mesh.position(v)).collect();
    let Some(positions) = positions else {
        return 0;
    };
    let n = positions.len();
    if n < 3 {
        return 0;
    }

    let candidate_normal = newell_normal(&positions);
    let candidate_center = centroid(&positions);

    let mut vote = 0;
    for i in 0..n {
        let (a, b) = (loop_vertices[i], loop_vertices[(i + 1) % n]);
        let Some(edge) = mesh.edge_between(a, b) else {
            continue;
        };
        for &neighbor in edge.faces() {
            let (Some(nb_normal), Some(nb_center)) =
                (face_normal(mesh, neighbor), face_centroid(mesh, neighbor))
            else {
                continue;
            };
            let Some(folded) = fold_about_edge(
                &positions[i],
                &positions[(i + 1) % n],
                &nb_center,
                &candidate_center,
                &nb_normal,
            ) else {
                continue;
            };
            match folded.dot(&candidate_normal) {
                d if d > 1e-9 => vote += 1,
                d if d < -1e-9 => vote -= 1,
                _ => {}
            }
        }
    }
    vote
}

/// Reverse `loop_vertices` in place when its neighbors vote for a flip.
///
/// Returns whether the loop was reversed. Ties keep the given winding.
pub fn orient_against_neighbors(mesh: &BRepMesh, loop_vertices: &mut [VertexId]) -> bool {
    let vote = orientation_vote(mesh, loop_vertices);
    let flip = vote > 0;
    if flip {
        loop_vertices.reverse();
    }
    debug!(vote, flip, "Oriented candidate face");
    flip
}

/// Rotate `normal` about the `a`–`b` axis by the signed angle that carries
/// the neighbor's centroid direction onto the candidate's.
fn fold_about_edge(
    a: &Point3<f64>,
    b: &Point3<f64>,
    neighbor_center: &Point3<f64>,
    candidate_center: &Point3<f64>,
    normal: &Vector3<f64>,
) -> Option<Vector3<f64>> {
    let axis = Unit::try_new(b - a, f64::EPSILON)?;
    let perpendicular = |p: &Point3<f64>| {
        let d = p - a;
        d - axis.into_inner() * d.dot(&axis)
    };
    let from = perpendicular(neighbor_center);
    let to = perpendicular(candidate_center);
    if from.norm() < f64::EPSILON || to.norm() < f64::EPSILON {
        return None;
    }
    let angle = axis.dot(&from.cross(&to)).atan2(from.dot(&to));
    Some(UnitQuaternion::from_axis_angle(&axis, angle) * normal)
}
