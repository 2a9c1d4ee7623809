//! Face subdivision.
//!
//! Every selected n-gon becomes n quads around a new center vertex. Edge
//! midpoints are shared through a split map, so an edge between two
//! selected faces is split once. Unselected neighbors keep their shape and
//! only gain the midpoint on the shared edge.

use hashbrown::HashMap;
use mesh_geometry::centroid;
use mesh_types::{BRepMesh, EdgeId, FaceId, Point2, Selection, VertexId};
use tracing::{debug, info};

use crate::error::{EditError, EditResult};
use crate::params::SubdivideParams;
use crate::rebuild::{Corner, EdgeSplit, add_polygon, corners, insert_splits, lerp_corner_uv, retire_split_edges, vertex_on_edge};
use crate::result::SubdivisionResult;
use crate::selection::live_faces;

/// Subdivide the selected faces.
///
/// With `cuts > 1` each further pass subdivides the faces the previous pass
/// produced.
///
/// # Errors
///
/// Returns an error if:
/// - The selection is empty, stale, or not in face mode
/// - `cuts` is 0
/// - The resulting mesh would exceed `max_faces`
///
/// # Examples
///
/// ```
/// use mesh_edit::{SubdivideParams, subdivide};
/// use mesh_types::{Selection, unit_cube};
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// let result = subdivide(&mut cube, &Selection::faces([top]), &SubdivideParams::default())?;
///
/// assert_eq!(result.final_faces, 4);
/// assert_eq!(cube.vertex_count(), 13);
/// # Ok::<(), mesh_edit::EditError>(())
/// ```
pub fn subdivide(
    mesh: &mut BRepMesh,
    selection: &Selection,
    params: &SubdivideParams,
) -> EditResult<SubdivisionResult> {
    let mut faces = live_faces(mesh, selection, "subdivide")?;
    if params.cuts == 0 {
        return Err(EditError::InvalidCuts(0));
    }

    // Check projected size: the first pass makes one quad per corner, every
    // later pass quadruples.
    let first_pass: usize = faces.iter().filter_map(|&f| mesh.face(f)).map(|f| f.len()).sum();
    let growth = 4usize.saturating_pow(params.cuts - 1);
    let projected = (mesh.face_count() - faces.len()).saturating_add(first_pass.saturating_mul(growth));
    if projected > params.max_faces {
        return Err(EditError::TooManyFaces {
            projected,
            max: params.max_faces,
        });
    }

    let original_faces = faces.len();
    let mut new_vertices = Vec::new();
    let mut repaired_faces = Vec::new();
    for pass in 0..params.cuts {
        let (created, vertices, repaired) = subdivide_once(mesh, &faces);
        debug!(
            pass,
            input = faces.len(),
            output = created.len(),
            repaired = repaired.len(),
            "Subdivision pass"
        );
        new_vertices.extend(vertices);
        repaired_faces.retain(|&f| mesh.contains_face(f));
        repaired_faces.extend(repaired);
        faces = created;
    }

    let result = SubdivisionResult {
        original_faces,
        final_faces: faces.len(),
        faces,
        new_vertices,
        repaired_faces,
        iterations: params.cuts,
    };
    info!("{result}");
    Ok(result)
}

/// One pass. Returns the created quads, new vertices and repaired
/// neighbors.
fn subdivide_once(mesh: &mut BRepMesh, faces: &[FaceId]) -> (Vec<FaceId>, Vec<VertexId>, Vec<FaceId>) {
    let mut splits: HashMap<EdgeId, EdgeSplit> = HashMap::new();
    let mut new_vertices = Vec::new();

    // Midpoints and centers first; vertex creation leaves faces alone.
    let mut plans = Vec::with_capacity(faces.len());
    for &f in faces {
        let Some(face) = mesh.face(f) else { continue };
        let cycle = corners(face);
        let edges = face.edges().to_vec();
        let material = face.material;
        let Some(positions) = mesh.face_positions(f) else { continue };

        let mut mids = Vec::with_capacity(edges.len());
        for (i, &e) in edges.iter().enumerate() {
            let Some(vertex) = get_or_create_midpoint(mesh, e, &mut splits, &mut new_vertices) else {
                continue;
            };
            let next = &cycle[(i + 1) % cycle.len()];
            mids.push(Corner {
                vertex,
                uv: lerp_corner_uv(&cycle[i], next, 0.5),
            });
        }
        if mids.len() != cycle.len() {
            continue;
        }

        let center_vertex = mesh.add_vertex(centroid(&positions));
        new_vertices.push(center_vertex);
        let center = Corner {
            vertex: center_vertex,
            uv: average_uv(&cycle),
        };
        plans.push((f, material, cycle, mids, center));
    }

    let mut created = Vec::with_capacity(plans.iter().map(|p| p.2.len()).sum());
    for (f, material, cycle, mids, center) in plans {
        mesh.delete_face(f);
        let n = cycle.len();
        for i in 0..n {
            let quad = [mids[(i + n - 1) % n], cycle[i], mids[i], center];
            created.extend(add_polygon(mesh, &quad, material));
        }
    }

    let repaired = insert_splits(mesh, &splits, &[]);
    retire_split_edges(mesh, &splits);
    (created, new_vertices, repaired)
}

/// Get or create the midpoint vertex of an edge.
fn get_or_create_midpoint(
    mesh: &mut BRepMesh,
    edge: EdgeId,
    splits: &mut HashMap<EdgeId, EdgeSplit>,
    new_vertices: &mut Vec<VertexId>,
) -> Option<VertexId> {
    if let Some(split) = splits.get(&edge) {
        return Some(split.vertex);
    }
    let split = vertex_on_edge(mesh, edge, 0.5)?;
    splits.insert(edge, split);
    new_vertices.push(split.vertex);
    Some(split.vertex)
}

#[allow(clippy::cast_precision_loss)]
fn average_uv(cycle: &[Corner]) -> Option<Point2<f64>> {
    let uvs: Option<Vec<Point2<f64>>> = cycle.iter().map(|c| c.uv).collect();
    let uvs = uvs.filter(|u| !u.is_empty())?;
    let sum = uvs.iter().fold(Point2::origin(), |acc, uv| acc + uv.coords);
    Some(sum / uvs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_geometry::face_normal;
    use mesh_types::{Point3, Vector3, from_polygons, unit_cube, unit_quad, validate_topology};

    #[test]
    fn cube_top_becomes_four_quads() {
        let mut cube = unit_cube();
        let top = cube.face_ids()[1];
        let result = subdivide(&mut cube, &Selection::faces([top]), &SubdivideParams::default())
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(result.final_faces, 4);
        assert_eq!(result.new_vertices.len(), 5);
        assert_eq!(result.repaired_faces.len(), 4);
        assert_eq!(cube.vertex_count(), 13);
        assert_eq!(cube.face_count(), 9);
        assert!(result.repaired_faces.iter().all(|&f| cube.face(f).is_some_and(|f| f.len() == 5)));

        for &f in &result.faces {
            let n = face_normal(&cube, f).unwrap_or_else(Vector3::zeros);
            assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
        }
        let report = validate_topology(&cube);
        assert!(report.is_valid(), "{report}");
        assert!(report.is_closed());
    }

    #[test]
    fn shared_edge_split_once() {
        let mut mesh = from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
            ],
            &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
        );
        let faces = mesh.face_ids();
        let result = subdivide(&mut mesh, &Selection::faces(faces), &SubdivideParams::default())
            .unwrap_or_else(|e| panic!("{e}"));

        // 7 edge midpoints plus 2 centers.
        assert_eq!(result.new_vertices.len(), 9);
        assert_eq!(mesh.vertex_count(), 15);
        assert_eq!(mesh.face_count(), 8);
        assert!(result.repaired_faces.is_empty());
        assert!(validate_topology(&mesh).is_valid());
    }

    #[test]
    fn triangle_becomes_three_quads_with_uvs() {
        let mut mesh = BRepMesh::new();
        let ids: Vec<_> = [(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(Point3::new(x, y, 0.0)))
            .collect();
        let uvs = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        let f = mesh.add_face(&ids, Some(uvs), 2).unwrap_or_else(|| panic!("add_face failed"));

        let result = subdivide(&mut mesh, &Selection::faces([f]), &SubdivideParams::default())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(result.final_faces, 3);
        for &f in &result.faces {
            let face = mesh.face(f);
            assert!(face.is_some_and(|f| f.is_quad() && f.material == 2 && f.uvs().is_some()));
        }
        // The center's UV is the corner average.
        let center = result.new_vertices[result.new_vertices.len() - 1];
        let face = mesh.face(result.faces[0]);
        let uv = face
            .and_then(|f| f.corner_of(center).and_then(|i| f.uv_at(i)))
            .unwrap_or_else(Point2::origin);
        assert_relative_eq!(uv.x, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn repeated_cuts_multiply() {
        let mut quad = unit_quad();
        let faces = quad.face_ids();
        let result = subdivide(&mut quad, &Selection::faces(faces), &SubdivideParams::new().with_cuts(2))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(result.final_faces, 16);
        assert_eq!(result.iterations, 2);
        assert_eq!(quad.face_count(), 16);
        assert_eq!(quad.vertex_count(), 25);
        assert!((result.face_ratio() - 16.0).abs() < 1e-12);
        assert!(validate_topology(&quad).is_valid());
    }

    #[test]
    fn limits_are_checked_before_mutation() {
        let mut quad = unit_quad();
        let faces = quad.face_ids();
        let revision = quad.revision();
        assert_eq!(
            subdivide(
                &mut quad,
                &Selection::faces(faces.clone()),
                &SubdivideParams::new().with_cuts(3).with_max_faces(20)
            ),
            Err(EditError::TooManyFaces { projected: 64, max: 20 })
        );
        assert_eq!(
            subdivide(&mut quad, &Selection::faces(faces), &SubdivideParams::new().with_cuts(0)),
            Err(EditError::InvalidCuts(0))
        );
        assert_eq!(quad.revision(), revision);
    }
}
