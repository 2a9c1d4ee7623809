//! Face rebuilding primitives shared by the cutting tools.
//!
//! Faces are never edited in place: a face whose boundary changes is
//! deleted and re-added with its new corner cycle, carrying its material
//! and interpolated texture coordinates along.

use hashbrown::HashMap;
use mesh_geometry::{lerp, lerp_uv};
use mesh_types::{BRepMesh, EdgeId, Face, FaceId, Point2, VertexId};

/// A polygon corner with its optional texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Corner {
    pub vertex: VertexId,
    pub uv: Option<Point2<f64>>,
}

/// A new vertex placed on an existing edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdgeSplit {
    pub vertex: VertexId,
    /// Parameter from the edge's `v1` to `v2`.
    pub t: f64,
}

/// Corners of a face in boundary order.
pub(crate) fn corners(face: &Face) -> Vec<Corner> {
    face.vertices()
        .iter()
        .enumerate()
        .map(|(i, &vertex)| Corner {
            vertex,
            uv: face.uv_at(i),
        })
        .collect()
}

/// Add a polygon from corners. UVs are kept only if every corner has one.
pub(crate) fn add_polygon(mesh: &mut BRepMesh, corners: &[Corner], material: u32) -> Option<FaceId> {
    let vertices: Vec<VertexId> = corners.iter().map(|c| c.vertex).collect();
    let uvs: Option<Vec<Point2<f64>>> = corners.iter().map(|c| c.uv).collect();
    mesh.add_face(&vertices, uvs, material)
}

/// Texture coordinate between two corners.
pub(crate) fn lerp_corner_uv(a: &Corner, b: &Corner, t: f64) -> Option<Point2<f64>> {
    match (a.uv, b.uv) {
        (Some(ua), Some(ub)) => Some(lerp_uv(&ua, &ub, t)),
        _ => None,
    }
}

/// Corner cycle of `face` with every split vertex inserted between the
/// corners of its edge.
pub(crate) fn augmented_corners(mesh: &BRepMesh, face: &Face, splits: &HashMap<EdgeId, EdgeSplit>) -> Vec<Corner> {
    let base = corners(face);
    let n = base.len();
    let mut out = Vec::with_capacity(n + splits.len().min(n));
    for i in 0..n {
        out.push(base[i]);
        let Some(split) = face.edges().get(i).and_then(|e| splits.get(e)) else {
            continue;
        };
        let forward = mesh
            .edge(face.edges()[i])
            .is_some_and(|edge| edge.v1 == base[i].vertex);
        let t = if forward { split.t } else { 1.0 - split.t };
        out.push(Corner {
            vertex: split.vertex,
            uv: lerp_corner_uv(&base[i], &base[(i + 1) % n], t),
        });
    }
    out
}

/// Replace `face` by `polygons`, keeping its material.
///
/// Returns the ids of the polygons the store accepted.
pub(crate) fn replace_face(mesh: &mut BRepMesh, face: FaceId, polygons: &[Vec<Corner>]) -> Vec<FaceId> {
    let Some(old) = mesh.delete_face(face) else {
        return Vec::new();
    };
    polygons
        .iter()
        .filter_map(|corners| add_polygon(mesh, corners, old.material))
        .collect()
}

/// Insert the split vertices into every face that uses a split edge.
///
/// Faces listed in `skip` are left alone. Returns the rebuilt faces.
pub(crate) fn insert_splits(
    mesh: &mut BRepMesh,
    splits: &HashMap<EdgeId, EdgeSplit>,
    skip: &[FaceId],
) -> Vec<FaceId> {
    let mut affected: Vec<FaceId> = splits
        .keys()
        .filter_map(|&e| mesh.edge(e))
        .flat_map(|e| e.faces().iter().copied())
        .filter(|f| !skip.contains(f))
        .collect();
    affected.sort_unstable();
    affected.dedup();

    let mut rebuilt = Vec::with_capacity(affected.len());
    for f in affected {
        let Some(face) = mesh.face(f) else { continue };
        let cycle = augmented_corners(mesh, face, splits);
        rebuilt.extend(replace_face(mesh, f, &[cycle]));
    }
    rebuilt
}

/// Remove split edges once no face uses them. Wire edges are replaced by
/// their two halves.
pub(crate) fn retire_split_edges(mesh: &mut BRepMesh, splits: &HashMap<EdgeId, EdgeSplit>) {
    let mut edges: Vec<_> = splits.iter().map(|(&e, s)| (e, *s)).collect();
    edges.sort_unstable_by_key(|(e, _)| *e);
    for (e, split) in edges {
        let Some(edge) = mesh.edge(e) else { continue };
        if !edge.faces().is_empty() {
            continue;
        }
        let [v1, v2] = edge.vertices();
        mesh.delete_edge(e);
        mesh.add_edge(v1, split.vertex);
        mesh.add_edge(split.vertex, v2);
    }
}

/// Create a vertex at parameter `t` along `edge` without touching topology.
pub(crate) fn vertex_on_edge(mesh: &mut BRepMesh, edge: EdgeId, t: f64) -> Option<EdgeSplit> {
    let (a, b) = {
        let e = mesh.edge(edge)?;
        (mesh.position(e.v1)?, mesh.position(e.v2)?)
    };
    let vertex = mesh.add_vertex(lerp(&a, &b, t));
    Some(EdgeSplit { vertex, t })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Point3, unit_cube, validate_topology};

    #[test]
    fn split_shared_edge_rebuilds_both_faces() {
        let mut cube = unit_cube();
        let e = cube.edge_ids()[8];
        let split = vertex_on_edge(&mut cube, e, 0.25);
        let mut splits = HashMap::new();
        if let Some(split) = split {
            splits.insert(e, split);
        }

        let rebuilt = insert_splits(&mut cube, &splits, &[]);
        retire_split_edges(&mut cube, &splits);

        assert_eq!(rebuilt.len(), 2);
        assert_eq!(cube.face_count(), 6);
        assert!(!cube.contains_edge(e));
        assert!(rebuilt.iter().all(|&f| cube.face(f).is_some_and(|f| f.len() == 5)));
        assert!(validate_topology(&cube).is_valid());

        let v = split.map(|s| s.vertex).unwrap_or_else(|| panic!("edge was not split"));
        let p = cube.position(v).unwrap_or_else(Point3::origin);
        // e8 runs from (1,0,0) to (1,0,1)
        assert!((p.z - 0.25).abs() < 1e-12);
    }

    #[test]
    fn wire_edge_is_halved() {
        let mut mesh = BRepMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let e = mesh.add_edge(a, b).unwrap_or_else(|| panic!("add_edge failed"));
        let mut splits = HashMap::new();
        if let Some(split) = vertex_on_edge(&mut mesh, e, 0.5) {
            splits.insert(e, split);
        }
        retire_split_edges(&mut mesh, &splits);
        assert_eq!(mesh.edge_count(), 2);
        assert!(validate_topology(&mesh).is_valid());
    }

    #[test]
    fn uvs_follow_edge_direction() {
        let mut mesh = BRepMesh::new();
        let ids: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(Point3::new(x, y, 0.0)))
            .collect();
        let uvs = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        let f = mesh.add_face(&ids, Some(uvs), 3).unwrap_or_else(|| panic!("add_face failed"));
        let e = mesh.edge_between(ids[0], ids[1]).map_or(EdgeId(0), |e| e.id);

        let mut splits = HashMap::new();
        if let Some(split) = vertex_on_edge(&mut mesh, e, 0.25) {
            splits.insert(e, split);
        }
        let rebuilt = insert_splits(&mut mesh, &splits, &[]);
        assert!(!mesh.contains_face(f));

        let face = mesh.face(rebuilt[0]);
        assert!(face.is_some_and(|f| f.material == 3 && f.len() == 4));
        let uv = face.and_then(|f| f.uv_at(1)).unwrap_or_else(Point2::origin);
        assert!((uv.x - 0.25).abs() < 1e-12);
    }
}
