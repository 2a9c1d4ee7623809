//! Angle-threshold smoothing groups.
//!
//! Faces are flood-filled into islands across edges whose two face normals
//! are within the threshold angle. Every (vertex, island) pair gets one
//! averaged normal, so a hard edge splits the normals of the vertices on
//! it while smooth regions share them.

use std::collections::VecDeque;

use hashbrown::HashMap;
use mesh_types::{BRepMesh, FaceId, VertexId};
use nalgebra::Vector3;
use tracing::debug;

use crate::adjacency::FaceAdjacency;
use crate::polygon::{default_normal, normalize_or_default};

/// Smoothing islands and their per-vertex normals.
#[derive(Debug, Clone, Default)]
pub struct SmoothingGroups {
    face_island: HashMap<FaceId, usize>,
    normals: HashMap<(VertexId, usize), Vector3<f64>>,
    island_count: usize,
}

impl SmoothingGroups {
    /// Island a face belongs to.
    #[must_use]
    pub fn island_of(&self, face: FaceId) -> Option<usize> {
        self.face_island.get(&face).copied()
    }

    /// Averaged normal of `vertex` within `island`.
    #[must_use]
    pub fn normal(&self, vertex: VertexId, island: usize) -> Option<Vector3<f64>> {
        self.normals.get(&(vertex, island)).copied()
    }

    /// Shading normal of a face corner.
    #[must_use]
    pub fn corner_normal(&self, face: FaceId, vertex: VertexId) -> Option<Vector3<f64>> {
        self.island_of(face).and_then(|i| self.normal(vertex, i))
    }

    /// Number of islands.
    #[must_use]
    pub const fn island_count(&self) -> usize {
        self.island_count
    }
}

/// Compute smoothing groups with threshold `angle` in radians.
///
/// Two faces sharing an edge join the same island when the dot product of
/// their normals is at least `cos(angle)`. An angle of zero keeps every
/// face apart unless coplanar; `PI` joins every connected face.
///
/// # Example
///
/// ```
/// use mesh_geometry::{FaceAdjacency, smoothing_groups};
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// let adjacency = FaceAdjacency::build(&cube);
///
/// // 30 degrees keeps the cube's 90 degree edges hard.
/// let hard = smoothing_groups(&cube, &adjacency, 30f64.to_radians());
/// assert_eq!(hard.island_count(), 6);
///
/// let smooth = smoothing_groups(&cube, &adjacency, 100f64.to_radians());
/// assert_eq!(smooth.island_count(), 1);
/// ```
#[must_use]
pub fn smoothing_groups(mesh: &BRepMesh, adjacency: &FaceAdjacency, angle: f64) -> SmoothingGroups {
    let threshold = angle.cos();
    let normal_of = |f: FaceId| adjacency.normal(f).unwrap_or_else(default_normal);

    let mut face_island: HashMap<FaceId, usize> = HashMap::new();
    let mut island_count = 0;

    for face in mesh.faces() {
        if face_island.contains_key(&face.id) {
            continue;
        }
        let island = island_count;
        island_count += 1;
        face_island.insert(face.id, island);

        let mut queue = VecDeque::from([face.id]);
        while let Some(current) = queue.pop_front() {
            let n = normal_of(current);
            for &(_, other) in adjacency.neighbors(current) {
                if face_island.contains_key(&other) || !mesh.contains_face(other) {
                    continue;
                }
                if n.dot(&normal_of(other)) >= threshold {
                    face_island.insert(other, island);
                    queue.push_back(other);
                }
            }
        }
    }

    let mut sums: HashMap<(VertexId, usize), Vector3<f64>> = HashMap::new();
    for face in mesh.faces() {
        let Some(&island) = face_island.get(&face.id) else {
            continue;
        };
        let n = normal_of(face.id);
        for &v in face.vertices() {
            *sums.entry((v, island)).or_insert_with(Vector3::zeros) += n;
        }
    }
    let normals = sums
        .into_iter()
        .map(|(key, sum)| (key, normalize_or_default(sum)))
        .collect();

    debug!(islands = island_count, "Computed smoothing groups");

    SmoothingGroups {
        face_island,
        normals,
        island_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Point3, from_polygons, unit_cube};

    #[test]
    fn hard_cube_corner_uses_face_normal() {
        let cube = unit_cube();
        let adjacency = FaceAdjacency::build(&cube);
        let groups = smoothing_groups(&cube, &adjacency, 0.5);

        let top = cube.face_ids()[1];
        let corner = cube.vertex_ids()[6];
        let n = groups.corner_normal(top, corner).unwrap_or_else(Vector3::zeros);
        assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn smooth_cube_corner_is_diagonal() {
        let cube = unit_cube();
        let adjacency = FaceAdjacency::build(&cube);
        let groups = smoothing_groups(&cube, &adjacency, std::f64::consts::PI);

        let corner = cube.vertex_ids()[6];
        for face in cube.vertex(corner).map(|v| v.faces().clone()).unwrap_or_default() {
            let n = groups.corner_normal(face, corner).unwrap_or_else(Vector3::zeros);
            assert_relative_eq!(n, Vector3::new(1.0, 1.0, 1.0).normalize(), epsilon = 1e-12);
        }
    }

    #[test]
    fn shallow_fold_stays_smooth() {
        // Two quads meeting at a 10 degree fold.
        let tilt = 10f64.to_radians();
        let mesh = from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(2.0, 0.0, tilt.sin()),
                Point3::new(2.0, 1.0, tilt.sin()),
            ],
            &[vec![0, 1, 2, 3], vec![1, 4, 5, 2]],
        );
        let adjacency = FaceAdjacency::build(&mesh);

        assert_eq!(smoothing_groups(&mesh, &adjacency, 30f64.to_radians()).island_count(), 1);
        assert_eq!(smoothing_groups(&mesh, &adjacency, 5f64.to_radians()).island_count(), 2);
    }
}
