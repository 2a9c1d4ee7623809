//! Face adjacency with per-revision caching.
//!
//! Normal computation and smoothed buffer synthesis both walk the same
//! face graph. [`AdjacencyCache`] builds it once per store revision and
//! hands out the cached copy until the mesh is mutated again.

use hashbrown::HashMap;
use mesh_types::{BRepMesh, EdgeId, FaceId};
use nalgebra::Vector3;
use tracing::debug;

use crate::normals::face_normals;

/// Faces sharing an edge, plus each face's flat normal.
#[derive(Debug, Clone, Default)]
pub struct FaceAdjacency {
    revision: u64,
    neighbors: HashMap<FaceId, Vec<(EdgeId, FaceId)>>,
    normals: HashMap<FaceId, Vector3<f64>>,
}

impl FaceAdjacency {
    /// Build adjacency for every live face of `mesh`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_geometry::FaceAdjacency;
    /// use mesh_types::unit_cube;
    ///
    /// let cube = unit_cube();
    /// let adjacency = FaceAdjacency::build(&cube);
    /// let top = cube.face_ids()[1];
    /// assert_eq!(adjacency.neighbors(top).len(), 4);
    /// ```
    #[must_use]
    pub fn build(mesh: &BRepMesh) -> Self {
        let mut neighbors: HashMap<FaceId, Vec<(EdgeId, FaceId)>> = HashMap::new();
        for face in mesh.faces() {
            let entry = neighbors.entry(face.id).or_default();
            for &e in face.edges() {
                let Some(edge) = mesh.edge(e) else { continue };
                for &other in edge.faces() {
                    if other != face.id {
                        entry.push((e, other));
                    }
                }
            }
        }

        Self {
            revision: mesh.revision(),
            neighbors,
            normals: face_normals(mesh),
        }
    }

    /// Store revision this adjacency was built from.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Faces sharing an edge with `face`, with the shared edge.
    ///
    /// Returns an empty slice for an unknown face.
    #[must_use]
    pub fn neighbors(&self, face: FaceId) -> &[(EdgeId, FaceId)] {
        self.neighbors.get(&face).map_or(&[], Vec::as_slice)
    }

    /// Flat normal of `face` at build time.
    #[must_use]
    pub fn normal(&self, face: FaceId) -> Option<Vector3<f64>> {
        self.normals.get(&face).copied()
    }

    /// Number of faces covered.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.neighbors.len()
    }
}

/// Caches a [`FaceAdjacency`] and rebuilds it when the store revision
/// changes.
///
/// One cache serves one mesh. Feeding it a different mesh that happens to
/// share the revision number returns stale data.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyCache {
    cached: Option<FaceAdjacency>,
    builds: usize,
}

impl AdjacencyCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjacency for the current state of `mesh`.
    pub fn get(&mut self, mesh: &BRepMesh) -> &FaceAdjacency {
        let stale = self
            .cached
            .as_ref()
            .is_none_or(|a| a.revision != mesh.revision());
        if stale {
            debug!(revision = mesh.revision(), "Rebuilding face adjacency");
            self.builds += 1;
            self.cached = Some(FaceAdjacency::build(mesh));
        }
        self.cached.get_or_insert_with(|| FaceAdjacency::build(mesh))
    }

    /// Drop the cached adjacency.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// How many times the adjacency has been built.
    #[must_use]
    pub const fn builds(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Point3, unit_cube, unit_quad};

    #[test]
    fn quad_has_no_neighbors() {
        let quad = unit_quad();
        let adjacency = FaceAdjacency::build(&quad);
        assert!(adjacency.neighbors(quad.face_ids()[0]).is_empty());
        assert_eq!(adjacency.face_count(), 1);
        assert!(adjacency.neighbors(FaceId(42)).is_empty());
    }

    #[test]
    fn cube_neighbors_share_edges() {
        let cube = unit_cube();
        let adjacency = FaceAdjacency::build(&cube);
        for face in cube.faces() {
            let neighbors = adjacency.neighbors(face.id);
            assert_eq!(neighbors.len(), 4);
            for &(edge, other) in neighbors {
                assert!(face.edges().contains(&edge));
                assert!(cube.face(other).is_some_and(|f| f.edges().contains(&edge)));
            }
        }
    }

    #[test]
    fn cache_rebuilds_only_after_mutation() {
        let mut cube = unit_cube();
        let mut cache = AdjacencyCache::new();

        let _ = cache.get(&cube);
        let _ = cache.get(&cube);
        assert_eq!(cache.builds(), 1);

        let v = cube.vertex_ids()[0];
        cube.set_position(v, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(cache.get(&cube).revision(), cube.revision());
        assert_eq!(cache.builds(), 2);

        cache.invalidate();
        let _ = cache.get(&cube);
        assert_eq!(cache.builds(), 3);
    }
}
