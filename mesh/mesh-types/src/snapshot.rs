//! Self-contained value snapshots of a mesh.
//!
//! A [`MeshSnapshot`] holds plain records with no references back into the
//! store. Restoring one rebuilds every entity from scratch, so the restored
//! mesh shares no mutable state with its source. Undo history and gesture
//! rollback are built on this.

use nalgebra::{Point2, Point3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, TopologyResult};
use crate::ids::{EdgeId, FaceId, VertexId};
use crate::mesh::BRepMesh;

/// A vertex record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexRecord {
    /// Vertex id.
    pub id: VertexId,
    /// Position `[x, y, z]`.
    pub position: [f64; 3],
}

/// An edge record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeRecord {
    /// Edge id.
    pub id: EdgeId,
    /// First endpoint.
    pub v1: VertexId,
    /// Second endpoint.
    pub v2: VertexId,
}

/// A face record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaceRecord {
    /// Face id.
    pub id: FaceId,
    /// Ordered boundary vertices.
    pub vertices: Vec<VertexId>,
    /// Optional per-corner texture coordinates `[u, v]`.
    pub uvs: Option<Vec<[f64; 2]>>,
    /// Material slot.
    pub material: u32,
}

/// Complete value copy of a [`BRepMesh`].
///
/// The id counters are recorded as well, so a restored mesh keeps handing
/// out ids past everything the source ever allocated.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshSnapshot {
    /// Vertex records in id order.
    pub vertices: Vec<VertexRecord>,
    /// Edge records in id order.
    pub edges: Vec<EdgeRecord>,
    /// Face records in id order.
    pub faces: Vec<FaceRecord>,
    /// Next vertex id to allocate.
    pub next_vertex: u32,
    /// Next edge id to allocate.
    pub next_edge: u32,
    /// Next face id to allocate.
    pub next_face: u32,
}

impl MeshSnapshot {
    /// Whether the snapshot describes an empty mesh.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl BRepMesh {
    /// Capture a snapshot of the current state.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{BRepMesh, unit_quad};
    ///
    /// let mesh = unit_quad();
    /// let snapshot = mesh.snapshot();
    /// let copy = BRepMesh::restore(&snapshot).unwrap();
    ///
    /// assert_eq!(copy.snapshot(), snapshot);
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> MeshSnapshot {
        let (next_vertex, next_edge, next_face) = self.next_ids();
        MeshSnapshot {
            vertices: self
                .vertices()
                .map(|v| VertexRecord {
                    id: v.id,
                    position: [v.position.x, v.position.y, v.position.z],
                })
                .collect(),
            edges: self
                .edges()
                .map(|e| EdgeRecord {
                    id: e.id,
                    v1: e.v1,
                    v2: e.v2,
                })
                .collect(),
            faces: self
                .faces()
                .map(|f| FaceRecord {
                    id: f.id,
                    vertices: f.vertices().to_vec(),
                    uvs: f
                        .uvs
                        .as_ref()
                        .map(|uvs| uvs.iter().map(|uv| [uv.x, uv.y]).collect()),
                    material: f.material,
                })
                .collect(),
            next_vertex: next_vertex.get(),
            next_edge: next_edge.get(),
            next_face: next_face.get(),
        }
    }

    /// Rebuild a mesh from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot contains duplicate ids, records that
    /// reference unknown vertices, self-loop edges, or faces the store would
    /// reject.
    pub fn restore(snapshot: &MeshSnapshot) -> TopologyResult<Self> {
        let mut mesh = Self::new();

        for record in &snapshot.vertices {
            let [x, y, z] = record.position;
            if !mesh.insert_vertex_with_id(record.id, Point3::new(x, y, z)) {
                return Err(TopologyError::DuplicateId(record.id.to_string()));
            }
        }

        for record in &snapshot.edges {
            if record.v1 == record.v2 {
                return Err(TopologyError::SelfLoop { edge: record.id });
            }
            for v in [record.v1, record.v2] {
                if !mesh.contains_vertex(v) {
                    return Err(TopologyError::UnknownVertex {
                        vertex: v,
                        referenced_by: record.id.to_string(),
                    });
                }
            }
            if !mesh.insert_edge_with_id(record.id, record.v1, record.v2) {
                return Err(TopologyError::DuplicateId(record.id.to_string()));
            }
        }

        // Faces may need edges the snapshot omitted; those get ids past every
        // recorded edge so they cannot collide.
        let max_edge = snapshot
            .edges
            .iter()
            .map(|e| e.id.get() + 1)
            .max()
            .unwrap_or(0)
            .max(snapshot.next_edge);
        mesh.reserve_ids((VertexId(0), EdgeId(max_edge), FaceId(0)));

        for record in &snapshot.faces {
            if let Some(&missing) = record.vertices.iter().find(|&&v| !mesh.contains_vertex(v)) {
                return Err(TopologyError::UnknownVertex {
                    vertex: missing,
                    referenced_by: record.id.to_string(),
                });
            }
            let uvs = record
                .uvs
                .as_ref()
                .map(|uvs| uvs.iter().map(|&[u, v]| Point2::new(u, v)).collect());
            if !mesh.insert_face_with_id(record.id, &record.vertices, uvs, record.material) {
                return Err(TopologyError::DegenerateFace { face: record.id });
            }
        }

        mesh.reserve_ids((
            VertexId(snapshot.next_vertex),
            EdgeId(snapshot.next_edge),
            FaceId(snapshot.next_face),
        ));

        debug!(
            vertices = mesh.vertex_count(),
            edges = mesh.edge_count(),
            faces = mesh.face_count(),
            "Restored mesh from snapshot"
        );

        Ok(mesh)
    }

    /// Replace this mesh's contents with a snapshot, keeping the revision
    /// counter monotonic.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`BRepMesh::restore`]; on error `self` is
    /// left untouched.
    pub fn restore_in_place(&mut self, snapshot: &MeshSnapshot) -> TopologyResult<()> {
        let restored = Self::restore(snapshot)?;
        let revision = self.revision();
        *self = restored;
        self.bump_revision_past(revision);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{unit_cube, unit_quad};

    #[test]
    fn round_trip_preserves_everything() {
        let mut mesh = unit_cube();
        let extra = mesh.add_vertex(Point3::new(3.0, 3.0, 3.0));
        let first = mesh.face_ids()[0];
        mesh.delete_face(first);
        let _ = mesh.add_edge(extra, VertexId(0));

        let snapshot = mesh.snapshot();
        let copy = BRepMesh::restore(&snapshot).unwrap();

        assert_eq!(copy.vertex_count(), mesh.vertex_count());
        assert_eq!(copy.edge_count(), mesh.edge_count());
        assert_eq!(copy.face_count(), mesh.face_count());
        assert_eq!(copy.snapshot(), snapshot);
        assert_eq!(copy.next_ids(), mesh.next_ids());
    }

    #[test]
    fn restored_copy_is_independent() {
        let mesh = unit_quad();
        let mut copy = BRepMesh::restore(&mesh.snapshot()).unwrap();

        copy.set_position(VertexId(0), Point3::new(9.0, 9.0, 9.0));
        let f = copy.face_ids()[0];
        copy.delete_face(f);

        assert_eq!(mesh.position(VertexId(0)), Some(Point3::origin()));
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn restored_mesh_does_not_reuse_deleted_ids() {
        let mut mesh = unit_quad();
        let f = mesh.face_ids()[0];
        mesh.delete_face(f);
        let mut copy = BRepMesh::restore(&mesh.snapshot()).unwrap();
        let a = VertexId(0);
        let b = VertexId(1);
        let c = VertexId(2);
        let new_face = copy.add_face(&[a, b, c], None, 0).unwrap();
        assert_ne!(new_face, f);
    }

    #[test]
    fn rejects_unknown_vertex_reference() {
        let mut snapshot = unit_quad().snapshot();
        snapshot.faces[0].vertices[0] = VertexId(40);
        let err = BRepMesh::restore(&snapshot).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownVertex { .. }));
    }

    #[test]
    fn rejects_self_loop_edges() {
        let mut snapshot = unit_quad().snapshot();
        snapshot.edges[0].v2 = snapshot.edges[0].v1;
        let err = BRepMesh::restore(&snapshot).unwrap_err();
        assert!(matches!(err, TopologyError::SelfLoop { .. }));
    }

    #[test]
    fn restore_in_place_keeps_revision_monotonic() {
        let mut mesh = unit_quad();
        let snapshot = mesh.snapshot();
        mesh.translate_vertices(&[VertexId(0)], nalgebra::Vector3::new(1.0, 0.0, 0.0));
        let before = mesh.revision();

        mesh.restore_in_place(&snapshot).unwrap();
        assert!(mesh.revision() > before);
        assert_eq!(mesh.position(VertexId(0)), Some(Point3::origin()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = unit_cube().snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: MeshSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
