//! Topology validation and health reporting.
//!
//! Checks every adjacency invariant the store is supposed to maintain. Used
//! by tests after each mutation and available to callers that import data
//! from elsewhere.

use std::fmt;

use hashbrown::{HashMap, HashSet};

use crate::ids::{EdgeId, FaceId, VertexId, edge_key};
use crate::mesh::BRepMesh;

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A face references an edge that does not exist.
    MissingEdge {
        /// The face.
        face: FaceId,
        /// The missing edge.
        edge: EdgeId,
    },
    /// A face's edge does not join the corresponding consecutive corners.
    MisplacedEdge {
        /// The face.
        face: FaceId,
        /// The edge at the wrong position.
        edge: EdgeId,
    },
    /// A face references a vertex that does not exist.
    MissingVertex {
        /// The face or edge holding the reference.
        owner: String,
        /// The missing vertex.
        vertex: VertexId,
    },
    /// A face has fewer than three distinct corners.
    DegenerateFace(FaceId),
    /// An edge joins a vertex to itself.
    SelfLoop(EdgeId),
    /// Two edges share an unordered vertex pair.
    DuplicateEdge(EdgeId, EdgeId),
    /// A vertex's edge set differs from the edges that use it.
    VertexEdgeMismatch(VertexId),
    /// A vertex's face set differs from the faces that use it.
    VertexFaceMismatch(VertexId),
    /// An edge's face set differs from the faces that use it.
    EdgeFaceMismatch(EdgeId),
}

/// Report of topology validation.
#[derive(Debug, Clone, Default)]
pub struct TopologyReport {
    /// Number of live vertices.
    pub vertex_count: usize,
    /// Number of live edges.
    pub edge_count: usize,
    /// Number of live faces.
    pub face_count: usize,
    /// Edges used by exactly one face.
    pub boundary_edge_count: usize,
    /// Edges used by no face.
    pub wire_edge_count: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edge_count: usize,
    /// Vertices with neither edges nor faces.
    pub isolated_vertex_count: usize,
    /// Broken invariants, empty for a consistent mesh.
    pub violations: Vec<Violation>,
}

impl TopologyReport {
    /// Whether every invariant holds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether every edge has exactly two faces.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.boundary_edge_count == 0 && self.wire_edge_count == 0 && self.non_manifold_edge_count == 0
    }
}

impl fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Boundary edges: {}", self.boundary_edge_count)?;
        if self.wire_edge_count > 0 {
            writeln!(f, "  Wire edges: {}", self.wire_edge_count)?;
        }
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "  Non-manifold edges: {}", self.non_manifold_edge_count)?;
        }
        if self.isolated_vertex_count > 0 {
            writeln!(f, "  Isolated vertices: {}", self.isolated_vertex_count)?;
        }
        if self.is_valid() {
            writeln!(f, "  Status: consistent")?;
        } else {
            writeln!(f, "  Violations: {}", self.violations.len())?;
            for violation in &self.violations {
                writeln!(f, "    {violation:?}")?;
            }
        }
        Ok(())
    }
}

/// Validate every adjacency invariant of `mesh`.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, validate_topology};
///
/// let report = validate_topology(&unit_cube());
/// assert!(report.is_valid());
/// assert!(report.is_closed());
/// ```
#[must_use]
pub fn validate_topology(mesh: &BRepMesh) -> TopologyReport {
    let mut report = TopologyReport {
        vertex_count: mesh.vertex_count(),
        edge_count: mesh.edge_count(),
        face_count: mesh.face_count(),
        ..TopologyReport::default()
    };

    // Incidence expected from the referencing side.
    let mut vertex_edges: HashMap<VertexId, HashSet<EdgeId>> = HashMap::new();
    let mut vertex_faces: HashMap<VertexId, HashSet<FaceId>> = HashMap::new();
    let mut edge_faces: HashMap<EdgeId, HashSet<FaceId>> = HashMap::new();
    let mut pairs: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();

    for edge in mesh.edges() {
        if edge.v1 == edge.v2 {
            report.violations.push(Violation::SelfLoop(edge.id));
        }
        for v in edge.vertices() {
            if mesh.contains_vertex(v) {
                vertex_edges.entry(v).or_default().insert(edge.id);
            } else {
                report.violations.push(Violation::MissingVertex {
                    owner: edge.id.to_string(),
                    vertex: v,
                });
            }
        }
        if let Some(&other) = pairs.get(&edge.key()) {
            report.violations.push(Violation::DuplicateEdge(other, edge.id));
        } else {
            pairs.insert(edge.key(), edge.id);
        }

        match edge.faces().len() {
            0 => report.wire_edge_count += 1,
            1 => report.boundary_edge_count += 1,
            2 => {}
            _ => report.non_manifold_edge_count += 1,
        }
    }

    for face in mesh.faces() {
        let corners = face.vertices();
        let distinct: HashSet<VertexId> = corners.iter().copied().collect();
        if corners.len() < 3 || distinct.len() != corners.len() {
            report.violations.push(Violation::DegenerateFace(face.id));
        }
        if face.edges().len() != corners.len() {
            report.violations.push(Violation::DegenerateFace(face.id));
        }

        for &v in corners {
            if mesh.contains_vertex(v) {
                vertex_faces.entry(v).or_default().insert(face.id);
            } else {
                report.violations.push(Violation::MissingVertex {
                    owner: face.id.to_string(),
                    vertex: v,
                });
            }
        }

        let n = corners.len();
        for (i, &e) in face.edges().iter().enumerate() {
            let Some(edge) = mesh.edge(e) else {
                report
                    .violations
                    .push(Violation::MissingEdge { face: face.id, edge: e });
                continue;
            };
            edge_faces.entry(e).or_default().insert(face.id);
            if n > 0 && edge.key() != edge_key(corners[i % n], corners[(i + 1) % n]) {
                report
                    .violations
                    .push(Violation::MisplacedEdge { face: face.id, edge: e });
            }
        }
    }

    for vertex in mesh.vertices() {
        let expected_edges = vertex_edges.get(&vertex.id);
        let actual_edges: HashSet<EdgeId> = vertex.edges().iter().copied().collect();
        if expected_edges.map_or(!actual_edges.is_empty(), |set| *set != actual_edges) {
            report.violations.push(Violation::VertexEdgeMismatch(vertex.id));
        }

        let expected_faces = vertex_faces.get(&vertex.id);
        let actual_faces: HashSet<FaceId> = vertex.faces().iter().copied().collect();
        if expected_faces.map_or(!actual_faces.is_empty(), |set| *set != actual_faces) {
            report.violations.push(Violation::VertexFaceMismatch(vertex.id));
        }

        if vertex.is_isolated() {
            report.isolated_vertex_count += 1;
        }
    }

    for edge in mesh.edges() {
        let expected = edge_faces.get(&edge.id);
        let actual: HashSet<FaceId> = edge.faces().iter().copied().collect();
        if expected.map_or(!actual.is_empty(), |set| *set != actual) {
            report.violations.push(Violation::EdgeFaceMismatch(edge.id));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{unit_cube, unit_quad};
    use nalgebra::Point3;

    #[test]
    fn cube_is_valid_and_closed() {
        let report = validate_topology(&unit_cube());
        assert!(report.is_valid(), "{report}");
        assert!(report.is_closed());
        assert_eq!(report.boundary_edge_count, 0);
    }

    #[test]
    fn quad_has_boundary() {
        let report = validate_topology(&unit_quad());
        assert!(report.is_valid());
        assert_eq!(report.boundary_edge_count, 4);
        assert!(!report.is_closed());
    }

    #[test]
    fn detects_stale_edge_reference() {
        let mut mesh = unit_quad();
        let e = mesh.edge_ids()[0];
        mesh.delete_edge(e);

        let report = validate_topology(&mesh);
        assert!(!report.is_valid());
        assert!(
            report
                .violations
                .iter()
                .any(|v| matches!(v, Violation::MissingEdge { .. }))
        );
    }

    #[test]
    fn counts_wire_and_isolated() {
        let mut mesh = unit_quad();
        let lone = mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        let other = mesh.add_vertex(Point3::new(6.0, 5.0, 5.0));
        let report = validate_topology(&mesh);
        assert_eq!(report.isolated_vertex_count, 2);

        mesh.add_edge(lone, other);
        let report = validate_topology(&mesh);
        assert_eq!(report.wire_edge_count, 1);
        assert_eq!(report.isolated_vertex_count, 0);
        assert!(report.is_valid());
    }
}
