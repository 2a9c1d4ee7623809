//! Topological elements: vertices, edges and faces.
//!
//! Elements never own each other. Adjacency is stored as sets of ids and the
//! [`BRepMesh`](crate::BRepMesh) keeps both directions of every reference in
//! sync.

use std::collections::BTreeSet;

use nalgebra::{Point2, Point3};

use crate::ids::{EdgeId, FaceId, VertexId, edge_key};

/// A vertex of the boundary representation.
///
/// Incidence sets are ordered so that every traversal over them is
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Identifier of this vertex.
    pub id: VertexId,
    /// Position in model space.
    pub position: Point3<f64>,
    pub(crate) edges: BTreeSet<EdgeId>,
    pub(crate) faces: BTreeSet<FaceId>,
}

impl Vertex {
    pub(crate) const fn new(id: VertexId, position: Point3<f64>) -> Self {
        Self {
            id,
            position,
            edges: BTreeSet::new(),
            faces: BTreeSet::new(),
        }
    }

    /// Edges incident to this vertex.
    #[inline]
    #[must_use]
    pub const fn edges(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    /// Faces incident to this vertex.
    #[inline]
    #[must_use]
    pub const fn faces(&self) -> &BTreeSet<FaceId> {
        &self.faces
    }

    /// Whether the vertex has no incident edges and no incident faces.
    #[inline]
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.edges.is_empty() && self.faces.is_empty()
    }
}

/// An undirected edge between two distinct vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Identifier of this edge.
    pub id: EdgeId,
    /// First endpoint, as passed at creation.
    pub v1: VertexId,
    /// Second endpoint, as passed at creation.
    pub v2: VertexId,
    pub(crate) faces: BTreeSet<FaceId>,
}

impl Edge {
    pub(crate) const fn new(id: EdgeId, v1: VertexId, v2: VertexId) -> Self {
        Self {
            id,
            v1,
            v2,
            faces: BTreeSet::new(),
        }
    }

    /// Faces that use this edge.
    #[inline]
    #[must_use]
    pub const fn faces(&self) -> &BTreeSet<FaceId> {
        &self.faces
    }

    /// Both endpoints.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 2] {
        [self.v1, self.v2]
    }

    /// Whether `v` is one of the endpoints.
    #[inline]
    #[must_use]
    pub fn contains(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if self.v1 == v {
            Some(self.v2)
        } else if self.v2 == v {
            Some(self.v1)
        } else {
            None
        }
    }

    /// Normalized endpoint pair (smaller id first).
    #[inline]
    #[must_use]
    pub fn key(&self) -> (VertexId, VertexId) {
        edge_key(self.v1, self.v2)
    }

    /// Whether the edge borders at most one face.
    #[inline]
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.faces.len() <= 1
    }
}

/// A polygonal face.
///
/// The vertex order is the polygon boundary; its winding defines the normal
/// by the right-hand rule. `edges[i]` joins `vertices[i]` and
/// `vertices[(i + 1) % n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Identifier of this face.
    pub id: FaceId,
    pub(crate) vertices: Vec<VertexId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) uvs: Option<Vec<Point2<f64>>>,
    /// Material slot used to group render output.
    pub material: u32,
}

impl Face {
    /// Ordered boundary vertices.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Ordered boundary edges.
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of corners.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Faces always have at least three corners, so this is never true for a
    /// face stored in a mesh.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the face is a quad.
    #[inline]
    #[must_use]
    pub fn is_quad(&self) -> bool {
        self.vertices.len() == 4
    }

    /// Position of `v` in the boundary cycle.
    #[must_use]
    pub fn corner_of(&self, v: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&x| x == v)
    }

    /// Whether the face uses vertex `v`.
    #[inline]
    #[must_use]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    /// Position of `e` in the edge cycle.
    #[must_use]
    pub fn side_of(&self, e: EdgeId) -> Option<usize> {
        self.edges.iter().position(|&x| x == e)
    }

    /// Vertex at cyclic position `i` (wraps in both directions).
    #[must_use]
    pub fn vertex_at(&self, i: isize) -> VertexId {
        let n = self.vertices.len() as isize;
        self.vertices[i.rem_euclid(n) as usize]
    }

    /// Per-corner texture coordinates, one per vertex when present.
    #[must_use]
    pub fn uvs(&self) -> Option<&[Point2<f64>]> {
        self.uvs.as_deref()
    }

    /// Texture coordinate of corner `i`, if the face carries UVs.
    #[must_use]
    pub fn uv_at(&self, i: usize) -> Option<Point2<f64>> {
        self.uvs.as_ref().and_then(|uvs| uvs.get(i).copied())
    }

    /// Whether the boundary traverses `a` immediately followed by `b`.
    #[must_use]
    pub fn has_directed_side(&self, a: VertexId, b: VertexId) -> bool {
        let n = self.vertices.len();
        (0..n).any(|i| self.vertices[i] == a && self.vertices[(i + 1) % n] == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Face {
        Face {
            id: FaceId(0),
            vertices: vec![VertexId(0), VertexId(1), VertexId(2), VertexId(3)],
            edges: vec![EdgeId(0), EdgeId(1), EdgeId(2), EdgeId(3)],
            uvs: None,
            material: 0,
        }
    }

    #[test]
    fn edge_other_endpoint() {
        let e = Edge::new(EdgeId(0), VertexId(4), VertexId(9));
        assert_eq!(e.other(VertexId(4)), Some(VertexId(9)));
        assert_eq!(e.other(VertexId(9)), Some(VertexId(4)));
        assert_eq!(e.other(VertexId(1)), None);
        assert_eq!(e.key(), (VertexId(4), VertexId(9)));
    }

    #[test]
    fn face_cyclic_access() {
        let f = quad();
        assert_eq!(f.vertex_at(-1), VertexId(3));
        assert_eq!(f.vertex_at(5), VertexId(1));
        assert!(f.has_directed_side(VertexId(3), VertexId(0)));
        assert!(!f.has_directed_side(VertexId(0), VertexId(3)));
        assert_eq!(f.corner_of(VertexId(2)), Some(2));
        assert!(f.is_quad());
    }

    #[test]
    fn face_uvs_read_only() {
        let mut f = quad();
        assert!(f.uvs().is_none());
        assert_eq!(f.uv_at(0), None);

        f.uvs = Some((0..4).map(|i| Point2::new(f64::from(i), 0.0)).collect());
        assert_eq!(f.uvs().map(<[_]>::len), Some(f.len()));
        assert_eq!(f.uv_at(3), Some(Point2::new(3.0, 0.0)));
    }
}
