//! The topology store.

use hashbrown::{HashMap, HashSet};
use nalgebra::{Point2, Point3, Vector3};
use tracing::warn;

use crate::ids::{EdgeId, FaceId, VertexId, edge_key};
use crate::vertex::{Edge, Face, Vertex};

/// An editable boundary-representation mesh.
///
/// Entities live in append-only arenas addressed by id. Deleting an entity
/// leaves a tombstone so ids are never handed out twice. Adjacency is kept
/// in both directions:
///
/// - every vertex knows its incident edges and faces,
/// - every edge knows its faces,
/// - every face knows its ordered vertices and edges.
///
/// Malformed requests (self-loop edges, degenerate faces, unknown ids) are
/// no-ops that return `None` or `false`; nothing in the store panics on bad
/// input.
///
/// # Example
///
/// ```
/// use mesh_types::{BRepMesh, Point3};
///
/// let mut mesh = BRepMesh::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
///
/// let face = mesh.add_face(&[a, b, c], None, 0).unwrap();
/// assert_eq!(mesh.face_count(), 1);
/// assert_eq!(mesh.edge_count(), 3);
/// assert!(mesh.vertex(a).unwrap().faces().contains(&face));
///
/// // Edges are unique per unordered vertex pair.
/// let ab = mesh.add_edge(b, a).unwrap();
/// assert_eq!(mesh.edge_between(a, b).map(|e| e.id), Some(ab));
/// assert_eq!(mesh.edge_count(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BRepMesh {
    vertices: Vec<Option<Vertex>>,
    edges: Vec<Option<Edge>>,
    faces: Vec<Option<Face>>,
    edge_lookup: HashMap<(VertexId, VertexId), EdgeId>,
    vertex_count: usize,
    edge_count: usize,
    face_count: usize,
    revision: u64,
}

impl BRepMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Counts and lookups
    // =========================================================================

    /// Number of live vertices.
    #[inline]
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of live edges.
    #[inline]
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of live faces.
    #[inline]
    #[must_use]
    pub const fn face_count(&self) -> usize {
        self.face_count
    }

    /// Whether the mesh has no vertices at all.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Mutation counter. Increases on every successful mutation and is
    /// suitable for invalidating derived caches.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The ids the next created vertex, edge and face will receive.
    #[must_use]
    pub fn next_ids(&self) -> (VertexId, EdgeId, FaceId) {
        (
            VertexId(arena_len(&self.vertices)),
            EdgeId(arena_len(&self.edges)),
            FaceId(arena_len(&self.faces)),
        )
    }

    /// Look up a vertex.
    #[inline]
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up an edge.
    #[inline]
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a face.
    #[inline]
    #[must_use]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up the edge joining two vertices, in either order.
    #[must_use]
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<&Edge> {
        self.edge_lookup
            .get(&edge_key(a, b))
            .and_then(|&id| self.edge(id))
    }

    /// Whether a vertex id is live.
    #[inline]
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    /// Whether an edge id is live.
    #[inline]
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Whether a face id is live.
    #[inline]
    #[must_use]
    pub fn contains_face(&self, id: FaceId) -> bool {
        self.face(id).is_some()
    }

    /// Position of a vertex.
    #[inline]
    #[must_use]
    pub fn position(&self, id: VertexId) -> Option<Point3<f64>> {
        self.vertex(id).map(|v| v.position)
    }

    /// Positions of a face's corners, in boundary order.
    #[must_use]
    pub fn face_positions(&self, id: FaceId) -> Option<Vec<Point3<f64>>> {
        let face = self.face(id)?;
        face.vertices
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    /// Iterate over live vertices in id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter().filter_map(Option::as_ref)
    }

    /// Iterate over live edges in id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter_map(Option::as_ref)
    }

    /// Iterate over live faces in id order.
    pub fn faces(&self) -> impl Iterator<Item = &Face> + '_ {
        self.faces.iter().filter_map(Option::as_ref)
    }

    /// Ids of live vertices in ascending order.
    #[must_use]
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices().map(|v| v.id).collect()
    }

    /// Ids of live edges in ascending order.
    #[must_use]
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges().map(|e| e.id).collect()
    }

    /// Ids of live faces in ascending order.
    #[must_use]
    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces().map(|f| f.id).collect()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a new vertex. Always succeeds.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId(arena_len(&self.vertices));
        self.vertices.push(Some(Vertex::new(id, position)));
        self.vertex_count += 1;
        self.touch();
        id
    }

    /// Return the edge joining `a` and `b`, creating it if needed.
    ///
    /// Returns `None` for a self-loop (`a == b`) or an unknown vertex.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        if a == b || !self.contains_vertex(a) || !self.contains_vertex(b) {
            return None;
        }
        if let Some(&existing) = self.edge_lookup.get(&edge_key(a, b)) {
            return Some(existing);
        }

        let id = EdgeId(arena_len(&self.edges));
        self.edges.push(Some(Edge::new(id, a, b)));
        self.edge_lookup.insert(edge_key(a, b), id);
        self.edge_count += 1;
        for v in [a, b] {
            if let Some(vertex) = self.vertex_slot(v) {
                vertex.edges.insert(id);
            }
        }
        self.touch();
        Some(id)
    }

    /// Create a face from an ordered vertex loop.
    ///
    /// Requires at least three distinct live vertices. Missing boundary
    /// edges are created. `uvs` is stored only when it has one entry per
    /// corner.
    pub fn add_face(
        &mut self,
        vertices: &[VertexId],
        uvs: Option<Vec<Point2<f64>>>,
        material: u32,
    ) -> Option<FaceId> {
        if vertices.len() < 3 {
            return None;
        }
        let mut seen = HashSet::with_capacity(vertices.len());
        for &v in vertices {
            if !self.contains_vertex(v) || !seen.insert(v) {
                return None;
            }
        }

        let n = vertices.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            edges.push(self.add_edge(vertices[i], vertices[(i + 1) % n])?);
        }

        let id = FaceId(arena_len(&self.faces));
        for &v in vertices {
            if let Some(vertex) = self.vertex_slot(v) {
                vertex.faces.insert(id);
            }
        }
        for &e in &edges {
            if let Some(edge) = self.edge_slot(e) {
                edge.faces.insert(id);
            }
        }

        let uvs = uvs.filter(|uvs| uvs.len() == n);
        self.faces.push(Some(Face {
            id,
            vertices: vertices.to_vec(),
            edges,
            uvs,
            material,
        }));
        self.face_count += 1;
        self.touch();
        Some(id)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Move a vertex. Returns `false` for an unknown id.
    pub fn set_position(&mut self, id: VertexId, position: Point3<f64>) -> bool {
        let Some(vertex) = self.vertex_slot(id) else {
            return false;
        };
        vertex.position = position;
        self.touch();
        true
    }

    /// Translate a set of vertices. Unknown ids are skipped.
    ///
    /// Returns the number of vertices moved.
    pub fn translate_vertices(&mut self, ids: &[VertexId], offset: Vector3<f64>) -> usize {
        let mut moved = 0;
        for &id in ids {
            if let Some(vertex) = self.vertex_slot(id) {
                vertex.position += offset;
                moved += 1;
            }
        }
        if moved > 0 {
            self.touch();
        }
        moved
    }

    /// Replace the material slot of a face.
    pub fn set_material(&mut self, id: FaceId, material: u32) -> bool {
        let Some(face) = self.face_slot(id) else {
            return false;
        };
        face.material = material;
        self.touch();
        true
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete a face and unregister it from its vertices and edges.
    ///
    /// Edges and vertices that become unused are left in place.
    pub fn delete_face(&mut self, id: FaceId) -> Option<Face> {
        let face = self.faces.get_mut(id.index())?.take()?;
        for &v in &face.vertices {
            if let Some(vertex) = self.vertex_slot(v) {
                vertex.faces.remove(&id);
            }
        }
        for &e in &face.edges {
            if let Some(edge) = self.edge_slot(e) {
                edge.faces.remove(&id);
            }
        }
        self.face_count -= 1;
        self.touch();
        Some(face)
    }

    /// Delete an edge and unregister it from both endpoints.
    ///
    /// Faces still using the edge keep a stale reference; callers delete
    /// dependent faces first.
    pub fn delete_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.get_mut(id.index())?.take()?;
        if !edge.faces.is_empty() {
            warn!(
                edge = %id,
                faces = edge.faces.len(),
                "Deleting an edge that is still referenced by faces"
            );
        }
        self.edge_lookup.remove(&edge.key());
        for v in edge.vertices() {
            if let Some(vertex) = self.vertex_slot(v) {
                vertex.edges.remove(&id);
            }
        }
        self.edge_count -= 1;
        self.touch();
        Some(edge)
    }

    /// Delete a vertex together with every face and edge that uses it.
    pub fn delete_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        let (faces, edges) = {
            let vertex = self.vertex(id)?;
            (
                vertex.faces.iter().copied().collect::<Vec<_>>(),
                vertex.edges.iter().copied().collect::<Vec<_>>(),
            )
        };
        for f in faces {
            self.delete_face(f);
        }
        for e in edges {
            self.delete_edge(e);
        }
        let vertex = self.vertices.get_mut(id.index())?.take()?;
        self.vertex_count -= 1;
        self.touch();
        Some(vertex)
    }

    /// Delete an edge only if no face uses it. Returns whether it was removed.
    pub fn delete_edge_if_unused(&mut self, id: EdgeId) -> bool {
        match self.edge(id) {
            Some(edge) if edge.faces.is_empty() => self.delete_edge(id).is_some(),
            _ => false,
        }
    }

    /// Delete a vertex only if it has no edges and no faces.
    pub fn delete_vertex_if_isolated(&mut self, id: VertexId) -> bool {
        match self.vertex(id) {
            Some(vertex) if vertex.is_isolated() => self.delete_vertex(id).is_some(),
            _ => false,
        }
    }

    // =========================================================================
    // Restoration support
    // =========================================================================

    /// Insert a vertex with a fixed id. Used when rebuilding from a snapshot.
    pub(crate) fn insert_vertex_with_id(&mut self, id: VertexId, position: Point3<f64>) -> bool {
        if self.contains_vertex(id) {
            return false;
        }
        ensure_slot(&mut self.vertices, id.index());
        self.vertices[id.index()] = Some(Vertex::new(id, position));
        self.vertex_count += 1;
        true
    }

    /// Insert an edge with a fixed id. Used when rebuilding from a snapshot.
    pub(crate) fn insert_edge_with_id(&mut self, id: EdgeId, a: VertexId, b: VertexId) -> bool {
        if a == b
            || self.contains_edge(id)
            || !self.contains_vertex(a)
            || !self.contains_vertex(b)
            || self.edge_lookup.contains_key(&edge_key(a, b))
        {
            return false;
        }
        ensure_slot(&mut self.edges, id.index());
        self.edges[id.index()] = Some(Edge::new(id, a, b));
        self.edge_lookup.insert(edge_key(a, b), id);
        for v in [a, b] {
            if let Some(vertex) = self.vertex_slot(v) {
                vertex.edges.insert(id);
            }
        }
        self.edge_count += 1;
        true
    }

    /// Insert a face with a fixed id. Missing edges get fresh ids past the
    /// reserved range.
    pub(crate) fn insert_face_with_id(
        &mut self,
        id: FaceId,
        vertices: &[VertexId],
        uvs: Option<Vec<Point2<f64>>>,
        material: u32,
    ) -> bool {
        if self.contains_face(id) || vertices.len() < 3 {
            return false;
        }
        let mut seen = HashSet::with_capacity(vertices.len());
        if !vertices
            .iter()
            .all(|&v| self.contains_vertex(v) && seen.insert(v))
        {
            return false;
        }
        ensure_slot(&mut self.faces, id.index());

        let n = vertices.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            let Some(e) = self.add_edge(vertices[i], vertices[(i + 1) % n]) else {
                return false;
            };
            edges.push(e);
        }
        for &v in vertices {
            if let Some(vertex) = self.vertex_slot(v) {
                vertex.faces.insert(id);
            }
        }
        for &e in &edges {
            if let Some(edge) = self.edge_slot(e) {
                edge.faces.insert(id);
            }
        }
        self.faces[id.index()] = Some(Face {
            id,
            vertices: vertices.to_vec(),
            edges,
            uvs: uvs.filter(|uvs| uvs.len() == n),
            material,
        });
        self.face_count += 1;
        true
    }

    /// Grow arenas so that freshly created ids start at least at `next`.
    pub(crate) fn reserve_ids(&mut self, next: (VertexId, EdgeId, FaceId)) {
        if next.0.index() > 0 {
            ensure_slot(&mut self.vertices, next.0.index() - 1);
        }
        if next.1.index() > 0 {
            ensure_slot(&mut self.edges, next.1.index() - 1);
        }
        if next.2.index() > 0 {
            ensure_slot(&mut self.faces, next.2.index() - 1);
        }
    }

    pub(crate) fn bump_revision_past(&mut self, revision: u64) {
        self.revision = self.revision.max(revision).wrapping_add(1);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn vertex_slot(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn edge_slot(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn face_slot(&mut self, id: FaceId) -> Option<&mut Face> {
        self.faces.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: ids are u32, meshes beyond 4B entities are unsupported
fn arena_len<T>(arena: &[Option<T>]) -> u32 {
    arena.len() as u32
}

fn ensure_slot<T>(arena: &mut Vec<Option<T>>, index: usize) {
    if arena.len() <= index {
        arena.resize_with(index + 1, || None);
    }
}

/// Build a mesh from positions and polygons given as indices into
/// `positions`.
///
/// Polygons that the store rejects (fewer than three distinct corners,
/// out-of-range indices) are skipped.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, from_polygons};
///
/// let mesh = from_polygons(
///     &[
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     &[vec![0, 1, 2]],
/// );
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[must_use]
pub fn from_polygons(positions: &[Point3<f64>], polygons: &[Vec<usize>]) -> BRepMesh {
    let mut mesh = BRepMesh::new();
    let ids: Vec<VertexId> = positions.iter().map(|&p| mesh.add_vertex(p)).collect();
    for polygon in polygons {
        let corners: Option<Vec<VertexId>> = polygon.iter().map(|&i| ids.get(i).copied()).collect();
        if let Some(corners) = corners {
            let _ = mesh.add_face(&corners, None, 0);
        }
    }
    mesh
}

/// A single unit quad in the XY plane with its normal along +Z.
///
/// Corners are `(0,0,0)`, `(1,0,0)`, `(1,1,0)`, `(0,1,0)`.
#[must_use]
pub fn unit_quad() -> BRepMesh {
    from_polygons(
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        &[vec![0, 1, 2, 3]],
    )
}

/// A closed unit cube from `(0,0,0)` to `(1,1,1)` made of six quads with
/// outward normals.
///
/// Faces are created in the order bottom, top, front, back, left, right.
#[must_use]
pub fn unit_cube() -> BRepMesh {
    from_polygons(
        &[
            Point3::new(0.0, 0.0, 0.0), // 0
            Point3::new(1.0, 0.0, 0.0), // 1
            Point3::new(1.0, 1.0, 0.0), // 2
            Point3::new(0.0, 1.0, 0.0), // 3
            Point3::new(0.0, 0.0, 1.0), // 4
            Point3::new(1.0, 0.0, 1.0), // 5
            Point3::new(1.0, 1.0, 1.0), // 6
            Point3::new(0.0, 1.0, 1.0), // 7
        ],
        &[
            vec![0, 3, 2, 1], // bottom, -Z
            vec![4, 5, 6, 7], // top, +Z
            vec![0, 1, 5, 4], // front, -Y
            vec![3, 7, 6, 2], // back, +Y
            vec![0, 4, 7, 3], // left, -X
            vec![1, 2, 6, 5], // right, +X
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (BRepMesh, [VertexId; 3]) {
        let mut mesh = BRepMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        (mesh, [a, b, c])
    }

    #[test]
    fn add_edge_rejects_self_loop() {
        let (mut mesh, [a, _, _]) = triangle();
        assert!(mesh.add_edge(a, a).is_none());
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn add_edge_is_idempotent() {
        let (mut mesh, [a, b, _]) = triangle();
        let e1 = mesh.add_edge(a, b);
        let e2 = mesh.add_edge(b, a);
        assert_eq!(e1, e2);
        assert_eq!(mesh.edge_count(), 1);
    }

    #[test]
    fn add_edge_rejects_unknown_vertex() {
        let (mut mesh, [a, _, _]) = triangle();
        assert!(mesh.add_edge(a, VertexId(99)).is_none());
    }

    #[test]
    fn add_face_registers_incidence() {
        let (mut mesh, [a, b, c]) = triangle();
        let f = mesh.add_face(&[a, b, c], None, 2).unwrap();

        let face = mesh.face(f).unwrap();
        assert_eq!(face.vertices(), &[a, b, c]);
        assert_eq!(face.edges().len(), 3);
        assert_eq!(face.material, 2);

        for &e in face.edges() {
            assert!(mesh.edge(e).unwrap().faces().contains(&f));
        }
        for v in [a, b, c] {
            assert!(mesh.vertex(v).unwrap().faces().contains(&f));
            assert_eq!(mesh.vertex(v).unwrap().edges().len(), 2);
        }
    }

    #[test]
    fn add_face_rejects_degenerate_input() {
        let (mut mesh, [a, b, c]) = triangle();
        assert!(mesh.add_face(&[a, b], None, 0).is_none());
        assert!(mesh.add_face(&[a, b, a], None, 0).is_none());
        assert!(mesh.add_face(&[a, b, VertexId(42)], None, 0).is_none());
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert!(mesh.add_face(&[a, b, c], None, 0).is_some());
    }

    #[test]
    fn add_face_drops_mismatched_uvs() {
        let (mut mesh, [a, b, c]) = triangle();
        let bad = mesh
            .add_face(&[a, b, c], Some(vec![Point2::new(0.0, 0.0)]), 0)
            .unwrap();
        assert!(mesh.face(bad).unwrap().uvs().is_none());

        let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        let uvs = vec![
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let good = mesh.add_face(&[b, d, c], Some(uvs.clone()), 0).unwrap();
        assert_eq!(mesh.face(good).unwrap().uvs(), Some(uvs.as_slice()));
        assert_eq!(mesh.face(good).unwrap().uv_at(1), Some(Point2::new(1.0, 1.0)));
    }

    #[test]
    fn delete_face_leaves_edges_and_vertices() {
        let (mut mesh, [a, b, c]) = triangle();
        let f = mesh.add_face(&[a, b, c], None, 0).unwrap();
        assert!(mesh.delete_face(f).is_some());

        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.edges().all(|e| e.faces().is_empty()));
        assert!(mesh.vertices().all(|v| v.faces().is_empty()));
        assert!(mesh.delete_face(f).is_none());
    }

    #[test]
    fn delete_edge_unregisters_endpoints() {
        let (mut mesh, [a, b, _]) = triangle();
        let e = mesh.add_edge(a, b).unwrap();
        assert!(mesh.delete_edge(e).is_some());
        assert!(mesh.edge_between(a, b).is_none());
        assert!(mesh.vertex(a).unwrap().edges().is_empty());
        assert!(mesh.vertex(b).unwrap().edges().is_empty());
    }

    #[test]
    fn delete_vertex_cascades() {
        let mut mesh = unit_quad();
        let v = mesh.vertex_ids()[0];
        assert!(mesh.delete_vertex(v).is_some());
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 2);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn ids_are_never_reused() {
        let (mut mesh, [a, b, c]) = triangle();
        let f = mesh.add_face(&[a, b, c], None, 0).unwrap();
        mesh.delete_face(f);
        let f2 = mesh.add_face(&[a, b, c], None, 0).unwrap();
        assert_ne!(f, f2);

        mesh.delete_vertex(c);
        let d = mesh.add_vertex(Point3::origin());
        assert_ne!(c, d);
        assert!(mesh.vertex(c).is_none());
    }

    #[test]
    fn revision_tracks_mutations() {
        let (mut mesh, [a, b, _]) = triangle();
        let before = mesh.revision();
        mesh.add_edge(a, b);
        assert!(mesh.revision() > before);

        let unchanged = mesh.revision();
        assert!(mesh.add_edge(a, a).is_none());
        assert_eq!(mesh.revision(), unchanged);
    }

    #[test]
    fn unit_cube_is_closed() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.edge_count(), 12);
        assert_eq!(cube.face_count(), 6);
        assert!(cube.edges().all(|e| e.faces().len() == 2));
    }

    #[test]
    fn translate_vertices_skips_unknown() {
        let mut mesh = unit_quad();
        let ids = [VertexId(0), VertexId(77)];
        assert_eq!(mesh.translate_vertices(&ids, Vector3::new(0.0, 0.0, 2.0)), 1);
        assert_eq!(mesh.position(VertexId(0)), Some(Point3::new(0.0, 0.0, 2.0)));
    }
}
