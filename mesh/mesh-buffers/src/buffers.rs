//! Render buffer types.
//!
//! [`RenderBuffers`] holds flat `f32` arrays ready for upload together with
//! the maps back into topology that picking and live drag updates need.
//!
//! # Memory Layout
//!
//! - positions: 3 floats per buffer vertex
//! - uvs: 2 floats per buffer vertex
//! - normals: 3 floats per buffer vertex
//! - indices: 3 per triangle, grouped by material
//! - [`RenderVertex`]: 32 bytes interleaved (position, uv, normal)

use bytemuck::{Pod, Zeroable};
use hashbrown::HashMap;
use mesh_types::{BRepMesh, EdgeId, FaceId, Point3, Vector3, VertexId};
use tracing::debug;

use crate::error::{BufferError, BufferResult};
use crate::params::SynthesisStrategy;

/// Interleaved vertex for a single-buffer upload.
///
/// # Example
///
/// ```
/// use mesh_buffers::RenderVertex;
///
/// let v = RenderVertex::new([1.0, 2.0, 3.0], [0.5, 0.5], [0.0, 0.0, 1.0]);
/// assert_eq!(std::mem::size_of::<RenderVertex>(), 32);
/// assert_eq!(bytemuck::bytes_of(&v).len(), 32);
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    /// Position (xyz).
    pub position: [f32; 3],
    /// Texture coordinate (uv).
    pub uv: [f32; 2],
    /// Shading normal (xyz).
    pub normal: [f32; 3],
}

impl RenderVertex {
    /// Create a vertex from its attributes.
    #[must_use]
    pub const fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self { position, uv, normal }
    }
}

/// A contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderGroup {
    /// Material slot.
    pub material: u32,
    /// First index in [`RenderBuffers::indices`].
    pub start: usize,
    /// Number of indices.
    pub count: usize,
}

impl RenderGroup {
    /// Index range covered by the group.
    #[must_use]
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

/// Synthesized render buffers.
///
/// Buffer vertex `i` comes from topology vertex `vertex_ids[i]`; one
/// topology vertex may feed several buffer vertices. Triangle `t` comes
/// from face `triangle_faces[t]`, or from no face when it is the
/// zero-area marker drawn for a face-less vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffers {
    /// Flat positions, 3 per vertex.
    pub positions: Vec<f32>,
    /// Flat texture coordinates, 2 per vertex.
    pub uvs: Vec<f32>,
    /// Flat shading normals, 3 per vertex.
    pub normals: Vec<f32>,
    /// Triangle indices, 3 per triangle.
    pub indices: Vec<u32>,
    /// Material ranges over `indices`, ascending by material.
    pub groups: Vec<RenderGroup>,
    /// Source topology vertex of every buffer vertex.
    pub vertex_ids: Vec<VertexId>,
    /// Source face of every triangle.
    pub triangle_faces: Vec<Option<FaceId>>,
    /// Line indices for the wireframe, 2 per topology edge.
    pub line_indices: Vec<u32>,
    /// Source edge of every line.
    pub line_edges: Vec<EdgeId>,
    /// Store revision the buffers were built or refreshed from.
    pub revision: u64,
    /// Strategy used to build the buffers.
    pub strategy: Option<SynthesisStrategy>,
}

impl RenderBuffers {
    /// Create empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffer vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_ids.len()
    }

    /// Number of triangles, including point markers.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty()
    }

    /// Whether `mesh` has changed since the buffers were built.
    #[must_use]
    pub const fn is_stale(&self, mesh: &BRepMesh) -> bool {
        self.revision != mesh.revision()
    }

    /// Position of buffer vertex `index`.
    #[must_use]
    pub fn position(&self, index: u32) -> Option<Point3<f64>> {
        let i = index as usize * 3;
        let p = self.positions.get(i..i + 3)?;
        Some(Point3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2])))
    }

    /// Topology vertex behind buffer vertex `index`.
    #[must_use]
    pub fn source_vertex(&self, index: u32) -> Option<VertexId> {
        self.vertex_ids.get(index as usize).copied()
    }

    /// Face behind triangle `triangle`.
    #[must_use]
    pub fn source_face(&self, triangle: usize) -> Option<FaceId> {
        self.triangle_faces.get(triangle).copied().flatten()
    }

    /// Corner indices of triangle `triangle`.
    #[must_use]
    pub fn triangle(&self, triangle: usize) -> Option<[u32; 3]> {
        let i = triangle * 3;
        let t = self.indices.get(i..i + 3)?;
        Some([t[0], t[1], t[2]])
    }

    /// Every buffer vertex fed by topology vertex `vertex`.
    #[must_use]
    pub fn indices_of(&self, vertex: VertexId) -> Vec<u32> {
        self.vertex_ids
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == vertex)
            .filter_map(|(i, _)| u32::try_from(i).ok())
            .collect()
    }

    /// Buffer vertices grouped by their topology vertex.
    #[must_use]
    pub fn index_map(&self) -> HashMap<VertexId, Vec<u32>> {
        let mut map: HashMap<VertexId, Vec<u32>> = HashMap::new();
        for (i, &v) in self.vertex_ids.iter().enumerate() {
            if let Ok(i) = u32::try_from(i) {
                map.entry(v).or_default().push(i);
            }
        }
        map
    }

    /// Interleave the vertex attributes.
    #[must_use]
    pub fn interleaved(&self) -> Vec<RenderVertex> {
        (0..self.vertex_count())
            .map(|i| {
                let p = &self.positions[i * 3..i * 3 + 3];
                let uv = &self.uvs[i * 2..i * 2 + 2];
                let n = &self.normals[i * 3..i * 3 + 3];
                RenderVertex::new([p[0], p[1], p[2]], [uv[0], uv[1]], [n[0], n[1], n[2]])
            })
            .collect()
    }

    /// The index array as raw bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Copy current vertex positions from `mesh` into the buffers.
    ///
    /// Meant for drags that move vertices without changing topology, so
    /// the index arrays stay valid. Returns the number of buffer vertices
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::StaleVertex`] if a source vertex was deleted;
    /// the buffers are left untouched.
    #[allow(clippy::cast_possible_truncation)]
    pub fn refresh_positions(&mut self, mesh: &BRepMesh) -> BufferResult<usize> {
        let mut fresh = Vec::with_capacity(self.positions.len());
        for &v in &self.vertex_ids {
            let p = mesh.position(v).ok_or(BufferError::StaleVertex(v))?;
            fresh.extend([p.x as f32, p.y as f32, p.z as f32]);
        }
        self.positions = fresh;
        self.revision = mesh.revision();
        debug!(vertices = self.vertex_ids.len(), "Refreshed buffer positions");
        Ok(self.vertex_ids.len())
    }

    /// Append a buffer vertex and return its index.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn push_vertex(
        &mut self,
        source: VertexId,
        position: &Point3<f64>,
        uv: [f64; 2],
        normal: &Vector3<f64>,
    ) -> u32 {
        let index = self.vertex_ids.len() as u32;
        self.positions
            .extend([position.x as f32, position.y as f32, position.z as f32]);
        self.uvs.extend([uv[0] as f32, uv[1] as f32]);
        self.normals
            .extend([normal.x as f32, normal.y as f32, normal.z as f32]);
        self.vertex_ids.push(source);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_vertex_buffers() -> RenderBuffers {
        let mut buffers = RenderBuffers::new();
        buffers.push_vertex(VertexId(4), &Point3::new(1.0, 2.0, 3.0), [0.25, 0.5], &Vector3::z());
        buffers.push_vertex(VertexId(4), &Point3::new(1.0, 2.0, 3.0), [0.75, 0.5], &Vector3::y());
        buffers.indices.extend([0, 1, 1]);
        buffers.triangle_faces.push(Some(FaceId(9)));
        buffers
    }

    #[test]
    fn test_render_vertex_layout() {
        assert_eq!(std::mem::size_of::<RenderVertex>(), 32);
        let vertices = two_vertex_buffers().interleaved();
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 64);
        assert_eq!(vertices[1].uv, [0.75, 0.5]);
    }

    #[test]
    fn test_lookup() {
        let buffers = two_vertex_buffers();
        assert_eq!(buffers.vertex_count(), 2);
        assert_eq!(buffers.triangle_count(), 1);
        assert_eq!(buffers.indices_of(VertexId(4)), vec![0, 1]);
        assert_eq!(buffers.source_vertex(1), Some(VertexId(4)));
        assert_eq!(buffers.source_vertex(2), None);
        assert_eq!(buffers.source_face(0), Some(FaceId(9)));
        assert_eq!(buffers.triangle(0), Some([0, 1, 1]));
        assert_eq!(buffers.position(1), Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(buffers.index_bytes().len(), 12);
        assert_eq!(buffers.index_map().get(&VertexId(4)).map(Vec::len), Some(2));
    }

    #[test]
    fn test_group_range() {
        let group = RenderGroup {
            material: 1,
            start: 6,
            count: 12,
        };
        assert_eq!(group.range(), 6..18);
    }
}
