//! Buffer synthesis.
//!
//! Faces are emitted in material order so every material occupies one
//! contiguous index range. Polygons are triangulated in their own plane:
//! up to four corners are fanned, larger ones ear-clipped. The store is
//! only read.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use mesh_geometry::{
    AdjacencyCache, SmoothingGroups, default_normal, face_normal, smoothing_groups, triangulate_polygon,
    vertex_normal,
};
use mesh_types::{BRepMesh, FaceId, Point3, Vector3, VertexId};
use tracing::debug;

use crate::buffers::{RenderBuffers, RenderGroup};
use crate::params::{SynthParams, SynthesisStrategy};

/// Sharing key of a buffer vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CornerKey {
    /// Never shared.
    Corner(FaceId, usize),
    /// Rounded position and UV.
    Position([i64; 3], [i64; 2]),
    /// Topology vertex within a smoothing island.
    Island(VertexId, usize),
}

/// Build render buffers for `mesh`.
///
/// # Example
///
/// ```
/// use mesh_buffers::{SynthParams, synthesize};
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
///
/// let flat = synthesize(&cube, &SynthParams::flat());
/// assert_eq!(flat.vertex_count(), 24);
/// assert_eq!(flat.triangle_count(), 12);
///
/// let shared = synthesize(&cube, &SynthParams::shared());
/// assert_eq!(shared.vertex_count(), 8);
/// ```
#[must_use]
pub fn synthesize(mesh: &BRepMesh, params: &SynthParams) -> RenderBuffers {
    let mut cache = AdjacencyCache::new();
    synthesize_cached(mesh, params, &mut cache)
}

/// Buffer synthesis that keeps face adjacency between calls.
///
/// Smoothed synthesis needs the face adjacency graph and flat face
/// normals. The synthesizer rebuilds them only when the store revision
/// changes, so re-synthesizing an unchanged mesh with another strategy or
/// smoothing angle reuses them. Any mutation, moving a vertex included,
/// bumps the revision and forces a rebuild.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    params: SynthParams,
    cache: AdjacencyCache,
}

impl Synthesizer {
    /// Create a synthesizer with the given parameters.
    #[must_use]
    pub fn new(params: SynthParams) -> Self {
        Self {
            params,
            cache: AdjacencyCache::new(),
        }
    }

    /// Current parameters.
    #[must_use]
    pub const fn params(&self) -> &SynthParams {
        &self.params
    }

    /// Replace the parameters. The adjacency cache is kept.
    pub fn set_params(&mut self, params: SynthParams) {
        self.params = params;
    }

    /// Build render buffers for `mesh`.
    pub fn synthesize(&mut self, mesh: &BRepMesh) -> RenderBuffers {
        synthesize_cached(mesh, &self.params, &mut self.cache)
    }

    /// How many times face adjacency has been built.
    #[must_use]
    pub const fn adjacency_builds(&self) -> usize {
        self.cache.builds()
    }
}

fn synthesize_cached(mesh: &BRepMesh, params: &SynthParams, cache: &mut AdjacencyCache) -> RenderBuffers {
    let groups = match params.strategy {
        SynthesisStrategy::Smoothed { angle } => Some(smoothing_groups(mesh, cache.get(mesh), angle)),
        SynthesisStrategy::DuplicatedPerFace | SynthesisStrategy::SharedByPosition => None,
    };

    let mut by_material: BTreeMap<u32, Vec<FaceId>> = BTreeMap::new();
    for face in mesh.faces() {
        by_material.entry(face.material).or_default().push(face.id);
    }
    let points: Vec<VertexId> = if groups.is_some() {
        mesh.vertices().filter(|v| v.faces().is_empty()).map(|v| v.id).collect()
    } else {
        Vec::new()
    };
    if !points.is_empty() {
        by_material.entry(0).or_default();
    }

    let mut out = RenderBuffers {
        revision: mesh.revision(),
        strategy: Some(params.strategy),
        ..RenderBuffers::default()
    };
    let mut shared: HashMap<CornerKey, u32> = HashMap::new();
    let mut first_index: HashMap<VertexId, u32> = HashMap::new();
    let mut vertex_normals: HashMap<VertexId, Vector3<f64>> = HashMap::new();

    for (&material, faces) in &by_material {
        let start = out.indices.len();
        for &f in faces {
            let Some(face) = mesh.face(f) else { continue };
            let Some(positions) = mesh.face_positions(f) else { continue };
            let flat = face_normal(mesh, f).unwrap_or_else(default_normal);

            let mut corner_indices = Vec::with_capacity(face.len());
            for (i, &v) in face.vertices().iter().enumerate() {
                let uv = face.uv_at(i).map_or([0.0, 0.0], |uv| [uv.x, uv.y]);
                let (key, normal) = match (params.strategy, &groups) {
                    (SynthesisStrategy::Smoothed { .. }, Some(groups)) => island_corner(groups, f, i, v, flat),
                    (SynthesisStrategy::SharedByPosition, _) => {
                        let normal = *vertex_normals
                            .entry(v)
                            .or_insert_with(|| vertex_normal(mesh, v).unwrap_or_else(default_normal));
                        (position_key(&positions[i], uv, params.position_precision), normal)
                    }
                    _ => (CornerKey::Corner(f, i), flat),
                };
                let index = *shared
                    .entry(key)
                    .or_insert_with(|| out.push_vertex(v, &positions[i], uv, &normal));
                first_index.entry(v).or_insert(index);
                corner_indices.push(index);
            }

            for [a, b, c] in triangulate_polygon(&positions, params.collinear_epsilon) {
                out.indices
                    .extend([corner_indices[a], corner_indices[b], corner_indices[c]]);
                out.triangle_faces.push(Some(f));
            }
        }

        if material == 0 {
            for &v in &points {
                let Some(position) = mesh.position(v) else { continue };
                let index = out.push_vertex(v, &position, [0.0, 0.0], &default_normal());
                first_index.entry(v).or_insert(index);
                out.indices.extend([index, index, index]);
                out.triangle_faces.push(None);
            }
        }

        let count = out.indices.len() - start;
        if count > 0 {
            out.groups.push(RenderGroup { material, start, count });
        }
    }

    for edge in mesh.edges() {
        if let (Some(&a), Some(&b)) = (first_index.get(&edge.v1), first_index.get(&edge.v2)) {
            out.line_indices.extend([a, b]);
            out.line_edges.push(edge.id);
        }
    }

    debug!(
        strategy = ?params.strategy,
        vertices = out.vertex_count(),
        triangles = out.triangle_count(),
        groups = out.groups.len(),
        points = points.len(),
        "Synthesized render buffers"
    );
    out
}

fn island_corner(
    groups: &SmoothingGroups,
    face: FaceId,
    corner: usize,
    vertex: VertexId,
    flat: Vector3<f64>,
) -> (CornerKey, Vector3<f64>) {
    match groups.island_of(face) {
        Some(island) => (
            CornerKey::Island(vertex, island),
            groups.normal(vertex, island).unwrap_or(flat),
        ),
        None => (CornerKey::Corner(face, corner), flat),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn position_key(p: &Point3<f64>, uv: [f64; 2], precision: f64) -> CornerKey {
    let step = if precision > 0.0 { precision } else { f64::EPSILON };
    let q = |x: f64| (x / step).round() as i64;
    CornerKey::Position([q(p.x), q(p.y), q(p.z)], [q(uv[0]), q(uv[1])])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Point2, from_polygons, unit_cube, unit_quad};

    fn normal_at(buffers: &RenderBuffers, index: u32) -> Vector3<f64> {
        let i = index as usize * 3;
        let n = &buffers.normals[i..i + 3];
        Vector3::new(f64::from(n[0]), f64::from(n[1]), f64::from(n[2]))
    }

    #[test]
    fn flat_cube_duplicates_corners() {
        let cube = unit_cube();
        let buffers = synthesize(&cube, &SynthParams::flat());
        assert_eq!(buffers.vertex_count(), 24);
        assert_eq!(buffers.triangle_count(), 12);
        assert_eq!(buffers.groups.len(), 1);
        assert_eq!(buffers.groups[0].count, 36);
        assert_eq!(buffers.line_edges.len(), 12);
        for v in cube.vertex_ids() {
            assert_eq!(buffers.indices_of(v).len(), 3);
        }
        // Every triangle of the top face carries +Z.
        let top = cube.face_ids()[1];
        for t in 0..buffers.triangle_count() {
            if buffers.source_face(t) == Some(top) {
                for i in buffers.triangle(t).unwrap_or_default() {
                    assert_relative_eq!(normal_at(&buffers, i), Vector3::z(), epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn shared_cube_collapses_positions() {
        let cube = unit_cube();
        let buffers = synthesize(&cube, &SynthParams::shared());
        assert_eq!(buffers.vertex_count(), 8);
        assert_eq!(buffers.triangle_count(), 12);
        let corner = buffers.indices_of(cube.vertex_ids()[6]);
        assert_eq!(corner.len(), 1);
        let n = normal_at(&buffers, corner[0]);
        assert_relative_eq!(n, Vector3::new(1.0, 1.0, 1.0).normalize(), epsilon = 1e-6);
    }

    #[test]
    fn shared_keeps_uv_seams() {
        let mut quad = unit_quad();
        let v = quad.vertex_ids();
        let p = |x: f64| Point2::new(x, 0.0);
        // A second quad on the same corners with different UVs.
        quad.delete_face(quad.face_ids()[0]);
        let _ = quad.add_face(&v, Some(vec![p(0.0), p(0.1), p(0.2), p(0.3)]), 0);
        let extra = [
            quad.add_vertex(Point3::new(2.0, 0.0, 0.0)),
            quad.add_vertex(Point3::new(2.0, 1.0, 0.0)),
        ];
        let _ = quad.add_face(&[v[1], extra[0], extra[1], v[2]], Some(vec![p(0.9), p(1.0), p(1.0), p(0.9)]), 0);

        let buffers = synthesize(&quad, &SynthParams::shared());
        // v1 and v2 carry different UVs on the two faces.
        assert_eq!(buffers.vertex_count(), 8);
        assert_eq!(buffers.indices_of(v[1]).len(), 2);
    }

    #[test]
    fn smoothed_splits_hard_edges() {
        let cube = unit_cube();
        let hard = synthesize(&cube, &SynthParams::smooth(30f64.to_radians()));
        assert_eq!(hard.vertex_count(), 24);
        let smooth = synthesize(&cube, &SynthParams::smooth(100f64.to_radians()));
        assert_eq!(smooth.vertex_count(), 8);
    }

    #[test]
    fn isolated_vertices_become_points() {
        let mut quad = unit_quad();
        let lone = quad.add_vertex(Point3::new(5.0, 5.0, 5.0));
        let buffers = synthesize(&quad, &SynthParams::default());
        assert_eq!(buffers.vertex_count(), 5);
        assert_eq!(buffers.triangle_count(), 3);
        let last = buffers.triangle_count() - 1;
        assert_eq!(buffers.source_face(last), None);
        let [a, b, c] = buffers.triangle(last).unwrap_or_default();
        assert!(a == b && b == c);
        assert_eq!(buffers.source_vertex(a), Some(lone));

        // Other strategies draw faces only.
        assert_eq!(synthesize(&quad, &SynthParams::flat()).vertex_count(), 4);
    }

    #[test]
    fn materials_are_contiguous() {
        let mut mesh = from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
            ],
            &[vec![0, 1, 2], vec![1, 4, 5, 2], vec![0, 2, 3]],
        );
        let faces = mesh.face_ids();
        assert!(mesh.set_material(faces[0], 2));
        assert!(mesh.set_material(faces[2], 2));

        let buffers = synthesize(&mesh, &SynthParams::flat());
        let materials: Vec<u32> = buffers.groups.iter().map(|g| g.material).collect();
        assert_eq!(materials, vec![0, 2]);
        assert_eq!(buffers.groups[0].range(), 0..6);
        assert_eq!(buffers.groups[1].range(), 6..12);
        for t in 2..4 {
            assert!(buffers.source_face(t).is_some_and(|f| f == faces[0] || f == faces[2]));
        }
    }

    #[test]
    fn large_polygons_are_ear_clipped() {
        // Concave L-shaped hexagon.
        let mesh = from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            &[vec![0, 1, 2, 3, 4, 5]],
        );
        let buffers = synthesize(&mesh, &SynthParams::flat());
        assert_eq!(buffers.triangle_count(), 4);

        // Total triangle area equals the polygon area.
        let area: f64 = (0..buffers.triangle_count())
            .filter_map(|t| buffers.triangle(t))
            .map(|[a, b, c]| {
                let (Some(a), Some(b), Some(c)) = (buffers.position(a), buffers.position(b), buffers.position(c))
                else {
                    return 0.0;
                };
                (b - a).cross(&(c - a)).z * 0.5
            })
            .sum();
        assert_relative_eq!(area, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn synthesis_does_not_mutate() {
        let cube = unit_cube();
        let before = cube.snapshot();
        let revision = cube.revision();
        let _ = synthesize(&cube, &SynthParams::default());
        assert_eq!(cube.revision(), revision);
        assert_eq!(cube.snapshot(), before);
    }

    #[test]
    fn synthesizer_reuses_adjacency() {
        let mut cube = unit_cube();
        let mut synth = Synthesizer::new(SynthParams::smooth(0.5));
        let _ = synth.synthesize(&cube);
        synth.set_params(SynthParams::smooth(2.0));
        let _ = synth.synthesize(&cube);
        assert_eq!(synth.adjacency_builds(), 1);

        cube.delete_face(cube.face_ids()[0]);
        let _ = synth.synthesize(&cube);
        assert_eq!(synth.adjacency_builds(), 2);
    }

    #[test]
    fn moving_a_vertex_rebuilds_adjacency() {
        let mut cube = unit_cube();
        let mut synth = Synthesizer::new(SynthParams::smooth(0.5));
        let _ = synth.synthesize(&cube);

        // Cached face normals depend on positions.
        let top = cube.vertex_ids()[6];
        assert_eq!(cube.translate_vertices(&[top], Vector3::new(0.0, 0.0, 0.5)), 1);
        let moved = synth.synthesize(&cube);
        assert_eq!(synth.adjacency_builds(), 2);
        assert!(!moved.is_stale(&cube));
    }
}
