//! Picking against synthesized buffers.
//!
//! Queries are read-only and answer with topology ids, so the result can be
//! fed straight into a [`Selection`](mesh_types::Selection).

use mesh_geometry::{KnifeView, Ray};
use mesh_types::{EdgeId, FaceId, Point2, Point3, SelectionMode, VertexId};

use crate::buffers::RenderBuffers;
use crate::params::PickParams;

/// A picked vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPick {
    /// Topology vertex.
    pub vertex: VertexId,
    /// Buffer vertex that was hit.
    pub index: u32,
    /// Distance between the ray and the vertex.
    pub distance: f64,
    /// Distance along the ray.
    pub depth: f64,
}

/// A picked edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePick {
    /// Topology edge.
    pub edge: EdgeId,
    /// Parameter of the closest point, 0 at the edge's first vertex.
    pub t: f64,
    /// Distance between the ray and the edge.
    pub distance: f64,
    /// Distance along the ray.
    pub depth: f64,
}

/// A picked face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePick {
    /// Topology face.
    pub face: FaceId,
    /// Triangle that was hit.
    pub triangle: usize,
    /// Distance along the ray.
    pub depth: f64,
    /// Hit position.
    pub point: Point3<f64>,
}

/// Result of a mode-driven pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick {
    /// A vertex.
    Vertex(VertexPick),
    /// An edge.
    Edge(EdgePick),
    /// A face.
    Face(FacePick),
}

/// Closest vertex within `params.tolerance` of the ray.
///
/// Among vertices within tolerance the one nearest the ray wins; equal
/// distances prefer the one closer to the ray origin.
#[must_use]
pub fn pick_vertex(buffers: &RenderBuffers, ray: &Ray, params: &PickParams) -> Option<VertexPick> {
    let mut best: Option<VertexPick> = None;
    for (i, &vertex) in buffers.vertex_ids.iter().enumerate() {
        let Ok(index) = u32::try_from(i) else { break };
        let Some(p) = buffers.position(index) else { continue };
        let (depth, distance) = ray.distance_to_point(&p);
        if distance > params.tolerance {
            continue;
        }
        if best.is_none_or(|b| closer(distance, depth, b.distance, b.depth)) {
            best = Some(VertexPick {
                vertex,
                index,
                distance,
                depth,
            });
        }
    }
    best
}

/// Closest edge within `params.tolerance` of the ray.
///
/// Edges come from the wireframe lines, so only edges that were
/// synthesized can be picked.
#[must_use]
pub fn pick_edge(buffers: &RenderBuffers, ray: &Ray, params: &PickParams) -> Option<EdgePick> {
    let mut best: Option<EdgePick> = None;
    for (line, &edge) in buffers.line_indices.chunks_exact(2).zip(&buffers.line_edges) {
        let (Some(a), Some(b)) = (buffers.position(line[0]), buffers.position(line[1])) else {
            continue;
        };
        let (depth, t, distance) = ray.closest_to_segment(&a, &b);
        if distance > params.tolerance {
            continue;
        }
        if best.is_none_or(|e| closer(distance, depth, e.distance, e.depth)) {
            best = Some(EdgePick {
                edge,
                t,
                distance,
                depth,
            });
        }
    }
    best
}

/// Nearest face hit by the ray.
#[must_use]
pub fn pick_face(buffers: &RenderBuffers, ray: &Ray) -> Option<FacePick> {
    let mut best: Option<FacePick> = None;
    for triangle in 0..buffers.triangle_count() {
        let Some(face) = buffers.source_face(triangle) else { continue };
        let Some([a, b, c]) = buffers.triangle(triangle) else { continue };
        let (Some(a), Some(b), Some(c)) = (buffers.position(a), buffers.position(b), buffers.position(c)) else {
            continue;
        };
        let Some(depth) = ray.intersect_triangle(&a, &b, &c) else { continue };
        if best.is_none_or(|f| depth < f.depth) {
            best = Some(FacePick {
                face,
                triangle,
                depth,
                point: ray.at(depth),
            });
        }
    }
    best
}

/// Pick the element kind that `mode` selects.
///
/// # Example
///
/// ```
/// use mesh_buffers::{Pick, PickParams, SynthParams, pick, synthesize};
/// use mesh_geometry::Ray;
/// use mesh_types::{Point3, SelectionMode, Vector3, unit_cube};
///
/// let cube = unit_cube();
/// let buffers = synthesize(&cube, &SynthParams::flat());
/// let Some(ray) = Ray::new(Point3::new(0.5, 0.5, 3.0), -Vector3::z()) else { return };
///
/// let hit = pick(&buffers, &ray, SelectionMode::Face, &PickParams::default());
/// assert!(matches!(hit, Some(Pick::Face(f)) if f.face == cube.face_ids()[1]));
/// ```
#[must_use]
pub fn pick(buffers: &RenderBuffers, ray: &Ray, mode: SelectionMode, params: &PickParams) -> Option<Pick> {
    match mode {
        SelectionMode::Vertex => pick_vertex(buffers, ray, params).map(Pick::Vertex),
        SelectionMode::Edge => pick_edge(buffers, ray, params).map(Pick::Edge),
        SelectionMode::Face => pick_face(buffers, ray).map(Pick::Face),
    }
}

/// Pick at a screen point given in normalized device coordinates.
#[must_use]
pub fn pick_screen(
    buffers: &RenderBuffers,
    view: &KnifeView,
    ndc: &Point2<f64>,
    mode: SelectionMode,
    params: &PickParams,
) -> Option<Pick> {
    let ray = view.ray_through(ndc)?;
    pick(buffers, &ray, mode, params)
}

fn closer(distance: f64, depth: f64, best_distance: f64, best_depth: f64) -> bool {
    distance < best_distance || (distance == best_distance && depth < best_depth)
}
