//! Edge loop traversal and loop cutting.
//!
//! A loop is walked as a chain of *rails*: loop edges oriented so that the
//! first endpoints of consecutive rails share a side of the quad between
//! them. Sliding every new vertex from each rail's first endpoint keeps the
//! cut parallel to the ring even where edge directions flip.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use mesh_geometry::lerp;
use mesh_types::{BRepMesh, EdgeId, FaceId, Point3, Selection, VertexId};
use tracing::{debug, info};

use crate::error::{EditError, EditResult};
use crate::params::{LoopCutParams, LoopMode};
use crate::rebuild::{Corner, EdgeSplit, add_polygon, insert_splits, lerp_corner_uv, retire_split_edges};

/// A loop edge oriented along the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rail {
    /// The edge.
    pub edge: EdgeId,
    /// Endpoint the slide factor is measured from.
    pub from: VertexId,
    /// Opposite endpoint.
    pub to: VertexId,
}

/// A quad crossed by the loop, between two consecutive rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopQuad {
    /// The quad.
    pub face: FaceId,
    /// Index of the rail on one side.
    pub left: usize,
    /// Index of the rail on the other side.
    pub right: usize,
}

/// An edge loop found from a start edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLoop {
    /// Rails in loop order.
    pub rails: Vec<Rail>,
    /// Quads crossed, each between two rails.
    pub quads: Vec<LoopQuad>,
    /// Whether the loop returns to its start edge.
    pub closed: bool,
    /// Non-quad faces that stopped a partial loop.
    pub end_faces: Vec<FaceId>,
}

impl EdgeLoop {
    /// Loop edges in order.
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeId> {
        self.rails.iter().map(|r| r.edge).collect()
    }

    /// Number of loop edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rails.len()
    }

    /// Whether the loop has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rails.is_empty()
    }
}

/// Hover feedback for a loop cut: where the new vertices would go.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopPreview {
    /// New vertex positions in loop order.
    pub points: Vec<Point3<f64>>,
    /// Whether the points form a closed ring.
    pub closed: bool,
}

/// Topology created by a confirmed loop cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopCut {
    /// The loop that was cut.
    pub edge_loop: EdgeLoop,
    /// New vertices, one per rail.
    pub new_vertices: Vec<VertexId>,
    /// Halves of the crossed quads.
    pub new_faces: Vec<FaceId>,
    /// Faces that received a vertex without being split.
    pub repaired_faces: Vec<FaceId>,
    /// Edges of the new ring.
    pub ring_edges: Vec<EdgeId>,
}

impl LoopCut {
    /// The new ring as an edge selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection::edges(self.ring_edges.iter().copied())
    }
}

enum Stop {
    Closed,
    Boundary,
    NonQuad(FaceId),
}

/// Find the edge loop through `start`.
///
/// # Errors
///
/// - [`EditError::StaleSelection`] if `start` does not exist
/// - [`EditError::NoLoop`] if no quad touches `start`
/// - [`EditError::NonQuadLoop`] if a strict loop reaches a non-quad face
pub fn find_edge_loop(mesh: &BRepMesh, start: EdgeId, params: &LoopCutParams) -> EditResult<EdgeLoop> {
    let edge = mesh.edge(start).ok_or(EditError::StaleSelection(1))?;
    let origin = Rail {
        edge: start,
        from: edge.v1,
        to: edge.v2,
    };
    let start_faces: Vec<FaceId> = edge.faces().iter().copied().collect();

    let mut visited: BTreeSet<FaceId> = BTreeSet::new();
    let mut walks: Vec<(Vec<(FaceId, Rail)>, Stop)> = Vec::with_capacity(2);
    for &face in start_faces.iter().take(2) {
        if visited.contains(&face) {
            continue;
        }
        let walk = walk(mesh, origin, face, &mut visited);
        let closed = matches!(walk.1, Stop::Closed);
        walks.push(walk);
        if closed {
            break;
        }
    }

    let mut end_faces = Vec::new();
    for (_, stop) in &walks {
        if let Stop::NonQuad(face) = *stop {
            if params.mode == LoopMode::Strict {
                return Err(EditError::NonQuadLoop { face });
            }
            end_faces.push(face);
        }
    }

    let closed = walks.first().is_some_and(|(_, stop)| matches!(stop, Stop::Closed));
    let mut rails = Vec::new();
    let mut quads = Vec::new();

    if closed {
        let steps = walks.swap_remove(0).0;
        rails.push(origin);
        // The last step lands back on the start rail.
        let m = steps.len();
        for (i, &(face, rail)) in steps.iter().enumerate() {
            if i + 1 < m {
                rails.push(rail);
            }
            quads.push(LoopQuad {
                face,
                left: i,
                right: (i + 1) % m,
            });
        }
    } else {
        let backward = walks.get(1).map(|(s, _)| s.as_slice()).unwrap_or_default();
        let forward = walks.first().map(|(s, _)| s.as_slice()).unwrap_or_default();
        rails.extend(backward.iter().rev().map(|&(_, r)| r));
        rails.push(origin);
        rails.extend(forward.iter().map(|&(_, r)| r));
        let k = backward.len();
        for (i, &(face, _)) in backward.iter().enumerate() {
            quads.push(LoopQuad {
                face,
                left: k - i - 1,
                right: k - i,
            });
        }
        for (i, &(face, _)) in forward.iter().enumerate() {
            quads.push(LoopQuad {
                face,
                left: k + i,
                right: k + i + 1,
            });
        }
    }

    if quads.is_empty() {
        return Err(EditError::NoLoop { edge: start });
    }

    debug!(
        start = %start,
        rails = rails.len(),
        quads = quads.len(),
        closed,
        "Found edge loop"
    );

    Ok(EdgeLoop {
        rails,
        quads,
        closed,
        end_faces,
    })
}

/// Walk across quads from `rail` into `face` until the loop closes or ends.
fn walk(mesh: &BRepMesh, origin: Rail, first: FaceId, visited: &mut BTreeSet<FaceId>) -> (Vec<(FaceId, Rail)>, Stop) {
    let mut steps = Vec::new();
    let mut seen_edges: BTreeSet<EdgeId> = BTreeSet::from([origin.edge]);
    let mut rail = origin;
    let mut face_id = first;

    loop {
        let Some(face) = mesh.face(face_id) else {
            return (steps, Stop::Boundary);
        };
        if !face.is_quad() {
            return (steps, Stop::NonQuad(face_id));
        }
        if !visited.insert(face_id) {
            return (steps, Stop::Boundary);
        }
        let Some(next) = opposite_rail(mesh, face_id, rail) else {
            return (steps, Stop::Boundary);
        };
        if next.edge == origin.edge {
            steps.push((face_id, origin));
            return (steps, Stop::Closed);
        }
        if !seen_edges.insert(next.edge) {
            visited.remove(&face_id);
            return (steps, Stop::Boundary);
        }
        steps.push((face_id, next));

        let Some(edge) = mesh.edge(next.edge) else {
            return (steps, Stop::Boundary);
        };
        let Some(&across) = edge.faces().iter().find(|&&f| f != face_id) else {
            return (steps, Stop::Boundary);
        };
        rail = next;
        face_id = across;
    }
}

/// The rail opposite `rail` across a quad, oriented to match it.
fn opposite_rail(mesh: &BRepMesh, face: FaceId, rail: Rail) -> Option<Rail> {
    let face = mesh.face(face)?;
    let ip = face.corner_of(rail.from)?;
    let iq = face.corner_of(rail.to)?;
    let c = face.vertices();
    let (from, to) = if iq == (ip + 1) % 4 {
        (c[(ip + 3) % 4], c[(iq + 1) % 4])
    } else if ip == (iq + 1) % 4 {
        (c[(ip + 1) % 4], c[(iq + 3) % 4])
    } else {
        return None;
    };
    let edge = mesh.edge_between(from, to)?.id;
    Some(Rail { edge, from, to })
}

fn rail_points(mesh: &BRepMesh, edge_loop: &EdgeLoop, t: f64) -> Option<Vec<Point3<f64>>> {
    edge_loop
        .rails
        .iter()
        .map(|r| Some(lerp(&mesh.position(r.from)?, &mesh.position(r.to)?, t)))
        .collect()
}

/// Where a loop cut through `start` would place its vertices, without
/// mutating the mesh.
///
/// # Errors
///
/// Same as [`find_edge_loop`].
pub fn preview_loop_cut(mesh: &BRepMesh, start: EdgeId, params: &LoopCutParams) -> EditResult<LoopPreview> {
    let edge_loop = find_edge_loop(mesh, start, params)?;
    let points = rail_points(mesh, &edge_loop, params.clamped_factor()).ok_or(EditError::StaleSelection(1))?;
    Ok(LoopPreview {
        points,
        closed: edge_loop.closed,
    })
}

/// Cut the edge loop through `start`.
///
/// Every crossed quad is split in two along the new ring, keeping its
/// winding, material and interpolated UVs. Faces at the ends of an open
/// loop get the end vertex inserted into their boundary.
///
/// # Errors
///
/// Same as [`find_edge_loop`]; the mesh is untouched on error.
///
/// # Example
///
/// ```
/// use mesh_edit::{LoopCutParams, loop_cut};
/// use mesh_types::{EdgeId, unit_cube};
///
/// let mut cube = unit_cube();
/// // e8 is a vertical edge; its loop rings the four side faces.
/// let cut = loop_cut(&mut cube, EdgeId(8), &LoopCutParams::default())?;
///
/// assert_eq!(cut.new_vertices.len(), 4);
/// assert_eq!(cube.face_count(), 10);
/// # Ok::<(), mesh_edit::EditError>(())
/// ```
pub fn loop_cut(mesh: &mut BRepMesh, start: EdgeId, params: &LoopCutParams) -> EditResult<LoopCut> {
    let edge_loop = find_edge_loop(mesh, start, params)?;
    let t = params.clamped_factor();
    let points = rail_points(mesh, &edge_loop, t).ok_or(EditError::StaleSelection(1))?;

    // Plan the quad halves before mutating.
    let mut plans = Vec::with_capacity(edge_loop.quads.len());
    for quad in &edge_loop.quads {
        let face = mesh.face(quad.face).ok_or(EditError::StaleSelection(1))?;
        let corner = |v: VertexId| Corner {
            vertex: v,
            uv: face.corner_of(v).and_then(|i| face.uv_at(i)),
        };
        let (a, b) = (edge_loop.rails[quad.left], edge_loop.rails[quad.right]);
        let forward = face.has_directed_side(a.from, a.to);
        plans.push((
            quad.face,
            face.material,
            forward,
            [corner(a.from), corner(a.to), corner(b.from), corner(b.to)],
            (quad.left, quad.right),
        ));
    }

    let new_vertices: Vec<VertexId> = points.iter().map(|&p| mesh.add_vertex(p)).collect();

    let mut new_faces = Vec::with_capacity(plans.len() * 2);
    for (face, material, forward, [pa, qa, pb, qb], (left, right)) in plans {
        let na = Corner {
            vertex: new_vertices[left],
            uv: lerp_corner_uv(&pa, &qa, t),
        };
        let nb = Corner {
            vertex: new_vertices[right],
            uv: lerp_corner_uv(&pb, &qb, t),
        };
        let halves = if forward {
            [[pa, na, nb, pb], [na, qa, qb, nb]]
        } else {
            [[na, pa, pb, nb], [qa, na, nb, qb]]
        };
        mesh.delete_face(face);
        for half in &halves {
            new_faces.extend(add_polygon(mesh, half, material));
        }
    }

    let mut splits = HashMap::with_capacity(edge_loop.rails.len());
    for (rail, &vertex) in edge_loop.rails.iter().zip(&new_vertices) {
        let Some(edge) = mesh.edge(rail.edge) else { continue };
        let t = if edge.v1 == rail.from { t } else { 1.0 - t };
        splits.insert(rail.edge, EdgeSplit { vertex, t });
    }
    let repaired_faces = insert_splits(mesh, &splits, &[]);
    retire_split_edges(mesh, &splits);

    let ring_edges: Vec<EdgeId> = edge_loop
        .quads
        .iter()
        .filter_map(|q| mesh.edge_between(new_vertices[q.left], new_vertices[q.right]))
        .map(|e| e.id)
        .collect();

    info!(
        rails = edge_loop.rails.len(),
        faces = new_faces.len(),
        repaired = repaired_faces.len(),
        closed = edge_loop.closed,
        "Loop cut applied"
    );

    Ok(LoopCut {
        edge_loop,
        new_vertices,
        new_faces,
        repaired_faces,
        ring_edges,
    })
}
