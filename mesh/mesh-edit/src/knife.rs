//! Knife cutting along screen-space strokes.
//!
//! Each stroke segment is planned against the current mesh first (plane
//! crossings, snapping, affected faces) and only then applied, so a
//! segment that cuts nothing leaves the mesh untouched. A multi-point
//! stroke applies its segments one after another, each against the mesh
//! the previous one left behind.

use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};
use mesh_geometry::{GeometryError, KnifeParams, KnifeView, knife_intersections};
use mesh_types::{BRepMesh, EdgeId, FaceId, Point3, VertexId};
use tracing::{debug, info};

use crate::error::{EditError, EditResult};
use crate::rebuild::{Corner, EdgeSplit, augmented_corners, replace_face, retire_split_edges};

/// One point of a knife stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutPoint {
    /// A free position, usually a ray hit on the surface.
    Free(Point3<f64>),
    /// An existing vertex the cursor snapped to.
    Snap(VertexId),
}

impl CutPoint {
    fn resolve(self, mesh: &BRepMesh) -> Option<Point3<f64>> {
        match self {
            Self::Free(p) => Some(p),
            Self::Snap(v) => mesh.position(v),
        }
    }
}

/// Topology created by a knife cut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnifeCut {
    /// Vertices created on crossed edges.
    pub new_vertices: Vec<VertexId>,
    /// Faces created by splitting or repairing.
    pub new_faces: Vec<FaceId>,
    /// Edges along the cut path.
    pub cut_edges: Vec<EdgeId>,
    /// Crossed edges that were replaced by their halves.
    pub split_edges: Vec<EdgeId>,
}

impl KnifeCut {
    fn absorb(&mut self, other: Self) {
        self.new_vertices.extend(other.new_vertices);
        self.new_faces.extend(other.new_faces);
        self.cut_edges.extend(other.cut_edges);
        self.split_edges.extend(other.split_edges);
    }

    /// Whether the cut changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_vertices.is_empty() && self.new_faces.is_empty()
    }
}

/// A cut vertex along the segment: either a new split or an existing one.
#[derive(Debug, Clone, Copy)]
enum Stop {
    Existing(VertexId),
    Split { edge: EdgeId, t: f64, point: Point3<f64> },
}

/// Cut the mesh along the segment `a`–`b` as seen through `view`.
///
/// Every visible edge the cutting plane crosses inside the segment's screen
/// extent gets a new vertex; crossings within `dedupe_epsilon` of an edge
/// endpoint snap to that endpoint. Each face holding two cut vertices is
/// split in two between them, and each face holding one gets the vertex
/// inserted into its boundary.
///
/// # Errors
///
/// - [`EditError::StaleSelection`] if a snap vertex does not exist
/// - [`EditError::DegenerateCutPlane`] if the segment has no screen extent
/// - [`EditError::NoIntersections`] if nothing would change
///
/// # Example
///
/// ```
/// use mesh_edit::{CutPoint, KnifeParams, KnifeView, knife_cut};
/// use mesh_types::{Point3, Vector3, unit_quad};
///
/// let mut quad = unit_quad();
/// let view = KnifeView::orthographic(
///     Point3::new(0.5, 0.5, 5.0),
///     Point3::new(0.5, 0.5, 0.0),
///     Vector3::y(),
///     2.0,
///     1.0,
/// );
/// let cut = knife_cut(
///     &mut quad,
///     CutPoint::Free(Point3::new(-0.5, 0.5, 0.0)),
///     CutPoint::Free(Point3::new(1.5, 0.5, 0.0)),
///     &view,
///     &KnifeParams::default(),
/// )?;
///
/// assert_eq!(cut.new_vertices.len(), 2);
/// assert_eq!(quad.face_count(), 2);
/// # Ok::<(), mesh_edit::EditError>(())
/// ```
pub fn knife_cut(
    mesh: &mut BRepMesh,
    a: CutPoint,
    b: CutPoint,
    view: &KnifeView,
    params: &KnifeParams,
) -> EditResult<KnifeCut> {
    let stops = plan_segment(mesh, a, b, view, params)?;
    let cut = apply_segment(mesh, &stops).ok_or(EditError::NoIntersections)?;
    info!(
        vertices = cut.new_vertices.len(),
        faces = cut.new_faces.len(),
        "Knife cut applied"
    );
    Ok(cut)
}

/// Cut along a polyline of stroke points, one segment at a time.
///
/// Segments that cross nothing are skipped.
///
/// # Errors
///
/// - [`EditError::EmptySelection`] for fewer than two points
/// - [`EditError::StaleSelection`] if a snap vertex does not exist
/// - [`EditError::NoIntersections`] if no segment changed the mesh
pub fn knife_stroke(
    mesh: &mut BRepMesh,
    points: &[CutPoint],
    view: &KnifeView,
    params: &KnifeParams,
) -> EditResult<KnifeCut> {
    if points.len() < 2 {
        return Err(EditError::EmptySelection);
    }
    let stale = points.iter().filter(|p| p.resolve(mesh).is_none()).count();
    if stale > 0 {
        return Err(EditError::StaleSelection(stale));
    }

    let mut total = KnifeCut::default();
    for pair in points.windows(2) {
        let stops = match plan_segment(mesh, pair[0], pair[1], view, params) {
            Ok(stops) => stops,
            Err(EditError::NoIntersections | EditError::DegenerateCutPlane) => continue,
            Err(err) => return Err(err),
        };
        if let Some(cut) = apply_segment(mesh, &stops) {
            total.absorb(cut);
        }
    }

    if total.is_empty() {
        return Err(EditError::NoIntersections);
    }
    // Later segments may have rebuilt faces created by earlier ones.
    total.new_faces.retain(|&f| mesh.contains_face(f));
    total.cut_edges.retain(|&e| mesh.contains_edge(e));
    info!(
        segments = points.len() - 1,
        vertices = total.new_vertices.len(),
        faces = total.new_faces.len(),
        "Knife stroke applied"
    );
    Ok(total)
}

/// Ordered cut vertices of one segment, without touching the mesh.
fn plan_segment(
    mesh: &BRepMesh,
    a: CutPoint,
    b: CutPoint,
    view: &KnifeView,
    params: &KnifeParams,
) -> EditResult<Vec<Stop>> {
    let (Some(pa), Some(pb)) = (a.resolve(mesh), b.resolve(mesh)) else {
        let stale = [a, b].iter().filter(|p| p.resolve(mesh).is_none()).count();
        return Err(EditError::StaleSelection(stale));
    };

    // Edges at a snapped endpoint would only report the endpoint again.
    let mut skip: HashSet<EdgeId> = HashSet::new();
    for point in [a, b] {
        if let CutPoint::Snap(v) = point {
            if let Some(vertex) = mesh.vertex(v) {
                skip.extend(vertex.edges().iter().copied());
            }
        }
    }

    let hits = knife_intersections(mesh, &pa, &pb, view, &skip, params).map_err(|err| match err {
        GeometryError::DegenerateCutPlane => EditError::DegenerateCutPlane,
        _ => EditError::NoIntersections,
    })?;

    let mut stops = Vec::with_capacity(hits.len() + 2);
    if let CutPoint::Snap(v) = a {
        stops.push(Stop::Existing(v));
    }
    for hit in hits {
        let Some(edge) = mesh.edge(hit.edge) else { continue };
        let ends = [edge.v1, edge.v2];
        let snapped = ends.into_iter().find(|&v| {
            mesh.position(v)
                .is_some_and(|p| (p - hit.point).norm() < params.dedupe_epsilon)
        });
        stops.push(match snapped {
            Some(v) => Stop::Existing(v),
            None => Stop::Split {
                edge: hit.edge,
                t: hit.t,
                point: hit.point,
            },
        });
    }
    if let CutPoint::Snap(v) = b {
        stops.push(Stop::Existing(v));
    }

    // A vertex reached through two edges appears once.
    let mut seen = BTreeSet::new();
    stops.retain(|stop| match *stop {
        Stop::Existing(v) => seen.insert(v),
        Stop::Split { .. } => true,
    });

    let splits = stops.iter().filter(|s| matches!(s, Stop::Split { .. })).count();
    if splits == 0 && stops.len() < 2 {
        return Err(EditError::NoIntersections);
    }
    debug!(stops = stops.len(), splits, "Planned knife segment");
    Ok(stops)
}

/// Apply a planned segment. Returns `None` if no face changed.
fn apply_segment(mesh: &mut BRepMesh, stops: &[Stop]) -> Option<KnifeCut> {
    let mut splits: HashMap<EdgeId, EdgeSplit> = HashMap::new();
    let mut order: Vec<VertexId> = Vec::with_capacity(stops.len());
    let mut new_vertices = Vec::new();
    for stop in stops {
        match *stop {
            Stop::Existing(v) => order.push(v),
            Stop::Split { edge, t, point } => {
                let vertex = mesh.add_vertex(point);
                splits.insert(edge, EdgeSplit { vertex, t });
                new_vertices.push(vertex);
                order.push(vertex);
            }
        }
    }

    let existing: BTreeSet<VertexId> = stops
        .iter()
        .filter_map(|s| match s {
            Stop::Existing(v) => Some(*v),
            Stop::Split { .. } => None,
        })
        .collect();
    let mut affected: BTreeSet<FaceId> = splits
        .keys()
        .filter_map(|&e| mesh.edge(e))
        .flat_map(|e| e.faces().iter().copied())
        .collect();
    affected.extend(
        mesh.faces()
            .filter(|f| f.vertices().iter().filter(|v| existing.contains(v)).count() >= 2)
            .map(|f| f.id),
    );

    let rank: HashMap<VertexId, usize> = order.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut new_faces = Vec::new();
    for f in affected {
        let Some(face) = mesh.face(f) else { continue };
        let cycle = augmented_corners(mesh, face, &splits);
        let polygons = match split_positions(&cycle, &rank) {
            Some((i, j)) => {
                let first: Vec<Corner> = cycle[i..=j].to_vec();
                let second: Vec<Corner> = cycle[j..].iter().chain(&cycle[..=i]).copied().collect();
                vec![first, second]
            }
            None if cycle.len() > face.len() => vec![cycle],
            None => continue,
        };
        new_faces.extend(replace_face(mesh, f, &polygons));
    }

    retire_split_edges(mesh, &splits);
    for &vertex in &new_vertices {
        mesh.delete_vertex_if_isolated(vertex);
    }
    new_vertices.retain(|&v| mesh.contains_vertex(v));

    if new_faces.is_empty() && new_vertices.is_empty() {
        return None;
    }

    let cut_edges: Vec<EdgeId> = order
        .windows(2)
        .filter_map(|w| mesh.edge_between(w[0], w[1]))
        .map(|e| e.id)
        .collect();
    let mut split_edges: Vec<EdgeId> = splits.keys().copied().collect();
    split_edges.sort_unstable();

    debug!(
        vertices = new_vertices.len(),
        faces = new_faces.len(),
        edges = cut_edges.len(),
        "Applied knife segment"
    );
    Some(KnifeCut {
        new_vertices,
        new_faces,
        cut_edges,
        split_edges,
    })
}

/// Cycle positions to split a face between, `i < j`.
///
/// Picks the first pair of cut vertices that are consecutive along the
/// stroke, both on this face and not already neighbors on its boundary.
fn split_positions(cycle: &[Corner], rank: &HashMap<VertexId, usize>) -> Option<(usize, usize)> {
    let n = cycle.len();
    let mut on_face: Vec<(usize, usize)> = cycle
        .iter()
        .enumerate()
        .filter_map(|(pos, c)| rank.get(&c.vertex).map(|&r| (r, pos)))
        .collect();
    on_face.sort_unstable();
    on_face.windows(2).find_map(|w| {
        let (i, j) = (w[0].1.min(w[1].1), w[0].1.max(w[1].1));
        let gap = j - i;
        (gap >= 2 && n - gap >= 2).then_some((i, j))
    })
}
