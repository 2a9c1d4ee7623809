//! Extrusion: duplicate a region and stitch its boundary to the copy.
//!
//! Setup happens once per gesture and is offset-agnostic: duplicates start
//! at their originals' positions. The caller moves them with
//! [`Extrusion::apply_offset`] as the drag progresses.

use std::collections::{BTreeMap, BTreeSet};

use mesh_geometry::average_normal;
use mesh_types::{BRepMesh, EdgeId, FaceId, Point3, Selection, SelectionMode, Vector3, VertexId};
use tracing::{debug, info};

use crate::error::{EditError, EditResult};
use crate::rebuild::{Corner, add_polygon, corners};
use crate::selection::{live_edges, live_faces, live_vertices};

/// Topology created by one extrusion.
#[derive(Debug, Clone, PartialEq)]
pub struct Extrusion {
    /// Mode of the extruded selection.
    pub mode: SelectionMode,
    /// Original vertex to its duplicate.
    pub vertex_map: BTreeMap<VertexId, VertexId>,
    /// Quads stitching the region boundary to the copy.
    pub side_faces: Vec<FaceId>,
    /// Copies of the selected faces (face mode).
    pub cap_faces: Vec<FaceId>,
    /// Reversed originals closing an open sheet (face mode).
    pub bottom_faces: Vec<FaceId>,
    /// Originals removed because the region was embedded in a surface.
    pub removed_faces: Vec<FaceId>,
    /// Edges from lone selected vertices to their duplicates.
    pub connector_edges: Vec<EdgeId>,
    base_positions: Vec<(VertexId, Point3<f64>)>,
}

impl Extrusion {
    /// Duplicate vertex ids, in ascending order of their originals.
    #[must_use]
    pub fn duplicates(&self) -> Vec<VertexId> {
        self.vertex_map.values().copied().collect()
    }

    /// Place every duplicate at its original position plus `offset`.
    ///
    /// The offset is absolute, so repeated calls during a drag do not
    /// accumulate. Returns the number of vertices moved.
    pub fn apply_offset(&self, mesh: &mut BRepMesh, offset: Vector3<f64>) -> usize {
        self.base_positions
            .iter()
            .filter(|&&(dup, base)| mesh.set_position(dup, base + offset))
            .count()
    }

    /// Selection of the extruded copy, ready for the next operation.
    #[must_use]
    pub fn selection(&self, mesh: &BRepMesh) -> Selection {
        match self.mode {
            SelectionMode::Face => Selection::faces(self.cap_faces.iter().copied()),
            SelectionMode::Edge => {
                let dups: BTreeSet<VertexId> = self.vertex_map.values().copied().collect();
                Selection::edges(
                    mesh.edges()
                        .filter(|e| dups.contains(&e.v1) && dups.contains(&e.v2))
                        .map(|e| e.id),
                )
            }
            SelectionMode::Vertex => Selection::vertices_of(self.vertex_map.values().copied()),
        }
    }

    /// Average normal of the cap faces, the natural drag direction for a
    /// face extrusion.
    #[must_use]
    pub fn average_normal(&self, mesh: &BRepMesh) -> Vector3<f64> {
        average_normal(mesh, self.cap_faces.iter().copied())
    }
}

/// Extrude a face, edge or vertex selection.
///
/// - **Faces**: every face gets a copy on duplicated vertices, and every
///   region boundary edge (used by exactly one selected face) gets a side
///   quad `[a, b, b', a']` wound like the face. An open sheet keeps its
///   originals, reversed, as a bottom cap; a region embedded in a larger
///   surface has its originals removed.
/// - **Edges**: every selected edge gets a side quad wound against the face
///   already using it.
/// - **Vertices**: edges joining two selected vertices extrude as in edge
///   mode, other selected vertices get a connector edge to their copy.
///
/// # Errors
///
/// Returns [`EditError::EmptySelection`] or [`EditError::StaleSelection`]
/// when nothing live is selected.
///
/// # Example
///
/// ```
/// use mesh_edit::extrude;
/// use mesh_types::{Selection, Vector3, unit_quad};
///
/// let mut mesh = unit_quad();
/// let face = mesh.face_ids()[0];
/// let extrusion = extrude(&mut mesh, &Selection::faces([face]))?;
/// extrusion.apply_offset(&mut mesh, Vector3::z());
///
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.face_count(), 6);
/// # Ok::<(), mesh_edit::EditError>(())
/// ```
pub fn extrude(mesh: &mut BRepMesh, selection: &Selection) -> EditResult<Extrusion> {
    let extrusion = match selection.mode() {
        SelectionMode::Face => {
            let faces = live_faces(mesh, selection, "extrude")?;
            extrude_faces(mesh, &faces)
        }
        SelectionMode::Edge => {
            let edges = live_edges(mesh, selection, "extrude")?;
            extrude_edges(mesh, &edges, &[], SelectionMode::Edge)
        }
        SelectionMode::Vertex => {
            let vertices = live_vertices(mesh, selection, "extrude")?;
            let chosen: BTreeSet<VertexId> = vertices.iter().copied().collect();
            let edges: Vec<EdgeId> = mesh
                .edges()
                .filter(|e| chosen.contains(&e.v1) && chosen.contains(&e.v2))
                .map(|e| e.id)
                .collect();
            extrude_edges(mesh, &edges, &vertices, SelectionMode::Vertex)
        }
    }
    .ok_or(EditError::DegenerateFace)?;

    info!(
        mode = ?extrusion.mode,
        duplicated = extrusion.vertex_map.len(),
        sides = extrusion.side_faces.len(),
        "Extruded selection"
    );
    Ok(extrusion)
}

/// Duplicate `vertices` in place, returning the map and base positions.
fn duplicate_vertices(
    mesh: &mut BRepMesh,
    vertices: impl IntoIterator<Item = VertexId>,
) -> (BTreeMap<VertexId, VertexId>, Vec<(VertexId, Point3<f64>)>) {
    let mut map = BTreeMap::new();
    let mut bases = Vec::new();
    for v in vertices {
        if map.contains_key(&v) {
            continue;
        }
        let Some(p) = mesh.position(v) else { continue };
        let dup = mesh.add_vertex(p);
        map.insert(v, dup);
        bases.push((dup, p));
    }
    (map, bases)
}

fn extrude_faces(mesh: &mut BRepMesh, faces: &[FaceId]) -> Option<Extrusion> {
    let selected: BTreeSet<FaceId> = faces.iter().copied().collect();

    // Plan everything before the first mutation.
    let mut originals = Vec::with_capacity(faces.len());
    let mut boundary: Vec<(VertexId, VertexId)> = Vec::new();
    let mut embedded = false;
    let mut region_edges: BTreeSet<EdgeId> = BTreeSet::new();
    for &f in faces {
        let face = mesh.face(f)?;
        let n = face.len();
        for (i, &e) in face.edges().iter().enumerate() {
            let edge = mesh.edge(e)?;
            region_edges.insert(e);
            let selected_uses = edge.faces().iter().filter(|x| selected.contains(x)).count();
            if selected_uses == 1 {
                boundary.push((face.vertices()[i], face.vertices()[(i + 1) % n]));
                if edge.faces().len() > 1 {
                    embedded = true;
                }
            }
        }
        originals.push((f, corners(face), face.material));
    }

    let region_vertices: BTreeSet<VertexId> = originals
        .iter()
        .flat_map(|(_, c, _)| c.iter().map(|c| c.vertex))
        .collect();
    let (vertex_map, base_positions) = duplicate_vertices(mesh, region_vertices.iter().copied());
    let dup = |v: VertexId| vertex_map.get(&v).copied();

    let mut cap_faces = Vec::with_capacity(originals.len());
    for (_, face_corners, material) in &originals {
        let copied: Option<Vec<Corner>> = face_corners
            .iter()
            .map(|c| dup(c.vertex).map(|vertex| Corner { vertex, uv: c.uv }))
            .collect();
        cap_faces.extend(add_polygon(mesh, &copied?, *material));
    }

    let mut side_faces = Vec::with_capacity(boundary.len());
    for &(a, b) in &boundary {
        side_faces.extend(mesh.add_face(&[a, b, dup(b)?, dup(a)?], None, 0));
    }

    let mut bottom_faces = Vec::new();
    let mut removed_faces = Vec::new();
    for (f, face_corners, material) in &originals {
        mesh.delete_face(*f);
        if embedded {
            removed_faces.push(*f);
        } else {
            let mut reversed = face_corners.clone();
            reversed.reverse();
            bottom_faces.extend(add_polygon(mesh, &reversed, *material));
        }
    }
    if embedded {
        for e in region_edges {
            mesh.delete_edge_if_unused(e);
        }
        for v in region_vertices {
            mesh.delete_vertex_if_isolated(v);
        }
    }

    debug!(
        faces = faces.len(),
        boundary = boundary.len(),
        embedded,
        "Extruded faces"
    );

    Some(Extrusion {
        mode: SelectionMode::Face,
        vertex_map,
        side_faces,
        cap_faces,
        bottom_faces,
        removed_faces,
        connector_edges: Vec::new(),
        base_positions,
    })
}

fn extrude_edges(
    mesh: &mut BRepMesh,
    edges: &[EdgeId],
    lone_candidates: &[VertexId],
    mode: SelectionMode,
) -> Option<Extrusion> {
    // Wind each side quad against the face already using its edge.
    let mut sides: Vec<(VertexId, VertexId)> = Vec::with_capacity(edges.len());
    for &e in edges {
        let edge = mesh.edge(e)?;
        let (a, b) = (edge.v1, edge.v2);
        let forward_used = edge
            .faces()
            .iter()
            .filter_map(|&f| mesh.face(f))
            .any(|f| f.has_directed_side(a, b));
        sides.push(if forward_used { (b, a) } else { (a, b) });
    }

    let touched: BTreeSet<VertexId> = sides.iter().flat_map(|&(a, b)| [a, b]).collect();
    let lone: Vec<VertexId> = lone_candidates
        .iter()
        .copied()
        .filter(|v| !touched.contains(v))
        .collect();

    let (vertex_map, base_positions) =
        duplicate_vertices(mesh, touched.iter().copied().chain(lone.iter().copied()));
    let dup = |v: VertexId| vertex_map.get(&v).copied();

    let mut side_faces = Vec::with_capacity(sides.len());
    for &(a, b) in &sides {
        side_faces.extend(mesh.add_face(&[a, b, dup(b)?, dup(a)?], None, 0));
    }
    let mut connector_edges = Vec::with_capacity(lone.len());
    for &v in &lone {
        connector_edges.extend(mesh.add_edge(v, dup(v)?));
    }

    debug!(
        edges = edges.len(),
        connectors = connector_edges.len(),
        "Extruded edges"
    );

    Some(Extrusion {
        mode,
        vertex_map,
        side_faces,
        cap_faces: Vec::new(),
        bottom_faces: Vec::new(),
        removed_faces: Vec::new(),
        connector_edges,
        base_positions,
    })
}
