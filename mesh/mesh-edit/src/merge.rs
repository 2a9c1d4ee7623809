//! Vertex merging on the topology store.

// Grid cells are small integers in practice
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeSet;

use hashbrown::HashMap;
use mesh_geometry::centroid;
use mesh_types::{BRepMesh, EdgeId, FaceId, Point3, Selection, SelectionMode, VertexId};
use tracing::{debug, info};

use crate::error::{EditError, EditResult};
use crate::params::MergeTarget;
use crate::rebuild::{Corner, add_polygon, corners};
use crate::selection::live_vertices;

/// Outcome of merging a vertex set into one survivor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// The vertex that remains.
    pub survivor: VertexId,
    /// Vertices merged away.
    pub removed: Vec<VertexId>,
    /// Faces rebuilt around the survivor.
    pub rebuilt_faces: Vec<FaceId>,
    /// Faces that collapsed below three corners and were dropped.
    pub dropped_faces: usize,
}

/// Outcome of merging by distance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceMerge {
    /// Number of groups that were merged.
    pub groups: usize,
    /// Number of vertices removed.
    pub removed: usize,
}

/// Merge the selected vertices into one.
///
/// The survivor is the lowest selected id, or the highest for
/// [`MergeTarget::Last`]; `target` also decides where it ends up. Faces
/// referencing a merged vertex are rebuilt on the survivor with repeated
/// corners collapsed, and dropped if fewer than three corners remain. Edges
/// from a merged vertex to an outside vertex are carried over to the
/// survivor; edges inside the merged set disappear.
///
/// Edge and face selections merge every vertex they touch.
///
/// # Errors
///
/// Returns [`EditError::EmptySelection`] when fewer than two live vertices
/// are selected.
///
/// # Example
///
/// ```
/// use mesh_edit::{MergeTarget, merge_vertices};
/// use mesh_types::{Selection, VertexId, unit_quad};
///
/// let mut quad = unit_quad();
/// let selection = Selection::vertices_of([VertexId(0), VertexId(1)]);
/// let merged = merge_vertices(&mut quad, &selection, MergeTarget::Center)?;
///
/// assert_eq!(merged.survivor, VertexId(0));
/// assert_eq!(quad.vertex_count(), 3);
/// assert!(quad.faces().all(|f| f.len() == 3));
/// # Ok::<(), mesh_edit::EditError>(())
/// ```
pub fn merge_vertices(mesh: &mut BRepMesh, selection: &Selection, target: MergeTarget) -> EditResult<MergeResult> {
    let mut vertices: Vec<VertexId> = match selection.mode() {
        SelectionMode::Vertex => live_vertices(mesh, selection, "merge")?,
        SelectionMode::Edge | SelectionMode::Face => selection.vertices(mesh).into_iter().collect(),
    };
    vertices.sort_unstable();
    vertices.dedup();
    vertices.retain(|&v| mesh.contains_vertex(v));
    if vertices.len() < 2 {
        return Err(EditError::EmptySelection);
    }

    let positions: Vec<Point3<f64>> = vertices.iter().filter_map(|&v| mesh.position(v)).collect();
    let (survivor, position) = match target {
        MergeTarget::First => (vertices[0], positions[0]),
        MergeTarget::Last => (vertices[vertices.len() - 1], positions[positions.len() - 1]),
        MergeTarget::Center => (vertices[0], centroid(&positions)),
        MergeTarget::Cursor(p) => (vertices[0], p),
    };
    let victims: BTreeSet<VertexId> = vertices.iter().copied().filter(|&v| v != survivor).collect();

    // Pull every face touching a victim out of the store.
    let affected: BTreeSet<FaceId> = victims
        .iter()
        .filter_map(|&v| mesh.vertex(v))
        .flat_map(|v| v.faces().iter().copied())
        .collect();
    let mut pending = Vec::with_capacity(affected.len());
    for f in affected {
        if let Some(face) = mesh.delete_face(f) {
            pending.push((corners(&face), face.material));
        }
    }

    // Carry outside edges over to the survivor.
    let victim_edges: BTreeSet<EdgeId> = victims
        .iter()
        .filter_map(|&v| mesh.vertex(v))
        .flat_map(|v| v.edges().iter().copied())
        .collect();
    for e in victim_edges {
        let Some(edge) = mesh.delete_edge(e) else { continue };
        let [a, b] = edge.vertices();
        let other = if victims.contains(&a) { b } else { a };
        if other != survivor && !victims.contains(&other) {
            mesh.add_edge(survivor, other);
        }
    }
    for &v in &victims {
        mesh.delete_vertex(v);
    }
    mesh.set_position(survivor, position);

    let mut rebuilt_faces = Vec::with_capacity(pending.len());
    let mut dropped_faces = 0;
    for (face_corners, material) in pending {
        let remapped = collapse(
            face_corners
                .into_iter()
                .map(|c| Corner {
                    vertex: if victims.contains(&c.vertex) { survivor } else { c.vertex },
                    uv: c.uv,
                })
                .collect(),
        );
        match (remapped.len() >= 3)
            .then(|| add_polygon(mesh, &remapped, material))
            .flatten()
        {
            Some(f) => rebuilt_faces.push(f),
            None => dropped_faces += 1,
        }
    }

    let removed: Vec<VertexId> = victims.into_iter().collect();
    info!(
        survivor = %survivor,
        removed = removed.len(),
        rebuilt = rebuilt_faces.len(),
        dropped = dropped_faces,
        "Merged vertices"
    );
    Ok(MergeResult {
        survivor,
        removed,
        rebuilt_faces,
        dropped_faces,
    })
}

/// Drop repeated corners: consecutive runs (with wraparound) first, then
/// any later repeat of a vertex already seen.
fn collapse(mut corners: Vec<Corner>) -> Vec<Corner> {
    corners.dedup_by_key(|c| c.vertex);
    while corners.len() > 1 && corners.first().map(|c| c.vertex) == corners.last().map(|c| c.vertex) {
        corners.pop();
    }
    let mut seen = BTreeSet::new();
    corners.retain(|c| seen.insert(c.vertex));
    corners
}

/// Merge vertices closer than `tolerance`.
///
/// Candidates are the selection's vertices, or the whole mesh for `None`.
/// Close pairs are found with a spatial hash and merged transitively; each
/// group collapses onto its lowest id.
///
/// # Errors
///
/// Returns [`EditError::EmptySelection`] or [`EditError::StaleSelection`]
/// for an empty or stale selection.
pub fn merge_by_distance(
    mesh: &mut BRepMesh,
    selection: Option<&Selection>,
    tolerance: f64,
) -> EditResult<DistanceMerge> {
    let candidates: Vec<VertexId> = match selection {
        Some(s) if s.mode() == SelectionMode::Vertex => live_vertices(mesh, s, "merge by distance")?,
        Some(s) => {
            if s.is_empty() {
                return Err(EditError::EmptySelection);
            }
            s.vertices(mesh).into_iter().collect()
        }
        None => mesh.vertex_ids(),
    };

    let groups = close_groups(mesh, &candidates, tolerance.max(1e-12));
    let mut result = DistanceMerge::default();
    for group in groups {
        let merged = merge_vertices(mesh, &Selection::vertices_of(group), MergeTarget::First)?;
        result.groups += 1;
        result.removed += merged.removed.len();
    }

    info!(
        tolerance,
        groups = result.groups,
        removed = result.removed,
        "Merged by distance"
    );
    Ok(result)
}

/// Groups of two or more candidates linked by distances below `epsilon`.
fn close_groups(mesh: &BRepMesh, candidates: &[VertexId], epsilon: f64) -> Vec<Vec<VertexId>> {
    let cell_size = epsilon * 2.0;
    let points: Vec<(VertexId, Point3<f64>)> = candidates
        .iter()
        .filter_map(|&v| mesh.position(v).map(|p| (v, p)))
        .collect();

    // Build spatial hash
    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (idx, (_, p)) in points.iter().enumerate() {
        spatial_hash.entry(pos_to_cell(p, cell_size)).or_default().push(idx);
    }

    // Union every close pair so chains end up in one group.
    let mut parent: Vec<usize> = (0..points.len()).collect();
    for (idx, (_, p)) in points.iter().enumerate() {
        let cell = pos_to_cell(p, cell_size);

        // Check 3x3x3 neighborhood
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(others) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz)) else {
                        continue;
                    };
                    for &other in others {
                        if other > idx && (p - points[other].1).norm() < epsilon {
                            union(&mut parent, idx, other);
                        }
                    }
                }
            }
        }
    }

    let mut groups: HashMap<usize, Vec<VertexId>> = HashMap::new();
    for (i, &(v, _)) in points.iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(v);
    }

    let mut groups: Vec<Vec<VertexId>> = groups.into_values().filter(|g| g.len() > 1).collect();
    groups.sort_unstable();
    debug!(groups = groups.len(), "Found coincident vertex groups");
    groups
}

/// Root of `i`, halving paths on the way up.
fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Join the sets of `a` and `b`; the smaller root wins.
fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

/// Convert position to spatial hash cell.
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}
