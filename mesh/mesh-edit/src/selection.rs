//! Selection checks run at the start of every operation.

use mesh_types::{BRepMesh, EdgeId, FaceId, Selection, VertexId};

use crate::error::{EditError, EditResult};

/// Live faces of a face selection.
///
/// Stale ids are dropped. Fails when the selection is empty, in another
/// mode, or holds only stale ids.
pub(crate) fn live_faces(mesh: &BRepMesh, selection: &Selection, operation: &'static str) -> EditResult<Vec<FaceId>> {
    let ids = selection.as_faces().ok_or(EditError::WrongMode {
        operation,
        mode: selection.mode(),
    })?;
    live(ids.iter().copied(), |f| mesh.contains_face(f))
}

/// Live edges of an edge selection.
pub(crate) fn live_edges(mesh: &BRepMesh, selection: &Selection, operation: &'static str) -> EditResult<Vec<EdgeId>> {
    let ids = selection.as_edges().ok_or(EditError::WrongMode {
        operation,
        mode: selection.mode(),
    })?;
    live(ids.iter().copied(), |e| mesh.contains_edge(e))
}

/// Live vertices of a vertex selection.
pub(crate) fn live_vertices(
    mesh: &BRepMesh,
    selection: &Selection,
    operation: &'static str,
) -> EditResult<Vec<VertexId>> {
    let ids = selection.as_vertices().ok_or(EditError::WrongMode {
        operation,
        mode: selection.mode(),
    })?;
    live(ids.iter().copied(), |v| mesh.contains_vertex(v))
}

fn live<T: Copy>(ids: impl Iterator<Item = T>, exists: impl Fn(T) -> bool) -> EditResult<Vec<T>> {
    let mut total = 0;
    let alive: Vec<T> = ids
        .inspect(|_| total += 1)
        .filter(|&id| exists(id))
        .collect();
    if total == 0 {
        return Err(EditError::EmptySelection);
    }
    if alive.is_empty() {
        return Err(EditError::StaleSelection(total));
    }
    Ok(alive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{SelectionMode, unit_cube};

    #[test]
    fn stale_and_empty_selections() {
        let cube = unit_cube();
        assert_eq!(
            live_faces(&cube, &Selection::faces([]), "test"),
            Err(EditError::EmptySelection)
        );
        assert_eq!(
            live_faces(&cube, &Selection::faces([FaceId(40), FaceId(41)]), "test"),
            Err(EditError::StaleSelection(2))
        );
        assert_eq!(
            live_faces(&cube, &Selection::faces([FaceId(0), FaceId(41)]), "test"),
            Ok(vec![FaceId(0)])
        );
    }

    #[test]
    fn wrong_mode() {
        let cube = unit_cube();
        assert_eq!(
            live_edges(&cube, &Selection::vertices_of([VertexId(0)]), "bevel"),
            Err(EditError::WrongMode {
                operation: "bevel",
                mode: SelectionMode::Vertex
            })
        );
        assert!(live_vertices(&cube, &Selection::vertices_of([VertexId(0)]), "x").is_ok());
    }
}
