//! Editing operations for [`BRepMesh`](mesh_types::BRepMesh).
//!
//! Every operation takes the mesh mutably together with a [`Selection`](mesh_types::Selection)
//! or element ids, validates its input, and either fails without touching
//! the mesh or applies the whole edit. Faces are never rewritten in place:
//! an edited face is removed and re-added, so face ids that appear in a
//! result always refer to the new topology.
//!
//! - [`create_face`] / [`bridge_faces`]: new faces from picked vertices, or a
//!   ring of quads between two faces
//! - [`extrude`]: duplicate a selection and join it with side faces
//! - [`loop_cut`]: split a ring of quads along an edge loop
//! - [`knife_cut`] / [`knife_stroke`]: cut faces along a screen-space stroke
//! - [`subdivide`]: split faces into quads around their centers
//! - [`merge_vertices`] / [`merge_by_distance`]: collapse and weld vertices
//! - [`delete_selection`], [`duplicate`], [`separate`]
//!
//! Interactive tools go through an [`EditSession`], which snapshots the
//! mesh when a gesture begins and restores it on cancel.
//!
//! # Examples
//!
//! Extrude the top of a cube and pull it up:
//!
//! ```
//! use mesh_edit::extrude;
//! use mesh_types::{Selection, Vector3, unit_cube, validate_topology};
//!
//! let mut cube = unit_cube();
//! let top = cube.face_ids()[1];
//! let extrusion = extrude(&mut cube, &Selection::faces([top]))?;
//! extrusion.apply_offset(&mut cube, Vector3::new(0.0, 0.0, 0.5));
//!
//! assert_eq!(cube.face_count(), 10);
//! assert!(validate_topology(&cube).is_closed());
//! # Ok::<(), mesh_edit::EditError>(())
//! ```
//!
//! Cut a loop around a cube:
//!
//! ```
//! use mesh_edit::{EditError, LoopCutParams, loop_cut};
//! use mesh_types::{VertexId, unit_cube};
//!
//! let mut cube = unit_cube();
//! let vertical = cube
//!     .edge_between(VertexId(1), VertexId(5))
//!     .map(|e| e.id)
//!     .ok_or(EditError::EmptySelection)?;
//! let cut = loop_cut(&mut cube, vertical, &LoopCutParams::default())?;
//!
//! assert_eq!(cut.new_vertices.len(), 4);
//! assert_eq!(cube.face_count(), 10);
//! # Ok::<(), mesh_edit::EditError>(())
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod create_face;
mod delete;
mod error;
mod extrude;
mod gesture;
mod knife;
mod loop_cut;
mod merge;
mod params;
mod rebuild;
mod result;
mod selection;
mod subdivide;

pub use create_face::{Bridge, CreatedFace, bridge_faces, create_face};
pub use delete::{Deletion, Duplication, delete_selection, duplicate, separate};
pub use error::{EditError, EditResult, GestureError};
pub use extrude::{Extrusion, extrude};
pub use gesture::{EditSession, GestureState, ToolKind, UndoRecord};
pub use knife::{CutPoint, KnifeCut, knife_cut, knife_stroke};
pub use loop_cut::{EdgeLoop, LoopCut, LoopPreview, LoopQuad, Rail, find_edge_loop, loop_cut, preview_loop_cut};
pub use merge::{DistanceMerge, MergeResult, merge_by_distance, merge_vertices};
pub use params::{LoopCutParams, LoopMode, MergeTarget, SubdivideParams};
pub use result::SubdivisionResult;
pub use subdivide::subdivide;

pub use mesh_geometry::{KnifeParams, KnifeView};
