//! Editable B-rep mesh kernel.
//!
//! This umbrella crate re-exports the mesh-* crates behind one API: a
//! topology store of vertices, edges and faces, the geometry it needs,
//! editing operations that keep it consistent, and render buffer
//! synthesis for drawing and picking.
//!
//! # Quick Start
//!
//! ```
//! use mesh::prelude::*;
//!
//! // A unit quad, extruded up by one.
//! let mut mesh = unit_quad();
//! let faces = Selection::faces(mesh.face_ids());
//! let extrusion = extrude(&mut mesh, &faces)?;
//! extrusion.apply_offset(&mut mesh, Vector3::new(0.0, 0.0, 1.0));
//! assert_eq!(mesh.face_count(), 6);
//!
//! // Draw it.
//! let buffers = synthesize(&mesh, &SynthParams::flat());
//! assert_eq!(buffers.triangle_count(), 12);
//! # Ok::<(), mesh::edit::EditError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Topology store, ids, selections, snapshots, validation
//! - [`geometry`] - Plane fitting, normals, smoothing groups, triangulation, rays
//! - [`edit`] - Face creation, extrusion, loop cut, knife, subdivision, merge,
//!   delete and gesture sessions
//! - [`buffers`] - Render buffer synthesis, welding and picking
//!
//! # Feature Flags
//!
//! - `serde` - Serialize snapshots, ids and synthesis parameters

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Topology store, ids, selections, snapshots and validation.
pub use mesh_types as types;

/// Plane fitting, normals, smoothing groups, triangulation and rays.
pub use mesh_geometry as geometry;

/// Editing operations and gesture sessions.
pub use mesh_edit as edit;

/// Render buffer synthesis, welding and picking.
pub use mesh_buffers as buffers;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for editing meshes.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Store
    pub use mesh_types::{
        BRepMesh, EdgeId, FaceId, MeshSnapshot, Point2, Point3, Selection, SelectionMode, TopologyReport, Vector3,
        VertexId, unit_cube, unit_quad, validate_topology,
    };

    // Editing
    pub use mesh_edit::{
        EditError, EditSession, LoopCutParams, MergeTarget, SubdivideParams, ToolKind, create_face, delete_selection,
        extrude, knife_stroke, loop_cut, merge_by_distance, merge_vertices, subdivide,
    };

    // Rendering
    pub use mesh_buffers::{RenderBuffers, SynthParams, WeldParams, synthesize};
}
