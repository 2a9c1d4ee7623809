//! Editable boundary-representation mesh store.
//!
//! This crate provides the topology layer every editing tool works on:
//!
//! - [`BRepMesh`] - Arena-backed store of vertices, edges and faces with
//!   two-way adjacency
//! - [`Vertex`], [`Edge`], [`Face`] - The topological elements
//! - [`VertexId`], [`EdgeId`], [`FaceId`] - Stable, never-reused ids
//! - [`MeshSnapshot`] - Self-contained value copy for undo and rollback
//! - [`Selection`] - Vertex, edge or face selection handed to editing tools
//! - [`validate_topology`] - Invariant checker with a printable report
//!
//! # Layer 0 Crate
//!
//! No rendering, windowing or input dependencies. The store performs no
//! internal locking; embed it behind exclusive access if several threads
//! share it.
//!
//! # Winding
//!
//! Face corners are ordered counter-clockwise when viewed from the side the
//! normal points to (right-hand rule).
//!
//! # Example
//!
//! ```
//! use mesh_types::{BRepMesh, Point3, validate_topology};
//!
//! let mut mesh = BRepMesh::new();
//! let corners: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
//!     .iter()
//!     .map(|&(x, y)| mesh.add_vertex(Point3::new(x, y, 0.0)))
//!     .collect();
//! mesh.add_face(&corners, None, 0);
//!
//! assert_eq!(mesh.edge_count(), 4);
//! assert!(validate_topology(&mesh).is_valid());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod ids;
mod mesh;
mod selection;
mod snapshot;
mod validate;
mod vertex;

pub use error::{TopologyError, TopologyResult};
pub use ids::{EdgeId, FaceId, VertexId, edge_key};
pub use mesh::{BRepMesh, from_polygons, unit_cube, unit_quad};
pub use selection::{Selection, SelectionMode};
pub use snapshot::{EdgeRecord, FaceRecord, MeshSnapshot, VertexRecord};
pub use validate::{TopologyReport, Violation, validate_topology};
pub use vertex::{Edge, Face, Vertex};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};
