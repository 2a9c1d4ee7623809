//! Geometric utilities for editing B-rep meshes.
//!
//! This crate provides:
//! - Best-fit plane estimation from scattered points
//! - CCW ordering of points around a normal
//! - Flat, averaged and angle-threshold (smoothing group) normals
//! - A per-revision face adjacency cache
//! - Orientation voting for new faces against their neighbors
//! - Ear-clipping triangulation
//! - Ray casting and knife plane intersection
//!
//! # Layer 0
//!
//! Depends only on `mesh-types` and `nalgebra`. Every query is read-only;
//! ambiguous geometry (zero-area polygons, collinear plane fits) resolves to
//! documented fallbacks such as a `+Z` normal instead of failing.
//!
//! # Example
//!
//! ```
//! use mesh_geometry::{best_fit_normal, sort_ccw};
//! use nalgebra::Point3;
//!
//! let picks = [
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let normal = best_fit_normal(&picks);
//! let order = sort_ccw(&picks, &normal);
//! assert_eq!(order.len(), 4);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod error;
pub mod knife;
mod normals;
mod orient;
mod pca;
mod plane;
mod polygon;
mod ray;
mod smoothing;
mod triangulate;

pub use adjacency::{AdjacencyCache, FaceAdjacency};
pub use error::{GeometryError, GeometryResult};
pub use knife::{EdgeHit, KnifeParams, KnifeView, cut_plane, knife_intersections};
pub use normals::{
    average_normal, face_area, face_centroid, face_normal, face_normals, vertex_normal,
    vertex_normals,
};
pub use orient::{orient_against_neighbors, orientation_vote};
pub use pca::{PlaneFit, best_fit_normal, fit_plane, fit_plane_checked};
pub use plane::{Plane, SegmentHit};
pub use polygon::{
    centroid, default_normal, lerp, lerp_uv, midpoint, newell_normal, newell_vector,
    normalize_or_default, project_to_plane, sort_ccw, tangent_basis,
};
pub use ray::{Ray, RayHit, raycast_mesh};
pub use smoothing::{SmoothingGroups, smoothing_groups};
pub use triangulate::triangulate_polygon;
