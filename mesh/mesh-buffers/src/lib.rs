//! Render buffer synthesis for B-rep meshes.
//!
//! Turns a [`BRepMesh`](mesh_types::BRepMesh) into flat, upload-ready
//! arrays (positions, UVs, normals, triangle indices grouped by material)
//! plus the maps back into topology that picking and live drag updates
//! need. Synthesis only reads the store.
//!
//! # Strategies
//!
//! | Strategy | Buffer vertex per | Normals |
//! |----------|-------------------|---------|
//! | [`SynthesisStrategy::DuplicatedPerFace`] | face corner | flat |
//! | [`SynthesisStrategy::SharedByPosition`] | rounded position + UV | vertex average |
//! | [`SynthesisStrategy::Smoothed`] | vertex per smoothing island | island average |
//!
//! Polygons with up to four corners are fanned; larger ones are ear-clipped
//! in their own plane. The smoothed strategy also draws each face-less
//! vertex as a zero-area triangle.
//!
//! # Example
//!
//! ```
//! use mesh_buffers::{SynthParams, WeldParams, synthesize};
//! use mesh_types::unit_cube;
//!
//! let cube = unit_cube();
//! let mut buffers = synthesize(&cube, &SynthParams::flat());
//! assert_eq!(buffers.vertex_count(), 24);
//!
//! let report = buffers.weld(&WeldParams::default())?;
//! assert_eq!(report.removed, 16);
//! assert_eq!(buffers.indices_of(cube.vertex_ids()[0]).len(), 1);
//! # Ok::<(), mesh_buffers::BufferError>(())
//! ```
//!
//! # Layer 0
//!
//! No rendering API dependency: the output is plain `Vec<f32>`/`Vec<u32>`
//! and a [`bytemuck::Pod`] interleaved [`RenderVertex`].

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod buffers;
mod error;
mod params;
mod pick;
mod synth;
mod weld;

pub use buffers::{RenderBuffers, RenderGroup, RenderVertex};
pub use error::{BufferError, BufferResult};
pub use params::{PickParams, SynthParams, SynthesisStrategy, WeldParams};
pub use pick::{EdgePick, FacePick, Pick, VertexPick, pick, pick_edge, pick_face, pick_screen, pick_vertex};
pub use synth::{Synthesizer, synthesize};
pub use weld::{WeldReport, weld_positions};
