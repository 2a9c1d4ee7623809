//! Distance welding of synthesized buffers.
//!
//! Works on flat position and index arrays, not on the topology store.
//! Positions are snapped to a grid of step `tolerance`; every vertex whose
//! snapped key was already seen is folded into the first vertex with that
//! key. Index references are remapped and the surviving vertices compacted.
//! Triangles that collapse keep their slot, so group ranges and the
//! triangle-to-face map stay aligned.

// Index counts fit in u32 for any buffer the GPU accepts
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use tracing::{debug, info};

use crate::buffers::RenderBuffers;
use crate::error::{BufferError, BufferResult};
use crate::params::WeldParams;

/// Outcome of welding a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeldReport {
    /// Vertices before welding.
    pub original_vertices: usize,
    /// Vertices folded into an earlier one.
    pub removed: usize,
    /// New index of every original vertex.
    pub remap: Vec<u32>,
}

impl WeldReport {
    /// Vertices left after welding.
    #[must_use]
    pub const fn kept(&self) -> usize {
        self.original_vertices - self.removed
    }
}

impl std::fmt::Display for WeldReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Weld: {} → {} vertices ({} removed)",
            self.original_vertices,
            self.kept(),
            self.removed
        )
    }
}

/// Weld a flat position buffer in place.
///
/// `positions` holds 3 floats per vertex; `indices` is rewritten to point
/// at the compacted vertices.
///
/// # Errors
///
/// Returns an error, leaving both arrays untouched, if:
/// - `tolerance` is not positive and finite
/// - `positions` is not a multiple of 3 long
/// - an index is out of range
///
/// # Example
///
/// ```
/// use mesh_buffers::{WeldParams, weld_positions};
///
/// // Two triangles sharing an edge through duplicated vertices.
/// let mut positions = vec![
///     0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
///     1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
/// ];
/// let mut indices = vec![0, 1, 2, 3, 4, 5];
///
/// let report = weld_positions(&mut positions, &mut indices, &WeldParams::default())?;
/// assert_eq!(report.removed, 2);
/// assert_eq!(positions.len(), 12);
/// assert_eq!(indices, vec![0, 1, 2, 1, 3, 2]);
/// # Ok::<(), mesh_buffers::BufferError>(())
/// ```
pub fn weld_positions(positions: &mut Vec<f32>, indices: &mut [u32], params: &WeldParams) -> BufferResult<WeldReport> {
    let report = plan_weld(positions, indices, params)?;
    if report.removed > 0 {
        *positions = compact(positions, 3, &report.remap, report.kept());
        for index in indices.iter_mut() {
            *index = report.remap[*index as usize];
        }
    }
    debug!("{report}");
    Ok(report)
}

impl RenderBuffers {
    /// Weld the buffers by position.
    ///
    /// Attributes and source ids of the first vertex in each group survive.
    /// Wireframe lines are remapped along with the triangles.
    ///
    /// # Errors
    ///
    /// Same as [`weld_positions`]; the buffers are left untouched.
    pub fn weld(&mut self, params: &WeldParams) -> BufferResult<WeldReport> {
        let report = plan_weld(&self.positions, &self.indices, params)?;
        if let Some(&bad) = self.line_indices.iter().find(|&&i| i as usize >= report.remap.len()) {
            return Err(BufferError::IndexOutOfRange {
                index: bad,
                vertex_count: report.remap.len(),
            });
        }
        if report.removed == 0 {
            return Ok(report);
        }

        let kept = report.kept();
        self.positions = compact(&self.positions, 3, &report.remap, kept);
        self.uvs = compact(&self.uvs, 2, &report.remap, kept);
        self.normals = compact(&self.normals, 3, &report.remap, kept);
        self.vertex_ids = compact(&self.vertex_ids, 1, &report.remap, kept);
        for index in self.indices.iter_mut().chain(self.line_indices.iter_mut()) {
            *index = report.remap[*index as usize];
        }
        info!("{report}");
        Ok(report)
    }
}

/// Compute the remap without touching the arrays.
fn plan_weld(positions: &[f32], indices: &[u32], params: &WeldParams) -> BufferResult<WeldReport> {
    let tolerance = params.tolerance;
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(BufferError::InvalidTolerance(tolerance));
    }
    if positions.len() % 3 != 0 {
        return Err(BufferError::RaggedPositions(positions.len()));
    }
    let vertex_count = positions.len() / 3;
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(BufferError::IndexOutOfRange { index: bad, vertex_count });
    }

    let mut first_of: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut remap = Vec::with_capacity(vertex_count);
    let mut kept = 0u32;
    for p in positions.chunks_exact(3) {
        let key = grid_key(p, tolerance);
        let index = *first_of.entry(key).or_insert_with(|| {
            kept += 1;
            kept - 1
        });
        remap.push(index);
    }

    Ok(WeldReport {
        original_vertices: vertex_count,
        removed: vertex_count - kept as usize,
        remap,
    })
}

fn grid_key(p: &[f32], tolerance: f64) -> (i64, i64, i64) {
    let q = |x: f32| (f64::from(x) / tolerance).round() as i64;
    (q(p[0]), q(p[1]), q(p[2]))
}

/// Keep the first occurrence of each remapped vertex.
fn compact<T: Copy>(values: &[T], stride: usize, remap: &[u32], kept: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(kept * stride);
    let mut next = 0u32;
    for (chunk, &target) in values.chunks_exact(stride).zip(remap) {
        if target == next {
            out.extend_from_slice(chunk);
            next += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SynthParams;
    use crate::synth::synthesize;
    use mesh_types::unit_cube;

    #[test]
    fn flat_cube_welds_to_corners() {
        let cube = unit_cube();
        let mut buffers = synthesize(&cube, &SynthParams::flat());
        let triangles = buffers.triangle_count();

        let report = buffers.weld(&WeldParams::default()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.original_vertices, 24);
        assert_eq!(report.removed, 16);
        assert_eq!(buffers.vertex_count(), 8);
        assert_eq!(buffers.uvs.len(), 16);
        assert_eq!(buffers.normals.len(), 24);
        assert_eq!(buffers.triangle_count(), triangles);
        assert!(buffers.indices.iter().all(|&i| (i as usize) < 8));
        assert!(buffers.line_indices.iter().all(|&i| (i as usize) < 8));

        // Each surviving vertex still maps to the topology vertex at its position.
        for i in 0..8u32 {
            let source = buffers.source_vertex(i).and_then(|v| cube.position(v));
            let here = buffers.position(i);
            assert!(source.zip(here).is_some_and(|(a, b)| (a - b).norm() < 1e-6));
        }
    }

    #[test]
    fn welding_is_idempotent() {
        let cube = unit_cube();
        let mut buffers = synthesize(&cube, &SynthParams::flat());
        let params = WeldParams::default();
        let _ = buffers.weld(&params);
        let before = buffers.clone();

        let report = buffers.weld(&params).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.removed, 0);
        assert_eq!(buffers, before);
    }

    #[test]
    fn tolerance_controls_grouping() {
        let mut positions = vec![0.0, 0.0, 0.0, 0.001, 0.0, 0.0];
        let mut indices = vec![0, 1, 1];
        let report = weld_positions(&mut positions, &mut indices, &WeldParams::default())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.removed, 0);

        let report = weld_positions(&mut positions, &mut indices, &WeldParams::new().with_tolerance(0.01))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(report.removed, 1);
        assert_eq!(indices, vec![0, 0, 0]);
        assert_eq!(positions, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut positions = vec![0.0, 0.0, 0.0, 1.0];
        let mut indices = vec![0, 0, 0];
        assert_eq!(
            weld_positions(&mut positions, &mut indices, &WeldParams::default()),
            Err(BufferError::RaggedPositions(4))
        );

        let mut positions = vec![0.0, 0.0, 0.0];
        let mut indices = vec![0, 0, 3];
        assert_eq!(
            weld_positions(&mut positions, &mut indices, &WeldParams::default()),
            Err(BufferError::IndexOutOfRange {
                index: 3,
                vertex_count: 1
            })
        );
        assert_eq!(
            weld_positions(&mut positions, &mut [0, 0, 0], &WeldParams::new().with_tolerance(0.0)),
            Err(BufferError::InvalidTolerance(0.0))
        );
        assert_eq!(indices, vec![0, 0, 3]);
    }

    #[test]
    fn report_display() {
        let report = WeldReport {
            original_vertices: 24,
            removed: 16,
            remap: Vec::new(),
        };
        assert_eq!(report.kept(), 8);
        assert!(format!("{report}").contains("24 → 8 vertices"));
    }
}
