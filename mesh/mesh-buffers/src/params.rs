//! Parameters for synthesis, welding and picking.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How buffer vertices are shared between faces.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SynthesisStrategy {
    /// Every face corner gets its own buffer vertex with the flat face
    /// normal.
    DuplicatedPerFace,

    /// Corners with the same rounded position and UV share one buffer
    /// vertex with an averaged normal.
    SharedByPosition,

    /// Corners share a buffer vertex per smoothing island. Faces whose
    /// normals differ by more than `angle` radians across an edge fall into
    /// different islands, so the edge renders hard.
    Smoothed {
        /// Threshold angle in radians.
        angle: f64,
    },
}

impl Default for SynthesisStrategy {
    fn default() -> Self {
        Self::Smoothed {
            angle: 30f64.to_radians(),
        }
    }
}

/// Parameters for buffer synthesis.
///
/// # Example
///
/// ```
/// use mesh_buffers::{SynthParams, SynthesisStrategy};
///
/// let params = SynthParams::flat();
/// assert_eq!(params.strategy, SynthesisStrategy::DuplicatedPerFace);
///
/// let params = SynthParams::smooth(45f64.to_radians()).with_collinear_epsilon(1e-4);
/// assert_eq!(params.collinear_epsilon, 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynthParams {
    /// Vertex sharing strategy.
    pub strategy: SynthesisStrategy,

    /// Grid step used to round positions and UVs into sharing keys.
    pub position_precision: f64,

    /// Cross product bound below which a polygon corner counts as straight
    /// and is skipped before ear clipping.
    pub collinear_epsilon: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            strategy: SynthesisStrategy::default(),
            position_precision: 1e-6,
            collinear_epsilon: 1e-6,
        }
    }
}

impl SynthParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat shading, one vertex per face corner.
    #[must_use]
    pub fn flat() -> Self {
        Self::default().with_strategy(SynthesisStrategy::DuplicatedPerFace)
    }

    /// Vertices shared by position and UV.
    #[must_use]
    pub fn shared() -> Self {
        Self::default().with_strategy(SynthesisStrategy::SharedByPosition)
    }

    /// Smoothing groups split at `angle` radians.
    #[must_use]
    pub fn smooth(angle: f64) -> Self {
        Self::default().with_strategy(SynthesisStrategy::Smoothed { angle })
    }

    /// Set the sharing strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: SynthesisStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the rounding step for sharing keys.
    #[must_use]
    pub const fn with_position_precision(mut self, precision: f64) -> Self {
        self.position_precision = precision;
        self
    }

    /// Set the collinearity bound for triangulation.
    #[must_use]
    pub const fn with_collinear_epsilon(mut self, epsilon: f64) -> Self {
        self.collinear_epsilon = epsilon;
        self
    }
}

/// Parameters for welding a position buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeldParams {
    /// Positions that round to the same multiple of `tolerance` are merged.
    pub tolerance: f64,
}

impl Default for WeldParams {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

impl WeldParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weld tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Parameters for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PickParams {
    /// Largest distance between the ray and a vertex or edge that still
    /// counts as a hit, in world units.
    pub tolerance: f64,
}

impl Default for PickParams {
    fn default() -> Self {
        Self { tolerance: 0.05 }
    }
}

impl PickParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pick tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SynthParams::default();
        assert!(matches!(params.strategy, SynthesisStrategy::Smoothed { .. }));
        assert!((params.position_precision - 1e-6).abs() < 1e-18);
        assert!((WeldParams::default().tolerance - 1e-6).abs() < 1e-18);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SynthParams::flat().strategy, SynthesisStrategy::DuplicatedPerFace);
        assert_eq!(SynthParams::shared().strategy, SynthesisStrategy::SharedByPosition);
        assert_eq!(
            SynthParams::smooth(0.25).strategy,
            SynthesisStrategy::Smoothed { angle: 0.25 }
        );
    }

    #[test]
    fn test_builder_chain() {
        let params = SynthParams::new()
            .with_position_precision(1e-3)
            .with_collinear_epsilon(1e-5);
        assert!((params.position_precision - 1e-3).abs() < 1e-18);
        assert!((params.collinear_epsilon - 1e-5).abs() < 1e-18);
        assert!((PickParams::new().with_tolerance(0.2).tolerance - 0.2).abs() < 1e-18);
        assert!((WeldParams::new().with_tolerance(0.01).tolerance - 0.01).abs() < 1e-18);
    }
}
