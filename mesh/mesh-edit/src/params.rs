//! Parameters for editing operations.

use nalgebra::Point3;

/// How a loop traversal treats faces that are not quads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Abort the whole cut when the loop reaches a non-quad face.
    #[default]
    Strict,

    /// Stop the loop at the non-quad face and insert the new end vertex
    /// into it instead of splitting it.
    Partial,
}

/// Parameters for loop cutting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopCutParams {
    /// Traversal mode.
    pub mode: LoopMode,

    /// Slide factor along each loop edge, clamped to `[0, 1]`.
    pub factor: f64,
}

impl Default for LoopCutParams {
    fn default() -> Self {
        Self {
            mode: LoopMode::default(),
            factor: 0.5,
        }
    }
}

impl LoopCutParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters for a partial loop cut.
    #[must_use]
    pub fn partial() -> Self {
        Self {
            mode: LoopMode::Partial,
            ..Self::default()
        }
    }

    /// Set the traversal mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: LoopMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the slide factor.
    #[must_use]
    pub const fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// The slide factor clamped to `[0, 1]`.
    #[must_use]
    pub fn clamped_factor(&self) -> f64 {
        if self.factor.is_nan() {
            0.5
        } else {
            self.factor.clamp(0.0, 1.0)
        }
    }
}

/// Parameters for face subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivideParams {
    /// Number of successive subdivisions. Each pass subdivides every face
    /// created by the previous one.
    pub cuts: u32,

    /// Maximum faces allowed in the result.
    pub max_faces: usize,
}

impl Default for SubdivideParams {
    fn default() -> Self {
        Self {
            cuts: 1,
            max_faces: 10_000_000,
        }
    }
}

impl SubdivideParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of cuts.
    #[must_use]
    pub const fn with_cuts(mut self, cuts: u32) -> Self {
        self.cuts = cuts;
        self
    }

    /// Set the maximum face count.
    #[must_use]
    pub const fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }
}

/// Where merged vertices end up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MergeTarget {
    /// At the first (lowest id) selected vertex.
    First,

    /// At the last (highest id) selected vertex.
    Last,

    /// At the centroid of the selection.
    #[default]
    Center,

    /// At an explicit position, such as the 3D cursor.
    Cursor(Point3<f64>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_cut_defaults() {
        let params = LoopCutParams::default();
        assert_eq!(params.mode, LoopMode::Strict);
        assert!((params.factor - 0.5).abs() < f64::EPSILON);
        assert_eq!(LoopCutParams::partial().mode, LoopMode::Partial);
    }

    #[test]
    fn factor_is_clamped() {
        assert!((LoopCutParams::new().with_factor(1.5).clamped_factor() - 1.0).abs() < f64::EPSILON);
        assert!(LoopCutParams::new().with_factor(-2.0).clamped_factor().abs() < f64::EPSILON);
        assert!((LoopCutParams::new().with_factor(f64::NAN).clamped_factor() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn subdivide_builder() {
        let params = SubdivideParams::new().with_cuts(3).with_max_faces(100);
        assert_eq!(params.cuts, 3);
        assert_eq!(params.max_faces, 100);
    }
}
