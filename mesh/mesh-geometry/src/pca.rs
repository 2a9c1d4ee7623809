//! Best-fit plane estimation by principal component analysis.
//!
//! The plane normal is the eigenvector of the smallest eigenvalue of the
//! centered covariance matrix. Used when a vertex set is not guaranteed to
//! be planar, for example when a face is built from scattered picks.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use tracing::warn;

use crate::error::{GeometryError, GeometryResult};
use crate::polygon::{centroid, default_normal};

/// Result of fitting a plane to a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFit {
    /// Mean of the input points.
    pub centroid: Point3<f64>,
    /// Unit normal, sign-canonicalized so that its first significant
    /// component is positive.
    pub normal: Vector3<f64>,
    /// Eigenvalues of the covariance matrix, sorted descending.
    pub eigenvalues: [f64; 3],
}

impl PlaneFit {
    /// Whether the points are approximately coplanar.
    ///
    /// `threshold` is the ratio of smallest to largest eigenvalue below
    /// which the set counts as flat.
    #[must_use]
    pub fn is_flat(&self, threshold: f64) -> bool {
        if self.eigenvalues[0] < f64::EPSILON {
            return true;
        }
        self.eigenvalues[2] / self.eigenvalues[0] < threshold
    }

    /// Whether the points are approximately collinear (or coincident).
    ///
    /// A collinear set has no well-defined plane.
    #[must_use]
    pub fn is_degenerate(&self, threshold: f64) -> bool {
        if self.eigenvalues[0] < f64::EPSILON {
            return true;
        }
        self.eigenvalues[1] / self.eigenvalues[0] < threshold
    }
}

/// Fit a plane to at least three points.
///
/// Returns `None` for fewer than three points.
///
/// # Example
///
/// ```
/// use mesh_geometry::fit_plane;
/// use nalgebra::Point3;
///
/// let points = [
///     Point3::new(0.0, 0.0, 2.0),
///     Point3::new(1.0, 0.0, 2.0),
///     Point3::new(1.0, 1.0, 2.0),
///     Point3::new(0.0, 1.0, 2.0),
/// ];
/// let fit = fit_plane(&points).unwrap();
/// assert!((fit.normal.z - 1.0).abs() < 1e-9);
/// assert!((fit.centroid.z - 2.0).abs() < 1e-12);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit_plane(points: &[Point3<f64>]) -> Option<PlaneFit> {
    if points.len() < 3 {
        return None;
    }

    let center = centroid(points);
    let mut covariance = Matrix3::zeros();
    for p in points {
        let d = p - center;
        covariance += d * d.transpose();
    }
    covariance /= points.len() as f64;

    let eigen = SymmetricEigen::new(covariance);
    let values = eigen.eigenvalues;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let normal = canonical_sign(eigen.eigenvectors.column(order[2]).into_owned());

    Some(PlaneFit {
        centroid: center,
        normal,
        eigenvalues: [values[order[0]], values[order[1]], values[order[2]]],
    })
}

/// Fit a plane, reporting why it failed.
///
/// # Errors
///
/// Returns [`GeometryError::InsufficientPoints`] for fewer than three
/// points and [`GeometryError::DegeneratePlane`] when the points are
/// collinear or coincident.
pub fn fit_plane_checked(points: &[Point3<f64>]) -> GeometryResult<PlaneFit> {
    if points.len() < 3 {
        return Err(GeometryError::InsufficientPoints {
            required: 3,
            actual: points.len(),
        });
    }
    match fit_plane(points) {
        Some(fit) if !fit.is_degenerate(1e-12) => Ok(fit),
        _ => Err(GeometryError::DegeneratePlane),
    }
}

/// Best-fit normal of a point set, falling back to `+Z` when the set has
/// no well-defined plane.
#[must_use]
pub fn best_fit_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    match fit_plane_checked(points) {
        Ok(fit) => fit.normal,
        Err(err) => {
            warn!(points = points.len(), %err, "Plane fit failed, using +Z");
            default_normal()
        }
    }
}

fn canonical_sign(v: Vector3<f64>) -> Vector3<f64> {
    let v = v.try_normalize(f64::EPSILON).unwrap_or_else(default_normal);
    let leading = [v.z, v.y, v.x]
        .into_iter()
        .find(|c| c.abs() > 1e-9)
        .unwrap_or(1.0);
    if leading < 0.0 { -v } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tilted_square_normal() {
        let n = Vector3::new(1.0, 1.0, 1.0).normalize();
        let (u, v) = crate::polygon::tangent_basis(&n);
        let points: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(a, b)| Point3::from(u * a + v * b))
            .collect();

        let fit = fit_plane(&points).unwrap_or_else(|| PlaneFit {
            centroid: Point3::origin(),
            normal: Vector3::zeros(),
            eigenvalues: [0.0; 3],
        });
        assert_relative_eq!(fit.normal, n, epsilon = 1e-9);
        assert!(fit.is_flat(1e-9));
    }

    #[test]
    fn sign_is_canonical() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let fit = fit_plane(&points);
        assert!(fit.is_some_and(|f| f.normal.z > 0.99));
    }

    #[test]
    fn too_few_points() {
        let points = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert!(fit_plane(&points).is_none());
        assert!(matches!(
            fit_plane_checked(&points),
            Err(GeometryError::InsufficientPoints { required: 3, actual: 2 })
        ));
    }

    #[test]
    fn collinear_points_fall_back_to_up() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        ];
        assert!(matches!(
            fit_plane_checked(&points),
            Err(GeometryError::DegeneratePlane)
        ));
        assert_eq!(best_fit_normal(&points), Vector3::z());
    }

    #[test]
    fn noisy_points_still_fit() {
        let points = [
            Point3::new(0.0, 0.0, 0.01),
            Point3::new(2.0, 0.0, -0.01),
            Point3::new(2.0, 2.0, 0.01),
            Point3::new(0.0, 2.0, -0.01),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert!(best_fit_normal(&points).z > 0.99);
    }
}
