//! Polygon helpers: centroids, Newell normals, tangent frames and CCW
//! ordering.

use nalgebra::{Point2, Point3, Vector3};

/// Normal returned when a polygon has no usable area (`+Z`).
#[inline]
#[must_use]
pub fn default_normal() -> Vector3<f64> {
    Vector3::z()
}

/// Arithmetic mean of a point set. Returns the origin for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Midpoint of a segment.
#[inline]
#[must_use]
pub fn midpoint(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords) * 0.5)
}

/// Unnormalized Newell normal. Its length is twice the polygon's area.
#[must_use]
pub fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Unit normal of a polygon by Newell's method.
///
/// Works for non-planar and concave polygons. Falls back to `+Z` when the
/// polygon has no area.
///
/// # Example
///
/// ```
/// use mesh_geometry::newell_normal;
/// use nalgebra::Point3;
///
/// let square = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// assert!((newell_normal(&square).z - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    normalize_or_default(newell_vector(points))
}

/// Normalize a vector, falling back to `+Z` when it is (near) zero.
#[must_use]
pub fn normalize_or_default(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::EPSILON).unwrap_or_else(default_normal)
}

/// An orthonormal in-plane basis `(u, v)` for `normal`, such that
/// `u × v = normal`.
///
/// The choice of axes is arbitrary but deterministic for a given normal.
#[must_use]
pub fn tangent_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let n = normalize_or_default(*normal);
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = n.cross(&helper).normalize();
    let v = n.cross(&u);
    (u, v)
}

/// Project points into the 2D frame of [`tangent_basis`] around `origin`.
#[must_use]
pub fn project_to_plane(
    points: &[Point3<f64>],
    origin: &Point3<f64>,
    normal: &Vector3<f64>,
) -> Vec<Point2<f64>> {
    let (u, v) = tangent_basis(normal);
    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect()
}

/// Order points counter-clockwise around `normal`.
///
/// Returns indices into `points`, sorted by angle around the centroid in
/// the plane's tangent frame.
///
/// # Example
///
/// ```
/// use mesh_geometry::sort_ccw;
/// use nalgebra::{Point3, Vector3};
///
/// let scrambled = [
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ];
/// let order = sort_ccw(&scrambled, &Vector3::z());
///
/// // Walking the order is counter-clockwise about +Z.
/// let ordered: Vec<_> = order.iter().map(|&i| scrambled[i]).collect();
/// assert!(mesh_geometry::newell_vector(&ordered).z > 0.0);
/// ```
#[must_use]
pub fn sort_ccw(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<usize> {
    let center = centroid(points);
    let projected = project_to_plane(points, &center, normal);
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let angle_a = projected[a].y.atan2(projected[a].x);
        let angle_b = projected[b].y.atan2(projected[b].x);
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Linear interpolation between two points.
#[inline]
#[must_use]
pub fn lerp(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    Point3::from(a.coords + (b.coords - a.coords) * t)
}

/// Linear interpolation between two texture coordinates.
#[inline]
#[must_use]
pub fn lerp_uv(a: &Point2<f64>, b: &Point2<f64>, t: f64) -> Point2<f64> {
    Point2::from(a.coords + (b.coords - a.coords) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn newell_of_degenerate_polygon_is_up() {
        let line = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(newell_normal(&line), default_normal());
    }

    #[test]
    fn newell_follows_winding() {
        let cw = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        assert_relative_eq!(newell_normal(&cw).z, -1.0, epsilon = 1e-12);
        assert_relative_eq!(newell_vector(&cw).norm(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn tangent_basis_is_right_handed() {
        for normal in [
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            Vector3::new(1.0, 2.0, -3.0).normalize(),
        ] {
            let (u, v) = tangent_basis(&normal);
            assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-12);
            assert_relative_eq!(u.cross(&v), normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn sort_ccw_respects_normal_direction() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let up: Vec<_> = sort_ccw(&points, &Vector3::z())
            .iter()
            .map(|&i| points[i])
            .collect();
        let down: Vec<_> = sort_ccw(&points, &-Vector3::z())
            .iter()
            .map(|&i| points[i])
            .collect();
        assert!(newell_vector(&up).z > 0.0);
        assert!(newell_vector(&down).z < 0.0);
    }

    #[test]
    fn centroid_and_midpoint() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0)];
        assert_eq!(centroid(&pts), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(midpoint(&pts[0], &pts[1]), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(centroid(&[]), Point3::origin());
        assert_eq!(lerp(&pts[0], &pts[1], 0.25), Point3::new(0.5, 1.0, 1.5));
    }
}
