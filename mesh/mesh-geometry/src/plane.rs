//! Planes and plane–segment intersection.

use nalgebra::{Point3, Vector3};

/// A plane in 3D space defined by a point and normal.
///
/// The plane equation is: `normal · (p - point) = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// A point on the plane.
    pub point: Point3<f64>,
    /// The plane normal (unit vector).
    pub normal: Vector3<f64>,
}

/// Where a segment crosses a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Parameter along the segment, in `[0, 1]`.
    pub t: f64,
    /// The crossing point.
    pub point: Point3<f64>,
}

impl Plane {
    /// Create a plane from a point and normal.
    ///
    /// The normal is normalized. Returns `None` if it is (near) zero.
    #[must_use]
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let norm = normal.norm();
        if norm < f64::EPSILON {
            return None;
        }
        Some(Self {
            point,
            normal: normal / norm,
        })
    }

    /// Create a plane from three non-collinear points.
    ///
    /// The normal is `(p1 - p0) × (p2 - p0)`, normalized.
    #[must_use]
    pub fn from_points(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<Self> {
        Self::new(*p0, (p1 - p0).cross(&(p2 - p0)))
    }

    /// Signed distance from a point to the plane. Positive on the side the
    /// normal points to.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&(point - self.point))
    }

    /// Absolute distance from a point to the plane.
    #[must_use]
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.signed_distance(point).abs()
    }

    /// Project a point onto the plane.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Intersect the closed segment `a`–`b` with the plane.
    ///
    /// Returns `None` when both endpoints lie strictly on the same side or
    /// the segment lies in the plane.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_geometry::Plane;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let plane = Plane::new(Point3::new(0.5, 0.0, 0.0), Vector3::x()).unwrap();
    /// let hit = plane
    ///     .intersect_segment(&Point3::new(0.0, 1.0, 0.0), &Point3::new(2.0, 1.0, 0.0))
    ///     .unwrap();
    /// assert!((hit.t - 0.25).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn intersect_segment(&self, a: &Point3<f64>, b: &Point3<f64>) -> Option<SegmentHit> {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        if (da > 0.0 && db > 0.0) || (da < 0.0 && db < 0.0) {
            return None;
        }
        let denom = da - db;
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = (da / denom).clamp(0.0, 1.0);
        Some(SegmentHit {
            t,
            point: crate::polygon::lerp(a, b, t),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn xy_plane() -> Plane {
        Plane {
            point: Point3::origin(),
            normal: Vector3::z(),
        }
    }

    #[test]
    fn plane_from_three_points() {
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!(plane.is_some_and(|p| (p.normal.z - 1.0).abs() < 1e-12));
    }

    #[test]
    fn collinear_points_no_plane() {
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(plane.is_none());
        assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn signed_distance_and_projection() {
        let plane = xy_plane();
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 0.0, 5.0)), 5.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 0.0, -3.0)), -3.0);
        assert_relative_eq!(plane.distance(&Point3::new(0.0, 0.0, -3.0)), 3.0);

        let projected = plane.project(&Point3::new(3.0, 4.0, 7.0));
        assert_relative_eq!(projected, Point3::new(3.0, 4.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn segment_crossing() {
        let plane = xy_plane();
        let hit = plane.intersect_segment(&Point3::new(1.0, 1.0, -1.0), &Point3::new(1.0, 1.0, 3.0));
        let hit = hit.unwrap_or(SegmentHit {
            t: -1.0,
            point: Point3::origin(),
        });
        assert_relative_eq!(hit.t, 0.25, epsilon = 1e-12);
        assert_relative_eq!(hit.point, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn segment_misses_or_lies_in_plane() {
        let plane = xy_plane();
        assert!(
            plane
                .intersect_segment(&Point3::new(0.0, 0.0, 1.0), &Point3::new(1.0, 0.0, 2.0))
                .is_none()
        );
        assert!(
            plane
                .intersect_segment(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 0.0, 0.0))
                .is_none()
        );
    }

    #[test]
    fn endpoint_touch_counts() {
        let plane = xy_plane();
        let hit = plane.intersect_segment(&Point3::new(0.0, 0.0, 0.0), &Point3::new(0.0, 0.0, 1.0));
        assert!(hit.is_some_and(|h| h.t == 0.0));
    }
}
