//! Ray queries against triangles and polygon meshes.

use mesh_types::{BRepMesh, FaceId};
use nalgebra::{Point3, Vector3};

use crate::triangulate::triangulate_polygon;

/// A ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray.
    pub origin: Point3<f64>,
    /// Unit direction.
    pub direction: Vector3<f64>,
}

/// Closest face hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The face hit.
    pub face: FaceId,
    /// Distance along the ray.
    pub t: f64,
    /// Hit position.
    pub point: Point3<f64>,
}

impl Ray {
    /// Create a ray, normalizing `direction`. Returns `None` for a zero
    /// direction.
    #[must_use]
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        let direction = direction.try_normalize(f64::EPSILON)?;
        Some(Self { origin, direction })
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Two-sided Möller–Trumbore intersection with triangle `a`, `b`, `c`.
    ///
    /// Returns the distance of a hit strictly in front of the origin.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_geometry::Ray;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::new(0.2, 0.2, 5.0), -Vector3::z()).unwrap();
    /// let t = ray.intersect_triangle(
    ///     &Point3::new(0.0, 0.0, 0.0),
    ///     &Point3::new(1.0, 0.0, 0.0),
    ///     &Point3::new(0.0, 1.0, 0.0),
    /// );
    /// assert_eq!(t, Some(5.0));
    /// ```
    #[must_use]
    pub fn intersect_triangle(&self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<f64> {
        const EPSILON: f64 = 1e-12;

        let edge1 = b - a;
        let edge2 = c - a;
        let h = self.direction.cross(&edge2);
        let det = edge1.dot(&h);
        if det.abs() < EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let s = self.origin - a;
        let u = inv * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&edge1);
        let v = inv * self.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = inv * edge2.dot(&q);
        (t > EPSILON).then_some(t)
    }

    /// Closest approach between the ray and segment `a`–`b`.
    ///
    /// Returns `(ray_t, segment_t, distance)`.
    #[must_use]
    pub fn closest_to_segment(&self, a: &Point3<f64>, b: &Point3<f64>) -> (f64, f64, f64) {
        let d = b - a;
        let w = self.origin - a;
        let dd = d.dot(&d);
        let rd = self.direction.dot(&d);
        let denom = dd - rd * rd;

        let mut s = if dd < f64::EPSILON {
            0.0
        } else if denom.abs() < f64::EPSILON {
            // Parallel: project the ray origin.
            (w.dot(&d) / dd).clamp(0.0, 1.0)
        } else {
            ((w.dot(&d) - rd * self.direction.dot(&w)) / denom).clamp(0.0, 1.0)
        };
        let mut t = (a + d * s - self.origin).dot(&self.direction);
        if t < 0.0 {
            t = 0.0;
            if dd > f64::EPSILON {
                s = (w.dot(&d) / dd).clamp(0.0, 1.0);
            }
        }
        let distance = (self.at(t) - (a + d * s)).norm();
        (t, s, distance)
    }

    /// Distance from `point` to the ray, and the point's parameter along it.
    #[must_use]
    pub fn distance_to_point(&self, point: &Point3<f64>) -> (f64, f64) {
        let t = (point - self.origin).dot(&self.direction).max(0.0);
        (t, (self.at(t) - point).norm())
    }
}

/// Closest face of `mesh` hit by `ray`.
///
/// Faces are triangulated on the fly, so concave polygons are handled.
#[must_use]
pub fn raycast_mesh(mesh: &BRepMesh, ray: &Ray) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    for face in mesh.faces() {
        let Some(points) = mesh.face_positions(face.id) else {
            continue;
        };
        for [i, j, k] in triangulate_polygon(&points, 1e-9) {
            let Some(t) = ray.intersect_triangle(&points[i], &points[j], &points[k]) else {
                continue;
            };
            if best.is_none_or(|hit| t < hit.t) {
                best = Some(RayHit {
                    face: face.id,
                    t,
                    point: ray.at(t),
                });
            }
        }
    }
    best
}
