//! Screen-aligned cutting planes for the knife tool.
//!
//! A knife segment drawn on screen sweeps a plane through the scene: it
//! contains the segment and the viewing direction. Every visible mesh edge
//! crossing that plane within the segment's screen extent becomes a cut
//! point.

use hashbrown::HashSet;
use mesh_types::{BRepMesh, EdgeId};
use nalgebra::{Matrix4, Orthographic3, Perspective3, Point2, Point3, Vector3, Vector4};
use tracing::debug;

use crate::error::{GeometryError, GeometryResult};
use crate::plane::Plane;
use crate::polygon::midpoint;
use crate::ray::{Ray, raycast_mesh};

/// Tolerances of the knife intersection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnifeParams {
    /// Hits closer than this (world units) collapse into one.
    pub dedupe_epsilon: f64,
    /// Offset of the occlusion ray's origin toward the camera.
    pub occlusion_epsilon: f64,
    /// Slack on the `[0, 1]` screen-extent test.
    pub extent_epsilon: f64,
}

impl Default for KnifeParams {
    fn default() -> Self {
        Self {
            dedupe_epsilon: 1e-4,
            occlusion_epsilon: 1e-4,
            extent_epsilon: 1e-6,
        }
    }
}

impl KnifeParams {
    /// Create params with default tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dedupe distance.
    #[must_use]
    pub const fn with_dedupe_epsilon(mut self, epsilon: f64) -> Self {
        self.dedupe_epsilon = epsilon;
        self
    }

    /// Set the occlusion ray offset.
    #[must_use]
    pub const fn with_occlusion_epsilon(mut self, epsilon: f64) -> Self {
        self.occlusion_epsilon = epsilon;
        self
    }

    /// Set the screen-extent slack.
    #[must_use]
    pub const fn with_extent_epsilon(mut self, epsilon: f64) -> Self {
        self.extent_epsilon = epsilon;
        self
    }
}

/// Camera the knife is drawn through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnifeView {
    /// Projection times view matrix, world to clip space.
    pub view_projection: Matrix4<f64>,
    /// Camera position.
    pub eye: Point3<f64>,
    /// Unit viewing direction.
    pub forward: Vector3<f64>,
    /// Parallel projection: every view ray shares `forward`.
    pub orthographic: bool,
}

impl KnifeView {
    /// Perspective camera looking from `eye` at `target`.
    ///
    /// `fovy` is the vertical field of view in radians.
    #[must_use]
    pub fn perspective(eye: Point3<f64>, target: Point3<f64>, up: Vector3<f64>, fovy: f64, aspect: f64) -> Self {
        let view = Matrix4::look_at_rh(&eye, &target, &up);
        let projection = Perspective3::new(aspect, fovy, 0.01, 1000.0).to_homogeneous();
        Self {
            view_projection: projection * view,
            eye,
            forward: (target - eye).normalize(),
            orthographic: false,
        }
    }

    /// Orthographic camera looking from `eye` at `target`, showing
    /// `half_height` world units above and below the view center.
    #[must_use]
    pub fn orthographic(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        half_height: f64,
        aspect: f64,
    ) -> Self {
        let view = Matrix4::look_at_rh(&eye, &target, &up);
        let half_width = half_height * aspect;
        let projection =
            Orthographic3::new(-half_width, half_width, -half_height, half_height, 0.01, 1000.0).to_homogeneous();
        Self {
            view_projection: projection * view,
            eye,
            forward: (target - eye).normalize(),
            orthographic: true,
        }
    }

    /// Normalized device coordinates of `point`, or `None` behind the
    /// camera.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        let clip = self.view_projection * point.to_homogeneous();
        if clip.w <= f64::EPSILON {
            return None;
        }
        Some(Point2::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Direction of the view ray through `point`.
    #[must_use]
    pub fn view_direction(&self, point: &Point3<f64>) -> Vector3<f64> {
        if self.orthographic {
            return self.forward;
        }
        (point - self.eye)
            .try_normalize(f64::EPSILON)
            .unwrap_or(self.forward)
    }

    /// World-space ray through a point given in normalized device
    /// coordinates.
    #[must_use]
    pub fn ray_through(&self, ndc: &Point2<f64>) -> Option<Ray> {
        let inverse = self.view_projection.try_inverse()?;
        let unproject = |z: f64| {
            let h = inverse * Vector4::new(ndc.x, ndc.y, z, 1.0);
            (h.w.abs() > f64::EPSILON).then(|| Point3::new(h.x / h.w, h.y / h.w, h.z / h.w))
        };
        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;
        Ray::new(near, far - near)
    }

    /// Whether the mesh blocks the line of sight from `point` to the camera.
    fn is_occluded(&self, mesh: &BRepMesh, point: &Point3<f64>, epsilon: f64) -> bool {
        let (direction, reach) = if self.orthographic {
            (-self.forward, f64::INFINITY)
        } else {
            let to_eye = self.eye - point;
            (to_eye, to_eye.norm())
        };
        let Some(probe) = Ray::new(*point, direction) else {
            return false;
        };
        let origin = probe.at(epsilon);
        let Some(ray) = Ray::new(origin, probe.direction) else {
            return false;
        };
        raycast_mesh(mesh, &ray).is_some_and(|hit| hit.t < reach - epsilon)
    }
}

/// A mesh edge crossed by the cutting plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    /// The crossed edge.
    pub edge: EdgeId,
    /// Parameter from the edge's `v1` to `v2`.
    pub t: f64,
    /// Crossing position.
    pub point: Point3<f64>,
}

/// Plane swept by the screen segment `a`–`b`.
///
/// The plane contains the segment and the view direction at its midpoint.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateCutPlane`] when the segment has no
/// length or runs along the view direction.
pub fn cut_plane(a: &Point3<f64>, b: &Point3<f64>, view: &KnifeView) -> GeometryResult<Plane> {
    let direction = b - a;
    let normal = direction.cross(&view.view_direction(&midpoint(a, b)));
    if normal.norm() < 1e-12 {
        return Err(GeometryError::DegenerateCutPlane);
    }
    Plane::new(*a, normal).ok_or(GeometryError::DegenerateCutPlane)
}

/// Visible edge crossings of the knife segment `a`–`b`, ordered by
/// distance from `a`.
///
/// Edges in `skip` are ignored. Crossings hidden behind the mesh or
/// projecting outside the segment's screen extent are dropped, and
/// crossings closer together than `dedupe_epsilon` collapse into the first.
///
/// # Errors
///
/// Returns [`GeometryError::DegenerateCutPlane`] if the segment defines no
/// plane or has no extent on screen.
pub fn knife_intersections(
    mesh: &BRepMesh,
    a: &Point3<f64>,
    b: &Point3<f64>,
    view: &KnifeView,
    skip: &HashSet<EdgeId>,
    params: &KnifeParams,
) -> GeometryResult<Vec<EdgeHit>> {
    let plane = cut_plane(a, b, view)?;
    let (Some(sa), Some(sb)) = (view.project(a), view.project(b)) else {
        return Err(GeometryError::DegenerateCutPlane);
    };
    let screen = sb - sa;
    let screen_len2 = screen.norm_squared();
    if screen_len2 < 1e-18 {
        return Err(GeometryError::DegenerateCutPlane);
    }

    let mut hits = Vec::new();
    for edge in mesh.edges() {
        if skip.contains(&edge.id) {
            continue;
        }
        let (Some(p1), Some(p2)) = (mesh.position(edge.v1), mesh.position(edge.v2)) else {
            continue;
        };
        let Some(crossing) = plane.intersect_segment(&p1, &p2) else {
            continue;
        };

        let Some(projected) = view.project(&crossing.point) else {
            continue;
        };
        let s = (projected - sa).dot(&screen) / screen_len2;
        if s < -params.extent_epsilon || s > 1.0 + params.extent_epsilon {
            continue;
        }
        if view.is_occluded(mesh, &crossing.point, params.occlusion_epsilon) {
            continue;
        }

        hits.push(EdgeHit {
            edge: edge.id,
            t: crossing.t,
            point: crossing.point,
        });
    }

    hits.sort_by(|x, y| {
        (x.point - a)
            .norm()
            .partial_cmp(&(y.point - a).norm())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut kept: Vec<EdgeHit> = Vec::with_capacity(hits.len());
    for hit in hits {
        if kept
            .iter()
            .all(|k| (k.point - hit.point).norm() >= params.dedupe_epsilon)
        {
            kept.push(hit);
        }
    }

    debug!(hits = kept.len(), "Knife segment intersections");
    Ok(kept)
}
