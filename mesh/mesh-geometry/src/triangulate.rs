//! Polygon triangulation for buffer synthesis.
//!
//! Triangles, quads and other small polygons use a fan. Larger polygons
//! are ear-clipped in the face's own 2D frame after dropping boundary
//! vertices that lie on a straight run.

use nalgebra::{Point2, Point3, Vector3};
use tracing::warn;

use crate::polygon::{centroid, newell_normal, project_to_plane};

/// Triangulate a polygon given by its corner positions.
///
/// Returns triangles as indices into `points`, wound like the polygon.
/// Polygons with four or fewer corners are fanned from corner 0.
/// `collinear_epsilon` bounds the cross product of unit edge directions
/// below which a corner counts as straight and is skipped.
///
/// # Example
///
/// ```
/// use mesh_geometry::triangulate_polygon;
/// use nalgebra::Point3;
///
/// // An L-shaped hexagon.
/// let l_shape = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
/// ];
/// let triangles = triangulate_polygon(&l_shape, 1e-6);
/// assert_eq!(triangles.len(), 4);
/// ```
#[must_use]
pub fn triangulate_polygon(points: &[Point3<f64>], collinear_epsilon: f64) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    if n <= 4 {
        return fan(&(0..n).collect::<Vec<_>>());
    }

    let remaining = drop_collinear(points, collinear_epsilon);
    if remaining.len() < 3 {
        return fan(&(0..n).collect::<Vec<_>>());
    }

    let normal = newell_normal(points);
    ear_clip(points, remaining, &normal)
}

/// Fan triangulation of an index loop around its first entry.
fn fan(indices: &[usize]) -> Vec<[usize; 3]> {
    (1..indices.len().saturating_sub(1))
        .map(|i| [indices[0], indices[i], indices[i + 1]])
        .collect()
}

/// Indices of the corners that are not on a straight run.
fn drop_collinear(points: &[Point3<f64>], epsilon: f64) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut i = 0;
    while remaining.len() > 3 && i < remaining.len() {
        let len = remaining.len();
        let prev = points[remaining[(i + len - 1) % len]];
        let curr = points[remaining[i]];
        let next = points[remaining[(i + 1) % len]];

        let straight = match ((curr - prev).try_normalize(f64::EPSILON), (next - curr).try_normalize(f64::EPSILON)) {
            (Some(a), Some(b)) => a.cross(&b).norm() < epsilon && a.dot(&b) > 0.0,
            // Coincident corners carry no area either.
            _ => true,
        };
        if straight {
            remaining.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
    remaining
}

fn ear_clip(points: &[Point3<f64>], mut remaining: Vec<usize>, normal: &Vector3<f64>) -> Vec<[usize; 3]> {
    let origin = centroid(points);
    let flat = project_to_plane(points, &origin, normal);

    let mut triangles = Vec::with_capacity(remaining.len().saturating_sub(2));
    while remaining.len() > 3 {
        let len = remaining.len();
        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let curr = remaining[i];
            let next = remaining[(i + 1) % len];
            is_ear(&flat, &remaining, prev, curr, next)
        });

        let Some(i) = ear else {
            warn!(
                remaining = remaining.len(),
                "Ear clipping stuck, using fan triangulation"
            );
            break;
        };
        let len = remaining.len();
        triangles.push([
            remaining[(i + len - 1) % len],
            remaining[i],
            remaining[(i + 1) % len],
        ]);
        remaining.remove(i);
    }

    triangles.extend(fan(&remaining));
    triangles
}

fn cross2(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b - a).perp(&(c - a))
}

fn is_ear(flat: &[Point2<f64>], remaining: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (&flat[prev], &flat[curr], &flat[next]);
    // The projection frame follows the Newell normal, so convex corners
    // turn counter-clockwise.
    if cross2(a, b, c) <= f64::EPSILON {
        return false;
    }
    remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .all(|&idx| {
            let p = &flat[idx];
            p == a || p == b || p == c || !point_in_triangle(p, a, b, c)
        })
}

fn point_in_triangle(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    let d1 = cross2(a, b, p);
    let d2 = cross2(b, c, p);
    let d3 = cross2(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
