//! World-space collision surfaces
//!
//! A [`Surface`] is one mesh triangle transformed into world space with its
//! plane equation `normal · x + origin_offset = 0` and vertical extent
//! precomputed. Surfaces are created when a surface group is built and never
//! change afterwards.

use crate::foundation::math::Vec3;

/// Below this `|normal.y|` a plane is treated as vertical and has no height
pub const MIN_HEIGHT_NORMAL_Y: f32 = 1e-4;

/// Sine of the angle between two edges below which a triangle has no normal,
/// and of the ray/plane angle below which a ray counts as parallel
const MIN_SINE: f32 = 1e-6;

/// A classified world-space triangle with precomputed plane data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// First vertex
    pub v1: Vec3,
    /// Second vertex
    pub v2: Vec3,
    /// Third vertex
    pub v3: Vec3,
    /// Unit face normal from the winding order, zero for degenerate triangles
    pub normal: Vec3,
    /// Plane offset, `-normal · v1`
    pub origin_offset: f32,
    /// Lowest vertex Y (minus any configured margin)
    pub min_y: f32,
    /// Highest vertex Y (plus any configured margin)
    pub max_y: f32,
}

impl Surface {
    /// Build a surface from three world-space vertices
    pub fn new(v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        Self::with_margin(v1, v2, v3, 0.0)
    }

    /// Build a surface whose vertical extent is widened by `margin` on each side
    pub fn with_margin(v1: Vec3, v2: Vec3, v3: Vec3, margin: f32) -> Self {
        let edge1 = v2 - v1;
        let edge2 = v3 - v1;
        let cross = edge1.cross(&edge2);
        let area = cross.magnitude();
        let normal = if area > MIN_SINE * edge1.magnitude() * edge2.magnitude() {
            cross / area
        } else {
            Vec3::zeros()
        };
        let origin_offset = -normal.dot(&v1);

        Self {
            v1,
            v2,
            v3,
            normal,
            origin_offset,
            min_y: v1.y.min(v2.y).min(v3.y) - margin,
            max_y: v1.y.max(v2.y).max(v3.y) + margin,
        }
    }

    /// Whether the triangle had zero area and so no normal
    ///
    /// Zero area is judged relative to edge length, so tiny but well-shaped
    /// triangles keep their normal.
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::zeros()
    }

    /// World Y of the triangle's plane above (x, z)
    ///
    /// Returns `None` for planes too close to vertical to solve for Y; wall
    /// surfaces always fall in that case or close to it and are never asked.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if self.normal.y.abs() < MIN_HEIGHT_NORMAL_Y {
            return None;
        }
        Some(-(x * self.normal.x + z * self.normal.z + self.origin_offset) / self.normal.y)
    }

    /// Whether (x, z) lies inside the triangle's projection onto the XZ plane
    ///
    /// Three edge-function tests in vertex order v1→v2→v3→v1. Points on an
    /// edge or vertex are inside. Only triangles wound counter-clockwise when
    /// seen from above (upward-facing) can contain anything.
    pub fn within_bound(&self, x: f32, z: f32) -> bool {
        edge_function(&self.v1, &self.v2, x, z) >= 0.0
            && edge_function(&self.v2, &self.v3, x, z) >= 0.0
            && edge_function(&self.v3, &self.v1, x, z) >= 0.0
    }

    /// Signed distance from the plane to a point
    pub fn plane_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.origin_offset
    }

    /// Möller-Trumbore ray-triangle intersection, double-sided
    ///
    /// Returns the ray parameter `t >= 0` of the hit, which is the distance
    /// along the ray when `direction` is unit length.
    pub fn intersect_ray(&self, origin: &Vec3, direction: &Vec3) -> Option<f32> {
        let edge1 = self.v2 - self.v1;
        let edge2 = self.v3 - self.v1;

        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to triangle (or degenerate triangle)
        if a.abs() <= MIN_SINE * edge1.magnitude() * edge2.magnitude() * direction.magnitude() {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v1;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t >= 0.0).then_some(t)
    }
}

/// Twice the signed area of (a, b, p) projected onto XZ
fn edge_function(a: &Vec3, b: &Vec3, x: f32, z: f32) -> f32 {
    (a.z - z) * (b.x - a.x) - (a.x - x) * (b.z - a.z)
}
