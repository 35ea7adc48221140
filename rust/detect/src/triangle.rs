// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World-space triangles and the tolerance-aware intersection test.
//!
//! The test follows the Guigue-Devillers interval scheme: classify each
//! triangle's vertices against the other's plane, then intersect the two
//! clipped segments on the plane-plane intersection line. Tolerances enter
//! as a metric band around each plane: every triangle is conceptually
//! thickened by its own tolerance along its normal, so two surfaces within
//! the combined band still intersect. Touch-only contact, such as a shared
//! vertex or an edge grazing a vertex, is filtered out.

use clash_lite_core::DecodedGeometry;
use nalgebra::{Point3, Vector3};

/// Squared normal length below which a triangle counts as zero-area.
const DEGENERATE_NORMAL_SQ: f64 = 1e-30;

/// One triangle of an element's mesh, transformed into world space.
///
/// Ephemeral: rebuilt per access, never cached beyond a single
/// intersection test.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub c: Point3<f64>,
}

impl Triangle {
    /// Creates a triangle from three world-space vertices.
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    /// Builds triangle `tri` of a mesh, applying the element's
    /// local-to-world transform to each vertex.
    pub fn from_mesh(geometry: &DecodedGeometry, tri: usize) -> Self {
        let [i0, i1, i2] = geometry.triangle_indices(tri);
        Self {
            a: geometry.transform.transform_point(&geometry.local_vertex(i0)),
            b: geometry.transform.transform_point(&geometry.local_vertex(i1)),
            c: geometry.transform.transform_point(&geometry.local_vertex(i2)),
        }
    }

    /// The three vertices.
    #[inline]
    pub fn vertices(&self) -> [Point3<f64>; 3] {
        [self.a, self.b, self.c]
    }

    /// Unnormalized plane normal (edge cross product).
    #[inline]
    fn normal_raw(&self) -> Vector3<f64> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Length of the longest edge; the size scale for relative epsilons.
    fn longest_edge(&self) -> f64 {
        let ab = (self.b - self.a).norm_squared();
        let bc = (self.c - self.b).norm_squared();
        let ca = (self.a - self.c).norm_squared();
        ab.max(bc).max(ca).sqrt()
    }

    /// True for zero-area, collinear, or non-finite triangles.
    pub fn is_degenerate(&self) -> bool {
        let finite = self
            .vertices()
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
        !finite || self.normal_raw().norm_squared() <= DEGENERATE_NORMAL_SQ
    }

    /// True when `p` lies within `tol` of this triangle's plane and its
    /// projection falls inside the triangle (boundary included).
    fn vertex_within(&self, p: &Point3<f64>, tol: f64) -> bool {
        let n = self.normal_raw();
        let n_sq = n.norm_squared();
        if n_sq <= DEGENERATE_NORMAL_SQ {
            return false;
        }
        let n = n / n_sq.sqrt();
        let dist = n.dot(&(*p - self.a));
        if dist.abs() > tol {
            return false;
        }
        let q = *p - n * dist;

        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = q - self.a;
        let d00 = v0.dot(&v0);
        let d01 = v0.dot(&v1);
        let d11 = v1.dot(&v1);
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-30 {
            return false;
        }
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;
        let slack = -1e-9;
        u >= slack && v >= slack && w >= slack
    }

    /// Tolerance-aware triangle-triangle intersection.
    ///
    /// `tol_self` thickens this triangle along its plane normal and
    /// `tol_other` thickens the other, so surfaces within the combined
    /// `tol_self + tol_other` of each other still intersect. Growing either
    /// tolerance never turns an intersecting pair into a non-intersecting
    /// one. Degenerate triangles intersect nothing, unless one of their
    /// vertices rests within the combined tolerance of the other
    /// (non-degenerate) triangle.
    pub fn intersects(&self, other: &Triangle, tol_self: f64, tol_other: f64) -> bool {
        let band = tol_self + tol_other;

        let deg_self = self.is_degenerate();
        let deg_other = other.is_degenerate();
        if deg_self || deg_other {
            let self_on_other =
                !deg_other && self.vertices().iter().any(|v| other.vertex_within(v, band));
            let other_on_self =
                !deg_self && other.vertices().iter().any(|v| self.vertex_within(v, band));
            return self_on_other || other_on_self;
        }

        let n1 = self.normal_raw().normalize();
        let n2 = other.normal_raw().normalize();

        // A hair of numeric slack keeps exact-arithmetic contact stable
        // when the run tolerance is zero.
        let scale = self.longest_edge().max(other.longest_edge());
        let eps = band + scale * 1e-12;

        // Metric signed distances of our vertices to the other plane.
        let dv = [
            n2.dot(&(self.a - other.a)),
            n2.dot(&(self.b - other.a)),
            n2.dot(&(self.c - other.a)),
        ];
        let sv = [
            classify(dv[0], eps),
            classify(dv[1], eps),
            classify(dv[2], eps),
        ];
        if sv[0] == sv[1] && sv[1] == sv[2] && sv[0] != 0 {
            return false;
        }

        let du = [
            n1.dot(&(other.a - self.a)),
            n1.dot(&(other.b - self.a)),
            n1.dot(&(other.c - self.a)),
        ];
        let su = [
            classify(du[0], eps),
            classify(du[1], eps),
            classify(du[2], eps),
        ];
        if su[0] == su[1] && su[1] == su[2] && su[0] != 0 {
            return false;
        }

        // One triangle lies entirely within the thickness band of the
        // other's plane: coplanar within tolerance.
        if sv == [0, 0, 0] || su == [0, 0, 0] {
            return coplanar_overlap(self, other, &n1);
        }

        // General position: clip both triangles against the plane-plane
        // intersection line and require the clipped intervals to overlap
        // with positive length.
        let (v, dvp) = permute(self.vertices(), sv, dv);
        let (u, dup) = permute(other.vertices(), su, du);

        let i1 = edge_plane_point(v[0], v[1], dvp[0], dvp[1]);
        let j1 = edge_plane_point(v[0], v[2], dvp[0], dvp[2]);
        let i2 = edge_plane_point(u[0], u[1], dup[0], dup[1]);
        let j2 = edge_plane_point(u[0], u[2], dup[0], dup[2]);

        let line = n1.cross(&n2);
        let (lo1, hi1) = minmax(line.dot(&i1.coords), line.dot(&j1.coords));
        let (lo2, hi2) = minmax(line.dot(&i2.coords), line.dot(&j2.coords));

        let contact = line.norm() * scale * 1e-9;
        hi1.min(hi2) - lo1.max(lo2) > contact
    }
}

/// Classifies a signed distance as below, within, or above the band.
#[inline]
fn classify(d: f64, eps: f64) -> i32 {
    if d > eps {
        1
    } else if d < -eps {
        -1
    } else {
        0
    }
}

/// Reorders vertices so the one on the minority side of the other plane
/// comes first; the interval construction clips the two edges leaving it.
fn permute(
    v: [Point3<f64>; 3],
    s: [i32; 3],
    d: [f64; 3],
) -> ([Point3<f64>; 3], [f64; 3]) {
    let lone = if s[0] > 0 {
        if s[1] > 0 {
            2
        } else if s[2] > 0 {
            1
        } else {
            0
        }
    } else if s[0] < 0 {
        if s[1] < 0 {
            2
        } else if s[2] < 0 {
            1
        } else {
            0
        }
    } else if s[1] != 0 {
        if s[2] == s[1] {
            0
        } else {
            1
        }
    } else {
        2
    };
    let (i, j, k) = (lone, (lone + 1) % 3, (lone + 2) % 3);
    ([v[i], v[j], v[k]], [d[i], d[j], d[k]])
}

/// Point where edge (a, b) meets the plane the signed distances refer to.
fn edge_plane_point(a: Point3<f64>, b: Point3<f64>, da: f64, db: f64) -> Point3<f64> {
    let denom = da - db;
    if denom.abs() < 1e-30 {
        // Edge parallel to the plane; its midpoint is as good as any.
        nalgebra::center(&a, &b)
    } else {
        a + (b - a) * (da / denom)
    }
}

#[inline]
fn minmax(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Area-overlap test for triangles coplanar within tolerance.
///
/// Projects both triangles to 2D along the dominant normal axis, then
/// checks proper edge crossings, strictly interior vertices, and
/// positive-length collinear boundary overlap (duplicate faces).
fn coplanar_overlap(t1: &Triangle, t2: &Triangle, normal: &Vector3<f64>) -> bool {
    let (ax0, ax1) = plane_axes(normal);
    let project = |p: &Point3<f64>| (p[ax0], p[ax1]);

    let a = [project(&t1.a), project(&t1.b), project(&t1.c)];
    let b = [project(&t2.a), project(&t2.b), project(&t2.c)];

    let edges_a = [(a[0], a[1]), (a[1], a[2]), (a[2], a[0])];
    let edges_b = [(b[0], b[1]), (b[1], b[2]), (b[2], b[0])];

    for &(p0, p1) in &edges_a {
        for &(q0, q1) in &edges_b {
            if segments_cross(p0, p1, q0, q1) {
                return true;
            }
        }
    }

    if b.iter().any(|&q| point_in_triangle(q, a[0], a[1], a[2])) {
        return true;
    }
    if a.iter().any(|&q| point_in_triangle(q, b[0], b[1], b[2])) {
        return true;
    }

    for &(p0, p1) in &edges_a {
        for &(q0, q1) in &edges_b {
            if collinear_overlap(p0, p1, q0, q1) {
                return true;
            }
        }
    }

    false
}

/// The two coordinate axes spanning the plane: drop the dominant axis of
/// the normal.
fn plane_axes(normal: &Vector3<f64>) -> (usize, usize) {
    let ax = normal.x.abs();
    let ay = normal.y.abs();
    let az = normal.z.abs();
    if ax >= ay && ax >= az {
        (1, 2)
    } else if ay >= az {
        (0, 2)
    } else {
        (0, 1)
    }
}

/// Proper 2D segment crossing; endpoint contact does not count.
fn segments_cross(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let ab = (b.0 - a.0, b.1 - a.1);
    let cd = (d.0 - c.0, d.1 - c.1);
    let denom = ab.0 * cd.1 - ab.1 * cd.0;
    if denom.abs() < 1e-20 {
        return false; // parallel or degenerate
    }
    let ac = (c.0 - a.0, c.1 - a.1);
    let t = (ac.0 * cd.1 - ac.1 * cd.0) / denom;
    let u = (ac.0 * ab.1 - ac.1 * ab.0) / denom;

    // Strictly interior on both segments, so a shared or coincident vertex
    // and edge-to-vertex grazing are rejected.
    let eps = 1e-8;
    t > eps && t < 1.0 - eps && u > eps && u < 1.0 - eps
}

/// Strictly interior 2D point-in-triangle test; boundary points have a
/// near-zero cross product and are rejected.
fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let cross = |o: (f64, f64), p1: (f64, f64), p2: (f64, f64)| {
        (p1.0 - o.0) * (p2.1 - o.1) - (p1.1 - o.1) * (p2.0 - o.0)
    };
    let d1 = cross(p, a, b);
    let d2 = cross(p, b, c);
    let d3 = cross(p, c, a);

    let eps = 1e-10;
    (d1 > eps && d2 > eps && d3 > eps) || (d1 < -eps && d2 < -eps && d3 < -eps)
}

/// True when two collinear 2D segments overlap with positive length.
/// Catches duplicate and boundary-coincident faces that produce no proper
/// crossing and no strictly interior vertex.
fn collinear_overlap(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let ab = (b.0 - a.0, b.1 - a.1);
    let cross = |u: (f64, f64), v: (f64, f64)| u.0 * v.1 - u.1 * v.0;
    let eps = 1e-12;

    if cross(ab, (c.0 - a.0, c.1 - a.1)).abs() > eps
        || cross(ab, (d.0 - a.0, d.1 - a.1)).abs() > eps
    {
        return false;
    }

    // Compare along the dominant axis of the shared carrier line.
    let use_x = ab.0.abs() >= ab.1.abs();
    let (a1, b1, c1, d1) = if use_x {
        (a.0, b.0, c.0, d.0)
    } else {
        (a.1, b.1, c.1, d.1)
    };
    let (min1, max1) = minmax(a1, b1);
    let (min2, max2) = minmax(c1, d1);

    max1.min(max2) - min1.max(min2) > eps
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clash_lite_core::Aabb;
    use nalgebra::Matrix4;

    fn tri(a: (f64, f64, f64), b: (f64, f64, f64), c: (f64, f64, f64)) -> Triangle {
        Triangle::new(
            Point3::new(a.0, a.1, a.2),
            Point3::new(b.0, b.1, b.2),
            Point3::new(c.0, c.1, c.2),
        )
    }

    #[test]
    fn parallel_triangles_do_not_intersect() {
        let t1 = tri((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        let t2 = tri((0.0, 0.0, 1.0), (1.0, 0.0, 1.0), (0.0, 1.0, 1.0));
        assert!(!t1.intersects(&t2, 0.0, 0.0));
    }

    #[test]
    fn crossing_triangles_intersect() {
        let t1 = tri((-1.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        let t2 = tri((0.0, 0.5, -1.0), (0.0, 0.5, 1.0), (0.0, -0.5, 0.0));
        assert!(t1.intersects(&t2, 0.0, 0.0));
        assert!(t2.intersects(&t1, 0.0, 0.0));
    }

    #[test]
    fn shared_vertex_touch_is_filtered() {
        let t1 = tri((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        let t2 = tri((0.0, 0.0, 0.0), (-1.0, 0.0, 0.0), (0.0, 0.0, 1.0));
        assert!(!t1.intersects(&t2, 0.0, 0.0));
    }

    #[test]
    fn coplanar_overlapping_triangles_intersect() {
        let t1 = tri((0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (1.0, 2.0, 0.0));
        let t2 = tri((1.0, 0.0, 0.0), (3.0, 0.0, 0.0), (2.0, 2.0, 0.0));
        assert!(t1.intersects(&t2, 0.0, 0.0));
    }

    #[test]
    fn coplanar_disjoint_triangles_do_not_intersect() {
        let t1 = tri((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        let t2 = tri((2.0, 0.0, 0.0), (3.0, 0.0, 0.0), (2.0, 1.0, 0.0));
        assert!(!t1.intersects(&t2, 0.0, 0.0));
    }

    #[test]
    fn coplanar_bowtie_touch_is_filtered() {
        let t1 = tri((0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 0.0, 0.0));
        let t2 = tri((-1.0, -1.0, 0.0), (0.0, 0.0, 0.0), (-1.0, 0.0, 0.0));
        assert!(!t1.intersects(&t2, 0.0, 0.0));
    }

    #[test]
    fn duplicate_triangles_intersect() {
        let t1 = tri((0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (0.0, 2.0, 0.0));
        let t2 = tri((0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (0.0, 2.0, 0.0));
        assert!(t1.intersects(&t2, 0.0, 0.0));
    }

    #[test]
    fn tolerance_bridges_parallel_gap() {
        let t1 = tri((0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (0.0, 2.0, 0.0));
        let t2 = tri((0.0, 0.0, 1e-7), (2.0, 0.0, 1e-7), (0.0, 2.0, 1e-7));
        assert!(!t1.intersects(&t2, 0.0, 0.0));
        assert!(t1.intersects(&t2, 1e-6, 1e-6));
        // The combined band is symmetric in the two tolerances.
        assert!(t1.intersects(&t2, 2e-6, 0.0));
    }

    #[test]
    fn tolerance_is_monotonic() {
        let crossing = (
            tri((-1.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
            tri((0.0, 0.5, -1.0), (0.0, 0.5, 1.0), (0.0, -0.5, 0.0)),
        );
        let gap = (
            tri((0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (0.0, 2.0, 0.0)),
            tri((0.0, 0.0, 1e-4), (2.0, 0.0, 1e-4), (0.0, 2.0, 1e-4)),
        );
        for eps in [0.0, 1e-6, 1e-4, 1e-2] {
            assert!(
                crossing.0.intersects(&crossing.1, eps, eps),
                "crossing pair lost at eps={eps}"
            );
        }
        let mut seen = false;
        for eps in [0.0, 1e-6, 1e-4, 1e-2] {
            let hit = gap.0.intersects(&gap.1, eps, eps);
            assert!(!seen || hit, "gap pair lost at eps={eps}");
            seen = seen || hit;
        }
        assert!(seen);
    }

    #[test]
    fn degenerate_triangle_never_crashes() {
        let t1 = tri((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        // Collinear: zero area.
        let deg = tri((0.2, 0.2, 0.5), (0.2, 0.2, 1.0), (0.2, 0.2, 1.5));
        assert!(deg.is_degenerate());
        assert!(!t1.intersects(&deg, 0.0, 0.0));
        // A vertex within the combined tolerance of the real triangle
        // still counts.
        assert!(t1.intersects(&deg, 0.3, 0.3));
        assert!(deg.intersects(&t1, 0.3, 0.3));

        let nan = tri((f64::NAN, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        assert!(nan.is_degenerate());
        assert!(!nan.intersects(&t1, 0.0, 0.0));

        let both = tri((5.0, 5.0, 5.0), (5.0, 5.0, 6.0), (5.0, 5.0, 7.0));
        assert!(!deg.intersects(&both, 1.0, 1.0));
    }

    #[test]
    fn perpendicular_sliver_within_band_intersects() {
        // A small perpendicular triangle hovering just above a large one:
        // inside the thickened slab, over the large triangle's interior.
        let t1 = tri((0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (0.0, 4.0, 0.0));
        let t2 = tri((1.0, 1.0, 1e-7), (1.2, 1.0, 2e-7), (1.1, 1.2, 2e-7));
        assert!(!t1.intersects(&t2, 0.0, 0.0));
        assert!(t1.intersects(&t2, 1e-6, 1e-6));
    }

    #[test]
    fn from_mesh_applies_transform() {
        let geometry = DecodedGeometry {
            indices: vec![0, 1, 2],
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            transform: Matrix4::new(
                1.0, 0.0, 0.0, 10.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ),
            bounds: Aabb::new(Point3::new(10.0, 0.0, 0.0), Point3::new(11.0, 1.0, 0.0)),
        };
        let t = Triangle::from_mesh(&geometry, 0);
        assert_relative_eq!(t.a, Point3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(t.b, Point3::new(11.0, 0.0, 0.0));
        assert_relative_eq!(t.c, Point3::new(10.0, 1.0, 0.0));
    }
}
