// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stateless triangle-geometry primitives shared by normal computation and
//! operator assembly. `p` is always the "center" corner: the vertex a
//! cotangent or normal query is being asked about.

use glam::Vec3;

/// Area of the triangle `(p, q, r)`.
pub fn triangle_area(p: Vec3, q: Vec3, r: Vec3) -> f32 {
    0.5 * (q - p).cross(r - p).length()
}

/// Unit normal of the triangle `(p, q, r)`, oriented by the input winding.
/// Degenerate triangles (zero cross product) return `Vec3::ZERO` instead of
/// `NaN`; callers that sum several of these before normalizing get a
/// reduced but finite contribution rather than a poisoned accumulator.
pub fn triangle_normal(p: Vec3, q: Vec3, r: Vec3) -> Vec3 {
    let cross = (q - p).cross(r - p);
    if cross == Vec3::ZERO {
        Vec3::ZERO
    } else {
        cross.normalize()
    }
}

/// Cotangent of the angle at `p` in the triangle `(p, q, r)`.
///
/// Accumulated in `f64` by callers that sum many of these (operator
/// assembly); this function itself stays in `f32` since it mirrors the
/// per-triangle primitive, and callers widen before summing.
pub fn triangle_cot(p: Vec3, q: Vec3, r: Vec3) -> f32 {
    let a = q - p;
    let b = r - p;
    let cross_len = a.cross(b).length();
    if cross_len == 0.0 {
        0.0
    } else {
        a.dot(b) / cross_len
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn right_triangle_area_is_half_base_times_height() {
        let p = Vec3::ZERO;
        let q = Vec3::new(1.0, 0.0, 0.0);
        let r = Vec3::new(0.0, 1.0, 0.0);
        assert!((triangle_area(p, q, r) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn normal_of_xy_triangle_points_along_z() {
        let p = Vec3::ZERO;
        let q = Vec3::new(1.0, 0.0, 0.0);
        let r = Vec3::new(0.0, 1.0, 0.0);
        assert!(triangle_normal(p, q, r).abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn cot_of_right_angle_is_zero() {
        let p = Vec3::ZERO;
        let q = Vec3::new(1.0, 0.0, 0.0);
        let r = Vec3::new(0.0, 1.0, 0.0);
        assert!(triangle_cot(p, q, r).abs() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_yields_finite_sentinels() {
        let p = Vec3::ZERO;
        let q = Vec3::new(1.0, 0.0, 0.0);
        // r collinear with p, q: cross product is zero.
        let r = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(triangle_normal(p, q, r), Vec3::ZERO);
        assert_eq!(triangle_cot(p, q, r), 0.0);
    }
}
