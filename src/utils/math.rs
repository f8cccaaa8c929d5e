// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Direction substituted for a normal with zero length
pub const DEFAULT_NORMAL: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// Unnormalized normal of a triangle: `(p1 - p0) x (p2 - p0)`.
/// Its length is twice the triangle's area; zero for degenerate triangles.
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    v1.cross(&v2)
}

/// Unit vector along `v`, or [`DEFAULT_NORMAL`] when `v` has zero length
pub fn normalize_or_default(v: &Vector3<f64>) -> Vector3<f64> {
    let norm = v.norm();
    if norm == 0.0 {
        DEFAULT_NORMAL
    } else {
        v / norm
    }
}

/// Apply a 4x4 matrix to `(x, y, z, 1)` and keep the first three components.
/// No perspective divide: the bottom row is ignored.
pub fn transform_point(matrix: &Matrix4<f64>, p: &Point3<f64>) -> Point3<f64> {
    let h = matrix * p.to_homogeneous();
    Point3::new(h.x, h.y, h.z)
}

/// Apply only the upper-left 3x3 block of a 4x4 matrix to a direction
pub fn transform_direction(linear: &Matrix3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    linear * v
}
