//! 2D vector and small-matrix helpers
//!
//! Thin layer over nalgebra: the `Vec2`/`Mat2`/`Mat3` aliases used
//! throughout the crate plus the handful of operations the kernel needs
//! beyond the nalgebra surface (body-space transforms, perpendiculars,
//! vertex centroids)

use nalgebra::{Matrix2, Matrix3, Vector2};

pub type Vec2 = Vector2<f64>;
pub type Mat2 = Matrix2<f64>;
pub type Mat3 = Matrix3<f64>;

/// 2x2 rotation matrix for `angle` radians (counter-clockwise)
pub fn rotation2(angle: f64) -> Mat2 {
    let (sin, cos) = angle.sin_cos();
    Mat2::new(
        cos, -sin,
        sin, cos,
    )
}

/// 3x3 homogeneous rotation matrix for `angle` radians
/// Composes with homogeneous translations via ordinary matrix multiply
pub fn rotation3(angle: f64) -> Mat3 {
    let (sin, cos) = angle.sin_cos();
    Mat3::new(
        cos, -sin, 0.0,
        sin, cos, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Rotate `v` by `rotation` radians, then translate by `position`
/// This is the local -> world transform for body-space vertices
pub fn transform_point(v: Vec2, position: Vec2, rotation: f64) -> Vec2 {
    let (sin, cos) = rotation.sin_cos();
    Vec2::new(
        (cos * v.x - sin * v.y) + position.x,
        (sin * v.x + cos * v.y) + position.y,
    )
}

/// Counter-clockwise perpendicular: (x, y) -> (-y, x)
/// Used to build the tangent direction from a contact normal
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Arithmetic mean of a vertex set
/// Callers guarantee `vertices` is non-empty
pub fn centroid(vertices: &[Vec2]) -> Vec2 {
    let mut sum = Vec2::zeros();
    for v in vertices {
        sum += *v;
    }
    sum / vertices.len() as f64
}
