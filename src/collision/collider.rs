//! Collider variants and contact data
//!
//! Shapes are a closed tagged union rather than a trait hierarchy: a
//! single dispatch function in `detect` matches exhaustively over the
//! pair of tags, so every pair combination is handled at compile time

use crate::maths::vector::Vec2;

/// Collision shape attached to a body, at most one per body
///
/// All geometry is in body-local space; world placement comes from the
/// owning body's position (and, for polygons, its rotation)
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    /// Solid disc centred on the body position
    /// The collider radius is the authoritative one in collision code;
    /// it must match the body's own `radius` when both are meaningful
    Circle { radius: f64 },

    /// Axis-aligned box centred on the body position plus `offset`
    /// Stays axis-aligned regardless of body rotation
    AxisAlignedBox { width: f64, height: f64, offset: Vec2 },

    /// Segment from `position + offset` to `position + offset + end`
    /// Used mostly as static boundary geometry; ignores body rotation
    LineSegment { end: Vec2, offset: Vec2 },

    /// Convex polygon, counter-clockwise vertices in body-local space
    /// World vertices are cached on the body and rebuilt lazily
    Polygon { vertices: Vec<Vec2> },
}

/// A detected contact between two shapes
///
/// `normal` is a unit vector oriented from the first shape toward the
/// second; `depth` is the overlap along it (zero for touch-style
/// contacts such as segment-segment crossings)
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub normal: Vec2,
    pub depth: f64,
}
