//! Shape-pair collision detection
//!
//! A single dispatch function matches exhaustively over the pair of
//! collider tags. Bodies without a collider are treated as circles of
//! the body radius, which is how bare particles collide.
//!
//! Returned contact normals always point from the first body toward
//! the second; symmetric arms run the canonical test and flip.

use crate::maths::geometry::{closest_point_on_segment, project_onto_axis, segment_intersection};
use crate::maths::vector::{centroid, perp, Vec2};
use crate::simulation::states::Body;

use super::collider::{Collider, Contact};

/// Shape tag used for pair dispatch; `None` colliders read as circles
#[derive(Clone, Copy)]
enum Kind {
    Circle,
    Box,
    Segment,
    Polygon,
}

fn kind(body: &Body) -> Kind {
    match body.collider() {
        None | Some(Collider::Circle { .. }) => Kind::Circle,
        Some(Collider::AxisAlignedBox { .. }) => Kind::Box,
        Some(Collider::LineSegment { .. }) => Kind::Segment,
        Some(Collider::Polygon { .. }) => Kind::Polygon,
    }
}

/// Effective circle radius: the collider's when present, else the body's
fn circle_radius(body: &Body) -> f64 {
    match body.collider() {
        Some(Collider::Circle { radius }) => *radius,
        _ => body.radius,
    }
}

/// World-space box bounds (min, max)
fn box_bounds(body: &Body) -> (Vec2, Vec2) {
    match body.collider() {
        Some(Collider::AxisAlignedBox {
            width,
            height,
            offset,
        }) => {
            let center = body.position() + *offset;
            let half = Vec2::new(width / 2.0, height / 2.0);
            (center - half, center + half)
        }
        _ => (body.position(), body.position()),
    }
}

/// World-space box corners, counter-clockwise from the top-left
fn box_corners(body: &Body) -> [Vec2; 4] {
    let (min, max) = box_bounds(body);
    [
        Vec2::new(min.x, max.y),
        Vec2::new(max.x, max.y),
        Vec2::new(max.x, min.y),
        Vec2::new(min.x, min.y),
    ]
}

/// World-space segment endpoints
fn segment_points(body: &Body) -> [Vec2; 2] {
    match body.collider() {
        Some(Collider::LineSegment { end, offset }) => {
            let start = body.position() + *offset;
            [start, start + *end]
        }
        _ => [body.position(), body.position()],
    }
}

/// Test two bodies for contact
///
/// Takes both bodies mutably because reading a polygon's world
/// vertices refreshes its lazy transform cache
pub fn detect(a: &mut Body, b: &mut Body) -> Option<Contact> {
    match (kind(a), kind(b)) {
        (Kind::Circle, Kind::Circle) => {
            circle_circle(a.position(), circle_radius(a), b.position(), circle_radius(b))
        }
        (Kind::Circle, Kind::Box) => {
            let (min, max) = box_bounds(b);
            if !circle_box_broad(a.position(), circle_radius(a), min, max) {
                return None;
            }
            circle_polygon(a.position(), circle_radius(a), &box_corners(b))
        }
        (Kind::Box, Kind::Circle) => {
            let (min, max) = box_bounds(a);
            if !circle_box_broad(b.position(), circle_radius(b), min, max) {
                return None;
            }
            flip(circle_polygon(
                b.position(),
                circle_radius(b),
                &box_corners(a),
            ))
        }
        (Kind::Circle, Kind::Segment) => {
            let [s1, s2] = segment_points(b);
            circle_segment(a.position(), circle_radius(a), s1, s2)
        }
        (Kind::Segment, Kind::Circle) => {
            let [s1, s2] = segment_points(a);
            flip(circle_segment(b.position(), circle_radius(b), s1, s2))
        }
        (Kind::Circle, Kind::Polygon) => {
            let center = a.position();
            let radius = circle_radius(a);
            circle_polygon(center, radius, b.transformed_vertices())
        }
        (Kind::Polygon, Kind::Circle) => {
            let center = b.position();
            let radius = circle_radius(b);
            flip(circle_polygon(center, radius, a.transformed_vertices()))
        }
        (Kind::Box, Kind::Box) => {
            let (min_a, max_a) = box_bounds(a);
            let (min_b, max_b) = box_bounds(b);
            aabb_aabb(min_a, max_a, min_b, max_b)
        }
        // Everything else reduces to the separating-axis test over
        // world vertex lists (a segment is a two-vertex list)
        (Kind::Box, Kind::Segment) => sat(&box_corners(a), &segment_points(b)),
        (Kind::Segment, Kind::Box) => sat(&segment_points(a), &box_corners(b)),
        (Kind::Box, Kind::Polygon) => {
            let corners = box_corners(a);
            sat(&corners, b.transformed_vertices())
        }
        (Kind::Polygon, Kind::Box) => {
            let corners = box_corners(b);
            sat(a.transformed_vertices(), &corners)
        }
        (Kind::Segment, Kind::Segment) => {
            let [p1, p2] = segment_points(a);
            let [q1, q2] = segment_points(b);
            segment_segment(p1, p2, q1, q2)
        }
        (Kind::Segment, Kind::Polygon) => {
            let points = segment_points(a);
            sat(&points, b.transformed_vertices())
        }
        (Kind::Polygon, Kind::Segment) => {
            let points = segment_points(b);
            sat(a.transformed_vertices(), &points)
        }
        (Kind::Polygon, Kind::Polygon) => {
            // Disjoint borrows: the cache refresh on `a` stays live
            // while `b` refreshes its own
            let va: &[Vec2] = a.transformed_vertices();
            let vb: &[Vec2] = b.transformed_vertices();
            sat(va, vb)
        }
    }
}

fn flip(contact: Option<Contact>) -> Option<Contact> {
    contact.map(|c| Contact {
        normal: -c.normal,
        depth: c.depth,
    })
}

/// Broad phase for the circle-box pair: the circle's bounding square
/// against the box. Cheap rejection before the per-edge narrow phase
fn circle_box_broad(center: Vec2, radius: f64, min: Vec2, max: Vec2) -> bool {
    center.x + radius >= min.x
        && center.x - radius <= max.x
        && center.y + radius >= min.y
        && center.y - radius <= max.y
}

// =========================================================================================
// Pair tests
// =========================================================================================

/// Circles overlap iff center distance is strictly below the radius sum
fn circle_circle(ca: Vec2, ra: f64, cb: Vec2, rb: f64) -> Option<Contact> {
    let radii = ra + rb;
    let delta = cb - ca;
    let distance = delta.norm();
    if distance >= radii {
        return None;
    }

    // Coincident centers have no meaningful direction; fall back to +x
    let normal = if distance > 0.0 {
        delta / distance
    } else {
        Vec2::new(1.0, 0.0)
    };

    Some(Contact {
        normal,
        depth: radii - distance,
    })
}

/// Circle against a segment via the clamped closest point
/// Normal oriented from the circle toward the segment
fn circle_segment(center: Vec2, radius: f64, s1: Vec2, s2: Vec2) -> Option<Contact> {
    let closest = closest_point_on_segment(center, s1, s2);
    let delta = closest - center;
    let dist2 = delta.norm_squared();
    if dist2 > radius * radius {
        return None;
    }

    let distance = dist2.sqrt();
    let normal = if distance > 0.0 {
        delta / distance
    } else {
        // Center exactly on the segment: push out perpendicular to it
        let along = s2 - s1;
        if along.norm_squared() > 0.0 {
            perp(along).normalize()
        } else {
            Vec2::new(1.0, 0.0)
        }
    };

    Some(Contact {
        normal,
        depth: radius - distance,
    })
}

/// Circle against a closed vertex loop: nearest point over every edge
/// Covers both circle-polygon and the box narrow phase (a box is its
/// four-corner loop). Normal oriented from the circle toward the shape
fn circle_polygon(center: Vec2, radius: f64, vertices: &[Vec2]) -> Option<Contact> {
    if vertices.is_empty() {
        return None;
    }

    let mut best = vertices[0];
    let mut best_dist2 = f64::INFINITY;
    for i in 0..vertices.len() {
        let e1 = vertices[i];
        let e2 = vertices[(i + 1) % vertices.len()];
        let closest = closest_point_on_segment(center, e1, e2);
        let dist2 = (closest - center).norm_squared();
        if dist2 < best_dist2 {
            best_dist2 = dist2;
            best = closest;
        }
    }

    if best_dist2 > radius * radius {
        return None;
    }

    let distance = best_dist2.sqrt();
    let normal = if distance > 0.0 {
        (best - center) / distance
    } else {
        let direction = centroid(vertices) - center;
        if direction.norm_squared() > 0.0 {
            direction.normalize()
        } else {
            Vec2::new(1.0, 0.0)
        }
    };

    Some(Contact {
        normal,
        depth: radius - distance,
    })
}

/// Interval-overlap test on both axes; separation on either axis means
/// no contact. Exact edge-to-edge touch reports no collision
fn aabb_aabb(min_a: Vec2, max_a: Vec2, min_b: Vec2, max_b: Vec2) -> Option<Contact> {
    let overlap_x = max_a.x.min(max_b.x) - min_a.x.max(min_b.x);
    let overlap_y = max_a.y.min(max_b.y) - min_a.y.max(min_b.y);
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }

    // Push out along the axis of minimum overlap, toward B
    let center_a = (min_a + max_a) / 2.0;
    let center_b = (min_b + max_b) / 2.0;
    let (normal, depth) = if overlap_x < overlap_y {
        let sign = if center_b.x >= center_a.x { 1.0 } else { -1.0 };
        (Vec2::new(sign, 0.0), overlap_x)
    } else {
        let sign = if center_b.y >= center_a.y { 1.0 } else { -1.0 };
        (Vec2::new(0.0, sign), overlap_y)
    };

    Some(Contact { normal, depth })
}

/// Separating-axis test over two world vertex lists
///
/// Projects both shapes onto every edge normal of A then of B; any
/// separating axis (touching projections included) means no contact.
/// Otherwise the axis of minimum overlap supplies depth and normal,
/// oriented from A's centroid toward B's centroid
fn sat(va: &[Vec2], vb: &[Vec2]) -> Option<Contact> {
    if va.is_empty() || vb.is_empty() {
        return None;
    }

    let mut normal = Vec2::zeros();
    let mut depth = f64::INFINITY;

    for verts in [va, vb] {
        for i in 0..verts.len() {
            let edge = verts[(i + 1) % verts.len()] - verts[i];
            let axis = perp(edge);
            if axis.norm_squared() == 0.0 {
                continue; // repeated vertex, no axis
            }

            let (min_a, max_a) = project_onto_axis(va, axis);
            let (min_b, max_b) = project_onto_axis(vb, axis);
            if min_a >= max_b || min_b >= max_a {
                return None;
            }

            let axis_depth = (max_b - min_a).min(max_a - min_b);
            if axis_depth < depth {
                depth = axis_depth;
                normal = axis;
            }
        }
    }

    // Axes were unnormalized; rescale the depth and the normal together
    let length = normal.norm();
    if length == 0.0 {
        return None;
    }
    depth /= length;
    normal /= length;

    let direction = centroid(vb) - centroid(va);
    if direction.dot(&normal) < 0.0 {
        normal = -normal;
    }

    Some(Contact { normal, depth })
}

/// Segment crossing via the 2x2 linear solve, zero-depth contact
/// Normal is perpendicular to B's segment, oriented toward B's midpoint
fn segment_segment(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> Option<Contact> {
    segment_intersection(p1, p2, q1, q2)?;

    let mut normal = perp(q2 - q1).normalize();
    let direction = (q1 + q2) / 2.0 - (p1 + p2) / 2.0;
    if direction.dot(&normal) < 0.0 {
        normal = -normal;
    }

    Some(Contact { normal, depth: 0.0 })
}
