//! Elastic impulse collision response
//!
//! Converts a detected contact into velocity and position updates.
//! Velocities are decomposed along the contact normal and tangent; the
//! 1D elastic collision formula (conservation of momentum and kinetic
//! energy) runs along the normal only, tangential motion is untouched
//! (frictionless). Overlap is then removed along the normal in
//! proportion to the other body's mass fraction.

use crate::maths::vector::perp;
use crate::simulation::states::Body;

use super::collider::Contact;

/// Resolve a contact between two dynamic bodies
///
/// `contact.normal` points from `a` toward `b`. Pairs already moving
/// apart along the normal are left untouched, which prevents sticking
/// and jitter on resting contacts and makes resolution idempotent
pub fn resolve_dynamic(a: &mut Body, b: &mut Body, contact: &Contact) {
    let normal = contact.normal;
    let tangent = perp(normal);

    // Relative velocity along the normal; non-negative means separating
    let relative = b.velocity - a.velocity;
    if relative.dot(&normal) >= 0.0 {
        return;
    }

    let (ma, mb) = (a.mass, b.mass);
    let total = ma + mb;

    let a_vel_tan = a.velocity.dot(&tangent);
    let b_vel_tan = b.velocity.dot(&tangent);
    let a_vel_norm = a.velocity.dot(&normal);
    let b_vel_norm = b.velocity.dot(&normal);

    // 1D elastic collision along the normal
    let a_final_norm = ((ma - mb) * a_vel_norm + 2.0 * mb * b_vel_norm) / total;
    let b_final_norm = ((mb - ma) * b_vel_norm + 2.0 * ma * a_vel_norm) / total;

    a.velocity = tangent * a_vel_tan + normal * a_final_norm;
    b.velocity = tangent * b_vel_tan + normal * b_final_norm;

    // Move the pair apart along the normal; the lighter body moves
    // further so unequal masses separate without overshoot
    let a_fraction = ma / total;
    let b_fraction = mb / total;
    a.translate(-normal * (contact.depth * b_fraction));
    b.translate(normal * (contact.depth * a_fraction));
}

/// Resolve a contact where `b` is immovable
///
/// The static partner behaves as the infinite-mass limit of the
/// elastic formula: `a`'s normal velocity reflects about the static
/// body's own (normally zero) normal velocity, and `a` absorbs the
/// entire positional correction
pub fn resolve_static(a: &mut Body, b: &Body, contact: &Contact) {
    let normal = contact.normal;
    let tangent = perp(normal);

    let relative = b.velocity - a.velocity;
    if relative.dot(&normal) >= 0.0 {
        return;
    }

    let a_vel_tan = a.velocity.dot(&tangent);
    let a_vel_norm = a.velocity.dot(&normal);
    let b_vel_norm = b.velocity.dot(&normal);

    // mb -> infinity limit of the two-body formula
    let a_final_norm = 2.0 * b_vel_norm - a_vel_norm;

    a.velocity = tangent * a_vel_tan + normal * a_final_norm;
    a.translate(-normal * contact.depth);
}
