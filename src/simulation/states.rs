//! Core state types for the simulation
//!
//! Defines the central `Body` entity, the generational `BodyArena` it
//! lives in, and the `System` that owns one arena of dynamic bodies
//! plus a separate arena of static collision geometry.
//!
//! Bodies are addressed by `BodyId` (slot index + generation) so that
//! removal never invalidates other live handles; pairwise iteration
//! for forces and collisions stays a double loop over slot indices
//! `(i, j > i)` in ascending order.

use crate::collision::collider::Collider;
use crate::maths::vector::{transform_point, Vec2};

/// Mass floor below which a body is skipped by pairwise force terms
/// and by the collision pass. Keeps near-massless tracer particles
/// usable without feeding singular mass ratios into the solver
pub const MASS_FLOOR: f64 = 1e-7;

/// A 2D point particle or rigid body
///
/// `position` and `rotation` are private because mutating them must
/// invalidate the cached world-space polygon vertices; go through
/// [`Body::translate`], [`Body::move_to`] and [`Body::rotate`]
#[derive(Debug, Clone)]
pub struct Body {
    position: Vec2,
    pub velocity: Vec2,
    acceleration: Vec2, // transient accumulator, zeroed after each step
    pub mass: f64,
    pub radius: f64,
    rotation: f64,
    pub rotational_velocity: f64, // tracked, not integrated
    pub is_static: bool,
    pub can_collide: bool,
    collider: Option<Collider>,
    transformed: Vec<Vec2>,
    transform_dirty: bool,
}

impl Body {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            acceleration: Vec2::zeros(),
            mass: 1.0,
            radius: 1.0,
            rotation: 0.0,
            rotational_velocity: 0.0,
            is_static: false,
            can_collide: true,
            collider: None,
            transformed: Vec::new(),
            transform_dirty: true,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self.transform_dirty = true;
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self.transform_dirty = true;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_can_collide(mut self, can_collide: bool) -> Self {
        self.can_collide = can_collide;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    /// Move by `amount`, invalidating the vertex cache
    pub fn translate(&mut self, amount: Vec2) {
        self.position += amount;
        self.transform_dirty = true;
    }

    /// Teleport to `position`, invalidating the vertex cache
    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
        self.transform_dirty = true;
    }

    /// Rotate by `amount` radians, invalidating the vertex cache
    pub fn rotate(&mut self, amount: f64) {
        self.rotation += amount;
        self.transform_dirty = true;
    }

    /// Accumulate a force into the transient acceleration (`a += F/m`)
    /// The system zeroes the accumulator after each step
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force / self.mass;
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    pub fn clear_acceleration(&mut self) {
        self.acceleration = Vec2::zeros();
    }

    /// World-space polygon vertices, rebuilt lazily after any
    /// `translate`/`move_to`/`rotate`. Empty for non-polygon bodies
    pub fn transformed_vertices(&mut self) -> &[Vec2] {
        if self.transform_dirty {
            self.transformed.clear();
            if let Some(Collider::Polygon { vertices }) = &self.collider {
                for v in vertices {
                    self.transformed
                        .push(transform_point(*v, self.position, self.rotation));
                }
            }
            self.transform_dirty = false;
        }
        &self.transformed
    }
}

// =========================================================================================
// Body arena
// =========================================================================================

/// Stable handle to a body slot: index + generation
/// A handle to a removed body misses instead of aliasing its successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId {
    index: u32,
    generation: u32,
}

impl BodyId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Generational arena of bodies
///
/// Slots are reused in LIFO order; each removal bumps the slot
/// generation so stale `BodyId`s return `None`
#[derive(Debug, Clone, Default)]
pub struct BodyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, live or not; sizes per-slot scratch buffers
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn insert(&mut self, body: Body) -> BodyId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Remove the body behind `id`; frees the slot and bumps its
    /// generation. Stale or unknown handles return `None`
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation += 1;
        self.free.push(id.index);
        self.len -= 1;
        Some(body)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.body.as_mut()
    }

    /// Live body at a raw slot index, bypassing the generation check
    /// Used by the step loop, which works from a fresh index snapshot
    pub fn get_index_mut(&mut self, index: u32) -> Option<&mut Body> {
        self.slots.get_mut(index as usize)?.body.as_mut()
    }

    /// Live slot indices in ascending order
    ///
    /// This order is part of the contract: it fixes the tie-break for
    /// simultaneous multi-body contacts
    pub fn indices(&self) -> Vec<u32> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.body.is_some())
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Iterate live bodies in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut Body)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.body.as_mut().map(move |body| {
                (
                    BodyId {
                        index: i as u32,
                        generation,
                    },
                    body,
                )
            })
        })
    }

    /// Mutable access to two distinct live slots at once
    /// Splits the slot array so the borrows are provably disjoint
    pub fn pair_mut(&mut self, i: u32, j: u32) -> Option<(&mut Body, &mut Body)> {
        if i == j {
            return None;
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        if hi as usize >= self.slots.len() {
            return None;
        }
        let (left, right) = self.slots.split_at_mut(hi as usize);
        let lo_body = left.get_mut(lo as usize)?.body.as_mut()?;
        let hi_body = right.first_mut()?.body.as_mut()?;
        if i < j {
            Some((lo_body, hi_body))
        } else {
            Some((hi_body, lo_body))
        }
    }
}

// =========================================================================================
// System
// =========================================================================================

/// Owner of all simulation state: dynamic bodies, static collision
/// geometry, and the current simulation time `t`
///
/// Each `System` instance is independent; nothing is process-wide
#[derive(Debug, Clone, Default)]
pub struct System {
    pub dynamics: BodyArena,
    pub statics: BodyArena,
    pub t: f64,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dynamic(&mut self, body: Body) -> BodyId {
        self.dynamics.insert(body)
    }

    /// Add immovable geometry; the body is force-flagged static
    pub fn add_static(&mut self, mut body: Body) -> BodyId {
        body.is_static = true;
        self.statics.insert(body)
    }

    /// Remove a dynamic body by handle
    /// Static geometry is removed through `statics` directly
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        self.dynamics.remove(id)
    }
}
