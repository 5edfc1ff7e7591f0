//! Distance constraints ("sticks")
//!
//! A stick holds two bodies at a fixed separation. It refers to its endpoints by
//! id only; the world looks them up every pass.

use serde::{Deserialize, Serialize};

use super::body::{Body, EntityId};

/// Bilateral distance constraint between two bodies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceConstraint {
    pub a: EntityId,
    pub b: EntityId,
    /// Target separation between centers
    pub distance: f32,
}

impl DistanceConstraint {
    pub fn new(a: EntityId, b: EntityId, distance: f32) -> Self {
        Self { a, b, distance }
    }

    /// Stick holding `a` and `b` at their current separation
    pub fn between(a: &Body, b: &Body) -> Option<Self> {
        Some(Self::new(a.id()?, b.id()?, a.pos.distance(b.pos)))
    }

    #[inline]
    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }

    /// One relaxation pass. `body_a`/`body_b` must be the endpoints `a`/`b`.
    ///
    /// The correction is the unit separation scaled by twice the relative error
    /// `(len - distance) / len`, split by inverse mass; a static endpoint never moves.
    /// Endpoints must not coincide.
    pub fn relax(&self, body_a: &mut Body, body_b: &mut Body) {
        let delta = body_a.pos - body_b.pos;
        let len = delta.length();
        let ratio = (len - self.distance) / len;
        let correction = (delta / len) * (ratio * 2.0);

        let share_a = if body_a.is_static() {
            0.0
        } else if body_b.is_static() {
            1.0
        } else {
            body_a.inv_mass() / (body_a.inv_mass() + body_b.inv_mass())
        };

        if !body_a.is_static() {
            body_a.pos -= correction * share_a;
        }
        if !body_b.is_static() {
            body_b.pos += correction * (1.0 - share_a);
        }
    }
}
