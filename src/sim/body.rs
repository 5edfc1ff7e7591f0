//! Circular bodies with Verlet-integrated motion
//!
//! Velocity is never stored: it is `pos - prev_pos`. Impulses therefore act on
//! `prev_pos`, and positional corrections act on `pos`.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::PhysicsError;
use crate::consts::*;
use crate::settings::SimSettings;

/// Registry id shared by bodies, boxes and sticks. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A simulated circle
#[derive(Debug, Clone)]
pub struct Body {
    /// Assigned on registration, cleared on removal
    id: Option<EntityId>,
    pub pos: Vec2,
    pub prev_pos: Vec2,
    /// Set by gameplay before each tick; the engine never resets it
    pub acceleration: Vec2,
    pub radius: f32,
    mass: f32,
    inv_mass: f32,
    /// Bounciness in [0, 1]
    pub restitution: f32,
    /// Coulomb coefficient, >= 0
    pub friction: f32,
    is_static: bool,
    /// Static geometry moved and must be rehashed
    static_dirty: bool,
    /// Swept out of the world at the start of the next step
    pub marked_for_removal: bool,
    /// Touched walkable ground; gameplay clears it
    pub can_jump: bool,
    /// Left out of snapshots (player-controlled bodies)
    pub transient: bool,
}

impl Body {
    /// A body at rest at `pos` with reference defaults for everything else
    pub fn new(pos: Vec2, is_static: bool, acceleration: Vec2, mass: f32) -> Self {
        Self {
            id: None,
            pos,
            prev_pos: pos,
            acceleration,
            radius: DEFAULT_RADIUS,
            mass,
            inv_mass: if is_static { 0.0 } else { 1.0 / mass },
            restitution: DEFAULT_RESTITUTION,
            friction: DEFAULT_FRICTION,
            is_static,
            static_dirty: is_static,
            marked_for_removal: false,
            can_jump: false,
            transient: false,
        }
    }

    pub fn dynamic(pos: Vec2) -> Self {
        Self::new(pos, false, Vec2::ZERO, DEFAULT_MASS)
    }

    pub fn fixed(pos: Vec2) -> Self {
        Self::new(pos, true, Vec2::ZERO, DEFAULT_MASS)
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Start moving with `vel` per tick
    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.prev_pos = self.pos - vel;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Reject parameters the solver cannot handle
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.radius > 0.0) {
            return Err(PhysicsError::InvalidBody("radius must be positive"));
        }
        if !(self.mass > 0.0) {
            return Err(PhysicsError::InvalidBody("mass must be positive"));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::InvalidBody("restitution must be in [0, 1]"));
        }
        if !(self.friction >= 0.0) {
            return Err(PhysicsError::InvalidBody("friction must be non-negative"));
        }
        Ok(())
    }

    #[inline]
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Option<EntityId>) {
        self.id = id;
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Zero for static bodies
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Implicit per-tick velocity
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.pos - self.prev_pos
    }

    /// Teleport, discarding velocity
    pub fn reset_to(&mut self, pos: Vec2) {
        self.pos = pos;
        self.prev_pos = pos;
        if self.is_static {
            self.static_dirty = true;
        }
    }

    #[inline]
    pub fn is_static_dirty(&self) -> bool {
        self.static_dirty
    }

    /// Flag moved static geometry for rehashing (no-op for dynamic bodies)
    pub fn mark_changed(&mut self) {
        if self.is_static {
            self.static_dirty = true;
        }
    }

    pub(crate) fn clear_static_dirty(&mut self) {
        self.static_dirty = false;
    }

    /// Advance one Verlet step
    pub fn integrate(&mut self, dt: f32, settings: &SimSettings) {
        if self.is_static {
            self.prev_pos = self.pos;
            return;
        }

        let old = self.pos;
        self.pos = settings.verlet_current_weight * self.pos
            - settings.verlet_previous_weight * self.prev_pos
            + self.acceleration * dt * dt;
        self.prev_pos = old;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_body_pins_velocity() {
        let settings = SimSettings::default();
        let mut body = Body::fixed(Vec2::new(5.0, 5.0));
        body.prev_pos = Vec2::new(0.0, 0.0);
        body.acceleration = Vec2::new(0.0, 10.0);

        body.integrate(1.0, &settings);
        assert_eq!(body.pos, Vec2::new(5.0, 5.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(body.inv_mass(), 0.0);
    }

    #[test]
    fn test_damped_verlet_step() {
        let settings = SimSettings::default();
        let mut body = Body::dynamic(Vec2::new(10.0, 0.0)).with_velocity(Vec2::new(1.0, 0.0));
        body.acceleration = Vec2::new(0.0, 2.0);

        body.integrate(0.5, &settings);
        // 1.994 * 10 - 0.994 * 9 + 0
        assert!((body.pos.x - 10.994).abs() < 1e-4);
        // 0 - 0 + 2 * 0.25
        assert!((body.pos.y - 0.5).abs() < 1e-5);
        assert_eq!(body.prev_pos, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_damping_bleeds_velocity() {
        let settings = SimSettings::default();
        let mut body = Body::dynamic(Vec2::ZERO).with_velocity(Vec2::new(1.0, 0.0));
        for _ in 0..100 {
            body.integrate(1.0, &settings);
        }
        let v = body.velocity().x;
        assert!(v < 1.0 && v > 0.5, "velocity {v}");
    }

    #[test]
    fn test_validate() {
        assert!(Body::dynamic(Vec2::ZERO).validate().is_ok());
        assert!(Body::dynamic(Vec2::ZERO).with_radius(0.0).validate().is_err());
        assert!(Body::dynamic(Vec2::ZERO).with_restitution(1.5).validate().is_err());
        assert!(Body::dynamic(Vec2::ZERO).with_friction(-1.0).validate().is_err());
        assert!(Body::new(Vec2::ZERO, false, Vec2::ZERO, 0.0).validate().is_err());
    }

    #[test]
    fn test_static_starts_dirty() {
        assert!(Body::fixed(Vec2::ZERO).is_static_dirty());
        assert!(!Body::dynamic(Vec2::ZERO).is_static_dirty());
    }
}
