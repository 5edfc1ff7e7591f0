//! Verlet Arena - a small 2D physics engine for circle-and-box games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, sticks, spatial hash, collisions, world)
//! - `settings`: Tunable simulation constants
//! - `persistence`: Engine-owned snapshot records and JSON helpers
//! - `timestep`: Fixed timestep accumulator for host frame loops

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod timestep;

pub use error::PhysicsError;
pub use settings::SimSettings;
pub use timestep::FixedTimestep;

use glam::{IVec2, Vec2};

/// Engine configuration constants
pub mod consts {
    use glam::Vec2;

    /// Reference tick rate (ticks per second)
    pub const TICKS_PER_SECOND: f32 = 60.0;
    /// Fixed simulation timestep, in milliseconds
    pub const SIM_DT: f32 = 1000.0 / TICKS_PER_SECOND;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Nominal body radius; also the spatial hash cell size
    pub const DEFAULT_RADIUS: f32 = 20.0;
    pub const DEFAULT_MASS: f32 = 1.0;
    pub const DEFAULT_RESTITUTION: f32 = 0.0;
    pub const DEFAULT_FRICTION: f32 = 1.0;

    /// Verlet weights: x' = 1.994 x - 0.994 x_prev + a dt².
    /// Ideal Verlet is 2 / 1; the difference is global velocity damping.
    pub const VERLET_CURRENT_WEIGHT: f32 = 1.994;
    pub const VERLET_PREVIOUS_WEIGHT: f32 = 0.994;

    /// Gauss-Seidel passes over all sticks per tick
    pub const CONSTRAINT_ITERATIONS: u32 = 8;

    /// Below this separation two shapes count as coincident
    pub const OVERLAP_EPSILON: f32 = 0.0001;
    /// Push applied to coincident circles
    pub const DEGENERATE_SEPARATION: f32 = 0.01;
    /// Extra clearance when a circle center ends up inside a box
    pub const BOX_NUDGE: f32 = 0.01;
    /// A box contact normal with y below this counts as standing on ground
    pub const GROUND_NORMAL_Y: f32 = -0.8;

    /// Gravity given to dynamic bodies restored from a snapshot (px/ms²)
    pub const RESTORE_GRAVITY: Vec2 = Vec2::new(0.0, 0.0001);
}

/// Rotate a vector by 90 degrees (counter-clockwise in y-up space)
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Unit vector pointing at `angle` radians
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Closest point of the rectangle `[min, min + size]` to `p`
#[inline]
pub fn closest_point_on_rect(p: Vec2, min: Vec2, size: Vec2) -> Vec2 {
    p.clamp(min, min + size)
}

/// Inclusive range of grid cells touched by the square of half-extent `radius` around `center`
#[inline]
pub fn cell_range(center: Vec2, radius: f32, inv_cell_size: f32) -> (IVec2, IVec2) {
    let min = ((center - Vec2::splat(radius)) * inv_cell_size).floor();
    let max = ((center + Vec2::splat(radius)) * inv_cell_size).floor();
    (min.as_ivec2(), max.as_ivec2())
}
