//! Simulation settings
//!
//! Every tunable of the reference behaviour. Gameplay feel depends on the exact
//! defaults, so change them deliberately.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::PhysicsError;
use crate::consts::*;

/// Engine settings, fixed for the lifetime of a `World`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    // === Integration ===
    /// Weight of the current position in the Verlet update
    pub verlet_current_weight: f32,
    /// Weight of the previous position in the Verlet update
    pub verlet_previous_weight: f32,

    // === Constraints ===
    /// Relaxation passes over all sticks per tick
    pub constraint_iterations: u32,

    // === Broad phase ===
    /// Spatial hash cell size (nominal dynamic body radius)
    pub cell_size: f32,

    // === Narrow phase ===
    /// Separation below which shapes count as coincident
    pub overlap_epsilon: f32,
    /// Random push applied to coincident circles
    pub degenerate_separation: f32,
    /// Extra clearance when a circle center lands inside a box
    pub box_nudge: f32,
    /// Box normals with y below this set `can_jump`
    pub ground_normal_y: f32,

    // === Restore ===
    /// Acceleration given to dynamic bodies restored from a snapshot
    pub restore_gravity: Vec2,

    /// Seed for the degenerate-overlap RNG
    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            verlet_current_weight: VERLET_CURRENT_WEIGHT,
            verlet_previous_weight: VERLET_PREVIOUS_WEIGHT,

            constraint_iterations: CONSTRAINT_ITERATIONS,

            cell_size: DEFAULT_RADIUS,

            overlap_epsilon: OVERLAP_EPSILON,
            degenerate_separation: DEGENERATE_SEPARATION,
            box_nudge: BOX_NUDGE,
            ground_normal_y: GROUND_NORMAL_Y,

            restore_gravity: RESTORE_GRAVITY,

            seed: 0,
        }
    }
}

impl SimSettings {
    /// Default settings with a specific RNG seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        let settings: Self = serde_json::from_str(json)?;
        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Parse settings from JSON, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Invalid settings ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, PhysicsError> {
        Ok(serde_json::to_string(self)?)
    }

    #[inline]
    pub fn inv_cell_size(&self) -> f32 {
        1.0 / self.cell_size
    }
}
