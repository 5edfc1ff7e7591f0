//! Static axis-aligned box colliders

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Immovable rectangle spanning `[x, x + width] × [y, y + height]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Surface pattern name, only meaningful to renderers
    pub pattern: String,
}

impl BoxCollider {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            pattern: "floor".to_string(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min() + self.size()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min()).all() && p.cmple(self.max()).all()
    }
}
