//! World-space transform for drawable entities.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Position, rotation, and scale of an entity in world space.
///
/// Mutated by gameplay code between frames; the render pipeline reads it
/// once per frame to place the entity's quad. Rotation is in radians,
/// counter-clockwise.
#[derive(Component, Clone, Copy, Debug)]
pub struct Transform2D {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}
