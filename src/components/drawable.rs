//! Drawable component: what an entity looks like on screen.
//!
//! A [`Drawable`] carries the attributes shared by every 2D primitive
//! (visibility, color, layer, size) plus a [`DrawableShape`] discriminant
//! for the closed set of shapes the pipeline knows how to batch. Shape
//! dispatch is a plain `match` in the hot path, never a downcast.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::color::Rgba;
use crate::render::batch::VertexLayout;

/// Normalized texture rectangle, top-left `(u0,v0)` to bottom-right `(u1,v1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// The full unit rectangle, used when a sprite has no explicit frame.
    pub const FULL: UvRect = UvRect {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    pub fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Closed set of shapes the batch pipeline renders.
#[derive(Clone, Debug)]
pub enum DrawableShape {
    /// Textured quad. `tex_key` is resolved through the
    /// [`TextureStore`](crate::resources::texturestore::TextureStore) each
    /// frame; an unresolvable key renders as an untextured quad.
    Sprite { tex_key: String, uv: UvRect },
    /// Solid-color quad, no texture.
    Rectangle,
}

/// Per-entity render attributes consumed by the batch pipeline.
#[derive(Component, Clone, Debug)]
pub struct Drawable {
    /// Invisible entities are skipped during collection, without logging.
    pub visible: bool,
    pub color: Rgba,
    /// Paint order. Lower layers draw first (underneath).
    pub layer: i32,
    /// Quad size in world units before the entity's scale is applied.
    pub size: Vec2,
    pub shape: DrawableShape,
}

impl Drawable {
    pub fn sprite(tex_key: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            visible: true,
            color: Rgba::WHITE,
            layer: 0,
            size: Vec2::new(width, height),
            shape: DrawableShape::Sprite {
                tex_key: tex_key.into(),
                uv: UvRect::FULL,
            },
        }
    }

    pub fn rectangle(width: f32, height: f32, color: Rgba) -> Self {
        Self {
            visible: true,
            color,
            layer: 0,
            size: Vec2::new(width, height),
            shape: DrawableShape::Rectangle,
        }
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the sprite's source frame. No effect on rectangles.
    pub fn with_uv(mut self, uv: UvRect) -> Self {
        if let DrawableShape::Sprite { uv: slot, .. } = &mut self.shape {
            *slot = uv;
        }
        self
    }

    /// The UV rectangle to pack, defaulting to the full unit rect.
    pub fn uv(&self) -> UvRect {
        match &self.shape {
            DrawableShape::Sprite { uv, .. } => *uv,
            DrawableShape::Rectangle => UvRect::FULL,
        }
    }

    /// Texture key for sprites, `None` for untextured shapes.
    pub fn tex_key(&self) -> Option<&str> {
        match &self.shape {
            DrawableShape::Sprite { tex_key, .. } => Some(tex_key),
            DrawableShape::Rectangle => None,
        }
    }

    /// Which buffer layout this shape is packed with. Batches never mix
    /// layouts.
    pub fn vertex_layout(&self) -> VertexLayout {
        match &self.shape {
            DrawableShape::Sprite { .. } => VertexLayout::TexturedSprite,
            DrawableShape::Rectangle => VertexLayout::SolidQuad,
        }
    }
}
