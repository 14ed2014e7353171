//! Batch accumulation types: packed vertex/instance formats, the
//! fixed-capacity texture slot table, and the bounded [`Batch`] unit
//! handed from the builder to the submitter.

use arrayvec::ArrayVec;
use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::color::Rgba;
use crate::components::drawable::UvRect;

use super::arena::Region;
use super::backend::TextureHandle;

/// Vertices per quad (two triangles sharing an edge).
pub const VERTICES_PER_QUAD: u32 = 4;
/// Indices per quad.
pub const INDICES_PER_QUAD: u32 = 6;
/// Engine-wide cap on texture binding slots per batch/draw call.
pub const MAX_TEXTURE_SLOTS: usize = 16;
/// Default per-batch quad budget; a tuning parameter, see
/// [`RenderConfig`](crate::resources::renderconfig::RenderConfig).
pub const DEFAULT_MAX_QUADS: u32 = 20_000;

/// Vertex of the solid-quad layout: four per quad plus an index list.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// World-space position.
    pub position: [f32; 2],
    pub uv: [f32; 2],
    /// Packed `0xAABBGGRR` color.
    pub color: u32,
    _pad: u32,
}

impl QuadVertex {
    pub fn new(position: [f32; 2], uv: [f32; 2], color: u32) -> Self {
        Self {
            position,
            uv,
            color,
            _pad: 0,
        }
    }
}

/// Per-quad instance of the textured-sprite layout. The backend expands
/// it against a shared unit quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// World-space position of the quad center.
    pub position: [f32; 2],
    /// Final size, entity scale already folded in.
    pub size: [f32; 2],
    /// UV rectangle, `(u0,v0)` then `(u1,v1)`.
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    /// Rotation in radians.
    pub rotation: f32,
    /// Packed `0xAABBGGRR` color.
    pub color: u32,
    /// Slot index into the batch's texture table.
    pub tex_slot: u32,
    pub _pad: u32,
}

/// Derived per-entity quad data in its final buffer form.
///
/// Computing this is the per-quad work of a frame (corner rotation, color
/// quantization); the pipeline caches it per entity and only recomputes
/// when the entity's transform or drawable attributes change, so static
/// entities pay nothing past the first frame. `tex_slot` in the sprite
/// variant is a placeholder until the builder assigns the batch slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PackedQuad {
    Solid { vertices: [QuadVertex; 4] },
    Sprite { instance: SpriteInstance },
}

impl PackedQuad {
    /// Pack a solid quad: four world-space corners, rotated around the
    /// entity position, in top-left/top-right/bottom-right/bottom-left
    /// order.
    pub fn solid(
        position: Vec2,
        rotation: f32,
        scale: Vec2,
        size: Vec2,
        color: Rgba,
        uv: UvRect,
    ) -> Self {
        let half = size * scale * 0.5;
        let (sin, cos) = rotation.sin_cos();
        let rotate =
            |p: Vec2| Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos) + position;

        let tl = rotate(Vec2::new(-half.x, -half.y));
        let tr = rotate(Vec2::new(half.x, -half.y));
        let br = rotate(Vec2::new(half.x, half.y));
        let bl = rotate(Vec2::new(-half.x, half.y));
        let color = color.pack();

        Self::Solid {
            vertices: [
                QuadVertex::new(tl.into(), [uv.u0, uv.v0], color),
                QuadVertex::new(tr.into(), [uv.u1, uv.v0], color),
                QuadVertex::new(br.into(), [uv.u1, uv.v1], color),
                QuadVertex::new(bl.into(), [uv.u0, uv.v1], color),
            ],
        }
    }

    /// Pack a sprite instance; rotation is deferred to the shader, scale is
    /// folded into the size here.
    pub fn sprite(
        position: Vec2,
        rotation: f32,
        scale: Vec2,
        size: Vec2,
        color: Rgba,
        uv: UvRect,
    ) -> Self {
        Self::Sprite {
            instance: SpriteInstance {
                position: position.into(),
                size: (size * scale).into(),
                uv_min: [uv.u0, uv.v0],
                uv_max: [uv.u1, uv.v1],
                rotation,
                color: color.pack(),
                tex_slot: 0,
                _pad: 0,
            },
        }
    }

    pub fn layout(&self) -> VertexLayout {
        match self {
            PackedQuad::Solid { .. } => VertexLayout::SolidQuad,
            PackedQuad::Sprite { .. } => VertexLayout::TexturedSprite,
        }
    }
}

/// Buffer layout a batch is packed with. A layout mismatch always forces
/// a batch break, since buffers are laid out per-layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexLayout {
    /// Four [`QuadVertex`] plus six indices per quad.
    SolidQuad,
    /// One [`SpriteInstance`] per quad.
    TexturedSprite,
}

/// Fixed-capacity table mapping texture identity to a slot index for the
/// current batch.
#[derive(Debug)]
pub struct TextureSlots {
    slots: ArrayVec<TextureHandle, MAX_TEXTURE_SLOTS>,
    capacity: usize,
}

impl Default for TextureSlots {
    fn default() -> Self {
        Self::new(MAX_TEXTURE_SLOTS)
    }
}

impl TextureSlots {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: ArrayVec::new(),
            capacity: capacity.clamp(1, MAX_TEXTURE_SLOTS),
        }
    }

    /// Slot index for `texture`, allocating one if it is new. Returns
    /// `None` when the table is full, the signal for a batch break.
    pub fn resolve(&mut self, texture: TextureHandle) -> Option<u32> {
        if let Some(idx) = self.slots.iter().position(|&t| t == texture) {
            return Some(idx as u32);
        }
        if self.slots.len() >= self.capacity {
            return None;
        }
        self.slots.push(texture);
        Some((self.slots.len() - 1) as u32)
    }

    pub fn bound(&self) -> &[TextureHandle] {
        &self.slots
    }

    /// `true` when admitting `texture` would need a slot the table cannot
    /// provide.
    pub fn would_overflow(&self, texture: TextureHandle) -> bool {
        self.slots.len() >= self.capacity && !self.slots.contains(&texture)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// One bounded accumulation unit: buffer regions, a quad counter, and the
/// textures bound for its draw call.
///
/// `quad_count` never exceeds the configured per-batch maximum; the
/// builder checks the budget before admitting a quad, so the vertex and
/// index regions always have room.
pub struct Batch {
    pub layout: VertexLayout,
    pub vertices: Region,
    pub indices: Region,
    pub instances: Region,
    pub quad_count: u32,
    pub slots: TextureSlots,
}

impl Batch {
    /// Bytes of vertex data actually produced so far.
    pub fn vertex_bytes(&self) -> usize {
        self.quad_count as usize * VERTICES_PER_QUAD as usize * size_of::<QuadVertex>()
    }

    /// Bytes of index data actually produced so far.
    pub fn index_bytes(&self) -> usize {
        self.quad_count as usize * INDICES_PER_QUAD as usize * size_of::<u32>()
    }

    /// Bytes of instance data actually produced so far.
    pub fn instance_bytes(&self) -> usize {
        self.quad_count as usize * size_of::<SpriteInstance>()
    }

    /// Reset counters after submission. Backing regions stay valid so the
    /// storage can be reused within the frame.
    pub fn reset(&mut self) {
        self.quad_count = 0;
        self.slots.clear();
    }
}
