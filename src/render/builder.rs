//! Batch accumulation: pack ordered draw-list entries into bounded
//! buffers and decide where batches break.
//!
//! The builder is a small state machine: `Empty` until the first command
//! of a frame, `Accumulating` while quads fit, and a completed batch is
//! handed back the moment a break condition triggers, with the triggering
//! command starting the next batch. A non-full final batch is still valid
//! and is flushed by [`finish`](BatchBuilder::finish).

use super::arena::{Region, ScratchArena};
use super::backend::TextureHandle;
use super::batch::{
    Batch, INDICES_PER_QUAD, PackedQuad, QuadVertex, SpriteInstance, TextureSlots,
    VERTICES_PER_QUAD, VertexLayout,
};

/// One quad ready to batch: its derived buffer data (freshly packed or
/// reused from the cache) plus the resolved texture.
#[derive(Clone, Copy, Debug)]
pub struct QuadCommand {
    /// Resolved backend texture. Callers map unresolvable keys to
    /// [`TextureHandle::DEFAULT`] before building the command, so this is
    /// always bindable. Ignored by the solid layout.
    pub texture: TextureHandle,
    pub quad: PackedQuad,
}

impl QuadCommand {
    pub fn layout(&self) -> VertexLayout {
        self.quad.layout()
    }
}

/// Packs quads into arena-backed batches, enforcing capacity and texture
/// slot limits.
pub struct BatchBuilder {
    arena: ScratchArena,
    current: Option<Batch>,
    max_quads: u32,
    texture_slots: usize,
}

impl BatchBuilder {
    pub fn new(max_quads: u32, texture_slots: usize) -> Self {
        Self {
            arena: ScratchArena::new(),
            current: None,
            max_quads: max_quads.max(1),
            texture_slots,
        }
    }

    /// Reclaim all scratch storage for a new frame.
    pub fn begin_frame(&mut self) {
        self.arena.reset();
        self.current = None;
    }

    /// Per-batch quad budget.
    pub fn max_quads(&self) -> u32 {
        self.max_quads
    }

    /// The arena the current frame's batch regions live in.
    pub fn arena(&self) -> &ScratchArena {
        &self.arena
    }

    /// Add one quad. When the command does not fit the accumulating batch,
    /// that batch is returned completed and the command becomes the first
    /// element of a fresh one.
    pub fn push(&mut self, cmd: &QuadCommand) -> Option<Batch> {
        let breaking = matches!(&self.current, Some(batch) if self.must_break(batch, cmd));
        let completed = if breaking { self.current.take() } else { None };

        if self.current.is_none() {
            self.current = Some(self.new_batch(cmd.layout()));
        }
        // Invariant: `current` holds a batch with room for this quad.
        if let Some(mut batch) = self.current.take() {
            self.write_quad(&mut batch, cmd);
            self.current = Some(batch);
        }

        completed
    }

    /// Flush the tail batch of the frame, if it holds at least one quad.
    pub fn finish(&mut self) -> Option<Batch> {
        match self.current.take() {
            Some(batch) if batch.quad_count > 0 => Some(batch),
            _ => None,
        }
    }

    fn must_break(&self, batch: &Batch, cmd: &QuadCommand) -> bool {
        if batch.layout != cmd.layout() {
            return true;
        }
        if batch.quad_count >= self.max_quads {
            return true;
        }
        batch.layout == VertexLayout::TexturedSprite && batch.slots.would_overflow(cmd.texture)
    }

    fn new_batch(&mut self, layout: VertexLayout) -> Batch {
        let quads = self.max_quads as usize;
        let (vertices, indices, instances) = match layout {
            VertexLayout::SolidQuad => (
                self.arena
                    .alloc(quads * VERTICES_PER_QUAD as usize * size_of::<QuadVertex>()),
                self.arena
                    .alloc(quads * INDICES_PER_QUAD as usize * size_of::<u32>()),
                Region::EMPTY,
            ),
            VertexLayout::TexturedSprite => (
                Region::EMPTY,
                Region::EMPTY,
                self.arena.alloc(quads * size_of::<SpriteInstance>()),
            ),
        };
        Batch {
            layout,
            vertices,
            indices,
            instances,
            quad_count: 0,
            slots: TextureSlots::new(self.texture_slots),
        }
    }

    fn write_quad(&mut self, batch: &mut Batch, cmd: &QuadCommand) {
        debug_assert!(batch.quad_count < self.max_quads);
        match cmd.quad {
            PackedQuad::Solid { vertices } => self.write_solid(batch, &vertices),
            PackedQuad::Sprite { instance } => self.write_sprite(batch, cmd.texture, instance),
        }
        batch.quad_count += 1;
    }

    fn write_solid(&mut self, batch: &mut Batch, quad: &[QuadVertex; 4]) {
        let base = batch.quad_count as usize * VERTICES_PER_QUAD as usize;
        let verts: &mut [QuadVertex] =
            bytemuck::cast_slice_mut(self.arena.slice_mut(batch.vertices));
        verts[base..base + 4].copy_from_slice(quad);

        let ibase = batch.quad_count as usize * INDICES_PER_QUAD as usize;
        let vbase = base as u32;
        let indices: &mut [u32] = bytemuck::cast_slice_mut(self.arena.slice_mut(batch.indices));
        indices[ibase..ibase + 6].copy_from_slice(&[
            vbase,
            vbase + 1,
            vbase + 2,
            vbase + 2,
            vbase + 3,
            vbase,
        ]);
    }

    fn write_sprite(&mut self, batch: &mut Batch, texture: TextureHandle, mut instance: SpriteInstance) {
        // The break check already guaranteed a free slot. The cached
        // instance carries a placeholder slot; the real one is per-batch.
        instance.tex_slot = batch.slots.resolve(texture).unwrap_or(0);

        let idx = batch.quad_count as usize;
        let instances: &mut [SpriteInstance] =
            bytemuck::cast_slice_mut(self.arena.slice_mut(batch.instances));
        instances[idx] = instance;
    }
}
