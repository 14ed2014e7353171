//! Batch submission: upload packed bytes and issue one draw call per
//! batch.
//!
//! The submitter owns the GPU-side buffers and shader programs. Uploads
//! cover exactly the bytes the builder produced for the batch's quad
//! count, never the whole scratch region, so stale quad data from a
//! previous larger batch is never re-sent.

use log::error;

use super::arena::ScratchArena;
use super::backend::{
    BackendError, BufferHandle, GpuBackend, BufferKind, ShaderProgram, TextureHandle,
};
use super::batch::{Batch, INDICES_PER_QUAD, QuadVertex, SpriteInstance, VERTICES_PER_QUAD, VertexLayout};

/// Issues completed batches to the backend and resets their state.
pub struct BatchSubmitter {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    instance_buffer: BufferHandle,
    solid_shader: ShaderProgram,
    sprite_shader: ShaderProgram,
}

impl BatchSubmitter {
    /// Allocate GPU buffers sized for `max_quads` and compile both shader
    /// programs. Any failure here is fatal: the pipeline must not render
    /// without a valid shader program.
    pub fn new(backend: &mut dyn GpuBackend, max_quads: u32) -> Result<Self, BackendError> {
        let quads = max_quads as usize;
        let vertex_buffer = backend.create_buffer(
            quads * VERTICES_PER_QUAD as usize * size_of::<QuadVertex>(),
            BufferKind::Vertex,
        )?;
        let index_buffer = backend.create_buffer(
            quads * INDICES_PER_QUAD as usize * size_of::<u32>(),
            BufferKind::Index,
        )?;
        let instance_buffer =
            backend.create_buffer(quads * size_of::<SpriteInstance>(), BufferKind::Instance)?;
        let solid_shader = backend.create_shader_program("quad_solid")?;
        let sprite_shader = backend.create_shader_program("sprite_instanced")?;
        Ok(Self {
            vertex_buffer,
            index_buffer,
            instance_buffer,
            solid_shader,
            sprite_shader,
        })
    }

    /// Submit one completed batch.
    ///
    /// Returns `false` when a texture failed to bind; the batch is skipped
    /// (not drawn) but the frame continues. Either way the batch counters
    /// are reset while its backing storage stays in the arena for reuse.
    pub fn submit(
        &mut self,
        backend: &mut dyn GpuBackend,
        arena: &ScratchArena,
        batch: &mut Batch,
    ) -> bool {
        if batch.quad_count == 0 {
            return true;
        }

        match batch.layout {
            VertexLayout::SolidQuad => {
                backend.update_buffer(
                    self.vertex_buffer,
                    0,
                    arena.slice(batch.vertices, batch.vertex_bytes()),
                );
                backend.update_buffer(
                    self.index_buffer,
                    0,
                    arena.slice(batch.indices, batch.index_bytes()),
                );
            }
            VertexLayout::TexturedSprite => {
                backend.update_buffer(
                    self.instance_buffer,
                    0,
                    arena.slice(batch.instances, batch.instance_bytes()),
                );
            }
        }

        if !self.bind_textures(backend, batch) {
            batch.reset();
            return false;
        }

        match batch.layout {
            VertexLayout::SolidQuad => backend.submit_draw(
                self.vertex_buffer,
                self.index_buffer,
                batch.quad_count,
                self.solid_shader,
            ),
            // The sprite path submits its instance stream as the vertex
            // buffer; the backend expands it against a shared unit quad.
            VertexLayout::TexturedSprite => backend.submit_draw(
                self.instance_buffer,
                BufferHandle::INVALID,
                batch.quad_count,
                self.sprite_shader,
            ),
        }

        batch.reset();
        true
    }

    fn bind_textures(&self, backend: &mut dyn GpuBackend, batch: &Batch) -> bool {
        if batch.slots.is_empty() {
            // Untextured batch: bind the backend's white texture so one
            // shader path serves both cases.
            return backend.bind_texture(0, TextureHandle::DEFAULT);
        }
        for (slot, &texture) in batch.slots.bound().iter().enumerate() {
            if !backend.bind_texture(slot as u32, texture) {
                error!(
                    "Failed to bind texture {:?} to slot {}, skipping batch of {} quads",
                    texture, slot, batch.quad_count
                );
                return false;
            }
        }
        true
    }
}
