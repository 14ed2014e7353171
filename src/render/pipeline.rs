//! Frame orchestration: collect, batch, submit.
//!
//! [`RenderPipeline`] owns the GPU backend and every pipeline service as
//! explicit dependencies injected at construction; there are no global
//! managers. One [`render_frame`](RenderPipeline::render_frame) call turns
//! the world's drawables into an ordered sequence of batched draw calls.

use bevy_ecs::prelude::*;
use glam::Mat4;
use log::{trace, warn};
use thiserror::Error;

use crate::components::drawable::Drawable;
use crate::components::transform2d::Transform2D;
use crate::resources::camera2d::Camera2D;
use crate::resources::renderconfig::RenderConfig;
use crate::resources::texturestore::TextureStore;

use super::backend::{BackendError, GpuBackend, TextureHandle};
use super::batch::{Batch, PackedQuad, VertexLayout};
use super::builder::{BatchBuilder, QuadCommand};
use super::collect::{DrawEntry, RenderCache, collect_draw_list};
use super::submit::BatchSubmitter;

/// Fatal construction failures. Per-frame rendering never returns errors;
/// it degrades and logs instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Counters for the most recent frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Entries that survived collection and filtering.
    pub collected: u32,
    /// Entities whose quad inputs changed since the previous frame.
    pub changed_entities: u32,
    /// Entities skipped for lacking a transform.
    pub missing_transform: u32,
    /// Batches completed (submitted or skipped).
    pub batches: u32,
    /// Quads packed across all batches.
    pub quads: u32,
    /// Draw submissions actually issued.
    pub draw_calls: u32,
    /// Batches skipped due to texture bind failures.
    pub skipped_batches: u32,
}

/// The batch-rendering pipeline: entity collection, batch building, and
/// draw submission over an injected GPU backend.
///
/// Single-threaded by design; runs on the thread that owns the GPU
/// context and keeps all per-frame state frame-scoped.
pub struct RenderPipeline<B: GpuBackend> {
    backend: B,
    builder: BatchBuilder,
    submitter: BatchSubmitter,
    cache: RenderCache,
    draw_list: Vec<DrawEntry>,
    stats: FrameStats,
    view: Mat4,
    projection: Mat4,
}

impl<B: GpuBackend> RenderPipeline<B> {
    /// Build the pipeline over `backend`. Fails when the backend cannot
    /// allocate the batch buffers or compile the shader programs; the
    /// pipeline never renders without them.
    pub fn new(mut backend: B, config: &RenderConfig) -> Result<Self, PipelineError> {
        let submitter = BatchSubmitter::new(&mut backend, config.max_quads)?;
        Ok(Self {
            backend,
            builder: BatchBuilder::new(config.max_quads, config.texture_slots),
            submitter,
            cache: RenderCache::default(),
            draw_list: Vec::new(),
            stats: FrameStats::default(),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        })
    }

    /// Render one frame of the world's drawables.
    ///
    /// Collection, batching, and submission happen in layer order; every
    /// completed batch is submitted before the next one begins, and the
    /// final partial batch is always flushed.
    pub fn render_frame(&mut self, world: &mut World) {
        self.stats = FrameStats::default();
        self.refresh_camera(world);

        self.cache.begin_frame();
        let collect = collect_draw_list(world, &mut self.cache, &mut self.draw_list);
        self.stats.collected = collect.collected;
        self.stats.changed_entities = collect.changed;
        self.stats.missing_transform = collect.missing_transform;

        self.builder.begin_frame();
        for i in 0..self.draw_list.len() {
            let entry = self.draw_list[i];
            let Some(cmd) = self.quad_command(world, entry) else {
                continue;
            };
            if let Some(batch) = self.builder.push(&cmd) {
                self.submit_batch(batch);
            }
        }
        if let Some(tail) = self.builder.finish() {
            self.submit_batch(tail);
        }

        self.cache.purge_stale();
        trace!(
            "frame: {} quads in {} batches, {} draw calls, {} skipped",
            self.stats.quads, self.stats.batches, self.stats.draw_calls, self.stats.skipped_batches
        );
    }

    /// View matrix captured at the start of the last frame, for the
    /// backend's per-frame transform upload.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Projection matrix captured at the start of the last frame.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn frame_stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn refresh_camera(&mut self, world: &mut World) {
        match world.get_resource_mut::<Camera2D>() {
            Some(mut cam) => {
                self.view = cam.view_matrix();
                self.projection = cam.projection_matrix();
            }
            None => {
                warn!("No Camera2D resource, rendering with identity transforms");
                self.view = Mat4::IDENTITY;
                self.projection = Mat4::IDENTITY;
            }
        }
    }

    /// Look the entry's components up at the point of use. Entries only
    /// carry entity ids, so a component removed since collection simply
    /// drops the quad.
    ///
    /// The derived quad data is reused from the cache while the entity's
    /// inputs hold still; only new or changed entities are repacked. The
    /// texture is re-resolved every frame regardless, since the store can
    /// remap a key without touching the entity.
    fn quad_command(&mut self, world: &World, entry: DrawEntry) -> Option<QuadCommand> {
        let transform = world.get::<Transform2D>(entry.entity)?;
        let drawable = world.get::<Drawable>(entry.entity)?;

        let texture = match drawable.tex_key() {
            Some(key) => {
                let resolved = world
                    .get_resource::<TextureStore>()
                    .map(|store| store.resolve(key))
                    .unwrap_or(TextureHandle::INVALID);
                if resolved.is_valid() {
                    resolved
                } else {
                    // Unresolvable texture renders as an untextured quad.
                    TextureHandle::DEFAULT
                }
            }
            None => TextureHandle::DEFAULT,
        };

        let quad = match self.cache.packed(entry.entity) {
            Some(quad) => quad,
            None => {
                let quad = match drawable.vertex_layout() {
                    VertexLayout::SolidQuad => PackedQuad::solid(
                        transform.position,
                        transform.rotation,
                        transform.scale,
                        drawable.size,
                        drawable.color,
                        drawable.uv(),
                    ),
                    VertexLayout::TexturedSprite => PackedQuad::sprite(
                        transform.position,
                        transform.rotation,
                        transform.scale,
                        drawable.size,
                        drawable.color,
                        drawable.uv(),
                    ),
                };
                self.cache.store_packed(entry.entity, quad);
                quad
            }
        };

        Some(QuadCommand { texture, quad })
    }

    fn submit_batch(&mut self, mut batch: Batch) {
        self.stats.batches += 1;
        self.stats.quads += batch.quad_count;
        if self
            .submitter
            .submit(&mut self.backend, self.builder.arena(), &mut batch)
        {
            self.stats.draw_calls += 1;
        } else {
            self.stats.skipped_batches += 1;
        }
    }
}
