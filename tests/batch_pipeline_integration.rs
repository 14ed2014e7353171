//! End-to-end batch pipeline tests over a recording GPU backend.

use bevy_ecs::prelude::*;

use cinder2d::color::Rgba;
use cinder2d::components::drawable::Drawable;
use cinder2d::components::transform2d::Transform2D;
use cinder2d::render::backend::{
    BackendError, BufferHandle, BufferKind, GpuBackend, ShaderProgram, TextureHandle,
};
use cinder2d::render::batch::QuadVertex;
use cinder2d::render::pipeline::RenderPipeline;
use cinder2d::resources::camera2d::Camera2D;
use cinder2d::resources::renderconfig::RenderConfig;
use cinder2d::resources::texturestore::TextureStore;

#[derive(Clone, Debug, PartialEq)]
enum GpuCall {
    CreateBuffer {
        size_bytes: usize,
        kind: BufferKind,
        handle: BufferHandle,
    },
    UpdateBuffer {
        handle: BufferHandle,
        offset: usize,
        bytes: Vec<u8>,
    },
    BindTexture {
        slot: u32,
        texture: TextureHandle,
    },
    SubmitDraw {
        vertices: BufferHandle,
        indices: BufferHandle,
        quad_count: u32,
        shader: ShaderProgram,
    },
}

/// Records every backend call; binding fails for destroyed handles.
#[derive(Default)]
struct RecordingBackend {
    calls: Vec<GpuCall>,
    next_buffer: u32,
    next_shader: u32,
    destroyed_textures: Vec<TextureHandle>,
    fail_shader_creation: bool,
}

impl RecordingBackend {
    fn draws(&self) -> Vec<&GpuCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, GpuCall::SubmitDraw { .. }))
            .collect()
    }

    fn draw_quad_counts(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::SubmitDraw { quad_count, .. } => Some(*quad_count),
                _ => None,
            })
            .collect()
    }

    /// Distinct textures bound before each draw call.
    fn textures_per_draw(&self) -> Vec<Vec<TextureHandle>> {
        let mut result = Vec::new();
        let mut pending = Vec::new();
        for call in &self.calls {
            match call {
                GpuCall::BindTexture { texture, .. } => pending.push(*texture),
                GpuCall::SubmitDraw { .. } => result.push(std::mem::take(&mut pending)),
                _ => {}
            }
        }
        result
    }

    fn vertex_uploads(&self) -> Vec<&[u8]> {
        // Buffer 0 is the solid-quad vertex buffer (first one created).
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::UpdateBuffer { handle, bytes, .. } if *handle == BufferHandle(0) => {
                    Some(bytes.as_slice())
                }
                _ => None,
            })
            .collect()
    }
}

impl GpuBackend for RecordingBackend {
    fn create_buffer(
        &mut self,
        size_bytes: usize,
        kind: BufferKind,
    ) -> Result<BufferHandle, BackendError> {
        let handle = BufferHandle(self.next_buffer);
        self.next_buffer += 1;
        self.calls.push(GpuCall::CreateBuffer {
            size_bytes,
            kind,
            handle,
        });
        Ok(handle)
    }

    fn update_buffer(&mut self, handle: BufferHandle, offset: usize, bytes: &[u8]) {
        self.calls.push(GpuCall::UpdateBuffer {
            handle,
            offset,
            bytes: bytes.to_vec(),
        });
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) -> bool {
        self.calls.push(GpuCall::BindTexture { slot, texture });
        texture.is_valid() && !self.destroyed_textures.contains(&texture)
    }

    fn submit_draw(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        quad_count: u32,
        shader: ShaderProgram,
    ) {
        self.calls.push(GpuCall::SubmitDraw {
            vertices,
            indices,
            quad_count,
            shader,
        });
    }

    fn create_shader_program(&mut self, name: &str) -> Result<ShaderProgram, BackendError> {
        if self.fail_shader_creation {
            return Err(BackendError::ShaderCreation(name.to_string()));
        }
        let program = ShaderProgram(self.next_shader);
        self.next_shader += 1;
        Ok(program)
    }
}

fn make_world() -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut world = World::new();
    world.insert_resource(Camera2D::new(800.0, 600.0));
    world.insert_resource(TextureStore::new());
    world
}

fn make_pipeline(max_quads: u32) -> RenderPipeline<RecordingBackend> {
    let config = RenderConfig::new().with_max_quads(max_quads);
    RenderPipeline::new(RecordingBackend::default(), &config).unwrap()
}

fn spawn_rect(world: &mut World, x: f32, y: f32, layer: i32) -> Entity {
    world
        .spawn((
            Transform2D::new(x, y),
            Drawable::rectangle(10.0, 10.0, Rgba::WHITE).with_layer(layer),
        ))
        .id()
}

fn spawn_sprite(world: &mut World, key: &str, layer: i32) -> Entity {
    world
        .spawn((
            Transform2D::new(0.0, 0.0),
            Drawable::sprite(key, 16.0, 16.0).with_layer(layer),
        ))
        .id()
}

#[test]
fn single_texture_batch_produces_one_draw_call() {
    let mut world = make_world();
    world
        .resource_mut::<TextureStore>()
        .insert("hero", TextureHandle(5));
    for i in 0..100 {
        spawn_sprite(&mut world, "hero", i % 3);
    }

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().batches, 1);
    assert_eq!(pipeline.frame_stats().draw_calls, 1);
    assert_eq!(pipeline.backend().draw_quad_counts(), vec![100]);
}

#[test]
fn rectangles_split_at_max_quads() {
    let mut world = make_world();
    for i in 0..25_000 {
        spawn_rect(&mut world, (i % 500) as f32, (i / 500) as f32, 0);
    }

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().batches, 2);
    assert_eq!(pipeline.backend().draw_quad_counts(), vec![20_000, 5_000]);
    assert_eq!(pipeline.frame_stats().quads, 25_000);
}

#[test]
fn seventeen_textures_overflow_the_slot_table() {
    let mut world = make_world();
    {
        let mut store = world.resource_mut::<TextureStore>();
        for t in 0..17 {
            store.insert(format!("tex{}", t), TextureHandle(t + 1));
        }
    }
    for i in 0..34 {
        spawn_sprite(&mut world, &format!("tex{}", i % 17), 0);
    }

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert!(pipeline.frame_stats().batches >= 2);
    for textures in pipeline.backend().textures_per_draw() {
        let mut distinct = textures.clone();
        distinct.sort_by_key(|t| t.0);
        distinct.dedup();
        assert!(distinct.len() <= 16);
    }
}

#[test]
fn draw_order_follows_ascending_layers() {
    let mut world = make_world();
    spawn_rect(&mut world, 30.0, 0.0, 5);
    spawn_rect(&mut world, 10.0, 0.0, -1);
    spawn_rect(&mut world, 20.0, 0.0, 2);

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    let uploads = pipeline.backend().vertex_uploads();
    assert_eq!(uploads.len(), 1);
    let verts: &[QuadVertex] = bytemuck::cast_slice(uploads[0]);
    assert_eq!(verts.len(), 12);
    // First vertex of each quad, in packed order: layers -1, 2, 5.
    let xs: Vec<f32> = (0..3).map(|q| verts[q * 4].position[0]).collect();
    assert_eq!(xs, vec![5.0, 15.0, 25.0]);
}

#[test]
fn same_layer_order_is_deterministic_across_runs() {
    let run = || {
        let mut world = make_world();
        for i in 0..20 {
            spawn_rect(&mut world, i as f32 * 3.0, 0.0, 7);
        }
        let mut pipeline = make_pipeline(20_000);
        pipeline.render_frame(&mut world);
        pipeline
            .backend()
            .vertex_uploads()
            .iter()
            .map(|b| b.to_vec())
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn missing_transform_excludes_entity_without_fault() {
    let mut world = make_world();
    world.spawn((Drawable::rectangle(10.0, 10.0, Rgba::WHITE),));
    spawn_rect(&mut world, 0.0, 0.0, 0);

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().missing_transform, 1);
    assert_eq!(pipeline.frame_stats().collected, 1);
    assert_eq!(pipeline.backend().draw_quad_counts(), vec![1]);
}

#[test]
fn invisible_entities_are_skipped() {
    let mut world = make_world();
    let hidden = spawn_rect(&mut world, 0.0, 0.0, 0);
    world.get_mut::<Drawable>(hidden).unwrap().visible = false;
    spawn_rect(&mut world, 1.0, 0.0, 0);

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().collected, 1);
    assert_eq!(pipeline.backend().draw_quad_counts(), vec![1]);
}

#[test]
fn vertex_layout_mismatch_forces_breaks() {
    let mut world = make_world();
    world
        .resource_mut::<TextureStore>()
        .insert("hero", TextureHandle(3));
    // Alternate layouts through the layer key so the sorted stream
    // interleaves rectangles and sprites.
    for layer in 0..6 {
        if layer % 2 == 0 {
            spawn_rect(&mut world, layer as f32, 0.0, layer);
        } else {
            spawn_sprite(&mut world, "hero", layer);
        }
    }

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().batches, 6);
    assert_eq!(pipeline.frame_stats().draw_calls, 6);
    assert_eq!(pipeline.backend().draw_quad_counts(), vec![1; 6]);
}

#[test]
fn final_partial_batch_is_flushed() {
    let mut world = make_world();
    for i in 0..5 {
        spawn_rect(&mut world, i as f32, 0.0, 0);
    }

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().batches, 1);
    assert_eq!(pipeline.backend().draw_quad_counts(), vec![5]);
}

#[test]
fn uploads_cover_exactly_the_packed_quads() {
    let vertex_bytes_per_quad = 4 * size_of::<QuadVertex>();

    let mut world = make_world();
    let entities: Vec<Entity> = (0..10).map(|i| spawn_rect(&mut world, i as f32, 0.0, 0)).collect();

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);
    assert_eq!(
        pipeline.backend().vertex_uploads().last().unwrap().len(),
        10 * vertex_bytes_per_quad
    );

    // A smaller second frame must not re-upload stale quads.
    for e in &entities[3..] {
        world.despawn(*e);
    }
    pipeline.render_frame(&mut world);
    assert_eq!(
        pipeline.backend().vertex_uploads().last().unwrap().len(),
        3 * vertex_bytes_per_quad
    );
    assert_eq!(pipeline.frame_stats().quads, 3);
}

#[test]
fn destroyed_texture_skips_batch_but_not_frame() {
    let mut world = make_world();
    {
        let mut store = world.resource_mut::<TextureStore>();
        store.insert("broken", TextureHandle(9));
    }
    spawn_sprite(&mut world, "broken", 0);
    spawn_rect(&mut world, 0.0, 0.0, 1);

    let config = RenderConfig::new();
    let mut backend = RecordingBackend::default();
    backend.destroyed_textures.push(TextureHandle(9));
    let mut pipeline = RenderPipeline::new(backend, &config).unwrap();
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().batches, 2);
    assert_eq!(pipeline.frame_stats().skipped_batches, 1);
    assert_eq!(pipeline.frame_stats().draw_calls, 1);
    // The surviving draw is the solid rectangle batch.
    assert_eq!(pipeline.backend().draw_quad_counts(), vec![1]);
}

#[test]
fn unresolvable_texture_renders_untextured() {
    let mut world = make_world();
    spawn_sprite(&mut world, "never_registered", 0);

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    assert_eq!(pipeline.frame_stats().draw_calls, 1);
    let bound = pipeline.backend().textures_per_draw();
    assert_eq!(bound, vec![vec![TextureHandle::DEFAULT]]);
}

#[test]
fn shader_creation_failure_is_fatal() {
    let backend = RecordingBackend {
        fail_shader_creation: true,
        ..Default::default()
    };
    let result = RenderPipeline::new(backend, &RenderConfig::new());
    assert!(result.is_err());
}

#[test]
fn static_entities_do_not_count_as_changed_after_first_frame() {
    let mut world = make_world();
    let mover = spawn_rect(&mut world, 0.0, 0.0, 0);
    for i in 1..10 {
        spawn_rect(&mut world, i as f32, 0.0, 0);
    }

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);
    assert_eq!(pipeline.frame_stats().changed_entities, 10);

    pipeline.render_frame(&mut world);
    assert_eq!(pipeline.frame_stats().changed_entities, 0);

    world.get_mut::<Transform2D>(mover).unwrap().position.x = 42.0;
    pipeline.render_frame(&mut world);
    assert_eq!(pipeline.frame_stats().changed_entities, 1);
}

#[test]
fn attribute_changes_repack_cached_quads() {
    let mut world = make_world();
    let e = spawn_rect(&mut world, 5.0, 5.0, 0);

    let mut pipeline = make_pipeline(20_000);
    pipeline.render_frame(&mut world);

    // Frame 2: recolor. The reused-quad path must not serve the old bytes.
    world.get_mut::<Drawable>(e).unwrap().color = Rgba::rgb(1.0, 0.0, 0.0);
    pipeline.render_frame(&mut world);
    let uploads = pipeline.backend().vertex_uploads();
    let verts: &[QuadVertex] = bytemuck::cast_slice(uploads.last().unwrap());
    assert_eq!(verts[0].color, Rgba::rgb(1.0, 0.0, 0.0).pack());

    // Frame 3: move. Corner positions follow.
    world.get_mut::<Transform2D>(e).unwrap().position.x = 50.0;
    pipeline.render_frame(&mut world);
    let uploads = pipeline.backend().vertex_uploads();
    let verts: &[QuadVertex] = bytemuck::cast_slice(uploads.last().unwrap());
    assert_eq!(verts[0].position, [45.0, 0.0]);
}

#[test]
fn every_submitted_batch_respects_the_quad_budget() {
    let mut world = make_world();
    for i in 0..1_000 {
        spawn_rect(&mut world, i as f32, 0.0, i % 13);
    }

    let mut pipeline = make_pipeline(128);
    pipeline.render_frame(&mut world);

    let counts = pipeline.backend().draw_quad_counts();
    assert!(!counts.is_empty());
    assert!(counts.iter().all(|&c| c <= 128));
    assert_eq!(counts.iter().sum::<u32>(), 1_000);
    assert_eq!(pipeline.backend().draws().len(), counts.len());
}
