//! GPU backend abstraction.
//!
//! The pipeline decides *what* to submit and *when* to flush; the backend
//! owns buffer allocation, texture binding, and actual draw execution.
//! Everything here is fire-and-forget from the pipeline's perspective:
//! single-threaded submission order defines all ordering guarantees.

use thiserror::Error;

/// Opaque GPU buffer identifier issued by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

impl BufferHandle {
    pub const INVALID: BufferHandle = BufferHandle(u32::MAX);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// Opaque GPU texture identifier issued by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Sentinel for "no texture" / unresolvable keys.
    pub const INVALID: TextureHandle = TextureHandle(u32::MAX);
    /// Backend-provided 1x1 white texture, bound for untextured batches so
    /// a single shader path serves both cases.
    pub const DEFAULT: TextureHandle = TextureHandle(0);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// Opaque compiled shader program identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderProgram(pub u32);

/// What a buffer holds, so the backend can pick usage flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
    Instance,
}

/// Fatal backend failures. These only occur during pipeline construction;
/// per-frame calls never fail, they degrade.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("shader program creation failed: {0}")]
    ShaderCreation(String),
    #[error("buffer allocation failed for {size_bytes} bytes ({kind:?})")]
    BufferAllocation { size_bytes: usize, kind: BufferKind },
}

/// The GPU command surface the pipeline drives.
///
/// Implementations live outside this crate (wgpu, GL, a test recorder).
/// The pipeline runs on the thread that owns the GPU context, so no
/// `Send`/`Sync` bound is required.
pub trait GpuBackend {
    /// Allocate a buffer of `size_bytes` for the given kind.
    fn create_buffer(&mut self, size_bytes: usize, kind: BufferKind)
    -> Result<BufferHandle, BackendError>;

    /// Upload `bytes` into `handle` starting at `offset`. The pipeline
    /// uploads exactly the bytes a batch produced, never a full region.
    fn update_buffer(&mut self, handle: BufferHandle, offset: usize, bytes: &[u8]);

    /// Bind `texture` to the given slot. Returns `false` when the handle
    /// is invalid or destroyed; the affected batch is skipped, the frame
    /// continues.
    fn bind_texture(&mut self, slot: u32, texture: TextureHandle) -> bool;

    /// Issue one draw call covering `quad_count` quads from the bound
    /// buffers with the given shader.
    fn submit_draw(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        quad_count: u32,
        shader: ShaderProgram,
    );

    /// Compile the shader program identified by `name`. Failure here is
    /// fatal for pipeline construction.
    fn create_shader_program(&mut self, name: &str) -> Result<ShaderProgram, BackendError>;
}
