//! Cinder2D batch renderer.
//!
//! Converts a scene's drawable entities into batched GPU draw calls:
//! collect, sort by layer, pack into bounded buffers, and submit one draw
//! call per batch through an injected backend. Window management, asset
//! loading, and the concrete GPU API live outside this crate.

pub mod color;
pub mod components;
pub mod render;
pub mod resources;
