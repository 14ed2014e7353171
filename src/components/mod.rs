//! ECS components for drawable entities.
//!
//! This module groups the component types the render pipeline consumes.
//! Components are plain data owned by entities in the world; gameplay code
//! mutates them between frames and the pipeline reads them during
//! collection.
//!
//! Submodules overview:
//! - [`transform2d`] – world-space position, rotation, and scale
//! - [`drawable`] – visibility, color, layer, size, and shape

pub mod drawable;
pub mod transform2d;
