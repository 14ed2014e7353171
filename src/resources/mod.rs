//! ECS resources made available to the render pipeline.
//!
//! This module groups the long-lived data injected into the ECS world and
//! read by the pipeline during a frame: camera transform, texture handle
//! resolution, and render tuning. Each submodule documents the semantics
//! and intended usage of its resource(s).
//!
//! Overview
//! - `camera2d` – shared 2D camera with lazily cached view/projection
//! - `texturestore` – sprite texture keys resolved to backend handles
//! - `renderconfig` – batch sizing and texture slot tuning
pub mod camera2d;
pub mod renderconfig;
pub mod texturestore;
