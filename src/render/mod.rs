//! The batch-rendering pipeline.
//!
//! Data flows one-directionally, once per frame: the collector orders the
//! world's drawables, the builder packs them into bounded batches, and the
//! submitter turns each batch into a single draw call on the GPU backend.
//!
//! Submodules overview
//! - [`backend`] – the abstract GPU command surface and its handles
//! - [`arena`] – frame-scoped byte arena behind the batch buffers
//! - [`batch`] – packed vertex/instance formats and the batch unit
//! - [`collect`] – visibility filtering, layer ordering, change cache
//! - [`builder`] – batch accumulation and break decisions
//! - [`submit`] – buffer uploads, texture binds, draw submission
//! - [`pipeline`] – per-frame orchestration over an injected backend

pub mod arena;
pub mod backend;
pub mod batch;
pub mod builder;
pub mod collect;
pub mod pipeline;
pub mod submit;
