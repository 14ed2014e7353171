//! Texture handle store.
//!
//! Maps the logical texture keys carried by sprites to backend
//! [`TextureHandle`]s. Loading and decoding image files is outside the
//! pipeline; whoever owns the GPU backend registers handles here.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::render::backend::TextureHandle;

/// Resource resolving sprite texture keys to backend handles.
///
/// Unknown keys resolve to [`TextureHandle::INVALID`], which the pipeline
/// treats as "render untextured" rather than an error.
#[derive(Resource, Default)]
pub struct TextureStore {
    map: FxHashMap<String, TextureHandle>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the handle for a key.
    pub fn insert(&mut self, key: impl Into<String>, handle: TextureHandle) {
        self.map.insert(key.into(), handle);
    }

    /// Resolve a key, returning [`TextureHandle::INVALID`] when absent.
    pub fn resolve(&self, key: &str) -> TextureHandle {
        self.map.get(key).copied().unwrap_or(TextureHandle::INVALID)
    }

    pub fn remove(&mut self, key: &str) -> Option<TextureHandle> {
        self.map.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
