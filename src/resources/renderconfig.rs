//! Render tuning configuration resource.
//!
//! Provides safe defaults for batch sizing and optional loading from an INI
//! configuration file.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! max_quads = 20000
//! texture_slots = 16
//! ```

use bevy_ecs::prelude::Resource;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::render::batch::MAX_TEXTURE_SLOTS;

/// Default safe values for startup
const DEFAULT_MAX_QUADS: u32 = 20_000;
const DEFAULT_CONFIG_PATH: &str = "./render.ini";

/// Render configuration resource.
///
/// `max_quads` caps a single batch; it is a tuning parameter, not an
/// architectural limit. `texture_slots` is capped by the engine-wide
/// [`MAX_TEXTURE_SLOTS`].
#[derive(Resource, Debug, Clone)]
pub struct RenderConfig {
    /// Maximum quads accumulated into one batch before a forced break.
    pub max_quads: u32,
    /// Texture binding slots available to a single batch.
    pub texture_slots: usize,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderConfig {
    /// Create a configuration with safe default values.
    pub fn new() -> Self {
        Self {
            max_quads: DEFAULT_MAX_QUADS,
            texture_slots: MAX_TEXTURE_SLOTS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn with_max_quads(mut self, max_quads: u32) -> Self {
        self.max_quads = max_quads.max(1);
        self
    }

    pub fn with_texture_slots(mut self, slots: usize) -> Self {
        self.texture_slots = self.clamp_slots(slots);
        self
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Returns an
    /// error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load render config: {}", e))?;

        if let Some(max_quads) = config.getuint("render", "max_quads").ok().flatten() {
            self.max_quads = (max_quads as u32).max(1);
        }
        if let Some(slots) = config.getuint("render", "texture_slots").ok().flatten() {
            self.texture_slots = self.clamp_slots(slots as usize);
        }

        info!(
            "Loaded render config: max_quads={}, texture_slots={}",
            self.max_quads, self.texture_slots
        );

        Ok(())
    }

    fn clamp_slots(&self, slots: usize) -> usize {
        if slots == 0 || slots > MAX_TEXTURE_SLOTS {
            warn!(
                "texture_slots {} outside 1..={}, clamping",
                slots, MAX_TEXTURE_SLOTS
            );
            slots.clamp(1, MAX_TEXTURE_SLOTS)
        } else {
            slots
        }
    }
}
