//! Shared 2D camera resource.
//!
//! Holds the world/screen transform every render pass agrees on. Update this
//! resource to pan/zoom/rotate the view; the view and projection matrices
//! are recomputed lazily on access, so a static camera costs nothing across
//! repeated matrix reads within a frame.

use bevy_ecs::prelude::Resource;
use glam::{Mat4, Vec2, Vec3};
use log::warn;

/// Smallest accepted zoom. Non-positive zoom values are clamped here.
pub const MIN_ZOOM: f32 = 1e-4;

/// Where the projection places the world origin on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Origin at the viewport center, Y up.
    Centered,
    /// Origin at the top-left corner, Y down. World `(0,0)` maps to the
    /// screen's top-left, `(width,height)` to the bottom-right.
    ScreenSpace,
}

/// ECS resource that holds the active 2D camera parameters.
///
/// Typically inserted during setup or scene loading, read by the render
/// pipeline, and mutated by camera-controller systems. Setters only mark
/// the camera dirty; matrix work happens on the next
/// [`view_matrix`](Camera2D::view_matrix) /
/// [`projection_matrix`](Camera2D::projection_matrix) access.
#[derive(Resource)]
pub struct Camera2D {
    position: Vec2,
    rotation: f32,
    zoom: f32,
    viewport: Vec2,
    mode: ProjectionMode,
    dirty: bool,
    view: Mat4,
    projection: Mat4,
}

impl Camera2D {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut cam = Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            zoom: 1.0,
            viewport: Vec2::new(viewport_width, viewport_height),
            mode: ProjectionMode::ScreenSpace,
            dirty: true,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        cam.recompute();
        cam
    }

    pub fn with_mode(mut self, mode: ProjectionMode) -> Self {
        self.set_projection_mode(mode);
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.dirty = true;
    }

    /// Set the zoom factor. Non-positive values are corrected to
    /// [`MIN_ZOOM`] rather than rejected.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom < MIN_ZOOM {
            warn!("Camera zoom {} is below the minimum {}, clamping", zoom, MIN_ZOOM);
            self.zoom = MIN_ZOOM;
        } else {
            self.zoom = zoom;
        }
        self.dirty = true;
    }

    /// Rotation in radians, counter-clockwise.
    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
        self.dirty = true;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.dirty = true;
    }

    /// Switch projection mode. Recomputes immediately using the last known
    /// viewport so the new projection is valid before the next access.
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
        self.recompute();
    }

    /// World-to-view matrix: the inverse of the camera's
    /// position/rotation/zoom transform. Recomputed lazily if dirty.
    pub fn view_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.recompute();
        }
        self.view
    }

    /// Orthographic projection for the current mode and viewport.
    /// Recomputed lazily if dirty.
    pub fn projection_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.recompute();
        }
        self.projection
    }

    fn recompute(&mut self) {
        self.view = Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
            * Mat4::from_rotation_z(-self.rotation)
            * Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));

        let (w, h) = (self.viewport.x, self.viewport.y);
        self.projection = match self.mode {
            ProjectionMode::Centered => {
                Mat4::orthographic_rh(-w * 0.5, w * 0.5, -h * 0.5, h * 0.5, -1.0, 1.0)
            }
            ProjectionMode::ScreenSpace => Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0),
        };
        self.dirty = false;
    }
}
