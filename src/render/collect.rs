//! Entity collection: turn the world's drawables into an ordered draw
//! list.
//!
//! The collector queries every entity carrying a
//! [`Drawable`](crate::components::drawable::Drawable), filters by
//! visibility, and emits [`DrawEntry`] keys sorted by ascending layer with
//! the entity id as tie-break, so same-layer overlap is deterministic
//! across runs. Entity references are never retained across frames;
//! entries hold ids only and components are looked up again at pack time.

use std::collections::hash_map::Entry;

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::trace;
use rustc_hash::FxHashMap;

use crate::color::Rgba;
use crate::components::drawable::{Drawable, UvRect};
use crate::components::transform2d::Transform2D;
use crate::render::batch::{PackedQuad, VertexLayout};

/// Transient draw-list key, valid for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DrawEntry {
    /// Paint order, lower draws first.
    pub layer: i32,
    pub entity: Entity,
}

/// What a frame's collection pass saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Entries emitted into the draw list.
    pub collected: u32,
    /// Entities skipped for lacking a [`Transform2D`].
    pub missing_transform: u32,
    /// Entities whose derived quad inputs changed since last frame.
    pub changed: u32,
}

#[derive(Clone, Copy, PartialEq)]
struct QuadSnapshot {
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    size: Vec2,
    color: Rgba,
    uv: UvRect,
    layout: VertexLayout,
}

struct CacheEntry {
    stamp: u64,
    snapshot: QuadSnapshot,
    quad: Option<PackedQuad>,
}

/// Per-entity cache of derived quad data and the inputs it was packed
/// from.
///
/// The collector snapshots each entity's quad inputs; while they hold
/// still, the [`PackedQuad`] stored by the pipeline stays valid and the
/// per-quad packing work is skipped entirely. Any input change drops the
/// derived data so the pipeline repacks. Entries for entities no longer
/// present in the store are purged at the end of each frame; the entity
/// store is the source of truth for validity, and entity ids may be
/// recycled.
#[derive(Default)]
pub struct RenderCache {
    entries: FxHashMap<Entity, CacheEntry>,
    frame: u64,
}

impl RenderCache {
    /// Start a new frame. Subsequent [`note`](Self::note) calls stamp
    /// entries with this frame.
    pub fn begin_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Record an entity's current quad inputs. Returns `true` when they
    /// differ from the previous frame (or the entity is new); a change
    /// also drops the entity's cached derived data.
    fn note(&mut self, entity: Entity, snapshot: QuadSnapshot) -> bool {
        match self.entries.entry(entity) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let changed = entry.snapshot != snapshot;
                entry.stamp = self.frame;
                entry.snapshot = snapshot;
                if changed {
                    entry.quad = None;
                }
                changed
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry {
                    stamp: self.frame,
                    snapshot,
                    quad: None,
                });
                true
            }
        }
    }

    /// Derived quad data from a previous frame, still valid for the
    /// entity's current inputs. `None` for new or changed entities.
    pub fn packed(&self, entity: Entity) -> Option<PackedQuad> {
        self.entries.get(&entity).and_then(|entry| entry.quad)
    }

    /// Keep an entity's freshly packed quad for reuse while it holds
    /// still.
    pub fn store_packed(&mut self, entity: Entity, quad: PackedQuad) {
        if let Some(entry) = self.entries.get_mut(&entity) {
            entry.quad = Some(quad);
        }
    }

    /// Drop entries not seen this frame (despawned or no longer drawable).
    pub fn purge_stale(&mut self) {
        let frame = self.frame;
        self.entries.retain(|_, entry| entry.stamp == frame);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the frame's ordered draw list.
///
/// Invisible entities are skipped silently. Entities with a `Drawable` but
/// no `Transform2D` are a data error: skipped, and logged in debug builds
/// only.
pub fn collect_draw_list(
    world: &mut World,
    cache: &mut RenderCache,
    out: &mut Vec<DrawEntry>,
) -> CollectStats {
    let mut stats = CollectStats::default();
    out.clear();

    let mut query = world.query::<(Entity, &Drawable, Option<&Transform2D>)>();
    for (entity, drawable, transform) in query.iter(world) {
        if !drawable.visible {
            continue;
        }
        let Some(transform) = transform else {
            stats.missing_transform += 1;
            #[cfg(debug_assertions)]
            log::debug!("Entity {:?} has a Drawable but no Transform2D, skipping", entity);
            continue;
        };

        if cache.note(
            entity,
            QuadSnapshot {
                position: transform.position,
                rotation: transform.rotation,
                scale: transform.scale,
                size: drawable.size,
                color: drawable.color,
                uv: drawable.uv(),
                layout: drawable.vertex_layout(),
            },
        ) {
            stats.changed += 1;
        }

        out.push(DrawEntry {
            layer: drawable.layer,
            entity,
        });
        stats.collected += 1;
    }

    // Layer ascending, entity id as tie-break. Keys are unique per entity,
    // so an unstable sort is still deterministic.
    out.sort_unstable_by_key(|e| (e.layer, e.entity));

    trace!(
        "collected {} entries ({} changed, {} missing transform)",
        stats.collected, stats.changed, stats.missing_transform
    );
    stats
}
