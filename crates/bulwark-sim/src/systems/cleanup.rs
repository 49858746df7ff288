//! Cleanup system: removes entities that left the map or lost their owner.

use std::collections::HashSet;

use hecs::Entity;

use bulwark_core::components::{Installation, LaserGridSegment};
use bulwark_core::types::{Cell, InstallationId};

use crate::components::Contents;
use crate::map::Map;

/// Remove out-of-bounds entities and grid segments whose emitter is gone,
/// then drop dead occupants from container contents.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(map: &mut Map, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    let bounds = map.size();

    // Installations are never removed for leaving the map.
    let world = map.world();
    for (entity, cell) in world.query::<&Cell>().iter() {
        if !bounds.contains(cell) && world.get::<&Installation>(entity).is_err() {
            despawn_buffer.push(entity);
        }
    }

    let emitters: HashSet<InstallationId> = map
        .world()
        .query::<&Installation>()
        .iter()
        .map(|(_, installation)| installation.id)
        .collect();
    for (entity, segment) in map.world().query::<&LaserGridSegment>().iter() {
        if !emitters.contains(&segment.emitter) {
            despawn_buffer.push(entity);
        }
    }

    despawn_buffer.sort_by_key(|entity| entity.id());
    despawn_buffer.dedup();
    for entity in despawn_buffer.drain(..) {
        map.destroy(entity);
    }

    let live: HashSet<Entity> = map.world().iter().map(|entity| entity.entity()).collect();
    for (_, contents) in map.world_mut().query_mut::<&mut Contents>() {
        contents.occupants.retain(|occupant| live.contains(occupant));
    }
}
