//! Laser grid: an emitter and a receiver facing each other across a gap.
//!
//! When a hostile threat is on the map the emitter raises grid segments on
//! every cell between the two. Raising is refused while a pawn stands in
//! the way. In manual mode the grid only moves on command.

use hecs::Entity;

use bulwark_core::components::{Installation, LaserGridEmitter, LaserGridSegment};
use bulwark_core::config::DefenseSettings;
use bulwark_core::events::DefenseEvent;
use bulwark_core::types::{Cell, InstallationId};
use bulwark_threat::any_hostile_threat_present;
use bulwark_threat::registry::names;

use crate::map::{BeamScan, Map};

/// Run every laser grid emitter for one tick.
pub fn run(map: &mut Map, settings: &DefenseSettings, events: &mut Vec<DefenseEvent>) {
    let threat_present = any_hostile_threat_present(map, settings.defending_faction);

    let mut emitters: Vec<Entity> = map
        .world()
        .query::<(&Installation, &LaserGridEmitter)>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    emitters.sort_by_key(|entity| entity.id());

    for entity in emitters {
        tick_emitter(map, entity, settings, threat_present, events);
    }
}

/// Tick one emitter.
pub fn tick_emitter(
    map: &mut Map,
    entity: Entity,
    settings: &DefenseSettings,
    threat_present: bool,
    events: &mut Vec<DefenseEvent>,
) {
    let Some((installation, origin, mut emitter)) = read_state(map, entity) else {
        return;
    };
    if !installation.spawned {
        return;
    }

    if emitter.grid_cells.is_empty() {
        rescan(map, &installation, origin, &mut emitter, settings);
    }
    let receiver_present = emitter.receiver.is_some_and(|cell| map.receiver_at(cell));
    if !receiver_present {
        lower(map, entity, installation.id, &mut emitter, events);
        emitter.grid_cells.clear();
        emitter.receiver = None;
    }

    if !emitter.manual_mode {
        let active = map.is_powered(entity) && threat_present;
        if active && !emitter.grid_raised && !emitter.grid_cells.is_empty() {
            raise(map, entity, installation.id, &mut emitter, settings, events);
        } else if !active && emitter.grid_raised {
            lower(map, entity, installation.id, &mut emitter, events);
        }
    }

    write_state(map, entity, emitter);
}

/// Look for a receiver in front of the emitter.
pub fn rescan(
    map: &Map,
    installation: &Installation,
    origin: Cell,
    emitter: &mut LaserGridEmitter,
    settings: &DefenseSettings,
) {
    match map.scan_for_receiver(origin, installation.facing, settings.max_laser_grid_distance) {
        Some((receiver, cells)) => {
            emitter.receiver = Some(receiver);
            emitter.grid_cells = cells;
        }
        None => {
            emitter.receiver = None;
            emitter.grid_cells.clear();
        }
    }
}

/// Spawn segments over the grid cells. Aborts (and lowers) if a pawn is in
/// the way. Returns whether the grid is now raised.
pub fn raise(
    map: &mut Map,
    entity: Entity,
    id: InstallationId,
    emitter: &mut LaserGridEmitter,
    settings: &DefenseSettings,
    events: &mut Vec<DefenseEvent>,
) -> bool {
    if emitter.grid_cells.iter().any(|&cell| map.pawn_at(cell)) {
        lower(map, entity, id, emitter, events);
        return false;
    }
    let Some(kind) = map.kind_id(names::LASER_GRID) else {
        tracing::warn!(target: "bulwark::laser_grid", "laser grid kind missing from registry");
        return false;
    };

    for &cell in &emitter.grid_cells {
        map.world_mut().spawn((
            bulwark_core::components::Kind(kind),
            cell,
            LaserGridSegment { emitter: id },
        ));
    }
    emitter.grid_raised = true;
    let cells = emitter.grid_cells.len();
    map.set_power_output(entity, settings.laser_grid_power_usage(cells));
    events.push(DefenseEvent::GridRaised {
        installation: id,
        cells: cells as u32,
    });
    tracing::debug!(target: "bulwark::laser_grid", installation = id.0, cells, "grid raised");
    true
}

/// Despawn every segment of this emitter and stop drawing power.
pub fn lower(
    map: &mut Map,
    entity: Entity,
    id: InstallationId,
    emitter: &mut LaserGridEmitter,
    events: &mut Vec<DefenseEvent>,
) {
    let segments: Vec<Entity> = map
        .world()
        .query::<&LaserGridSegment>()
        .iter()
        .filter(|(_, segment)| segment.emitter == id)
        .map(|(segment, _)| segment)
        .collect();
    for segment in segments {
        map.destroy(segment);
    }
    map.set_power_output(entity, 0.0);
    if emitter.grid_raised {
        emitter.grid_raised = false;
        events.push(DefenseEvent::GridLowered { installation: id });
    }
}

/// Flip manual mode.
pub fn toggle_manual_mode(map: &mut Map, entity: Entity) {
    if let Ok(mut emitter) = map.world_mut().get::<&mut LaserGridEmitter>(entity) {
        emitter.manual_mode = !emitter.manual_mode;
    }
}

/// Raise or lower the grid by hand. Ignored outside manual mode.
pub fn toggle_grid(
    map: &mut Map,
    entity: Entity,
    settings: &DefenseSettings,
    events: &mut Vec<DefenseEvent>,
) {
    let Some((installation, origin, mut emitter)) = read_state(map, entity) else {
        return;
    };
    if !emitter.manual_mode {
        return;
    }
    if emitter.grid_raised {
        lower(map, entity, installation.id, &mut emitter, events);
    } else {
        if emitter.grid_cells.is_empty() {
            rescan(map, &installation, origin, &mut emitter, settings);
        }
        if !emitter.grid_cells.is_empty() {
            raise(map, entity, installation.id, &mut emitter, settings, events);
        }
    }
    write_state(map, entity, emitter);
}

/// Inspect line for an emitter.
pub fn inspect(emitter: &LaserGridEmitter, settings: &DefenseSettings) -> String {
    if emitter.receiver.is_none() || emitter.grid_cells.is_empty() {
        return "No receiver found within range.".to_string();
    }
    let watts = settings.laser_grid_power_usage(emitter.grid_cells.len());
    format!("Power when active: {:.0} W", watts.abs())
}

fn read_state(map: &Map, entity: Entity) -> Option<(Installation, Cell, LaserGridEmitter)> {
    let world = map.world();
    let installation = *world.get::<&Installation>(entity).ok()?;
    let origin = *world.get::<&Cell>(entity).ok()?;
    let emitter = LaserGridEmitter::clone(&*world.get::<&LaserGridEmitter>(entity).ok()?);
    Some((installation, origin, emitter))
}

fn write_state(map: &mut Map, entity: Entity, emitter: LaserGridEmitter) {
    if let Ok(mut stored) = map.world_mut().get::<&mut LaserGridEmitter>(entity) {
        *stored = emitter;
    }
}
