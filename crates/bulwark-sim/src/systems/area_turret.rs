//! Area turret: an ammo-limited anti-air emplacement.
//!
//! Each tick a powered turret gathers every hostile airborne threat in range,
//! picks at most `ammo_remaining` of them at random and resolves each shot
//! immediately (no projectile travel). Ammo refills when the reload period
//! elapses. Drop pods are either destroyed outright or have their hostile
//! occupants shot through the hull.

use hecs::Entity;
use rand::Rng;

use bulwark_core::components::{AreaTurret, Installation, TurretTop};
use bulwark_core::config::DefenseSettings;
use bulwark_core::constants::*;
use bulwark_core::enums::{SoundCue, TurretMode};
use bulwark_core::events::DefenseEvent;
use bulwark_core::types::Cell;
use bulwark_threat::classifier::{faction_hostile, has_contents, occupants_of};
use bulwark_threat::targeting::{gather_turret_targets, select_targets, within_range};
use bulwark_threat::ThreatWorld;

use crate::map::Map;
use crate::systems::turret_top;

/// Run every area turret for one tick.
pub fn run<R: Rng + ?Sized>(
    map: &mut Map,
    settings: &DefenseSettings,
    rng: &mut R,
    events: &mut Vec<DefenseEvent>,
) {
    let mut turrets: Vec<Entity> = map
        .world()
        .query::<(&Installation, &AreaTurret)>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    turrets.sort_by_key(|entity| entity.id());

    for entity in turrets {
        tick_turret(map, entity, settings, rng, events);
    }
}

/// Tick one turret. Returns the number of shots fired.
pub fn tick_turret<R: Rng + ?Sized>(
    map: &mut Map,
    entity: Entity,
    settings: &DefenseSettings,
    rng: &mut R,
    events: &mut Vec<DefenseEvent>,
) -> u32 {
    let Some((installation, origin, mut turret, mut top)) = read_state(map, entity) else {
        return 0;
    };
    if !installation.spawned {
        return 0;
    }

    let mut pass = FiringPass::default();
    if map.is_powered(entity) {
        turret.ticks_since_reload = turret.ticks_since_reload.saturating_add(1);
        pass = shoot_things(map, origin, &mut turret, &mut top, settings, rng, events);
        if turret.ticks_since_reload >= turret.reload_period_ticks {
            reload(&mut turret);
        }
    }
    turret_top::tick(&mut top, rng);

    // Engaging tracks threats in range, not shots: an empty magazine still engages.
    let mode = if pass.threats_in_range > 0 {
        TurretMode::Engaging
    } else {
        TurretMode::Idle
    };
    let world = map.world_mut();
    if let Ok(mut stored) = world.get::<&mut AreaTurret>(entity) {
        *stored = turret;
    }
    if let Ok(mut stored) = world.get::<&mut TurretTop>(entity) {
        *stored = top;
    }
    if let Ok(mut stored) = world.get::<&mut TurretMode>(entity) {
        *stored = mode;
    }
    pass.fired
}

#[derive(Debug, Default, Clone, Copy)]
struct FiringPass {
    threats_in_range: usize,
    fired: u32,
}

fn read_state(map: &Map, entity: Entity) -> Option<(Installation, Cell, AreaTurret, TurretTop)> {
    let world = map.world();
    let installation = *world.get::<&Installation>(entity).ok()?;
    let origin = *world.get::<&Cell>(entity).ok()?;
    let turret = *world.get::<&AreaTurret>(entity).ok()?;
    let top = *world.get::<&TurretTop>(entity).ok()?;
    Some((installation, origin, turret, top))
}

fn reload(turret: &mut AreaTurret) {
    turret.ammo_remaining = turret.ammo_max;
    turret.ticks_since_reload = 0;
}

/// One firing pass over the hostile threats in range.
fn shoot_things<R: Rng + ?Sized>(
    map: &mut Map,
    origin: Cell,
    turret: &mut AreaTurret,
    top: &mut TurretTop,
    settings: &DefenseSettings,
    rng: &mut R,
    events: &mut Vec<DefenseEvent>,
) -> FiringPass {
    let targets = gather_turret_targets(map, settings.defending_faction);
    if targets.is_empty() {
        return FiringPass::default();
    }
    let in_range = within_range(map, targets, origin, turret.range_cells);
    let threats_in_range = in_range.len();
    if turret.ammo_remaining == 0 {
        return FiringPass { threats_in_range, fired: 0 };
    }
    let selected = select_targets(in_range, turret.ammo_remaining, rng);
    if selected.is_empty() {
        return FiringPass { threats_in_range, fired: 0 };
    }

    for &target in &selected {
        engage(map, origin, target, top, settings, rng, events);
    }

    let fired = selected.len() as u32;
    turret.ammo_remaining = turret.ammo_remaining.saturating_sub(fired);
    turret.ticks_since_reload = 0;
    tracing::debug!(
        target: "bulwark::turret",
        x = origin.x,
        z = origin.z,
        fired,
        ammo_left = turret.ammo_remaining,
        "firing pass"
    );
    FiringPass { threats_in_range, fired }
}

/// Resolve a single shot against `target`.
fn engage<R: Rng + ?Sized>(
    map: &mut Map,
    origin: Cell,
    target: Entity,
    top: &mut TurretTop,
    settings: &DefenseSettings,
    rng: &mut R,
    events: &mut Vec<DefenseEvent>,
) {
    let Some(target_cell) = map.position_of(target) else {
        return;
    };
    turret_top::aim_at(top, origin, target_cell, rng);

    if has_contents(map, target) {
        if roll_destroy(settings.destroy_chance_percent, rng) {
            destroy_target(map, target, target_cell, rng, events);
        } else {
            damage_occupants(map, target, target_cell, settings, rng, events);
        }
    } else {
        destroy_target(map, target, target_cell, rng, events);
    }

    events.push(DefenseEvent::Sound {
        cue: SoundCue::TurretFire,
        at: origin,
    });
    events.push(tracer_trail(origin, target_cell, rng));
}

/// `chance_percent` of 0 never destroys, 100 always does.
pub fn roll_destroy<R: Rng + ?Sized>(chance_percent: u32, rng: &mut R) -> bool {
    rng.gen_range(0..100) < chance_percent
}

fn destroy_target<R: Rng + ?Sized>(
    map: &mut Map,
    target: Entity,
    at: Cell,
    rng: &mut R,
    events: &mut Vec<DefenseEvent>,
) {
    map.destroy(target);
    events.push(DefenseEvent::Shrapnel {
        at,
        count: SHRAPNEL_ON_DESTROY,
        angle: rng.gen_range(0.0..360.0),
    });
}

/// Shoot each hostile occupant between 1 and `max_shots_per_occupant` times.
/// Friendly occupants are untouched.
fn damage_occupants<R: Rng + ?Sized>(
    map: &mut Map,
    container: Entity,
    at: Cell,
    settings: &DefenseSettings,
    rng: &mut R,
    events: &mut Vec<DefenseEvent>,
) {
    let occupants = occupants_of(map, container).unwrap_or_default();
    for occupant in occupants {
        if map.is_destroyed(occupant)
            || !faction_hostile(map, occupant, settings.defending_faction)
        {
            continue;
        }
        let hits = rng.gen_range(1..=settings.max_shots_per_occupant.max(1));
        for _ in 0..hits {
            if map.apply_damage(occupant, settings.bullet_damage) {
                break;
            }
        }
    }
    events.push(DefenseEvent::Shrapnel {
        at,
        count: SHRAPNEL_ON_DAMAGE,
        angle: rng.gen_range(0.0..360.0),
    });
}

/// Trail from the turret to a jittered point near the target.
fn tracer_trail<R: Rng + ?Sized>(origin: Cell, target: Cell, rng: &mut R) -> DefenseEvent {
    let from = origin.center();
    let jitter = glam::Vec2::new(
        rng.gen_range(-TRACER_END_JITTER..=TRACER_END_JITTER),
        rng.gen_range(-TRACER_END_JITTER..=TRACER_END_JITTER),
    );
    let to = target.center() + jitter;
    let puffs = (from.distance(to) / TRACER_STEP).ceil() as u32;
    DefenseEvent::TracerTrail { from, to, puffs }
}
