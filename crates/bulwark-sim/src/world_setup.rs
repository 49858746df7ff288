//! Entity spawn factories for setting up a defended map.
//!
//! Installations, power storage, threats and projectiles are created here
//! with their full component bundles.

use hecs::Entity;
use thiserror::Error;

use bulwark_core::components::*;
use bulwark_core::config::DefenseSettings;
use bulwark_core::enums::{Facing, ShieldStatus, TurretMode};
use bulwark_core::types::{Cell, FactionId, InstallationId, PowerNetId};
use bulwark_threat::registry::names;

use crate::components::Contents;
use crate::map::Map;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("kind `{0}` is not registered")]
    UnknownKind(String),
    #[error("installation {0:?} already exists")]
    DuplicateInstallation(InstallationId),
}

fn kind(map: &Map, name: &str) -> Result<Kind, SetupError> {
    map.kind_id(name)
        .map(Kind)
        .ok_or_else(|| SetupError::UnknownKind(name.to_string()))
}

fn installation(map: &Map, id: InstallationId, facing: Facing) -> Result<Installation, SetupError> {
    if map.installation_entity(id).is_some() {
        return Err(SetupError::DuplicateInstallation(id));
    }
    Ok(Installation {
        id,
        spawned: true,
        facing,
    })
}

fn power(net: Option<PowerNetId>) -> PowerTrader {
    match net {
        Some(net) => PowerTrader::connected(net),
        None => PowerTrader {
            power_on: false,
            power_output: 0.0,
            net: None,
        },
    }
}

// --- Power ---

/// Spawn a battery holding `stored_energy` watt-days.
pub fn spawn_battery(
    map: &mut Map,
    cell: Cell,
    net: PowerNetId,
    stored_energy: f32,
    capacity: f32,
) -> Result<Entity, SetupError> {
    let kind = kind(map, names::BATTERY)?;
    let order = map.next_spawn_order();
    Ok(map.world_mut().spawn((
        kind,
        cell,
        order,
        Battery {
            stored_energy: stored_energy.min(capacity),
            capacity,
            net,
        },
    )))
}

// --- Installations ---

/// Spawn an area turret with full ammo, configured from `settings`.
pub fn spawn_area_turret(
    map: &mut Map,
    id: InstallationId,
    cell: Cell,
    net: Option<PowerNetId>,
    settings: &DefenseSettings,
) -> Result<Entity, SetupError> {
    let kind = kind(map, names::AA_TURRET)?;
    let installation = installation(map, id, Facing::North)?;
    let turret = AreaTurret {
        range_cells: settings.protection_range,
        reload_period_ticks: settings.reload_period_ticks,
        ticks_since_reload: 0,
        ammo_remaining: settings.ammo_count,
        ammo_max: settings.ammo_count,
    };
    Ok(map.world_mut().spawn((
        installation,
        kind,
        cell,
        power(net),
        turret,
        TurretTop::default(),
        TurretMode::Idle,
    )))
}

/// Spawn a projectile shield with no region selected.
pub fn spawn_shield(
    map: &mut Map,
    id: InstallationId,
    cell: Cell,
    net: Option<PowerNetId>,
    settings: &DefenseSettings,
) -> Result<Entity, SetupError> {
    let kind = kind(map, names::WALL_SHIELD)?;
    let installation = installation(map, id, Facing::North)?;
    Ok(map.world_mut().spawn((
        installation,
        kind,
        cell,
        power(net),
        ProjectileShield::new(settings.shield_shutdown_delay_ticks),
        ShieldStatus::Offline,
    )))
}

/// Spawn a laser grid emitter projecting in `facing`.
pub fn spawn_laser_grid_emitter(
    map: &mut Map,
    id: InstallationId,
    cell: Cell,
    facing: Facing,
    net: Option<PowerNetId>,
) -> Result<Entity, SetupError> {
    let kind = kind(map, names::LASER_GRID_EMITTER)?;
    let installation = installation(map, id, facing)?;
    Ok(map.world_mut().spawn((
        installation,
        kind,
        cell,
        power(net),
        LaserGridEmitter::default(),
    )))
}

pub fn spawn_laser_grid_receiver(map: &mut Map, cell: Cell) -> Result<Entity, SetupError> {
    let kind = kind(map, names::LASER_GRID_RECEIVER)?;
    Ok(map.world_mut().spawn((kind, cell, LaserGridReceiver)))
}

/// Spawn an energy beam weapon wired into `net`.
pub fn spawn_beam_weapon(
    map: &mut Map,
    id: InstallationId,
    cell: Cell,
    net: Option<PowerNetId>,
) -> Result<Entity, SetupError> {
    let kind = kind(map, names::LASER_CANNON)?;
    let installation = installation(map, id, Facing::North)?;
    Ok(map.world_mut().spawn((
        installation,
        kind,
        cell,
        power(net),
        EnergyBeamWeapon::default(),
    )))
}

// --- Threats and other map entities ---

/// Spawn a pawn standing on the map.
pub fn spawn_pawn(
    map: &mut Map,
    kind_name: &str,
    faction: FactionId,
    cell: Cell,
    hit_points: f32,
) -> Result<Entity, SetupError> {
    let kind = kind(map, kind_name)?;
    Ok(map
        .world_mut()
        .spawn((kind, cell, Faction(faction), Health::new(hit_points))))
}

/// Spawn an incoming container (drop pod, cargo capsule) carrying one pawn
/// per entry of `occupants`.
pub fn spawn_container(
    map: &mut Map,
    kind_name: &str,
    cell: Cell,
    occupants: &[(&str, FactionId)],
    occupant_hit_points: f32,
) -> Result<Entity, SetupError> {
    let kind = kind(map, kind_name)?;
    let mut inside = Vec::with_capacity(occupants.len());
    for &(occupant_kind, faction) in occupants {
        let occupant_kind = self::kind(map, occupant_kind)?;
        inside.push(map.world_mut().spawn((
            occupant_kind,
            Faction(faction),
            Health::new(occupant_hit_points),
            Contained,
        )));
    }
    Ok(map.world_mut().spawn((kind, cell, Contents { occupants: inside })))
}

/// Spawn a container-kind entity whose contents cannot be introspected.
pub fn spawn_opaque_container(
    map: &mut Map,
    kind_name: &str,
    cell: Cell,
) -> Result<Entity, SetupError> {
    let kind = kind(map, kind_name)?;
    Ok(map.world_mut().spawn((kind, cell)))
}

/// Spawn a skyfaller or ship part, optionally owned by a faction.
pub fn spawn_skyfaller(
    map: &mut Map,
    kind_name: &str,
    cell: Cell,
    faction: Option<FactionId>,
) -> Result<Entity, SetupError> {
    let kind = kind(map, kind_name)?;
    let entity = map.world_mut().spawn((kind, cell));
    if let Some(faction) = faction {
        let _ = map.world_mut().insert_one(entity, Faction(faction));
    }
    Ok(entity)
}

/// Spawn a projectile in flight over `cell`.
pub fn spawn_projectile(
    map: &mut Map,
    cell: Cell,
    damage_amount: i32,
    launcher_faction: Option<FactionId>,
) -> Result<Entity, SetupError> {
    let kind = kind(map, names::BULLET)?;
    Ok(map.world_mut().spawn((
        kind,
        cell,
        Projectile {
            damage_amount,
            launcher_faction,
        },
    )))
}

/// Spawn a loose item.
pub fn spawn_item(map: &mut Map, cell: Cell) -> Result<Entity, SetupError> {
    let kind = kind(map, names::STEEL)?;
    Ok(map.world_mut().spawn((kind, cell)))
}
