//! Snapshot system: builds a DefenseSnapshot from the map.

use bulwark_core::components::*;
use bulwark_core::enums::{ShieldStatus, TurretMode};
use bulwark_core::events::{Alert, DefenseEvent};
use bulwark_core::state::*;
use bulwark_core::types::{Cell, SimTime};

use crate::map::Map;

/// Build a complete snapshot of every installation.
pub fn build_snapshot(
    map: &Map,
    time: &SimTime,
    hostile_threat_present: bool,
    events: Vec<DefenseEvent>,
    alerts: Vec<Alert>,
) -> DefenseSnapshot {
    let world = map.world();

    let mut turrets: Vec<TurretView> = world
        .query::<(&Installation, &Cell, &AreaTurret, &TurretTop, Option<&TurretMode>)>()
        .iter()
        .map(|(_, (installation, cell, turret, top, mode))| TurretView {
            installation: installation.id,
            position: *cell,
            mode: mode.copied().unwrap_or_default(),
            ammo_remaining: turret.ammo_remaining,
            ammo_max: turret.ammo_max,
            ticks_since_reload: turret.ticks_since_reload,
            orientation: top.orientation,
        })
        .collect();
    turrets.sort_by_key(|view| view.installation);

    let mut shields: Vec<ShieldView> = world
        .query::<(
            &Installation,
            &Cell,
            &ProjectileShield,
            &PowerTrader,
            Option<&ShieldStatus>,
        )>()
        .iter()
        .map(|(_, (installation, cell, shield, power, status))| ShieldView {
            installation: installation.id,
            position: *cell,
            status: status.copied().unwrap_or_default(),
            covered_cells: shield.covered_cells.len() as u32,
            cooldown_ticks_remaining: shield.cooldown_ticks_remaining,
            power_output: power.power_output,
            color: shield.color,
        })
        .collect();
    shields.sort_by_key(|view| view.installation);

    let mut laser_grids: Vec<LaserGridView> = world
        .query::<(&Installation, &Cell, &LaserGridEmitter, &PowerTrader)>()
        .iter()
        .map(|(_, (installation, cell, emitter, power))| LaserGridView {
            installation: installation.id,
            position: *cell,
            grid_cells: emitter.grid_cells.len() as u32,
            raised: emitter.grid_raised,
            manual_mode: emitter.manual_mode,
            power_output: power.power_output,
        })
        .collect();
    laser_grids.sort_by_key(|view| view.installation);

    DefenseSnapshot {
        time: *time,
        hostile_threat_present,
        turrets,
        shields,
        laser_grids,
        events,
        alerts,
    }
}
