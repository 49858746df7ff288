//! Projectile shield controller.
//!
//! A shield covers the cells of a named region. While active it destroys
//! every hostile projectile over those cells and pays for each interception
//! from its network's stored energy. Running dry overloads the shield: it
//! emits an energy disruption and stays down for the configured cooldown.
//! A shield stays up for a grace period after the last threat leaves.

use std::collections::BTreeSet;

use hecs::Entity;

use bulwark_core::components::{Installation, Projectile, ProjectileShield};
use bulwark_core::config::DefenseSettings;
use bulwark_core::constants::*;
use bulwark_core::enums::{AlertLevel, ShieldStatus, SoundCue};
use bulwark_core::events::{Alert, DefenseEvent};
use bulwark_core::state::{ShieldInspect, ShieldInspectStatus};
use bulwark_core::types::{ticks_to_secs, Cell, InstallationId};
use bulwark_threat::{any_hostile_threat_present, ThreatWorld};

use crate::ledger::{EnergyLedger, LedgerError, Withdrawal};
use crate::map::Map;

/// Outcome of one projectile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassOutcome {
    pub intercepted: u32,
    pub overloaded: bool,
    /// The energy ledger misbehaved; the pass was abandoned.
    pub faulted: bool,
}

/// Run every shield for one tick.
pub fn run(
    map: &mut Map,
    settings: &DefenseSettings,
    events: &mut Vec<DefenseEvent>,
    alerts: &mut Vec<Alert>,
    current_tick: u64,
) {
    let threat_present = any_hostile_threat_present(map, settings.defending_faction);

    let mut shields: Vec<Entity> = map
        .world()
        .query::<(&Installation, &ProjectileShield)>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    shields.sort_by_key(|entity| entity.id());

    for entity in shields {
        tick_shield(
            map,
            entity,
            settings,
            threat_present,
            events,
            alerts,
            current_tick,
        );
    }
}

/// Tick one shield.
#[allow(clippy::too_many_arguments)]
pub fn tick_shield(
    map: &mut Map,
    entity: Entity,
    settings: &DefenseSettings,
    threat_present: bool,
    events: &mut Vec<DefenseEvent>,
    alerts: &mut Vec<Alert>,
    current_tick: u64,
) -> PassOutcome {
    let Some((installation, origin, mut shield)) = read_state(map, entity) else {
        return PassOutcome::default();
    };
    if !installation.spawned {
        return PassOutcome::default();
    }

    let powered = map.is_powered(entity);
    let mut outcome = PassOutcome::default();
    let mut draw = 0.0;

    if shield.is_on_cooldown() {
        shield.cooldown_ticks_remaining -= 1;
    } else if is_active(&mut shield, powered, threat_present, settings) {
        shield.active_idle_timer = shield.active_idle_timer.saturating_add(1);
        outcome = shield_things(
            map,
            entity,
            installation.id,
            origin,
            &mut shield,
            settings,
            events,
            alerts,
            current_tick,
        );
        if !outcome.overloaded {
            draw = settings.shield_power_usage(shield.covered_cells.len());
        }
    }
    map.set_power_output(entity, draw);

    let status = status_of(&shield, powered, threat_present, settings);
    write_state(map, entity, shield, status);
    outcome
}

/// Whether the shield should act this tick. Seeing a threat resets the
/// idle timer.
pub fn is_active(
    shield: &mut ProjectileShield,
    powered: bool,
    threat_present: bool,
    settings: &DefenseSettings,
) -> bool {
    if shield.is_on_cooldown() || !powered {
        return false;
    }
    if threat_present {
        shield.active_idle_timer = 0;
        return true;
    }
    shield.active_idle_timer <= settings.shield_shutdown_delay_ticks
}

/// Energy to stop one projectile.
pub fn intercept_cost(damage_amount: i32, settings: &DefenseSettings) -> f32 {
    let drained = damage_amount as f32 * settings.percentage_of_damage_drained as f32 / 100.0;
    (settings.shield_intercept_cost_wd + drained).max(0.0)
}

/// Intercept hostile projectiles over every covered cell. The first
/// overload ends the pass.
#[allow(clippy::too_many_arguments)]
fn shield_things(
    map: &mut Map,
    entity: Entity,
    id: InstallationId,
    origin: Cell,
    shield: &mut ProjectileShield,
    settings: &DefenseSettings,
    events: &mut Vec<DefenseEvent>,
    alerts: &mut Vec<Alert>,
    current_tick: u64,
) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    let bounds = map.size();
    let covered: BTreeSet<Cell> = shield
        .covered_cells
        .iter()
        .copied()
        .filter(|cell| bounds.contains(cell))
        .collect();

    for (cell, projectile) in map.projectiles_within(&covered) {
        if map.is_destroyed(projectile) {
            continue;
        }
        let Ok(data) = map.world().get::<&Projectile>(projectile).map(|p| *p) else {
            continue;
        };
        if data.launcher_faction == Some(settings.defending_faction) {
            continue;
        }

        let cost = intercept_cost(data.damage_amount, settings);
        match consume_energy(map, entity, cost) {
            Ok(true) => {
                map.destroy(projectile);
                outcome.intercepted += 1;
                events.push(DefenseEvent::ProjectileIntercepted {
                    installation: id,
                    at: cell,
                    cost_wd: cost,
                });
            }
            Ok(false) => {
                if trigger_overload(
                    map,
                    id,
                    origin,
                    shield,
                    settings,
                    events,
                    alerts,
                    current_tick,
                ) {
                    outcome.overloaded = true;
                    return outcome;
                }
            }
            Err(err) => {
                tracing::error!(
                    target: "bulwark::shield",
                    installation = id.0,
                    error = %err,
                    "energy ledger fault, abandoning pass"
                );
                outcome.faulted = true;
                return outcome;
            }
        }
    }
    outcome
}

/// Try to pay `cost` from the shield's network. `Ok(false)` means there was
/// not enough stored energy (or no network at all).
fn consume_energy(map: &mut Map, entity: Entity, cost: f32) -> Result<bool, LedgerError> {
    let Some(net) = map.power_net_of(entity) else {
        return Ok(false);
    };
    match map.ledger(net).try_withdraw(cost)? {
        Withdrawal::Drawn => Ok(true),
        Withdrawal::Insufficient { .. } => Ok(false),
    }
}

/// Start the overload cooldown. Returns false when overloads are disabled.
#[allow(clippy::too_many_arguments)]
fn trigger_overload(
    map: &Map,
    id: InstallationId,
    origin: Cell,
    shield: &mut ProjectileShield,
    settings: &DefenseSettings,
    events: &mut Vec<DefenseEvent>,
    alerts: &mut Vec<Alert>,
    current_tick: u64,
) -> bool {
    if settings.shield_cooldown_ticks == 0 {
        return false;
    }
    shield.cooldown_ticks_remaining = settings.shield_cooldown_ticks;
    shield.active_idle_timer = 0;

    let bounds = map.size();
    for cell in shield.covered_cells.iter().filter(|cell| bounds.contains(cell)) {
        events.push(DefenseEvent::OverloadSpark { at: *cell });
    }
    let radius = (shield.covered_cells.len() as u32).min(OVERLOAD_DISRUPTION_MAX_RADIUS);
    events.push(DefenseEvent::EnergyDisruption {
        center: origin,
        radius,
        damage: OVERLOAD_DISRUPTION_DAMAGE,
    });
    events.push(DefenseEvent::Sound {
        cue: SoundCue::ShieldHit,
        at: origin,
    });
    alerts.push(Alert {
        level: AlertLevel::Critical,
        message: OVERLOAD_MESSAGE.to_string(),
        tick: current_tick,
        installation: Some(id),
    });
    tracing::info!(
        target: "bulwark::shield",
        installation = id.0,
        cooldown_ticks = settings.shield_cooldown_ticks,
        "shield overloaded"
    );
    true
}

/// Point `shield` at a region, or clear it with `None`. Unknown labels
/// leave the shield with no region.
pub fn select_region(map: &Map, shield: &mut ProjectileShield, label: Option<&str>) {
    let cells = label.and_then(|label| map.region_cells(label));
    match (label, cells) {
        (Some(label), Some(cells)) => {
            shield.selected_region = Some(label.to_string());
            shield.covered_cells = cells.to_vec();
        }
        (Some(label), None) => {
            tracing::warn!(target: "bulwark::shield", region = label, "unknown region, clearing selection");
            shield.selected_region = None;
            shield.covered_cells.clear();
        }
        (None, _) => {
            shield.selected_region = None;
            shield.covered_cells.clear();
        }
    }
    shield.render_dirty = true;
}

/// Reattach a saved region label. The label is kept even when the region is
/// not defined yet; a later `DefineRegion` fills in the covered cells.
pub fn restore_region(map: &Map, shield: &mut ProjectileShield, label: Option<String>) {
    shield.covered_cells = label
        .as_deref()
        .and_then(|label| map.region_cells(label))
        .map(<[Cell]>::to_vec)
        .unwrap_or_default();
    if let (Some(label), true) = (&label, shield.covered_cells.is_empty()) {
        tracing::debug!(target: "bulwark::shield", region = %label, "saved region not defined yet");
    }
    shield.selected_region = label;
    shield.render_dirty = true;
}

/// Re-materialize the covered cells of every shield that selects `label`.
pub fn refresh_region(map: &mut Map, label: &str) {
    let cells: Option<Vec<Cell>> = map.region_cells(label).map(<[Cell]>::to_vec);
    for (_entity, shield) in map.world_mut().query_mut::<&mut ProjectileShield>() {
        if shield.selected_region.as_deref() != Some(label) {
            continue;
        }
        match &cells {
            Some(cells) => shield.covered_cells = cells.clone(),
            None => {
                shield.selected_region = None;
                shield.covered_cells.clear();
            }
        }
        shield.render_dirty = true;
    }
}

/// Coarse status for snapshots.
pub fn status_of(
    shield: &ProjectileShield,
    powered: bool,
    threat_present: bool,
    settings: &DefenseSettings,
) -> ShieldStatus {
    if shield.is_on_cooldown() {
        ShieldStatus::Cooldown
    } else if !powered {
        ShieldStatus::Offline
    } else if threat_present || shield.active_idle_timer <= settings.shield_shutdown_delay_ticks {
        ShieldStatus::Active
    } else {
        ShieldStatus::Idle
    }
}

/// Inspect panel contents for a shield.
pub fn inspect(
    shield: &ProjectileShield,
    powered: bool,
    threat_present: bool,
    settings: &DefenseSettings,
) -> ShieldInspect {
    let status = match status_of(shield, powered, threat_present, settings) {
        ShieldStatus::Cooldown => ShieldInspect::cooldown(shield.cooldown_ticks_remaining),
        ShieldStatus::Offline => ShieldInspectStatus::Offline,
        ShieldStatus::Idle => ShieldInspectStatus::Idle,
        ShieldStatus::Active => ShieldInspectStatus::Active,
    };
    let region = shield
        .selected_region
        .as_ref()
        .map(|label| (label.clone(), shield.covered_cells.len() as u32));
    let power_use_watts =
        powered.then(|| settings.shield_power_usage(shield.covered_cells.len()));
    let overload_cooldown_secs = (settings.shield_cooldown_ticks > 0)
        .then(|| ticks_to_secs(settings.shield_cooldown_ticks));

    ShieldInspect {
        status,
        region,
        power_use_watts,
        overload_cooldown_secs,
    }
}

fn read_state(map: &Map, entity: Entity) -> Option<(Installation, Cell, ProjectileShield)> {
    let world = map.world();
    let installation = *world.get::<&Installation>(entity).ok()?;
    let origin = *world.get::<&Cell>(entity).ok()?;
    let shield = ProjectileShield::clone(&*world.get::<&ProjectileShield>(entity).ok()?);
    Some((installation, origin, shield))
}

fn write_state(map: &mut Map, entity: Entity, shield: ProjectileShield, status: ShieldStatus) {
    let world = map.world_mut();
    if let Ok(mut stored) = world.get::<&mut ProjectileShield>(entity) {
        *stored = shield;
    }
    if let Ok(mut stored) = world.get::<&mut ShieldStatus>(entity) {
        *stored = status;
    }
}
