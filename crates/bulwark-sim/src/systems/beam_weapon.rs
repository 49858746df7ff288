//! Energy beam weapon: every shot is paid for from the network's batteries.

use hecs::Entity;

use bulwark_core::components::{EnergyBeamWeapon, Health};
use bulwark_core::config::DefenseSettings;
use bulwark_core::constants::NOT_ENOUGH_POWER_TEXT;
use bulwark_core::events::DefenseEvent;
use bulwark_core::types::Cell;

use crate::ledger::{EnergyLedger, Withdrawal};
use crate::map::Map;

/// Result of a fire attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    /// Shot fired; `destroyed` is set if the target died.
    Fired { destroyed: bool },
    /// Not wired into a power network.
    NoNetwork,
    /// Not enough stored energy for one shot.
    InsufficientEnergy { available: f32 },
    /// The energy ledger failed; nothing was fired.
    Faulted,
}

/// Fire at the first damageable entity on `target`.
pub fn try_fire(
    map: &mut Map,
    weapon: Entity,
    target: Cell,
    settings: &DefenseSettings,
    events: &mut Vec<DefenseEvent>,
) -> FireOutcome {
    let Some(origin) = map.world().get::<&Cell>(weapon).ok().map(|cell| *cell) else {
        return FireOutcome::NoNetwork;
    };
    let Some(net) = map.power_net_of(weapon) else {
        return FireOutcome::NoNetwork;
    };

    let outcome = match map.ledger(net).try_withdraw(settings.laser_cannon_drain) {
        Ok(Withdrawal::Drawn) => {
            let destroyed = damage_first_at(map, target, settings.laser_cannon_damage);
            FireOutcome::Fired { destroyed }
        }
        Ok(Withdrawal::Insufficient { available }) => {
            events.push(DefenseEvent::TextMote {
                at: origin,
                text: NOT_ENOUGH_POWER_TEXT.to_string(),
            });
            FireOutcome::InsufficientEnergy { available }
        }
        Err(err) => {
            tracing::error!(target: "bulwark::beam", error = %err, "energy ledger fault");
            FireOutcome::Faulted
        }
    };

    if let Ok(mut stats) = map.world_mut().get::<&mut EnergyBeamWeapon>(weapon) {
        match outcome {
            FireOutcome::Fired { .. } => stats.shots_fired += 1,
            _ => stats.shots_refused += 1,
        }
    }
    outcome
}

fn damage_first_at(map: &mut Map, cell: Cell, damage: f32) -> bool {
    let target = map
        .things_at(cell)
        .into_iter()
        .find(|&entity| map.world().get::<&Health>(entity).is_ok());
    match target {
        Some(entity) => map.apply_damage(entity, damage),
        None => false,
    }
}
