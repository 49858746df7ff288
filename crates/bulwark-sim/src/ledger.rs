//! Stored-energy ledger of a power network.
//!
//! Shields and beam weapons pay for their work out of the batteries on
//! their network. The check and the draw happen in a single call, so no
//! other consumer can spend the same energy in between.

use hecs::{Entity, World};
use thiserror::Error;

use bulwark_core::components::Battery;
use bulwark_core::types::PowerNetId;

use crate::components::SpawnOrder;

/// Tolerance for float drift when summing battery draws.
const DRAW_EPSILON: f32 = 1e-4;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("invalid withdrawal amount {0}")]
    InvalidAmount(f32),
    #[error("battery {0:?} vanished during withdrawal")]
    BatteryMissing(Entity),
    #[error("withdrawal left {remaining} Wd undrawn after the balance check passed")]
    Shortfall { remaining: f32 },
}

/// Result of a withdrawal attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Withdrawal {
    /// The full amount was drawn.
    Drawn,
    /// Not enough stored energy; nothing was drawn.
    Insufficient { available: f32 },
}

/// Access to the stored energy of one power network.
pub trait EnergyLedger {
    /// Total stored energy in watt-days.
    fn stored_energy(&self) -> f32;

    /// Draw `amount` watt-days if at least that much is stored.
    fn try_withdraw(&mut self, amount: f32) -> Result<Withdrawal, LedgerError>;
}

/// Ledger over the batteries of one network, drained in spawn order.
/// Batteries spawned without a `SpawnOrder` are drained last.
pub struct NetworkLedger<'w> {
    world: &'w mut World,
    batteries: Vec<Entity>,
}

impl<'w> NetworkLedger<'w> {
    pub fn new(world: &'w mut World, net: PowerNetId) -> Self {
        let mut ordered: Vec<(u64, u32, Entity)> = world
            .query::<(&Battery, Option<&SpawnOrder>)>()
            .iter()
            .filter(|(_, (battery, _))| battery.net == net)
            .map(|(entity, (_, order))| {
                let order = order.map_or(u64::MAX, |order| order.0);
                (order, entity.id(), entity)
            })
            .collect();
        ordered.sort_unstable_by_key(|&(order, id, _)| (order, id));
        let batteries = ordered.into_iter().map(|(_, _, entity)| entity).collect();
        Self { world, batteries }
    }

    pub fn battery_count(&self) -> usize {
        self.batteries.len()
    }
}

impl EnergyLedger for NetworkLedger<'_> {
    fn stored_energy(&self) -> f32 {
        self.batteries
            .iter()
            .filter_map(|&entity| self.world.get::<&Battery>(entity).ok())
            .map(|battery| battery.stored_energy)
            .sum()
    }

    fn try_withdraw(&mut self, amount: f32) -> Result<Withdrawal, LedgerError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let available = self.stored_energy();
        if available < amount {
            return Ok(Withdrawal::Insufficient { available });
        }

        // Plan every draw before touching a battery so a failed withdrawal
        // leaves all balances as they were.
        let mut draws = Vec::with_capacity(self.batteries.len());
        let mut remaining = amount;
        for &entity in &self.batteries {
            if remaining <= 0.0 {
                break;
            }
            let stored = self
                .world
                .get::<&Battery>(entity)
                .map_err(|_| LedgerError::BatteryMissing(entity))?
                .stored_energy;
            let draw = stored.max(0.0).min(remaining);
            draws.push((entity, draw));
            remaining -= draw;
        }
        if remaining > DRAW_EPSILON {
            return Err(LedgerError::Shortfall { remaining });
        }

        for (entity, draw) in draws {
            let mut battery = self
                .world
                .get::<&mut Battery>(entity)
                .map_err(|_| LedgerError::BatteryMissing(entity))?;
            battery.stored_energy -= draw;
        }
        Ok(Withdrawal::Drawn)
    }
}
