//! ECS components for hecs entities.
//!
//! Components are plain data. Controller state lives here too so that the
//! persistence layer can read it back without touching the systems.
//! Relations between entities (container contents) live in `bulwark-sim`,
//! since they hold runtime entity handles.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SHIELD_COLOR;
use crate::enums::Facing;
use crate::types::{Cell, FactionId, InstallationId, KindId, PowerNetId, Rgba};

/// Which faction an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction(pub FactionId);

/// Kind of an entity (index into the kind registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind(pub KindId);

/// Hit points. An entity reaching zero is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub hit_points: f32,
    pub max_hit_points: f32,
}

impl Health {
    pub fn new(max_hit_points: f32) -> Self {
        Self {
            hit_points: max_hit_points,
            max_hit_points,
        }
    }
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Damage the projectile would deal on impact.
    pub damage_amount: i32,
    /// Faction of whoever fired it, if known.
    pub launcher_faction: Option<FactionId>,
}

/// Marks an entity riding inside a container. Contained entities are not on
/// the map in their own right and are destroyed with their container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contained;

/// Power consumer/producer attachment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerTrader {
    /// Whether the network currently delivers power to this device.
    pub power_on: bool,
    /// Current draw in watts. Negative means consumption.
    pub power_output: f32,
    /// Network the device is wired into, if any.
    pub net: Option<PowerNetId>,
}

impl PowerTrader {
    pub fn connected(net: PowerNetId) -> Self {
        Self {
            power_on: true,
            power_output: 0.0,
            net: Some(net),
        }
    }
}

/// Battery-like storage device on a power network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    /// Stored energy in watt-days.
    pub stored_energy: f32,
    pub capacity: f32,
    pub net: PowerNetId,
}

/// Common data for any defense installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    pub id: InstallationId,
    /// False while minified or otherwise off-map; unspawned installations do not tick.
    pub spawned: bool,
    pub facing: Facing,
}

/// Ammo-limited anti-air turret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaTurret {
    pub range_cells: u32,
    pub reload_period_ticks: u32,
    pub ticks_since_reload: u32,
    pub ammo_remaining: u32,
    pub ammo_max: u32,
}

/// Rotating top of an area turret. Purely cosmetic, but its orientation is
/// observable state and is saved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretTop {
    /// Degrees in [0, 360), 0 = north, clockwise.
    pub orientation: f32,
    pub ticks_until_idle_turn: u32,
    pub idle_turn_ticks_left: u32,
    pub idle_turn_clockwise: bool,
}

impl Default for TurretTop {
    fn default() -> Self {
        Self {
            orientation: 0.0,
            ticks_until_idle_turn: 0,
            idle_turn_ticks_left: 0,
            idle_turn_clockwise: true,
        }
    }
}

/// Energy-metered projectile shield covering a region of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileShield {
    /// Label of the selected region, if any.
    pub selected_region: Option<String>,
    /// Cells of the selected region, sorted. Empty if no region is selected.
    pub covered_cells: Vec<Cell>,
    /// Ticks since a threat was last seen while active.
    pub active_idle_timer: u32,
    /// Zero when not on cooldown.
    pub cooldown_ticks_remaining: u32,
    pub color: Rgba,
    /// Covered cells changed since the overlay was last built.
    pub render_dirty: bool,
}

impl ProjectileShield {
    /// A shield with no region that has not seen a threat within `shutdown_delay_ticks`.
    pub fn new(shutdown_delay_ticks: u32) -> Self {
        Self {
            selected_region: None,
            covered_cells: Vec::new(),
            active_idle_timer: shutdown_delay_ticks.saturating_add(1),
            cooldown_ticks_remaining: 0,
            color: DEFAULT_SHIELD_COLOR,
            render_dirty: true,
        }
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.cooldown_ticks_remaining > 0
    }
}

/// Emitter half of a laser grid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaserGridEmitter {
    /// Cells the grid spans, from the emitter to the receiver inclusive.
    pub grid_cells: Vec<Cell>,
    /// Cell of the receiver found by the last scan.
    pub receiver: Option<Cell>,
    /// When set, the grid is only raised and lowered by command.
    pub manual_mode: bool,
    /// Whether grid segments are currently spawned.
    pub grid_raised: bool,
}

/// Receiver half of a laser grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LaserGridReceiver;

/// A raised laser grid segment occupying one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserGridSegment {
    pub emitter: InstallationId,
}

/// Beam weapon that pays for every shot from stored energy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyBeamWeapon {
    pub shots_fired: u32,
    pub shots_refused: u32,
}
