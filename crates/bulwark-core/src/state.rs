//! Defense state snapshot, inspect views and save records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::{AreaTurret, LaserGridEmitter, ProjectileShield, TurretTop};
use crate::enums::*;
use crate::events::{Alert, DefenseEvent};
use crate::types::{ticks_to_secs, Cell, InstallationId, Rgba, SimTime};

/// Complete defense state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefenseSnapshot {
    pub time: SimTime,
    pub hostile_threat_present: bool,
    pub turrets: Vec<TurretView>,
    pub shields: Vec<ShieldView>,
    pub laser_grids: Vec<LaserGridView>,
    pub events: Vec<DefenseEvent>,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretView {
    pub installation: InstallationId,
    pub position: Cell,
    pub mode: TurretMode,
    pub ammo_remaining: u32,
    pub ammo_max: u32,
    pub ticks_since_reload: u32,
    pub orientation: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldView {
    pub installation: InstallationId,
    pub position: Cell,
    pub status: ShieldStatus,
    pub covered_cells: u32,
    pub cooldown_ticks_remaining: u32,
    pub power_output: f32,
    pub color: Rgba,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaserGridView {
    pub installation: InstallationId,
    pub position: Cell,
    pub grid_cells: u32,
    pub raised: bool,
    pub manual_mode: bool,
    pub power_output: f32,
}

/// Status line of the shield inspect panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShieldInspectStatus {
    Cooldown { seconds_remaining: f32 },
    Offline,
    Idle,
    Active,
}

/// Everything the shield inspect panel shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldInspect {
    pub status: ShieldInspectStatus,
    /// Region label and covered cell count, if a region is selected.
    pub region: Option<(String, u32)>,
    /// Draw in watts when powered.
    pub power_use_watts: Option<f32>,
    /// Configured overload lockout in seconds; `None` when overloads are disabled.
    pub overload_cooldown_secs: Option<f32>,
}

impl ShieldInspect {
    pub fn cooldown(ticks_remaining: u32) -> ShieldInspectStatus {
        ShieldInspectStatus::Cooldown {
            seconds_remaining: ticks_to_secs(ticks_remaining),
        }
    }
}

impl fmt::Display for ShieldInspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            ShieldInspectStatus::Cooldown { seconds_remaining } => {
                writeln!(f, "Status: COOLDOWN ({seconds_remaining:.1}s remaining)")?
            }
            ShieldInspectStatus::Offline => writeln!(f, "Status: Offline (No Power)")?,
            ShieldInspectStatus::Idle => writeln!(f, "Status: Idle")?,
            ShieldInspectStatus::Active => writeln!(f, "Status: Active")?,
        }
        match &self.region {
            Some((label, cells)) => writeln!(f, "Area: {label} ({cells} cells)")?,
            None => writeln!(f, "Area: Not selected")?,
        }
        match self.power_use_watts {
            Some(watts) => writeln!(f, "Power Use: {:.0} W", watts.abs())?,
            None => writeln!(f, "Power: Off")?,
        }
        match self.overload_cooldown_secs {
            Some(secs) => write!(f, "Overload Cooldown: {secs:.1}s"),
            None => write!(f, "Overload: Disabled"),
        }
    }
}

// --- Save records ---

/// Persisted area turret state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretSaveState {
    pub ammo_remaining: u32,
    pub ticks_since_reload: u32,
    pub orientation: f32,
    pub ticks_until_idle_turn: u32,
    pub idle_turn_ticks_left: u32,
    pub idle_turn_clockwise: bool,
}

impl TurretSaveState {
    pub fn capture(turret: &AreaTurret, top: &TurretTop) -> Self {
        Self {
            ammo_remaining: turret.ammo_remaining,
            ticks_since_reload: turret.ticks_since_reload,
            orientation: top.orientation,
            ticks_until_idle_turn: top.ticks_until_idle_turn,
            idle_turn_ticks_left: top.idle_turn_ticks_left,
            idle_turn_clockwise: top.idle_turn_clockwise,
        }
    }

    pub fn restore(&self, turret: &mut AreaTurret, top: &mut TurretTop) {
        turret.ammo_remaining = self.ammo_remaining.min(turret.ammo_max);
        turret.ticks_since_reload = self.ticks_since_reload;
        top.orientation = self.orientation;
        top.ticks_until_idle_turn = self.ticks_until_idle_turn;
        top.idle_turn_ticks_left = self.idle_turn_ticks_left;
        top.idle_turn_clockwise = self.idle_turn_clockwise;
    }
}

/// Persisted projectile shield state. Covered cells are not saved; they are
/// rebuilt from the region label on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldSaveState {
    pub selected_region: Option<String>,
    pub active_idle_timer: u32,
    pub cooldown_ticks_remaining: u32,
    pub color: Rgba,
}

impl ShieldSaveState {
    pub fn capture(shield: &ProjectileShield) -> Self {
        Self {
            selected_region: shield.selected_region.clone(),
            active_idle_timer: shield.active_idle_timer,
            cooldown_ticks_remaining: shield.cooldown_ticks_remaining,
            color: shield.color,
        }
    }
}

/// Persisted laser grid state. The grid itself is rescanned after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserGridSaveState {
    pub manual_mode: bool,
    pub grid_raised: bool,
}

impl LaserGridSaveState {
    pub fn capture(emitter: &LaserGridEmitter) -> Self {
        Self {
            manual_mode: emitter.manual_mode,
            grid_raised: emitter.grid_raised,
        }
    }
}

/// Saved state of one installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InstallationSave {
    AreaTurret(TurretSaveState),
    Shield(ShieldSaveState),
    LaserGrid(LaserGridSaveState),
}
