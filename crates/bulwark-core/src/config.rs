//! Player-tunable defense settings.
//!
//! Every controller receives a `&DefenseSettings` explicitly; there is no
//! global settings state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FactionId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Numeric tunables for every defense installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseSettings {
    // --- Shield ---
    /// Watts drawn per covered cell (before the exponent).
    pub shield_power_per_cell: u32,
    /// Exponent applied to the covered cell count.
    pub shield_cell_exponent: u32,
    /// Flat energy cost of one interception (watt-days).
    pub shield_intercept_cost_wd: f32,
    /// Share of a projectile's damage added to the interception cost, in percent.
    pub percentage_of_damage_drained: u32,
    /// Lockout after an overload. Zero disables overloads entirely.
    pub shield_cooldown_ticks: u32,
    /// Ticks a shield stays up after the last threat disappears.
    pub shield_shutdown_delay_ticks: u32,

    // --- Laser grid ---
    pub laser_power_per_cell: u32,
    pub laser_grid_exponent: u32,
    /// Maximum number of cells scanned for a receiver.
    pub max_laser_grid_distance: u32,

    // --- Area turret ---
    /// Engagement radius in cells.
    pub protection_range: u32,
    pub reload_period_ticks: u32,
    /// Shots per reload.
    pub ammo_count: u32,
    /// Upper bound of hits landed on each hostile drop-pod occupant.
    pub max_shots_per_occupant: u32,
    /// Damage per hit on an occupant.
    pub bullet_damage: f32,
    /// Chance, in percent, that a container is destroyed outright.
    pub destroy_chance_percent: u32,

    // --- Energy beam weapon ---
    pub laser_cannon_drain: f32,
    pub laser_cannon_damage: f32,

    /// Faction the installations defend.
    pub defending_faction: FactionId,
}

impl Default for DefenseSettings {
    fn default() -> Self {
        Self {
            shield_power_per_cell: 1,
            shield_cell_exponent: 2,
            shield_intercept_cost_wd: 6.0,
            percentage_of_damage_drained: 50,
            shield_cooldown_ticks: 5000,
            shield_shutdown_delay_ticks: 2000,
            laser_power_per_cell: 1,
            laser_grid_exponent: 2,
            max_laser_grid_distance: 5,
            protection_range: 55,
            reload_period_ticks: 120,
            ammo_count: 2,
            max_shots_per_occupant: 3,
            bullet_damage: 10.0,
            destroy_chance_percent: 100,
            laser_cannon_drain: 20.0,
            laser_cannon_damage: 10.0,
            defending_faction: FactionId::PLAYER,
        }
    }
}

impl DefenseSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: DefenseSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load from `path` if given and valid, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match Self::from_file(path) {
                Ok(settings) => {
                    tracing::info!(
                        target: "bulwark::config",
                        path = %path.display(),
                        "settings.loaded=file"
                    );
                    return settings;
                }
                Err(err) => {
                    tracing::warn!(
                        target: "bulwark::config",
                        path = %path.display(),
                        error = %err,
                        "settings.load_failed"
                    );
                }
            }
        }
        tracing::info!(target: "bulwark::config", "settings.loaded=defaults");
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destroy_chance_percent > 100 {
            return Err(ConfigError::Invalid {
                field: "destroy_chance_percent",
                reason: "must be between 0 and 100",
            });
        }
        if self.reload_period_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "reload_period_ticks",
                reason: "must be at least 1",
            });
        }
        if self.max_shots_per_occupant == 0 {
            return Err(ConfigError::Invalid {
                field: "max_shots_per_occupant",
                reason: "must be at least 1",
            });
        }
        if !self.shield_intercept_cost_wd.is_finite() {
            return Err(ConfigError::Invalid {
                field: "shield_intercept_cost_wd",
                reason: "must be a finite number",
            });
        }
        if !(self.bullet_damage.is_finite() && self.bullet_damage >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "bullet_damage",
                reason: "must be a non-negative number",
            });
        }
        if !(self.laser_cannon_drain.is_finite() && self.laser_cannon_drain >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "laser_cannon_drain",
                reason: "must be a non-negative number",
            });
        }
        Ok(())
    }

    /// Shield draw in watts for `cells` covered cells (negative = consumption).
    pub fn shield_power_usage(&self, cells: usize) -> f32 {
        -(cells as f32).powi(self.shield_cell_exponent as i32) * self.shield_power_per_cell as f32
    }

    /// Laser grid draw in watts for a grid spanning `cells` cells.
    pub fn laser_grid_power_usage(&self, cells: usize) -> f32 {
        -(cells as f32).powi(self.laser_grid_exponent as i32) * self.laser_power_per_cell as f32
    }
}
