//! Commands sent from the host game to the defense simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::types::{Cell, InstallationId, Rgba};

/// All player and host actions on defense installations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DefenseCommand {
    // --- Regions ---
    /// Create or replace a named region of cells.
    DefineRegion { label: String, cells: Vec<Cell> },
    /// Delete a named region. Shields selecting it lose their coverage.
    RemoveRegion { label: String },

    // --- Shields ---
    /// Point a shield at a named region.
    SelectShieldRegion {
        installation: InstallationId,
        region: String,
    },
    /// Stop a shield from covering any region.
    ClearShieldRegion { installation: InstallationId },
    /// Change a shield's tint.
    SetShieldColor {
        installation: InstallationId,
        color: Rgba,
    },

    // --- Laser grids ---
    /// Switch a laser grid between automatic and manual mode.
    ToggleGridManualMode { installation: InstallationId },
    /// Raise or lower a laser grid (manual mode only).
    ToggleGrid { installation: InstallationId },

    // --- Beam weapons ---
    /// Fire an energy beam weapon at a cell.
    FireBeam {
        installation: InstallationId,
        target: Cell,
    },

    // --- Host state ---
    /// Connect or cut power to an installation.
    SetPower { installation: InstallationId, on: bool },
    /// Place an installation on the map or pack it up.
    SetSpawned {
        installation: InstallationId,
        spawned: bool,
    },
}
