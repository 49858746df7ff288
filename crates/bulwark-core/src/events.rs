//! Side-effect events emitted by the simulation for the presentation layer.
//!
//! Effects are fire-and-forget: the simulation never reads them back.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Cell, InstallationId};

/// A cosmetic or audible effect requested by a defense installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DefenseEvent {
    /// Shrapnel thrown from a struck skyfaller.
    Shrapnel { at: Cell, count: u8, angle: f32 },
    /// One-shot sound at an installation.
    Sound { cue: SoundCue, at: Cell },
    /// Smoke and spark trail from a turret to its (jittered) aim point.
    TracerTrail {
        from: glam::Vec2,
        to: glam::Vec2,
        puffs: u32,
    },
    /// Spark, smoke and glow where a shield stopped a projectile.
    ProjectileIntercepted {
        installation: InstallationId,
        at: Cell,
        cost_wd: f32,
    },
    /// Overload sparks on a covered cell.
    OverloadSpark { at: Cell },
    /// Area energy disruption centered on an overloaded shield.
    EnergyDisruption {
        center: Cell,
        radius: u32,
        damage: u32,
    },
    /// Floating text above an installation.
    TextMote { at: Cell, text: String },
    /// A laser grid was raised across `cells` cells.
    GridRaised {
        installation: InstallationId,
        cells: u32,
    },
    /// A laser grid was lowered.
    GridLowered { installation: InstallationId },
}

/// Alert for the player-visible message queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub tick: u64,
    /// Installation the alert refers to.
    pub installation: Option<InstallationId>,
}
