//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Broad category of an entity kind, as recorded in the kind registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindCategory {
    /// Anything without defense-relevant behavior (items, plants, debris).
    #[default]
    Plain,
    /// A living or mechanical combatant.
    Pawn,
    /// An airborne object descending onto the map (drop pods, crashing debris).
    Skyfaller,
    /// A friendly incoming transport. Never a turret target.
    AllyTransport,
    /// A crashed ship part (defoliator, psychic droner).
    ShipPart,
    /// A ground projectile in flight.
    Projectile,
    /// A structure.
    Building,
}

/// How a kind exposes nested occupants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentsForm {
    /// The kind never carries occupants.
    #[default]
    None,
    /// The dedicated incoming-capsule kind.
    DropPod,
    /// Any other kind whose definition declares a contents relation.
    Declared,
}

impl ContentsForm {
    pub fn carries_contents(self) -> bool {
        !matches!(self, ContentsForm::None)
    }
}

/// Cardinal facing of an installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    North,
    East,
    South,
    West,
}

impl Facing {
    /// Unit cell offset `(dx, dz)` in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Facing::North => (0, 1),
            Facing::East => (1, 0),
            Facing::South => (0, -1),
            Facing::West => (-1, 0),
        }
    }
}

/// Area turret engagement state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurretMode {
    /// Unpowered, out of ammo, or nothing to shoot.
    #[default]
    Idle,
    /// Fired on at least one target this tick.
    Engaging,
}

/// Projectile shield state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldStatus {
    /// No power.
    #[default]
    Offline,
    /// Powered, no threat.
    Idle,
    /// Powered, threat present, intercepting.
    Active,
    /// Locked out after an overload.
    Cooldown,
}

/// Sound cues emitted alongside effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    TurretFire,
    ShieldHit,
}

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}
