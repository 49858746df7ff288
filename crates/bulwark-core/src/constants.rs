//! Simulation constants. Player-tunable values live in [`crate::config::DefenseSettings`].

use crate::types::Rgba;

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

// --- Turret top (idle sweep) ---

/// Minimum ticks between idle turns.
pub const IDLE_TURN_DELAY_MIN: u32 = 150;

/// Maximum ticks between idle turns.
pub const IDLE_TURN_DELAY_MAX: u32 = 350;

/// Length of one idle turn in ticks.
pub const IDLE_TURN_DURATION: u32 = 140;

/// Rotation per tick while idly turning (degrees).
pub const IDLE_TURN_RATE_DEG: f32 = 0.26;

// --- Turret firing effects ---

/// Shrapnel pieces thrown when a target is destroyed outright.
pub const SHRAPNEL_ON_DESTROY: u8 = 3;

/// Shrapnel pieces thrown when a container is only damaged.
pub const SHRAPNEL_ON_DAMAGE: u8 = 1;

/// Maximum random offset of a tracer's end point (cells).
pub const TRACER_END_JITTER: f32 = 0.4;

/// Spacing of tracer trail puffs (cells).
pub const TRACER_STEP: f32 = 0.5;

// --- Shield ---

/// Default shield tint.
pub const DEFAULT_SHIELD_COLOR: Rgba = Rgba::new(0.0, 0.5, 0.5, 0.35);

/// Upper bound on the overload disruption radius (cells).
pub const OVERLOAD_DISRUPTION_MAX_RADIUS: u32 = 79;

/// Damage dealt by the overload disruption.
pub const OVERLOAD_DISRUPTION_DAMAGE: u32 = 20;

/// Player-facing message when a shield overloads.
pub const OVERLOAD_MESSAGE: &str = "Shield generator overloaded and shut down!";

// --- Energy beam weapon ---

/// Floating text shown when a beam weapon cannot afford a shot.
pub const NOT_ENOUGH_POWER_TEXT: &str = "Not enough power!";
