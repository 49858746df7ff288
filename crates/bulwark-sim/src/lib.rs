//! Simulation layer for BULWARK.
//!
//! Owns the hecs-backed map, the energy ledger, the installation
//! controllers and the save/load layer. Completely headless; the host game
//! feeds commands in and reads snapshots and events out.

pub mod components;
pub mod engine;
pub mod ledger;
pub mod map;
pub mod persistence;
pub mod systems;
pub mod world_setup;

pub use bulwark_core as core;
pub use engine::{DefenseEngine, SimConfig};
pub use map::Map;
