//! Per-tick controllers for the defense installations.
//!
//! Systems are free functions over `&mut Map`. They keep no state of their
//! own; everything lives in components so it can be saved and inspected.

pub mod area_turret;
pub mod beam_weapon;
pub mod cleanup;
pub mod laser_grid;
pub mod shield;
pub mod snapshot;
pub mod turret_top;
