//! Threat classification for BULWARK.
//!
//! Decides whether world entities are hostile, recursing into the occupants
//! of container-like entities, and picks area-turret targets. Operates on
//! the [`classifier::ThreatWorld`] query trait; no ECS dependency.

pub mod classifier;
pub mod registry;
pub mod targeting;

pub use bulwark_core as core;
pub use classifier::{any_hostile_threat_present, is_hostile_threat, ContainerLike, ThreatWorld};
pub use registry::{KindDef, KindRegistry};
