//! Components that hold runtime entity handles and so cannot live in
//! `bulwark-core`.

/// Occupants riding inside a container entity (drop pod, cargo capsule).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contents {
    pub occupants: Vec<hecs::Entity>,
}

/// Position in the map's spawn sequence. Never reused, unlike `Entity::id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpawnOrder(pub u64);
