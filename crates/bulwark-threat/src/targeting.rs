//! Area turret target gathering and selection.

use rand::seq::SliceRandom;
use rand::Rng;

use bulwark_core::types::{Cell, FactionId};

use crate::classifier::{is_hostile_threat, ThreatWorld};

/// Every hostile airborne threat and ship part on the map.
///
/// Allied transports are excluded by kind and then again by identity.
pub fn gather_turret_targets<W: ThreatWorld>(world: &W, defender: FactionId) -> Vec<W::Id> {
    let kinds = world.kinds();
    let transports: Vec<W::Id> = kinds
        .ally_transport_kinds()
        .iter()
        .flat_map(|&kind| world.entities_of_kind(kind))
        .collect();

    let mut targets: Vec<W::Id> = kinds
        .turret_candidate_kinds()
        .flat_map(|kind| world.entities_of_kind(kind))
        .filter(|&entity| !world.is_destroyed(entity))
        .filter(|&entity| is_hostile_threat(world, defender, entity))
        .collect();
    targets.retain(|entity| !transports.contains(entity));
    targets
}

/// Keep only targets within `range` cells of `origin`.
pub fn within_range<W: ThreatWorld>(
    world: &W,
    targets: Vec<W::Id>,
    origin: Cell,
    range: u32,
) -> Vec<W::Id> {
    targets
        .into_iter()
        .filter(|&entity| {
            world
                .position_of(entity)
                .is_some_and(|cell| origin.within_range(&cell, range))
        })
        .collect()
}

/// Uniformly shuffle `candidates` and keep at most `ammo` of them.
pub fn select_targets<T, R: Rng + ?Sized>(mut candidates: Vec<T>, ammo: u32, rng: &mut R) -> Vec<T> {
    candidates.shuffle(rng);
    let take = candidates.len().min(ammo as usize);
    candidates.truncate(take);
    candidates
}
