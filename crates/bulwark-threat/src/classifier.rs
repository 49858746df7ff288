//! Hostility classification.
//!
//! Container entities (drop pods, cargo capsules) are judged by their
//! occupants: a pod is a threat iff anyone inside is hostile. When the
//! occupants cannot be determined the answer is always "not a threat".

use bulwark_core::enums::KindCategory;
use bulwark_core::types::{Cell, FactionId, KindId};

use crate::registry::KindRegistry;

/// Capability to list the occupants of a container-like entity.
pub trait ContainerLike {
    type Id: Copy + Eq;

    /// Occupants of `entity`, or `None` when they cannot be determined.
    /// The default treats every entity as having unknown contents.
    fn try_get_occupants(&self, _entity: Self::Id) -> Option<Vec<Self::Id>> {
        None
    }
}

/// Read-only world queries needed for classification and targeting.
pub trait ThreatWorld: ContainerLike {
    fn kinds(&self) -> &KindRegistry;
    fn kind_of(&self, entity: Self::Id) -> Option<KindId>;
    fn faction_of(&self, entity: Self::Id) -> Option<FactionId>;
    fn position_of(&self, entity: Self::Id) -> Option<Cell>;
    fn is_destroyed(&self, entity: Self::Id) -> bool;
    /// Whether faction `a` is hostile to faction `b`.
    fn factions_hostile(&self, a: FactionId, b: FactionId) -> bool;
    /// Live, uncontained entities of the given kind.
    fn entities_of_kind(&self, kind: KindId) -> Vec<Self::Id>;
    /// Every live entity that is on the map in its own right.
    fn map_entities(&self) -> Vec<Self::Id>;
}

/// Whether the entity's kind carries occupants.
pub fn has_contents<W: ThreatWorld>(world: &W, entity: W::Id) -> bool {
    world
        .kind_of(entity)
        .is_some_and(|kind| world.kinds().carries_contents(kind))
}

/// Whether the entity itself belongs to a faction hostile to `defender`.
pub fn faction_hostile<W: ThreatWorld>(world: &W, entity: W::Id, defender: FactionId) -> bool {
    world
        .faction_of(entity)
        .is_some_and(|faction| world.factions_hostile(faction, defender))
}

/// Occupants of a container entity. Logs and returns `None` when a kind
/// declares contents but the instance exposes none.
pub fn occupants_of<W: ThreatWorld>(world: &W, entity: W::Id) -> Option<Vec<W::Id>> {
    let occupants = world.try_get_occupants(entity);
    if occupants.is_none() {
        let kind = world
            .kind_of(entity)
            .and_then(|kind| world.kinds().get(kind))
            .map(|def| def.name.as_str())
            .unwrap_or("<unknown>");
        tracing::debug!(
            target: "bulwark::threat",
            kind,
            "contents lookup failed, treating as empty"
        );
    }
    occupants
}

/// Decide whether `entity` is a hostile threat to `defender`.
pub fn is_hostile_threat<W: ThreatWorld>(world: &W, defender: FactionId, entity: W::Id) -> bool {
    if has_contents(world, entity) {
        return match occupants_of(world, entity) {
            Some(occupants) => occupants
                .into_iter()
                .any(|occupant| faction_hostile(world, occupant, defender)),
            None => false,
        };
    }
    faction_hostile(world, entity, defender)
}

/// Map-wide check: is any active hostile threat present at all?
///
/// Projectiles, loose items and allied transports never count; everything
/// else on the map is run through [`is_hostile_threat`].
pub fn any_hostile_threat_present<W: ThreatWorld>(world: &W, defender: FactionId) -> bool {
    world.map_entities().into_iter().any(|entity| {
        let counts = world.kind_of(entity).is_some_and(|kind| {
            !matches!(
                world.kinds().category(kind),
                KindCategory::Projectile | KindCategory::Plain | KindCategory::AllyTransport
            )
        });
        counts && !world.is_destroyed(entity) && is_hostile_threat(world, defender, entity)
    })
}
