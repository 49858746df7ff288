//! The colony map: ECS world plus the spatial and diplomatic context the
//! installations query.
//!
//! Every on-map entity carries a `Cell` position. Entities riding in a
//! container carry `Contained` instead and are reachable only through the
//! container's `Contents`.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use hecs::{Entity, World};

use bulwark_core::components::*;
use bulwark_core::enums::{ContentsForm, KindCategory};
use bulwark_core::types::{Cell, FactionId, InstallationId, KindId, MapSize, PowerNetId};
use bulwark_threat::{ContainerLike, KindRegistry, ThreatWorld};

use crate::components::{Contents, SpawnOrder};
use crate::ledger::NetworkLedger;

/// Line-of-cells scan used by laser grid emitters to find their receiver.
pub trait BeamScan {
    /// Walk from `start` in `facing` looking for a receiver.
    ///
    /// Returns the receiver cell and every cell from `start` up to and
    /// including it, or `None` if no receiver lies within `max_cells` steps.
    fn scan_for_receiver(
        &self,
        start: Cell,
        facing: bulwark_core::enums::Facing,
        max_cells: u32,
    ) -> Option<(Cell, Vec<Cell>)>;
}

/// A single colony map.
pub struct Map {
    world: World,
    size: MapSize,
    kinds: KindRegistry,
    /// Unordered pairs of mutually hostile factions, stored (low, high).
    hostile_pairs: HashSet<(FactionId, FactionId)>,
    regions: BTreeMap<String, Vec<Cell>>,
    next_spawn_order: u64,
}

impl Map {
    pub fn new(size: MapSize, kinds: KindRegistry) -> Self {
        Self {
            world: World::new(),
            size,
            kinds,
            hostile_pairs: HashSet::new(),
            regions: BTreeMap::new(),
            next_spawn_order: 0,
        }
    }

    /// A map using the standard kind registry.
    pub fn with_standard_kinds(size: MapSize) -> Self {
        Self::new(size, KindRegistry::standard())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    pub fn kind_id(&self, name: &str) -> Option<KindId> {
        self.kinds.id_of(name)
    }

    // --- Diplomacy ---

    /// Make two factions hostile to each other.
    pub fn declare_hostile(&mut self, a: FactionId, b: FactionId) {
        self.hostile_pairs.insert(ordered_pair(a, b));
    }

    /// Make two factions no longer hostile.
    pub fn make_peace(&mut self, a: FactionId, b: FactionId) {
        self.hostile_pairs.remove(&ordered_pair(a, b));
    }

    // --- Regions ---

    /// Create or replace a named region. Cells are stored sorted and deduplicated.
    pub fn set_region(&mut self, label: &str, cells: impl IntoIterator<Item = Cell>) {
        let mut cells: Vec<Cell> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();
        self.regions.insert(label.to_string(), cells);
    }

    pub fn remove_region(&mut self, label: &str) -> bool {
        self.regions.remove(label).is_some()
    }

    pub fn region_cells(&self, label: &str) -> Option<&[Cell]> {
        self.regions.get(label).map(Vec::as_slice)
    }

    // --- Installations and power ---

    /// Entity of the installation with the given id.
    pub fn installation_entity(&self, id: InstallationId) -> Option<Entity> {
        self.world
            .query::<&Installation>()
            .iter()
            .find(|(_, installation)| installation.id == id)
            .map(|(entity, _)| entity)
    }

    /// Whether the entity's power trader currently receives power.
    pub fn is_powered(&self, entity: Entity) -> bool {
        self.world
            .get::<&PowerTrader>(entity)
            .is_ok_and(|power| power.power_on)
    }

    pub fn power_net_of(&self, entity: Entity) -> Option<PowerNetId> {
        self.world
            .get::<&PowerTrader>(entity)
            .ok()
            .and_then(|power| power.net)
    }

    pub fn power_output(&self, entity: Entity) -> f32 {
        self.world
            .get::<&PowerTrader>(entity)
            .map(|power| power.power_output)
            .unwrap_or(0.0)
    }

    pub fn set_power_output(&mut self, entity: Entity, watts: f32) {
        if let Ok(mut power) = self.world.get::<&mut PowerTrader>(entity) {
            power.power_output = watts;
        }
    }

    /// Claim the next spawn sequence number.
    pub fn next_spawn_order(&mut self) -> SpawnOrder {
        let order = SpawnOrder(self.next_spawn_order);
        self.next_spawn_order += 1;
        order
    }

    /// Energy ledger over every battery on `net`.
    pub fn ledger(&mut self, net: PowerNetId) -> NetworkLedger<'_> {
        NetworkLedger::new(&mut self.world, net)
    }

    // --- Spatial queries ---

    /// Every uncontained entity standing on `cell`, ordered by entity index.
    pub fn things_at(&self, cell: Cell) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .world
            .query::<&Cell>()
            .iter()
            .filter(|(_, position)| **position == cell)
            .map(|(entity, _)| entity)
            .collect();
        found.sort_by_key(|entity| entity.id());
        found
    }

    /// Projectiles standing on any of `cells`, ordered by cell and then by
    /// entity index. One pass over the projectiles regardless of how many
    /// cells are asked about.
    pub fn projectiles_within(&self, cells: &BTreeSet<Cell>) -> Vec<(Cell, Entity)> {
        if cells.is_empty() {
            return Vec::new();
        }
        let mut found: Vec<(Cell, Entity)> = self
            .world
            .query::<(&Projectile, &Cell)>()
            .iter()
            .filter(|(_, (_, position))| cells.contains(position))
            .map(|(entity, (_, position))| (*position, entity))
            .collect();
        found.sort_by_key(|&(cell, entity)| (cell, entity.id()));
        found
    }

    /// Whether a pawn stands on `cell`.
    pub fn pawn_at(&self, cell: Cell) -> bool {
        self.things_at(cell).into_iter().any(|entity| {
            self.kind_of(entity)
                .is_some_and(|kind| self.kinds.category(kind) == KindCategory::Pawn)
        })
    }

    /// Whether a laser grid receiver stands on `cell`.
    pub fn receiver_at(&self, cell: Cell) -> bool {
        self.things_at(cell).into_iter().any(|entity| {
            self.world.get::<&LaserGridReceiver>(entity).is_ok()
        })
    }

    // --- Damage and destruction ---

    /// Apply damage to an entity with hit points. Returns true if it was
    /// destroyed. Entities without `Health` are unaffected.
    pub fn apply_damage(&mut self, entity: Entity, amount: f32) -> bool {
        let remaining = match self.world.get::<&mut Health>(entity) {
            Ok(mut health) => {
                health.hit_points -= amount;
                health.hit_points
            }
            Err(_) => return false,
        };
        if remaining <= 0.0 {
            self.destroy(entity)
        } else {
            false
        }
    }

    /// Destroy an entity together with anything it carries. Returns false if
    /// it was already gone.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.world.contains(entity) {
            return false;
        }

        let mut doomed = vec![entity];
        let mut index = 0;
        while index < doomed.len() {
            if let Ok(contents) = self.world.get::<&Contents>(doomed[index]) {
                doomed.extend(contents.occupants.iter().copied());
            }
            index += 1;
        }

        if self.world.get::<&Contained>(entity).is_ok() {
            for (_container, contents) in self.world.query_mut::<&mut Contents>() {
                contents.occupants.retain(|&occupant| occupant != entity);
            }
        }

        for doomed_entity in doomed {
            let _ = self.world.despawn(doomed_entity);
        }
        tracing::trace!(target: "bulwark::map", entity = ?entity, "destroyed");
        true
    }
}

fn ordered_pair(a: FactionId, b: FactionId) -> (FactionId, FactionId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl ContainerLike for Map {
    type Id = Entity;

    fn try_get_occupants(&self, entity: Entity) -> Option<Vec<Entity>> {
        if let Ok(contents) = self.world.get::<&Contents>(entity) {
            return Some(
                contents
                    .occupants
                    .iter()
                    .copied()
                    .filter(|&occupant| self.world.contains(occupant))
                    .collect(),
            );
        }
        // An empty drop pod still has a container, just nothing in it.
        let form = self
            .kind_of(entity)
            .and_then(|kind| self.kinds.get(kind))
            .map(|def| def.contents);
        match form {
            Some(ContentsForm::DropPod) => Some(Vec::new()),
            _ => None,
        }
    }
}

impl ThreatWorld for Map {
    fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    fn kind_of(&self, entity: Entity) -> Option<KindId> {
        self.world.get::<&Kind>(entity).ok().map(|kind| kind.0)
    }

    fn faction_of(&self, entity: Entity) -> Option<FactionId> {
        self.world.get::<&Faction>(entity).ok().map(|faction| faction.0)
    }

    fn position_of(&self, entity: Entity) -> Option<Cell> {
        self.world.get::<&Cell>(entity).ok().map(|cell| *cell)
    }

    fn is_destroyed(&self, entity: Entity) -> bool {
        !self.world.contains(entity)
    }

    fn factions_hostile(&self, a: FactionId, b: FactionId) -> bool {
        a != b && self.hostile_pairs.contains(&ordered_pair(a, b))
    }

    fn entities_of_kind(&self, kind: KindId) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .world
            .query::<(&Kind, &Cell)>()
            .iter()
            .filter(|(_, (entity_kind, _))| entity_kind.0 == kind)
            .map(|(entity, _)| entity)
            .collect();
        found.sort_by_key(|entity| entity.id());
        found
    }

    fn map_entities(&self) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .world
            .query::<(&Kind, &Cell)>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        found.sort_by_key(|entity| entity.id());
        found
    }
}

impl BeamScan for Map {
    fn scan_for_receiver(
        &self,
        start: Cell,
        facing: bulwark_core::enums::Facing,
        max_cells: u32,
    ) -> Option<(Cell, Vec<Cell>)> {
        let mut cells = vec![start];
        let mut cursor = start;
        loop {
            cursor = cursor.step(facing)?;
            if !self.size.contains(&cursor) {
                return None;
            }
            if self.receiver_at(cursor) {
                cells.push(cursor);
                return Some((cursor, cells));
            }
            if cells.len() >= max_cells as usize {
                return None;
            }
            cells.push(cursor);
        }
    }
}
