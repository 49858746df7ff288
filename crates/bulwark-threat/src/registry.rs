//! Kind registry: static, per-kind metadata.
//!
//! Built once at startup and read-only afterwards. Whether a kind carries
//! contents is a property of the kind, not of the instance, so it is
//! resolved here instead of being probed per entity.

use bulwark_core::enums::{ContentsForm, KindCategory};
use bulwark_core::types::KindId;

/// Well-known kind names.
pub mod names {
    pub const COLONIST: &str = "Colonist";
    pub const RAIDER: &str = "Raider";
    pub const MECHANOID: &str = "Mechanoid";
    pub const DROP_POD_INCOMING: &str = "DropPodIncoming";
    pub const CARGO_CAPSULE_INCOMING: &str = "CargoCapsuleIncoming";
    pub const METEORITE_INCOMING: &str = "MeteoriteIncoming";
    pub const SHUTTLE_INCOMING: &str = "ShuttleIncoming";
    pub const TRANSPORT_SHUTTLE_INCOMING: &str = "TransportShuttleIncoming";
    pub const DEFOLIATOR_SHIP_PART: &str = "DefoliatorShipPart";
    pub const PSYCHIC_DRONER_SHIP_PART: &str = "PsychicDronerShipPart";
    pub const BULLET: &str = "Bullet";
    pub const STEEL: &str = "Steel";
    pub const AA_TURRET: &str = "AATurret";
    pub const WALL_SHIELD: &str = "WallShieldEmitter";
    pub const LASER_GRID_EMITTER: &str = "LaserGridEmitter";
    pub const LASER_GRID_RECEIVER: &str = "LaserGridReceiver";
    pub const LASER_GRID: &str = "LaserGrid";
    pub const LASER_CANNON: &str = "LaserCannon";
    pub const BATTERY: &str = "Battery";
}

/// Metadata for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindDef {
    pub name: String,
    pub category: KindCategory,
    pub contents: ContentsForm,
}

impl KindDef {
    pub fn new(name: &str, category: KindCategory, contents: ContentsForm) -> Self {
        Self {
            name: name.to_string(),
            category,
            contents,
        }
    }
}

/// Read-only lookup table of every registered kind.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    defs: Vec<KindDef>,
    /// Skyfaller kinds the turret shoots at (shuttle-named kinds excluded).
    skyfaller_targets: Vec<KindId>,
    ship_parts: Vec<KindId>,
    ally_transports: Vec<KindId>,
}

impl KindRegistry {
    /// Build the table from a closed set of kind definitions.
    pub fn from_defs(defs: Vec<KindDef>) -> Self {
        let ids = || (0..defs.len()).map(|i| KindId(i as u16));

        let skyfaller_targets: Vec<KindId> = ids()
            .filter(|id| {
                let def = &defs[usize::from(id.0)];
                def.category == KindCategory::Skyfaller
                    && !def.name.to_ascii_lowercase().contains("shuttle")
            })
            .collect();
        let ship_parts = ids()
            .filter(|id| defs[usize::from(id.0)].category == KindCategory::ShipPart)
            .collect();
        let ally_transports = ids()
            .filter(|id| defs[usize::from(id.0)].category == KindCategory::AllyTransport)
            .collect();

        tracing::debug!(
            target: "bulwark::threat",
            kinds = defs.len(),
            skyfaller_targets = skyfaller_targets.len(),
            "kind registry built"
        );

        Self {
            defs,
            skyfaller_targets,
            ship_parts,
            ally_transports,
        }
    }

    /// The kinds a vanilla colony map knows about.
    pub fn standard() -> Self {
        use names::*;
        use ContentsForm as C;
        use KindCategory as K;

        Self::from_defs(vec![
            KindDef::new(COLONIST, K::Pawn, C::None),
            KindDef::new(RAIDER, K::Pawn, C::None),
            KindDef::new(MECHANOID, K::Pawn, C::None),
            KindDef::new(DROP_POD_INCOMING, K::Skyfaller, C::DropPod),
            KindDef::new(CARGO_CAPSULE_INCOMING, K::Skyfaller, C::Declared),
            KindDef::new(METEORITE_INCOMING, K::Skyfaller, C::None),
            KindDef::new(SHUTTLE_INCOMING, K::AllyTransport, C::Declared),
            KindDef::new(TRANSPORT_SHUTTLE_INCOMING, K::Skyfaller, C::Declared),
            KindDef::new(DEFOLIATOR_SHIP_PART, K::ShipPart, C::None),
            KindDef::new(PSYCHIC_DRONER_SHIP_PART, K::ShipPart, C::None),
            KindDef::new(BULLET, K::Projectile, C::None),
            KindDef::new(STEEL, K::Plain, C::None),
            KindDef::new(AA_TURRET, K::Building, C::None),
            KindDef::new(WALL_SHIELD, K::Building, C::None),
            KindDef::new(LASER_GRID_EMITTER, K::Building, C::None),
            KindDef::new(LASER_GRID_RECEIVER, K::Building, C::None),
            KindDef::new(LASER_GRID, K::Building, C::None),
            KindDef::new(LASER_CANNON, K::Building, C::None),
            KindDef::new(BATTERY, K::Building, C::None),
        ])
    }

    pub fn get(&self, id: KindId) -> Option<&KindDef> {
        self.defs.get(usize::from(id.0))
    }

    pub fn id_of(&self, name: &str) -> Option<KindId> {
        self.defs
            .iter()
            .position(|def| def.name == name)
            .map(|i| KindId(i as u16))
    }

    pub fn category(&self, id: KindId) -> KindCategory {
        self.get(id).map(|def| def.category).unwrap_or_default()
    }

    /// Whether instances of this kind carry occupants.
    pub fn carries_contents(&self, id: KindId) -> bool {
        self.get(id)
            .is_some_and(|def| def.contents.carries_contents())
    }

    /// Airborne kinds the area turret may shoot at, then ship parts.
    pub fn turret_candidate_kinds(&self) -> impl Iterator<Item = KindId> + '_ {
        self.skyfaller_targets
            .iter()
            .chain(self.ship_parts.iter())
            .copied()
    }

    pub fn ally_transport_kinds(&self) -> &[KindId] {
        &self.ally_transports
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
