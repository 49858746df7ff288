//! Defense engine: the tick driver.
//!
//! `DefenseEngine` owns the map, processes queued commands, runs every
//! installation controller once per tick and produces `DefenseSnapshot`s.
//! Completely headless, so whole scenarios can be tested deterministically.

use std::collections::VecDeque;

use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::commands::DefenseCommand;
use bulwark_core::components::*;
use bulwark_core::config::{ConfigError, DefenseSettings};
use bulwark_core::events::{Alert, DefenseEvent};
use bulwark_core::state::{
    DefenseSnapshot, InstallationSave, LaserGridSaveState, ShieldInspect, ShieldSaveState,
    TurretSaveState,
};
use bulwark_core::types::{Cell, InstallationId, SimTime};
use bulwark_threat::any_hostile_threat_present;

use crate::map::Map;
use crate::persistence::{DefenseSave, InstallationRecord, PersistenceError};
use crate::systems;
use crate::systems::beam_weapon::FireOutcome;

/// Configuration for starting a new engine.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub settings: DefenseSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            settings: DefenseSettings::default(),
        }
    }
}

/// The defense engine. Owns the map and all controller state.
pub struct DefenseEngine {
    map: Map,
    settings: DefenseSettings,
    time: SimTime,
    seed: u64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<DefenseCommand>,
    events: Vec<DefenseEvent>,
    alerts: Vec<Alert>,
    despawn_buffer: Vec<Entity>,
}

impl DefenseEngine {
    /// Create an engine over `map`. Fails if the settings are out of range.
    pub fn new(config: SimConfig, map: Map) -> Result<Self, ConfigError> {
        config.settings.validate()?;
        Ok(Self {
            map,
            settings: config.settings,
            time: SimTime::default(),
            seed: config.seed,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            alerts: Vec::new(),
            despawn_buffer: Vec::new(),
        })
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: DefenseCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = DefenseCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> DefenseSnapshot {
        self.process_commands();
        self.run_systems();
        self.time.advance();

        let hostile_threat_present =
            any_hostile_threat_present(&self.map, self.settings.defending_faction);
        let events = std::mem::take(&mut self.events);
        let alerts = std::mem::take(&mut self.alerts);
        systems::snapshot::build_snapshot(
            &self.map,
            &self.time,
            hostile_threat_present,
            events,
            alerts,
        )
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &DefenseSettings {
        &self.settings
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Mutable map access for the host (spawning threats, wiring power).
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Inspect panel of a shield installation.
    pub fn shield_inspect(&self, id: InstallationId) -> Option<ShieldInspect> {
        let entity = self.map.installation_entity(id)?;
        let shield = self.map.world().get::<&ProjectileShield>(entity).ok()?;
        let threat_present = any_hostile_threat_present(&self.map, self.settings.defending_faction);
        Some(systems::shield::inspect(
            &shield,
            self.map.is_powered(entity),
            threat_present,
            &self.settings,
        ))
    }

    /// Inspect line of a laser grid emitter.
    pub fn laser_grid_inspect(&self, id: InstallationId) -> Option<String> {
        let entity = self.map.installation_entity(id)?;
        let emitter = self.map.world().get::<&LaserGridEmitter>(entity).ok()?;
        Some(systems::laser_grid::inspect(&emitter, &self.settings))
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: DefenseCommand) {
        match command {
            DefenseCommand::DefineRegion { label, cells } => {
                self.map.set_region(&label, cells);
                systems::shield::refresh_region(&mut self.map, &label);
            }
            DefenseCommand::RemoveRegion { label } => {
                if self.map.remove_region(&label) {
                    systems::shield::refresh_region(&mut self.map, &label);
                }
            }
            DefenseCommand::SelectShieldRegion {
                installation,
                region,
            } => {
                self.with_shield(installation, |map, shield| {
                    systems::shield::select_region(map, shield, Some(&region));
                });
            }
            DefenseCommand::ClearShieldRegion { installation } => {
                self.with_shield(installation, |map, shield| {
                    systems::shield::select_region(map, shield, None);
                });
            }
            DefenseCommand::SetShieldColor {
                installation,
                color,
            } => {
                self.with_shield(installation, |_, shield| {
                    shield.color = color;
                    shield.render_dirty = true;
                });
            }
            DefenseCommand::ToggleGridManualMode { installation } => {
                if let Some(entity) = self.map.installation_entity(installation) {
                    systems::laser_grid::toggle_manual_mode(&mut self.map, entity);
                }
            }
            DefenseCommand::ToggleGrid { installation } => {
                if let Some(entity) = self.map.installation_entity(installation) {
                    systems::laser_grid::toggle_grid(
                        &mut self.map,
                        entity,
                        &self.settings,
                        &mut self.events,
                    );
                }
            }
            DefenseCommand::FireBeam {
                installation,
                target,
            } => {
                if let Some(entity) = self.map.installation_entity(installation) {
                    let outcome = systems::beam_weapon::try_fire(
                        &mut self.map,
                        entity,
                        target,
                        &self.settings,
                        &mut self.events,
                    );
                    if !matches!(outcome, FireOutcome::Fired { .. }) {
                        tracing::debug!(
                            target: "bulwark::beam",
                            installation = installation.0,
                            ?outcome,
                            "shot refused"
                        );
                    }
                }
            }
            DefenseCommand::SetPower { installation, on } => {
                if let Some(entity) = self.map.installation_entity(installation) {
                    if let Ok(mut power) = self.map.world_mut().get::<&mut PowerTrader>(entity) {
                        power.power_on = on;
                        if !on {
                            power.power_output = 0.0;
                        }
                    }
                }
            }
            DefenseCommand::SetSpawned {
                installation,
                spawned,
            } => {
                self.set_spawned(installation, spawned);
            }
        }
    }

    fn with_shield(
        &mut self,
        id: InstallationId,
        apply: impl FnOnce(&Map, &mut ProjectileShield),
    ) {
        let Some(entity) = self.map.installation_entity(id) else {
            tracing::warn!(target: "bulwark::engine", installation = id.0, "unknown installation");
            return;
        };
        let Ok(mut shield) = self
            .map
            .world()
            .get::<&ProjectileShield>(entity)
            .map(|shield| ProjectileShield::clone(&shield))
        else {
            return;
        };
        apply(&self.map, &mut shield);
        if let Ok(mut stored) = self.map.world_mut().get::<&mut ProjectileShield>(entity) {
            *stored = shield;
        }
    }

    /// Take an installation off the map or put it back. Packing up a laser
    /// grid lowers it.
    fn set_spawned(&mut self, id: InstallationId, spawned: bool) {
        let Some(entity) = self.map.installation_entity(id) else {
            return;
        };
        if let Ok(mut installation) = self.map.world_mut().get::<&mut Installation>(entity) {
            installation.spawned = spawned;
        }
        if spawned {
            return;
        }
        self.map.set_power_output(entity, 0.0);
        let emitter = self
            .map
            .world()
            .get::<&LaserGridEmitter>(entity)
            .ok()
            .map(|emitter| LaserGridEmitter::clone(&emitter));
        if let Some(mut emitter) = emitter {
            systems::laser_grid::lower(&mut self.map, entity, id, &mut emitter, &mut self.events);
            emitter.grid_cells.clear();
            emitter.receiver = None;
            if let Ok(mut stored) = self.map.world_mut().get::<&mut LaserGridEmitter>(entity) {
                *stored = emitter;
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Area turrets (may destroy skyfallers and pod occupants)
        systems::area_turret::run(
            &mut self.map,
            &self.settings,
            &mut self.rng,
            &mut self.events,
        );
        // 2. Shields (intercept projectiles, may overload)
        systems::shield::run(
            &mut self.map,
            &self.settings,
            &mut self.events,
            &mut self.alerts,
            self.time.tick,
        );
        // 3. Laser grids
        systems::laser_grid::run(&mut self.map, &self.settings, &mut self.events);
        // 4. Cleanup
        systems::cleanup::run(&mut self.map, &mut self.despawn_buffer);
    }

    // --- Persistence ---

    /// Capture the controller state of every installation.
    pub fn to_save_data(&self) -> DefenseSave {
        let world = self.map.world();
        let mut installations = Vec::new();

        for (_, (installation, turret, top)) in world
            .query::<(&Installation, &AreaTurret, &TurretTop)>()
            .iter()
        {
            installations.push(InstallationRecord {
                id: installation.id,
                state: InstallationSave::AreaTurret(TurretSaveState::capture(turret, top)),
            });
        }
        for (_, (installation, shield)) in world
            .query::<(&Installation, &ProjectileShield)>()
            .iter()
        {
            installations.push(InstallationRecord {
                id: installation.id,
                state: InstallationSave::Shield(ShieldSaveState::capture(shield)),
            });
        }
        for (_, (installation, emitter)) in world
            .query::<(&Installation, &LaserGridEmitter)>()
            .iter()
        {
            installations.push(InstallationRecord {
                id: installation.id,
                state: InstallationSave::LaserGrid(LaserGridSaveState::capture(emitter)),
            });
        }
        installations.sort_by_key(|record| record.id);

        DefenseSave {
            tick: self.time.tick,
            seed: self.seed,
            installations,
        }
    }

    /// Restore controller state from a save. Installations missing from the
    /// map are skipped with a warning.
    pub fn apply_save_data(&mut self, data: &DefenseSave) -> Result<(), PersistenceError> {
        for record in &data.installations {
            let Some(entity) = self.map.installation_entity(record.id) else {
                tracing::warn!(
                    target: "bulwark::persistence",
                    installation = record.id.0,
                    "saved installation not on map, skipping"
                );
                continue;
            };
            match &record.state {
                InstallationSave::AreaTurret(saved) => {
                    self.restore_turret(entity, record.id, saved)?
                }
                InstallationSave::Shield(saved) => self.restore_shield(entity, record.id, saved)?,
                InstallationSave::LaserGrid(saved) => {
                    self.restore_laser_grid(entity, record.id, saved)?
                }
            }
        }
        self.time.tick = data.tick;
        tracing::info!(
            target: "bulwark::persistence",
            tick = data.tick,
            installations = data.installations.len(),
            "save data applied"
        );
        Ok(())
    }

    fn restore_turret(
        &mut self,
        entity: Entity,
        id: InstallationId,
        saved: &TurretSaveState,
    ) -> Result<(), PersistenceError> {
        let (turret, top) = self
            .map
            .world_mut()
            .query_one_mut::<(&mut AreaTurret, &mut TurretTop)>(entity)
            .map_err(|_| mismatch(id, "area turret"))?;
        saved.restore(turret, top);
        Ok(())
    }

    fn restore_shield(
        &mut self,
        entity: Entity,
        id: InstallationId,
        saved: &ShieldSaveState,
    ) -> Result<(), PersistenceError> {
        let mut shield = self
            .map
            .world()
            .get::<&ProjectileShield>(entity)
            .map(|shield| ProjectileShield::clone(&shield))
            .map_err(|_| mismatch(id, "shield"))?;
        systems::shield::restore_region(&self.map, &mut shield, saved.selected_region.clone());
        shield.active_idle_timer = saved.active_idle_timer;
        shield.cooldown_ticks_remaining = saved.cooldown_ticks_remaining;
        shield.color = saved.color;
        if let Ok(mut stored) = self.map.world_mut().get::<&mut ProjectileShield>(entity) {
            *stored = shield;
        }
        Ok(())
    }

    fn restore_laser_grid(
        &mut self,
        entity: Entity,
        id: InstallationId,
        saved: &LaserGridSaveState,
    ) -> Result<(), PersistenceError> {
        let installation = self
            .map
            .world()
            .get::<&Installation>(entity)
            .map(|installation| *installation)
            .map_err(|_| mismatch(id, "laser grid"))?;
        let origin = self
            .map
            .world()
            .get::<&Cell>(entity)
            .map(|cell| *cell)
            .map_err(|_| mismatch(id, "laser grid"))?;
        let mut emitter = self
            .map
            .world()
            .get::<&LaserGridEmitter>(entity)
            .map(|emitter| LaserGridEmitter::clone(&emitter))
            .map_err(|_| mismatch(id, "laser grid"))?;

        systems::laser_grid::lower(&mut self.map, entity, id, &mut emitter, &mut self.events);
        emitter.manual_mode = saved.manual_mode;
        systems::laser_grid::rescan(&self.map, &installation, origin, &mut emitter, &self.settings);
        if saved.grid_raised && !emitter.grid_cells.is_empty() {
            systems::laser_grid::raise(
                &mut self.map,
                entity,
                id,
                &mut emitter,
                &self.settings,
                &mut self.events,
            );
        }
        if let Ok(mut stored) = self.map.world_mut().get::<&mut LaserGridEmitter>(entity) {
            *stored = emitter;
        }
        Ok(())
    }
}

fn mismatch(id: InstallationId, expected: &'static str) -> PersistenceError {
    PersistenceError::KindMismatch { id, expected }
}
