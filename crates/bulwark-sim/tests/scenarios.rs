//! End-to-end defense scenarios driven through `DefenseEngine`.

use hecs::Entity;

use bulwark_sim::core::commands::DefenseCommand;
use bulwark_sim::core::components::{Battery, Health, LaserGridSegment, ProjectileShield};
use bulwark_sim::core::config::DefenseSettings;
use bulwark_sim::core::enums::{Facing, ShieldStatus};
use bulwark_sim::core::events::DefenseEvent;
use bulwark_sim::core::state::InstallationSave;
use bulwark_sim::core::types::{Cell, FactionId, InstallationId, MapSize, PowerNetId};
use bulwark_sim::world_setup::*;
use bulwark_sim::{DefenseEngine, Map, SimConfig};
use bulwark_threat::registry::names;
use bulwark_threat::{ContainerLike, ThreatWorld};

const PIRATES: FactionId = FactionId(1);
const NET: PowerNetId = PowerNetId(1);
const TURRET: InstallationId = InstallationId(1);
const SHIELD: InstallationId = InstallationId(2);
const GRID: InstallationId = InstallationId(3);

fn hostile_map() -> Map {
    let mut map = Map::with_standard_kinds(MapSize::new(120, 120));
    map.declare_hostile(PIRATES, FactionId::PLAYER);
    map
}

fn engine(map: Map, settings: DefenseSettings) -> DefenseEngine {
    DefenseEngine::new(SimConfig { seed: 99, settings }, map).unwrap()
}

fn shield_entity(engine: &DefenseEngine) -> Entity {
    engine.map().installation_entity(SHIELD).unwrap()
}

// ---- Scenario A: ammo caps the number of kills ----

#[test]
fn scenario_turret_out_of_ammo() {
    let settings = DefenseSettings {
        ammo_count: 2,
        ..Default::default()
    };
    let mut map = hostile_map();
    spawn_area_turret(&mut map, TURRET, Cell::new(60, 60), Some(NET), &settings).unwrap();
    let threats: Vec<Entity> = (0..3)
        .map(|i| {
            spawn_skyfaller(
                &mut map,
                names::PSYCHIC_DRONER_SHIP_PART,
                Cell::new(70 + i, 60),
                Some(PIRATES),
            )
            .unwrap()
        })
        .collect();
    let mut engine = engine(map, settings);

    let snapshot = engine.tick();

    let destroyed = threats
        .iter()
        .filter(|&&threat| engine.map().is_destroyed(threat))
        .count();
    assert_eq!(destroyed, 2);
    assert_eq!(snapshot.turrets[0].ammo_remaining, 0);

    // No ammo: the survivor lives until the reload.
    for _ in 0..50 {
        engine.tick();
    }
    let survivors = threats
        .iter()
        .filter(|&&threat| !engine.map().is_destroyed(threat))
        .count();
    assert_eq!(survivors, 1);
}

#[test]
fn scenario_turret_reloads_and_finishes_the_job() {
    let settings = DefenseSettings {
        ammo_count: 2,
        reload_period_ticks: 120,
        ..Default::default()
    };
    let mut map = hostile_map();
    spawn_area_turret(&mut map, TURRET, Cell::new(60, 60), Some(NET), &settings).unwrap();
    for i in 0..3 {
        spawn_skyfaller(&mut map, names::METEORITE_INCOMING, Cell::new(60, 70 + i), Some(PIRATES))
            .unwrap();
    }
    let mut engine = engine(map, settings);

    engine.tick();
    let mut ticks = 1;
    while engine.tick().hostile_threat_present {
        ticks += 1;
        assert!(ticks < 200, "turret never reloaded");
    }
    assert!(ticks >= 120);
}

// ---- Scenario B: shield overload ----

#[test]
fn scenario_shield_overload_and_cooldown() {
    let settings = DefenseSettings {
        shield_intercept_cost_wd: 10.0,
        percentage_of_damage_drained: 0,
        shield_cooldown_ticks: 30,
        ..Default::default()
    };
    let mut map = hostile_map();
    let battery = spawn_battery(&mut map, Cell::new(1, 1), NET, 5.0, 100.0).unwrap();
    spawn_shield(&mut map, SHIELD, Cell::new(10, 10), Some(NET), &settings).unwrap();
    spawn_pawn(&mut map, names::RAIDER, PIRATES, Cell::new(100, 100), 100.0).unwrap();
    let bullet = spawn_projectile(&mut map, Cell::new(20, 20), 0, Some(PIRATES)).unwrap();
    let mut engine = engine(map, settings);
    engine.queue_commands([
        DefenseCommand::DefineRegion {
            label: "gate".to_string(),
            cells: vec![Cell::new(20, 20), Cell::new(21, 20)],
        },
        DefenseCommand::SelectShieldRegion {
            installation: SHIELD,
            region: "gate".to_string(),
        },
    ]);

    let snapshot = engine.tick();
    let view = &snapshot.shields[0];
    assert_eq!(view.status, ShieldStatus::Cooldown);
    assert_eq!(view.cooldown_ticks_remaining, 30);
    assert_eq!(view.power_output, 0.0);
    assert!(!engine.map().is_destroyed(bullet));
    assert_eq!(
        engine.map().world().get::<&Battery>(battery).unwrap().stored_energy,
        5.0
    );
    assert_eq!(snapshot.alerts.len(), 1);
    assert_eq!(
        snapshot.alerts[0].message,
        "Shield generator overloaded and shut down!"
    );
    assert!(snapshot
        .events
        .iter()
        .any(|event| matches!(event, DefenseEvent::EnergyDisruption { radius: 2, .. })));

    for expected in (0..30).rev() {
        let snapshot = engine.tick();
        assert_eq!(snapshot.shields[0].cooldown_ticks_remaining, expected);
        assert_eq!(snapshot.shields[0].power_output, 0.0);
        assert!(snapshot.alerts.is_empty());
    }

    // Back online, still broke: overloads again.
    let snapshot = engine.tick();
    assert_eq!(snapshot.shields[0].cooldown_ticks_remaining, 30);
    assert_eq!(snapshot.alerts.len(), 1);
}

#[test]
fn scenario_shield_inspect_during_cooldown() {
    let settings = DefenseSettings {
        shield_intercept_cost_wd: 10.0,
        percentage_of_damage_drained: 0,
        shield_cooldown_ticks: 120,
        ..Default::default()
    };
    let mut map = hostile_map();
    spawn_shield(&mut map, SHIELD, Cell::new(10, 10), Some(NET), &settings).unwrap();
    spawn_pawn(&mut map, names::RAIDER, PIRATES, Cell::new(100, 100), 100.0).unwrap();
    spawn_projectile(&mut map, Cell::new(20, 20), 0, Some(PIRATES)).unwrap();
    map.set_region("gate", [Cell::new(20, 20)]);
    let mut engine = engine(map, settings);
    engine.queue_command(DefenseCommand::SelectShieldRegion {
        installation: SHIELD,
        region: "gate".to_string(),
    });
    engine.tick();

    let text = engine.shield_inspect(SHIELD).unwrap().to_string();
    assert!(text.starts_with("Status: COOLDOWN (2.0s remaining)"), "{text}");
    assert!(text.contains("Area: gate (1 cells)"));
}

// ---- Scenario C: occupants shot through the hull ----

#[test]
fn scenario_pod_survives_occupant_hit() {
    let settings = DefenseSettings {
        destroy_chance_percent: 0,
        max_shots_per_occupant: 3,
        bullet_damage: 10.0,
        ..Default::default()
    };
    let mut map = hostile_map();
    spawn_area_turret(&mut map, TURRET, Cell::new(60, 60), Some(NET), &settings).unwrap();
    let pod = spawn_container(
        &mut map,
        names::DROP_POD_INCOMING,
        Cell::new(65, 65),
        &[(names::RAIDER, PIRATES)],
        100.0,
    )
    .unwrap();
    let raider = map.try_get_occupants(pod).unwrap()[0];
    let mut engine = engine(map, settings);

    engine.tick();

    assert!(!engine.map().is_destroyed(pod));
    let hp = engine.map().world().get::<&Health>(raider).unwrap().hit_points;
    assert!((70.0..=90.0).contains(&hp), "raider at {hp}");
    assert_eq!(hp % 10.0, 0.0);
}

#[test]
fn scenario_friendly_pod_is_left_alone() {
    let settings = DefenseSettings::default();
    let mut map = hostile_map();
    spawn_area_turret(&mut map, TURRET, Cell::new(60, 60), Some(NET), &settings).unwrap();
    let pod = spawn_container(
        &mut map,
        names::DROP_POD_INCOMING,
        Cell::new(65, 65),
        &[(names::COLONIST, FactionId::PLAYER)],
        100.0,
    )
    .unwrap();
    let shuttle = spawn_skyfaller(&mut map, names::SHUTTLE_INCOMING, Cell::new(62, 62), Some(PIRATES))
        .unwrap();
    let mut engine = engine(map, settings);

    for _ in 0..10 {
        engine.tick();
    }
    assert!(!engine.map().is_destroyed(pod));
    assert!(!engine.map().is_destroyed(shuttle));
}

// ---- Laser grid ----

fn laser_map(receiver_distance: i32) -> Map {
    let mut map = hostile_map();
    spawn_laser_grid_emitter(&mut map, GRID, Cell::new(40, 40), Facing::South, Some(NET)).unwrap();
    spawn_laser_grid_receiver(&mut map, Cell::new(40, 40 - receiver_distance)).unwrap();
    map
}

#[test]
fn scenario_laser_grid_follows_threat() {
    let mut engine = engine(laser_map(4), DefenseSettings::default());

    let snapshot = engine.tick();
    assert!(!snapshot.laser_grids[0].raised);
    assert_eq!(snapshot.laser_grids[0].grid_cells, 5);

    let raider = spawn_pawn(
        engine.map_mut(),
        names::RAIDER,
        PIRATES,
        Cell::new(90, 90),
        100.0,
    )
    .unwrap();
    let snapshot = engine.tick();
    assert!(snapshot.laser_grids[0].raised);
    assert_eq!(snapshot.laser_grids[0].power_output, -25.0);
    let segments = engine
        .map()
        .world()
        .query::<&LaserGridSegment>()
        .iter()
        .count();
    assert_eq!(segments, 5);

    engine.map_mut().destroy(raider);
    let snapshot = engine.tick();
    assert!(!snapshot.laser_grids[0].raised);
    assert_eq!(snapshot.laser_grids[0].power_output, 0.0);
}

#[test]
fn scenario_laser_grid_needs_receiver_in_range() {
    let mut map = laser_map(6);
    spawn_pawn(&mut map, names::RAIDER, PIRATES, Cell::new(90, 90), 100.0).unwrap();
    let mut engine = engine(map, DefenseSettings::default());

    for _ in 0..5 {
        let snapshot = engine.tick();
        assert!(!snapshot.laser_grids[0].raised);
        assert_eq!(snapshot.laser_grids[0].grid_cells, 0);
    }
    assert_eq!(
        engine.laser_grid_inspect(GRID).unwrap(),
        "No receiver found within range."
    );
}

#[test]
fn scenario_laser_grid_manual_commands() {
    let mut engine = engine(laser_map(2), DefenseSettings::default());
    engine.queue_command(DefenseCommand::ToggleGridManualMode { installation: GRID });
    engine.queue_command(DefenseCommand::ToggleGrid { installation: GRID });
    let snapshot = engine.tick();

    assert!(snapshot.laser_grids[0].manual_mode);
    assert!(snapshot.laser_grids[0].raised);
    assert!(snapshot.events.contains(&DefenseEvent::GridRaised {
        installation: GRID,
        cells: 3,
    }));
}

// ---- Beam weapon ----

#[test]
fn scenario_beam_weapon_command() {
    let mut map = hostile_map();
    let battery = spawn_battery(&mut map, Cell::new(1, 1), NET, 25.0, 100.0).unwrap();
    spawn_beam_weapon(&mut map, InstallationId(4), Cell::new(2, 1), Some(NET)).unwrap();
    let raider = spawn_pawn(&mut map, names::RAIDER, PIRATES, Cell::new(8, 8), 30.0).unwrap();
    let mut engine = engine(map, DefenseSettings::default());

    for _ in 0..2 {
        engine.queue_command(DefenseCommand::FireBeam {
            installation: InstallationId(4),
            target: Cell::new(8, 8),
        });
    }
    let snapshot = engine.tick();

    assert_eq!(
        engine.map().world().get::<&Health>(raider).unwrap().hit_points,
        20.0
    );
    assert_eq!(
        engine.map().world().get::<&Battery>(battery).unwrap().stored_energy,
        5.0
    );
    assert!(snapshot
        .events
        .iter()
        .any(|event| matches!(event, DefenseEvent::TextMote { text, .. } if text == "Not enough power!")));
}

// ---- Save / load ----

fn full_defense_map(settings: &DefenseSettings) -> Map {
    let mut map = hostile_map();
    spawn_battery(&mut map, Cell::new(1, 1), NET, 500.0, 1000.0).unwrap();
    spawn_area_turret(&mut map, TURRET, Cell::new(60, 60), Some(NET), settings).unwrap();
    spawn_shield(&mut map, SHIELD, Cell::new(10, 10), Some(NET), settings).unwrap();
    spawn_laser_grid_emitter(&mut map, GRID, Cell::new(40, 40), Facing::East, Some(NET)).unwrap();
    spawn_laser_grid_receiver(&mut map, Cell::new(43, 40)).unwrap();
    map.set_region("gate", [Cell::new(20, 20), Cell::new(21, 20), Cell::new(22, 20)]);
    spawn_pawn(&mut map, names::RAIDER, PIRATES, Cell::new(110, 110), 100.0).unwrap();
    map
}

#[test]
fn scenario_save_load_roundtrip() {
    let settings = DefenseSettings::default();
    let mut original = engine(full_defense_map(&settings), settings.clone());
    original.queue_command(DefenseCommand::SelectShieldRegion {
        installation: SHIELD,
        region: "gate".to_string(),
    });
    for i in 0..3 {
        spawn_skyfaller(
            original.map_mut(),
            names::METEORITE_INCOMING,
            Cell::new(70, 60 + i),
            Some(PIRATES),
        )
        .unwrap();
    }
    for _ in 0..25 {
        original.tick();
    }
    let entity = shield_entity(&original);
    original
        .map_mut()
        .world_mut()
        .get::<&mut ProjectileShield>(entity)
        .unwrap()
        .cooldown_ticks_remaining = 77;
    let saved = original.to_save_data();
    let json = saved.to_json().unwrap();

    let mut restored = engine(full_defense_map(&settings), settings);
    let loaded = bulwark_sim::persistence::DefenseSave::from_json(&json).unwrap();
    restored.apply_save_data(&loaded).unwrap();

    assert_eq!(restored.to_save_data(), saved);
    assert_eq!(restored.time().tick, 25);

    let shield = restored
        .map()
        .world()
        .get::<&ProjectileShield>(shield_entity(&restored))
        .unwrap();
    assert_eq!(shield.covered_cells.len(), 3);
    assert_eq!(shield.cooldown_ticks_remaining, 77);

    match saved.get(GRID) {
        Some(InstallationSave::LaserGrid(grid)) => assert!(grid.grid_raised),
        other => panic!("unexpected grid save {other:?}"),
    }
    let segments = restored
        .map()
        .world()
        .query::<&LaserGridSegment>()
        .iter()
        .count();
    assert_eq!(segments, 4);
}

#[test]
fn scenario_load_before_region_is_defined() {
    let settings = DefenseSettings::default();
    let mut original = engine(full_defense_map(&settings), settings.clone());
    original.queue_command(DefenseCommand::SelectShieldRegion {
        installation: SHIELD,
        region: "gate".to_string(),
    });
    original.tick();
    let saved = original.to_save_data();

    let mut map = full_defense_map(&settings);
    map.remove_region("gate");
    let mut restored = engine(map, settings);
    restored.apply_save_data(&saved).unwrap();
    assert_eq!(restored.to_save_data(), saved);

    restored.queue_command(DefenseCommand::DefineRegion {
        label: "gate".to_string(),
        cells: vec![Cell::new(20, 20), Cell::new(21, 20), Cell::new(22, 20)],
    });
    restored.tick();

    let shield = restored
        .map()
        .world()
        .get::<&ProjectileShield>(shield_entity(&restored))
        .unwrap();
    assert_eq!(shield.selected_region.as_deref(), Some("gate"));
    assert_eq!(shield.covered_cells.len(), 3);
    drop(shield);

    match restored.to_save_data().get(SHIELD) {
        Some(InstallationSave::Shield(state)) => {
            assert_eq!(state.selected_region.as_deref(), Some("gate"))
        }
        other => panic!("unexpected shield save {other:?}"),
    }
}

#[test]
fn scenario_load_skips_missing_installations() {
    let settings = DefenseSettings::default();
    let original = engine(full_defense_map(&settings), settings.clone());
    let saved = original.to_save_data();

    let mut map = hostile_map();
    spawn_area_turret(&mut map, TURRET, Cell::new(60, 60), Some(NET), &settings).unwrap();
    let mut sparse = engine(map, settings);
    sparse.apply_save_data(&saved).unwrap();

    assert_eq!(sparse.to_save_data().installations.len(), 1);
}
