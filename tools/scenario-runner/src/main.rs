//! scenario-runner: drive a demo colony defense headlessly and dump snapshots.
//!
//! Usage:
//!   scenario-runner run --ticks 600 --seed 7 --settings defense.json
//!   scenario-runner run --ticks 120 --save-dir saves --slot demo
//!   scenario-runner settings > defense.json

use std::path::{Path, PathBuf};
use std::process;

use bulwark_core::commands::DefenseCommand;
use bulwark_core::config::DefenseSettings;
use bulwark_core::enums::Facing;
use bulwark_core::types::{Cell, FactionId, InstallationId, MapSize, PowerNetId};
use bulwark_sim::persistence;
use bulwark_sim::world_setup::*;
use bulwark_sim::{DefenseEngine, Map, SimConfig};
use bulwark_threat::registry::names;

const RAIDERS: FactionId = FactionId(1);
const NET: PowerNetId = PowerNetId(1);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "settings" => cmd_settings(),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "scenario-runner: BULWARK headless defense scenarios\n\
         \n\
         Commands:\n\
         \n\
         run       Simulate the demo colony and print the final snapshot as JSON\n\
         \n\
           --ticks <N>        Ticks to simulate (default: 300)\n\
           --seed <N>         RNG seed (default: 42)\n\
           --settings <path>  Defense settings JSON (optional, default: built-in)\n\
           --every <N>        Also print every Nth snapshot (optional)\n\
           --save-dir <path>  Write a save file after the run (optional)\n\
           --slot <name>      Save slot name (default: scenario)\n\
         \n\
         settings  Print the default defense settings as JSON\n"
    );
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].as_str());
        }
    }
    None
}

fn parse_number(args: &[String], flag: &str, default: u64) -> u64 {
    match parse_value(args, flag) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Error: {flag} expects a number, got {raw}");
                process::exit(1);
            }
        },
        None => default,
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let ticks = parse_number(args, "--ticks", 300);
    let seed = parse_number(args, "--seed", 42);
    let every = parse_number(args, "--every", 0);
    let settings_path = parse_value(args, "--settings").map(PathBuf::from);
    let settings = DefenseSettings::load_or_default(settings_path.as_deref());

    let map = match demo_colony(&settings) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("Error: failed to build demo colony: {err}");
            process::exit(1);
        }
    };
    let mut engine = match DefenseEngine::new(SimConfig { seed, settings }, map) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    engine.queue_commands(demo_commands());

    tracing::info!(ticks, seed, "scenario started");
    let mut last = None;
    for tick in 1..=ticks {
        let snapshot = engine.tick();
        if every > 0 && tick % every == 0 {
            print_json(&snapshot);
        }
        last = Some(snapshot);
    }
    if let Some(snapshot) = last {
        print_json(&snapshot);
    }

    if let Some(dir) = parse_value(args, "--save-dir") {
        let slot = parse_value(args, "--slot").unwrap_or("scenario");
        if let Err(err) = persistence::save_to_file(Path::new(dir), slot, &engine.to_save_data()) {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

fn cmd_settings() {
    print_json(&DefenseSettings::default());
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("Error: failed to serialize: {err}");
            process::exit(1);
        }
    }
}

// --- Demo colony ---

/// A small walled colony under a mixed raid: one turret, one shield over the
/// gate, a laser grid across the gap and a battery bank to pay for it all.
fn demo_colony(settings: &DefenseSettings) -> Result<Map, SetupError> {
    let mut map = Map::with_standard_kinds(MapSize::new(100, 100));
    map.declare_hostile(RAIDERS, FactionId::PLAYER);

    spawn_battery(&mut map, Cell::new(48, 48), NET, 600.0, 1000.0)?;
    spawn_battery(&mut map, Cell::new(49, 48), NET, 600.0, 1000.0)?;
    spawn_area_turret(&mut map, InstallationId(1), Cell::new(50, 50), Some(NET), settings)?;
    spawn_shield(&mut map, InstallationId(2), Cell::new(52, 50), Some(NET), settings)?;
    spawn_laser_grid_emitter(&mut map, InstallationId(3), Cell::new(60, 40), Facing::East, Some(NET))?;
    spawn_laser_grid_receiver(&mut map, Cell::new(64, 40))?;
    spawn_beam_weapon(&mut map, InstallationId(4), Cell::new(50, 52), Some(NET))?;

    spawn_pawn(&mut map, names::COLONIST, FactionId::PLAYER, Cell::new(51, 51), 100.0)?;
    spawn_pawn(&mut map, names::RAIDER, RAIDERS, Cell::new(90, 90), 100.0)?;
    spawn_container(
        &mut map,
        names::DROP_POD_INCOMING,
        Cell::new(70, 70),
        &[(names::RAIDER, RAIDERS), (names::RAIDER, RAIDERS)],
        100.0,
    )?;
    spawn_skyfaller(&mut map, names::METEORITE_INCOMING, Cell::new(30, 75), Some(RAIDERS))?;
    spawn_skyfaller(&mut map, names::PSYCHIC_DRONER_SHIP_PART, Cell::new(20, 20), Some(RAIDERS))?;
    for x in 54..58 {
        spawn_projectile(&mut map, Cell::new(x, 60), 12, Some(RAIDERS))?;
    }
    Ok(map)
}

fn demo_commands() -> Vec<DefenseCommand> {
    let gate: Vec<Cell> = (52..60)
        .flat_map(|x| (58..62).map(move |z| Cell::new(x, z)))
        .collect();
    vec![
        DefenseCommand::DefineRegion {
            label: "gate".to_string(),
            cells: gate,
        },
        DefenseCommand::SelectShieldRegion {
            installation: InstallationId(2),
            region: "gate".to_string(),
        },
        DefenseCommand::FireBeam {
            installation: InstallationId(4),
            target: Cell::new(90, 90),
        },
    ]
}
