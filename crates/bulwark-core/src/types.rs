//! Fundamental grid and simulation types.

use serde::{Deserialize, Serialize};

use crate::constants::TICK_RATE;

/// A grid cell on the colony map. `x` runs east, `z` runs north.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Squared horizontal distance in cells, saturating at `u64::MAX`. Range
    /// checks compare against `range * range` so no square root is taken on
    /// the hot path.
    pub fn distance_squared(&self, other: &Cell) -> u64 {
        let dx = (i64::from(other.x) - i64::from(self.x)).unsigned_abs();
        let dz = (i64::from(other.z) - i64::from(self.z)).unsigned_abs();
        (dx * dx).saturating_add(dz * dz)
    }

    /// Whether `other` lies within `range` cells of this one.
    pub fn within_range(&self, other: &Cell, range: u32) -> bool {
        let range = u64::from(range);
        self.distance_squared(other) <= range * range
    }

    /// The cell one step away in `facing`, or `None` past the edge of the
    /// coordinate space.
    pub fn step(&self, facing: crate::enums::Facing) -> Option<Cell> {
        let (dx, dz) = facing.offset();
        Some(Cell::new(self.x.checked_add(dx)?, self.z.checked_add(dz)?))
    }

    /// Exact world-space center of the cell.
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x as f32 + 0.5, self.z as f32 + 0.5)
    }

    /// Flat bearing to another cell in degrees (0 = north, clockwise), in [0, 360).
    pub fn bearing_to(&self, other: &Cell) -> f32 {
        let delta = other.center() - self.center();
        normalize_degrees(delta.x.atan2(delta.y).to_degrees())
    }
}

/// Map dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub x: i32,
    pub z: i32,
}

impl MapSize {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        cell.x >= 0 && cell.z >= 0 && cell.x < self.x && cell.z < self.z
    }
}

/// Faction identifier. Hostility between factions is decided by the map's diplomacy table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    /// The colony's own faction.
    pub const PLAYER: FactionId = FactionId(0);
}

/// Identifier of a connected power network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PowerNetId(pub u32);

/// Stable identifier of a defense installation, used by commands and save data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstallationId(pub u32);

/// Index into the kind registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindId(pub u16);

/// Cosmetic RGBA color (components in 0..=1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(TICK_RATE)
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}

/// Convert a tick count to seconds of game time.
pub fn ticks_to_secs(ticks: u32) -> f32 {
    ticks as f32 / TICK_RATE as f32
}

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
