//! Turret top rotation: snap to targets, idle-turn when bored.

use rand::Rng;

use bulwark_core::components::TurretTop;
use bulwark_core::constants::*;
use bulwark_core::types::{normalize_degrees, Cell};

/// Point the top at `target` and postpone the next idle turn.
pub fn aim_at<R: Rng + ?Sized>(top: &mut TurretTop, origin: Cell, target: Cell, rng: &mut R) {
    top.orientation = origin.bearing_to(&target);
    top.idle_turn_ticks_left = 0;
    top.ticks_until_idle_turn = next_idle_delay(rng);
}

/// Advance the idle animation by one tick.
pub fn tick<R: Rng + ?Sized>(top: &mut TurretTop, rng: &mut R) {
    if top.ticks_until_idle_turn > 0 {
        top.ticks_until_idle_turn -= 1;
        if top.ticks_until_idle_turn == 0 {
            top.idle_turn_clockwise = rng.gen_bool(0.5);
            top.idle_turn_ticks_left = IDLE_TURN_DURATION;
        }
        return;
    }

    let step = if top.idle_turn_clockwise {
        IDLE_TURN_RATE_DEG
    } else {
        -IDLE_TURN_RATE_DEG
    };
    top.orientation = normalize_degrees(top.orientation + step);
    top.idle_turn_ticks_left = top.idle_turn_ticks_left.saturating_sub(1);
    if top.idle_turn_ticks_left == 0 {
        top.ticks_until_idle_turn = next_idle_delay(rng);
    }
}

fn next_idle_delay<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(IDLE_TURN_DELAY_MIN..=IDLE_TURN_DELAY_MAX)
}
