//! Speed ramp and distance scoring

use crate::consts::{DISTANCE_POINTS, SPEED_STEP, SPEED_STEP_SECS};
use crate::tuning::DistanceBonus;

/// Speed multiplier after `elapsed_ms` of wall-clock time since the run started
///
/// `1.0 + floor(seconds / 20) * 0.01`. Negative elapsed time (clock skew) is
/// treated as zero so the ramp never dips below 1.0.
pub fn speed_multiplier(elapsed_ms: f64) -> f32 {
    let secs = (elapsed_ms / 1000.0).max(0.0);
    let steps = (secs / SPEED_STEP_SECS).floor();
    1.0 + steps as f32 * SPEED_STEP
}

/// Result of one frame of distance accumulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStep {
    pub distance: f64,
    pub points: u64,
    pub last_mark: u64,
}

/// Add one frame of travel and work out the distance bonus
pub fn advance_distance(
    distance: f64,
    last_mark: u64,
    speed: f32,
    mode: DistanceBonus,
) -> DistanceStep {
    let distance = distance + speed as f64 / 10.0;
    let whole = distance.floor() as u64;
    let on_mark = whole % 10 == 0;

    let (points, last_mark) = match mode {
        DistanceBonus::EveryFrame if on_mark => (DISTANCE_POINTS, whole),
        DistanceBonus::OncePerCrossing if on_mark && whole > last_mark => (DISTANCE_POINTS, whole),
        _ => (0, last_mark),
    };

    DistanceStep {
        distance,
        points,
        last_mark,
    }
}
