//! Data-driven game balance
//!
//! Values that are load-bearing for gameplay (spawn caps, placement retry
//! budgets, grace delays) live here instead of as magic numbers in `sim`.

use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

/// How the distance bonus point is discretised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBonus {
    /// +1 on every frame where `floor(distance)` is a multiple of 10.
    /// Consecutive frames sharing the same floor value each award a point.
    #[default]
    EveryFrame,
    /// +1 once each time `floor(distance)` reaches a new multiple of 10
    OncePerCrossing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Health at the start of a run
    pub starting_health: u8,

    // === Obstacles ===
    /// Per-frame spawn probability
    pub obstacle_spawn_chance: f32,
    /// Concurrent obstacle cap
    pub max_obstacles: usize,
    /// Lane picks tried before an obstacle is placed regardless of targets
    pub obstacle_placement_attempts: u32,
    /// Obstacles may not spawn within this vertical distance of a live
    /// target collectible in the same lane
    pub target_clearance: f32,
    /// How long a hit obstacle lingers before removal (ms)
    pub hit_grace_ms: f64,

    // === Collectibles ===
    /// Random lane picks per collectible before the exhaustive lane scan
    pub collectible_placement_attempts: u32,
    /// Upper bound on distractor glyphs per spawn batch
    pub max_distractors: usize,

    // === Timing ===
    /// Hurt flash duration after a penalty (ms)
    pub hurt_ms: f64,
    /// Word review screen duration (ms)
    pub review_ms: f64,

    // === Scoring ===
    pub distance_bonus: DistanceBonus,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_health: 5,

            obstacle_spawn_chance: 0.01,
            max_obstacles: 3,
            obstacle_placement_attempts: 5,
            target_clearance: 150.0,
            hit_grace_ms: 300.0,

            collectible_placement_attempts: 10,
            max_distractors: 2,

            hurt_ms: 500.0,
            review_ms: 2000.0,

            distance_bonus: DistanceBonus::EveryFrame,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> RunnerResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall spawning or end a run before it starts
    pub fn validate(&self) -> RunnerResult<()> {
        if self.starting_health == 0 {
            return Err(RunnerError::tuning("starting_health must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.obstacle_spawn_chance) {
            return Err(RunnerError::tuning(format!(
                "obstacle_spawn_chance {} is outside 0..=1",
                self.obstacle_spawn_chance
            )));
        }
        if self.obstacle_placement_attempts == 0 || self.collectible_placement_attempts == 0 {
            return Err(RunnerError::tuning("placement attempts must be at least 1"));
        }
        if self.hit_grace_ms < 0.0 || self.hurt_ms < 0.0 || self.review_ms < 0.0 {
            return Err(RunnerError::tuning("durations must not be negative"));
        }
        Ok(())
    }
}
