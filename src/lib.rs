//! Word Runner - a three-lane vocabulary runner
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (entities, spawning, collisions, progression)
//! - `engine`: Frame loop orchestration around the simulation
//! - `renderer`: Drawing surface abstraction and scene drawing
//! - `hud`: Presentation snapshot for the DOM readouts
//! - `vocab`: Vocabulary words and languages
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod engine;
pub mod error;
pub mod hud;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod vocab;

pub use engine::{Engine, LoopControl, LoopToken, StepOutcome};
pub use error::{RunnerError, RunnerResult};
pub use settings::Settings;
pub use tuning::{DistanceBonus, Tuning};
pub use vocab::{Language, Vocabulary, Word};

/// Game configuration constants
pub mod consts {
    /// Default play area (canvas) dimensions
    pub const PLAY_WIDTH: f32 = 800.0;
    pub const PLAY_HEIGHT: f32 = 400.0;

    /// Road layout
    pub const LANE_COUNT: u32 = 3;
    /// Road edge inset; also the player's horizontal clamp
    pub const LANE_MARGIN: f32 = 50.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 50.0;
    /// Pixels per frame while a direction is held
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Distance from the bottom edge to the player's top
    pub const PLAYER_BOTTOM_OFFSET: f32 = 80.0;

    /// Obstacle defaults
    pub const OBSTACLE_SIZE: f32 = 50.0;
    pub const OBSTACLE_SPAWN_Y: f32 = -60.0;

    /// Collectible defaults
    pub const COLLECTIBLE_SIZE: f32 = 80.0;
    pub const COLLECTIBLE_SPAWN_Y: f32 = -80.0;
    /// Vertical gap between collectibles of one spawn batch
    pub const COLLECTIBLE_STAGGER: f32 = 200.0;

    /// Scoring
    pub const TARGET_POINTS: u64 = 10;
    pub const WORD_POINTS: u64 = 50;
    pub const DISTANCE_POINTS: u64 = 1;

    /// Speed ramp: +SPEED_STEP every SPEED_STEP_SECS of wall-clock time
    pub const SPEED_STEP_SECS: f64 = 20.0;
    pub const SPEED_STEP: f32 = 0.01;

    /// Touch swipe translation
    pub const SWIPE_THRESHOLD_PX: f32 = 30.0;
    pub const SWIPE_PRESS_MS: f64 = 100.0;
}
