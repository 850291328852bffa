//! Fixed-step simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Fixed per-frame deltas (only the speed ramp reads the clock)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)

pub mod collision;
pub mod progress;
pub mod schedule;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Rect, is_colliding};
pub use progress::{advance_distance, speed_multiplier};
pub use schedule::{Scheduler, Task};
pub use state::{
    Arena, Body, Collectible, Entity, GameEvent, GamePhase, GameState, Obstacle, Player, RunSummary,
    WordStatus,
};
pub use tick::{TickInput, begin_review, end_review, load_word, tick};
