//! Game state and core simulation types
//!
//! Everything a run mutates lives in [`GameState`]. The engine owns exactly
//! one of these and replaces it wholesale on restart.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;
use crate::vocab::Language;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run in progress
    Start,
    /// Word card on screen, world frozen
    Reviewing,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Progress on the current word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordStatus {
    /// Still missing glyphs
    Collecting,
    /// All glyphs collected; waiting for the remaining collectibles to leave
    Completing,
}

/// Feedback triggers produced by the simulation, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A needed glyph was collected
    Correct { glyph: String },
    /// Distractor or obstacle hit
    Wrong,
    /// Current word fully collected
    WordComplete { word: String },
    /// Review card shown for the word at `word_index`
    ReviewStarted { word_index: usize },
    /// Pronounce a word
    Speak { text: String, language: Language },
    /// Health reached zero
    GameOver,
}

/// Play area dimensions, queried from the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: PLAY_WIDTH,
            height: PLAY_HEIGHT,
        }
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn lane_width(&self) -> f32 {
        self.width / LANE_COUNT as f32
    }

    /// Left edge of an entity of `size` centred in `lane`
    ///
    /// Lane centres are offset by the road margin, so the rightmost lane sits
    /// slightly past the geometric third of the width.
    pub fn lane_x(&self, lane: u32, size: f32) -> f32 {
        let lane_width = self.lane_width();
        LANE_MARGIN + lane as f32 * lane_width + lane_width / 2.0 - size / 2.0
    }

    /// Top edge has moved at least one body-height past the bottom
    pub fn is_past_bottom(&self, bounds: &Rect) -> bool {
        bounds.top() >= self.height + bounds.size.y
    }

    /// Entirely above the top edge and not moving down, so it can never enter
    pub fn is_stranded_above(&self, bounds: &Rect, speed: f32) -> bool {
        bounds.bottom() < 0.0 && speed <= 0.0
    }

    pub fn is_off_screen(&self, bounds: &Rect, speed: f32) -> bool {
        self.is_past_bottom(bounds) || self.is_stranded_above(bounds, speed)
    }

    /// At least partially within the visible band
    pub fn is_visible(&self, bounds: &Rect) -> bool {
        bounds.top() < self.height + bounds.size.y && bounds.top() > -bounds.size.y
    }
}

/// Shared capability of every simulated body
pub trait Body {
    fn bounds(&self) -> Rect;

    /// Advance one fixed step
    fn advance(&mut self);
}

/// The player's marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub health: u8,
    /// Hurt flash ends at this timestamp (ms)
    pub hurt_until: Option<f64>,
    /// Direction held this frame (-1, 0, 1)
    #[serde(skip)]
    pub steer: f32,
}

impl Player {
    pub fn new(arena: &Arena, health: u8) -> Self {
        Self {
            pos: Vec2::new(
                arena.width / 2.0 - PLAYER_SIZE / 2.0,
                arena.height - PLAYER_BOTTOM_OFFSET,
            ),
            size: PLAYER_SIZE,
            speed: PLAYER_SPEED,
            health,
            hurt_until: None,
            steer: 0.0,
        }
    }

    /// Apply held directions, clamped to the road
    pub fn steer(&mut self, left: bool, right: bool, arena: &Arena) {
        self.steer = 0.0;
        if left {
            self.pos.x = (self.pos.x - self.speed).max(LANE_MARGIN);
            self.steer -= 1.0;
        }
        if right {
            let max_x = arena.width - self.size - LANE_MARGIN;
            self.pos.x = (self.pos.x + self.speed).min(max_x);
            self.steer += 1.0;
        }
    }

    /// Lose one health point and start the hurt flash
    pub fn take_hit(&mut self, now: f64, hurt_ms: f64) {
        self.health = self.health.saturating_sub(1);
        self.hurt_until = Some(now + hurt_ms);
    }

    pub fn is_hurt(&self, now: f64) -> bool {
        self.hurt_until.is_some_and(|until| now < until)
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

impl Body for Player {
    fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    // Vertical position is fixed; horizontal motion comes from `steer`
    fn advance(&mut self) {}
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub lane: u32,
    /// Set when the player hits it; the obstacle is removed after the grace delay
    pub hit_at: Option<f64>,
}

impl Obstacle {
    pub fn new(id: u32, lane: u32, arena: &Arena, speed: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(arena.lane_x(lane, OBSTACLE_SIZE), OBSTACLE_SPAWN_Y),
            size: OBSTACLE_SIZE,
            speed,
            lane,
            hit_at: None,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.hit_at.is_some()
    }

    pub fn grace_expired(&self, now: f64, grace_ms: f64) -> bool {
        self.hit_at.is_some_and(|at| now - at >= grace_ms)
    }
}

impl Body for Obstacle {
    fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    fn advance(&mut self) {
        self.pos.y += self.speed;
    }
}

/// A falling glyph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub lane: u32,
    pub glyph: String,
    /// Glyph belongs to the word that was current at spawn time
    pub is_target: bool,
    pub collected: bool,
}

impl Collectible {
    pub fn new(
        id: u32,
        lane: u32,
        y: f32,
        glyph: &str,
        is_target: bool,
        arena: &Arena,
        speed: f32,
    ) -> Self {
        Self {
            id,
            pos: Vec2::new(arena.lane_x(lane, COLLECTIBLE_SIZE), y),
            size: COLLECTIBLE_SIZE,
            speed,
            lane,
            glyph: glyph.to_string(),
            is_target,
            collected: false,
        }
    }

    /// Still in play: not collected and not yet past the bottom
    pub fn is_active(&self, arena: &Arena) -> bool {
        !self.collected && !arena.is_past_bottom(&self.bounds())
    }

    /// Not collected and on screen right now
    pub fn is_visible(&self, arena: &Arena) -> bool {
        !self.collected && arena.is_visible(&self.bounds())
    }
}

impl Body for Collectible {
    fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    fn advance(&mut self) {
        self.pos.y += self.speed;
    }
}

/// Borrowed view over any entity, for drawing in a single pass
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Player(&'a Player),
    Obstacle(&'a Obstacle),
    Collectible(&'a Collectible),
}

/// Final numbers for the game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub words_completed: u32,
    pub distance: u64,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub arena: Arena,
    pub phase: GamePhase,
    pub word_status: WordStatus,
    pub score: u64,
    pub distance: f64,
    /// Last multiple of 10 that paid a distance bonus (once-per-crossing mode)
    pub last_distance_mark: u64,
    pub word_index: usize,
    pub collected_parts: Vec<String>,
    pub words_completed: u32,
    pub speed_multiplier: f32,
    /// Wall-clock start of the run (ms)
    pub start_time: f64,
    /// Timestamp of the latest tick, in any phase
    pub last_frame_at: f64,
    /// Time spent playing; drives the lane-marking scroll
    pub road_scroll_ms: f64,
    pub player: Player,
    /// Sorted by id
    pub obstacles: Vec<Obstacle>,
    /// Sorted by id
    pub collectibles: Vec<Collectible>,
    /// Pending feedback events
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, arena: Arena, starting_health: u8, now: f64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            phase: GamePhase::Start,
            word_status: WordStatus::Collecting,
            score: 0,
            distance: 0.0,
            last_distance_mark: 0,
            word_index: 0,
            collected_parts: Vec::new(),
            words_completed: 0,
            speed_multiplier: 1.0,
            start_time: now,
            last_frame_at: now,
            road_scroll_ms: 0.0,
            player: Player::new(&arena, starting_health),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn health(&self) -> u8 {
        self.player.health
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every live entity, player first
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        std::iter::once(Entity::Player(&self.player))
            .chain(self.obstacles.iter().map(Entity::Obstacle))
            .chain(self.collectibles.iter().map(Entity::Collectible))
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            words_completed: self.words_completed,
            distance: self.distance.floor() as u64,
        }
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
        self.collectibles.sort_by_key(|c| c.id);
    }
}
