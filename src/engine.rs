//! Frame loop orchestration
//!
//! The [`Engine`] owns the one live [`GameState`] and advances it once per
//! display frame. The host re-arms its animation-frame callback for as long
//! as [`Engine::step`] answers [`LoopControl::Continue`].
//!
//! Every session start hands out a fresh [`LoopToken`]. A step carrying an
//! older token is refused without touching state, so at most one loop can
//! ever drive a session even if a previous callback is still queued.

use crate::error::RunnerResult;
use crate::hud::{self, HudSnapshot};
use crate::renderer::{SceneOptions, Surface, draw_frame};
use crate::sim::{
    Arena, GameEvent, GamePhase, GameState, RunSummary, Scheduler, Task, TickInput, begin_review,
    end_review, load_word, tick,
};
use crate::tuning::Tuning;
use crate::vocab::Vocabulary;

/// Identifies the frame loop of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopToken(u64);

/// Whether the host should request another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Result of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub control: LoopControl,
    /// Feedback for the audio/speech channel, in emission order
    pub events: Vec<GameEvent>,
}

impl StepOutcome {
    fn stop() -> Self {
        Self {
            control: LoopControl::Stop,
            events: Vec::new(),
        }
    }
}

pub struct Engine {
    state: GameState,
    vocab: Vocabulary,
    tuning: Tuning,
    scheduler: Scheduler,
    scene: SceneOptions,
    /// Bumped on every session start or teardown
    generation: u64,
    /// Events routed but not yet handed to the host
    outbox: Vec<GameEvent>,
}

impl Engine {
    pub fn new(vocab: Vocabulary, tuning: Tuning, arena: Arena) -> RunnerResult<Self> {
        vocab.validate()?;
        tuning.validate()?;
        let state = GameState::new(0, arena, tuning.starting_health, 0.0);
        Ok(Self {
            state,
            vocab,
            tuning,
            scheduler: Scheduler::new(),
            scene: SceneOptions::default(),
            generation: 0,
            outbox: Vec::new(),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn set_scene_options(&mut self, scene: SceneOptions) {
        self.scene = scene;
    }

    /// Token of the loop currently allowed to step
    pub fn current_token(&self) -> LoopToken {
        LoopToken(self.generation)
    }

    /// Begin a new run and return the token its frame loop must carry
    ///
    /// Any earlier loop is invalidated and pending tasks are cancelled.
    pub fn start_session(&mut self, now: f64, seed: u64) -> LoopToken {
        self.invalidate();
        let arena = self.state.arena;
        self.state = GameState::new(seed, arena, self.tuning.starting_health, now);
        load_word(&mut self.state, &self.vocab, 0);
        begin_review(&mut self.state, &self.vocab);
        self.route_events(now);
        log::info!(
            "Session {} started (seed {}, {} words, {})",
            self.generation,
            seed,
            self.vocab.len(),
            self.vocab.language.label()
        );
        self.current_token()
    }

    /// Tear down the current run and go back to the start screen
    pub fn return_to_start(&mut self) {
        self.invalidate();
        let arena = self.state.arena;
        self.state = GameState::new(self.state.seed, arena, self.tuning.starting_health, 0.0);
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.scheduler.cancel_all();
        self.outbox.clear();
    }

    /// Advance one display frame and draw it
    pub fn step(
        &mut self,
        token: LoopToken,
        now: f64,
        input: &TickInput,
        surface: &mut impl Surface,
    ) -> StepOutcome {
        if token != self.current_token() {
            log::debug!("Ignoring step from stale loop {:?}", token);
            return StepOutcome::stop();
        }

        for task in self.scheduler.take_due(now) {
            match task {
                Task::EndReview => end_review(&mut self.state, &self.vocab),
            }
        }

        let (width, height) = (surface.width(), surface.height());
        if width > 0.0 && height > 0.0 {
            self.state.arena = Arena::new(width, height);
        }

        tick(&mut self.state, &self.vocab, &self.tuning, input, now);
        self.route_events(now);
        draw_frame(surface, &self.state, now, self.scene);

        let control = match self.state.phase {
            GamePhase::Start | GamePhase::GameOver => LoopControl::Stop,
            GamePhase::Reviewing | GamePhase::Playing | GamePhase::Paused => LoopControl::Continue,
        };
        StepOutcome {
            control,
            events: std::mem::take(&mut self.outbox),
        }
    }

    /// Drain simulation events, arming timers they call for
    fn route_events(&mut self, now: f64) {
        for event in self.state.drain_events() {
            if let GameEvent::ReviewStarted { word_index } = event {
                log::debug!("Reviewing word {} for {}ms", word_index, self.tuning.review_ms);
                self.scheduler.schedule_at(now + self.tuning.review_ms, Task::EndReview);
            }
            self.outbox.push(event);
        }
    }

    /// Swap the active word list
    ///
    /// Mid-run this restarts from the first word and drops glyphs of the old
    /// list; outside a run it only changes the preview.
    pub fn set_vocabulary(&mut self, vocab: Vocabulary) -> RunnerResult<()> {
        vocab.validate()?;
        log::info!("Vocabulary switched to {}", vocab.language.label());
        self.vocab = vocab;
        match self.state.phase {
            GamePhase::Reviewing | GamePhase::Playing | GamePhase::Paused => {
                load_word(&mut self.state, &self.vocab, 0);
            }
            GamePhase::Start | GamePhase::GameOver => self.state.word_index = 0,
        }
        Ok(())
    }

    pub fn hud_snapshot(&self) -> HudSnapshot {
        hud::capture(&self.state, &self.vocab, self.tuning.starting_health)
    }

    pub fn summary(&self) -> RunSummary {
        self.state.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCall, RecordingSurface};
    use crate::sim::{Collectible, Obstacle, WordStatus};
    use glam::Vec2;
    use crate::tuning::DistanceBonus;
    use crate::vocab::Language;

    const FRAME: f64 = 1000.0 / 60.0;

    fn engine() -> Engine {
        let tuning = Tuning {
            distance_bonus: DistanceBonus::OncePerCrossing,
            ..Default::default()
        };
        Engine::new(Vocabulary::builtin(Language::Mandarin), tuning, Arena::default()).unwrap()
    }

    fn surface() -> RecordingSurface {
        RecordingSurface::new(800.0, 400.0)
    }

    /// Start at t=0 and step until the review card has closed
    fn playing_engine() -> (Engine, LoopToken, RecordingSurface) {
        let mut engine = engine();
        let mut surface = surface();
        let token = engine.start_session(0.0, 7);
        engine.step(token, 2000.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Playing);
        (engine, token, surface)
    }

    /// Place a glyph right on top of the player
    fn glyph_on_player(engine: &mut Engine, glyph: &str, is_target: bool) {
        let state = &mut engine.state;
        let id = state.next_entity_id();
        let arena = state.arena;
        let y = state.player.pos.y - 20.0;
        state.collectibles.push(Collectible::new(id, 1, y, glyph, is_target, &arena, 1.0));
    }

    #[test]
    fn test_rejects_empty_vocabulary() {
        let vocab = Vocabulary {
            language: Language::Korean,
            words: Vec::new(),
        };
        assert!(Engine::new(vocab, Tuning::default(), Arena::default()).is_err());
    }

    #[test]
    fn test_start_enters_review_and_speaks() {
        let mut engine = engine();
        let mut surface = surface();
        let token = engine.start_session(0.0, 1);
        assert_eq!(engine.phase(), GamePhase::Reviewing);

        let outcome = engine.step(token, FRAME, &TickInput::default(), &mut surface);
        assert_eq!(outcome.control, LoopControl::Continue);
        assert!(outcome.events.contains(&GameEvent::ReviewStarted { word_index: 0 }));
        assert!(outcome.events.contains(&GameEvent::Speak {
            text: "你好".to_string(),
            language: Language::Mandarin,
        }));
        // Frozen while reviewing
        assert_eq!(engine.state().distance, 0.0);
    }

    #[test]
    fn test_review_ends_after_review_ms() {
        let mut engine = engine();
        let mut surface = surface();
        let token = engine.start_session(0.0, 1);
        engine.step(token, 1999.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Reviewing);
        engine.step(token, 2000.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.state().distance > 0.0);
    }

    #[test]
    fn test_restart_invalidates_old_loop() {
        let mut engine = engine();
        let mut surface = surface();
        let old = engine.start_session(0.0, 1);
        let new = engine.start_session(0.0, 1);
        assert_ne!(old, new);

        let mut reference = self::engine();
        let single = reference.start_session(0.0, 1);

        // Both loops keep firing; only the current one may advance the run
        let mut now = 0.0;
        for _ in 0..300 {
            now += FRAME;
            let stale = engine.step(old, now, &TickInput::default(), &mut surface);
            assert_eq!(stale.control, LoopControl::Stop);
            assert!(stale.events.is_empty());
            engine.step(new, now, &TickInput::default(), &mut surface);
            reference.step(single, now, &TickInput::default(), &mut surface);
        }
        assert_eq!(engine.state().distance, reference.state().distance);
        assert_eq!(engine.state().score, reference.state().score);
    }

    #[test]
    fn test_stale_review_timer_cannot_leak() {
        let mut engine = engine();
        let mut surface = surface();
        engine.start_session(0.0, 1);
        // Second session starts 1.5s later; the first timer (due at 2000) is gone
        let token = engine.start_session(1500.0, 2);
        engine.step(token, 2100.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Reviewing);
        engine.step(token, 3500.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_completing_word_scores_and_reviews_next() {
        let (mut engine, token, mut surface) = playing_engine();
        engine.state.collectibles.clear();
        engine.state.obstacles.clear();
        let base = engine.state().score;
        glyph_on_player(&mut engine, "好", true);
        glyph_on_player(&mut engine, "你", true);

        // Recap of the finished word first
        let done = 2000.0 + FRAME;
        let outcome = engine.step(token, done, &TickInput::default(), &mut surface);
        assert_eq!(engine.state().score - base, 70);
        assert_eq!(engine.state().words_completed, 1);
        assert_eq!(engine.state().word_index, 0);
        assert_eq!(engine.state().word_status, WordStatus::Completing);
        assert_eq!(engine.phase(), GamePhase::Reviewing);
        assert!(outcome.events.contains(&GameEvent::WordComplete {
            word: "你好".to_string()
        }));
        assert!(outcome.events.contains(&GameEvent::ReviewStarted { word_index: 0 }));
        assert_eq!(engine.hud_snapshot().review.map(|card| card.word), Some("你好".to_string()));
        assert!(engine.scheduler.is_scheduled(Task::EndReview));

        // Then the next word's card
        let outcome = engine.step(token, done + 2000.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Reviewing);
        assert_eq!(engine.state().word_index, 1);
        assert_eq!(engine.state().word_status, WordStatus::Collecting);
        assert!(engine.state().collected_parts.is_empty());
        assert!(outcome.events.contains(&GameEvent::ReviewStarted { word_index: 1 }));
        assert!(outcome.events.contains(&GameEvent::Speak {
            text: "谢谢".to_string(),
            language: Language::Mandarin,
        }));
        assert!(engine.scheduler.is_scheduled(Task::EndReview));

        // And back to play
        engine.step(token, done + 4000.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.state().word_index, 1);
    }

    #[test]
    fn test_restart_resets_speed_ramp() {
        let mut engine = Engine::new(
            Vocabulary::builtin(Language::Korean),
            Tuning::default(),
            Arena::default(),
        )
        .unwrap();
        let mut surface = surface();
        let old = engine.start_session(0.0, 1);
        engine.step(old, 2000.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Playing);

        // Clear the field each frame so nothing can end the run early
        let mut now = 2000.0;
        while now < 45_000.0 && engine.phase() == GamePhase::Playing {
            engine.state.collectibles.clear();
            engine.state.obstacles.clear();
            now += 500.0;
            engine.step(old, now, &TickInput::default(), &mut surface);
        }
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.state().speed_multiplier >= 1.02 - 1e-5);

        let restart = now + 60_000.0;
        let token = engine.start_session(restart, 2);
        engine.step(token, restart + FRAME, &TickInput::default(), &mut surface);
        assert_eq!(engine.state().speed_multiplier, 1.0);
        assert_eq!(engine.state().start_time, restart);

        let stale = engine.step(old, restart + 2.0 * FRAME, &TickInput::default(), &mut surface);
        assert_eq!(stale.control, LoopControl::Stop);

        // Still flat once play resumes
        engine.step(token, restart + 2000.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.state().speed_multiplier, 1.0);
    }

    /// Start points of the dashed lane markings
    fn dash_starts(surface: &RecordingSurface) -> Vec<Vec2> {
        surface
            .calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Line {
                    from, dashed: true, ..
                } => Some(*from),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_markings_hold_still_while_paused() {
        let (mut engine, token, mut surface) = playing_engine();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        engine.step(token, 2100.0, &pause, &mut surface);
        assert_eq!(engine.phase(), GamePhase::Paused);

        surface.reset();
        engine.step(token, 2117.0, &TickInput::default(), &mut surface);
        let first = dash_starts(&surface);
        assert!(!first.is_empty());

        surface.reset();
        engine.step(token, 2153.0, &TickInput::default(), &mut surface);
        assert_eq!(dash_starts(&surface), first);
    }

    #[test]
    fn test_markings_hold_still_while_reviewing() {
        let mut engine = engine();
        let mut surface = surface();
        let token = engine.start_session(0.0, 1);
        engine.step(token, 300.0, &TickInput::default(), &mut surface);
        let first = dash_starts(&surface);

        surface.reset();
        engine.step(token, 1150.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.phase(), GamePhase::Reviewing);
        assert_eq!(dash_starts(&surface), first);
    }

    #[test]
    fn test_five_hits_end_the_run() {
        let (mut engine, token, mut surface) = playing_engine();
        let mut now = 2000.0;
        let mut healths = vec![engine.state().health()];

        for hit in 0..5 {
            engine.state.collectibles.clear();
            engine.state.obstacles.clear();
            if hit < 3 {
                glyph_on_player(&mut engine, "谢", false);
            } else {
                let id = engine.state.next_entity_id();
                let arena = engine.state.arena;
                let mut obstacle = Obstacle::new(id, 1, &arena, 1.0);
                obstacle.pos = engine.state.player.pos;
                engine.state.obstacles.push(obstacle);
            }
            now += FRAME;
            let outcome = engine.step(token, now, &TickInput::default(), &mut surface);
            healths.push(engine.state().health());
            if hit < 4 {
                assert_eq!(outcome.control, LoopControl::Continue);
            } else {
                assert_eq!(outcome.control, LoopControl::Stop);
                assert!(outcome.events.contains(&GameEvent::GameOver));
            }
        }

        assert_eq!(healths, vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert!(engine.hud_snapshot().game_over.is_some());
    }

    #[test]
    fn test_pause_freezes_world() {
        let (mut engine, token, mut surface) = playing_engine();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        engine.step(token, 2100.0, &pause, &mut surface);
        assert_eq!(engine.phase(), GamePhase::Paused);
        let distance = engine.state().distance;

        let outcome = engine.step(token, 2200.0, &TickInput::default(), &mut surface);
        assert_eq!(outcome.control, LoopControl::Continue);
        assert_eq!(engine.state().distance, distance);

        engine.step(token, 2300.0, &pause, &mut surface);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(engine.state().distance > distance);
    }

    #[test]
    fn test_language_switch_mid_run() {
        let (mut engine, _token, _surface) = playing_engine();
        engine.state.word_index = 3;
        engine.state.collected_parts.push("朋".to_string());

        engine.set_vocabulary(Vocabulary::builtin(Language::Korean)).unwrap();
        assert_eq!(engine.state().word_index, 0);
        assert!(engine.state().collected_parts.is_empty());
        assert!(engine.state().collectibles.is_empty());
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.hud_snapshot().target_word, "안녕");
    }

    #[test]
    fn test_return_to_start_stops_loop() {
        let (mut engine, token, mut surface) = playing_engine();
        engine.return_to_start();
        assert_eq!(engine.phase(), GamePhase::Start);
        let outcome = engine.step(token, 3000.0, &TickInput::default(), &mut surface);
        assert_eq!(outcome.control, LoopControl::Stop);
    }

    #[test]
    fn test_arena_follows_surface() {
        let (mut engine, token, mut surface) = playing_engine();
        surface.resize(600.0, 300.0);
        engine.step(token, 2100.0, &TickInput::default(), &mut surface);
        assert_eq!(engine.state().arena, Arena::new(600.0, 300.0));
    }
}
