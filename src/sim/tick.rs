//! Fixed-step simulation tick
//!
//! Advances the run by one display frame. Positions move a constant amount
//! per frame; only the speed multiplier depends on wall-clock time.

use super::progress::{advance_distance, speed_multiplier};
use super::spawn::{cleanup, spawn_collectibles, spawn_obstacle};
use super::state::{Body, GameEvent, GamePhase, GameState, WordStatus};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::vocab::Vocabulary;

/// Longest frame credited to the road scroll, so a stalled tab doesn't jump
const MAX_FRAME_MS: f64 = 100.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steer left (held)
    pub left: bool,
    /// Steer right (held)
    pub right: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one frame
pub fn tick(
    state: &mut GameState,
    vocab: &Vocabulary,
    tuning: &Tuning,
    input: &TickInput,
    now: f64,
) {
    let frame_ms = (now - state.last_frame_at).clamp(0.0, MAX_FRAME_MS);
    state.last_frame_at = now;

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.set_phase(GamePhase::Paused);
                return;
            }
            GamePhase::Paused => state.set_phase(GamePhase::Playing),
            _ => {}
        }
    }

    // Frozen in every other phase
    if state.phase != GamePhase::Playing {
        return;
    }
    state.road_scroll_ms += frame_ms;

    state.player.steer(input.left, input.right, &state.arena);
    for obstacle in &mut state.obstacles {
        obstacle.advance();
    }
    for collectible in &mut state.collectibles {
        collectible.advance();
    }

    spawn_obstacle(state, tuning);
    cleanup(state, now, tuning);
    spawn_collectibles(state, vocab, tuning);

    check_collisions(state, vocab, tuning, now);
    if state.phase == GamePhase::GameOver {
        return;
    }

    if state.word_status == WordStatus::Completing {
        advance_when_cleared(state, vocab);
    }

    let step = advance_distance(
        state.distance,
        state.last_distance_mark,
        state.speed_multiplier,
        tuning.distance_bonus,
    );
    state.distance = step.distance;
    state.last_distance_mark = step.last_mark;
    state.score += step.points;

    state.speed_multiplier = speed_multiplier(now - state.start_time);
    let speed = state.speed_multiplier;
    for obstacle in &mut state.obstacles {
        obstacle.speed = speed;
    }
    for collectible in &mut state.collectibles {
        collectible.speed = speed;
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Resolve player contacts with collectibles, then obstacles
fn check_collisions(state: &mut GameState, vocab: &Vocabulary, tuning: &Tuning, now: f64) {
    let player = state.player.bounds();
    let word = vocab.word(state.word_index);

    for i in 0..state.collectibles.len() {
        let collectible = &state.collectibles[i];
        if collectible.collected || !player.overlaps(&collectible.bounds()) {
            continue;
        }
        let glyph = collectible.glyph.clone();
        let is_target = collectible.is_target && word.contains(&glyph);
        state.collectibles[i].collected = true;

        if is_target {
            // A surplus copy of an already-satisfied glyph is absorbed silently
            if state.word_status == WordStatus::Collecting
                && word.still_needs(&glyph, &state.collected_parts)
            {
                state.collected_parts.push(glyph.clone());
                state.score += TARGET_POINTS;
                state.push_event(GameEvent::Correct { glyph });

                if word.is_complete(&state.collected_parts) {
                    state.score += WORD_POINTS;
                    state.words_completed += 1;
                    state.word_status = WordStatus::Completing;
                    log::info!("Word complete: {} ({} total)", word.text, state.words_completed);
                    state.push_event(GameEvent::WordComplete {
                        word: word.text.clone(),
                    });
                }
            }
        } else {
            penalize(state, now, tuning);
            if state.phase == GamePhase::GameOver {
                return;
            }
        }
    }

    for i in 0..state.obstacles.len() {
        let obstacle = &state.obstacles[i];
        if obstacle.is_hit() || !player.overlaps(&obstacle.bounds()) {
            continue;
        }
        // Marked so the same obstacle can't hit again during its grace delay
        state.obstacles[i].hit_at = Some(now);
        penalize(state, now, tuning);
        if state.phase == GamePhase::GameOver {
            return;
        }
    }
}

/// One health point lost; ends the run at zero
fn penalize(state: &mut GameState, now: f64, tuning: &Tuning) {
    state.player.take_hit(now, tuning.hurt_ms);
    state.push_event(GameEvent::Wrong);

    if state.player.is_dead() {
        state.set_phase(GamePhase::GameOver);
        state.push_event(GameEvent::GameOver);
        let summary = state.summary();
        log::info!(
            "Game over: score {}, words {}, distance {}",
            summary.score,
            summary.words_completed,
            summary.distance
        );
    }
}

/// Recap the finished word once no collectible is left on screen
///
/// The word stays `Completing` through the recap; [`end_review`] moves on.
fn advance_when_cleared(state: &mut GameState, vocab: &Vocabulary) {
    let arena = state.arena;
    if state.collectibles.iter().any(|c| c.is_visible(&arena)) {
        return;
    }
    begin_review(state, vocab);
}

/// Close the review card
///
/// A recap of a finished word is followed by the next word's card. Any other
/// card resumes play.
pub fn end_review(state: &mut GameState, vocab: &Vocabulary) {
    if state.phase != GamePhase::Reviewing {
        return;
    }
    if state.word_status == WordStatus::Completing {
        let next = vocab.next_index(state.word_index);
        load_word(state, vocab, next);
        begin_review(state, vocab);
    } else {
        state.set_phase(GamePhase::Playing);
    }
}

/// Make `index` the current word and forget progress on the previous one
///
/// Collectibles still queued above the screen belong to the old word and are
/// dropped with it.
pub fn load_word(state: &mut GameState, vocab: &Vocabulary, index: usize) {
    state.word_index = index % vocab.len();
    state.collected_parts.clear();
    state.word_status = WordStatus::Collecting;
    state.collectibles.clear();
    log::info!("Loaded word {}: {}", state.word_index, vocab.word(state.word_index).text);
}

/// Freeze the world and show the current word's review card
pub fn begin_review(state: &mut GameState, vocab: &Vocabulary) {
    let word = vocab.word(state.word_index);
    state.set_phase(GamePhase::Reviewing);
    state.push_event(GameEvent::ReviewStarted {
        word_index: state.word_index,
    });
    state.push_event(GameEvent::Speak {
        text: word.text.clone(),
        language: vocab.language,
    });
}
