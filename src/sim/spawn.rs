//! Obstacle and collectible spawning
//!
//! Placement is rejection sampling with a fixed attempt budget from
//! [`Tuning`], followed by a deterministic fallback so spawning always
//! terminates.

use glam::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::collision::{Rect, overlaps_any};
use super::state::{Body, Collectible, GameState, Obstacle, WordStatus};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::vocab::Vocabulary;

/// Roll for a new obstacle this frame
pub fn spawn_obstacle(state: &mut GameState, tuning: &Tuning) {
    if state.rng.random::<f32>() >= tuning.obstacle_spawn_chance {
        return;
    }
    if state.obstacles.len() >= tuning.max_obstacles {
        return;
    }

    let lane = pick_obstacle_lane(state, tuning);
    let id = state.next_entity_id();
    let obstacle = Obstacle::new(id, lane, &state.arena, state.speed_multiplier);
    state.obstacles.push(obstacle);
}

/// Random lane that keeps clear of live targets, or any lane once the budget runs out
fn pick_obstacle_lane(state: &mut GameState, tuning: &Tuning) -> u32 {
    for _ in 0..tuning.obstacle_placement_attempts {
        let lane = state.rng.random_range(0..LANE_COUNT);
        let band = tuning.target_clearance;
        if !lane_blocked_by_target(&state.collectibles, lane, OBSTACLE_SPAWN_Y, band) {
            return lane;
        }
    }
    log::debug!("Obstacle placement budget exhausted, placing unconditionally");
    state.rng.random_range(0..LANE_COUNT)
}

/// A live target collectible sits in `lane` within `band` pixels of `y`
pub fn lane_blocked_by_target(collectibles: &[Collectible], lane: u32, y: f32, band: f32) -> bool {
    collectibles
        .iter()
        .any(|c| c.is_target && !c.collected && c.lane == lane && (c.pos.y - y).abs() < band)
}

/// Refill the field once no active collectible remains
///
/// Spawns one collectible per glyph still missing from the current word
/// (duplicates included) plus up to `max_distractors` glyphs from other words,
/// shuffled and staggered vertically so they enter one at a time.
pub fn spawn_collectibles(state: &mut GameState, vocab: &Vocabulary, tuning: &Tuning) {
    if state.word_status != WordStatus::Collecting {
        return;
    }
    let arena = state.arena;
    if state.collectibles.iter().any(|c| c.is_active(&arena)) {
        return;
    }

    let word = vocab.word(state.word_index);
    let mut batch: Vec<(&str, bool)> = word
        .missing_parts(&state.collected_parts)
        .into_iter()
        .map(|glyph| (glyph, true))
        .collect();
    if batch.is_empty() {
        return;
    }

    let pool = vocab.distractor_pool(state.word_index);
    let count = state.rng.random_range(0..=tuning.max_distractors).min(pool.len());
    batch.extend(pool.choose_multiple(&mut state.rng, count).map(|glyph| (*glyph, false)));
    batch.shuffle(&mut state.rng);

    log::debug!(
        "Spawning {} collectibles for {} ({} distractors)",
        batch.len(),
        word.text,
        count
    );

    for (index, (glyph, is_target)) in batch.into_iter().enumerate() {
        let y = COLLECTIBLE_SPAWN_Y - index as f32 * COLLECTIBLE_STAGGER;
        let lane = place_collectible(state, y, tuning);
        let id = state.next_entity_id();
        let speed = state.speed_multiplier;
        let collectible = Collectible::new(id, lane, y, glyph, is_target, &arena, speed);
        state.collectibles.push(collectible);
    }
}

/// Pick a lane for a collectible at height `y`
///
/// Random picks first, then a left-to-right scan, then any lane.
fn place_collectible(state: &mut GameState, y: f32, tuning: &Tuning) -> u32 {
    let arena = state.arena;
    let occupied: Vec<Rect> = state
        .obstacles
        .iter()
        .map(Body::bounds)
        .chain(state.collectibles.iter().filter(|c| !c.collected).map(Body::bounds))
        .collect();
    let fits = |lane: u32| {
        let origin = Vec2::new(arena.lane_x(lane, COLLECTIBLE_SIZE), y);
        let candidate = Rect::square(origin, COLLECTIBLE_SIZE);
        !overlaps_any(&candidate, &occupied)
    };

    for _ in 0..tuning.collectible_placement_attempts {
        let lane = state.rng.random_range(0..LANE_COUNT);
        if fits(lane) {
            return lane;
        }
    }
    if let Some(lane) = (0..LANE_COUNT).find(|&lane| fits(lane)) {
        return lane;
    }
    log::debug!("No free lane at y={y}, placing unconditionally");
    state.rng.random_range(0..LANE_COUNT)
}

/// Drop entities that have left the play area, collected collectibles, and
/// hit obstacles whose grace delay is over
pub fn cleanup(state: &mut GameState, now: f64, tuning: &Tuning) {
    let arena = state.arena;
    state.obstacles.retain(|o| {
        if o.is_hit() {
            !o.grace_expired(now, tuning.hit_grace_ms)
        } else {
            !arena.is_off_screen(&o.bounds(), o.speed)
        }
    });
    state
        .collectibles
        .retain(|c| !c.collected && !arena.is_off_screen(&c.bounds(), c.speed));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Arena;
    use crate::vocab::{Language, Word};

    fn quiet_tuning() -> Tuning {
        Tuning {
            obstacle_spawn_chance: 0.0,
            ..Default::default()
        }
    }

    fn playing_state(seed: u64) -> GameState {
        GameState::new(seed, Arena::default(), 5, 0.0)
    }

    fn single_glyph_vocab() -> Vocabulary {
        Vocabulary {
            language: Language::Mandarin,
            words: vec![Word::new("火", &["火"], "Fire"), Word::new("山", &["山"], "Mountain")],
        }
    }

    #[test]
    fn test_spawns_needed_glyphs_with_multiplicity() {
        let vocab = Vocabulary::builtin(Language::Mandarin);
        for seed in 0..20 {
            let mut state = playing_state(seed);
            state.word_index = 1; // 谢谢
            spawn_collectibles(&mut state, &vocab, &quiet_tuning());

            let targets: Vec<_> = state.collectibles.iter().filter(|c| c.is_target).collect();
            assert_eq!(targets.len(), 2);
            assert!(targets.iter().all(|c| c.glyph == "谢"));

            let distractors: Vec<_> = state.collectibles.iter().filter(|c| !c.is_target).collect();
            assert!(distractors.len() <= 2);
            assert!(distractors.iter().all(|c| c.glyph != "谢"));
        }
    }

    #[test]
    fn test_spawns_only_missing_copy() {
        let vocab = Vocabulary::builtin(Language::Mandarin);
        let mut state = playing_state(7);
        state.word_index = 1;
        state.collected_parts = vec!["谢".to_string()];
        spawn_collectibles(&mut state, &vocab, &Tuning { max_distractors: 0, ..quiet_tuning() });
        assert_eq!(state.collectibles.len(), 1);
        assert_eq!(state.collectibles[0].glyph, "谢");
    }

    #[test]
    fn test_staggered_entry() {
        let vocab = Vocabulary::builtin(Language::Korean);
        let mut state = playing_state(3);
        state.word_index = 6; // 선생님
        spawn_collectibles(&mut state, &vocab, &quiet_tuning());
        let mut ys: Vec<f32> = state.collectibles.iter().map(|c| c.pos.y).collect();
        ys.sort_by(|a, b| b.partial_cmp(a).unwrap());
        for (i, y) in ys.iter().enumerate() {
            assert_eq!(*y, COLLECTIBLE_SPAWN_Y - i as f32 * COLLECTIBLE_STAGGER);
        }
    }

    #[test]
    fn test_no_refill_while_active() {
        let vocab = Vocabulary::builtin(Language::Mandarin);
        let mut state = playing_state(1);
        spawn_collectibles(&mut state, &vocab, &quiet_tuning());
        let count = state.collectibles.len();
        spawn_collectibles(&mut state, &vocab, &quiet_tuning());
        assert_eq!(state.collectibles.len(), count);
    }

    #[test]
    fn test_no_refill_while_completing() {
        let vocab = Vocabulary::builtin(Language::Mandarin);
        let mut state = playing_state(1);
        state.word_status = WordStatus::Completing;
        spawn_collectibles(&mut state, &vocab, &quiet_tuning());
        assert!(state.collectibles.is_empty());
    }

    #[test]
    fn test_placement_avoids_obstacles() {
        let vocab = single_glyph_vocab();
        let tuning = Tuning {
            max_distractors: 0,
            ..quiet_tuning()
        };
        for seed in 0..20 {
            let mut state = playing_state(seed);
            for lane in 0..2 {
                let id = state.next_entity_id();
                let mut obstacle = Obstacle::new(id, lane, &state.arena, 1.0);
                obstacle.pos.y = COLLECTIBLE_SPAWN_Y;
                state.obstacles.push(obstacle);
            }
            spawn_collectibles(&mut state, &vocab, &tuning);
            assert_eq!(state.collectibles.len(), 1);
            assert_eq!(state.collectibles[0].lane, 2);
        }
    }

    #[test]
    fn test_placement_falls_back_when_blocked() {
        let vocab = single_glyph_vocab();
        let tuning = Tuning {
            max_distractors: 0,
            ..quiet_tuning()
        };
        let mut state = playing_state(9);
        for lane in 0..LANE_COUNT {
            let id = state.next_entity_id();
            let mut obstacle = Obstacle::new(id, lane, &state.arena, 1.0);
            obstacle.pos.y = COLLECTIBLE_SPAWN_Y;
            state.obstacles.push(obstacle);
        }
        spawn_collectibles(&mut state, &vocab, &tuning);
        assert_eq!(state.collectibles.len(), 1);
    }

    #[test]
    fn test_obstacle_cap() {
        let tuning = Tuning {
            obstacle_spawn_chance: 1.0,
            ..Default::default()
        };
        let mut state = playing_state(5);
        for _ in 0..10 {
            spawn_obstacle(&mut state, &tuning);
        }
        assert_eq!(state.obstacles.len(), tuning.max_obstacles);
    }

    #[test]
    fn test_zero_chance_never_spawns() {
        let mut state = playing_state(5);
        for _ in 0..1000 {
            spawn_obstacle(&mut state, &quiet_tuning());
        }
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_lane_blocked_by_target() {
        let arena = Arena::default();
        let mut target = Collectible::new(1, 1, -100.0, "你", true, &arena, 1.0);
        let distractor = Collectible::new(2, 0, -100.0, "见", false, &arena, 1.0);
        let list = vec![target.clone(), distractor];

        assert!(lane_blocked_by_target(&list, 1, OBSTACLE_SPAWN_Y, 150.0));
        // distractors never block
        assert!(!lane_blocked_by_target(&list, 0, OBSTACLE_SPAWN_Y, 150.0));
        // far outside the band
        assert!(!lane_blocked_by_target(&list, 1, 400.0, 150.0));

        target.collected = true;
        assert!(!lane_blocked_by_target(&[target], 1, OBSTACLE_SPAWN_Y, 150.0));
    }

    #[test]
    fn test_obstacles_avoid_target_lane_when_possible() {
        let tuning = Tuning {
            obstacle_spawn_chance: 1.0,
            obstacle_placement_attempts: 50,
            ..Default::default()
        };
        for seed in 0..20 {
            let mut state = playing_state(seed);
            let arena = state.arena;
            state.collectibles.push(Collectible::new(100, 0, -80.0, "你", true, &arena, 1.0));
            state.collectibles.push(Collectible::new(101, 1, -80.0, "好", true, &arena, 1.0));
            spawn_obstacle(&mut state, &tuning);
            assert_eq!(state.obstacles[0].lane, 2);
        }
    }

    #[test]
    fn test_cleanup() {
        let tuning = Tuning::default();
        let mut state = playing_state(1);
        let arena = state.arena;

        let mut gone = Obstacle::new(1, 0, &arena, 1.0);
        gone.pos.y = arena.height + 60.0;
        let mut hit = Obstacle::new(2, 1, &arena, 1.0);
        hit.pos.y = 300.0;
        hit.hit_at = Some(1000.0);
        let live = Obstacle::new(3, 2, &arena, 1.0);
        state.obstacles = vec![gone, hit, live];

        let mut collected = Collectible::new(4, 0, 100.0, "你", true, &arena, 1.0);
        collected.collected = true;
        let waiting = Collectible::new(5, 1, -480.0, "好", true, &arena, 1.0);
        state.collectibles = vec![collected, waiting];

        cleanup(&mut state, 1100.0, &tuning);
        let ids: Vec<u32> = state.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(state.collectibles.len(), 1);
        assert_eq!(state.collectibles[0].id, 5);

        cleanup(&mut state, 1300.0, &tuning);
        let ids: Vec<u32> = state.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3]);
    }
}
