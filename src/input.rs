//! Keyboard and touch input
//!
//! Raw browser events are folded into an [`InputState`]; once per frame the
//! engine asks it for a [`TickInput`]. A horizontal swipe acts like tapping a
//! direction key for a short moment.

use glam::Vec2;

use crate::consts::{SWIPE_PRESS_MS, SWIPE_THRESHOLD_PX};
use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Steer(Direction),
    Pause,
}

/// Map a `KeyboardEvent.key` value to an action
pub fn key_action(key: &str) -> Option<KeyAction> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(KeyAction::Steer(Direction::Left)),
        "ArrowRight" | "d" | "D" => Some(KeyAction::Steer(Direction::Right)),
        "Escape" | "p" | "P" => Some(KeyAction::Pause),
        _ => None,
    }
}

/// Held keys, pending toggles and any transient swipe press
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left_held: bool,
    right_held: bool,
    pause_requested: bool,
    /// Swipe direction and the timestamp its press ends
    swipe: Option<(Direction, f64)>,
    touch_start: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is one the game uses
    pub fn key_down(&mut self, key: &str) -> bool {
        match key_action(key) {
            Some(KeyAction::Steer(Direction::Left)) => self.left_held = true,
            Some(KeyAction::Steer(Direction::Right)) => self.right_held = true,
            Some(KeyAction::Pause) => self.pause_requested = !self.pause_requested,
            None => return false,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match key_action(key) {
            Some(KeyAction::Steer(Direction::Left)) => self.left_held = false,
            Some(KeyAction::Steer(Direction::Right)) => self.right_held = false,
            Some(KeyAction::Pause) => {}
            None => return false,
        }
        true
    }

    /// Toggle pause from a button rather than a key
    pub fn request_pause(&mut self) {
        self.pause_requested = !self.pause_requested;
    }

    pub fn touch_start(&mut self, pos: Vec2) {
        self.touch_start = Some(pos);
    }

    /// Finish a gesture; a mostly-horizontal swipe past the threshold presses
    /// that direction for a short time
    pub fn touch_end(&mut self, pos: Vec2, now: f64) -> Option<Direction> {
        let start = self.touch_start.take()?;
        let delta = pos - start;
        if delta.x.abs() <= delta.y.abs() {
            return None;
        }
        let direction = if delta.x > SWIPE_THRESHOLD_PX {
            Direction::Right
        } else if delta.x < -SWIPE_THRESHOLD_PX {
            Direction::Left
        } else {
            return None;
        };
        self.swipe = Some((direction, now + SWIPE_PRESS_MS));
        Some(direction)
    }

    /// Input for the frame at `now`. Consumes a pending pause toggle.
    pub fn frame_input(&mut self, now: f64) -> TickInput {
        let swipe = match self.swipe {
            Some((direction, until)) if now < until => Some(direction),
            Some(_) => {
                self.swipe = None;
                None
            }
            None => None,
        };
        TickInput {
            left: self.left_held || swipe == Some(Direction::Left),
            right: self.right_held || swipe == Some(Direction::Right),
            pause: std::mem::take(&mut self.pause_requested),
        }
    }

    /// Forget everything, e.g. on restart or when the window loses focus
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_action("ArrowLeft"), Some(KeyAction::Steer(Direction::Left)));
        assert_eq!(key_action("D"), Some(KeyAction::Steer(Direction::Right)));
        assert_eq!(key_action("Escape"), Some(KeyAction::Pause));
        assert_eq!(key_action("q"), None);
    }

    #[test]
    fn test_held_keys() {
        let mut input = InputState::new();
        assert!(input.key_down("a"));
        let frame = input.frame_input(0.0);
        assert!(frame.left && !frame.right);
        // still held next frame
        assert!(input.frame_input(16.0).left);
        input.key_up("a");
        assert!(!input.frame_input(32.0).left);
        assert!(!input.key_down("x"));
    }

    #[test]
    fn test_pause_consumed_once() {
        let mut input = InputState::new();
        input.key_down("Escape");
        assert!(input.frame_input(0.0).pause);
        assert!(!input.frame_input(16.0).pause);
    }

    #[test]
    fn test_double_pause_cancels() {
        let mut input = InputState::new();
        input.key_down("p");
        input.request_pause();
        assert!(!input.frame_input(0.0).pause);
    }

    #[test]
    fn test_swipe_right_is_transient() {
        let mut input = InputState::new();
        input.touch_start(Vec2::new(100.0, 100.0));
        assert_eq!(input.touch_end(Vec2::new(150.0, 110.0), 1000.0), Some(Direction::Right));
        assert!(input.frame_input(1050.0).right);
        assert!(!input.frame_input(1100.0).right);
    }

    #[test]
    fn test_short_or_vertical_swipe_ignored() {
        let mut input = InputState::new();
        input.touch_start(Vec2::new(100.0, 100.0));
        assert_eq!(input.touch_end(Vec2::new(120.0, 100.0), 0.0), None);

        input.touch_start(Vec2::new(100.0, 100.0));
        assert_eq!(input.touch_end(Vec2::new(60.0, 200.0), 0.0), None);

        input.touch_start(Vec2::new(100.0, 100.0));
        assert_eq!(input.touch_end(Vec2::new(60.0, 95.0), 0.0), Some(Direction::Left));
        assert!(input.frame_input(10.0).left);
    }

    #[test]
    fn test_touch_end_without_start() {
        let mut input = InputState::new();
        assert_eq!(input.touch_end(Vec2::new(300.0, 0.0), 0.0), None);
    }
}
