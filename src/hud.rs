//! HUD presentation
//!
//! [`capture`] turns session state into a [`HudSnapshot`], a plain value the
//! page readouts are written from. The snapshot is a pure function of state,
//! so presenting the same state twice writes the same text.

use serde::Serialize;

use crate::sim::{GamePhase, GameState, RunSummary};
use crate::vocab::Vocabulary;

/// Word card shown while reviewing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewCard {
    pub word: String,
    pub meaning: String,
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub health: u8,
    pub max_health: u8,
    pub progress_percent: f32,
    /// "word (meaning)"
    pub current_word: String,
    /// Bare word for the start screen preview
    pub target_word: String,
    pub target_parts: Vec<String>,
    pub speed_text: String,
    pub language: String,
    pub review: Option<ReviewCard>,
    pub game_over: Option<RunSummary>,
}

impl HudSnapshot {
    /// Filled hearts for remaining health, hollow for lost
    pub fn health_icons(&self) -> String {
        let lost = self.max_health.saturating_sub(self.health) as usize;
        "♥".repeat(self.health as usize) + &"♡".repeat(lost)
    }
}

pub fn format_speed(multiplier: f32) -> String {
    format!("{:.2}x", multiplier)
}

pub fn capture(state: &GameState, vocab: &Vocabulary, max_health: u8) -> HudSnapshot {
    let word = vocab.word(state.word_index);
    let progress_percent = if word.parts.is_empty() {
        0.0
    } else {
        state.collected_parts.len() as f32 / word.parts.len() as f32 * 100.0
    };

    let review = (state.phase == GamePhase::Reviewing).then(|| ReviewCard {
        word: word.text.clone(),
        meaning: word.meaning.clone(),
        parts: word.parts.clone(),
    });
    let game_over = (state.phase == GamePhase::GameOver).then(|| state.summary());

    HudSnapshot {
        phase: state.phase,
        score: state.score,
        health: state.health(),
        max_health,
        progress_percent,
        current_word: format!("{} ({})", word.text, word.meaning),
        target_word: word.text.clone(),
        target_parts: word.parts.clone(),
        speed_text: format_speed(state.speed_multiplier),
        language: vocab.language.label().to_string(),
        review,
        game_over,
    }
}

/// Something that displays a snapshot
pub trait Hud {
    fn present(&mut self, snapshot: &HudSnapshot);
}

#[cfg(target_arch = "wasm32")]
pub use dom::DomHud;

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::collections::HashSet;

    use web_sys::{Document, HtmlElement};
    use wasm_bindgen::JsCast;

    use super::{Hud, HudSnapshot};
    use crate::error::RunnerError;
    use crate::sim::GamePhase;

    /// Writes snapshots into the page's readout elements
    pub struct DomHud {
        document: Document,
        last: Option<HudSnapshot>,
        /// Ids already reported missing
        missing: HashSet<&'static str>,
    }

    impl DomHud {
        pub fn new(document: Document) -> Self {
            Self {
                document,
                last: None,
                missing: HashSet::new(),
            }
        }

        fn element(&mut self, id: &'static str) -> Option<HtmlElement> {
            let el = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            if el.is_none() && self.missing.insert(id) {
                log::warn!("{}", RunnerError::missing_element(id));
            }
            el
        }

        fn set_text(&mut self, id: &'static str, text: &str) {
            if let Some(el) = self.element(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_style(&mut self, id: &'static str, property: &str, value: &str) {
            if let Some(el) = self.element(id) {
                let _ = el.style().set_property(property, value);
            }
        }

        fn set_parts(&mut self, id: &'static str, class: &str, parts: &[String]) {
            let Some(container) = self.element(id) else {
                return;
            };
            container.set_inner_html("");
            for part in parts {
                match self.document.create_element("span") {
                    Ok(span) => {
                        span.set_class_name(class);
                        span.set_text_content(Some(part));
                        let _ = container.append_child(&span);
                    }
                    Err(e) => log::warn!("Failed to create span: {:?}", e),
                }
            }
        }
    }

    impl Hud for DomHud {
        fn present(&mut self, snapshot: &HudSnapshot) {
            if self.last.as_ref() == Some(snapshot) {
                return;
            }

            let (start, game, over) = match snapshot.phase {
                GamePhase::Start => ("flex", "none", "none"),
                GamePhase::GameOver => ("none", "none", "flex"),
                _ => ("none", "block", "none"),
            };
            self.set_style("startScreen", "display", start);
            self.set_style("gameScreen", "display", game);
            self.set_style("gameOverScreen", "display", over);

            self.set_text("toggleLabel", &snapshot.language);
            self.set_text("score", &snapshot.score.to_string());
            self.set_text("health", &snapshot.health_icons());
            self.set_style("progressFill", "width", &format!("{}%", snapshot.progress_percent));
            self.set_text("currentWord", &snapshot.current_word);
            self.set_text("speedValue", &snapshot.speed_text);

            if snapshot.phase == GamePhase::Start {
                self.set_text("targetWord", &snapshot.target_word);
                self.set_parts("wordPartsPreview", "word-part", &snapshot.target_parts);
            }

            match &snapshot.review {
                Some(card) => {
                    self.set_text("reviewWordLarge", &card.word);
                    self.set_text("reviewMeaningLarge", &card.meaning);
                    self.set_parts("reviewPartsLarge", "review-part-large", &card.parts);
                    self.set_style("targetWordReview", "display", "block");
                }
                None => self.set_style("targetWordReview", "display", "none"),
            }

            if let Some(summary) = &snapshot.game_over {
                self.set_text("finalScore", &summary.score.to_string());
                self.set_text("wordsCompleted", &summary.words_completed.to_string());
                self.set_text("distance", &summary.distance.to_string());
            }

            self.last = Some(snapshot.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Arena;
    use crate::vocab::{Language, Vocabulary};

    fn setup() -> (GameState, Vocabulary) {
        (
            GameState::new(1, Arena::default(), 5, 0.0),
            Vocabulary::builtin(Language::Mandarin),
        )
    }

    #[test]
    fn test_capture_is_idempotent() {
        let (state, vocab) = setup();
        assert_eq!(capture(&state, &vocab, 5), capture(&state, &vocab, 5));
    }

    #[test]
    fn test_readouts() {
        let (mut state, vocab) = setup();
        state.phase = GamePhase::Playing;
        state.collected_parts.push("你".to_string());
        state.speed_multiplier = 1.03;
        state.player.health = 3;

        let hud = capture(&state, &vocab, 5);
        assert_eq!(hud.current_word, "你好 (Hello)");
        assert_eq!(hud.progress_percent, 50.0);
        assert_eq!(hud.speed_text, "1.03x");
        assert_eq!(hud.health_icons(), "♥♥♥♡♡");
        assert!(hud.review.is_none());
        assert!(hud.game_over.is_none());
    }

    #[test]
    fn test_review_and_game_over() {
        let (mut state, vocab) = setup();
        state.phase = GamePhase::Reviewing;
        let card = capture(&state, &vocab, 5).review.unwrap();
        assert_eq!(card.parts, vec!["你", "好"]);

        state.phase = GamePhase::GameOver;
        state.score = 42;
        state.distance = 12.7;
        let summary = capture(&state, &vocab, 5).game_over.unwrap();
        assert_eq!(summary.score, 42);
        assert_eq!(summary.distance, 12);
    }

    struct CountingHud {
        frames: Vec<HudSnapshot>,
    }

    impl Hud for CountingHud {
        fn present(&mut self, snapshot: &HudSnapshot) {
            if self.frames.last() != Some(snapshot) {
                self.frames.push(snapshot.clone());
            }
        }
    }

    #[test]
    fn test_unchanged_state_presents_once() {
        let (state, vocab) = setup();
        let mut hud = CountingHud { frames: Vec::new() };
        hud.present(&capture(&state, &vocab, 5));
        hud.present(&capture(&state, &vocab, 5));
        assert_eq!(hud.frames.len(), 1);
    }
}
