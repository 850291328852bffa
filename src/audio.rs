//! Audio feedback: procedural sound cues and word pronunciation
//!
//! Sound effects are synthesized with the Web Audio API, words are spoken
//! through the browser's speech synthesis. Natively both are no-ops, so the
//! engine can emit feedback without caring where it runs.

use crate::sim::GameEvent;
use crate::vocab::Language;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Needed glyph collected
    Correct,
    /// Distractor or obstacle hit
    Wrong,
    /// Word finished
    WordComplete,
    /// Run over
    GameOver,
}

/// What the feedback channel should do for one event
#[derive(Debug, Clone, PartialEq)]
pub enum Cue<'a> {
    Sound(SoundEffect),
    Speak { text: &'a str, language: Language },
}

/// Map a simulation event to its feedback, if any
pub fn cue_for(event: &GameEvent) -> Option<Cue<'_>> {
    match event {
        GameEvent::Correct { .. } => Some(Cue::Sound(SoundEffect::Correct)),
        GameEvent::Wrong => Some(Cue::Sound(SoundEffect::Wrong)),
        GameEvent::WordComplete { .. } => Some(Cue::Sound(SoundEffect::WordComplete)),
        GameEvent::GameOver => Some(Cue::Sound(SoundEffect::GameOver)),
        GameEvent::Speak { text, language } => Some(Cue::Speak {
            text,
            language: *language,
        }),
        GameEvent::ReviewStarted { .. } => None,
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(not(target_arch = "wasm32"))]
pub use headless::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioContext, GainNode, OscillatorNode, OscillatorType, SpeechSynthesis,
        SpeechSynthesisUtterance,
    };

    use super::{Cue, SoundEffect, cue_for};
    use crate::settings::Settings;
    use crate::sim::GameEvent;
    use crate::vocab::Language;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        speech: Option<SpeechSynthesis>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
        speech_enabled: bool,
        speech_rate: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new(&Settings::default())
        }
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            let speech = web_sys::window().and_then(|w| w.speech_synthesis().ok());
            if speech.is_none() {
                log::warn!("Speech synthesis unavailable - pronunciation disabled");
            }
            let mut manager = Self {
                ctx,
                speech,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
                speech_enabled: true,
                speech_rate: 0.8,
            };
            manager.apply_settings(settings);
            manager
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume.clamp(0.0, 1.0);
            self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
            self.muted = settings.muted;
            self.speech_enabled = settings.speech;
            self.speech_rate = settings.speech_rate;
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play whatever feedback an event calls for
        pub fn handle_event(&self, event: &GameEvent) {
            match cue_for(event) {
                Some(Cue::Sound(effect)) => self.play(effect),
                Some(Cue::Speak { text, language }) => self.speak(text, language),
                None => {}
            }
        }

        /// Pronounce a word, cutting off anything still being spoken
        pub fn speak(&self, text: &str, language: Language) {
            if !self.speech_enabled || self.muted {
                return;
            }
            let Some(synth) = &self.speech else { return };
            let Ok(utterance) = SpeechSynthesisUtterance::new_with_text(text) else {
                log::warn!("Failed to create utterance for {}", text);
                return;
            };
            utterance.set_lang(language.speech_tag());
            utterance.set_rate(self.speech_rate);
            utterance.set_volume(self.master_volume);
            synth.cancel();
            synth.speak(&utterance);
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Correct => self.play_correct(ctx, vol),
                SoundEffect::Wrong => self.play_wrong(ctx, vol),
                SoundEffect::WordComplete => self.play_word_complete(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Rising two-note chime
        fn play_correct(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [660.0, 880.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.15).ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }

        /// Low buzz
        fn play_wrong(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.25).ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(90.0, t + 0.25).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        /// Short fanfare
        fn play_word_complete(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 500.0, 600.0, 800.0].iter().enumerate() {
                let delay = i as f64 * 0.1;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.4).ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.5).ok();
                }
            }
        }

        /// Sad descending
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                let delay = i as f64 * 0.2;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.3).ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use super::{Cue, cue_for};
    use crate::settings::Settings;
    use crate::sim::GameEvent;

    /// Native stand-in that only logs cues
    #[derive(Debug, Default)]
    pub struct AudioManager {
        muted: bool,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            Self {
                muted: settings.effective_volume() <= 0.0,
            }
        }

        pub fn handle_event(&self, event: &GameEvent) {
            if self.muted {
                return;
            }
            match cue_for(event) {
                Some(Cue::Sound(effect)) => log::debug!("sfx {:?}", effect),
                Some(Cue::Speak { text, language }) => {
                    log::debug!("speak {} ({})", text, language.speech_tag())
                }
                None => {}
            }
        }
    }
}
