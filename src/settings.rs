//! Player preferences
//!
//! Read once from the page's configuration toggles at startup; the language
//! toggle can also change mid-session.

use serde::{Deserialize, Serialize};

use crate::error::RunnerResult;
use crate::vocab::Language;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Vocabulary language
    pub language: Language,

    // === Visual Effects ===
    /// Scrolling dashed lane markings
    pub road_markings: bool,
    /// Red flash on the player after a penalty
    pub hurt_flash: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Speech ===
    /// Pronounce each word on its review card
    pub speech: bool,
    /// Speech rate (1.0 = normal)
    pub speech_rate: f32,

    // === Accessibility ===
    /// Reduced motion (no scrolling markings, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::Mandarin,

            road_markings: true,
            hurt_flash: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            speech: true,
            speech_rate: 0.8,

            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> RunnerResult<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        settings.speech_rate = settings.speech_rate.clamp(0.1, 10.0);
        Ok(settings)
    }

    /// Effective road markings (respects reduced_motion)
    pub fn effective_road_markings(&self) -> bool {
        self.road_markings && !self.reduced_motion
    }

    /// Effective hurt flash (respects reduced_motion)
    pub fn effective_hurt_flash(&self) -> bool {
        self.hurt_flash && !self.reduced_motion
    }

    /// Volume after mute and the master/sfx mix
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Element id of the language checkbox (checked = Korean)
    pub const LANGUAGE_TOGGLE_ID: &'static str = "languageToggle";

    /// Read the configuration toggles from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn from_page() -> Self {
        use wasm_bindgen::JsCast;

        let mut settings = Self::default();
        let toggle = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::LANGUAGE_TOGGLE_ID))
            .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok());

        match toggle {
            Some(input) if input.checked() => settings.language = Language::Korean,
            Some(_) => {}
            None => log::warn!(
                "#{} not found, defaulting to Mandarin",
                Self::LANGUAGE_TOGGLE_ID
            ),
        }
        log::info!("Language: {}", settings.language.label());
        settings
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_page() -> Self {
        Self::default()
    }
}
