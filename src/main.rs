//! Word Runner entry point
//!
//! In the browser this wires the page (canvas, buttons, keyboard, touch) to the
//! engine and drives it from `requestAnimationFrame`. Natively it runs a
//! headless demo with a simple autopilot and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, TouchEvent};

    use word_runner::audio::AudioManager;
    use word_runner::hud::{DomHud, Hud};
    use word_runner::input::InputState;
    use word_runner::renderer::{CanvasSurface, SceneOptions};
    use word_runner::sim::{Arena, GamePhase};
    use word_runner::{Engine, Language, LoopControl, LoopToken, Settings, Tuning, Vocabulary};

    const CANVAS_ID: &str = "gameCanvas";

    /// Game instance holding all state
    struct Game {
        engine: Engine,
        input: InputState,
        surface: CanvasSurface,
        hud: DomHud,
        audio: AudioManager,
        settings: Settings,
        /// Pending animation frame, cancelled on restart
        raf_handle: Option<i32>,
    }

    impl Game {
        /// Start a fresh run; the previous loop, if any, dies with its token
        fn start(&mut self) -> LoopToken {
            self.cancel_frame();
            self.input.clear();
            self.audio.resume();
            let seed = js_sys::Date::now() as u64;
            log::info!("Game started with seed: {}", seed);
            self.engine.start_session(now(), seed)
        }

        fn back_to_menu(&mut self) {
            self.cancel_frame();
            self.input.clear();
            self.engine.return_to_start();
            self.hud.present(&self.engine.hud_snapshot());
        }

        fn set_language(&mut self, language: Language) {
            self.settings.language = language;
            log::info!("Language: {}", self.settings.language.label());
            if let Err(e) = self.engine.set_vocabulary(Vocabulary::builtin(language)) {
                log::warn!("Language switch failed: {}", e);
            }
            self.hud.present(&self.engine.hud_snapshot());
        }

        fn cancel_frame(&mut self) {
            if let Some(handle) = self.raf_handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
        }

        /// Run one frame; returns whether to schedule another
        fn frame(&mut self, token: LoopToken, time: f64) -> LoopControl {
            let input = self.input.frame_input(time);
            let outcome = self.engine.step(token, time, &input, &mut self.surface);
            for event in &outcome.events {
                self.audio.handle_event(event);
            }
            self.hud.present(&self.engine.hud_snapshot());
            outcome.control
        }
    }

    /// Timestamp on the same clock as animation-frame callbacks
    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Word Runner starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("#{} not found or not a canvas", CANVAS_ID);
            return;
        };

        let surface = match CanvasSurface::new(canvas.clone()) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        let settings = Settings::from_page();
        let arena = Arena::new(canvas.width() as f32, canvas.height() as f32);
        let vocab = Vocabulary::builtin(settings.language);
        let engine = match Engine::new(vocab, Tuning::default(), arena) {
            Ok(mut engine) => {
                engine.set_scene_options(SceneOptions::from_settings(&settings));
                engine
            }
            Err(e) => {
                log::error!("Failed to create engine: {}", e);
                return;
            }
        };

        let mut hud = DomHud::new(document.clone());
        hud.present(&engine.hud_snapshot());

        let game = Rc::new(RefCell::new(Game {
            engine,
            input: InputState::new(),
            surface,
            hud,
            audio: AudioManager::new(&settings),
            settings,
            raf_handle: None,
        }));

        setup_keyboard(&document, game.clone());
        setup_touch(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_language_toggle(&document, game.clone());
        setup_auto_pause(game);

        log::info!("Word Runner ready");
    }

    fn start_game(game: &Rc<RefCell<Game>>) {
        let token = game.borrow_mut().start();
        request_animation_frame(game.clone(), token);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, token: LoopToken) {
        let Some(window) = web_sys::window() else { return };
        let loop_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(loop_game, token, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().raf_handle = Some(handle),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, token: LoopToken, time: f64) {
        let control = {
            let mut g = game.borrow_mut();
            g.raf_handle = None;
            g.frame(token, time)
        };

        if control == LoopControl::Continue {
            request_animation_frame(game, token);
        }
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                // Held keys auto-repeat; only the first press counts
                if event.repeat() {
                    return;
                }
                if game.borrow_mut().input.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_touch(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    game.borrow_mut().input.touch_start(pos);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    let time = now();
                    if let Some(direction) = game.borrow_mut().input.touch_end(pos, time) {
                        log::debug!("Swipe {:?}", direction);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(web_sys::Event) + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("#{} not found", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "startBtn", move |_| start_game(&game));
        }
        {
            let game = game.clone();
            on_click(document, "restartBtn", move |_| game.borrow_mut().back_to_menu());
        }
        {
            let game = game.clone();
            on_click(document, "pauseBtn", move |_| game.borrow_mut().input.request_pause());
        }
        on_click(document, "menuBtn", move |_| {
            game.borrow_mut().back_to_menu();
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href("index.html");
            }
        });
    }

    fn setup_language_toggle(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(toggle) = document
            .get_element_by_id(Settings::LANGUAGE_TOGGLE_ID)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let input = toggle.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let language = if input.checked() {
                Language::Korean
            } else {
                Language::Mandarin
            };
            game.borrow_mut().set_language(language);
        });
        let _ = toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Window blur (click outside, tab switch)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.input.clear();
            if g.engine.phase() == GamePhase::Playing {
                g.input.request_pause();
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Word Runner (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in the browser");

    let result = headless::DemoOptions::from_args(std::env::args().skip(1)).and_then(headless::run);
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use word_runner::audio::AudioManager;
    use word_runner::input::InputState;
    use word_runner::renderer::{RecordingSurface, SceneOptions};
    use word_runner::sim::{Arena, GameState};
    use word_runner::{Engine, LoopControl, RunnerError, RunnerResult, Settings, Tuning, Vocabulary};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Five simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    /// Optional JSON inputs for the demo run
    #[derive(Debug, Default, PartialEq)]
    pub struct DemoOptions {
        pub tuning: Option<String>,
        pub settings: Option<String>,
        /// Word list in the settings' language
        pub words: Option<String>,
    }

    impl DemoOptions {
        /// Parse `[--tuning FILE] [--settings FILE] [--words FILE]`; a bare
        /// path is taken as the tuning file
        pub fn from_args(args: impl IntoIterator<Item = String>) -> RunnerResult<Self> {
            let mut options = Self::default();
            let mut args = args.into_iter();
            while let Some(arg) = args.next() {
                let slot = match arg.as_str() {
                    "--tuning" => &mut options.tuning,
                    "--settings" => &mut options.settings,
                    "--words" => &mut options.words,
                    _ if !arg.starts_with("--") => {
                        options.tuning = Some(arg.clone());
                        continue;
                    }
                    _ => return Err(RunnerError::tuning(format!("unknown option {}", arg))),
                };
                let value = args
                    .next()
                    .ok_or_else(|| RunnerError::tuning(format!("{} needs a file path", arg)))?;
                *slot = Some(value);
            }
            Ok(options)
        }
    }

    fn read(path: &str) -> RunnerResult<String> {
        std::fs::read_to_string(path).map_err(|e| RunnerError::io(path, e))
    }

    /// Play one run with the autopilot
    pub fn run(options: DemoOptions) -> RunnerResult<()> {
        let tuning = match &options.tuning {
            Some(path) => Tuning::from_json(&read(path)?)?,
            None => Tuning::default(),
        };
        let settings = match &options.settings {
            Some(path) => Settings::from_json(&read(path)?)?,
            None => Settings::default(),
        };
        let vocab = match &options.words {
            Some(path) => Vocabulary::from_json(settings.language, &read(path)?)?,
            None => Vocabulary::builtin(settings.language),
        };

        let audio = AudioManager::new(&settings);
        let arena = Arena::default();
        let mut surface = RecordingSurface::new(arena.width, arena.height);
        let mut engine = Engine::new(vocab, tuning, arena)?;
        engine.set_scene_options(SceneOptions::from_settings(&settings));
        let mut input = InputState::new();

        let token = engine.start_session(0.0, 42);
        let mut now = 0.0;
        for frame in 0..MAX_FRAMES {
            now += FRAME_MS;
            steer(&mut input, engine.state());
            let tick_input = input.frame_input(now);
            surface.reset();
            let outcome = engine.step(token, now, &tick_input, &mut surface);
            for event in &outcome.events {
                audio.handle_event(event);
            }
            if outcome.control == LoopControl::Stop {
                log::info!("Run ended after {} frames", frame + 1);
                break;
            }
        }

        let summary = engine.summary();
        let hud = engine.hud_snapshot();
        log::info!(
            "Score {} | words {} | distance {} | speed {} | health {}",
            summary.score,
            summary.words_completed,
            summary.distance,
            hud.speed_text,
            hud.health_icons()
        );
        Ok(())
    }

    /// Head for the lowest glyph still needed, away from the lowest hazard otherwise
    fn steer(input: &mut InputState, state: &GameState) {
        let player_x = state.player.pos.x + state.player.size / 2.0;
        let goal = state
            .collectibles
            .iter()
            .filter(|c| c.is_target && !c.collected && c.pos.y < state.player.pos.y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|c| c.pos.x + c.size / 2.0);

        input.key_up("ArrowLeft");
        input.key_up("ArrowRight");
        if let Some(goal_x) = goal {
            if goal_x < player_x - 5.0 {
                input.key_down("ArrowLeft");
            } else if goal_x > player_x + 5.0 {
                input.key_down("ArrowRight");
            }
        }
    }

}
