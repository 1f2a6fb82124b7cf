//! Bubble Pop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use bubble_pop::audio::{AudioManager, SoundEffect};
    use bubble_pop::platform::Viewport;
    use bubble_pop::renderer::{RenderState, scene};
    use bubble_pop::sim::{GameEvent, GamePhase, GameState, TickInput, build_level, tick, trajectory_preview};
    use bubble_pop::{HighScores, Progress, Settings};

    use glam::Vec2;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        last_time: f64,
        input: TickInput,
        viewport: Viewport,
        pointer_down: bool,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        last_phase: GamePhase,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            audio.set_muted(settings.muted);

            Self {
                state: GameState::new(seed),
                render_state: None,
                last_time: 0.0,
                input: TickInput::default(),
                viewport: Viewport::new(1.0, 1.0),
                pointer_down: false,
                audio,
                settings,
                highscores: HighScores::load(),
                last_phase: GamePhase::Start,
            }
        }

        fn pointer_to_world(&self, event: &PointerEvent) -> Vec2 {
            self.viewport.screen_to_world(Vec2::new(
                event.offset_x() as f32,
                event.offset_y() as f32,
            ))
        }

        /// Run one simulation step and fan out the resulting events
        fn update(&mut self, dt_ms: f32) {
            let input = self.input;
            tick(&mut self.state, &input, dt_ms);

            // Clear one-shot inputs after processing
            self.input.fire = false;
            self.input.swap = false;
            self.input.confirm = false;
            self.input.new_game = false;

            if self.last_phase == GamePhase::Idle && self.state.phase == GamePhase::Shot {
                self.audio.play(SoundEffect::Launch);
            }
            self.last_phase = self.state.phase;

            for event in self.state.drain_events() {
                match event {
                    GameEvent::Impact => self.audio.play(SoundEffect::Impact),
                    GameEvent::Pop { delay_ms } => {
                        self.audio.play_with_delay(SoundEffect::Pop, delay_ms)
                    }
                    GameEvent::LevelCleared { difficulty, score } => {
                        self.audio.play(SoundEffect::LevelClear);
                        Progress { difficulty, score }.save();
                        // `difficulty` is already the next level
                        self.highscores
                            .add_score(score, difficulty.saturating_sub(1), js_sys::Date::now());
                        self.highscores.save();
                    }
                    GameEvent::LevelFailed { .. } => self.audio.play(SoundEffect::LevelFail),
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let trajectory = if self.state.phase == GamePhase::Idle && self.pointer_down {
                match self.input.aim {
                    Some(aim) if aim.y < bubble_pop::consts::DANGER_LINE_Y => {
                        trajectory_preview(&self.state, aim)
                    }
                    _ => Vec::new(),
                }
            } else {
                Vec::new()
            };

            let vertices = scene(&self.state, &trajectory);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let lang = self.settings.language;

            if let Some(el) = document.get_element_by_id("hud-level") {
                el.set_text_content(Some(&format!(
                    "{}: {}",
                    lang.level_label(),
                    self.state.difficulty
                )));
            }
            if let Some(el) = document.get_element_by_id("hud-score") {
                el.set_text_content(Some(&format!(
                    "{}: {}",
                    lang.score_label(),
                    self.state.score
                )));
            }

            // Overlay message for non-interactive phases
            if let Some(el) = document.get_element_by_id("message") {
                let text = match self.state.phase {
                    GamePhase::Start => lang.tap_to_start(),
                    GamePhase::Win => lang.level_cleared(),
                    GamePhase::Fail => lang.level_failed(),
                    _ => "",
                };
                el.set_text_content(Some(text));
                let _ = el.set_attribute("class", if text.is_empty() { "hidden" } else { "" });
            }

            // Menu with new-game / continue buttons
            if let Some(el) = document.get_element_by_id("menu") {
                let _ = el.set_attribute(
                    "class",
                    if self.state.phase == GamePhase::Menu {
                        ""
                    } else {
                        "hidden"
                    },
                );
            }
            if let Some(btn) = document.get_element_by_id("new-game-btn") {
                btn.set_text_content(Some(lang.new_game()));
            }
            if let Some(btn) = document.get_element_by_id("continue-btn") {
                btn.set_text_content(Some(lang.continue_game()));
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Bubble Pop starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        {
            let mut g = game.borrow_mut();
            g.viewport = Viewport::new(client_w as f32, client_h as f32);

            // Restore saved progress; a returning player gets the menu
            let progress = Progress::load();
            if progress.has_progress() {
                g.state.difficulty = progress.difficulty;
                g.state.score = progress.score;
                g.state.level_start_score = progress.score;
                g.state.phase = GamePhase::Menu;
                log::info!("Resuming at level {}", progress.difficulty);
            }
            build_level(&mut g.state);
            g.last_phase = g.state.phase;
        }

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_menu_buttons(game.clone());
        setup_visibility_handler(game.clone());
        setup_resize_handler(&canvas, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Bubble Pop running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer down - start aiming
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.pointer_down = true;
                g.input.aim = Some(g.pointer_to_world(&event));
                // First gesture also unlocks the audio context
                g.audio.resume();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer move - track aim
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.input.aim = Some(g.pointer_to_world(&event));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up - fire / swap / confirm depending on phase and button
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                g.pointer_down = false;
                let world = g.pointer_to_world(&event);
                g.input.aim = Some(world);

                match g.state.phase {
                    GamePhase::Idle => match event.button() {
                        0 => g.input.fire = true,
                        2 => g.input.swap = true,
                        _ => {}
                    },
                    GamePhase::Start | GamePhase::Win | GamePhase::Fail => {
                        g.input.confirm = true;
                    }
                    _ => {}
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Right-click swaps; keep the browser menu away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: pause and mute toggles
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "Escape" | "p" | "P" => {
                        g.state.paused = !g.state.paused;
                        if g.state.paused {
                            g.audio.suspend();
                        } else {
                            g.audio.resume();
                        }
                        log::info!("Paused: {}", g.state.paused);
                    }
                    "m" | "M" => {
                        g.settings.muted = !g.settings.muted;
                        let muted = g.settings.muted;
                        g.audio.set_muted(muted);
                        g.settings.save();
                        log::info!("Muted: {}", muted);
                    }
                    "l" | "L" => {
                        g.settings.language = g.settings.language.toggle();
                        g.settings.save();
                        log::info!("Language: {:?}", g.settings.language);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("new-game-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.new_game = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("continue-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.confirm = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_visibility_handler(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            let mut g = game.borrow_mut();
            g.state.hidden = hidden;
            if hidden {
                g.audio.suspend();
                log::info!("Tab hidden, simulation frozen");
            } else {
                g.audio.resume();
            }
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let mut g = game.borrow_mut();
            g.viewport = Viewport::new(client_w as f32, client_h as f32);
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize(width, height);
            }
        });
        let _ =
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Delta in milliseconds; the simulation clamps spikes itself
            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt_ms);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bubble_pop::sim::{GamePhase, GameState, TickInput, build_level, tick};

    env_logger::init();
    log::info!("Bubble Pop (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    // Headless smoke run: build a level and shoot straight up a few times
    let mut state = GameState::new(42);
    build_level(&mut state);
    state.phase = GamePhase::Idle;

    for shot in 0..5 {
        let input = TickInput {
            aim: Some(glam::Vec2::new(0.0, 50.0)),
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input, 16.0);
        for _ in 0..500 {
            tick(&mut state, &TickInput::default(), 16.0);
            if state.phase != GamePhase::Shot {
                break;
            }
        }
        log::info!(
            "shot {}: phase {:?}, score {}, entities {}",
            shot + 1,
            state.phase,
            state.score,
            state.entities.len()
        );
        if state.phase != GamePhase::Idle {
            break;
        }
    }

    println!(
        "Final: level {} score {} ({} entities)",
        state.difficulty,
        state.score,
        state.entities.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
