//! Native host for the landing-page scene.
//!
//! Opens a window, renders the starfield and service carousel through the
//! GPU surface, and routes window events to the components:
//!
//! ```ignore
//! use starscape::prelude::*;
//!
//! Scene::new()
//!     .with_items(["Networks", "Cloud", "Support"])
//!     .with_seed(7)
//!     .run()?;
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use glam::{Vec2, Vec3};
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::carousel::{CardLayout, Carousel, TransitionState};
use crate::config::SceneConfig;
use crate::deck::{Deck, Playback};
use crate::error::SceneError;
use crate::gpu::GpuSurface;
use crate::input::{Gesture, GesturePhase, Input, KeyCode};
use crate::locale::LocaleStore;
use crate::random::{EntropyRandom, RandomSource, SeededRandom};
use crate::starfield::{FrameInput, Starfield, StarfieldAnimator};
use crate::surface::{ColorStop, DrawingSurface};
use crate::time::{FrameClock, Time};

const CARD_START: Vec3 = Vec3::new(0.22, 0.30, 0.75);
const CARD_END: Vec3 = Vec3::new(0.52, 0.26, 0.78);
const ACTIVE_ALPHA: f32 = 0.85;
const INACTIVE_ALPHA: f32 = 0.3;
const DECK_COLOR: Vec3 = Vec3::new(0.95, 0.55, 0.25);

/// Services shown when no items are supplied.
pub fn default_services() -> Vec<String> {
    [
        "Managed Networks",
        "Cloud Migration",
        "Help Desk",
        "Security Audits",
        "Custom Software",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Scene builder.
pub struct Scene {
    config: SceneConfig,
    items: Vec<String>,
    seed: Option<u64>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            config: SceneConfig::default(),
            items: default_services(),
            seed: None,
        }
    }

    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    /// Carousel items, in display order.
    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Seed the starfield for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), SceneError> {
        let carousel = Carousel::with_config(self.items, &self.config.carousel)?;
        let deck = Deck::new(self.config.playlist.clone())?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, carousel, deck, self.seed);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame clock backed by window redraw requests.
pub struct WindowClock {
    window: Arc<Window>,
    pending: bool,
}

impl WindowClock {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            pending: false,
        }
    }

    /// Note that the requested frame arrived.
    pub fn delivered(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl FrameClock for WindowClock {
    fn request_next_frame(&mut self) {
        if !self.pending {
            self.pending = true;
            self.window.request_redraw();
        }
    }

    // winit cannot withdraw a redraw request; the next one is simply ignored.
    fn cancel(&mut self) {
        self.pending = false;
    }
}

/// On-screen state of the carousel strip.
///
/// Owns the displayed strip offset, which trails the layout's target offset
/// while a transition runs, and the bookkeeping for gestures that began on
/// the card band.
#[derive(Debug, Clone, Default)]
pub struct CarouselStrip {
    offset: f32,
    tracking: bool,
}

impl CarouselStrip {
    pub fn new(offset: f32) -> Self {
        Self {
            offset,
            tracking: false,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Jump to `offset` after a layout change. A gesture in progress stays tracked.
    pub fn relayout(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Vertical extent of the card band for a surface `height` pixels tall.
    pub fn band(height: f32) -> (f32, f32) {
        let card_height = (height * 0.28).min(220.0);
        let center = height * 0.7;
        (center - card_height / 2.0, center + card_height / 2.0)
    }

    /// Move the displayed offset toward `target`.
    ///
    /// `before` is the transition state prior to this frame's update; the
    /// strip arrives exactly when the transition ends. Snaps jump.
    pub fn follow(&mut self, target: f32, before: TransitionState, elapsed: Duration, animate: bool) {
        match before {
            TransitionState::Transitioning { remaining } if animate && !remaining.is_zero() => {
                let k = (elapsed.as_secs_f32() / remaining.as_secs_f32()).min(1.0);
                self.offset += (target - self.offset) * k;
            }
            _ => self.offset = target,
        }
    }

    /// Feed this frame's gestures to the carousel.
    ///
    /// Only gestures that start on the card band are tracked. A release that
    /// does not swipe counts as a click on the card under it.
    pub fn route<T: std::fmt::Debug>(
        &mut self,
        carousel: &mut Carousel<T>,
        layout: &CardLayout,
        gestures: &[Gesture],
        band: (f32, f32),
    ) {
        let on_band = |y: f32| y >= band.0 && y <= band.1;
        for gesture in gestures {
            match gesture.phase {
                GesturePhase::Start => {
                    self.tracking = on_band(gesture.y);
                    if self.tracking {
                        carousel.touch_start(gesture.x);
                    }
                }
                GesturePhase::Move => {
                    if self.tracking {
                        carousel.touch_move(gesture.x);
                    }
                }
                GesturePhase::End => {
                    if !std::mem::take(&mut self.tracking) {
                        continue;
                    }
                    if carousel.touch_end(gesture.x).is_some() || !on_band(gesture.y) {
                        continue;
                    }
                    if let Some(index) = layout.hit_test(carousel, gesture.x) {
                        if let Some(item) = carousel.click_card(index) {
                            info!(?item, "detail opened");
                        }
                    }
                }
                GesturePhase::Cancel => {
                    self.tracking = false;
                    carousel.touch_cancel();
                }
            }
        }
    }

    /// Draw the visible cards and, if open, the detail panel.
    pub fn draw<T, S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        carousel: &Carousel<T>,
        layout: &CardLayout,
    ) {
        let width = surface.width();
        let height = surface.height();
        let (top, bottom) = Self::band(height);
        let thickness = bottom - top;
        let center_y = (top + bottom) / 2.0;

        for card in layout.cards(carousel) {
            let x = self.offset + card.index as f32 * layout.stride();
            if x + layout.card_width < 0.0 || x > width {
                continue;
            }
            let alpha = if card.active { ACTIVE_ALPHA } else { INACTIVE_ALPHA };
            let stops = [
                ColorStop::new(0.0, CARD_START, alpha),
                ColorStop::new(1.0, CARD_END, alpha),
            ];
            surface.draw_gradient_line(
                Vec2::new(x, center_y),
                Vec2::new(x + layout.card_width, center_y),
                &stops,
                thickness,
            );
        }

        if carousel.detail().is_some() {
            let stops = [
                ColorStop::new(0.0, CARD_START * 0.5, 0.95),
                ColorStop::new(1.0, CARD_END * 0.5, 0.95),
            ];
            surface.draw_gradient_line(
                Vec2::new(width * 0.2, height * 0.45),
                Vec2::new(width * 0.8, height * 0.45),
                &stops,
                height * 0.5,
            );
        }
    }
}

/// Playback bar along the top edge, shown once the deck is unlocked.
pub fn draw_deck<S: DrawingSurface + ?Sized>(surface: &mut S, deck: &Deck) {
    if !deck.is_unlocked() {
        return;
    }
    let width = surface.width();
    let y = 6.0;
    let track = [ColorStop::new(0.0, DECK_COLOR, 0.15)];
    surface.draw_gradient_line(Vec2::new(0.0, y), Vec2::new(width, y), &track, 4.0);

    let played = deck.progress() * width;
    if played > 0.0 {
        let alpha = if deck.playback() == Playback::Playing { 0.9 } else { 0.5 };
        let bar = [ColorStop::new(0.0, DECK_COLOR, alpha)];
        surface.draw_gradient_line(Vec2::new(0.0, y), Vec2::new(played, y), &bar, 4.0);
    }
}

type SceneAnimator = StarfieldAnimator<GpuSurface, WindowClock, Box<dyn RandomSource>>;

struct App {
    config: SceneConfig,
    seed: Option<u64>,
    window: Option<Arc<Window>>,
    animator: Option<SceneAnimator>,
    carousel: Carousel<String>,
    layout: CardLayout,
    strip: CarouselStrip,
    locale: LocaleStore,
    deck: Rc<RefCell<Deck>>,
    input: Input,
    time: Time,
    error: Option<SceneError>,
}

impl App {
    fn new(config: SceneConfig, carousel: Carousel<String>, deck: Deck, seed: Option<u64>) -> Self {
        let width = config.window.width as f32;
        let layout = CardLayout::for_viewport(width);
        let strip = CarouselStrip::new(layout.offset(carousel.current_index()));
        Self {
            locale: LocaleStore::new(&config.locale),
            config,
            seed,
            window: None,
            animator: None,
            carousel,
            layout,
            strip,
            deck: Rc::new(RefCell::new(deck)),
            input: Input::new(),
            time: Time::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        error!(error = %err, "scene stopped");
        self.error = Some(err);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SceneError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        info!(width = size.width, height = size.height, "window created");

        let (surface, gpu_error) = match pollster::block_on(GpuSurface::new(
            window.clone(),
            self.config.window.background,
        )) {
            Ok(surface) => (Some(surface), None),
            Err(err) => {
                warn!(error = %err, "GPU surface unavailable");
                (None, Some(err))
            }
        };

        let rng: Box<dyn RandomSource> = match self.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(EntropyRandom::new()),
        };
        let field = Starfield::new(self.config.starfield.clone(), rng);
        // Without a surface the animator refuses to start; report why there is none.
        let animator = StarfieldAnimator::start(field, surface, WindowClock::new(window.clone()))
            .map_err(|err| gpu_error.map_or(SceneError::from(err), SceneError::Gpu))?;

        self.resize_views(size.width as f32, size.height as f32, window.scale_factor() as f32);

        let deck = Rc::clone(&self.deck);
        let title_window = window.clone();
        let title = self.config.window.title.clone();
        self.locale.subscribe(move |state| {
            deck.borrow_mut().set_unlocked(state.music_unlocked);
            title_window.set_title(&format!("{title} | {}", state.locale.greeting()));
        });

        self.animator = Some(animator);
        self.window = Some(window);
        Ok(())
    }

    fn resize_views(&mut self, width: f32, height: f32, scale_factor: f32) {
        self.input.set_surface_size(width, height);
        self.input
            .set_max_scroll(Some(self.config.window.max_scroll(height)));
        self.layout = CardLayout::for_display(width, scale_factor);
        self.strip
            .relayout(self.layout.offset(self.carousel.current_index()));
        debug!(width, height, scale_factor, card_width = self.layout.card_width, "views resized");
    }

    fn process_input(&mut self) {
        let keys: Vec<KeyCode> = self.input.pressed_keys().collect();
        for key in keys {
            match key {
                KeyCode::Left | KeyCode::Right => {
                    self.carousel.handle_key(key);
                }
                KeyCode::Escape => self.carousel.close_detail(),
                KeyCode::Space => {
                    if let Err(err) = self.deck.borrow_mut().toggle() {
                        trace!(error = %err, "deck toggle ignored");
                    }
                }
                _ => {}
            }
        }

        self.locale.handle_text(self.input.typed_text());

        if let Some(animator) = &self.animator {
            let band = CarouselStrip::band(animator.surface().height());
            self.strip
                .route(&mut self.carousel, &self.layout, self.input.gestures(), band);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let elapsed = self.time.update();
        self.process_input();

        let before = self.carousel.state();
        self.carousel.update(elapsed);
        let target = self.layout.offset(self.carousel.current_index());
        self.strip
            .follow(target, before, elapsed, self.carousel.should_animate());
        self.deck.borrow_mut().tick(elapsed);

        let frame = FrameInput {
            pointer: self.input.pointer(),
            scroll_y: self.input.scroll_y(),
        };
        self.input.begin_frame();

        let Some(animator) = self.animator.as_mut() else {
            return;
        };
        if !animator.frame(frame) {
            return;
        }

        let surface = animator.surface_mut();
        self.strip.draw(surface, &self.carousel, &self.layout);
        draw_deck(surface, &self.deck.borrow());

        match surface.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => surface.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(err) => warn!(error = ?err, "render error"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.start(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                if let Some(animator) = &mut self.animator {
                    animator.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(animator) = &mut self.animator {
                    animator.surface_mut().resize(physical_size);
                }
                if physical_size.width > 0 && physical_size.height > 0 {
                    let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor() as f32);
                    self.resize_views(physical_size.width as f32, physical_size.height as f32, scale);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(animator) = &mut self.animator {
                    // Redraws nobody asked for (expose, cancelled requests) are skipped.
                    if !animator.is_running() || !animator.clock().is_pending() {
                        return;
                    }
                    animator.clock_mut().delivered();
                }
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}
