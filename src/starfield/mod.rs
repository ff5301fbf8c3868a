//! The particle field behind the page.
//!
//! Four populations share one surface:
//!
//! | Population | Count | Motion |
//! |------------|-------|--------|
//! | Fixed stars | `drift / 3` | none |
//! | Scroll stars | `drift / 2` | vertical, driven by scroll delta |
//! | Drift stars | `area / density` | damped drift, pulled toward the pointer |
//! | Comets | at most 2 | straight line, fading tail |
//!
//! [`Starfield`] holds the populations and steps them. [`StarfieldAnimator`]
//! binds a field to a [`DrawingSurface`] and a [`FrameClock`], keeps the
//! populations sized to the surface, and requests one frame after another
//! until it is stopped or dropped.
//!
//! # Example
//!
//! ```ignore
//! let field = Starfield::new(StarfieldConfig::default(), EntropyRandom::new());
//! let mut animator = StarfieldAnimator::start(field, Some(surface), clock)?;
//!
//! // On every frame callback from the host:
//! animator.frame(FrameInput { pointer: input.pointer(), scroll_y: input.scroll_y() });
//! ```

mod comet;
mod star;

pub use comet::{Comet, CometOrigin};
pub use star::{attraction, wrap, Star};

use glam::Vec2;
use tracing::{debug, trace};

use crate::config::StarfieldConfig;
use crate::error::StarfieldError;
use crate::random::{EntropyRandom, RandomSource};
use crate::surface::DrawingSurface;
use crate::time::FrameClock;

/// Host state snapshotted once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer in surface-local pixels, or `None` when it is outside the surface.
    pub pointer: Option<Vec2>,
    /// Current vertical page scroll in pixels.
    pub scroll_y: f32,
}

/// Sizes of the three star populations for one surface size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationCounts {
    pub drift: usize,
    pub fixed: usize,
    pub scroll: usize,
}

/// Population sizes for a `width × height` surface.
///
/// `drift = floor(area / density)`, `fixed = drift / static_divisor`,
/// `scroll = drift / scroll_divisor`. Degenerate sizes give empty populations.
pub fn population_counts(width: f32, height: f32, config: &StarfieldConfig) -> PopulationCounts {
    let area = f64::from(width.max(0.0)) * f64::from(height.max(0.0));
    if !area.is_finite() || area <= 0.0 || config.density <= 0.0 {
        return PopulationCounts::default();
    }
    let drift = (area / f64::from(config.density)).floor() as usize;
    PopulationCounts {
        drift,
        fixed: drift / config.static_divisor.max(1) as usize,
        scroll: drift / config.scroll_divisor.max(1) as usize,
    }
}

/// Stars and comets for one surface.
#[derive(Debug)]
pub struct Starfield<R: RandomSource = EntropyRandom> {
    config: StarfieldConfig,
    width: f32,
    height: f32,
    fixed: Vec<Star>,
    drift: Vec<Star>,
    scroll: Vec<Star>,
    comets: Vec<Comet>,
    previous_scroll_y: Option<f32>,
    rng: R,
}

impl<R: RandomSource> Starfield<R> {
    /// Create an empty field. Call [`Starfield::resize`] before stepping.
    pub fn new(config: StarfieldConfig, rng: R) -> Self {
        Self {
            config,
            width: 0.0,
            height: 0.0,
            fixed: Vec::new(),
            drift: Vec::new(),
            scroll: Vec::new(),
            comets: Vec::new(),
            previous_scroll_y: None,
            rng,
        }
    }

    /// Discard every star and regenerate all populations for the new size.
    ///
    /// Comets in flight are dropped too. Positions are not preserved.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let counts = population_counts(self.width, self.height, &self.config);

        let (w, h) = (self.width, self.height);
        let config = &self.config;
        let rng = &mut self.rng;
        self.drift = (0..counts.drift).map(|_| Star::drift(rng, w, h, config)).collect();
        self.fixed = (0..counts.fixed).map(|_| Star::fixed(rng, w, h, config)).collect();
        self.scroll = (0..counts.scroll).map(|_| Star::scroll(rng, w, h, config)).collect();
        self.comets.clear();

        debug!(
            width = w,
            height = h,
            drift = counts.drift,
            fixed = counts.fixed,
            scroll = counts.scroll,
            "regenerated star populations"
        );
    }

    /// Advance every population by one frame and draw it.
    pub fn step<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S, input: FrameInput) {
        let star_color = self.config.star_color();
        surface.clear();

        for star in &self.fixed {
            star.draw(surface, star_color);
        }

        let scroll_delta = match self.previous_scroll_y.replace(input.scroll_y) {
            Some(previous) => input.scroll_y - previous,
            None => 0.0,
        };
        for star in &mut self.scroll {
            star.step_scroll(
                scroll_delta,
                self.config.scroll_parallax,
                self.config.scroll_damping,
                self.height,
            );
            star.draw(surface, star_color);
        }

        let bounds = Vec2::new(self.width, self.height);
        for star in &mut self.drift {
            star.step_drift(
                input.pointer,
                self.config.attraction_radius,
                self.config.attraction_strength,
                self.config.drift_damping,
                bounds,
            );
            star.draw(surface, star_color);
        }

        self.maybe_spawn_comet();
        self.step_comets(surface);
    }

    fn maybe_spawn_comet(&mut self) {
        if self.comets.len() >= self.config.max_comets {
            return;
        }
        if self.rng.chance(self.config.comet_spawn_chance) {
            let comet = Comet::spawn(&mut self.rng, self.width, self.height, &self.config);
            trace!(x = comet.position.x, y = comet.position.y, "comet spawned");
            self.comets.push(comet);
        }
    }

    fn step_comets<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S) {
        let (w, h) = (self.width, self.height);
        let decay = self.config.comet_decay;
        self.comets.retain_mut(|comet| {
            comet.step(decay);
            !comet.is_expired(w, h)
        });

        let color = self.config.comet_color();
        for comet in &self.comets {
            comet.draw(surface, color, self.config.comet_glow_scale);
        }
    }

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    /// Size the populations were generated for.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn drift_stars(&self) -> &[Star] {
        &self.drift
    }

    pub fn fixed_stars(&self) -> &[Star] {
        &self.fixed
    }

    pub fn scroll_stars(&self) -> &[Star] {
        &self.scroll
    }

    pub fn comets(&self) -> &[Comet] {
        &self.comets
    }

    pub fn counts(&self) -> PopulationCounts {
        PopulationCounts {
            drift: self.drift.len(),
            fixed: self.fixed.len(),
            scroll: self.scroll.len(),
        }
    }
}

/// Drives a [`Starfield`] from a host frame clock.
///
/// The animator owns its surface and clock. Every delivered frame resizes the
/// field if the surface changed size, steps it, and requests the next frame.
/// Stopping (or dropping) cancels the outstanding request; frames delivered
/// afterwards are ignored.
pub struct StarfieldAnimator<S, C, R = EntropyRandom>
where
    S: DrawingSurface,
    C: FrameClock,
    R: RandomSource,
{
    field: Starfield<R>,
    surface: S,
    clock: C,
    running: bool,
}

impl<S, C, R> StarfieldAnimator<S, C, R>
where
    S: DrawingSurface,
    C: FrameClock,
    R: RandomSource,
{
    /// Bind `field` to `surface` and request the first frame.
    ///
    /// Without a surface nothing is generated and no frame is requested.
    pub fn start(
        mut field: Starfield<R>,
        surface: Option<S>,
        mut clock: C,
    ) -> Result<Self, StarfieldError> {
        let surface = surface.ok_or(StarfieldError::MissingSurface)?;
        field.resize(surface.width(), surface.height());
        clock.request_next_frame();
        Ok(Self {
            field,
            surface,
            clock,
            running: true,
        })
    }

    /// Handle one frame callback. Returns `false` once stopped.
    pub fn frame(&mut self, input: FrameInput) -> bool {
        if !self.running {
            return false;
        }
        let size = Vec2::new(self.surface.width(), self.surface.height());
        if size != self.field.size() {
            self.field.resize(size.x, size.y);
        }
        self.field.step(&mut self.surface, input);
        self.clock.request_next_frame();
        true
    }

    /// Stop animating and cancel the pending frame.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.clock.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn field(&self) -> &Starfield<R> {
        &self.field
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<S, C, R> Drop for StarfieldAnimator<S, C, R>
where
    S: DrawingSurface,
    C: FrameClock,
    R: RandomSource,
{
    fn drop(&mut self) {
        self.stop();
    }
}
