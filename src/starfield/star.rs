//! Stars: the three long-lived particle populations.

use glam::{Vec2, Vec3};

use crate::config::{Span, StarfieldConfig};
use crate::random::RandomSource;
use crate::surface::DrawingSurface;

/// A single star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Rendered opacity.
    pub alpha: f32,
    /// Opacity drawn at creation.
    pub base_alpha: f32,
}

impl Star {
    fn spawn<R: RandomSource + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        radius: Span,
        alpha: Span,
    ) -> Self {
        let position = Vec2::new(rng.range(0.0, width), rng.range(0.0, height));
        let radius = rng.range(radius.min, radius.max);
        let alpha = rng.range(alpha.min, alpha.max);
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            alpha,
            base_alpha: alpha,
        }
    }

    /// Free-floating star with a small random initial velocity.
    pub fn drift<R: RandomSource + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        config: &StarfieldConfig,
    ) -> Self {
        let mut star = Self::spawn(rng, width, height, config.drift_radius, config.drift_alpha);
        let v = config.drift_initial_speed;
        star.velocity = Vec2::new(rng.range(-v, v), rng.range(-v, v));
        star
    }

    /// Background star that never moves.
    pub fn fixed<R: RandomSource + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        config: &StarfieldConfig,
    ) -> Self {
        Self::spawn(rng, width, height, config.static_radius, config.static_alpha)
    }

    /// Star driven by page scroll, starting at rest.
    pub fn scroll<R: RandomSource + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        config: &StarfieldConfig,
    ) -> Self {
        Self::spawn(rng, width, height, config.drift_radius, config.drift_alpha)
    }

    /// Scroll-reactive step.
    ///
    /// A non-zero scroll delta replaces the vertical velocity, scaled by
    /// `alpha * 2` so brighter stars travel further. Damping and integration
    /// run every frame, then `y` wraps into `[0, height)`.
    pub fn step_scroll(&mut self, scroll_delta: f32, parallax: f32, damping: f32, height: f32) {
        if scroll_delta.abs() > 0.0 {
            self.velocity.y = -scroll_delta * parallax * (self.alpha * 2.0);
        }
        self.velocity.y *= damping;
        self.position.y = wrap(self.position.y + self.velocity.y, height);
    }

    /// Drift step: optional pointer attraction, damping, integration, wrap.
    pub fn step_drift(
        &mut self,
        pointer: Option<Vec2>,
        radius: f32,
        strength: f32,
        damping: f32,
        bounds: Vec2,
    ) {
        if let Some(target) = pointer {
            self.velocity += attraction(self.position, target, radius, strength);
        }
        self.velocity *= damping;
        let next = self.position + self.velocity;
        self.position = Vec2::new(wrap(next.x, bounds.x), wrap(next.y, bounds.y));
    }

    pub fn draw<S: DrawingSurface + ?Sized>(&self, surface: &mut S, color: Vec3) {
        surface.draw_circle(self.position, self.radius, color, self.alpha);
    }
}

/// Velocity change pulling `position` toward `target`.
///
/// Zero outside `radius`, and zero when the two points coincide (there is no
/// direction to pull in).
pub fn attraction(position: Vec2, target: Vec2, radius: f32, strength: f32) -> Vec2 {
    let offset = target - position;
    let distance = offset.length();
    if distance <= 0.0 || distance >= radius {
        return Vec2::ZERO;
    }
    let force = (1.0 - distance / radius) * strength;
    offset / distance * force
}

/// Wrap `value` into `[0, extent)`.
///
/// Non-positive or non-finite extents collapse to `0.0`.
pub fn wrap(value: f32, extent: f32) -> f32 {
    if !extent.is_finite() || extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_wrap_overflow_and_underflow() {
        assert!((wrap(100.5, 100.0) - 0.5).abs() < 1e-4);
        assert!((wrap(-0.5, 100.0) - 99.5).abs() < 1e-4);
        assert_eq!(wrap(100.0, 100.0), 0.0);
        assert_eq!(wrap(-1e-9, 100.0), 0.0);
        assert_eq!(wrap(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_attraction_guards_zero_distance() {
        let p = Vec2::new(10.0, 10.0);
        assert_eq!(attraction(p, p, 400.0, 0.15), Vec2::ZERO);
    }

    #[test]
    fn test_attraction_outside_radius() {
        let f = attraction(Vec2::ZERO, Vec2::new(400.0, 0.0), 400.0, 0.15);
        assert_eq!(f, Vec2::ZERO);
    }

    #[test]
    fn test_attraction_magnitude() {
        let f = attraction(Vec2::ZERO, Vec2::new(200.0, 0.0), 400.0, 0.15);
        assert!((f.x - 0.075).abs() < 1e-6);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn test_scroll_step_parallax_by_alpha() {
        let mut star = Star {
            position: Vec2::new(5.0, 50.0),
            velocity: Vec2::ZERO,
            radius: 1.0,
            alpha: 0.5,
            base_alpha: 0.5,
        };
        star.step_scroll(10.0, 0.8, 0.95, 100.0);
        // vy = -10 * 0.8 * 1.0 = -8, damped to -7.6
        assert!((star.velocity.y + 7.6).abs() < 1e-5);
        assert!((star.position.y - 42.4).abs() < 1e-4);
        assert_eq!(star.position.x, 5.0);

        // No scroll: velocity decays but keeps direction.
        star.step_scroll(0.0, 0.8, 0.95, 100.0);
        assert!((star.velocity.y + 7.22).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_step_wraps_through_top() {
        let mut star = Star {
            position: Vec2::new(0.0, 1.0),
            velocity: Vec2::ZERO,
            radius: 1.0,
            alpha: 0.5,
            base_alpha: 0.5,
        };
        star.step_scroll(10.0, 0.8, 0.95, 100.0);
        assert!(star.position.y >= 0.0 && star.position.y < 100.0);
        assert!(star.position.y > 90.0);
    }

    #[test]
    fn test_spawn_uses_configured_ranges() {
        let config = StarfieldConfig::default();
        let mut rng = ScriptedRandom::new(vec![0.5, 0.5, 0.0, 0.999, 0.5, 0.5]);
        let star = Star::drift(&mut rng, 100.0, 100.0, &config);
        assert_eq!(star.position, Vec2::new(50.0, 50.0));
        assert_eq!(star.radius, 0.5);
        assert!(star.alpha < 0.8 && star.alpha > 0.79);
        assert_eq!(star.alpha, star.base_alpha);
    }
}
