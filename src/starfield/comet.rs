//! Comets: short-lived streaks with a fading tail.

use glam::{Vec2, Vec3};

use crate::config::StarfieldConfig;
use crate::random::RandomSource;
use crate::surface::{ColorStop, DrawingSurface};

/// Which surface edge a comet enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CometOrigin {
    Left,
    Top,
}

/// A comet in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comet {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Tail length in pixels.
    pub length: f32,
    pub alpha: f32,
    pub thickness: f32,
}

impl Comet {
    /// Spawn a comet on the left or top edge, heading down and to the right.
    pub fn spawn<R: RandomSource + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        config: &StarfieldConfig,
    ) -> Self {
        let origin = if rng.next_f32() < 0.5 {
            CometOrigin::Left
        } else {
            CometOrigin::Top
        };
        let position = match origin {
            CometOrigin::Left => Vec2::new(0.0, rng.range(0.0, height)),
            CometOrigin::Top => Vec2::new(rng.range(0.0, width), 0.0),
        };

        let angle = rng
            .range(config.comet_angle.min, config.comet_angle.max)
            .to_radians();
        let speed = rng.range(config.comet_speed.min, config.comet_speed.max);

        Self {
            position,
            velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
            length: rng.range(config.comet_length.min, config.comet_length.max),
            alpha: 1.0,
            thickness: rng.range(config.comet_thickness.min, config.comet_thickness.max),
        }
    }

    /// Integrate one frame and fade.
    pub fn step(&mut self, decay: f32) {
        self.position += self.velocity;
        self.alpha -= decay;
    }

    /// Faded out, or the head is further outside the surface than the tail is long.
    pub fn is_expired(&self, width: f32, height: f32) -> bool {
        if self.alpha <= 0.0 {
            return true;
        }
        let p = self.position;
        p.x < -self.length
            || p.y < -self.length
            || p.x > width + self.length
            || p.y > height + self.length
    }

    /// Point where the tail ends, behind the head along the direction of travel.
    pub fn tail_end(&self) -> Vec2 {
        self.position - self.velocity.normalize_or_zero() * self.length
    }

    /// Tail gradient, head, then glow.
    pub fn draw<S: DrawingSurface + ?Sized>(&self, surface: &mut S, color: Vec3, glow_scale: f32) {
        let stops = [
            ColorStop::new(0.0, color, self.alpha),
            ColorStop::new(1.0, color, 0.0),
        ];
        surface.draw_gradient_line(self.position, self.tail_end(), &stops, self.thickness);
        surface.draw_circle(self.position, self.thickness, Vec3::ONE, self.alpha);
        surface.draw_circle(
            self.position,
            self.thickness * glow_scale,
            color,
            self.alpha * 0.3,
        );
    }
}
