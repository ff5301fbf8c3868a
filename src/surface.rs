//! Drawing surface abstraction.
//!
//! The starfield never talks to a graphics API directly. Everything it draws
//! goes through [`DrawingSurface`], which only knows how to clear itself,
//! fill a soft circle, and stroke a line with a linear colour gradient.
//!
//! Two implementations ship with the crate:
//!
//! - [`RecordingSurface`] keeps the draw calls as a list of [`DrawCommand`]s.
//!   Tests and benches inspect it.
//! - `GpuSurface` (in the `gpu` module) turns the same calls into instanced
//!   quads for wgpu.
//!
//! # Example
//!
//! ```ignore
//! let mut surface = RecordingSurface::new(800.0, 600.0);
//! surface.draw_circle(Vec2::new(10.0, 10.0), 2.0, Vec3::ONE, 0.5);
//! assert_eq!(surface.circle_count(), 1);
//! ```

use glam::{Vec2, Vec3};

/// A colour stop along a gradient line.
///
/// `offset` runs from `0.0` at the line start to `1.0` at the line end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Vec3,
    pub alpha: f32,
}

impl ColorStop {
    pub fn new(offset: f32, color: Vec3, alpha: f32) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

/// Target the particle field renders into.
///
/// Coordinates are surface pixels with the origin at the top-left corner,
/// `x` to the right and `y` downward.
pub trait DrawingSurface {
    /// Surface width in pixels.
    fn width(&self) -> f32;

    /// Surface height in pixels.
    fn height(&self) -> f32;

    /// Erase everything drawn since the last clear.
    fn clear(&mut self);

    /// Fill a circle.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32);

    /// Stroke a straight line whose colour follows `stops` from `from` to `to`.
    fn draw_gradient_line(&mut self, from: Vec2, to: Vec2, stops: &[ColorStop], width: f32);
}

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Vec2,
        radius: f32,
        color: Vec3,
        alpha: f32,
    },
    GradientLine {
        from: Vec2,
        to: Vec2,
        stops: Vec<ColorStop>,
        width: f32,
    },
}

/// Surface that records draw calls instead of rasterising them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    clears: u64,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            clears: 0,
        }
    }

    /// Change the reported size. Recorded commands are kept.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Commands recorded since the last clear, in draw order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the list empty.
    pub fn drain(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// How many times `clear` has been called.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::GradientLine { .. }))
            .count()
    }
}

impl DrawingSurface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn draw_gradient_line(&mut self, from: Vec2, to: Vec2, stops: &[ColorStop], width: f32) {
        self.commands.push(DrawCommand::GradientLine {
            from,
            to,
            stops: stops.to_vec(),
            width,
        });
    }
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for &mut S {
    fn width(&self) -> f32 {
        (**self).width()
    }

    fn height(&self) -> f32 {
        (**self).height()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32) {
        (**self).draw_circle(center, radius, color, alpha)
    }

    fn draw_gradient_line(&mut self, from: Vec2, to: Vec2, stops: &[ColorStop], width: f32) {
        (**self).draw_gradient_line(from, to, stops, width)
    }
}

/// Sample a gradient at `t` (0..=1), returning colour and alpha.
///
/// Stops are expected in ascending offset order. Outside the first/last stop
/// the end colours are held.
pub fn sample_gradient(stops: &[ColorStop], t: f32) -> (Vec3, f32) {
    let Some(first) = stops.first() else {
        return (Vec3::ZERO, 0.0);
    };
    if t <= first.offset {
        return (first.color, first.alpha);
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return (a.color.lerp(b.color, k), a.alpha + (b.alpha - a.alpha) * k);
        }
    }
    let last = stops[stops.len() - 1];
    (last.color, last.alpha)
}
