//! Input handling for the scene.
//!
//! The `Input` struct turns raw window events into the few things the page
//! cares about:
//!
//! - the pointer in surface-local pixels, or `None` once it leaves the surface;
//! - the page scroll position, accumulated from wheel deltas;
//! - arrow keys and other keys pressed this frame;
//! - text typed this frame (for the locale easter egg);
//! - horizontal gestures from touch or left-button drags, as [`Gesture`]s.
//!
//! Per-frame state is cleared by [`Input::begin_frame`].

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Pixels scrolled per wheel line.
const LINE_HEIGHT: f32 = 40.0;

/// Keys the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Left,
    Right,
    Space,
    Escape,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Phase of a horizontal gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One step of a touch or drag, with its horizontal position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub phase: GesturePhase,
    pub x: f32,
    pub y: f32,
}

/// Input state tracking for keyboard, pointer, scroll and gestures.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    dragging: bool,

    pointer: Option<Vec2>,
    scroll_y: f32,
    max_scroll: Option<f32>,

    typed: String,
    gestures: Vec<Gesture>,

    surface_size: Vec2,
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self {
            surface_size: Vec2::new(800.0, 600.0),
            ..Default::default()
        }
    }

    // ========== Queries ==========

    /// Check if a key was pressed this frame (just went down).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Keys that went down this frame.
    pub fn pressed_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_pressed.iter().copied()
    }

    /// Pointer in surface pixels, `None` while outside the surface.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Page scroll position in pixels (0 = top).
    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Text typed this frame.
    pub fn typed_text(&self) -> &str {
        &self.typed
    }

    /// Gestures recorded this frame, in order.
    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    /// Limit how far the page can scroll. `None` removes the limit.
    pub fn set_max_scroll(&mut self, max: Option<f32>) {
        self.max_scroll = max;
        self.scroll_by(0.0);
    }

    // ========== Frame bookkeeping ==========

    /// Clear per-frame state. Call after the frame has consumed it.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.typed.clear();
        self.gestures.clear();
    }

    pub fn set_surface_size(&mut self, width: f32, height: f32) {
        self.surface_size = Vec2::new(width, height);
        if let Some(p) = self.pointer {
            if !self.inside(p) {
                self.pointer = None;
            }
        }
    }

    // ========== Event processing ==========

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.key(KeyCode::from(code), pressed);
                }
                if pressed {
                    if let Some(text) = &event.text {
                        self.text(text.as_str());
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.left_button(*state == ElementState::Pressed),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                // Wheel up (positive) moves the page toward the top.
                self.scroll_by(-dy);
            }
            WindowEvent::Touch(touch) => {
                let phase = match touch.phase {
                    TouchPhase::Started => GesturePhase::Start,
                    TouchPhase::Moved => GesturePhase::Move,
                    TouchPhase::Ended => GesturePhase::End,
                    TouchPhase::Cancelled => GesturePhase::Cancel,
                };
                self.gesture(phase, Vec2::new(touch.location.x as f32, touch.location.y as f32));
            }
            WindowEvent::Focused(false) => {
                self.keys_held.clear();
                self.dragging = false;
            }
            _ => {}
        }
    }

    pub(crate) fn key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            // No repeat: only the first press counts.
            if self.keys_held.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_held.remove(&key);
        }
    }

    pub(crate) fn text(&mut self, text: &str) {
        self.typed.push_str(text);
    }

    pub(crate) fn cursor_moved(&mut self, position: Vec2) {
        self.pointer = self.inside(position).then_some(position);
        if self.dragging {
            self.gesture(GesturePhase::Move, position);
        }
    }

    pub(crate) fn cursor_left(&mut self) {
        self.pointer = None;
        if std::mem::take(&mut self.dragging) {
            self.gestures.push(Gesture {
                phase: GesturePhase::Cancel,
                x: 0.0,
                y: 0.0,
            });
        }
    }

    /// Left-button drags emulate touch so the carousel can be swiped with a mouse.
    pub(crate) fn left_button(&mut self, pressed: bool) {
        self.dragging = pressed;
        if let Some(p) = self.pointer {
            let phase = if pressed { GesturePhase::Start } else { GesturePhase::End };
            self.gesture(phase, p);
        }
    }

    pub(crate) fn scroll_by(&mut self, dy: f32) {
        let mut next = (self.scroll_y + dy).max(0.0);
        if let Some(max) = self.max_scroll {
            next = next.min(max.max(0.0));
        }
        self.scroll_y = next;
    }

    fn gesture(&mut self, phase: GesturePhase, position: Vec2) {
        self.gestures.push(Gesture {
            phase,
            x: position.x,
            y: position.y,
        });
    }

    fn inside(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.surface_size.x && p.y < self.surface_size.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut input = Input::new();
        assert!(!input.key_pressed(KeyCode::Space));

        input.key(KeyCode::Space, true);
        assert!(input.key_pressed(KeyCode::Space));

        // Held keys do not re-fire.
        input.begin_frame();
        input.key(KeyCode::Space, true);
        assert!(!input.key_pressed(KeyCode::Space));

        input.key(KeyCode::Space, false);
        input.key(KeyCode::Space, true);
        assert!(input.key_pressed(KeyCode::Space));
    }

    #[test]
    fn test_pointer_inside_and_left() {
        let mut input = Input::new();
        input.set_surface_size(800.0, 600.0);
        input.cursor_moved(Vec2::new(100.0, 50.0));
        assert_eq!(input.pointer(), Some(Vec2::new(100.0, 50.0)));

        input.cursor_moved(Vec2::new(900.0, 50.0));
        assert_eq!(input.pointer(), None);

        input.cursor_moved(Vec2::new(10.0, 10.0));
        input.cursor_left();
        assert_eq!(input.pointer(), None);
    }

    #[test]
    fn test_shrinking_surface_drops_pointer() {
        let mut input = Input::new();
        input.set_surface_size(800.0, 600.0);
        input.cursor_moved(Vec2::new(700.0, 10.0));
        input.set_surface_size(400.0, 600.0);
        assert_eq!(input.pointer(), None);
    }

    #[test]
    fn test_scroll_clamps() {
        let mut input = Input::new();
        input.scroll_by(-100.0);
        assert_eq!(input.scroll_y(), 0.0);
        input.scroll_by(250.0);
        assert_eq!(input.scroll_y(), 250.0);
        input.set_max_scroll(Some(200.0));
        assert_eq!(input.scroll_y(), 200.0);
    }

    #[test]
    fn test_mouse_drag_becomes_gesture() {
        let mut input = Input::new();
        input.set_surface_size(800.0, 600.0);
        input.cursor_moved(Vec2::new(400.0, 300.0));
        input.left_button(true);
        input.cursor_moved(Vec2::new(380.0, 300.0));
        input.left_button(false);

        let phases: Vec<_> = input.gestures().iter().map(|g| g.phase).collect();
        assert_eq!(phases, vec![GesturePhase::Start, GesturePhase::Move, GesturePhase::End]);
        assert_eq!(input.gestures()[2].x, 380.0);

        input.begin_frame();
        assert!(input.gestures().is_empty());
    }

    #[test]
    fn test_typed_text_accumulates_per_frame() {
        let mut input = Input::new();
        input.text("th");
        input.text("ai");
        assert_eq!(input.typed_text(), "thai");
        input.begin_frame();
        assert_eq!(input.typed_text(), "");
    }

    #[test]
    fn test_leaving_mid_drag_cancels_gesture() {
        let mut input = Input::new();
        input.set_surface_size(800.0, 600.0);
        input.cursor_moved(Vec2::new(400.0, 300.0));
        input.left_button(true);
        input.cursor_left();
        input.cursor_moved(Vec2::new(420.0, 300.0));

        let phases: Vec<_> = input.gestures().iter().map(|g| g.phase).collect();
        assert_eq!(phases, vec![GesturePhase::Start, GesturePhase::Cancel]);
    }
}
