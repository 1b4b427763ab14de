//! Input handling for keyboard and mouse.
//!
//! Events are accumulated between frames; the app drains them once per
//! frame into the orbit camera controls.

use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => MouseButton::Left,
            winit::event::MouseButton::Right => MouseButton::Right,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// Pixels of scroll treated as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Tracks keyboard and mouse state between frames.
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    just_pressed_keys: HashSet<KeyCode>,
    pressed_buttons: HashSet<MouseButton>,

    /// Last known cursor position; `None` until the cursor enters
    mouse_position: Option<(f32, f32)>,
    /// Cursor movement while the left button was held, since the last drain
    drag_delta: (f32, f32),
    /// Wheel movement in lines since the last drain (positive = away from user)
    scroll_lines: f32,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press event.
    pub fn on_key_pressed(&mut self, key: KeyCode) {
        if self.pressed_keys.insert(key) {
            self.just_pressed_keys.insert(key);
        }
    }

    /// Handle a key release event.
    pub fn on_key_released(&mut self, key: KeyCode) {
        self.pressed_keys.remove(&key);
    }

    /// Handle a mouse button press event.
    pub fn on_mouse_pressed(&mut self, button: MouseButton) {
        self.pressed_buttons.insert(button);
    }

    /// Handle a mouse button release event.
    pub fn on_mouse_released(&mut self, button: MouseButton) {
        self.pressed_buttons.remove(&button);
    }

    /// Handle cursor movement.
    pub fn on_mouse_moved(&mut self, x: f32, y: f32) {
        if let Some((old_x, old_y)) = self.mouse_position
            && self.is_mouse_pressed(MouseButton::Left)
        {
            self.drag_delta.0 += x - old_x;
            self.drag_delta.1 += y - old_y;
        }
        self.mouse_position = Some((x, y));
    }

    /// The cursor left the window.
    pub fn on_mouse_left(&mut self) {
        self.mouse_position = None;
    }

    /// Handle wheel movement given in lines.
    pub fn on_scroll_lines(&mut self, lines: f32) {
        self.scroll_lines += lines;
    }

    /// Handle wheel movement given in pixels (touchpads).
    pub fn on_scroll_pixels(&mut self, pixels: f32) {
        self.scroll_lines += pixels / PIXELS_PER_LINE;
    }

    /// Check if a key is currently pressed.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Check if a key was pressed since the last [`end_frame`](Self::end_frame).
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Check if a mouse button is currently pressed.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Take the accumulated drag since the last call.
    pub fn take_drag(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.drag_delta)
    }

    /// Take the accumulated scroll since the last call.
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_lines)
    }

    /// Clear per-frame edge state.
    pub fn end_frame(&mut self) {
        self.just_pressed_keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_only_with_left_button() {
        let mut input = InputState::new();
        input.on_mouse_moved(10.0, 10.0);
        input.on_mouse_moved(20.0, 10.0);
        assert_eq!(input.take_drag(), (0.0, 0.0));

        input.on_mouse_pressed(MouseButton::Left);
        input.on_mouse_moved(25.0, 12.0);
        input.on_mouse_moved(30.0, 15.0);
        assert_eq!(input.take_drag(), (10.0, 5.0));
        assert_eq!(input.take_drag(), (0.0, 0.0));
    }

    #[test]
    fn test_cursor_reentry_does_not_jump() {
        let mut input = InputState::new();
        input.on_mouse_pressed(MouseButton::Left);
        input.on_mouse_moved(0.0, 0.0);
        input.on_mouse_left();
        input.on_mouse_moved(500.0, 500.0);
        assert_eq!(input.take_drag(), (0.0, 0.0));
    }

    #[test]
    fn test_scroll_accumulates() {
        let mut input = InputState::new();
        input.on_scroll_lines(1.0);
        input.on_scroll_pixels(40.0);
        assert_eq!(input.take_scroll(), 2.0);
        assert_eq!(input.take_scroll(), 0.0);
    }

    #[test]
    fn test_key_edges() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::Escape);
        assert!(input.is_key_just_pressed(KeyCode::Escape));
        input.end_frame();
        assert!(input.is_key_pressed(KeyCode::Escape));
        assert!(!input.is_key_just_pressed(KeyCode::Escape));
        input.on_key_released(KeyCode::Escape);
        assert!(!input.is_key_pressed(KeyCode::Escape));
    }
}
