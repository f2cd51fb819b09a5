//! Input management system
//!
//! Tracks key and cursor state between ticks and turns it into the
//! [`CameraInput`] snapshot the camera consumes. The window layer feeds raw
//! events in; nothing here talks to a windowing library.
//!
//! Bindings: W/S forward and back, D/A right and left, E/Q up and down,
//! Space toggles free-look, R resets the camera, Escape requests close.

use bitflags::bitflags;

use crate::foundation::math::{Vec2, Vec3};
use crate::render::primitives::CameraInput;

/// Key codes the scene viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Move forward
    W,
    /// Strafe left
    A,
    /// Move back
    S,
    /// Strafe right
    D,
    /// Move down
    Q,
    /// Move up
    E,
    /// Toggle free-look
    Space,
    /// Reset the camera
    R,
    /// Request close
    Escape,
    /// Any key without a binding
    Other,
}

bitflags! {
    /// Keys currently held down
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HeldKeys: u16 {
        /// W
        const FORWARD = 1 << 0;
        /// S
        const BACKWARD = 1 << 1;
        /// D
        const RIGHT = 1 << 2;
        /// A
        const LEFT = 1 << 3;
        /// E
        const UP = 1 << 4;
        /// Q
        const DOWN = 1 << 5;
        /// Space
        const TOGGLE_FREE_LOOK = 1 << 6;
        /// R
        const RESET = 1 << 7;
        /// Escape
        const CLOSE = 1 << 8;
    }
}

impl HeldKeys {
    fn from_key(key: KeyCode) -> Self {
        match key {
            KeyCode::W => Self::FORWARD,
            KeyCode::S => Self::BACKWARD,
            KeyCode::D => Self::RIGHT,
            KeyCode::A => Self::LEFT,
            KeyCode::E => Self::UP,
            KeyCode::Q => Self::DOWN,
            KeyCode::Space => Self::TOGGLE_FREE_LOOK,
            KeyCode::R => Self::RESET,
            KeyCode::Escape => Self::CLOSE,
            KeyCode::Other => Self::empty(),
        }
    }

    /// Un-normalised camera-space movement: x = right, y = up, z = forward
    fn movement(self) -> Vec3 {
        let axis = |positive: Self, negative: Self| {
            f32::from(u8::from(self.contains(positive))) - f32::from(u8::from(self.contains(negative)))
        };
        Vec3::new(
            axis(Self::RIGHT, Self::LEFT),
            axis(Self::UP, Self::DOWN),
            axis(Self::FORWARD, Self::BACKWARD),
        )
    }
}

/// Keyboard and cursor state accumulated between ticks
#[derive(Debug, Clone)]
pub struct InputState {
    held: HeldKeys,
    free_look: bool,
    reset_requested: bool,
    close_requested: bool,
    last_cursor: Option<Vec2>,
    pending_delta: Vec2,
    look: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    /// Create an input state with free-look enabled and nothing held
    pub fn new() -> Self {
        Self {
            held: HeldKeys::empty(),
            free_look: true,
            reset_requested: false,
            close_requested: false,
            last_cursor: None,
            pending_delta: Vec2::zeros(),
            look: Vec2::zeros(),
        }
    }

    /// Handle a key press or release
    ///
    /// Space and R act once per press; holding them does nothing more.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let flag = HeldKeys::from_key(key);
        if flag.is_empty() {
            return;
        }

        if !pressed {
            self.held.remove(flag);
            return;
        }

        let first_press = !self.held.contains(flag);
        self.held.insert(flag);
        if !first_press {
            return;
        }

        match key {
            KeyCode::Space => {
                self.free_look = !self.free_look;
                log::debug!("Free-look {}", if self.free_look { "enabled" } else { "disabled" });
            }
            KeyCode::R => self.reset_requested = true,
            KeyCode::Escape => self.close_requested = true,
            _ => {}
        }
    }

    /// Handle an absolute cursor position in window pixels
    pub fn handle_cursor_position(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(last) = self.last_cursor {
            self.pending_delta += position - last;
        }
        self.last_cursor = Some(position);
    }

    /// Whether the key bound to `key` is held
    pub fn is_held(&self, key: KeyCode) -> bool {
        let flag = HeldKeys::from_key(key);
        !flag.is_empty() && self.held.contains(flag)
    }

    /// Whether free-look is active
    pub fn free_look(&self) -> bool {
        self.free_look
    }

    /// Whether Escape has been pressed
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Produce this tick's camera input and start a new tick
    ///
    /// The look delta is the average of the previous tick's delta and the
    /// cursor motion since then (screen y flipped so up looks up). It is zero
    /// while free-look is off.
    pub fn update(&mut self) -> CameraInput {
        let movement = self.held.movement().try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);

        let delta = std::mem::replace(&mut self.pending_delta, Vec2::zeros());
        self.look = if self.free_look {
            (self.look + Vec2::new(delta.x, -delta.y)) / 2.0
        } else {
            Vec2::zeros()
        };

        CameraInput {
            movement,
            look: self.look,
            free_look: self.free_look,
            reset: std::mem::take(&mut self.reset_requested),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_movement_is_normalised() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::W, true);
        input.handle_key(KeyCode::D, true);

        let tick = input.update();
        assert_relative_eq!(tick.movement.norm(), 1.0, epsilon = 1e-6);
        assert!(tick.movement.x > 0.0 && tick.movement.z > 0.0);

        input.handle_key(KeyCode::W, false);
        input.handle_key(KeyCode::D, false);
        assert_eq!(input.update().movement, Vec3::zeros());
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::Q, true);
        input.handle_key(KeyCode::E, true);
        assert_eq!(input.update().movement, Vec3::zeros());
    }

    #[test]
    fn test_free_look_toggle_is_edge_triggered() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::Space, true);
        input.handle_key(KeyCode::Space, true);
        assert!(!input.free_look());

        input.handle_key(KeyCode::Space, false);
        input.handle_key(KeyCode::Space, true);
        assert!(input.free_look());
    }

    #[test]
    fn test_reset_fires_once() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::R, true);
        assert!(input.update().reset);
        assert!(!input.update().reset);
    }

    #[test]
    fn test_look_delta_is_smoothed_and_flipped() {
        let mut input = InputState::new();
        input.handle_cursor_position(100.0, 100.0);
        input.handle_cursor_position(104.0, 96.0);

        let first = input.update();
        assert_relative_eq!(first.look, Vec2::new(2.0, 2.0));

        let second = input.update();
        assert_relative_eq!(second.look, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_look_is_zero_without_free_look() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::Space, true);
        input.handle_cursor_position(0.0, 0.0);
        input.handle_cursor_position(50.0, 0.0);

        let tick = input.update();
        assert_eq!(tick.look, Vec2::zeros());
        assert!(!tick.free_look);
    }

    #[test]
    fn test_escape_requests_close() {
        let mut input = InputState::new();
        assert!(!input.close_requested());
        input.handle_key(KeyCode::Escape, true);
        assert!(input.close_requested());
        input.handle_key(KeyCode::Other, true);
        assert!(!input.is_held(KeyCode::Other));
    }
}
