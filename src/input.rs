//! Keyboard commands and pointer tracking.
//!
//! Keyboard handling is command based: every key press is mapped to at
//! most one [`Command`] and applied immediately by the [`InputController`].
//! Pointer state (drag and scroll) is accumulated per frame in [`Input`] and
//! consumed by the orbit camera.

use glam::Vec2;
use tracing::{debug, info};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::goal::GoalScene;
use crate::scene_graph::SceneGraph;
use crate::view_state::ViewState;

/// An action bound to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `o`
    ToggleOrbit,
    /// `w`
    ToggleWireframe,
    /// `+` or ArrowUp
    SpeedUp,
    /// `-` or ArrowDown
    SlowDown,
    /// `1`
    ToggleAnimateX,
    /// `2`
    ToggleAnimateY,
    /// `3`
    Shrink,
}

impl Command {
    /// Maps a logical key to its command. Unbound keys yield `None`.
    ///
    /// ```
    /// use goalpost::Command;
    /// use winit::keyboard::{Key, NamedKey};
    ///
    /// assert_eq!(Command::from_key(&Key::Character("w".into())), Some(Command::ToggleWireframe));
    /// assert_eq!(Command::from_key(&Key::Named(NamedKey::ArrowUp)), Some(Command::SpeedUp));
    /// assert_eq!(Command::from_key(&Key::Character("q".into())), None);
    /// ```
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(text) => match text.as_str() {
                "o" => Some(Self::ToggleOrbit),
                "w" => Some(Self::ToggleWireframe),
                "+" => Some(Self::SpeedUp),
                "-" => Some(Self::SlowDown),
                "1" => Some(Self::ToggleAnimateX),
                "2" => Some(Self::ToggleAnimateY),
                "3" => Some(Self::Shrink),
                _ => None,
            },
            Key::Named(NamedKey::ArrowUp) => Some(Self::SpeedUp),
            Key::Named(NamedKey::ArrowDown) => Some(Self::SlowDown),
            _ => None,
        }
    }
}

/// Applies keyboard commands to the view state and the goal.
pub struct InputController {
    goal: GoalScene,
}

impl InputController {
    pub fn new(goal: GoalScene) -> Self {
        Self { goal }
    }

    /// Handles one key press. Returns the command that ran, if any.
    pub fn handle_key(
        &self,
        key: &Key,
        view: &mut ViewState,
        scene: &mut SceneGraph,
    ) -> Option<Command> {
        let command = Command::from_key(key)?;
        self.apply(command, view, scene);
        Some(command)
    }

    pub fn apply(&self, command: Command, view: &mut ViewState, scene: &mut SceneGraph) {
        match command {
            Command::ToggleOrbit => {
                view.orbit_enabled = !view.orbit_enabled;
                info!(enabled = view.orbit_enabled, "orbit control");
            }
            Command::ToggleWireframe => {
                let goal_meshes = scene.toggle_wireframe(self.goal.goal);
                let ball_meshes = scene.toggle_wireframe(self.goal.ball);
                view.wireframe_enabled = !view.wireframe_enabled;
                info!(
                    enabled = view.wireframe_enabled,
                    meshes = goal_meshes + ball_meshes,
                    "wireframe"
                );
            }
            Command::SpeedUp => {
                view.scale_speed(ViewState::SPEED_UP);
                debug!(speed = view.speed_factor(), "speed up");
            }
            Command::SlowDown => {
                view.scale_speed(ViewState::SLOW_DOWN);
                debug!(speed = view.speed_factor(), "slow down");
            }
            Command::ToggleAnimateX => {
                view.animate_x = !view.animate_x;
                info!(enabled = view.animate_x, "spin about x");
            }
            Command::ToggleAnimateY => {
                view.animate_y = !view.animate_y;
                info!(enabled = view.animate_y, "spin about y");
            }
            Command::Shrink => {
                self.goal.shrink(scene);
                debug!("goal shrunk");
            }
        }
    }
}

/// Tracks pointer state for the orbit camera.
#[derive(Debug, Default)]
pub struct Input {
    left_down: bool,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a window event and update pointer state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.set_left_button(*state == ElementState::Pressed),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
                self.scrolled(d);
            }
            WindowEvent::Focused(false) => {
                self.left_down = false;
            }
            _ => {}
        }
    }

    fn set_left_button(&mut self, down: bool) {
        self.left_down = down;
    }

    fn cursor_moved(&mut self, position: Vec2) {
        // The first sample after entering the window has nothing to diff against.
        if let Some(previous) = self.mouse_position {
            self.mouse_delta += position - previous;
        }
        self.mouse_position = Some(position);
    }

    fn scrolled(&mut self, delta: Vec2) {
        self.scroll_delta += delta;
    }

    /// Returns true while the left mouse button is held.
    pub fn dragging(&self) -> bool {
        self.left_down
    }

    /// Mouse movement delta this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel delta this frame (in "lines").
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}
