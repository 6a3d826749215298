//! Per-frame scene update.
//!
//! Everything here runs without a GPU. The app calls [`FrameLoop::update`]
//! once per redraw, then syncs and renders the scene.

use crate::goal::Axis;
use crate::input::Input;
use crate::orbit_camera::OrbitCamera;
use crate::scene_graph::{NodeId, SceneGraph};
use crate::view_state::ViewState;

/// Drives the ball spin and the orbit camera.
pub struct FrameLoop {
    ball: NodeId,
    frames: u64,
}

impl FrameLoop {
    pub fn new(ball: NodeId) -> Self {
        Self { ball, frames: 0 }
    }

    /// Number of frames updated so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances one frame.
    ///
    /// The orbit flag is pushed to the controller first so a toggle takes
    /// effect on the same frame. Spin about X is applied before spin about
    /// Y, both by `speed_factor` degrees around the origin.
    pub fn update(
        &mut self,
        view: &ViewState,
        scene: &mut SceneGraph,
        orbit: &mut OrbitCamera,
        input: &Input,
    ) {
        orbit.enabled = view.orbit_enabled;

        let speed = view.speed_factor();
        if view.animate_x {
            scene.apply_matrix(self.ball, Axis::X.rotation(speed));
        }
        if view.animate_y {
            scene.apply_matrix(self.ball, Axis::Y.rotation(speed));
        }

        orbit.update(input);
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::{dragged, press, setup};
    use glam::{Mat4, Vec2, Vec3};

    fn orbit() -> OrbitCamera {
        OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 150.0), Vec3::ZERO)
    }

    #[test]
    fn idle_frames_leave_ball_in_place() {
        let (mut scene, goal, _, view) = setup();
        let start = scene.node(goal.ball).local;
        let mut frames = FrameLoop::new(goal.ball);
        let mut orbit = orbit();

        for _ in 0..10 {
            frames.update(&view, &mut scene, &mut orbit, &Input::new());
        }
        assert_eq!(scene.node(goal.ball).local, start);
        assert_eq!(frames.frames(), 10);
    }

    #[test]
    fn spin_follows_speed_changes() {
        let (mut scene, goal, controller, mut view) = setup();
        let mut frames = FrameLoop::new(goal.ball);
        let mut orbit = orbit();
        let start = scene.node(goal.ball).local;

        press(&controller, "1", &mut view, &mut scene);
        frames.update(&view, &mut scene, &mut orbit, &Input::new());
        press(&controller, "-", &mut view, &mut scene);
        frames.update(&view, &mut scene, &mut orbit, &Input::new());

        let expected = Mat4::from_rotation_x(1.9f32.to_radians()) * start;
        assert!(scene.node(goal.ball).local.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn both_axes_apply_x_then_y() {
        let (mut scene, goal, controller, mut view) = setup();
        let mut frames = FrameLoop::new(goal.ball);
        let mut orbit = orbit();
        let start = scene.node(goal.ball).local;

        press(&controller, "1", &mut view, &mut scene);
        press(&controller, "2", &mut view, &mut scene);
        frames.update(&view, &mut scene, &mut orbit, &Input::new());

        let one = 1f32.to_radians();
        let expected = Mat4::from_rotation_y(one) * Mat4::from_rotation_x(one) * start;
        assert!(scene.node(goal.ball).local.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn ball_orbits_the_origin() {
        let (mut scene, goal, controller, mut view) = setup();
        let mut frames = FrameLoop::new(goal.ball);
        let mut orbit = orbit();
        let radius = scene.world_matrix(goal.ball).transform_point3(Vec3::ZERO).length();

        press(&controller, "2", &mut view, &mut scene);
        for _ in 0..90 {
            frames.update(&view, &mut scene, &mut orbit, &Input::new());
        }

        let center = scene.world_matrix(goal.ball).transform_point3(Vec3::ZERO);
        assert!((center.length() - radius).abs() < 1e-2);
        assert!(center.abs_diff_eq(Vec3::new(radius, 0.0, 0.0), 1e-2));
    }

    #[test]
    fn disabled_orbit_ignores_drag() {
        let (mut scene, goal, controller, mut view) = setup();
        let mut frames = FrameLoop::new(goal.ball);
        let mut orbit = orbit();
        let before = orbit.camera();

        let input = dragged(Vec2::new(100.0, 100.0), Vec2::new(160.0, 80.0));

        press(&controller, "o", &mut view, &mut scene);
        frames.update(&view, &mut scene, &mut orbit, &input);
        assert!(!orbit.enabled);
        assert_eq!(orbit.camera(), before);

        press(&controller, "o", &mut view, &mut scene);
        frames.update(&view, &mut scene, &mut orbit, &input);
        assert!(orbit.enabled);
        assert_ne!(orbit.camera(), before);
    }
}
