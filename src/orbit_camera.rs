use glam::Vec3;

use crate::camera::Camera;
use crate::input::Input;

const ELEVATION_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// A camera controller that orbits around a target point.
///
/// Dragging with the left mouse button rotates around the target; the
/// scroll wheel dollies in and out. While [`enabled`](Self::enabled) is
/// false, input is ignored and the camera holds still.
///
/// # Example
/// ```ignore
/// let mut orbit = OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 150.0), Vec3::ZERO)
///     .fov(75.0);
///
/// // In frame loop:
/// orbit.enabled = view.orbit_enabled;
/// orbit.update(&input);
/// let camera = orbit.camera();
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), clamped to avoid gimbal lock.
    pub elevation: f32,
    /// Field of view in radians.
    pub fov: f32,
    /// Whether pointer input moves the camera.
    pub enabled: bool,
    /// Radians of rotation per pixel dragged.
    pub sensitivity: f32,
    /// Distance multiplier per scroll line.
    pub zoom_step: f32,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.0,
            fov: 75f32.to_radians(),
            enabled: true,
            sensitivity: 0.005,
            zoom_step: 0.95,
            min_distance: 0.5,
            max_distance: 1000.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// An orbit whose current camera sits at `position` looking at `target`.
    pub fn looking_from(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length();
        let (azimuth, elevation) = if distance > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / distance).clamp(-1.0, 1.0).asin(),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            target,
            ..Self::default()
        }
        .distance(distance)
        .azimuth(azimuth)
        .elevation(elevation)
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the distance from target.
    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Set the initial azimuth (horizontal angle) in radians.
    pub fn azimuth(mut self, azimuth: f32) -> Self {
        self.azimuth = azimuth;
        self
    }

    /// Set the initial elevation (vertical angle) in radians.
    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        self
    }

    /// Set distance limits.
    pub fn distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self.distance = self.distance.clamp(min, max);
        self
    }

    /// Apply this frame's pointer input. Must run once per frame.
    pub fn update(&mut self, input: &Input) {
        if !self.enabled {
            return;
        }

        if input.dragging() {
            let delta = input.mouse_delta();
            self.azimuth -= delta.x * self.sensitivity;
            self.elevation = (self.elevation + delta.y * self.sensitivity)
                .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        }

        let scroll = input.scroll_delta();
        if scroll.y != 0.0 {
            self.distance = (self.distance * self.zoom_step.powf(scroll.y))
                .clamp(self.min_distance, self.max_distance);
        }
    }

    /// Get the current camera state.
    pub fn camera(&self) -> Camera {
        // Spherical to Cartesian conversion
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );

        Camera::new()
            .at(self.target + offset)
            .looking_at(self.target)
            .with_fov(self.fov.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_from_reproduces_position() {
        let start = Vec3::new(30.0, 40.0, 120.0);
        let orbit = OrbitCamera::looking_from(start, Vec3::ZERO);

        let camera = orbit.camera();
        assert!(camera.position.abs_diff_eq(start, 1e-3));
        assert!(camera.forward.abs_diff_eq(-start.normalize(), 1e-5));
    }

    #[test]
    fn default_view_is_straight_down_the_z_axis() {
        let orbit = OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 150.0), Vec3::ZERO);
        assert_eq!(orbit.distance, 150.0);
        assert_eq!(orbit.azimuth, 0.0);
        assert_eq!(orbit.elevation, 0.0);
        assert!((orbit.camera().fov - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn idle_input_leaves_camera_alone() {
        let mut orbit = OrbitCamera::looking_from(Vec3::new(0.0, 0.0, 150.0), Vec3::ZERO);
        let before = orbit.camera();

        orbit.update(&Input::new());
        assert_eq!(orbit.camera(), before);
    }
}
