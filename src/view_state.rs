/// Toggles and speed shared between the keyboard handler and the frame loop.
///
/// There is exactly one instance, owned by the running app. Key handling
/// mutates it through `&mut`; each frame reads it through `&`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub orbit_enabled: bool,
    pub wireframe_enabled: bool,
    pub animate_x: bool,
    pub animate_y: bool,
    speed_factor: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            orbit_enabled: true,
            wireframe_enabled: false,
            animate_x: false,
            animate_y: false,
            speed_factor: 1.0,
        }
    }
}

impl ViewState {
    pub const SPEED_UP: f32 = 1.1;
    pub const SLOW_DOWN: f32 = 0.9;

    pub fn new() -> Self {
        Self::default()
    }

    /// Ball spin per frame, in degrees. Always strictly positive.
    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Multiplies the speed factor by `factor`.
    ///
    /// Non-positive or non-finite factors are ignored. The result is
    /// clamped to `f32::MIN_POSITIVE` so repeated slow-downs approach zero
    /// without ever reaching it.
    pub fn scale_speed(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.speed_factor = (self.speed_factor * factor).clamp(f32::MIN_POSITIVE, f32::MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let view = ViewState::new();
        assert!(view.orbit_enabled);
        assert!(!view.wireframe_enabled);
        assert!(!view.animate_x);
        assert!(!view.animate_y);
        assert_eq!(view.speed_factor(), 1.0);
    }

    #[test]
    fn speed_never_reaches_zero() {
        let mut view = ViewState::new();
        for _ in 0..10_000 {
            view.scale_speed(ViewState::SLOW_DOWN);
        }
        assert!(view.speed_factor() > 0.0);
    }

    #[test]
    fn invalid_factors_are_ignored() {
        let mut view = ViewState::new();
        view.scale_speed(0.0);
        view.scale_speed(-2.0);
        view.scale_speed(f32::NAN);
        assert_eq!(view.speed_factor(), 1.0);
    }
}
