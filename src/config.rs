use std::path::PathBuf;

use crate::color::Color;

/// Window and scene options, set before the app starts.
///
/// ```
/// use goalpost::{AppConfig, Color};
///
/// let config = AppConfig::new()
///     .title("Penalty")
///     .size(1024, 768)
///     .background(Color::BLACK)
///     .axes(80.0);
/// assert_eq!(config.axes, Some(80.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// Image for the flag. `None` uses the built-in banner.
    pub flag_texture: Option<PathBuf>,
    /// Length of the axes helper, if shown.
    pub axes: Option<f32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Goalpost".to_string(),
            width: 1280,
            height: 720,
            background: Color::FOREST_GREEN,
            flag_texture: None,
            axes: None,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_AXES_LENGTH: f32 = 100.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn flag_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.flag_texture = Some(path.into());
        self
    }

    /// Shows the axes helper with the given length. Non-positive or
    /// non-finite lengths hide it.
    pub fn axes(mut self, length: f32) -> Self {
        self.axes = (length.is_finite() && length > 0.0).then_some(length);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stadium_scene() {
        let config = AppConfig::default();
        assert_eq!(config.background, Color::FOREST_GREEN);
        assert_eq!(config.flag_texture, None);
        assert_eq!(config.axes, None);
        assert!(config.width > 0 && config.height > 0);
    }

    #[test]
    fn invalid_axes_length_hides_helper() {
        assert_eq!(AppConfig::new().axes(0.0).axes, None);
        assert_eq!(AppConfig::new().axes(-5.0).axes, None);
        assert_eq!(AppConfig::new().axes(f32::NAN).axes, None);
        assert_eq!(AppConfig::new().axes(12.5).axes, Some(12.5));
    }

    #[test]
    fn flag_path_is_kept() {
        let config = AppConfig::new().flag_texture("assets/flag.png");
        assert_eq!(config.flag_texture, Some(PathBuf::from("assets/flag.png")));
    }
}
