/// An RGBA color with components in sRGB space, each in `[0, 1]`.
///
/// Materials, line helpers and the clear color are all specified with this
/// type. Use [`Color::to_linear`] when handing a color to the GPU, since the
/// render target is an sRGB surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build an opaque color from 8-bit sRGB channels.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    /// CSS `lightgrey`.
    pub const LIGHT_GREY: Color = Color::from_rgb8(211, 211, 211);
    /// CSS `forestgreen`.
    pub const FOREST_GREEN: Color = Color::from_rgb8(34, 139, 34);

    /// Convert to linear RGB, leaving alpha untouched.
    pub fn to_linear(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a,
        ]
    }

    /// Linear color as a wgpu clear value.
    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }

    /// Parse `#rrggbb` or `rrggbb` hex notation.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#228b22"), Some(Color::FOREST_GREEN));
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color::WHITE.to_linear(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0, 1.0]);

        let [r, _, _, _] = Color::rgb(0.5, 0.0, 0.0).to_linear();
        assert!((r - 0.214).abs() < 0.001);
    }
}
