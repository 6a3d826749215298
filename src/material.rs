use crate::color::Color;

/// Type-safe handle to a texture slot owned by the renderer.
///
/// Slots are reserved before their image exists, so a material can point at
/// a texture that is still loading. Until the slot is filled the material
/// renders with a plain white map. The default id is the first slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// Which faces of a mesh are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    /// Counter-clockwise faces only; back faces are culled.
    #[default]
    Front,
    /// Both faces, for flat parts like nets and the flag.
    Double,
}

/// Unlit surface appearance of a mesh.
///
/// The final fragment color is `map * color`, with no lighting, so a white
/// material with no map renders as flat white.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub map: Option<TextureId>,
    pub side: Side,
    /// Draw polygon edges instead of filled faces.
    pub wireframe: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            side: Side::Front,
            wireframe: false,
        }
    }
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// A white material showing `texture`.
    pub fn textured(texture: TextureId) -> Self {
        Self {
            map: Some(texture),
            ..Default::default()
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }
}
