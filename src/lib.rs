//! # Goalpost
//!
//! **A soccer goal, a flag and a spinning ball, rendered with wgpu.**
//!
//! The scene is a small retained graph: a goal group holding posts,
//! crossbar, back supports, nets, rings and a textured flag, plus a ball
//! that orbits the origin when animated. Keyboard commands toggle orbit
//! control, wireframe and ball spin, change the spin speed and shrink the
//! goal.
//!
//! ## Quick Start
//!
//! ```no_run
//! use goalpost::{AppConfig, run};
//!
//! fn main() {
//!     run(AppConfig::new().flag_texture("flag.jpg")).unwrap();
//! }
//! ```
//!
//! ## Keys
//!
//! | Key | Effect |
//! |---|---|
//! | `o` | toggle orbit control |
//! | `w` | toggle wireframe on the goal and the ball |
//! | `+` / ArrowUp | spin 10% faster |
//! | `-` / ArrowDown | spin 10% slower |
//! | `1` / `2` | toggle spin about X / Y |
//! | `3` | shrink the goal by 5% |
//!
//! Everything except [`run`] works without a GPU, so the scene and the
//! controls can be driven directly:
//!
//! ```
//! use goalpost::*;
//! use winit::keyboard::Key;
//!
//! let mut scene = SceneGraph::new();
//! let goal = SceneAssembler::new(GoalDimensions::default())
//!     .assemble(&mut scene, TextureId::default());
//! let controller = InputController::new(goal);
//! let mut view = ViewState::new();
//!
//! controller.handle_key(&Key::Character("1".into()), &mut view, &mut scene);
//! assert!(view.animate_x);
//! ```

mod app;
mod camera;
mod color;
mod config;
mod error;
mod frame_loop;
mod geometry;
mod goal;
mod gpu;
mod input;
pub mod logging;
mod material;
mod mesh;
mod mesh_pass;
mod orbit_camera;
mod scene_graph;
mod texture;
mod view_state;

pub use app::run;
pub use camera::Camera;
pub use color::Color;
pub use config::AppConfig;
pub use error::AppError;
pub use frame_loop::FrameLoop;
pub use geometry::RawGeometry;
pub use goal::{
    Axis, GoalDimensions, GoalScene, SceneAssembler, add_axes_helper, degrees_to_radians, pose,
};
pub use gpu::GpuContext;
pub use input::{Command, Input, InputController};
pub use material::{Material, Side, TextureId};
pub use mesh::{Mesh, Vertex3d};
pub use mesh_pass::MeshPass;
pub use orbit_camera::OrbitCamera;
pub use scene_graph::{NodeId, NodeKind, SceneGraph, SceneNode};
pub use texture::{DecodedImage, PendingTexture, Texture, TextureError};
pub use view_state::ViewState;

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3};
