//! Builds the soccer goal, its flag and the ball into a [`SceneGraph`].
//!
//! Every part is a freshly generated primitive posed by one composed
//! matrix: a translation to the part's offset, optionally post-multiplied by
//! a rotation about a single principal axis (`T * R`). The matrix is applied
//! once when the part is created; afterwards only the goal group (shrink)
//! and the ball (spin) are ever transformed again.
//!
//! ```text
//! scene
//! ├── goal
//! │   ├── post right ── ring
//! │   ├── post left ── ring
//! │   ├── crossbar
//! │   ├── back support right ── ring
//! │   ├── back support left ── ring
//! │   ├── back net
//! │   ├── triangle net left / right
//! │   └── flag
//! ├── ball
//! └── axes (optional)
//! ```

use glam::{Mat4, Vec2, Vec3};
use tracing::debug;

use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::material::{Material, TextureId};
use crate::scene_graph::{NodeId, SceneGraph};

/// Converts degrees to radians: `degrees * PI / 180`.
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

/// A principal axis for single-axis rotations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Rotation about this axis by `degrees`.
    pub fn rotation(self, degrees: f32) -> Mat4 {
        let radians = degrees_to_radians(degrees);
        match self {
            Axis::X => Mat4::from_rotation_x(radians),
            Axis::Y => Mat4::from_rotation_y(radians),
            Axis::Z => Mat4::from_rotation_z(radians),
        }
    }
}

/// Translation to `offset`, followed in the part's own frame by an optional
/// rotation about one axis.
pub fn pose(offset: Vec3, rotation: Option<(Axis, f32)>) -> Mat4 {
    let translation = Mat4::from_translation(offset);
    match rotation {
        Some((axis, degrees)) => translation * axis.rotation(degrees),
        None => translation,
    }
}

/// Every size, offset and angle of the goal fixture.
///
/// The default is the regulation layout: a 120 x 40 mouth with posts at
/// x = +-59.5, back supports leaning 30 degrees and a 120 x 20 banner
/// above the crossbar.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalDimensions {
    pub post_x: f32,
    pub post_height: f32,
    pub bar_radius: f32,
    pub radial_segments: u32,
    pub crossbar_y: f32,
    pub crossbar_length: f32,
    pub support_z: f32,
    pub support_length: f32,
    pub support_tilt: f32,
    pub net_width: f32,
    pub triangle_base: f32,
    pub triangle_y: f32,
    pub ring_radius: f32,
    pub ring_tube: f32,
    pub ring_radial_segments: u32,
    pub ring_tubular_segments: u32,
    pub post_ring_tilt: f32,
    pub post_ring_y: f32,
    pub support_ring_tilt: f32,
    pub support_ring_y: f32,
    pub flag_width: f32,
    pub flag_height: f32,
    pub flag_y: f32,
    pub ball_radius: f32,
    pub ball_width_segments: u32,
    pub ball_height_segments: u32,
    pub ball_z: f32,
    pub shrink_factor: f32,
    pub frame_color: Color,
    pub net_color: Color,
    pub ball_color: Color,
}

impl Default for GoalDimensions {
    fn default() -> Self {
        Self {
            post_x: 59.5,
            post_height: 40.0,
            bar_radius: 1.0,
            radial_segments: 15,
            crossbar_y: 19.5,
            crossbar_length: 120.0,
            support_z: -11.547,
            support_length: 46.188,
            support_tilt: 30.0,
            net_width: 120.0,
            triangle_base: 23.094,
            triangle_y: -20.0,
            ring_radius: 1.0,
            ring_tube: 1.0,
            ring_radial_segments: 15,
            ring_tubular_segments: 40,
            post_ring_tilt: 90.0,
            post_ring_y: -20.0,
            support_ring_tilt: 60.0,
            support_ring_y: -23.094,
            flag_width: 120.0,
            flag_height: 20.0,
            flag_y: 30.0,
            ball_radius: 2.5,
            ball_width_segments: 30,
            ball_height_segments: 15,
            ball_z: 40.0,
            shrink_factor: 0.95,
            frame_color: Color::WHITE,
            net_color: Color::LIGHT_GREY,
            ball_color: Color::BLACK,
        }
    }
}

/// Handles to the assembled parts that are touched after startup.
#[derive(Clone, Copy, Debug)]
pub struct GoalScene {
    pub goal: NodeId,
    pub ball: NodeId,
    pub flag: NodeId,
    shrink: Mat4,
}

impl GoalScene {
    /// Scales the whole goal by the cached shrink factor.
    ///
    /// Not idempotent: every call compounds on the previous scale.
    pub fn shrink(&self, scene: &mut SceneGraph) {
        scene.apply_matrix(self.goal, self.shrink);
    }

    /// The matrix applied by [`GoalScene::shrink`].
    pub fn shrink_matrix(&self) -> Mat4 {
        self.shrink
    }
}

/// Builds the goal hierarchy and the ball from a [`GoalDimensions`].
pub struct SceneAssembler {
    dims: GoalDimensions,
}

impl SceneAssembler {
    pub fn new(dims: GoalDimensions) -> Self {
        Self { dims }
    }

    /// Adds the goal group and the ball under the scene root.
    ///
    /// `flag_texture` is the slot the banner material samples; it does not
    /// need to be loaded yet.
    pub fn assemble(&self, scene: &mut SceneGraph, flag_texture: TextureId) -> GoalScene {
        let d = &self.dims;
        let root = scene.root();
        let goal = scene.add_group(root, "goal");

        let post_right = self.post(scene, goal, "post right", d.post_x);
        let post_left = self.post(scene, goal, "post left", -d.post_x);
        self.crossbar(scene, goal);
        let support_right = self.back_support(scene, goal, "back support right", d.post_x);
        let support_left = self.back_support(scene, goal, "back support left", -d.post_x);
        self.back_net(scene, goal);
        self.triangle_net(scene, goal, "triangle net left", -d.post_x);
        self.triangle_net(scene, goal, "triangle net right", d.post_x);

        self.ring(scene, post_right, d.post_ring_tilt, d.post_ring_y);
        self.ring(scene, post_left, d.post_ring_tilt, d.post_ring_y);
        self.ring(scene, support_right, d.support_ring_tilt, d.support_ring_y);
        self.ring(scene, support_left, d.support_ring_tilt, d.support_ring_y);

        let flag = self.flag(scene, goal, flag_texture);
        let ball = self.ball(scene, root);

        debug!(nodes = scene.len(), "goal assembled");

        GoalScene {
            goal,
            ball,
            flag,
            shrink: Mat4::from_scale(Vec3::splat(d.shrink_factor)),
        }
    }

    fn frame_material(&self) -> Material {
        Material::new(self.dims.frame_color)
    }

    fn net_material(&self) -> Material {
        Material::new(self.dims.net_color).double_sided()
    }

    fn place(
        scene: &mut SceneGraph,
        parent: NodeId,
        name: &str,
        geometry: RawGeometry,
        material: Material,
        matrix: Mat4,
    ) -> NodeId {
        let id = scene.add_mesh(parent, name, geometry, material);
        scene.apply_matrix(id, matrix);
        id
    }

    fn post(&self, scene: &mut SceneGraph, goal: NodeId, name: &str, x: f32) -> NodeId {
        let d = &self.dims;
        Self::place(
            scene,
            goal,
            name,
            RawGeometry::cylinder(d.bar_radius, d.bar_radius, d.post_height, d.radial_segments),
            self.frame_material(),
            pose(Vec3::new(x, 0.0, 0.0), None),
        )
    }

    fn crossbar(&self, scene: &mut SceneGraph, goal: NodeId) -> NodeId {
        let d = &self.dims;
        Self::place(
            scene,
            goal,
            "crossbar",
            RawGeometry::cylinder(d.bar_radius, d.bar_radius, d.crossbar_length, d.radial_segments),
            self.frame_material(),
            pose(Vec3::new(0.0, d.crossbar_y, 0.0), Some((Axis::Z, 90.0))),
        )
    }

    fn back_support(&self, scene: &mut SceneGraph, goal: NodeId, name: &str, x: f32) -> NodeId {
        let d = &self.dims;
        Self::place(
            scene,
            goal,
            name,
            RawGeometry::cylinder(d.bar_radius, d.bar_radius, d.support_length, d.radial_segments),
            self.frame_material(),
            pose(Vec3::new(x, 0.0, d.support_z), Some((Axis::X, d.support_tilt))),
        )
    }

    fn back_net(&self, scene: &mut SceneGraph, goal: NodeId) -> NodeId {
        let d = &self.dims;
        Self::place(
            scene,
            goal,
            "back net",
            RawGeometry::plane(d.net_width, d.support_length),
            self.net_material(),
            pose(Vec3::new(0.0, 0.0, d.support_z), Some((Axis::X, d.support_tilt))),
        )
    }

    fn triangle_net(&self, scene: &mut SceneGraph, goal: NodeId, name: &str, x: f32) -> NodeId {
        let d = &self.dims;
        let outline = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, d.post_height),
            Vec2::new(d.triangle_base, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        Self::place(
            scene,
            goal,
            name,
            RawGeometry::shape(&outline),
            self.net_material(),
            pose(Vec3::new(x, d.triangle_y, 0.0), Some((Axis::Y, 90.0))),
        )
    }

    fn ring(&self, scene: &mut SceneGraph, target: NodeId, tilt: f32, y: f32) -> NodeId {
        let d = &self.dims;
        let name = format!("{} ring", scene.node(target).name);
        Self::place(
            scene,
            target,
            &name,
            RawGeometry::torus(
                d.ring_radius,
                d.ring_tube,
                d.ring_radial_segments,
                d.ring_tubular_segments,
            ),
            self.frame_material().double_sided(),
            pose(Vec3::new(0.0, y, 0.0), Some((Axis::X, tilt))),
        )
    }

    fn flag(&self, scene: &mut SceneGraph, goal: NodeId, texture: TextureId) -> NodeId {
        let d = &self.dims;
        Self::place(
            scene,
            goal,
            "flag",
            RawGeometry::plane(d.flag_width, d.flag_height),
            Material::textured(texture).double_sided(),
            pose(Vec3::new(0.0, d.flag_y, 0.0), None),
        )
    }

    fn ball(&self, scene: &mut SceneGraph, root: NodeId) -> NodeId {
        let d = &self.dims;
        Self::place(
            scene,
            root,
            "ball",
            RawGeometry::sphere(d.ball_radius, d.ball_width_segments, d.ball_height_segments),
            Material::new(d.ball_color),
            pose(Vec3::new(0.0, 0.0, d.ball_z), None),
        )
    }
}

/// Adds red, green and blue line segments along +X, +Y and +Z under the
/// scene root, grouped under one `axes` node.
pub fn add_axes_helper(scene: &mut SceneGraph, length: f32) -> NodeId {
    let axes = scene.add_group(scene.root(), "axes");
    for (name, axis, color) in [
        ("axis x", Vec3::X, Color::RED),
        ("axis y", Vec3::Y, Color::GREEN),
        ("axis z", Vec3::Z, Color::BLUE),
    ] {
        scene.add_lines(axes, name, RawGeometry::axis_segment(axis, length), color);
    }
    axes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Side;

    fn assembled() -> (SceneGraph, GoalScene) {
        let mut scene = SceneGraph::new();
        let goal = SceneAssembler::new(GoalDimensions::default()).assemble(&mut scene, TextureId(0));
        (scene, goal)
    }

    fn world_origin(scene: &SceneGraph, id: NodeId) -> Vec3 {
        scene.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    fn node(scene: &SceneGraph, name: &str) -> NodeId {
        scene
            .find(name)
            .unwrap_or_else(|| panic!("no node named {name:?}"))
    }

    #[test]
    fn degrees_to_radians_is_linear() {
        assert_eq!(degrees_to_radians(0.0), 0.0);
        assert!((degrees_to_radians(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((degrees_to_radians(-90.0) + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn pose_rotates_in_part_frame() {
        // The rotation happens before the translation, so the part turns
        // around its own center and then moves.
        let m = pose(Vec3::new(0.0, 19.5, 0.0), Some((Axis::Z, 90.0)));
        let tip = m.transform_point3(Vec3::new(0.0, 60.0, 0.0));
        assert!(tip.abs_diff_eq(Vec3::new(-60.0, 19.5, 0.0), 1e-3));
    }

    #[test]
    fn goal_holds_every_part() {
        let (scene, handles) = assembled();

        let meshes: Vec<NodeId> = scene
            .traverse(handles.goal)
            .into_iter()
            .filter(|&id| scene.node(id).has_material())
            .collect();
        // 2 posts, crossbar, 2 supports, back net, 2 triangle nets, 4 rings, flag.
        assert_eq!(meshes.len(), 13);

        let root_children = scene.node(scene.root()).children();
        assert_eq!(root_children, &[handles.goal, handles.ball]);
        assert_eq!(scene.node(handles.flag).parent(), Some(handles.goal));
    }

    #[test]
    fn rings_hang_off_posts_and_supports() {
        let (scene, _) = assembled();

        for target in [
            "post right",
            "post left",
            "back support right",
            "back support left",
        ] {
            let parent = node(&scene, target);
            let ring = node(&scene, &format!("{target} ring"));
            assert_eq!(scene.node(ring).parent(), Some(parent));
        }

        let post_ring = world_origin(&scene, node(&scene, "post right ring"));
        assert!(post_ring.abs_diff_eq(Vec3::new(59.5, -20.0, 0.0), 1e-3));
    }

    #[test]
    fn support_ring_sits_at_support_foot() {
        let (scene, _) = assembled();

        // The support leans back 30 degrees about X, so its local -Y end
        // lands on the ground behind the goal line.
        let ring = world_origin(&scene, node(&scene, "back support left ring"));
        let tilt = degrees_to_radians(30.0);
        let expected = Vec3::new(-59.5, -23.094 * tilt.cos(), -11.547 - 23.094 * tilt.sin());
        assert!(ring.abs_diff_eq(expected, 1e-3));
        assert!((ring.y + 20.0).abs() < 0.01);
        assert!((ring.z + 23.094).abs() < 0.01);

        // The other end meets the top of the post.
        let support = scene.world_matrix(node(&scene, "back support left"));
        let top = support.transform_point3(Vec3::new(0.0, 23.094, 0.0));
        assert!(top.abs_diff_eq(Vec3::new(-59.5, 20.0, 0.0), 0.01));
    }

    #[test]
    fn crossbar_spans_between_posts() {
        let (scene, _) = assembled();
        let crossbar = node(&scene, "crossbar");
        let world = scene.world_matrix(crossbar);

        let top = world.transform_point3(Vec3::new(0.0, 60.0, 0.0));
        let bottom = world.transform_point3(Vec3::new(0.0, -60.0, 0.0));
        assert!(top.abs_diff_eq(Vec3::new(-60.0, 19.5, 0.0), 1e-3));
        assert!(bottom.abs_diff_eq(Vec3::new(60.0, 19.5, 0.0), 1e-3));
    }

    #[test]
    fn materials_follow_fixture() {
        let (scene, handles) = assembled();

        let material = |name: &str| *scene.node(node(&scene, name)).material().unwrap();

        assert_eq!(material("post left").color, Color::WHITE);
        assert_eq!(material("post left").side, Side::Front);
        assert_eq!(material("back net").color, Color::LIGHT_GREY);
        assert_eq!(material("back net").side, Side::Double);
        assert_eq!(material("triangle net right").side, Side::Double);
        assert_eq!(material("post left ring").side, Side::Double);
        assert_eq!(material("flag").map, Some(TextureId(0)));
        assert_eq!(material("flag").side, Side::Double);
        assert_eq!(material("ball").color, Color::BLACK);

        let ball = world_origin(&scene, handles.ball);
        assert_eq!(ball, Vec3::new(0.0, 0.0, 40.0));
        let flag = world_origin(&scene, handles.flag);
        assert_eq!(flag, Vec3::new(0.0, 30.0, 0.0));
    }

    #[test]
    fn shrink_compounds() {
        let (mut scene, handles) = assembled();

        for n in 1..=5 {
            handles.shrink(&mut scene);
            let (scale, _, _) = scene.node(handles.goal).local.to_scale_rotation_translation();
            let expected = 0.95f32.powi(n);
            assert!(scale.abs_diff_eq(Vec3::splat(expected), 1e-5), "after {n}: {scale:?}");
        }

        // The ball is not part of the goal and keeps its size.
        let (ball_scale, _, _) = scene.world_matrix(handles.ball).to_scale_rotation_translation();
        assert!(ball_scale.abs_diff_eq(Vec3::ONE, 1e-6));
    }

    #[test]
    fn axes_helper_is_lines_only() {
        let (mut scene, _) = assembled();
        let axes = add_axes_helper(&mut scene, 50.0);

        let parts = scene.traverse(axes);
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|&id| !scene.node(id).has_material()));
    }
}
