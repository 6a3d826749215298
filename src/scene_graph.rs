//! A small retained scene graph.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and are addressed by
//! [`NodeId`]. Each node stores a local matrix relative to its parent; the
//! renderer walks the tree once per frame to get world matrices. Nodes are
//! only ever added, never removed, so a `NodeId` stays valid for the life of
//! the graph that issued it.
//!
//! ```
//! use goalpost::{Color, Mat4, Material, RawGeometry, SceneGraph, Vec3};
//!
//! let mut scene = SceneGraph::new();
//! let goal = scene.add_group(scene.root(), "goal");
//! let post = scene.add_mesh(
//!     goal,
//!     "post",
//!     RawGeometry::cylinder(1.0, 1.0, 40.0, 15),
//!     Material::new(Color::WHITE),
//! );
//! scene.apply_matrix(post, Mat4::from_translation(Vec3::X * 59.5));
//! scene.apply_matrix(goal, Mat4::from_scale(Vec3::splat(0.5)));
//!
//! let world = scene.world_matrix(post);
//! assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(29.75, 0.0, 0.0));
//! ```

use glam::Mat4;

use crate::color::Color;
use crate::geometry::RawGeometry;
use crate::material::Material;

/// Handle to a node in a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the graph's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node is, decided when it is created.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// A pure transform node with no geometry of its own.
    Group,
    /// Filled triangle geometry with a material.
    Mesh {
        geometry: RawGeometry,
        material: Material,
    },
    /// Line segments with a single color, e.g. an axes helper.
    Lines { geometry: RawGeometry, color: Color },
}

/// A node in the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Human readable label, used in logs.
    pub name: String,
    pub kind: NodeKind,
    /// Transform relative to the parent node.
    pub local: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: impl Into<String>, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            kind,
            local: Mat4::IDENTITY,
            parent,
            children: Vec::new(),
        }
    }

    /// Whether this node carries a material. Only these nodes react to
    /// material toggles such as wireframe mode.
    pub fn has_material(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }

    pub fn material(&self) -> Option<&Material> {
        match &self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed scene graph with a single root group.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode::new("scene", NodeKind::Group, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node under `parent` and returns its handle.
    pub fn add(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(name, kind, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.add(parent, name, NodeKind::Group)
    }

    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        geometry: RawGeometry,
        material: Material,
    ) -> NodeId {
        self.add(parent, name, NodeKind::Mesh { geometry, material })
    }

    pub fn add_lines(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        geometry: RawGeometry,
        color: Color,
    ) -> NodeId {
        self.add(parent, name, NodeKind::Lines { geometry, color })
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by a different graph and is out of range.
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Premultiplies `matrix` onto the node's local transform.
    ///
    /// The matrix acts in the parent's frame, after whatever the node
    /// already had: a rotation applied to an offset node swings it around
    /// the parent origin, and repeated scales compound.
    pub fn apply_matrix(&mut self, id: NodeId, matrix: Mat4) {
        let node = &mut self.nodes[id.0];
        node.local = matrix * node.local;
    }

    /// Node transform relative to the scene root.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes[id.0].local;
        let mut parent = self.nodes[id.0].parent;
        while let Some(p) = parent {
            matrix = self.nodes[p.0].local * matrix;
            parent = self.nodes[p.0].parent;
        }
        matrix
    }

    /// World matrices of every node, indexed like the arena.
    ///
    /// Parents are always created before their children, so a single
    /// forward pass is enough.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut world = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let parent = node.parent.map_or(Mat4::IDENTITY, |p| world[p.0]);
            world.push(parent * node.local);
        }
        world
    }

    /// Depth-first, pre-order list of `id` and all its descendants.
    pub fn traverse(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        order
    }

    /// Flips the wireframe flag of every material under `id`, including
    /// `id` itself. Nodes without a material are left alone.
    ///
    /// Returns the number of materials changed.
    pub fn toggle_wireframe(&mut self, id: NodeId) -> usize {
        let mut toggled = 0;
        for node in self.traverse(id) {
            if let Some(material) = self.nodes[node.0].material_mut() {
                material.toggle_wireframe();
                toggled += 1;
            }
        }
        toggled
    }

    /// Finds the first node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn small_tree() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let group = scene.add_group(scene.root(), "group");
        let mesh = scene.add_mesh(
            group,
            "mesh",
            RawGeometry::plane(1.0, 1.0),
            Material::default(),
        );
        let lines = scene.add_lines(
            group,
            "lines",
            RawGeometry::axis_segment(Vec3::X, 1.0),
            Color::RED,
        );
        (scene, group, mesh, lines)
    }

    #[test]
    fn add_links_parent_and_children() {
        let (scene, group, mesh, lines) = small_tree();

        assert_eq!(scene.len(), 4);
        assert_eq!(scene.node(mesh).parent(), Some(group));
        assert_eq!(scene.node(group).children(), &[mesh, lines]);
        assert_eq!(scene.node(scene.root()).children(), &[group]);
        assert_eq!(scene.find("lines"), Some(lines));
        assert_eq!(scene.find("missing"), None);
    }

    #[test]
    fn traverse_is_preorder() {
        let (mut scene, group, mesh, lines) = small_tree();
        let nested = scene.add_group(mesh, "nested");

        assert_eq!(
            scene.traverse(scene.root()),
            vec![scene.root(), group, mesh, nested, lines]
        );
    }

    #[test]
    fn apply_matrix_premultiplies() {
        let mut scene = SceneGraph::new();
        let ball = scene.add_group(scene.root(), "ball");
        scene.apply_matrix(ball, Mat4::from_translation(Vec3::new(0.0, 0.0, 40.0)));
        scene.apply_matrix(ball, Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2));

        let p = scene.world_matrix(ball).transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, -40.0, 0.0), 1e-4));
    }

    #[test]
    fn world_matrices_match_world_matrix() {
        let (mut scene, group, mesh, _) = small_tree();
        scene.apply_matrix(group, Mat4::from_scale(Vec3::splat(2.0)));
        scene.apply_matrix(mesh, Mat4::from_translation(Vec3::Y));

        let all = scene.world_matrices();
        for (id, _) in scene.iter() {
            assert!(all[id.index()].abs_diff_eq(scene.world_matrix(id), 1e-6));
        }
        let p = all[mesh.index()].transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn wireframe_toggle_skips_nodes_without_material() {
        let (mut scene, group, mesh, lines) = small_tree();

        assert_eq!(scene.toggle_wireframe(group), 1);
        assert!(scene.node(mesh).material().is_some_and(|m| m.wireframe));
        assert!(!scene.node(lines).has_material());
        assert!(!scene.node(group).has_material());

        assert_eq!(scene.toggle_wireframe(group), 1);
        assert!(scene.node(mesh).material().is_some_and(|m| !m.wireframe));
    }
}
