//! CPU-side geometry and the primitive shapes the goal is built from.
//!
//! Every primitive is generated into a [`RawGeometry`]: a plain vertex list
//! plus triangle indices, in the same conventions the renderer expects
//! (counter-clockwise front faces, Y up, UV origin at the top-left of the
//! texture). Geometry stays on the CPU until the scene is uploaded, so the
//! builders can be tested without a GPU. Placement is not baked into the
//! vertices; it lives in each scene node's local matrix.
//!
//! # Primitives
//!
//! | Builder | Orientation |
//! |---------|-------------|
//! | [`RawGeometry::cylinder`] | axis along Y, centered on the origin, capped |
//! | [`RawGeometry::plane`] | XY plane, facing +Z |
//! | [`RawGeometry::shape`] | flat polygon in the XY plane, facing +Z |
//! | [`RawGeometry::torus`] | ring in the XY plane around the origin |
//! | [`RawGeometry::sphere`] | centered on the origin |
//!
//! # Example
//!
//! ```
//! use goalpost::RawGeometry;
//!
//! let post = RawGeometry::cylinder(1.0, 1.0, 40.0, 16);
//!
//! let (min, max) = post.bounds();
//! assert!((min.y + 20.0).abs() < 1e-4);
//! assert!((max.x - 1.0).abs() < 1e-4);
//! ```

use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::mesh::Vertex3d;

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices, three per face.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    /// Creates raw geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles described by the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns `(min, max)` corners of the bounding box.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Unique edges of the triangle list, as pairs of vertex indices.
    ///
    /// Each undirected edge appears once, in the order it is first met while
    /// walking the triangles. This is what wireframe mode draws.
    pub fn edges(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();

        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if seen.insert((a.min(b), a.max(b))) {
                    edges.push(a);
                    edges.push(b);
                }
            }
        }

        edges
    }

    /// A capped cylinder (or cone frustum) along the Y axis.
    ///
    /// The body spans `-height / 2..height / 2`. `radial_segments` is the
    /// number of facets around the axis. Vertices at the seam are duplicated
    /// so UVs wrap cleanly.
    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Self {
        let radial_segments = radial_segments.max(3);
        let half_height = height * 0.5;
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side normals tilt when the radii differ.
        let slope = (radius_bottom - radius_top) / height;

        for row in 0..=1u32 {
            let v = row as f32;
            let radius = v * (radius_bottom - radius_top) + radius_top;
            let y = half_height - v * height;

            for seg in 0..=radial_segments {
                let u = seg as f32 / radial_segments as f32;
                let theta = u * TAU;
                let (sin, cos) = theta.sin_cos();

                let normal = Vec3::new(sin, slope, cos).normalize();
                vertices.push(Vertex3d::new(
                    [radius * sin, y, radius * cos],
                    normal.into(),
                    [u, v],
                ));
            }
        }

        let row_len = radial_segments + 1;
        for seg in 0..radial_segments {
            let a = seg;
            let b = seg + row_len;
            let c = seg + row_len + 1;
            let d = seg + 1;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        if radius_top > 0.0 {
            Self::push_cap(&mut vertices, &mut indices, radius_top, half_height, true, radial_segments);
        }
        if radius_bottom > 0.0 {
            Self::push_cap(&mut vertices, &mut indices, radius_bottom, -half_height, false, radial_segments);
        }

        Self::new(vertices, indices)
    }

    fn push_cap(
        vertices: &mut Vec<Vertex3d>,
        indices: &mut Vec<u32>,
        radius: f32,
        y: f32,
        top: bool,
        radial_segments: u32,
    ) {
        let sign = if top { 1.0 } else { -1.0 };
        let normal = [0.0, sign, 0.0];
        let center_start = vertices.len() as u32;

        // One center vertex per facet keeps the UV fan seam-free.
        for seg in 0..radial_segments {
            let u = (seg as f32 + 0.5) / radial_segments as f32;
            vertices.push(Vertex3d::new([0.0, y, 0.0], normal, [u, 0.5]));
        }

        let ring_start = vertices.len() as u32;
        for seg in 0..=radial_segments {
            let theta = seg as f32 / radial_segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            vertices.push(Vertex3d::new(
                [radius * sin, y, radius * cos],
                normal,
                [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
            ));
        }

        for seg in 0..radial_segments {
            let center = center_start + seg;
            let i = ring_start + seg;
            if top {
                indices.extend_from_slice(&[i, i + 1, center]);
            } else {
                indices.extend_from_slice(&[i + 1, i, center]);
            }
        }
    }

    /// A `width` x `height` rectangle in the XY plane, centered on the
    /// origin and facing +Z.
    ///
    /// The top-left corner maps to UV `(0, 0)`.
    pub fn plane(width: f32, height: f32) -> Self {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        let normal = [0.0, 0.0, 1.0];

        let vertices = vec![
            Vertex3d::new([-half_w, half_h, 0.0], normal, [0.0, 0.0]),
            Vertex3d::new([half_w, half_h, 0.0], normal, [1.0, 0.0]),
            Vertex3d::new([-half_w, -half_h, 0.0], normal, [0.0, 1.0]),
            Vertex3d::new([half_w, -half_h, 0.0], normal, [1.0, 1.0]),
        ];
        let indices = vec![0, 2, 1, 2, 3, 1];

        Self::new(vertices, indices)
    }

    /// A flat polygon in the XY plane, facing +Z.
    ///
    /// The outline must be convex; it is triangulated as a fan from its
    /// first point. Clockwise outlines are reversed and a closing point equal
    /// to the first is dropped, so `(0,0) (0,40) (23,0) (0,0)` and
    /// `(0,0) (23,0) (0,40)` produce the same triangle. UVs are the raw
    /// XY coordinates, as shape geometry has no natural texture extent.
    pub fn shape(outline: &[Vec2]) -> Self {
        let mut points = outline.to_vec();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Self::default();
        }

        let signed_area: f32 = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(p, q)| p.perp_dot(*q))
            .sum::<f32>()
            * 0.5;
        if signed_area < 0.0 {
            points.reverse();
        }

        let vertices = points
            .iter()
            .map(|p| Vertex3d::new([p.x, p.y, 0.0], [0.0, 0.0, 1.0], [p.x, p.y]))
            .collect();

        let mut indices = Vec::with_capacity((points.len() - 2) * 3);
        for i in 1..points.len() as u32 - 1 {
            indices.extend_from_slice(&[0, i, i + 1]);
        }

        Self::new(vertices, indices)
    }

    /// A torus lying in the XY plane around the origin.
    ///
    /// `radius` is the distance from the center to the middle of the tube,
    /// `tube` the tube radius. `radial_segments` subdivide the tube's
    /// cross-section, `tubular_segments` the sweep around the ring.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let tubular_segments = tubular_segments.max(3);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;

                let position = Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let ring_center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - ring_center).normalize_or_zero();

                vertices.push(Vertex3d::new(
                    position.into(),
                    normal.into(),
                    [
                        i as f32 / tubular_segments as f32,
                        j as f32 / radial_segments as f32,
                    ],
                ));
            }
        }

        let row_len = tubular_segments + 1;
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row_len * j + i - 1;
                let b = row_len * (j - 1) + i - 1;
                let c = row_len * (j - 1) + i;
                let d = row_len * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self::new(vertices, indices)
    }

    /// A UV sphere centered on the origin.
    ///
    /// `width_segments` run around the equator, `height_segments` from pole
    /// to pole. The degenerate triangles at the poles are skipped.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let (sin_phi, cos_phi) = (u * TAU).sin_cos();
                let (sin_theta, cos_theta) = (v * PI).sin_cos();

                let normal = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
                vertices.push(Vertex3d::new(
                    (normal * radius).into(),
                    normal.into(),
                    [u, v],
                ));
            }
        }

        let row_len = width_segments + 1;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = row_len * iy + ix + 1;
                let b = row_len * iy + ix;
                let c = row_len * (iy + 1) + ix;
                let d = row_len * (iy + 1) + ix + 1;

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(vertices, indices)
    }

    /// A single segment from the origin along `axis`, `length` units long.
    ///
    /// The index list holds a line pair rather than triangles; it is meant
    /// for [`NodeKind::Lines`](crate::NodeKind::Lines) nodes.
    pub fn axis_segment(axis: Vec3, length: f32) -> Self {
        let normal = [0.0, 1.0, 0.0];
        Self::new(
            vec![
                Vertex3d::new([0.0, 0.0, 0.0], normal, [0.0, 0.0]),
                Vertex3d::new((axis.normalize_or_zero() * length).into(), normal, [1.0, 0.0]),
            ],
            vec![0, 1],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(actual: Vec3, expected: Vec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-4),
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn size(geom: &RawGeometry) -> Vec3 {
        let (min, max) = geom.bounds();
        max - min
    }

    /// Checks that every triangle winds counter-clockwise when seen from
    /// outside, i.e. its face normal agrees with the vertex normals.
    fn assert_outward_winding(geom: &RawGeometry) {
        for tri in geom.indices.chunks_exact(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from(geom.vertices[i as usize].position))
                .collect();
            let face = (p[1] - p[0]).cross(p[2] - p[0]);
            if face.length_squared() < 1e-12 {
                continue;
            }
            let n: Vec3 = tri
                .iter()
                .map(|&i| Vec3::from(geom.vertices[i as usize].normal))
                .sum();
            assert!(face.dot(n) > 0.0, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn raw_geometry_bounds() {
        let vertices = vec![
            Vertex3d::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([-1.0, -1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        ];
        let geom = RawGeometry::new(vertices, vec![0, 1, 2]);

        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn cylinder_spans_height_and_radius() {
        // 16 facets put vertices exactly on the X and Z extremes.
        let geom = RawGeometry::cylinder(1.0, 1.0, 40.0, 16);

        let (min, max) = geom.bounds();
        assert_vec3_near(max - min, Vec3::new(2.0, 40.0, 2.0));
        assert_vec3_near((min + max) * 0.5, Vec3::ZERO);
        // 16 side quads plus two 16-triangle caps.
        assert_eq!(geom.triangle_count(), 16 * 2 + 16 * 2);
        assert_outward_winding(&geom);
    }

    #[test]
    fn plane_faces_positive_z() {
        let geom = RawGeometry::plane(120.0, 20.0);

        assert_vec3_near(size(&geom), Vec3::new(120.0, 20.0, 0.0));
        assert_eq!(geom.triangle_count(), 2);
        assert_outward_winding(&geom);
        assert_eq!(geom.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(geom.vertices[0].position, [-60.0, 10.0, 0.0]);
    }

    #[test]
    fn shape_reverses_clockwise_outline() {
        let outline = [
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 40.0),
            Vec2::new(23.094, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        let geom = RawGeometry::shape(&outline);

        assert_eq!(geom.vertices.len(), 3);
        assert_eq!(geom.triangle_count(), 1);
        assert_outward_winding(&geom);
        assert_vec3_near(size(&geom), Vec3::new(23.094, 40.0, 0.0));
    }

    #[test]
    fn shape_rejects_degenerate_outline() {
        let geom = RawGeometry::shape(&[Vec2::ZERO, Vec2::X, Vec2::ZERO]);
        assert!(geom.vertices.is_empty());
        assert!(geom.indices.is_empty());
    }

    #[test]
    fn torus_extent() {
        let geom = RawGeometry::torus(1.0, 1.0, 15, 40);

        let (min, max) = geom.bounds();
        assert!((max.x - 2.0).abs() < 1e-4);
        assert!((min.x + 2.0).abs() < 1e-4);
        assert!(max.z <= 1.0 + 1e-4 && min.z >= -1.0 - 1e-4);
        assert_eq!(geom.vertices.len(), 16 * 41);
        assert_eq!(geom.triangle_count(), 15 * 40 * 2);
    }

    #[test]
    fn sphere_is_round_and_outward() {
        let geom = RawGeometry::sphere(2.5, 30, 15);

        for v in &geom.vertices {
            assert!((Vec3::from(v.position).length() - 2.5).abs() < 1e-4);
        }
        // Pole rows contribute one triangle per segment instead of two.
        assert_eq!(geom.triangle_count(), 30 * (15 * 2 - 2));
        assert_outward_winding(&geom);
    }

    #[test]
    fn edges_are_unique() {
        let geom = RawGeometry::plane(1.0, 1.0);
        let edges = geom.edges();

        // Two triangles share the diagonal: 5 distinct edges.
        assert_eq!(edges.len(), 10);

        let mut seen = HashSet::new();
        for pair in edges.chunks_exact(2) {
            assert!(seen.insert((pair[0].min(pair[1]), pair[0].max(pair[1]))));
        }
    }

    #[test]
    fn axis_segment_has_requested_length() {
        let geom = RawGeometry::axis_segment(Vec3::Z * 3.0, 25.0);
        assert_vec3_near(Vec3::from(geom.vertices[1].position), Vec3::new(0.0, 0.0, 25.0));
        assert_eq!(geom.indices, vec![0, 1]);
    }
}
