//! Geometry descriptors and vertex generation.
//!
//! A [`Geometry`] is a small parametric description (box, sphere, ...).
//! [`Geometry::build`] expands it into [`GeometryData`]: positions, normals,
//! texture coordinates and indices, laid out the way the renderer consumes
//! them.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// How indices (or vertices, when there are no indices) form primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

/// Parametric geometry description.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
        width_segments: u32,
        height_segments: u32,
        depth_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        phi_start: f32,
        phi_length: f32,
    },
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    /// (p, q) torus knot
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
        p: u32,
        q: u32,
    },
    /// Explicit point cloud
    Points(Vec<Vec3>),
    /// Explicit line list, two vertices per segment
    Lines(Vec<Vec3>),
    /// Unique triangle edges of another geometry
    Wireframe(Box<Geometry>),
}

impl Geometry {
    /// Axis-aligned box centered at the origin, one segment per side.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            width,
            height,
            depth,
            width_segments: 1,
            height_segments: 1,
            depth_segments: 1,
        }
    }

    /// Full sphere.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::Sphere {
            radius,
            width_segments,
            height_segments,
            phi_start: 0.0,
            phi_length: TAU,
        }
    }

    /// Plane in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane {
            width,
            height,
            width_segments: 1,
            height_segments: 1,
        }
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        }
    }

    /// Trefoil knot with the usual default tessellation.
    pub fn torus_knot(radius: f32, tube: f32) -> Self {
        Self::TorusKnot {
            radius,
            tube,
            tubular_segments: 64,
            radial_segments: 8,
            p: 2,
            q: 3,
        }
    }

    /// Edges of `geometry` as line segments.
    pub fn wireframe(geometry: Geometry) -> Self {
        Self::Wireframe(Box::new(geometry))
    }

    /// Expand the description into vertex data.
    pub fn build(&self) -> GeometryData {
        match self {
            Geometry::Box {
                width,
                height,
                depth,
                width_segments,
                height_segments,
                depth_segments,
            } => build_box(
                Vec3::new(*width, *height, *depth),
                [
                    (*width_segments).max(1),
                    (*height_segments).max(1),
                    (*depth_segments).max(1),
                ],
            ),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
                phi_start,
                phi_length,
            } => build_sphere(
                *radius,
                (*width_segments).max(3),
                (*height_segments).max(2),
                *phi_start,
                *phi_length,
            ),
            Geometry::Plane {
                width,
                height,
                width_segments,
                height_segments,
            } => {
                let mut data = GeometryData::new(Topology::Triangles);
                data.push_grid(
                    Vec3::ZERO,
                    Vec3::X * *width,
                    Vec3::Y * *height,
                    Vec3::Z,
                    (*width_segments).max(1),
                    (*height_segments).max(1),
                );
                data
            }
            Geometry::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => build_torus(
                *radius,
                *tube,
                (*radial_segments).max(3),
                (*tubular_segments).max(3),
            ),
            Geometry::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
                p,
                q,
            } => build_torus_knot(
                *radius,
                *tube,
                (*tubular_segments).max(3),
                (*radial_segments).max(3),
                (*p).max(1),
                *q,
            ),
            Geometry::Points(points) => GeometryData {
                topology: Topology::Points,
                positions: points.clone(),
                normals: vec![Vec3::Z; points.len()],
                uvs: vec![Vec2::ZERO; points.len()],
                indices: Vec::new(),
            },
            Geometry::Lines(vertices) => {
                let count = vertices.len() & !1;
                GeometryData {
                    topology: Topology::Lines,
                    positions: vertices[..count].to_vec(),
                    normals: vec![Vec3::Z; count],
                    uvs: vec![Vec2::ZERO; count],
                    indices: Vec::new(),
                }
            }
            Geometry::Wireframe(inner) => inner.build().to_wireframe(),
        }
    }
}

/// Expanded vertex data.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryData {
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Empty for unindexed data
    pub indices: Vec<u32>,
}

impl GeometryData {
    fn new(topology: Topology) -> Self {
        Self {
            topology,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of primitives (triangles, lines or points).
    pub fn primitive_count(&self) -> usize {
        let n = if self.indices.is_empty() {
            self.positions.len()
        } else {
            self.indices.len()
        };
        match self.topology {
            Topology::Triangles => n / 3,
            Topology::Lines => n / 2,
            Topology::Points => n,
        }
    }

    /// Axis-aligned bounds as `(min, max)`; `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }

    /// Unique edges of a triangle mesh as a line list.
    pub fn to_wireframe(&self) -> GeometryData {
        if self.topology != Topology::Triangles {
            return self.clone();
        }
        let mut seen = std::collections::HashSet::new();
        let mut indices = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    indices.extend_from_slice(&[key.0, key.1]);
                }
            }
        }
        GeometryData {
            topology: Topology::Lines,
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            indices,
        }
    }

    /// Append a `(u_segments x v_segments)` grid centered at `center`.
    fn push_grid(
        &mut self,
        center: Vec3,
        u_axis: Vec3,
        v_axis: Vec3,
        normal: Vec3,
        u_segments: u32,
        v_segments: u32,
    ) {
        let base = self.positions.len() as u32;
        for iy in 0..=v_segments {
            let v = iy as f32 / v_segments as f32;
            for ix in 0..=u_segments {
                let u = ix as f32 / u_segments as f32;
                self.positions
                    .push(center + u_axis * (u - 0.5) - v_axis * (v - 0.5));
                self.normals.push(normal);
                self.uvs.push(Vec2::new(u, 1.0 - v));
            }
        }
        let row = u_segments + 1;
        for iy in 0..v_segments {
            for ix in 0..u_segments {
                let a = base + iy * row + ix;
                let b = base + (iy + 1) * row + ix;
                let c = base + (iy + 1) * row + ix + 1;
                let d = base + iy * row + ix + 1;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }
}

fn build_box(size: Vec3, [sx, sy, sz]: [u32; 3]) -> GeometryData {
    let mut data = GeometryData::new(Topology::Triangles);
    let half = size * 0.5;
    // (normal, u axis, v axis, u segments, v segments)
    let faces = [
        (Vec3::X, Vec3::NEG_Z * size.z, Vec3::Y * size.y, sz, sy),
        (Vec3::NEG_X, Vec3::Z * size.z, Vec3::Y * size.y, sz, sy),
        (Vec3::Y, Vec3::X * size.x, Vec3::NEG_Z * size.z, sx, sz),
        (Vec3::NEG_Y, Vec3::X * size.x, Vec3::Z * size.z, sx, sz),
        (Vec3::Z, Vec3::X * size.x, Vec3::Y * size.y, sx, sy),
        (Vec3::NEG_Z, Vec3::NEG_X * size.x, Vec3::Y * size.y, sx, sy),
    ];
    for (normal, u_axis, v_axis, us, vs) in faces {
        data.push_grid(normal * half, u_axis, v_axis, normal, us, vs);
    }
    data
}

fn build_sphere(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    phi_start: f32,
    phi_length: f32,
) -> GeometryData {
    let mut data = GeometryData::new(Topology::Triangles);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = phi_start + u * phi_length;
            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            data.positions.push(normal * radius);
            data.normals.push(normal);
            data.uvs.push(Vec2::new(u, 1.0 - v));
        }
    }
    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    data
}

fn build_torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> GeometryData {
    let mut data = GeometryData::new(Topology::Triangles);
    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            data.positions.push(position);
            data.normals.push((position - center).normalize_or_zero());
            data.uvs.push(Vec2::new(
                i as f32 / tubular_segments as f32,
                j as f32 / radial_segments as f32,
            ));
        }
    }
    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    data
}

fn build_torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> GeometryData {
    let curve = |u: f32| {
        let q_over_p = q as f32 / p as f32 * u;
        let cs = q_over_p.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * 0.5 * u.sin(),
            radius * q_over_p.sin() * 0.5,
        )
    };

    let mut data = GeometryData::new(Topology::Triangles);
    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * p as f32 * TAU;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);

        // Frenet-style frame along the curve
        let tangent = p2 - p1;
        let binormal = tangent.cross(p2 + p1);
        let normal = binormal.cross(tangent).normalize_or_zero();
        let binormal = binormal.normalize_or_zero();

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let position = p1 + normal * (-tube * v.cos()) + binormal * (tube * v.sin());
            data.positions.push(position);
            data.normals.push((position - p1).normalize_or_zero());
            data.uvs.push(Vec2::new(
                i as f32 / tubular_segments as f32,
                j as f32 / radial_segments as f32,
            ));
        }
    }
    let row = radial_segments + 1;
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_unit_box_counts_and_bounds() {
        let data = Geometry::cuboid(1.0, 1.0, 1.0).build();
        assert_eq!(data.vertex_count(), 24);
        assert_eq!(data.primitive_count(), 12);

        let (min, max) = data.bounds().unwrap();
        assert!((min - Vec3::splat(-0.5)).length() < EPSILON);
        assert!((max - Vec3::splat(0.5)).length() < EPSILON);
    }

    #[test]
    fn test_segmented_box_vertex_count() {
        let data = Geometry::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: 4,
            height_segments: 4,
            depth_segments: 4,
        }
        .build();
        assert_eq!(data.vertex_count(), 6 * 25);
        assert_eq!(data.primitive_count(), 6 * 16 * 2);
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let data = Geometry::sphere(0.5, 32, 32).build();
        assert_eq!(data.vertex_count(), 33 * 33);
        for p in &data.positions {
            assert!((p.length() - 0.5).abs() < EPSILON);
        }
        // Pole rows contribute one triangle per segment
        assert_eq!(data.primitive_count(), 32 * 31 * 2);
    }

    #[test]
    fn test_half_sphere_stays_on_one_side() {
        let data = Geometry::Sphere {
            radius: 1.5,
            width_segments: 16,
            height_segments: 16,
            phi_start: 0.0,
            phi_length: PI,
        }
        .build();
        assert!(data.positions.iter().all(|p| p.z >= -EPSILON));
    }

    #[test]
    fn test_torus_extent() {
        let data = Geometry::torus(0.4, 0.1, 32, 32).build();
        let (min, max) = data.bounds().unwrap();
        assert!((max.x - 0.5).abs() < EPSILON);
        assert!((min.z + 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_torus_knot_counts() {
        let data = Geometry::torus_knot(1.0, 0.4).build();
        assert_eq!(data.vertex_count(), 65 * 9);
        assert_eq!(data.primitive_count(), 64 * 8 * 2);
        // The (2, 3) knot stays within radius * 1.5 + tube of the axis
        let (min, max) = data.bounds().unwrap();
        assert!(max.x <= 1.5 + 0.4 + EPSILON);
        assert!(min.z >= -0.5 - 0.4 - EPSILON);
    }

    #[test]
    fn test_plane_faces_z() {
        let data = Geometry::plane(10.0, 10.0).build();
        assert_eq!(data.vertex_count(), 4);
        assert!(data.normals.iter().all(|n| *n == Vec3::Z));
        let (min, max) = data.bounds().unwrap();
        assert_eq!(min, Vec3::new(-5.0, -5.0, 0.0));
        assert_eq!(max, Vec3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn test_points_geometry() {
        let data = Geometry::Points(vec![Vec3::ZERO, Vec3::ONE]).build();
        assert_eq!(data.topology, Topology::Points);
        assert_eq!(data.primitive_count(), 2);
        assert!(data.indices.is_empty());
    }

    #[test]
    fn test_line_list_drops_dangling_vertex() {
        let data = Geometry::Lines(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).build();
        assert_eq!(data.topology, Topology::Lines);
        assert_eq!(data.primitive_count(), 1);
        assert_eq!(data.positions, vec![Vec3::ZERO, Vec3::X]);
    }

    #[test]
    fn test_wireframe_unique_edges() {
        let data = Geometry::wireframe(Geometry::plane(1.0, 1.0)).build();
        assert_eq!(data.topology, Topology::Lines);
        // Two triangles sharing a diagonal: 5 unique edges
        assert_eq!(data.primitive_count(), 5);
    }
}
