//! CPU-side unit meshes for every scene shape.
//!
//! Each mesh is built at unit size and stretched by the instance transform;
//! triangles are wound counter-clockwise around their vertex normals.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use villascape_kernel::Shape;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Identifies one unit mesh. Parts that share a key share a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKey {
    Cuboid,
    /// Truncated cone with bottom radius 1 and the given top radius in
    /// thousandths. A top of 0 is a cone.
    Frustum { top_permille: u16, segments: u32 },
    Sphere,
    Plane,
}

const ROUND_SEGMENTS: u32 = 16;
const SPHERE_RINGS: u32 = 16;

impl MeshKey {
    /// Unit mesh key and the scale that stretches it to `shape`.
    pub fn for_shape(shape: &Shape) -> (MeshKey, Vec3) {
        match *shape {
            Shape::Cuboid {
                width,
                height,
                depth,
            } => (MeshKey::Cuboid, Vec3::new(width, height, depth)),
            Shape::Cone {
                radius,
                height,
                segments,
            } => (
                MeshKey::Frustum {
                    top_permille: 0,
                    segments: segments.max(3),
                },
                Vec3::new(radius, height, radius),
            ),
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let bottom = radius_bottom.max(f32::EPSILON);
                let ratio = (radius_top / bottom).clamp(0.0, 1.0);
                (
                    MeshKey::Frustum {
                        top_permille: (ratio * 1000.0).round() as u16,
                        segments: ROUND_SEGMENTS,
                    },
                    Vec3::new(bottom, height, bottom),
                )
            }
            Shape::Sphere { radius } => (MeshKey::Sphere, Vec3::splat(radius)),
            Shape::Plane { width, height } => (MeshKey::Plane, Vec3::new(width, height, 1.0)),
        }
    }

    pub fn build(&self) -> (Vec<Vertex>, Vec<u16>) {
        let mut mesh = MeshBuilder::default();
        match *self {
            MeshKey::Cuboid => mesh.cuboid(),
            MeshKey::Frustum {
                top_permille,
                segments,
            } => mesh.frustum(top_permille as f32 / 1000.0, segments),
            MeshKey::Sphere => mesh.sphere(SPHERE_RINGS, ROUND_SEGMENTS * 2),
            MeshKey::Plane => mesh.quad(
                [
                    Vec3::new(-0.5, -0.5, 0.0),
                    Vec3::new(0.5, -0.5, 0.0),
                    Vec3::new(0.5, 0.5, 0.0),
                    Vec3::new(-0.5, 0.5, 0.0),
                ],
                Vec3::Z,
            ),
        }
        (mesh.vertices, mesh.indices)
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl MeshBuilder {
    fn vertex(&mut self, position: Vec3, normal: Vec3) -> u16 {
        let index = self.vertices.len() as u16;
        self.vertices.push(Vertex {
            position: position.to_array(),
            normal: normal.to_array(),
        });
        index
    }

    /// Push a triangle, flipping it if needed so it winds CCW around the
    /// average of its vertex normals.
    fn triangle(&mut self, a: u16, b: u16, c: u16) {
        let p = |i: u16| Vec3::from_array(self.vertices[i as usize].position);
        let n = |i: u16| Vec3::from_array(self.vertices[i as usize].normal);
        let face = (p(b) - p(a)).cross(p(c) - p(a));
        if face.dot(n(a) + n(b) + n(c)) < 0.0 {
            self.indices.extend_from_slice(&[a, c, b]);
        } else {
            self.indices.extend_from_slice(&[a, b, c]);
        }
    }

    fn quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let i: Vec<u16> = corners.iter().map(|c| self.vertex(*c, normal)).collect();
        self.triangle(i[0], i[1], i[2]);
        self.triangle(i[2], i[3], i[0]);
    }

    fn cuboid(&mut self) {
        let p = 0.5_f32;
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            for sign in [1.0, -1.0] {
                let n = axis * sign;
                // Two tangents spanning the face.
                let (u, v) = if axis == Vec3::Y {
                    (Vec3::X, Vec3::Z)
                } else {
                    (axis.cross(Vec3::Y).normalize(), Vec3::Y)
                };
                let c = n * p;
                self.quad(
                    [
                        c - u * p - v * p,
                        c + u * p - v * p,
                        c + u * p + v * p,
                        c - u * p + v * p,
                    ],
                    n,
                );
            }
        }
    }

    /// Flat-shaded frustum from y=-0.5 (radius 1) to y=0.5 (radius `top`).
    fn frustum(&mut self, top: f32, segments: u32) {
        let ring = |radius: f32, y: f32, i: u32| {
            let theta = i as f32 / segments as f32 * TAU;
            Vec3::new(radius * theta.sin(), y, radius * theta.cos())
        };

        for i in 0..segments {
            let b0 = ring(1.0, -0.5, i);
            let b1 = ring(1.0, -0.5, i + 1);
            let t0 = ring(top, 0.5, i);
            let t1 = ring(top, 0.5, i + 1);

            let mid = (b0 + b1) * 0.5;
            let outward = Vec3::new(mid.x, 0.0, mid.z);
            let mut normal = (b1 - b0).cross(t0 - b0).normalize_or_zero();
            if normal.dot(outward) < 0.0 {
                normal = -normal;
            }

            if top > 0.0 {
                self.quad([b0, b1, t1, t0], normal);
            } else {
                let a = self.vertex(b0, normal);
                let b = self.vertex(b1, normal);
                let apex = self.vertex(Vec3::new(0.0, 0.5, 0.0), normal);
                self.triangle(a, b, apex);
            }
        }

        self.cap(1.0, -0.5, -Vec3::Y, segments);
        if top > 0.0 {
            self.cap(top, 0.5, Vec3::Y, segments);
        }
    }

    fn cap(&mut self, radius: f32, y: f32, normal: Vec3, segments: u32) {
        let center = self.vertex(Vec3::new(0.0, y, 0.0), normal);
        let rim: Vec<u16> = (0..=segments)
            .map(|i| {
                let theta = i as f32 / segments as f32 * TAU;
                self.vertex(
                    Vec3::new(radius * theta.sin(), y, radius * theta.cos()),
                    normal,
                )
            })
            .collect();
        for pair in rim.windows(2) {
            self.triangle(center, pair[0], pair[1]);
        }
    }

    /// Smooth UV sphere of radius 1.
    fn sphere(&mut self, rings: u32, sectors: u32) {
        let start = self.vertices.len() as u16;
        for r in 0..=rings {
            let phi = r as f32 / rings as f32 * PI;
            for s in 0..=sectors {
                let theta = s as f32 / sectors as f32 * TAU;
                let n = Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
                self.vertex(n, n);
            }
        }
        let row = sectors as u16 + 1;
        for r in 0..rings as u16 {
            for s in 0..sectors as u16 {
                let a = start + r * row + s;
                let b = a + row;
                if r != 0 {
                    self.triangle(a, b, a + 1);
                }
                if r != rings as u16 - 1 {
                    self.triangle(a + 1, b, b + 1);
                }
            }
        }
    }
}
