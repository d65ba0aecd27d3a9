use glam::Vec3;
use villascape_common::{PartId, Rgba, Transform};

/// Primitive geometry of a scene part, sized in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cuboid { width: f32, height: f32, depth: f32 },
    /// Cone with a polygonal base; four segments give a pyramid.
    Cone { radius: f32, height: f32, segments: u32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32 },
    Sphere { radius: f32 },
    /// Flat rectangle in the local XY plane facing +Z.
    Plane { width: f32, height: f32 },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Cuboid { .. } => "cuboid",
            Shape::Cone { .. } => "cone",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Sphere { .. } => "sphere",
            Shape::Plane { .. } => "plane",
        }
    }
}

/// Flat surface material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgba,
}

impl Material {
    pub fn solid(hex: u32) -> Self {
        Self {
            color: Rgba::from_hex(hex),
        }
    }

    pub fn translucent(hex: u32, opacity: f32) -> Self {
        Self {
            color: Rgba::from_hex(hex).with_alpha(opacity),
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.color.a < 1.0
    }
}

/// One drawable element of the scene graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub shape: Shape,
    pub transform: Transform,
    pub material: Material,
}

/// Directional sun light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunLight {
    /// The light shines from this point towards the origin.
    pub position: Vec3,
    pub intensity: f32,
    pub color: Rgba,
}

impl Default for SunLight {
    fn default() -> Self {
        Self {
            position: Vec3::Y,
            intensity: 1.0,
            color: Rgba::WHITE,
        }
    }
}

/// Uniform fill light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgba,
    pub intensity: f32,
}

/// The scene graph: every drawable part plus lights and sky.
///
/// Parts are stored in insertion order and never removed. Decorative props
/// are added once and not tracked further; the few parts that move keep the
/// [`PartId`] returned by [`Scene::add`].
#[derive(Debug, Clone)]
pub struct Scene {
    parts: Vec<Part>,
    pub sun_light: SunLight,
    pub ambient: AmbientLight,
    pub sky: Rgba,
    tick: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with a sky-blue background and ambient fill.
    pub fn new() -> Self {
        let sky = Rgba::from_hex(0x87ceeb);
        Self {
            parts: Vec::new(),
            sun_light: SunLight::default(),
            ambient: AmbientLight {
                color: sky,
                intensity: 0.5,
            },
            sky,
            tick: 0,
        }
    }

    /// Frames rendered so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// All parts in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn add(&mut self, shape: Shape, transform: Transform, material: Material) -> PartId {
        let id = PartId(self.parts.len() as u32);
        self.parts.push(Part {
            shape,
            transform,
            material,
        });
        id
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.get_mut(id.0 as usize)
    }

    /// Move a part. Returns false for an unknown handle.
    pub fn set_position(&mut self, id: PartId, position: Vec3) -> bool {
        match self.get_mut(id) {
            Some(part) => {
                part.transform.position = position;
                true
            }
            None => false,
        }
    }

    /// Count parts per shape kind, in a stable order.
    pub fn shape_histogram(&self) -> Vec<(&'static str, usize)> {
        let mut counts: std::collections::BTreeMap<&'static str, usize> = Default::default();
        for part in &self.parts {
            *counts.entry(part.shape.kind()).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}
