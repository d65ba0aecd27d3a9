//! Composite props and the fixed set pieces of the villa scene.

use crate::scene::{Material, Scene, Shape};
use glam::{Quat, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use villascape_common::{PartId, Transform};

const WOOD: u32 = 0x8b4513;
const ROOF_TILE: u32 = 0xff6347;
const FOLIAGE: u32 = 0x228b22;
const BRICK: u32 = 0xa0522d;

/// House: a box base with a pyramid roof, placed at ground point `at`.
pub fn add_house(scene: &mut Scene, at: Vec2) {
    scene.add(
        Shape::Cuboid {
            width: 3.0,
            height: 2.0,
            depth: 3.0,
        },
        Transform::at(Vec3::new(at.x, 0.0, at.y)),
        Material::solid(WOOD),
    );
    scene.add(
        Shape::Cone {
            radius: 3.0,
            height: 1.5,
            segments: 4,
        },
        Transform::at(Vec3::new(at.x, 1.5, at.y)).with_rotation(Quat::from_rotation_y(FRAC_PI_4)),
        Material::solid(ROOF_TILE),
    );
}

/// Tree: a thin trunk topped by a foliage ball, placed at ground point `at`.
pub fn add_tree(scene: &mut Scene, at: Vec2) {
    scene.add(
        Shape::Cylinder {
            radius_top: 0.1,
            radius_bottom: 0.1,
            height: 2.0,
        },
        Transform::at(Vec3::new(at.x, 0.0, at.y)),
        Material::solid(WOOD),
    );
    scene.add(
        Shape::Sphere { radius: 0.8 },
        Transform::at(Vec3::new(at.x, 1.2, at.y)),
        Material::solid(FOLIAGE),
    );
}

/// Ground plane, villa, pool and painting.
pub fn add_set_pieces(scene: &mut Scene) {
    scene.add(
        Shape::Plane {
            width: 1000.0,
            height: 1000.0,
        },
        Transform::at(Vec3::new(0.0, -1.0, 0.0)).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        Material::solid(FOLIAGE),
    );

    // Villa floor and walls
    scene.add(
        Shape::Cuboid {
            width: 8.0,
            height: 0.1,
            depth: 8.0,
        },
        Transform::at(Vec3::new(0.0, -1.0, 0.0)),
        Material::solid(BRICK),
    );
    let long_wall = Shape::Cuboid {
        width: 8.0,
        height: 3.0,
        depth: 0.1,
    };
    let side_wall = Shape::Cuboid {
        width: 0.1,
        height: 3.0,
        depth: 8.0,
    };
    let brick = Material::solid(BRICK);
    for z in [-3.9, 3.9] {
        scene.add(long_wall, Transform::at(Vec3::new(0.0, 0.5, z)), brick);
    }
    for x in [-3.9, 3.9] {
        scene.add(side_wall, Transform::at(Vec3::new(x, 0.5, 0.0)), brick);
    }

    let pane = Shape::Cuboid {
        width: 1.0,
        height: 1.0,
        depth: 0.1,
    };
    for x in [-2.0, 2.0] {
        scene.add(
            pane,
            Transform::at(Vec3::new(x, 1.0, -4.0)),
            Material::solid(0x89ceeb),
        );
    }
    scene.add(
        Shape::Cuboid {
            width: 1.5,
            height: 2.5,
            depth: 0.1,
        },
        Transform::at(Vec3::new(0.0, 0.0, -4.0)),
        Material::solid(WOOD),
    );
    scene.add(
        Shape::Cone {
            radius: 6.0,
            height: 2.0,
            segments: 4,
        },
        Transform::at(Vec3::new(0.0, 3.0, 0.0)).with_rotation(Quat::from_rotation_y(FRAC_PI_4)),
        Material::solid(ROOF_TILE),
    );

    scene.add(
        Shape::Cuboid {
            width: 6.0,
            height: 0.5,
            depth: 6.0,
        },
        Transform::at(Vec3::new(8.0, -1.2, 0.0)),
        Material::translucent(0x1e90ff, 0.8),
    );

    // Painting on the inside of the back wall, facing into the room
    scene.add(
        Shape::Plane {
            width: 1.0,
            height: 1.5,
        },
        Transform::at(Vec3::new(0.0, 0.0, 3.8)).with_rotation(Quat::from_rotation_y(PI)),
        Material::solid(0xdeb887),
    );
}

/// Visible sun disc. Its position is rewritten every frame.
pub fn add_sun(scene: &mut Scene) -> PartId {
    scene.add(
        Shape::Sphere { radius: 1.0 },
        Transform::default(),
        Material::solid(0xffff00),
    )
}

/// Cloud layer at `altitude`. Its x position is rewritten every frame.
pub fn add_cloud(scene: &mut Scene, altitude: f32) -> PartId {
    scene.add(
        Shape::Plane {
            width: 30.0,
            height: 30.0,
        },
        Transform::at(Vec3::new(0.0, altitude, 0.0))
            .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        Material::translucent(0xffffff, 0.8),
    )
}
