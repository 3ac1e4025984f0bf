//! Built-in demo scene.

use std::path::Path;

use anyhow::Result;
use glint_math::{Transform, Vec3};
use glint_renderer::{Camera, Color, ImageTexture, Material, Primitive, PrimitiveId, Texture, World};

/// The demo world plus the handle of the object the nudge moves.
pub struct DemoScene {
    pub world: World,
    pub camera: Camera,
    pub movable: PrimitiveId,
}

/// Checker ground, three spheres, a box, and an area light.
///
/// With `ground_image` the floor uses an image texture instead of the
/// checker.
pub fn demo(aspect_ratio: f32, seed: u64, ground_image: Option<&Path>) -> Result<DemoScene> {
    let mut world = World::new().with_seed(seed);

    let ground_texture = match ground_image {
        Some(path) => world.add_texture(Texture::Image(ImageTexture::open(path)?)),
        None => {
            let dark = world.textures_mut().add_solid(Color::new(0.2, 0.3, 0.1));
            let light = world.textures_mut().add_solid(Color::new(0.9, 0.9, 0.9));
            world.textures_mut().add_checker(dark, light)
        }
    };
    let ground = world.add_material(Material::Diffuse { albedo: ground_texture });

    let red_texture = world.textures_mut().add_solid(Color::new(0.7, 0.1, 0.1));
    let red = world.add_material(Material::Diffuse { albedo: red_texture });
    let glass = world.add_material(Material::dielectric(1.5));
    let metal = world.add_material(Material::reflective(Color::new(0.8, 0.6, 0.2), 0.15));
    let emit = world.textures_mut().add_solid(Color::new(1.0, 0.95, 0.85));
    let lamp = world.add_material(Material::light(emit, 6.0));

    // Rectangles face +Z; tip it over to face up
    let floor = Transform::from_euler_degrees(Vec3::new(-90.0, 0.0, 0.0), Vec3::new(0.0, -0.5, 0.0));
    world.add(Primitive::rectangle("ground", 20.0, 20.0, floor).with_material(ground));

    world.add(Primitive::sphere("red", Vec3::new(-1.1, 0.0, 0.0), 0.5).with_material(red));
    let movable = world.add(Primitive::sphere("glass", Vec3::ZERO, 0.5).with_material(glass));
    world.add(Primitive::sphere("metal", Vec3::new(1.1, 0.0, 0.0), 0.5).with_material(metal));

    let crate_transform = Transform::from_euler_degrees(Vec3::new(0.0, 25.0, 0.0), Vec3::new(0.4, -0.25, 1.2));
    world.add(Primitive::cuboid("crate", Vec3::splat(0.5), crate_transform).with_material(red));

    let lamp_transform = Transform::from_euler_degrees(Vec3::new(90.0, 0.0, 0.0), Vec3::new(0.0, 2.5, 0.0));
    world.add(Primitive::rectangle("lamp", 2.0, 1.0, lamp_transform).with_material(lamp));

    world.rebuild_acceleration()?;

    let camera = Camera::new(aspect_ratio)
        .with_position(Vec3::new(0.0, 0.6, -3.5), Vec3::ZERO, Vec3::Y)
        .with_lens(50.0, 0.0, 3.5);

    Ok(DemoScene {
        world,
        camera,
        movable,
    })
}
