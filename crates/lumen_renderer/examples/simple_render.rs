//! Simple path tracer example.
//!
//! Renders a procedurally built Cornell-style box with a diffuse block, a
//! glass block and a mirror, and saves it as a PPM file.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use lumen_core::{MaterialParams, Mesh};
use lumen_math::{Camera, Color, Transform, Vec3};
use lumen_renderer::{
    GraphicsEngine, GraphicsObject, PathTracer, RenderResult, RenderSettings, Renderer, Scene,
};

fn main() -> RenderResult<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    println!("Lumen Path Tracer - Simple Example");
    println!("==================================");

    let start = std::time::Instant::now();
    let scene = build_scene()?;
    println!("Scene built in {:?}", start.elapsed());

    let renderer = Renderer::PathTracer(PathTracer::new(6, 64)?);
    let threads = std::thread::available_parallelism().map_or(4, |n| n.get());
    let settings = RenderSettings::new(320, 240, threads).with_seed(1);
    let engine = GraphicsEngine::new(scene, renderer, settings)?;

    // Looking down -Z from in front of the open side
    let camera = Camera::new(Vec3::new(0.0, 0.0, 4.5), -FRAC_PI_2, FRAC_PI_2);

    let start = std::time::Instant::now();
    let frame = engine.render_camera(&camera)?;
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    frame.save(filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn diffuse(color: Color) -> MaterialParams {
    MaterialParams {
        color,
        ..MaterialParams::default()
    }
}

fn add(
    scene: &mut Scene,
    name: &str,
    mesh: Mesh,
    transform: Transform,
    material: MaterialParams,
    light: Option<f32>,
) -> RenderResult<()> {
    let object = GraphicsObject::new(name, Arc::new(mesh), transform, &material, light)?;
    scene.add_object(object);
    Ok(())
}

fn build_scene() -> RenderResult<Scene> {
    let mut scene = Scene::new();
    let white = diffuse(Color::splat(0.75));

    // Walls of a 4x4x4 box, normals pointing inwards
    let walls = [
        ("floor", Vec3::new(0.0, -2.0, 0.0), Vec3::Y, white.color),
        ("ceiling", Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, white.color),
        ("back", Vec3::new(0.0, 0.0, -2.0), Vec3::Z, white.color),
        ("left", Vec3::new(-2.0, 0.0, 0.0), Vec3::X, Color::new(0.75, 0.15, 0.15)),
        ("right", Vec3::new(2.0, 0.0, 0.0), Vec3::NEG_X, Color::new(0.15, 0.75, 0.15)),
    ];
    for (name, center, normal, color) in walls {
        let u = normal.any_orthonormal_vector() * 2.0;
        let v = normal.cross(u);
        add(
            &mut scene,
            name,
            Mesh::quad(center, u, v, normal),
            Transform::IDENTITY,
            diffuse(color),
            None,
        )?;
    }

    // Ceiling light
    add(
        &mut scene,
        "light",
        Mesh::quad(Vec3::ZERO, Vec3::X * 0.6, Vec3::Z * 0.6, Vec3::NEG_Y),
        Transform::from_position(Vec3::new(0.0, 1.99, 0.0)),
        diffuse(Color::ONE),
        Some(0.05),
    )?;

    add(
        &mut scene,
        "block",
        Mesh::cuboid(Vec3::ZERO, Vec3::new(0.5, 1.0, 0.5)),
        Transform::from_position(Vec3::new(-0.8, -1.0, -0.8)).with_axis_angle(Vec3::Y, PI / 8.0),
        white,
        None,
    )?;

    add(
        &mut scene,
        "glass",
        Mesh::cuboid(Vec3::ZERO, Vec3::splat(0.45)),
        Transform::from_position(Vec3::new(0.8, -1.55, 0.3)),
        MaterialParams {
            diffuse: 0.0,
            transparent: 1.0,
            refraction_index: 1.5,
            ..MaterialParams::default()
        },
        None,
    )?;

    add(
        &mut scene,
        "mirror",
        Mesh::quad(Vec3::ZERO, Vec3::Y * 0.8, Vec3::Z * 0.6, Vec3::NEG_X),
        Transform::from_position(Vec3::new(1.98, 0.6, -1.0)),
        MaterialParams {
            diffuse: 0.0,
            reflect: 1.0,
            ..MaterialParams::default()
        },
        None,
    )?;

    println!("Created {} objects", scene.objects().len());
    Ok(scene)
}
