use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::{load_camera, parse_input_file, MeshLibrary, SceneDescription};
use lumen_renderer::{GraphicsEngine, RenderSettings, Renderer, Scene};
use std::time::Instant;

mod cli;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting lumen");
    let start = Instant::now();

    let entries = parse_input_file(&args.renderer)
        .with_context(|| format!("Failed to read renderer config {}", args.renderer.display()))?;
    let renderer = Renderer::from_entries(&entries).context("Invalid renderer config")?;
    log::info!("Renderer: {}", renderer.name());

    let description = SceneDescription::load(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    let mut meshes = MeshLibrary::new(args.mesh_base_dir());
    let scene = Scene::from_description(&description, &mut meshes)
        .context("Failed to build scene objects")?;
    log::info!(
        "Loaded {} meshes in {:.2?}",
        meshes.len(),
        start.elapsed()
    );

    let camera = load_camera(&args.camera)
        .with_context(|| format!("Failed to load camera {}", args.camera.display()))?;

    let mut settings = RenderSettings::new(args.width, args.height, args.threads);
    if let Some(seed) = args.seed {
        settings = settings.with_seed(seed);
    }
    let engine =
        GraphicsEngine::new(scene, renderer, settings).context("Failed to set up renderer")?;

    let frame = engine.render_camera(&camera).context("Render failed")?;
    frame
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!("Done in {:.2?}", start.elapsed());
    Ok(())
}
