use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Render a triangle-mesh scene with a CPU path tracer")]
pub struct Args {
    /// Renderer configuration file
    pub renderer: PathBuf,

    /// Scene description file
    pub scene: PathBuf,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Number of worker threads
    pub threads: usize,

    /// Camera configuration file
    pub camera: PathBuf,

    /// Output image (.ppm or .png)
    pub output: PathBuf,

    /// Seed for a reproducible image
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory mesh paths are resolved against (defaults to the scene file's directory)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    pub fn mesh_base_dir(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.clone(),
            None => self
                .scene
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONAL: [&str; 8] = [
        "lumen",
        "renderer.txt",
        "scenes/room/scene.txt",
        "640",
        "480",
        "8",
        "camera.txt",
        "out.ppm",
    ];

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(POSITIONAL).unwrap();

        assert_eq!(args.renderer, PathBuf::from("renderer.txt"));
        assert_eq!(args.width, 640);
        assert_eq!(args.height, 480);
        assert_eq!(args.threads, 8);
        assert_eq!(args.output, PathBuf::from("out.ppm"));
        assert_eq!(args.seed, None);
        assert_eq!(args.log_level, LogLevel::Info);
        assert_eq!(args.mesh_base_dir(), PathBuf::from("scenes/room"));
    }

    #[test]
    fn test_options() {
        let mut argv = POSITIONAL.to_vec();
        argv.extend(["--seed", "42", "--base-dir", "meshes", "--log-level", "debug"]);
        let args = Args::try_parse_from(argv).unwrap();

        assert_eq!(args.seed, Some(42));
        assert_eq!(args.mesh_base_dir(), PathBuf::from("meshes"));
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_missing_output_rejected() {
        assert!(Args::try_parse_from(POSITIONAL[..7].iter().copied()).is_err());
    }

    #[test]
    fn test_scene_without_directory() {
        let mut argv = POSITIONAL;
        argv[2] = "scene.txt";
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.mesh_base_dir(), PathBuf::new());
    }
}
