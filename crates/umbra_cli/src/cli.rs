use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::scenes::SceneKind;
use crate::settings::Settings;

/// Log levels accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
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

/// Command line arguments. Anything given here overrides the settings file.
#[derive(Debug, Parser)]
#[command(name = "umbra")]
#[command(about = "A Monte Carlo path tracer")]
pub struct Args {
    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,

    /// Built-in scene to render
    #[arg(short, long, value_enum)]
    pub scene: Option<SceneKind>,

    /// Image width in pixels (height follows the scene's aspect ratio)
    #[arg(long)]
    pub width: Option<u32>,

    /// Samples per pixel, rounded down to a square number
    #[arg(long, short = 'n')]
    pub samples_per_pixel: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Bucket edge length in pixels
    #[arg(long)]
    pub bucket_size: Option<u32>,

    /// Seed for scene generation and rendering
    #[arg(long)]
    pub seed: Option<u64>,

    /// Image used by the textured scenes
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Output file; `.ppm` writes plain PPM, anything else goes through the image encoder
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Overlay the flags that were given onto `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(scene) = self.scene {
            settings.scene = scene;
        }
        if self.width.is_some() {
            settings.width = self.width;
        }
        if self.samples_per_pixel.is_some() {
            settings.samples_per_pixel = self.samples_per_pixel;
        }
        if self.max_depth.is_some() {
            settings.max_depth = self.max_depth;
        }
        if let Some(bucket_size) = self.bucket_size {
            settings.bucket_size = bucket_size;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if self.texture.is_some() {
            settings.texture = self.texture.clone();
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from(["umbra", "--scene", "cornell-smoke", "--width", "64", "--seed", "9"]);
        let mut settings = Settings {
            max_depth: Some(7),
            ..Settings::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.scene, SceneKind::CornellSmoke);
        assert_eq!(settings.width, Some(64));
        assert_eq!(settings.seed, 9);
        // Untouched by the command line.
        assert_eq!(settings.max_depth, Some(7));
        assert_eq!(settings.output, Settings::default().output);
    }

    #[test]
    fn test_log_level_mapping() {
        let args = Args::parse_from(["umbra", "--log-level", "debug"]);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);

        let args = Args::parse_from(["umbra"]);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Info);
    }
}
