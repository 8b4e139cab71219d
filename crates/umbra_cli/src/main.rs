use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use umbra_renderer::{render, save_image, save_ppm, RenderConfig};

mod cli;
mod scenes;
mod settings;

use cli::Args;
use scenes::configure_camera;
use settings::Settings;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    args.apply(&mut settings);
    log::debug!("{settings:?}");

    let start = Instant::now();
    let setup = settings.scene.build(&settings)?;
    log::info!("Scene built in {:?}", start.elapsed());

    let camera = configure_camera(setup.camera, &settings);
    let config = RenderConfig {
        bucket_size: settings.bucket_size,
        seed: settings.seed,
    };

    let start = Instant::now();
    let image = render(&camera, &setup.scene, &config);
    log::info!("Rendered in {:?}", start.elapsed());

    write_output(&image, &settings.output)
}

fn write_output(image: &umbra_renderer::ImageBuffer, path: &Path) -> Result<()> {
    let is_ppm = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        save_ppm(image, path)
    } else {
        save_image(image, path)
    }
    .with_context(|| format!("writing {}", path.display()))
}
