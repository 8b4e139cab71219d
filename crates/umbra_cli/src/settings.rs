//! Render settings, loaded from JSON and overridden from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use umbra_renderer::DEFAULT_BUCKET_SIZE;

use crate::scenes::SceneKind;

/// Everything needed to produce one image.
///
/// Unset quality fields fall back to the chosen scene's own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    pub scene: SceneKind,
    pub width: Option<u32>,
    pub samples_per_pixel: Option<u32>,
    pub max_depth: Option<u32>,
    pub bucket_size: u32,
    pub seed: u64,
    pub texture: Option<PathBuf>,
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scene: SceneKind::CornellBox,
            width: None,
            samples_per_pixel: None,
            max_depth: None,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
            texture: None,
            output: PathBuf::from("image.ppm"),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading settings from {}", path.display()))?;
        let settings =
            serde_json::from_str(&text).with_context(|| format!("parsing settings in {}", path.display()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
