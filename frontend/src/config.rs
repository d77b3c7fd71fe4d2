//! User configuration: `config.toml` merged with command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use lantern_core::display::DisplayScale;
use serde::Deserialize;

const APP_DIR: &str = "lantern";
const DEFAULT_SCALE: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Integer upscale factor.
    pub scale: u32,
    /// Reject ROMs larger than this many bytes.
    pub max_rom_size: Option<usize>,
    /// Run colour-capable cartridges on base hardware.
    pub force_base_mode: bool,
    /// Save store file. Defaults to the platform data directory.
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            max_rom_size: None,
            force_base_mode: false,
            store_path: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("in {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        if DisplayScale::new(config.scale).is_none() {
            bail!(
                "scale must be between 1 and {}, got {}",
                DisplayScale::MAX,
                config.scale
            );
        }
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(scale) = overrides.scale {
            self.scale = scale;
        }
        if overrides.force_base_mode {
            self.force_base_mode = true;
        }
        if overrides.max_rom_size.is_some() {
            self.max_rom_size = overrides.max_rom_size;
        }
        if overrides.store_path.is_some() {
            self.store_path = overrides.store_path.clone();
        }
    }

    pub fn display_scale(&self) -> DisplayScale {
        DisplayScale::new(self.scale).unwrap_or(DisplayScale::ONE)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(default_store_path)
    }
}

/// Settings given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub scale: Option<u32>,
    pub force_base_mode: bool,
    pub max_rom_size: Option<usize>,
    pub store_path: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Platform data directory, or the working directory if there is none.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_default()
        .join("saves.json")
}
