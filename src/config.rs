//! Process configuration.
//!
//! Every knob the renderer used to hard-code lives here: asset and prelude
//! roots, the export directory, the run mode, and the framebuffer sizes.
//! Stored as JSON; loaded from `--config <file>` or from
//! `~/.config/divfx/config.json`, with CLI flags layered on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cards::{CARD_HEIGHT, CARD_WIDTH};
use crate::error::{Error, Result};

/// Default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("divfx")
        .join("config.json")
}

/// Which driver runs over the layer collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Render every card to a window each frame.
    Interactive,
    /// Export loop-blended frame sequences per composite.
    #[default]
    Batch,
}

/// Raster format for exported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    /// Lossy WebP.
    Webp,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Webp => "webp",
        }
    }
}

/// Batch export parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub base_time: f64,
    #[serde(default = "default_num_frames")]
    pub num_frames: u32,
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_lerp_frames")]
    pub lerp_frames: u32,
    #[serde(default)]
    pub format: ExportFormat,
    /// Each entry is one shot: layer indices drawn bottom to top.
    #[serde(default = "default_composites")]
    pub composites: Vec<Vec<usize>>,
}

fn default_num_frames() -> u32 {
    300
}

fn default_fps() -> f64 {
    60.0
}

fn default_lerp_frames() -> u32 {
    60
}

fn default_composites() -> Vec<Vec<usize>> {
    vec![vec![0, 1], vec![0, 4], vec![0], vec![1], vec![2], vec![3], vec![4], vec![5]]
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_time: 0.0,
            num_frames: default_num_frames(),
            fps: default_fps(),
            lerp_frames: default_lerp_frames(),
            format: ExportFormat::default(),
            composites: default_composites(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivFxConfig {
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    #[serde(default = "default_prelude_root")]
    pub prelude_root: PathBuf,
    /// Prelude file name, relative to `prelude_root`.
    #[serde(default = "default_prelude_file")]
    pub prelude_file: PathBuf,
    #[serde(default = "default_export_root")]
    pub export_root: PathBuf,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_window_size")]
    pub window_size: [u32; 2],
    #[serde(default = "default_export_size")]
    pub export_size: [u32; 2],
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_prelude_root() -> PathBuf {
    PathBuf::from("assets/prelude")
}

fn default_prelude_file() -> PathBuf {
    PathBuf::from("prelude.wgsl")
}

fn default_export_root() -> PathBuf {
    PathBuf::from("export/raw")
}

fn default_window_size() -> [u32; 2] {
    [1920, 1080]
}

fn default_export_size() -> [u32; 2] {
    [CARD_WIDTH, CARD_HEIGHT]
}

impl Default for DivFxConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            prelude_root: default_prelude_root(),
            prelude_file: default_prelude_file(),
            export_root: default_export_root(),
            mode: Mode::default(),
            window_size: default_window_size(),
            export_size: default_export_size(),
            export: ExportConfig::default(),
        }
    }
}

impl DivFxConfig {
    /// Load from an explicit file. Missing or malformed files are errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load_default() -> Result<Self> {
        let path = default_path();
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Full path of the prelude file.
    pub fn prelude_path(&self) -> PathBuf {
        self.prelude_root.join(&self.prelude_file)
    }

    /// Reject values the renderer cannot run with.
    pub fn validate(&self) -> Result<()> {
        let sizes = [("window_size", self.window_size), ("export_size", self.export_size)];
        for (name, [w, h]) in sizes {
            if w == 0 || h == 0 {
                return Err(Error::Config(format!("{name} must be non-zero, got {w}x{h}")));
            }
        }
        let export = &self.export;
        if export.fps <= 0.0 || !export.fps.is_finite() {
            return Err(Error::Config(format!("fps must be positive, got {}", export.fps)));
        }
        if export.num_frames == 0 {
            return Err(Error::Config("num_frames must be at least 1".into()));
        }
        if export.lerp_frames >= export.num_frames {
            return Err(Error::Config(format!(
                "lerp_frames ({}) must be smaller than num_frames ({})",
                export.lerp_frames, export.num_frames
            )));
        }
        if export.composites.iter().any(Vec::is_empty) {
            return Err(Error::Config("composites must not contain empty layer lists".into()));
        }
        Ok(())
    }
}

/// Parse a `WIDTHxHEIGHT` size argument.
pub fn parse_size(s: &str) -> std::result::Result<[u32; 2], String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width `{w}`: {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height `{h}`: {e}"))?;
    Ok([w, h])
}

/// Parse a comma separated composite such as `0,1`.
pub fn parse_composite(s: &str) -> std::result::Result<Vec<usize>, String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| format!("bad layer index `{part}`: {e}"))
        })
        .collect()
}
