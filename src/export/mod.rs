//! Batch export of loop-blended frame sequences.
//!
//! Each composite (an ordered list of layer indices) is rendered for
//! `num_frames` frames and written as one numbered image per frame. A failing
//! composite is logged and recorded; the exporter moves on to the next one.

mod blend;
mod gpu;

pub use blend::{blend_frames, lerp_factor, wrapped_frame};
pub use gpu::GpuCompositor;

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::config::{ExportConfig, ExportFormat};
use crate::error::{Error, Result};

const WEBP_QUALITY: f32 = 90.0;

/// Anything that can render a composite of layers at a point in time.
pub trait FrameSource {
    /// Called once before the frames of `composite` are requested.
    fn begin_composite(&mut self, _composite: &[usize]) -> Result<()> {
        Ok(())
    }

    /// Draw the layers of `composite` in order at `time` and capture the result.
    fn render_frame(&mut self, composite: &[usize], time: f64) -> Result<RgbaImage>;
}

/// `div_bg_0_1` for composite `[0, 1]`.
pub fn composite_name(composite: &[usize]) -> String {
    composite.iter().fold(String::from("div_bg"), |name, index| format!("{name}_{index}"))
}

/// `<root>/<name>-<frame:04>.<ext>`.
pub fn frame_path(root: &Path, name: &str, frame: u32, format: ExportFormat) -> PathBuf {
    root.join(format!("{name}-{frame:04}.{}", format.extension()))
}

/// Outcome of one composite.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeReport {
    pub name: String,
    pub frames_written: u32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub composites: Vec<CompositeReport>,
}

impl ExportReport {
    pub fn failures(&self) -> impl Iterator<Item = &CompositeReport> {
        self.composites.iter().filter(|c| c.error.is_some())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn frames_written(&self) -> u32 {
        self.composites.iter().map(|c| c.frames_written).sum()
    }
}

/// Drives a [`FrameSource`] over every configured composite.
#[derive(Debug, Clone)]
pub struct Exporter {
    export_root: PathBuf,
    config: ExportConfig,
}

impl Exporter {
    pub fn new(export_root: impl Into<PathBuf>, config: ExportConfig) -> Self {
        Self {
            export_root: export_root.into(),
            config,
        }
    }

    /// Export every composite. Only failing to create the export root is fatal.
    pub fn run(&self, source: &mut impl FrameSource) -> Result<ExportReport> {
        std::fs::create_dir_all(&self.export_root)?;

        let mut report = ExportReport::default();
        for composite in &self.config.composites {
            let name = composite_name(composite);
            let mut written = 0;
            let error = match self.export_composite(source, composite, &name, &mut written) {
                Ok(()) => {
                    tracing::info!("Exported {name}: {written} frames");
                    None
                }
                Err(e) => {
                    tracing::error!("Export of {name} failed after {written} frames: {e}");
                    Some(e.to_string())
                }
            };
            report.composites.push(CompositeReport {
                name,
                frames_written: written,
                error,
            });
        }
        Ok(report)
    }

    fn export_composite(
        &self,
        source: &mut impl FrameSource,
        composite: &[usize],
        name: &str,
        written: &mut u32,
    ) -> Result<()> {
        let cfg = &self.config;
        source.begin_composite(composite)?;

        for frame in 0..cfg.num_frames {
            let mut image = source.render_frame(composite, self.frame_time(i64::from(frame)))?;
            if let Some(old) = wrapped_frame(frame, cfg.num_frames, cfg.lerp_frames) {
                let wrapped = source.render_frame(composite, self.frame_time(old))?;
                if wrapped.dimensions() != image.dimensions() {
                    return Err(Error::Capture(format!(
                        "wrapped frame is {:?}, expected {:?}",
                        wrapped.dimensions(),
                        image.dimensions()
                    )));
                }
                blend_frames(&mut image, &wrapped, lerp_factor(old, cfg.lerp_frames));
            }

            let path = frame_path(&self.export_root, name, frame, cfg.format);
            save_frame(&image, &path, cfg.format)?;
            tracing::debug!("Wrote {}", path.display());
            *written += 1;
        }
        Ok(())
    }

    fn frame_time(&self, frame: i64) -> f64 {
        self.config.base_time + frame as f64 / self.config.fps
    }
}

/// Write one frame in `format`.
pub fn save_frame(image: &RgbaImage, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Png => image.save_with_format(path, image::ImageFormat::Png)?,
        ExportFormat::Webp => {
            let encoded = webp::Encoder::from_rgba(image.as_raw(), image.width(), image.height())
                .encode(WEBP_QUALITY);
            std::fs::write(path, &*encoded)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_names_concatenate_indices() {
        assert_eq!(composite_name(&[0, 1]), "div_bg_0_1");
        assert_eq!(composite_name(&[5]), "div_bg_5");
    }

    #[test]
    fn frame_paths_are_zero_padded() {
        let root = Path::new("/out");
        assert_eq!(
            frame_path(root, "div_bg_0_4", 7, ExportFormat::Png),
            PathBuf::from("/out/div_bg_0_4-0007.png")
        );
        assert_eq!(
            frame_path(root, "div_bg_2", 299, ExportFormat::Webp),
            PathBuf::from("/out/div_bg_2-0299.webp")
        );
    }

    #[test]
    fn report_tracks_failures() {
        let report = ExportReport {
            composites: vec![
                CompositeReport { name: "a".into(), frames_written: 3, error: None },
                CompositeReport { name: "b".into(), frames_written: 1, error: Some("boom".into()) },
            ],
        };
        assert!(!report.is_success());
        assert_eq!(report.failures().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["b"]);
        assert_eq!(report.frames_written(), 4);
    }
}
