//! Batch export against a fake frame source.

use divfx::config::{ExportConfig, ExportFormat};
use divfx::export::{Exporter, FrameSource};
use divfx::{Error, Result};
use image::{Rgba, RgbaImage};

/// Solid frames: 200 at non-negative time, 100 before the loop start.
struct SolidSource {
    fail_on: Option<usize>,
    begun: Vec<Vec<usize>>,
}

impl SolidSource {
    fn new() -> Self {
        Self { fail_on: None, begun: Vec::new() }
    }
}

impl FrameSource for SolidSource {
    fn begin_composite(&mut self, composite: &[usize]) -> Result<()> {
        self.begun.push(composite.to_vec());
        match self.fail_on {
            Some(bad) if composite.contains(&bad) => {
                Err(Error::UnknownLayer { index: bad, count: 6 })
            }
            _ => Ok(()),
        }
    }

    fn render_frame(&mut self, _composite: &[usize], time: f64) -> Result<RgbaImage> {
        let value = if time < 0.0 { 100 } else { 200 };
        Ok(RgbaImage::from_pixel(4, 2, Rgba([value, value, value, 255])))
    }
}

fn config(composites: Vec<Vec<usize>>) -> ExportConfig {
    ExportConfig {
        base_time: 0.0,
        num_frames: 300,
        fps: 60.0,
        lerp_frames: 60,
        format: ExportFormat::Png,
        composites,
    }
}

fn red_at(dir: &std::path::Path, name: &str) -> u8 {
    image::open(dir.join(name)).unwrap().to_rgba8().get_pixel(0, 0)[0]
}

#[test]
fn composite_writes_three_hundred_numbered_frames() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(dir.path(), config(vec![vec![0, 1]]));
    let report = exporter.run(&mut SolidSource::new()).unwrap();

    assert!(report.is_success());
    assert_eq!(report.frames_written(), 300);
    assert_eq!(report.composites[0].name, "div_bg_0_1");

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 300);
    assert_eq!(names.first().map(String::as_str), Some("div_bg_0_1-0000.png"));
    assert_eq!(names.last().map(String::as_str), Some("div_bg_0_1-0299.png"));
}

#[test]
fn tail_frames_blend_toward_negative_time() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(dir.path(), config(vec![vec![2]]));
    exporter.run(&mut SolidSource::new()).unwrap();

    assert_eq!(red_at(dir.path(), "div_bg_2-0000.png"), 200);
    assert_eq!(red_at(dir.path(), "div_bg_2-0239.png"), 200);
    // 200 + (100 - 200) * 1/61
    assert_eq!(red_at(dir.path(), "div_bg_2-0240.png"), 198);
    // 200 + (100 - 200) * 60/61
    assert_eq!(red_at(dir.path(), "div_bg_2-0299.png"), 101);

    let reds: Vec<u8> = (240..300)
        .map(|f| red_at(dir.path(), &format!("div_bg_2-{f:04}.png")))
        .collect();
    assert!(reds.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn failing_composite_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(vec![vec![0, 9], vec![3]]);
    cfg.num_frames = 4;
    cfg.lerp_frames = 1;
    let exporter = Exporter::new(dir.path(), cfg);

    let mut source = SolidSource { fail_on: Some(9), begun: Vec::new() };
    let report = exporter.run(&mut source).unwrap();

    assert_eq!(source.begun, vec![vec![0, 9], vec![3]]);
    assert!(!report.is_success());
    let failed: Vec<_> = report.failures().map(|c| c.name.as_str()).collect();
    assert_eq!(failed, ["div_bg_0_9"]);
    assert_eq!(report.composites[1].frames_written, 4);
    assert!(dir.path().join("div_bg_3-0003.png").is_file());
    assert!(!dir.path().join("div_bg_0_9-0000.png").exists());
}

#[test]
fn webp_frames_use_webp_extension() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(vec![vec![5]]);
    cfg.num_frames = 2;
    cfg.lerp_frames = 0;
    cfg.format = ExportFormat::Webp;
    Exporter::new(dir.path(), cfg).run(&mut SolidSource::new()).unwrap();

    assert!(dir.path().join("div_bg_5-0000.webp").is_file());
    assert!(dir.path().join("div_bg_5-0001.webp").is_file());
}
