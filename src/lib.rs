//! divfx: layered shader-effect cards.
//!
//! Effect variants are WGSL fragment programs compiled once against a shared
//! prelude, bound to their textures by reflected slot, and drawn as card
//! quads. Two runners drive the same layer collection: an interactive iced
//! window and a batch exporter that writes loop-blended frame sequences.

pub mod assets;
pub mod cards;
pub mod config;
pub mod error;
pub mod export;
pub mod iced_app;
pub mod render;
pub mod shader;

use std::sync::Arc;

pub use error::{Error, Result};

use assets::{slurp_text_file, AssetRoots};
use cards::{CardLayers, VariantSet};
use config::{DivFxConfig, Mode};
use export::{ExportReport, Exporter, GpuCompositor};
use render::{RenderContext, TextureStore};
use shader::ShaderCompiler;

/// Exported frames are captured in this format so the saved bytes are sRGB.
pub const EXPORT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Texture lookup roots: the asset root first, then the prelude root.
pub fn asset_roots(config: &DivFxConfig) -> AssetRoots {
    let mut roots = AssetRoots::new();
    roots.add_root(&config.asset_root);
    roots.add_root(&config.prelude_root);
    tracing::debug!("Asset roots: {:?}", roots.roots());
    roots
}

/// Read the prelude and compile the shared vertex program.
pub fn build_compiler(config: &DivFxConfig) -> Result<ShaderCompiler> {
    let prelude_path = config.prelude_path();
    let prelude = slurp_text_file(&prelude_path).map_err(|e| {
        tracing::error!("Failed to read prelude {}: {e}", prelude_path.display());
        e
    })?;
    ShaderCompiler::new(&config.asset_root, prelude)
}

/// Compile every variant. Variants that fail are skipped.
pub fn compile_variants(config: &DivFxConfig) -> Result<VariantSet> {
    let compiler = build_compiler(config)?;
    VariantSet::compile(&compiler)
}

/// Render every configured composite headlessly and write its frames.
pub fn run_batch(config: &DivFxConfig) -> Result<ExportReport> {
    let variants = compile_variants(config)?;
    let ctx = RenderContext::headless(EXPORT_FORMAT)?;
    let mut store = TextureStore::new(asset_roots(config));
    let mut layers = CardLayers::build(&ctx, &mut store, &variants);

    let mut compositor = GpuCompositor::new(&ctx, &mut layers, config.export_size)?;
    let exporter = Exporter::new(&config.export_root, config.export.clone());
    let report = exporter.run(&mut compositor)?;

    tracing::info!(
        "Batch export finished: {} frames, {} failed composite(s)",
        report.frames_written(),
        report.failures().count()
    );
    Ok(report)
}

/// Open the interactive window.
pub fn run_interactive(config: &DivFxConfig) -> Result<()> {
    let variants = compile_variants(config)?;
    iced_app::run_iced_ui(Arc::new(variants), asset_roots(config), config.window_size)
}

/// Validate `config` and dispatch to the configured runner.
pub fn run(config: &DivFxConfig) -> Result<()> {
    config.validate()?;
    match config.mode {
        Mode::Interactive => run_interactive(config),
        Mode::Batch => {
            let report = run_batch(config)?;
            if report.is_success() {
                Ok(())
            } else {
                let names: Vec<_> = report.failures().map(|c| c.name.as_str()).collect();
                Err(Error::Other(format!("export failed for {}", names.join(", "))))
            }
        }
    }
}
