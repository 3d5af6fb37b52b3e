//! divfx CLI
//!
//! Usage:
//!   divfx                              # run the configured mode (batch by default)
//!   divfx --mode interactive           # card grid window, PageUp/PageDown to cycle
//!   divfx --composite 0,1 --frames 120 # export one composite
//!   divfx reflect                      # print reflected texture slots per variant

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use divfx::config::{parse_composite, parse_size, DivFxConfig, ExportFormat, Mode};
use divfx::shader::TextureSlotMap;

/// One composite's layer list. Named so clap treats `--composite` as a
/// repeatable single-value flag.
type CompositeArg = Vec<usize>;

#[derive(Parser)]
#[command(name = "divfx")]
#[command(about = "Layered shader-effect card renderer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (JSON). Defaults to ~/.config/divfx/config.json when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<Mode>,

    #[arg(long, global = true)]
    asset_root: Option<PathBuf>,

    #[arg(long, global = true)]
    prelude_root: Option<PathBuf>,

    #[arg(long)]
    export_root: Option<PathBuf>,

    /// Window size, e.g. 1920x1080
    #[arg(long, value_parser = parse_size)]
    window_size: Option<[u32; 2]>,

    /// Exported frame size, e.g. 390x280
    #[arg(long, value_parser = parse_size)]
    export_size: Option<[u32; 2]>,

    /// Frames per composite
    #[arg(long)]
    frames: Option<u32>,

    #[arg(long)]
    fps: Option<f64>,

    /// Trailing frames blended toward the start of the loop
    #[arg(long)]
    lerp_frames: Option<u32>,

    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Layer indices drawn bottom to top, e.g. 0,1. Repeat for more composites.
    #[arg(long = "composite", value_parser = parse_composite)]
    composites: Vec<CompositeArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every variant and print its reflected texture slots
    Reflect,
}

impl Cli {
    fn load_config(&self) -> divfx::Result<DivFxConfig> {
        let mut config = match &self.config {
            Some(path) => DivFxConfig::load_from(path)?,
            None => DivFxConfig::load_default()?,
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(root) = &self.asset_root {
            config.asset_root = root.clone();
        }
        if let Some(root) = &self.prelude_root {
            config.prelude_root = root.clone();
        }
        if let Some(root) = &self.export_root {
            config.export_root = root.clone();
        }
        if let Some(size) = self.window_size {
            config.window_size = size;
        }
        if let Some(size) = self.export_size {
            config.export_size = size;
        }
        if let Some(frames) = self.frames {
            config.export.num_frames = frames;
        }
        if let Some(fps) = self.fps {
            config.export.fps = fps;
        }
        if let Some(lerp) = self.lerp_frames {
            config.export.lerp_frames = lerp;
        }
        if let Some(format) = self.format {
            config.export.format = format;
        }
        if !self.composites.is_empty() {
            config.export.composites = self.composites.clone();
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("divfx=info")),
        )
        .init();

    let cli = Cli::parse();
    let result = cli.load_config().and_then(|config| match cli.command {
        Some(Commands::Reflect) => reflect(&config),
        None => divfx::run(&config),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn reflect(config: &DivFxConfig) -> divfx::Result<()> {
    let variants = divfx::compile_variants(config)?;
    for (index, compiled) in variants.variants().iter().enumerate() {
        let variant = &compiled.variant;
        let slots = TextureSlotMap::reflect(&variant.pixel);
        println!(
            "[{index}] {} ({:?}, {}, {} bytes)",
            variant.name,
            compiled.family,
            variant.pixel.entry_point(),
            variant.bytecode().len()
        );
        for (name, slot) in slots.iter() {
            println!("    t{slot}: {name}");
        }
    }
    Ok(())
}
