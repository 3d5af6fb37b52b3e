//! Card layers: one drawable quad per compiled effect variant.
//!
//! Two families exist, [`AtlasEffectsLayer`] and [`Draw2DLayer`]. They differ
//! only in their pixel constant layout, its defaults and the textures they
//! register; drawing is shared through [`base::LayerBase`].

pub mod atlas;
pub mod base;
pub mod binder;
mod collection;
pub mod draw2d;

pub use atlas::{AtlasConstants, AtlasEffectsLayer};
pub use binder::{ResourceBinder, TextureBinding, TextureBindings, TextureRegistry};
pub use collection::{CardLayers, CompiledVariant, Family, VariantSet, VariantSpec, VARIANTS};
pub use draw2d::{Draw2DConstants, Draw2DLayer};

use crate::render::Mat4;
use crate::shader::CompiledProgram;

pub const CARD_WIDTH: u32 = 390;
pub const CARD_HEIGHT: u32 = 280;

/// A named variant: the shared vertex program plus its own pixel program.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderVariant {
    pub name: String,
    pub vertex: CompiledProgram,
    pub pixel: CompiledProgram,
}

impl ShaderVariant {
    /// Pixel program output, used for reflection.
    pub fn bytecode(&self) -> &[u8] {
        self.pixel.bytecode()
    }
}

/// What a runner needs from a layer.
///
/// `prepare` writes this frame's quad and any dirty constants through the
/// queue; `record` encodes the draw. Queue writes land before the submitted
/// commands run, so a layer is drawn at most once per submission.
pub trait CardEffect {
    fn name(&self) -> &str;

    /// Update the time constant only.
    fn set_time(&mut self, time: f64);

    fn set_view_transform(&mut self, transform: Mat4);

    fn prepare(&mut self, queue: &wgpu::Queue, pos: [f32; 2], size: [f32; 2]);

    fn record(&self, pass: &mut wgpu::RenderPass<'_>);

    fn draw(
        &mut self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        pos: [f32; 2],
        size: [f32; 2],
    ) {
        self.prepare(queue, pos, size);
        self.record(pass);
    }
}

/// A layer of either family.
#[derive(Debug)]
pub enum CardLayer {
    Atlas(AtlasEffectsLayer),
    Draw2D(Draw2DLayer),
}

impl CardEffect for CardLayer {
    fn name(&self) -> &str {
        match self {
            CardLayer::Atlas(l) => l.name(),
            CardLayer::Draw2D(l) => l.name(),
        }
    }

    fn set_time(&mut self, time: f64) {
        match self {
            CardLayer::Atlas(l) => l.set_time(time),
            CardLayer::Draw2D(l) => l.set_time(time),
        }
    }

    fn set_view_transform(&mut self, transform: Mat4) {
        match self {
            CardLayer::Atlas(l) => l.set_view_transform(transform),
            CardLayer::Draw2D(l) => l.set_view_transform(transform),
        }
    }

    fn prepare(&mut self, queue: &wgpu::Queue, pos: [f32; 2], size: [f32; 2]) {
        match self {
            CardLayer::Atlas(l) => l.prepare(queue, pos, size),
            CardLayer::Draw2D(l) => l.prepare(queue, pos, size),
        }
    }

    fn record(&self, pass: &mut wgpu::RenderPass<'_>) {
        match self {
            CardLayer::Atlas(l) => l.record(pass),
            CardLayer::Draw2D(l) => l.record(pass),
        }
    }
}
