//! Offscreen compositing of card layers on the GPU.

use image::RgbaImage;

use super::FrameSource;
use crate::cards::{CardEffect, CardLayers};
use crate::error::{Error, Result};
use crate::render::{ui_matrix, OffscreenTarget, RenderContext};

/// Renders composites into an offscreen target and reads them back.
pub struct GpuCompositor<'a> {
    ctx: &'a RenderContext,
    layers: &'a mut CardLayers,
    target: OffscreenTarget,
}

impl<'a> GpuCompositor<'a> {
    /// `size` is the export frame size; `ctx` must target an sRGB RGBA8 format.
    pub fn new(ctx: &'a RenderContext, layers: &'a mut CardLayers, size: [u32; 2]) -> Result<Self> {
        let target = OffscreenTarget::new(ctx, size)?;
        Ok(Self { ctx, layers, target })
    }

    fn check_indices(&self, composite: &[usize]) -> Result<()> {
        let count = self.layers.len();
        match composite.iter().find(|&&index| index >= count) {
            Some(&index) => Err(Error::UnknownLayer { index, count }),
            None => Ok(()),
        }
    }
}

impl FrameSource for GpuCompositor<'_> {
    fn begin_composite(&mut self, composite: &[usize]) -> Result<()> {
        self.check_indices(composite)?;
        let transform = ui_matrix(self.target.size());
        for &index in composite {
            self.layers.get_mut(index)?.set_view_transform(transform);
        }
        Ok(())
    }

    fn render_frame(&mut self, composite: &[usize], time: f64) -> Result<RgbaImage> {
        self.check_indices(composite)?;
        let [width, height] = self.target.size();
        let size = [width as f32, height as f32];

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Export Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Export Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_viewport(0.0, 0.0, size[0], size[1], 0.0, 1.0);
            pass.set_scissor_rect(0, 0, width, height);

            for &index in composite {
                let layer = self.layers.get_mut(index)?;
                layer.set_time(time);
                layer.draw(&self.ctx.queue, &mut pass, [0.0, 0.0], size);
            }
        }

        self.target.read_back(self.ctx, encoder)
    }
}
