//! Offscreen render target with blocking pixel read-back.

use image::RgbaImage;

use super::RenderContext;
use crate::error::{Error, Result};

/// Rows copied out of a texture must start on this boundary.
const ROW_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// Padded bytes per row for a `width`-pixel RGBA row.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    (width * 4).div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
}

/// Colour target layers are composited into before capture.
#[derive(Debug)]
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: [u32; 2],
}

impl OffscreenTarget {
    /// Fails when `size` exceeds the device's texture limit.
    pub fn new(ctx: &RenderContext, size: [u32; 2]) -> Result<Self> {
        ctx.check_texture_size(size)?;
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Export Render Target"),
            size: wgpu::Extent3d { width: size[0], height: size[1], depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ctx.target_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { texture, view, size })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Submit `encoder`, copy the target out and wait for the pixels.
    pub fn read_back(
        &self,
        ctx: &RenderContext,
        mut encoder: wgpu::CommandEncoder,
    ) -> Result<RgbaImage> {
        let [width, height] = self.size;
        let bytes_per_row = padded_bytes_per_row(width);
        let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Export Read-back Buffer"),
            size: u64::from(bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = output_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        ctx.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(std::time::Duration::from_secs(10)),
            })
            .map_err(|e| Error::Capture(format!("GPU poll failed: {e}")))?;
        receiver
            .recv()
            .map_err(|_| Error::Capture("map callback dropped".into()))?
            .map_err(|e| Error::Capture(format!("buffer map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let image = unpad_rows(&data, width, height, bytes_per_row);
        drop(data);
        output_buffer.unmap();
        image.ok_or_else(|| Error::Capture("read-back size mismatch".into()))
    }
}

/// Strip row padding from a mapped buffer.
fn unpad_rows(data: &[u8], width: u32, height: u32, bytes_per_row: u32) -> Option<RgbaImage> {
    let row_bytes = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(bytes_per_row as usize).take(height as usize) {
        pixels.extend_from_slice(row.get(..row_bytes)?);
    }
    RgbaImage::from_raw(width, height, pixels)
}
