//! Explicit rendering context handed to every layer constructor.

use super::samplers::SamplerSet;
use crate::error::{Error, Result};

/// Device, queue, target format and the objects shared by every layer.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
    samplers: SamplerSet,
    view_layout: wgpu::BindGroupLayout,
    pixel_layout: wgpu::BindGroupLayout,
    null_texture: wgpu::TextureView,
}

impl RenderContext {
    /// Wrap an existing device, e.g. the one iced renders with.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let samplers = SamplerSet::new(&device);
        let view_layout = create_view_layout(&device);
        let pixel_layout = create_pixel_layout(&device);
        let null_texture = create_null_texture(&device, &queue);
        Self {
            device,
            queue,
            target_format,
            samplers,
            view_layout,
            pixel_layout,
            null_texture,
        }
    }

    /// Create a windowless device for offscreen rendering.
    pub fn headless(target_format: wgpu::TextureFormat) -> Result<Self> {
        let (device, queue) = pollster::block_on(request_headless_device())?;
        Ok(Self::new(device, queue, target_format))
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    pub fn samplers(&self) -> &SamplerSet {
        &self.samplers
    }

    /// Group 0: view constants.
    pub fn view_layout(&self) -> &wgpu::BindGroupLayout {
        &self.view_layout
    }

    /// Group 1: pixel constants and the sampler block.
    pub fn pixel_layout(&self) -> &wgpu::BindGroupLayout {
        &self.pixel_layout
    }

    /// 1x1 zero texture bound to every empty slot.
    pub fn null_texture(&self) -> &wgpu::TextureView {
        &self.null_texture
    }

    /// Largest width or height a 2D texture may have on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Fail with `Error::Gpu` when `size` cannot back a 2D texture here.
    pub fn check_texture_size(&self, size: [u32; 2]) -> Result<()> {
        check_extent(size, self.max_texture_dimension())
    }
}

fn check_extent([width, height]: [u32; 2], max: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::Gpu(format!("texture size {width}x{height} is empty")));
    }
    if width > max || height > max {
        return Err(Error::Gpu(format!(
            "texture size {width}x{height} exceeds the device limit of {max}"
        )));
    }
    Ok(())
}

async fn request_headless_device() -> Result<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| Error::Gpu(format!("no GPU adapter: {e}")))?;

    let required_features = adapter.features() & wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("divfx device"),
            required_features,
            ..Default::default()
        })
        .await
        .map_err(|e| Error::Gpu(format!("device request failed: {e}")))?;
    tracing::info!("Using adapter {}", adapter.get_info().name);
    Ok((device, queue))
}

fn create_view_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Card View Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_pixel_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }];
    entries.extend(SamplerSet::layout_entries());
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Card Pixel Layout"),
        entries: &entries,
    })
}

fn create_null_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    let size = wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Null Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &[0u8; 4],
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4),
            rows_per_image: Some(1),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Layout for group 2 with one float texture per slot in `0..slot_count`.
pub fn texture_layout(device: &wgpu::Device, slot_count: u32) -> wgpu::BindGroupLayout {
    let entries: Vec<_> = (0..slot_count)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        })
        .collect();
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Card Texture Layout"),
        entries: &entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_within_limit_is_accepted() {
        assert!(check_extent([390, 280], 8192).is_ok());
        assert!(check_extent([8192, 8192], 8192).is_ok());
    }

    #[test]
    fn extent_over_limit_is_a_gpu_error() {
        let err = check_extent([9000, 64], 8192).unwrap_err();
        assert!(matches!(err, Error::Gpu(ref msg) if msg.contains("9000x64")));
        assert!(check_extent([64, 8193], 8192).is_err());
    }

    #[test]
    fn empty_extent_is_rejected() {
        assert!(matches!(check_extent([0, 64], 8192), Err(Error::Gpu(_))));
    }
}
