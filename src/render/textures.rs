//! Texture loading and caching for card layers.
//!
//! Loaded images are cached by their asset path so every layer asking for
//! the same file shares one GPU texture. The sRGB toggle is a property of
//! the view, not the texture, so the same cached texture can be handed out
//! as linear to one layer and sRGB to another.

use std::collections::HashMap;

use image::imageops::FilterType;
use image::RgbaImage;

use super::RenderContext;
use crate::assets::AssetRoots;
use crate::error::Result;

/// Sizes of every mip level for a texture of `size`, ending at 1x1.
pub fn mip_chain(size: [u32; 2]) -> Vec<[u32; 2]> {
    let mut levels = Vec::new();
    let mut level = [size[0].max(1), size[1].max(1)];
    loop {
        levels.push(level);
        if level == [1, 1] {
            return levels;
        }
        level = [(level[0] / 2).max(1), (level[1] / 2).max(1)];
    }
}

/// Path-keyed texture cache over a set of asset roots.
///
/// Failed loads are cached as `None` so a missing file is probed and
/// reported once.
#[derive(Debug)]
pub struct TextureStore {
    roots: AssetRoots,
    cache: HashMap<String, Option<wgpu::Texture>>,
}

impl TextureStore {
    pub fn new(roots: AssetRoots) -> Self {
        Self {
            roots,
            cache: HashMap::new(),
        }
    }

    /// Number of distinct files currently resident.
    pub fn cached_count(&self) -> usize {
        self.cache.values().filter(|texture| texture.is_some()).count()
    }

    /// Number of paths that failed to load.
    pub fn failed_count(&self) -> usize {
        self.cache.values().filter(|texture| texture.is_none()).count()
    }

    /// Load `path` (relative to the asset roots) and return a view of it.
    ///
    /// Missing, undecodable or oversize files yield `None`; the caller
    /// binds the slot as empty.
    pub fn load(
        &mut self,
        ctx: &RenderContext,
        path: &str,
        srgb: bool,
    ) -> Option<wgpu::TextureView> {
        if let Some(entry) = self.cache.get(path) {
            tracing::debug!("Texture cache hit: {path}");
            return entry.as_ref().map(|texture| create_view(texture, srgb));
        }
        let texture = self.load_uncached(ctx, path);
        let view = texture.as_ref().map(|texture| create_view(texture, srgb));
        self.cache.insert(path.to_string(), texture);
        view
    }

    fn load_uncached(&self, ctx: &RenderContext, path: &str) -> Option<wgpu::Texture> {
        let Some(file) = self.roots.resolve(path) else {
            tracing::warn!("Texture not found in any asset root: {path}");
            return None;
        };
        let image = match decode_image(&file) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Failed to decode texture {}: {e}", file.display());
                return None;
            }
        };
        if let Err(e) = ctx.check_texture_size([image.width(), image.height()]) {
            tracing::warn!("Skipping texture {}: {e}", file.display());
            return None;
        }
        tracing::debug!("Loaded texture {} ({}x{})", file.display(), image.width(), image.height());
        Some(upload_rgba(ctx, path, &image))
    }
}

fn decode_image(path: &std::path::Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

fn create_view(texture: &wgpu::Texture, srgb: bool) -> wgpu::TextureView {
    let format = if srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    texture.create_view(&wgpu::TextureViewDescriptor {
        format: Some(format),
        ..Default::default()
    })
}

/// Upload an image with a box-filtered mip chain.
fn upload_rgba(ctx: &RenderContext, label: &str, image: &RgbaImage) -> wgpu::Texture {
    let levels = mip_chain([image.width(), image.height()]);
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent(levels[0]),
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[wgpu::TextureFormat::Rgba8UnormSrgb],
    });
    for (mip, &[w, h]) in levels.iter().enumerate() {
        if mip == 0 {
            write_level(&ctx.queue, &texture, 0, [w, h], image.as_raw());
        } else {
            let scaled = image::imageops::resize(image, w, h, FilterType::Triangle);
            write_level(&ctx.queue, &texture, mip as u32, [w, h], scaled.as_raw());
        }
    }
    texture
}

/// Solid-colour texture with a full mip chain.
///
/// `value` is a packed `0xAARRGGBB` word, stored little-endian as BGRA.
pub fn generate_solid(ctx: &RenderContext, size: [u32; 2], value: u32) -> wgpu::TextureView {
    let levels = mip_chain(size);
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Generated Texture"),
        size: extent(levels[0]),
        mip_level_count: levels.len() as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Bgra8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (mip, &[w, h]) in levels.iter().enumerate() {
        let data = solid_pixels([w, h], value);
        write_level(&ctx.queue, &texture, mip as u32, [w, h], &data);
    }
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Pixel bytes for one solid level.
pub fn solid_pixels(size: [u32; 2], value: u32) -> Vec<u8> {
    let count = (size[0] * size[1]) as usize;
    value.to_le_bytes().repeat(count)
}

fn extent([width, height]: [u32; 2]) -> wgpu::Extent3d {
    wgpu::Extent3d { width, height, depth_or_array_layers: 1 }
}

fn write_level(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
    size: [u32; 2],
    data: &[u8],
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size[0]),
            rows_per_image: Some(size[1]),
        },
        extent(size),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_of_square_texture_halves_to_one() {
        assert_eq!(mip_chain([16, 16]), vec![[16, 16], [8, 8], [4, 4], [2, 2], [1, 1]]);
    }

    #[test]
    fn mip_chain_clamps_short_axis_at_one() {
        assert_eq!(mip_chain([4, 1]), vec![[4, 1], [2, 1], [1, 1]]);
        let card = mip_chain([390, 280]);
        assert_eq!(card.len(), 9);
        assert_eq!(card[3], [48, 35]);
        assert_eq!(card.last(), Some(&[1, 1]));
        for pair in card.windows(2) {
            assert_eq!(pair[1], [(pair[0][0] / 2).max(1), (pair[0][1] / 2).max(1)]);
        }
    }

    #[test]
    fn mip_chain_of_single_pixel_has_one_level() {
        assert_eq!(mip_chain([1, 1]), vec![[1, 1]]);
    }

    #[test]
    fn solid_pixels_are_bgra_ordered() {
        let px = solid_pixels([2, 1], 0x7DFF_FFFF);
        assert_eq!(px, vec![0xFF, 0xFF, 0xFF, 0x7D, 0xFF, 0xFF, 0xFF, 0x7D]);

        let black = solid_pixels([16, 16], 0xFF00_0000);
        assert_eq!(black.len(), 16 * 16 * 4);
        assert_eq!(&black[..4], &[0, 0, 0, 0xFF]);
    }
}
