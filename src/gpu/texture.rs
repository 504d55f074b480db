//! Particle sprite texture.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::TextureError;

/// Side of the generated fallback disc, in texels.
const FALLBACK_SIZE: u32 = 32;

/// Decode an image file into tightly packed RGBA8 pixels.
pub fn decode_sprite(path: &Path) -> Result<(Vec<u8>, u32, u32), TextureError> {
    let bytes = std::fs::read(path)?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((rgba.into_raw(), width, height))
}

/// White disc with a soft edge, used when the sprite file cannot be loaded.
pub(crate) fn soft_disc(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    let half = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 + 0.5 - half) / half;
            let dy = (y as f32 + 0.5 - half) / half;
            let r = (dx * dx + dy * dy).sqrt();
            let alpha = (1.0 - r).clamp(0.0, 1.0).powf(0.5);
            data.extend_from_slice(&[255, 255, 255, (alpha * 255.0) as u8]);
        }
    }
    data
}

pub struct SpriteTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl SpriteTexture {
    /// Load the sprite, falling back to a generated disc on failure.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Self {
        let (data, width, height) = match decode_sprite(path) {
            Ok(decoded) => {
                debug!("Loaded sprite {} ({}x{})", path.display(), decoded.1, decoded.2);
                decoded
            }
            Err(e) => {
                warn!("Sprite {} unavailable, using fallback: {}", path.display(), e);
                (soft_disc(FALLBACK_SIZE), FALLBACK_SIZE, FALLBACK_SIZE)
            }
        };
        Self::from_rgba(device, queue, &data, width, height)
    }

    pub fn from_rgba(device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8], width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Sprite Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
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
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = super::linear_sampler(device, "Sprite Sampler");

        Self { texture, view, sampler }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_disc_shape() {
        let size = 16;
        let disc = soft_disc(size);
        assert_eq!(disc.len(), (size * size * 4) as usize);
        let alpha = |x: u32, y: u32| disc[((y * size + x) * 4 + 3) as usize];
        assert_eq!(alpha(0, 0), 0);
        assert!(alpha(8, 8) > 200);
        assert!(alpha(8, 8) > alpha(12, 8));
    }

    #[test]
    fn test_decode_missing_sprite() {
        let result = decode_sprite(Path::new("/definitely/not/a/sprite.png"));
        assert!(matches!(result, Err(TextureError::Io(_))));
    }

    #[test]
    fn test_decode_garbage_sprite() {
        let path = std::env::temp_dir().join(format!("driftfield-sprite-{}.png", std::process::id()));
        std::fs::write(&path, b"not an image").unwrap();
        let result = decode_sprite(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(TextureError::ImageLoad(_))));
    }
}
