//! RGBA texture upload helpers shared by the car materials, the ground, and
//! the HUD panels. wgpu requires row pitches aligned to 256 bytes, so
//! uploads go through `prepare_rgba_upload`, which pads rows only when it
//! has to.

use std::borrow::Cow;

use anyhow::{Result, ensure};

pub struct TextureUpload<'a> {
    data: Cow<'a, [u8]>,
    bytes_per_row: u32,
}

impl<'a> TextureUpload<'a> {
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }
}

pub fn prepare_rgba_upload<'a>(width: u32, height: u32, data: &'a [u8]) -> Result<TextureUpload<'a>> {
    ensure!(width > 0 && height > 0, "texture has no dimensions");
    let row_bytes = 4usize * width as usize;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    ensure!(
        data.len() >= row_bytes * height as usize,
        "texture buffer ({}) smaller than {}x{} RGBA ({})",
        data.len(),
        width,
        height,
        row_bytes * height as usize
    );

    if row_bytes % alignment == 0 && data.len() == row_bytes * height as usize {
        return Ok(TextureUpload {
            data: Cow::Borrowed(data),
            bytes_per_row: row_bytes as u32,
        });
    }

    let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;
    let mut buffer = vec![0u8; padded_row_bytes * height as usize];
    for row in 0..height as usize {
        let src_offset = row * row_bytes;
        let dst_offset = row * padded_row_bytes;
        buffer[dst_offset..dst_offset + row_bytes]
            .copy_from_slice(&data[src_offset..src_offset + row_bytes]);
    }

    Ok(TextureUpload {
        data: Cow::Owned(buffer),
        bytes_per_row: padded_row_bytes as u32,
    })
}

/// Creates an sRGB texture and writes `data` into it.
pub fn create_rgba_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<(wgpu::Texture, wgpu::TextureView)> {
    let upload = prepare_rgba_upload(width, height, data)?;
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        upload.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(upload.bytes_per_row()),
            rows_per_image: Some(height),
        },
        extent,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok((texture, view))
}

/// One-pixel solid color texture; used for untextured surfaces such as the
/// ground plane.
pub fn create_solid_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    color: [u8; 4],
) -> Result<(wgpu::Texture, wgpu::TextureView)> {
    create_rgba_texture(device, queue, label, 1, 1, &color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_rows_are_borrowed() {
        // 64 px * 4 bytes = 256, already aligned.
        let data = vec![7u8; 64 * 2 * 4];
        let upload = prepare_rgba_upload(64, 2, &data).expect("upload");
        assert_eq!(upload.bytes_per_row(), 256);
        assert_eq!(upload.pixels().len(), data.len());
    }

    #[test]
    fn unaligned_rows_are_padded() {
        let data = vec![9u8; 10 * 3 * 4];
        let upload = prepare_rgba_upload(10, 3, &data).expect("upload");
        assert_eq!(upload.bytes_per_row(), 256);
        assert_eq!(upload.pixels().len(), 256 * 3);
        // Row payload survives at the start of each padded row.
        assert_eq!(&upload.pixels()[..40], &data[..40]);
        assert_eq!(&upload.pixels()[256..296], &data[40..80]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let data = vec![0u8; 8];
        assert!(prepare_rgba_upload(10, 3, &data).is_err());
        assert!(prepare_rgba_upload(0, 3, &data).is_err());
    }
}
