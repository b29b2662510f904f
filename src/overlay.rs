//! Text panels rendered into RGBA textures with fontdue. Each panel owns
//! its texture and bind group; `set_lines` re-rasterizes the pixel buffer
//! and `upload` pushes it to the GPU only when something changed. The font
//! (and its glyph cache) is owned by the application context and shared by
//! every panel.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use fontdue::{Font, FontSettings, Metrics};

use crate::texture::prepare_rgba_upload;

pub const FONT_SIZE_PX: f32 = 18.0;

#[derive(Clone)]
struct GlyphBitmap {
    width: u32,
    height: u32,
    xmin: i32,
    ymin: i32,
    alpha: Arc<[u8]>,
}

impl GlyphBitmap {
    fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            xmin: 0,
            ymin: 0,
            alpha: Arc::<[u8]>::from([]),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GlyphLayout {
    pub line_height: u32,
    pub cell_advance: u32,
    ascent: i32,
    left_bearing: i32,
}

/// A rasterizing font with a per-character bitmap cache. Monospace-style
/// layout: every glyph advances by the widest cell the font produced over
/// printable ASCII.
pub struct OverlayFont {
    font: Font,
    size: f32,
    layout: GlyphLayout,
    cache: HashMap<char, GlyphBitmap>,
}

impl OverlayFont {
    pub fn from_bytes(bytes: &[u8], size: f32) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|err| anyhow!("parsing overlay font: {err}"))?;
        let layout = GlyphLayout::from_font(&font, size);
        Ok(Self {
            font,
            size,
            layout,
            cache: HashMap::new(),
        })
    }

    pub fn layout(&self) -> GlyphLayout {
        self.layout
    }

    fn glyph(&mut self, ch: char) -> GlyphBitmap {
        if let Some(glyph) = self.cache.get(&ch) {
            return glyph.clone();
        }
        let glyph = self
            .rasterize(ch)
            .or_else(|| self.rasterize('?'))
            .unwrap_or_else(GlyphBitmap::empty);
        self.cache.insert(ch, glyph.clone());
        glyph
    }

    fn rasterize(&self, ch: char) -> Option<GlyphBitmap> {
        let glyph_index = self.font.lookup_glyph_index(ch);
        if glyph_index == 0 && ch != '?' && ch != ' ' {
            return None;
        }
        let (metrics, bitmap) = self.font.rasterize_indexed(glyph_index, self.size);
        Some(GlyphBitmap {
            width: metrics.width as u32,
            height: metrics.height as u32,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            alpha: Arc::from(bitmap.into_boxed_slice()),
        })
    }
}

impl GlyphLayout {
    fn from_font(font: &Font, size: f32) -> Self {
        let mut min_xmin = 0;
        let mut max_xmax = 0;
        let mut min_ymin = 0;
        let mut max_ymax = 0;
        let mut max_advance = 0.0f32;
        let mut initialized = false;

        for ch in (32u8..=126).map(|b| b as char) {
            let glyph_index = font.lookup_glyph_index(ch);
            let metrics: Metrics = font.metrics_indexed(glyph_index, size);
            max_advance = max_advance.max(metrics.advance_width);

            if metrics.width == 0 && metrics.height == 0 {
                initialized = true;
                continue;
            }

            let xmax = metrics.xmin + metrics.width as i32;
            let ymax = metrics.ymin + metrics.height as i32;
            if !initialized {
                min_xmin = metrics.xmin;
                max_xmax = xmax;
                min_ymin = metrics.ymin;
                max_ymax = ymax;
                initialized = true;
            } else {
                min_xmin = min_xmin.min(metrics.xmin);
                max_xmax = max_xmax.max(xmax);
                min_ymin = min_ymin.min(metrics.ymin);
                max_ymax = max_ymax.max(ymax);
            }
        }

        if !initialized {
            return Self {
                line_height: 1,
                cell_advance: 1,
                ascent: 0,
                left_bearing: 0,
            };
        }

        let left_bearing = -min_xmin;
        let descent = -min_ymin;
        let ascent = max_ymax;
        let cell_width = (left_bearing + max_xmax).max(1) as u32;
        let advance = max_advance.max(cell_width as f32).ceil() as u32;

        Self {
            line_height: (ascent + descent).max(1) as u32,
            cell_advance: advance.max(1),
            ascent,
            left_bearing,
        }
    }
}

pub struct TextOverlayConfig {
    pub width: u32,
    pub height: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pub label: &'static str,
}

pub struct TextOverlay {
    texture: wgpu::Texture,
    _sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    padding_x: u32,
    padding_y: u32,
    dirty: bool,
    visible: bool,
}

impl TextOverlay {
    const FG_COLOR: [u8; 4] = [255, 255, 255, 235];
    const BG_COLOR: [u8; 4] = [16, 20, 28, 200];

    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bind_group_layout: &wgpu::BindGroupLayout,
        config: TextOverlayConfig,
    ) -> Result<Self> {
        let extent = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(config.label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(config.label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(config.label),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let mut overlay = Self {
            texture,
            _sampler: sampler,
            bind_group,
            pixels: vec![0u8; (config.width * config.height * 4) as usize],
            width: config.width,
            height: config.height,
            padding_x: config.padding_x,
            padding_y: config.padding_y,
            dirty: true,
            visible: false,
        };
        overlay.fill_background();
        overlay.upload(queue);
        Ok(overlay)
    }

    /// Re-rasterizes the panel from wrapped lines. Visibility is managed by
    /// the caller; an empty line set just leaves the bare background.
    pub fn set_lines(&mut self, font: &mut OverlayFont, lines: &[String]) {
        self.fill_background();

        let usable_width = self.width.saturating_sub(self.padding_x * 2);
        let usable_height = self.height.saturating_sub(self.padding_y * 2);
        let layout = font.layout();
        let glyph_width = layout.cell_advance.max(1);
        let glyph_height = layout.line_height.max(1);
        let max_cols = (usable_width / glyph_width) as usize;
        let max_rows = (usable_height / glyph_height) as usize;
        if max_cols == 0 || max_rows == 0 {
            self.dirty = true;
            return;
        }

        let display_lines = wrap_lines(lines, max_cols, max_rows);
        for (row_idx, line) in display_lines.iter().enumerate() {
            let line_top = self.padding_y + row_idx as u32 * glyph_height;
            for (col_idx, ch) in line.chars().take(max_cols).enumerate() {
                if ch == '\r' {
                    continue;
                }
                let glyph = font.glyph(ch);
                let glyph_col = self.padding_x + col_idx as u32 * glyph_width;
                self.blit_glyph(glyph_col, line_top, &glyph, &layout);
            }
        }
        self.dirty = true;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn upload(&mut self, queue: &wgpu::Queue) {
        if !self.dirty {
            return;
        }
        let upload = match prepare_rgba_upload(self.width, self.height, &self.pixels) {
            Ok(upload) => upload,
            Err(err) => {
                log::warn!(
                    "overlay upload failed ({}x{}): {err}",
                    self.width,
                    self.height
                );
                return;
            }
        };
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            upload.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(upload.bytes_per_row()),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.dirty = false;
    }

    fn fill_background(&mut self) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&Self::BG_COLOR);
        }
    }

    fn blit_glyph(&mut self, cell_x: u32, line_top: u32, glyph: &GlyphBitmap, layout: &GlyphLayout) {
        if glyph.width == 0 || glyph.height == 0 {
            return;
        }

        let start_x = cell_x as i32 + layout.left_bearing + glyph.xmin;
        let baseline = line_top as i32 + layout.ascent;
        let glyph_ymax = glyph.ymin + glyph.height as i32;
        let start_y = baseline - glyph_ymax;

        for gy in 0..glyph.height {
            let dest_y = start_y + gy as i32;
            if dest_y < 0 || dest_y >= self.height as i32 {
                continue;
            }
            let source_row_offset = gy as usize * glyph.width as usize;
            for gx in 0..glyph.width {
                let coverage = glyph.alpha[source_row_offset + gx as usize];
                if coverage == 0 {
                    continue;
                }
                let dest_x = start_x + gx as i32;
                if dest_x < 0 || dest_x >= self.width as i32 {
                    continue;
                }
                let idx = ((dest_y as u32 * self.width + dest_x as u32) * 4) as usize;
                let alpha = ((coverage as u16 * Self::FG_COLOR[3] as u16) / u8::MAX as u16) as u8;
                self.pixels[idx..idx + 4].copy_from_slice(&[
                    Self::FG_COLOR[0],
                    Self::FG_COLOR[1],
                    Self::FG_COLOR[2],
                    alpha,
                ]);
            }
        }
    }
}

/// Splits input lines on embedded newlines and wraps them to the panel's
/// column grid, truncating past `max_rows`.
pub fn wrap_lines(lines: &[String], max_cols: usize, max_rows: usize) -> Vec<String> {
    if max_cols == 0 || max_rows == 0 {
        return Vec::new();
    }
    let mut result = Vec::new();
    for line in lines {
        if result.len() >= max_rows {
            break;
        }
        for segment in line.split('\n') {
            if result.len() >= max_rows {
                break;
            }
            wrap_segment(&mut result, segment, max_cols, max_rows);
        }
    }
    result
}

fn wrap_segment(out: &mut Vec<String>, segment: &str, max_cols: usize, max_rows: usize) {
    if out.len() >= max_rows {
        return;
    }
    if segment.is_empty() {
        out.push(String::new());
        return;
    }

    let mut buffer = String::new();
    let mut count = 0;
    for ch in segment.chars() {
        buffer.push(ch);
        count += 1;
        if count == max_cols {
            if out.len() >= max_rows {
                return;
            }
            out.push(mem::take(&mut buffer));
            count = 0;
        }
    }

    if count > 0 && out.len() < max_rows {
        out.push(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_lines_pass_through() {
        assert_eq!(
            wrap_lines(&lines(&["abc", "de"]), 10, 4),
            lines(&["abc", "de"])
        );
    }

    #[test]
    fn long_lines_wrap_to_columns() {
        assert_eq!(
            wrap_lines(&lines(&["abcdefgh"]), 3, 4),
            lines(&["abc", "def", "gh"])
        );
    }

    #[test]
    fn rows_are_truncated() {
        assert_eq!(wrap_lines(&lines(&["abcdef"]), 2, 2), lines(&["ab", "cd"]));
    }

    #[test]
    fn embedded_newlines_split_segments() {
        assert_eq!(
            wrap_lines(&lines(&["ab\ncd"]), 10, 4),
            lines(&["ab", "cd"])
        );
    }

    #[test]
    fn degenerate_grids_produce_nothing() {
        assert!(wrap_lines(&lines(&["abc"]), 0, 4).is_empty());
        assert!(wrap_lines(&lines(&["abc"]), 4, 0).is_empty());
    }
}
