//! Screen placement for the HUD panels. The explanation panel anchors to
//! the window center plus the viewpoint's offsets (then clamps on-screen);
//! the part legend sits in the top-left corner and the loading readout at
//! the bottom center. All math is plain pixel arithmetic so it can be
//! exercised without a window.

use winit::dpi::PhysicalSize;

use crate::parts::{CarPart, PanelAnchor};

pub const PANEL_MARGIN: f32 = 16.0;
pub const PANEL_PADDING_X: u32 = 12;
pub const PANEL_PADDING_Y: u32 = 10;

pub const EXPLANATION_PANEL_WIDTH: u32 = 320;
pub const EXPLANATION_PANEL_HEIGHT: u32 = 150;
pub const LEGEND_PANEL_WIDTH: u32 = 200;
pub const LEGEND_PANEL_HEIGHT: u32 = 150;
pub const LOADING_PANEL_WIDTH: u32 = 320;
pub const LOADING_PANEL_HEIGHT: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PanelRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Places the explanation panel at window-center plus the viewpoint anchor,
/// clamped so the panel never leaves the window.
pub fn explanation_rect(window: PhysicalSize<u32>, anchor: PanelAnchor) -> PanelRect {
    let width = EXPLANATION_PANEL_WIDTH as f32;
    let height = EXPLANATION_PANEL_HEIGHT as f32;
    let x = window.width as f32 / 2.0 + anchor.dx;
    let y = window.height as f32 / 2.0 + anchor.dy;
    PanelRect {
        x: x.clamp(0.0, (window.width as f32 - width).max(0.0)),
        y: y.clamp(0.0, (window.height as f32 - height).max(0.0)),
        width,
        height,
    }
}

pub fn legend_rect(_window: PhysicalSize<u32>) -> PanelRect {
    PanelRect {
        x: PANEL_MARGIN,
        y: PANEL_MARGIN,
        width: LEGEND_PANEL_WIDTH as f32,
        height: LEGEND_PANEL_HEIGHT as f32,
    }
}

pub fn loading_rect(window: PhysicalSize<u32>) -> PanelRect {
    let width = LOADING_PANEL_WIDTH as f32;
    PanelRect {
        x: ((window.width as f32 - width) / 2.0).max(0.0),
        y: (window.height as f32 - LOADING_PANEL_HEIGHT as f32 - PANEL_MARGIN).max(0.0),
        width,
        height: LOADING_PANEL_HEIGHT as f32,
    }
}

/// Maps a click inside the legend panel to the part row under the cursor.
/// `line_height` and `padding` come from the overlay's glyph grid so the hit
/// rows line up with the rendered lines.
pub fn legend_hit(
    window: PhysicalSize<u32>,
    line_height: u32,
    padding_y: u32,
    x: f32,
    y: f32,
) -> Option<CarPart> {
    let rect = legend_rect(window);
    if !rect.contains(x, y) || line_height == 0 {
        return None;
    }
    let local_y = y - rect.y - padding_y as f32;
    if local_y < 0.0 {
        return None;
    }
    let row = (local_y / line_height as f32) as usize;
    CarPart::ALL.get(row).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> PhysicalSize<u32> {
        PhysicalSize::new(1280, 720)
    }

    #[test]
    fn explanation_panel_sits_left_of_center() {
        let rect = explanation_rect(window(), PanelAnchor { dx: -150.0, dy: 0.0 });
        assert_eq!(rect.x, 1280.0 / 2.0 - 150.0);
        assert_eq!(rect.y, 720.0 / 2.0);
    }

    #[test]
    fn top_anchor_lifts_the_panel() {
        let rect = explanation_rect(window(), PanelAnchor { dx: -150.0, dy: -200.0 });
        assert_eq!(rect.y, 720.0 / 2.0 - 200.0);
    }

    #[test]
    fn explanation_panel_is_clamped_on_small_windows() {
        let tiny = PhysicalSize::new(200, 120);
        let rect = explanation_rect(tiny, PanelAnchor { dx: -150.0, dy: -200.0 });
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn legend_rows_hit_their_parts() {
        let line_height = 22;
        let padding_y = 10;
        let rect = legend_rect(window());
        for (row, part) in CarPart::ALL.iter().enumerate() {
            let y = rect.y + padding_y as f32 + line_height as f32 * row as f32 + 2.0;
            assert_eq!(
                legend_hit(window(), line_height, padding_y, rect.x + 5.0, y),
                Some(*part)
            );
        }
    }

    #[test]
    fn clicks_outside_the_legend_miss() {
        assert_eq!(legend_hit(window(), 22, 10, 640.0, 360.0), None);
        assert_eq!(legend_hit(window(), 22, 10, PANEL_MARGIN + 5.0, 2.0), None);
    }

    #[test]
    fn rows_past_the_part_list_miss() {
        let rect = legend_rect(window());
        let y = rect.y + 10.0 + 22.0 * 6.0;
        assert_eq!(legend_hit(window(), 22, 10, rect.x + 5.0, y), None);
    }
}
