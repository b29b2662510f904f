//! Pointer and keyboard routing: digit keys and legend clicks select parts,
//! dragging orbits (and hides the explanation), the wheel zooms.

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::Key;

use crate::layout::{self, PANEL_PADDING_Y};
use crate::parts::CarPart;

use super::ViewerState;

pub(super) fn key_pressed(state: &mut ViewerState, event: &KeyEvent) {
    if event.state != ElementState::Pressed {
        return;
    }
    let Key::Character(text) = &event.logical_key else {
        return;
    };
    let part = match text.as_str() {
        "1" => CarPart::Front,
        "2" => CarPart::Back,
        "3" => CarPart::Top,
        "4" => CarPart::Engine,
        "5" => CarPart::Wheels,
        _ => return,
    };
    focus(state, part);
}

pub(super) fn mouse_pressed(state: &mut ViewerState) {
    if let Some((x, y)) = state.cursor {
        let line_height = state.font.layout().line_height;
        if let Some(part) = layout::legend_hit(state.size, line_height, PANEL_PADDING_Y, x, y) {
            focus(state, part);
            return;
        }
    }
    if state.orbit.begin_drag() {
        state.hotspots.notify_drag_start();
    }
}

pub(super) fn mouse_released(state: &mut ViewerState) {
    state.orbit.end_drag();
}

pub(super) fn cursor_moved(state: &mut ViewerState, x: f32, y: f32) {
    if let Some((last_x, last_y)) = state.cursor {
        if state.orbit.is_dragging() {
            state.orbit.drag_by(x - last_x, y - last_y);
        }
    }
    state.cursor = Some((x, y));
}

pub(super) fn scrolled(state: &mut ViewerState, amount: f32) {
    state.orbit.zoom_by(amount);
}

fn focus(state: &mut ViewerState, part: CarPart) {
    log::info!("focusing on {}", part.id());
    state
        .hotspots
        .focus_on_part(part, &state.camera, std::time::Instant::now());
}
