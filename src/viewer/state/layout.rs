use winit::dpi::PhysicalSize;

use crate::layout;

use super::super::mesh::create_depth_view;
use super::ViewerState;

pub(super) fn resize(state: &mut ViewerState, new_size: PhysicalSize<u32>) {
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    state.size = new_size;
    state.config.width = new_size.width;
    state.config.height = new_size.height;
    state.surface.configure(&state.device, &state.config);
    state.depth_view = create_depth_view(&state.device, new_size.width, new_size.height);
    state.projection.resize(new_size.width, new_size.height);
    refresh_explanation_rect(state);
}

/// Re-anchors the explanation panel; called after a reveal and after any
/// resize so the panel tracks the window center.
pub(super) fn refresh_explanation_rect(state: &mut ViewerState) {
    state.explanation_rect = layout::explanation_rect(state.size, state.hotspots.panel().anchor());
}
