//! Per-frame advance and draw. Every frame first steps the in-flight
//! viewpoint animation and the orbit damping, then mirrors the explanation
//! panel model into its overlay texture, then records three passes: the
//! depth-tested opaque scene, the alpha-blended glass, and the screen-space
//! panels.

use std::time::Instant;

use bytemuck::cast_slice;
use wgpu::SurfaceError;

use crate::layout::{self, PanelRect};
use crate::overlay::TextOverlay;

use super::super::mesh::{GpuMesh, scene_uniform};
use super::{ViewerState, layout as state_layout};

pub(super) fn render(state: &mut ViewerState, now: Instant) -> Result<(), SurfaceError> {
    advance(state, now);

    state.queue.write_buffer(
        &state.scene_uniform_buffer,
        0,
        cast_slice(&[scene_uniform(
            &state.camera,
            &state.projection,
            &state.lighting,
        )]),
    );
    state.explanation.upload(&state.queue);
    state.legend.upload(&state.queue);
    state.loading.upload(&state.queue);

    let frame = state.surface.get_current_texture()?;
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("showroom-encoder"),
        });

    draw_scene(state, &view, &mut encoder);
    draw_glass(state, &view, &mut encoder);
    draw_panels(state, &view, &mut encoder);

    state.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}

/// Steps animation and camera state up to `now`. The flight owns the
/// camera while it runs; afterwards the orbit controller re-derives its
/// bookkeeping so user input continues seamlessly from wherever the camera
/// landed.
fn advance(state: &mut ViewerState, now: Instant) {
    let dt = now.saturating_duration_since(state.last_frame);
    state.last_frame = now;

    if state.hotspots.tick(now, &mut state.camera) {
        state.orbit.sync_from_camera(&state.camera);
    }
    state.orbit.update(dt, &mut state.camera);

    if state.hotspots.panel_mut().take_dirty() {
        let visible = state.hotspots.panel().is_visible();
        if visible {
            let text = state.hotspots.panel().text().to_string();
            state.explanation.set_lines(&mut state.font, &[text]);
            state_layout::refresh_explanation_rect(state);
        }
        state.explanation.set_visible(visible);
    }
}

fn draw_scene(state: &ViewerState, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("scene-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &state.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    pass.set_pipeline(&state.scene_pipeline);
    pass.set_bind_group(0, &state.scene_bind_group, &[]);
    draw_mesh(&mut pass, &state.ground);
    for mesh in &state.car_opaque {
        draw_mesh(&mut pass, mesh);
    }
}

fn draw_glass(state: &ViewerState, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
    if state.car_glass.is_empty() {
        return;
    }
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("glass-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &state.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    pass.set_pipeline(&state.glass_pipeline);
    pass.set_bind_group(0, &state.scene_bind_group, &[]);
    for mesh in &state.car_glass {
        draw_mesh(&mut pass, mesh);
    }
}

fn draw_mesh<'pass>(pass: &mut wgpu::RenderPass<'pass>, mesh: &'pass GpuMesh) {
    pass.set_bind_group(1, &mesh.bind_group, &[]);
    pass.set_vertex_buffer(0, mesh.vertex.slice(..));
    pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
}

fn draw_panels(state: &ViewerState, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
    let panels: Vec<(&TextOverlay, PanelRect)> = [
        (&state.legend, layout::legend_rect(state.size)),
        (&state.loading, layout::loading_rect(state.size)),
        (&state.explanation, state.explanation_rect),
    ]
    .into_iter()
    .filter(|(overlay, rect)| overlay.is_visible() && rect_fits(rect, state))
    .collect();
    if panels.is_empty() {
        return;
    }

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("panel-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    pass.set_pipeline(&state.overlay_pipeline);
    pass.set_vertex_buffer(0, state.quad_vertex_buffer.slice(..));
    pass.set_index_buffer(state.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    for (overlay, rect) in panels {
        pass.set_viewport(rect.x, rect.y, rect.width, rect.height, 0.0, 1.0);
        pass.set_bind_group(0, overlay.bind_group(), &[]);
        pass.draw_indexed(0..state.quad_index_count, 0, 0..1);
    }
}

fn rect_fits(rect: &PanelRect, state: &ViewerState) -> bool {
    rect.x >= 0.0
        && rect.y >= 0.0
        && rect.x + rect.width <= state.size.width as f32
        && rect.y + rect.height <= state.size.height as f32
}
