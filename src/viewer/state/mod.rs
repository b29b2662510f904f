//! Central runtime state for the showroom. Owns the wgpu device/surface,
//! the camera with its orbit controller and hotspot dispatcher, and the HUD
//! panels, and exposes the small surface the event loop in `main.rs`
//! drives. Submodules cover lifecycle slices: `init` for setup and asset
//! installation, `layout` for resize handling, `render` for per-frame
//! advance and draw passes, and `input` for pointer/key routing.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use wgpu::SurfaceError;
use winit::{dpi::PhysicalSize, event::KeyEvent, window::Window};

use crate::assets::{LoadEvent, ShowAssets};
use crate::camera::{Camera, Projection};
use crate::hotspots::HotspotDispatcher;
use crate::layout::PanelRect;
use crate::orbit::OrbitController;
use crate::overlay::{OverlayFont, TextOverlay};
use crate::scene::LightingRig;

use super::mesh::GpuMesh;

mod init;
mod input;
mod layout;
mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadStatus {
    Loading,
    Ready,
    Failed,
}

pub struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,

    scene_pipeline: wgpu::RenderPipeline,
    glass_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    mesh_bind_layout: wgpu::BindGroupLayout,
    scene_uniform_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    sampler: wgpu::Sampler,

    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    quad_index_count: u32,

    ground: GpuMesh,
    car_opaque: Vec<GpuMesh>,
    car_glass: Vec<GpuMesh>,

    lighting: LightingRig,
    camera: Camera,
    projection: Projection,
    orbit: OrbitController,
    hotspots: HotspotDispatcher,

    font: OverlayFont,
    explanation: TextOverlay,
    legend: TextOverlay,
    loading: TextOverlay,
    explanation_rect: PanelRect,

    load_status: LoadStatus,
    cursor: Option<(f32, f32)>,
    last_frame: Instant,
}

impl ViewerState {
    pub async fn new(window: Arc<Window>, font_bytes: Vec<u8>) -> Result<Self> {
        init::new_state(window, font_bytes).await
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        layout::resize(self, new_size);
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        render::render(self, Instant::now())
    }

    pub fn handle_key(&mut self, event: &KeyEvent) {
        input::key_pressed(self, event);
    }

    pub fn mouse_pressed(&mut self) {
        input::mouse_pressed(self);
    }

    pub fn mouse_released(&mut self) {
        input::mouse_released(self);
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        input::cursor_moved(self, x, y);
    }

    pub fn scrolled(&mut self, amount: f32) {
        input::scrolled(self, amount);
    }

    /// Applies one loader message. Progress updates the loading readout;
    /// completion attaches the car to the scene; failure is logged and the
    /// scene simply stays empty.
    pub fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress { done, total, label } => {
                if self.load_status != LoadStatus::Loading {
                    return;
                }
                let percent = (done as f32 / total.max(1) as f32 * 100.0).round() as u32;
                let lines = vec![
                    "Loading showroom".to_string(),
                    format!("{label} ({done}/{total}, {percent}%)"),
                ];
                self.loading.set_lines(&mut self.font, &lines);
                self.loading.set_visible(true);
            }
            LoadEvent::Loaded(assets) => {
                if let Err(err) = self.install_assets(*assets) {
                    log::error!("attaching loaded model failed: {err:#}");
                    self.load_status = LoadStatus::Failed;
                } else {
                    self.load_status = LoadStatus::Ready;
                }
                self.loading.set_visible(false);
            }
            LoadEvent::Failed(message) => {
                log::error!("asset load failed: {message}");
                self.load_status = LoadStatus::Failed;
                self.loading.set_visible(false);
            }
        }
    }

    fn install_assets(&mut self, assets: ShowAssets) -> Result<()> {
        init::install_assets(self, assets)
    }
}
