//! Device, pipeline, and resource bootstrap, plus attachment of loaded
//! assets to the scene.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use bytemuck::cast_slice;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::assets::ShowAssets;
use crate::camera::{Camera, Projection};
use crate::hotspots::HotspotDispatcher;
use crate::layout::{
    self, EXPLANATION_PANEL_HEIGHT, EXPLANATION_PANEL_WIDTH, LEGEND_PANEL_HEIGHT,
    LEGEND_PANEL_WIDTH, LOADING_PANEL_HEIGHT, LOADING_PANEL_WIDTH, PANEL_PADDING_X,
    PANEL_PADDING_Y,
};
use crate::orbit::{OrbitController, OrbitLimits};
use crate::overlay::{FONT_SIZE_PX, OverlayFont, TextOverlay, TextOverlayConfig};
use crate::parts::{CarPart, PanelAnchor};
use crate::scene::{
    CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR, GROUND_COLOR, INITIAL_EYE, LightingRig, ORBIT_TARGET,
    car_root_transform, ground_transform,
};
use crate::texture::{create_rgba_texture, create_solid_texture};

use super::super::mesh::{
    SceneVertex, build_gpu_mesh, create_depth_view, ground_geometry, interleave, scene_uniform,
};
use super::super::shaders::{
    OVERLAY_SHADER_SOURCE, QUAD_INDICES, QUAD_VERTICES, SCENE_SHADER_SOURCE,
};
use super::{LoadStatus, ViewerState};

pub(super) async fn new_state(window: Arc<Window>, font_bytes: Vec<u8>) -> Result<ViewerState> {
    let size = window.inner_size();

    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(window.clone())
        .context("creating wgpu surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("requesting wgpu adapter")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("showroom-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .context("requesting wgpu device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .unwrap_or(surface_caps.formats[0]);
    let present_mode = surface_caps
        .present_modes
        .iter()
        .copied()
        .find(|mode| *mode == wgpu::PresentMode::Mailbox)
        .unwrap_or(wgpu::PresentMode::Fifo);
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 1,
    };

    let scene_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("scene-bind-group-layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let mesh_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("mesh-bind-group-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let overlay_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("overlay-bind-group-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene-shader"),
        source: wgpu::ShaderSource::Wgsl(SCENE_SHADER_SOURCE.into()),
    });
    let overlay_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("overlay-shader"),
        source: wgpu::ShaderSource::Wgsl(OVERLAY_SHADER_SOURCE.into()),
    });

    let scene_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene-pipeline-layout"),
        bind_group_layouts: &[&scene_bind_layout, &mesh_bind_layout],
        push_constant_ranges: &[],
    });

    let scene_pipeline = build_scene_pipeline(
        &device,
        &scene_pipeline_layout,
        &scene_shader,
        surface_format,
        "scene-pipeline",
        None,
        true,
    );
    let glass_pipeline = build_scene_pipeline(
        &device,
        &scene_pipeline_layout,
        &scene_shader,
        surface_format,
        "glass-pipeline",
        Some(wgpu::BlendState::ALPHA_BLENDING),
        false,
    );

    let overlay_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("overlay-pipeline-layout"),
        bind_group_layouts: &[&overlay_bind_layout],
        push_constant_ranges: &[],
    });
    let overlay_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("overlay-pipeline"),
        layout: Some(&overlay_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &overlay_shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<super::super::shaders::QuadVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &overlay_shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("overlay-quad-vertex-buffer"),
        contents: cast_slice(&QUAD_VERTICES),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("overlay-quad-index-buffer"),
        contents: cast_slice(&QUAD_INDICES),
        usage: wgpu::BufferUsages::INDEX,
    });

    let camera = Camera::new(INITIAL_EYE, ORBIT_TARGET);
    let projection = Projection::new(
        CAMERA_FOV_DEG.to_radians(),
        size.width,
        size.height,
        CAMERA_NEAR,
        CAMERA_FAR,
    );
    let mut orbit = OrbitController::new(ORBIT_TARGET, OrbitLimits::default());
    orbit.sync_from_camera(&camera);
    let lighting = LightingRig::default();

    let scene_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("scene-uniform-buffer"),
        contents: cast_slice(&[scene_uniform(&camera, &projection, &lighting)]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("scene-bind-group"),
        layout: &scene_bind_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: scene_uniform_buffer.as_entire_binding(),
        }],
    });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("material-sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let (_ground_texture, ground_view) =
        create_solid_texture(&device, &queue, "ground-texture", GROUND_COLOR)?;
    let (ground_vertices, ground_indices) = ground_geometry();
    let ground = build_gpu_mesh(
        &device,
        &mesh_bind_layout,
        "ground",
        &ground_vertices,
        &ground_indices,
        ground_transform(),
        [1.0, 0.0, 1.0, 0.0],
        &ground_view,
        &sampler,
    );

    let depth_view = create_depth_view(&device, size.width, size.height);

    let mut font = OverlayFont::from_bytes(&font_bytes, FONT_SIZE_PX)?;

    let explanation = TextOverlay::new(
        &device,
        &queue,
        &overlay_bind_layout,
        TextOverlayConfig {
            width: EXPLANATION_PANEL_WIDTH,
            height: EXPLANATION_PANEL_HEIGHT,
            padding_x: PANEL_PADDING_X,
            padding_y: PANEL_PADDING_Y,
            label: "explanation-panel",
        },
    )?;

    let mut legend = TextOverlay::new(
        &device,
        &queue,
        &overlay_bind_layout,
        TextOverlayConfig {
            width: LEGEND_PANEL_WIDTH,
            height: LEGEND_PANEL_HEIGHT,
            padding_x: PANEL_PADDING_X,
            padding_y: PANEL_PADDING_Y,
            label: "legend-panel",
        },
    )?;
    let legend_lines: Vec<String> = CarPart::ALL
        .iter()
        .enumerate()
        .map(|(index, part)| format!("[{}] {}", index + 1, part.label()))
        .collect();
    legend.set_lines(&mut font, &legend_lines);
    legend.set_visible(true);

    let mut loading = TextOverlay::new(
        &device,
        &queue,
        &overlay_bind_layout,
        TextOverlayConfig {
            width: LOADING_PANEL_WIDTH,
            height: LOADING_PANEL_HEIGHT,
            padding_x: PANEL_PADDING_X,
            padding_y: PANEL_PADDING_Y,
            label: "loading-panel",
        },
    )?;
    loading.set_lines(&mut font, &["Loading showroom".to_string()]);
    loading.set_visible(true);

    let explanation_rect = layout::explanation_rect(size, PanelAnchor { dx: -150.0, dy: 0.0 });

    let state = ViewerState {
        window,
        surface,
        device,
        queue,
        config,
        size,
        scene_pipeline,
        glass_pipeline,
        overlay_pipeline,
        mesh_bind_layout,
        scene_uniform_buffer,
        scene_bind_group,
        depth_view,
        sampler,
        quad_vertex_buffer,
        quad_index_buffer,
        quad_index_count: QUAD_INDICES.len() as u32,
        ground,
        car_opaque: Vec::new(),
        car_glass: Vec::new(),
        lighting,
        camera,
        projection,
        orbit,
        hotspots: HotspotDispatcher::new(),
        font,
        explanation,
        legend,
        loading,
        explanation_rect,
        load_status: LoadStatus::Loading,
        cursor: None,
        last_frame: Instant::now(),
    };

    state.surface.configure(&state.device, &state.config);
    Ok(state)
}

#[allow(clippy::too_many_arguments)]
fn build_scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[SceneVertex::LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

/// Uploads textures and meshes for a loaded show and swaps them into the
/// scene, split into opaque and glass draw lists.
pub(super) fn install_assets(state: &mut ViewerState, assets: ShowAssets) -> Result<()> {
    let mut material_views = std::collections::BTreeMap::new();
    for (key, texture) in &assets.textures {
        let label = format!("material-{key}");
        let (_texture, view) = create_rgba_texture(
            &state.device,
            &state.queue,
            &label,
            texture.width,
            texture.height,
            &texture.rgba,
        )
        .with_context(|| format!("uploading texture for material '{key}'"))?;
        material_views.insert(key.clone(), view);
    }

    let root = car_root_transform(assets.model_offset);
    let mut opaque = Vec::new();
    let mut glass = Vec::new();

    for mesh_data in &assets.meshes {
        let material = assets
            .materials
            .get(&mesh_data.material)
            .with_context(|| format!("mesh '{}' references unknown material", mesh_data.name))?;
        let view = material_views
            .get(&mesh_data.material)
            .with_context(|| format!("material '{}' has no texture", mesh_data.material))?;
        let vertices = interleave(mesh_data)?;
        let gpu_mesh = build_gpu_mesh(
            &state.device,
            &state.mesh_bind_layout,
            &mesh_data.name,
            &vertices,
            &mesh_data.indices,
            root * mesh_data.transform,
            [material.roughness, material.metalness, material.opacity, 0.0],
            view,
            &state.sampler,
        );
        if material.is_transparent() {
            glass.push(gpu_mesh);
        } else {
            opaque.push(gpu_mesh);
        }
    }

    log::info!(
        "car attached: {} opaque mesh(es), {} glass mesh(es)",
        opaque.len(),
        glass.len()
    );
    state.car_opaque = opaque;
    state.car_glass = glass;
    Ok(())
}
