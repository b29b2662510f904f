//! GPU-side mesh plumbing: vertex/uniform layouts, buffer construction for
//! imported car meshes and the generated ground plane, and the uniform
//! packing that turns the scene description into shader data.

use anyhow::{Result, ensure};
use bytemuck::{Pod, Zeroable, cast_slice};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::assets::MeshData;
use crate::camera::{Camera, CameraUniform, Projection};
use crate::scene::{GROUND_EXTENT, LightingRig, SPOT_COS_INNER, SPOT_COS_OUTER};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl SceneVertex {
    pub(super) const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SceneVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct SpotUniform {
    /// xyz = world position, w = cosine of the inner cone angle.
    pub position: [f32; 4],
    /// xyz = normalized aim direction, w = cosine of the outer cone angle.
    pub direction: [f32; 4],
    /// rgb = color, a = intensity.
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// rgb = color, a = intensity.
    pub ambient: [f32; 4],
    pub sun_dir: [f32; 4],
    pub sun_color: [f32; 4],
    pub spots: [SpotUniform; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct MeshUniform {
    pub model: [[f32; 4]; 4],
    /// x = roughness, y = metalness, z = opacity, w unused.
    pub params: [f32; 4],
}

pub(super) fn scene_uniform(
    camera: &Camera,
    projection: &Projection,
    lighting: &LightingRig,
) -> SceneUniform {
    let camera_uniform = CameraUniform::new(camera, projection);
    let mut spots = [SpotUniform::zeroed(); 4];
    for (slot, spot) in spots.iter_mut().zip(lighting.spots.iter()) {
        let direction = spot.direction();
        *slot = SpotUniform {
            position: [
                spot.position.x,
                spot.position.y,
                spot.position.z,
                SPOT_COS_INNER,
            ],
            direction: [direction.x, direction.y, direction.z, SPOT_COS_OUTER],
            color: [1.0, 1.0, 1.0, spot.intensity],
        };
    }
    SceneUniform {
        view_proj: camera_uniform.view_proj,
        camera_pos: camera_uniform.eye,
        ambient: [
            lighting.ambient_color.x,
            lighting.ambient_color.y,
            lighting.ambient_color.z,
            lighting.ambient_intensity,
        ],
        sun_dir: [
            lighting.sun_direction.x,
            lighting.sun_direction.y,
            lighting.sun_direction.z,
            0.0,
        ],
        sun_color: [1.0, 1.0, 1.0, lighting.sun_intensity],
        spots,
    }
}

/// One drawable mesh: vertex/index buffers plus the bind group carrying its
/// model transform, material parameters, and base-color texture.
pub(super) struct GpuMesh {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
    pub bind_group: wgpu::BindGroup,
}

#[allow(clippy::too_many_arguments)]
pub(super) fn build_gpu_mesh(
    device: &wgpu::Device,
    mesh_bind_layout: &wgpu::BindGroupLayout,
    label: &str,
    vertices: &[SceneVertex],
    indices: &[u32],
    model: Mat4,
    params: [f32; 4],
    texture_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> GpuMesh {
    let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let uniform = MeshUniform {
        model: model.to_cols_array_2d(),
        params,
    };
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: mesh_bind_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(texture_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuMesh {
        vertex,
        index,
        index_count: indices.len() as u32,
        bind_group,
    }
}

/// Interleaves an imported mesh's attribute streams, verifying they agree
/// on the vertex count.
pub(super) fn interleave(mesh: &MeshData) -> Result<Vec<SceneVertex>> {
    ensure!(
        mesh.normals.len() == mesh.positions.len() && mesh.uvs.len() == mesh.positions.len(),
        "mesh '{}' attribute streams disagree: {} positions, {} normals, {} uvs",
        mesh.name,
        mesh.positions.len(),
        mesh.normals.len(),
        mesh.uvs.len()
    );
    Ok(mesh
        .positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.uvs)
        .map(|((position, normal), uv)| SceneVertex {
            position: *position,
            normal: *normal,
            uv: *uv,
        })
        .collect())
}

/// Flat square centered on the origin with its normal up; the caller
/// positions it with a model transform.
pub(super) fn ground_geometry() -> (Vec<SceneVertex>, Vec<u32>) {
    let half = GROUND_EXTENT / 2.0;
    let vertices = vec![
        SceneVertex {
            position: [-half, 0.0, -half],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        },
        SceneVertex {
            position: [half, 0.0, -half],
            normal: [0.0, 1.0, 0.0],
            uv: [1.0, 0.0],
        },
        SceneVertex {
            position: [-half, 0.0, half],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 1.0],
        },
        SceneVertex {
            position: [half, 0.0, half],
            normal: [0.0, 1.0, 0.0],
            uv: [1.0, 1.0],
        },
    ];
    let indices = vec![0, 1, 2, 2, 1, 3];
    (vertices, indices)
}

pub(super) fn create_depth_view(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("showroom-depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn interleave_rejects_mismatched_streams() {
        let mesh = MeshData {
            name: "broken".to_string(),
            transform: Mat4::IDENTITY,
            positions: vec![[0.0; 3]; 3],
            normals: vec![[0.0; 3]; 2],
            uvs: vec![[0.0; 2]; 3],
            indices: vec![0, 1, 2],
            material: "body".to_string(),
        };
        assert!(interleave(&mesh).is_err());
    }

    #[test]
    fn ground_geometry_is_flat_and_indexed() {
        let (vertices, indices) = ground_geometry();
        assert_eq!(indices.len(), 6);
        for vertex in &vertices {
            assert_eq!(vertex.position[1], 0.0);
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn scene_uniform_packs_the_full_rig() {
        let camera = Camera::new(Vec3::new(0.0, 1.0, 6.0), Vec3::new(0.0, 1.0, 0.0));
        let projection = Projection::new(50f32.to_radians(), 1280, 720, 1.0, 1000.0);
        let uniform = scene_uniform(&camera, &projection, &LightingRig::default());

        assert_eq!(uniform.camera_pos[2], 6.0);
        assert_eq!(uniform.ambient[3], 3.0);
        let intensities: Vec<f32> = uniform.spots.iter().map(|s| s.color[3]).collect();
        assert_eq!(intensities, vec![800.0, 1000.0, 100.0, 100.0]);
        for spot in &uniform.spots {
            assert!(spot.position[3] > spot.direction[3]);
        }
    }
}
