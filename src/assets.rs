//! Show-manifest parsing and background asset loading. The manifest is a
//! small JSON document naming the glTF model, the overlay font, and the
//! paint materials with their exact mesh-name assignments. Loading runs on
//! its own thread and reports back over a channel; the render loop never
//! waits on it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result, ensure};
use glam::{Mat4, Vec3};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct ShowManifest {
    /// glTF (.glb/.gltf) model file, relative to the manifest.
    pub model: PathBuf,
    /// TTF font used by the HUD panels.
    pub font: PathBuf,
    #[serde(default = "default_model_offset")]
    pub model_offset: [f32; 3],
    pub materials: BTreeMap<String, MaterialDesc>,
    /// Exact mesh name -> material key. Resolved once after load; meshes
    /// not listed here fall back to `default_material`.
    #[serde(default)]
    pub assignments: BTreeMap<String, String>,
    pub default_material: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDesc {
    pub texture: PathBuf,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_metalness")]
    pub metalness: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_model_offset() -> [f32; 3] {
    [0.0, -1.0, -1.0]
}

fn default_roughness() -> f32 {
    0.5
}

fn default_metalness() -> f32 {
    0.8
}

fn default_opacity() -> f32 {
    1.0
}

impl MaterialDesc {
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Reads and validates a show manifest. Returns the manifest together with
/// the directory asset paths are resolved against.
pub fn load_show_manifest(path: &Path) -> Result<(ShowManifest, PathBuf)> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading show manifest {}", path.display()))?;
    let manifest: ShowManifest = serde_json::from_str(&data)
        .with_context(|| format!("parsing show manifest {}", path.display()))?;

    ensure!(
        manifest.materials.contains_key(&manifest.default_material),
        "default material '{}' is not defined in {}",
        manifest.default_material,
        path.display()
    );
    for (mesh, material) in &manifest.assignments {
        ensure!(
            manifest.materials.contains_key(material),
            "mesh '{}' is assigned to undefined material '{}' in {}",
            mesh,
            material,
            path.display()
        );
    }

    let base = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    Ok((manifest, base))
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("importing model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("model {0} contains no meshes")]
    EmptyModel(PathBuf),
    #[error("mesh '{0}' has no vertex positions")]
    MissingPositions(String),
    #[error("mesh '{0}' has no vertex normals")]
    MissingNormals(String),
    #[error("mesh '{0}' has no texture coordinates")]
    MissingUvs(String),
    #[error("decoding texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub struct MeshData {
    pub name: String,
    pub transform: Mat4,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Material key, resolved against the manifest's assignment table.
    pub material: String,
}

pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub struct ShowAssets {
    pub meshes: Vec<MeshData>,
    pub textures: BTreeMap<String, TextureData>,
    pub materials: BTreeMap<String, MaterialDesc>,
    pub model_offset: Vec3,
}

pub enum LoadEvent {
    Progress { done: usize, total: usize, label: String },
    Loaded(Box<ShowAssets>),
    Failed(String),
}

/// Spawns the loader thread. Dropping the receiver just makes the thread's
/// sends fail silently, which is fine: the loader holds no other state.
pub fn spawn_loader(manifest: ShowManifest, base: PathBuf) -> Receiver<LoadEvent> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        match load_show_assets(&manifest, &base, Some(&sender)) {
            Ok(assets) => {
                let _ = sender.send(LoadEvent::Loaded(Box::new(assets)));
            }
            Err(err) => {
                let _ = sender.send(LoadEvent::Failed(err.to_string()));
            }
        }
    });
    receiver
}

/// Loads everything the manifest names. Also the synchronous path used by
/// `--headless` runs and the loader thread alike.
pub fn load_show_assets(
    manifest: &ShowManifest,
    base: &Path,
    progress: Option<&Sender<LoadEvent>>,
) -> Result<ShowAssets, LoadError> {
    let total = 1 + manifest.materials.len();
    let mut done = 0;

    let model_path = base.join(&manifest.model);
    let meshes = import_model(&model_path, &manifest.assignments, &manifest.default_material)?;
    done += 1;
    report(progress, done, total, &manifest.model);

    let mut textures = BTreeMap::new();
    for (key, material) in &manifest.materials {
        let texture_path = base.join(&material.texture);
        let texture = decode_texture(&texture_path)?;
        textures.insert(key.clone(), texture);
        done += 1;
        report(progress, done, total, &material.texture);
    }

    Ok(ShowAssets {
        meshes,
        textures,
        materials: manifest.materials.clone(),
        model_offset: Vec3::from_array(manifest.model_offset),
    })
}

fn report(progress: Option<&Sender<LoadEvent>>, done: usize, total: usize, file: &Path) {
    if let Some(sender) = progress {
        let label = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let _ = sender.send(LoadEvent::Progress { done, total, label });
    }
}

fn import_model(
    path: &Path,
    assignments: &BTreeMap<String, String>,
    default_material: &str,
) -> Result<Vec<MeshData>, LoadError> {
    let (document, buffers, _images) =
        gltf::import(path).map_err(|source| LoadError::Model {
            path: path.to_path_buf(),
            source,
        })?;

    let mut meshes = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, assignments, default_material, &mut meshes)?;
        }
    }
    if meshes.is_empty() {
        return Err(LoadError::EmptyModel(path.to_path_buf()));
    }

    log::info!(
        "imported {} mesh(es) from {}",
        meshes.len(),
        path.display()
    );
    Ok(meshes)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    assignments: &BTreeMap<String, String>,
    default_material: &str,
    out: &mut Vec<MeshData>,
) -> Result<(), LoadError> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let base_name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        for (index, primitive) in mesh.primitives().enumerate() {
            let name = if index == 0 {
                base_name.clone()
            } else {
                format!("{base_name}.{index}")
            };

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| LoadError::MissingPositions(name.clone()))?
                .collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .ok_or_else(|| LoadError::MissingNormals(name.clone()))?
                .collect();
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .ok_or_else(|| LoadError::MissingUvs(name.clone()))?
                .into_f32()
                .collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let material = resolve_material(&name, assignments, default_material);
            out.push(MeshData {
                name,
                transform: world,
                positions,
                normals,
                uvs,
                indices,
                material,
            });
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, assignments, default_material, out)?;
    }
    Ok(())
}

/// Exact-name material lookup. Meshes without an assignment get the default
/// paint so resolution is total for any asset.
pub fn resolve_material(
    mesh_name: &str,
    assignments: &BTreeMap<String, String>,
    default_material: &str,
) -> String {
    assignments
        .get(mesh_name)
        .cloned()
        .unwrap_or_else(|| default_material.to_string())
}

fn decode_texture(path: &Path) -> Result<TextureData, LoadError> {
    let image = image::open(path)
        .map_err(|source| LoadError::Texture {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(TextureData {
        width,
        height,
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignments() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Body_paint".to_string(), "body".to_string()),
            ("Wheel_FL".to_string(), "wheels".to_string()),
            ("Windshield".to_string(), "glass".to_string()),
        ])
    }

    #[test]
    fn assigned_meshes_resolve_exactly() {
        let table = assignments();
        assert_eq!(resolve_material("Wheel_FL", &table, "body"), "wheels");
        assert_eq!(resolve_material("Windshield", &table, "body"), "glass");
    }

    #[test]
    fn resolution_does_not_match_substrings() {
        let table = assignments();
        assert_eq!(resolve_material("Wheel_FL_brake", &table, "body"), "body");
        assert_eq!(resolve_material("wheel_fl", &table, "body"), "body");
    }

    #[test]
    fn unassigned_meshes_fall_back_to_the_default() {
        assert_eq!(resolve_material("Chassis", &assignments(), "body"), "body");
    }

    #[test]
    fn manifest_parses_with_material_defaults() {
        let manifest: ShowManifest = serde_json::from_str(
            r#"{
                "model": "car.glb",
                "font": "fonts/mono.ttf",
                "materials": {
                    "body": { "texture": "textures/paint.png" },
                    "glass": { "texture": "textures/tint.png", "roughness": 0.1, "metalness": 0.5, "opacity": 0.5 }
                },
                "assignments": { "Windshield": "glass" },
                "default_material": "body"
            }"#,
        )
        .expect("manifest should parse");

        let body = &manifest.materials["body"];
        assert_eq!(body.roughness, 0.5);
        assert_eq!(body.metalness, 0.8);
        assert_eq!(body.opacity, 1.0);
        assert!(!body.is_transparent());

        let glass = &manifest.materials["glass"];
        assert!(glass.is_transparent());
        assert_eq!(manifest.model_offset, [0.0, -1.0, -1.0]);
    }

    #[test]
    fn manifest_rejects_dangling_assignment() {
        let dir = std::env::temp_dir().join("showroom_manifest_test");
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("bad.json");
        fs::write(
            &path,
            r#"{
                "model": "car.glb",
                "font": "fonts/mono.ttf",
                "materials": { "body": { "texture": "paint.png" } },
                "assignments": { "Windshield": "glass" },
                "default_material": "body"
            }"#,
        )
        .expect("write manifest");

        let err = load_show_manifest(&path).expect_err("dangling material must fail");
        assert!(err.to_string().contains("glass"));
    }
}
