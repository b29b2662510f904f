//! Interactive 3D car showroom: a wgpu/winit viewer that loads a textured
//! glTF car, orbits it under a fixed lighting rig, and flies the camera to
//! labeled part viewpoints with explanatory panels.

pub mod animate;
pub mod assets;
pub mod camera;
pub mod cli;
pub mod hotspots;
pub mod layout;
pub mod orbit;
pub mod overlay;
pub mod parts;
pub mod scene;
pub mod texture;
pub mod viewer;
