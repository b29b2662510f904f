//! Fixed showroom scene description: the lighting rig, the ground plane,
//! and the car's root transform. These are data, not behavior; the GPU side
//! packs them into uniforms at draw time.

use glam::{Mat4, Vec3};

pub const GROUND_EXTENT: f32 = 500.0;
pub const GROUND_HEIGHT: f32 = -1.0;
pub const GROUND_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Fixed point the orbit controller circles and every flight re-aims at.
pub const ORBIT_TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Opening camera position: on the orbit sphere, facing the front of the
/// car.
pub const INITIAL_EYE: Vec3 = Vec3::new(0.0, 1.0, 6.0);

pub const CAMERA_FOV_DEG: f32 = 50.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 1000.0;

/// Cone of the showroom spot lights, as cosine cutoffs (a hard 60 degree
/// cone with a narrow soft rim).
pub const SPOT_COS_INNER: f32 = 0.54;
pub const SPOT_COS_OUTER: f32 = 0.50;

#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub position: Vec3,
    pub aim: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct LightingRig {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub sun_direction: Vec3,
    pub sun_intensity: f32,
    pub spots: [SpotLight; 4],
}

impl Default for LightingRig {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(0.25),
            ambient_intensity: 3.0,
            // Directional light at (5, 10, 5) aimed at the origin.
            sun_direction: Vec3::new(-5.0, -10.0, -5.0).normalize(),
            sun_intensity: 2.0,
            spots: [
                SpotLight {
                    position: Vec3::new(10.0, 20.0, 10.0),
                    aim: Vec3::ZERO,
                    intensity: 800.0,
                },
                SpotLight {
                    position: Vec3::new(-10.0, 20.0, -10.0),
                    aim: Vec3::ZERO,
                    intensity: 1000.0,
                },
                SpotLight {
                    position: Vec3::new(-10.0, 5.0, 0.0),
                    aim: Vec3::ZERO,
                    intensity: 100.0,
                },
                SpotLight {
                    position: Vec3::new(10.0, 5.0, 0.0),
                    aim: Vec3::ZERO,
                    intensity: 100.0,
                },
            ],
        }
    }
}

impl SpotLight {
    pub fn direction(&self) -> Vec3 {
        (self.aim - self.position).normalize()
    }
}

/// Root transform applied to every car mesh on top of its own node
/// transform; parks the car on the ground, slightly behind the orbit
/// target.
pub fn car_root_transform(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

pub fn ground_transform() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, GROUND_HEIGHT, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_lights_aim_down_at_the_car() {
        for spot in LightingRig::default().spots {
            assert!(spot.direction().y < 0.0);
            assert!((spot.direction().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn sun_direction_is_normalized() {
        let rig = LightingRig::default();
        assert!((rig.sun_direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ground_sits_below_the_orbit_target() {
        let ground = ground_transform().transform_point3(Vec3::ZERO);
        assert!(ground.y < ORBIT_TARGET.y);
    }
}
