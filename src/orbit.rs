//! Pointer-driven orbit controller. The camera rides a sphere around a fixed
//! target; dragging steers goal angles, the wheel steers goal distance, and
//! every frame the current state is damped toward those goals. Distance and
//! polar angle are clamped so the user can neither tunnel into the car nor
//! flip under the floor.
//!
//! The controller owns the camera's orientation bookkeeping: after any
//! programmatic camera move (a viewpoint flight), `sync_from_camera`
//! re-derives the spherical state so the next drag continues from where the
//! camera actually is.

use std::time::Duration;

use glam::Vec3;

use crate::camera::Camera;

#[derive(Debug, Clone, Copy)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 6.0,
            max_distance: 10.0,
            min_polar: 0.5,
            max_polar: 1.7,
        }
    }
}

const ROTATE_SPEED: f32 = 0.005;
const ZOOM_STEP: f32 = 0.5;
const DAMPING_RATE: f32 = 10.0;

pub struct OrbitController {
    target: Vec3,
    limits: OrbitLimits,
    yaw: f32,
    polar: f32,
    distance: f32,
    goal_yaw: f32,
    goal_polar: f32,
    goal_distance: f32,
    dragging: bool,
}

impl OrbitController {
    pub fn new(target: Vec3, limits: OrbitLimits) -> Self {
        let distance = limits.min_distance;
        let polar = std::f32::consts::FRAC_PI_2.clamp(limits.min_polar, limits.max_polar);
        Self {
            target,
            limits,
            yaw: 0.0,
            polar,
            distance,
            goal_yaw: 0.0,
            goal_polar: polar,
            goal_distance: distance,
            dragging: false,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Marks the start of a user drag. Returns true only on the transition
    /// into the gesture, so listeners can react to "interaction started"
    /// exactly once per drag.
    pub fn begin_drag(&mut self) -> bool {
        let started = !self.dragging;
        self.dragging = true;
        started
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Applies a pointer delta (pixels) to the goal angles. Ignored outside
    /// a drag.
    pub fn drag_by(&mut self, dx: f32, dy: f32) {
        if !self.dragging {
            return;
        }
        self.goal_yaw -= dx * ROTATE_SPEED;
        self.goal_polar = (self.goal_polar - dy * ROTATE_SPEED)
            .clamp(self.limits.min_polar, self.limits.max_polar);
    }

    /// Applies scroll input (positive = toward the car) to the goal
    /// distance.
    pub fn zoom_by(&mut self, amount: f32) {
        self.goal_distance = (self.goal_distance - amount * ZOOM_STEP)
            .clamp(self.limits.min_distance, self.limits.max_distance);
    }

    /// Damps the current state toward the goals and writes the result into
    /// the camera.
    pub fn update(&mut self, dt: Duration, camera: &mut Camera) {
        let blend = 1.0 - (-DAMPING_RATE * dt.as_secs_f32()).exp();
        self.yaw += (self.goal_yaw - self.yaw) * blend;
        self.polar += (self.goal_polar - self.polar) * blend;
        self.distance += (self.goal_distance - self.distance) * blend;

        camera.eye = self.target + self.offset();
        camera.look_at(self.target);
    }

    /// Re-derives the spherical state from the camera, collapsing goals onto
    /// the current values. Called after a flight tick moves the camera.
    pub fn sync_from_camera(&mut self, camera: &Camera) {
        let offset = camera.eye - self.target;
        let distance = offset.length();
        if distance > f32::EPSILON {
            self.distance = distance;
            self.polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
            self.yaw = offset.x.atan2(offset.z);
        }
        self.goal_yaw = self.yaw;
        self.goal_polar = self.polar;
        self.goal_distance = self.distance;
    }

    fn offset(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(
            sin_polar * sin_yaw,
            cos_polar,
            sin_polar * cos_yaw,
        ) * self.distance
    }
}
