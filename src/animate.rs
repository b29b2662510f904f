//! Camera flights: timed linear moves of the camera eye toward a viewpoint.
//! A flight is driven by an explicit `tick` from the frame loop and reports
//! completion through its return value; whoever owns the flight slot drops
//! it afterwards. Replacing the slot cancels the previous flight, so at most
//! one flight ever writes to the camera.

use std::time::{Duration, Instant};

use glam::Vec3;

use crate::camera::Camera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    InFlight,
    Complete,
}

pub struct CameraFlight {
    start: Vec3,
    destination: Vec3,
    started_at: Instant,
    duration: Duration,
    look_at: Vec3,
}

impl CameraFlight {
    /// Captures the interpolation start from the camera at call time, not at
    /// the first tick.
    pub fn new(camera: &Camera, destination: Vec3, duration: Duration, started_at: Instant) -> Self {
        Self {
            start: camera.eye,
            destination,
            started_at,
            duration,
            look_at: camera.target,
        }
    }

    /// Advances the flight to `now`, writing the interpolated eye position
    /// and re-aiming the camera at the orbit point. Returns `Complete` on
    /// the tick that reaches the destination; the caller drops the flight
    /// after that, so completion is observed exactly once.
    pub fn tick(&self, now: Instant, camera: &mut Camera) -> FlightStatus {
        let t = self.progress(now);
        camera.eye = self.start.lerp(self.destination, t);
        camera.look_at(self.look_at);
        if t < 1.0 {
            FlightStatus::InFlight
        } else {
            FlightStatus::Complete
        }
    }

    /// Normalized progress in [0, 1]. A zero duration, or a clock already
    /// past the deadline, resolves to 1 without dividing.
    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn showroom_camera() -> Camera {
        Camera::new(Vec3::new(0.0, 1.0, 6.0), Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn arrives_exactly_at_duration() {
        let mut camera = showroom_camera();
        let destination = Vec3::new(0.0, 1.5, -3.0);
        let t0 = Instant::now();
        let flight = CameraFlight::new(&camera, destination, Duration::from_millis(1000), t0);

        let status = flight.tick(t0 + Duration::from_millis(1000), &mut camera);
        assert_eq!(status, FlightStatus::Complete);
        assert!((camera.eye - destination).length() < EPS);
    }

    #[test]
    fn midpoint_is_linear_between_start_and_destination() {
        let mut camera = showroom_camera();
        let start = camera.eye;
        let destination = Vec3::new(3.0, 1.0, 0.0);
        let t0 = Instant::now();
        let flight = CameraFlight::new(&camera, destination, Duration::from_millis(1000), t0);

        let status = flight.tick(t0 + Duration::from_millis(500), &mut camera);
        assert_eq!(status, FlightStatus::InFlight);
        assert!((camera.eye - start.lerp(destination, 0.5)).length() < EPS);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut camera = showroom_camera();
        let destination = Vec3::new(0.0, 6.0, 0.0);
        let t0 = Instant::now();
        let flight = CameraFlight::new(&camera, destination, Duration::ZERO, t0);

        let status = flight.tick(t0, &mut camera);
        assert_eq!(status, FlightStatus::Complete);
        assert!((camera.eye - destination).length() < EPS);
    }

    #[test]
    fn progress_is_clamped_under_overshoot() {
        let mut camera = showroom_camera();
        let destination = Vec3::new(0.0, 0.0, -7.0);
        let t0 = Instant::now();
        let flight = CameraFlight::new(&camera, destination, Duration::from_millis(10), t0);

        flight.tick(t0 + Duration::from_secs(3600), &mut camera);
        assert!((camera.eye - destination).length() < EPS);

        // A tick dated before the start must not extrapolate backwards.
        let mut early_camera = showroom_camera();
        let start = early_camera.eye;
        let late = CameraFlight::new(
            &early_camera,
            destination,
            Duration::from_millis(1000),
            t0 + Duration::from_secs(10),
        );
        late.tick(t0, &mut early_camera);
        assert!((early_camera.eye - start).length() < EPS);
    }

    #[test]
    fn start_is_captured_when_the_flight_is_created() {
        let mut camera = showroom_camera();
        let t0 = Instant::now();
        let flight = CameraFlight::new(
            &camera,
            Vec3::new(0.0, 0.0, -7.0),
            Duration::from_millis(1000),
            t0,
        );

        // The camera wanders before the first tick; the flight still lerps
        // from where it was at creation.
        camera.eye = Vec3::new(9.0, 9.0, 9.0);
        flight.tick(t0, &mut camera);
        assert!((camera.eye - Vec3::new(0.0, 1.0, 6.0)).length() < EPS);
    }

    #[test]
    fn tick_keeps_the_camera_aimed_at_the_orbit_point() {
        let mut camera = showroom_camera();
        let aim = camera.target;
        let t0 = Instant::now();
        let flight = CameraFlight::new(
            &camera,
            Vec3::new(3.0, 1.0, 0.0),
            Duration::from_millis(1000),
            t0,
        );
        camera.target = Vec3::new(5.0, 5.0, 5.0);
        flight.tick(t0 + Duration::from_millis(250), &mut camera);
        assert_eq!(camera.target, aim);
    }
}
