//! End-to-end focus flow with a simulated clock: a selection flies the
//! camera, the orbit controller re-syncs behind it, the panel reveals on
//! landing, and a drag hides it again. No window or GPU involved.

use std::time::{Duration, Instant};

use showroom_viewer::camera::Camera;
use showroom_viewer::hotspots::{FOCUS_FLIGHT_DURATION, HotspotDispatcher};
use showroom_viewer::orbit::{OrbitController, OrbitLimits};
use showroom_viewer::parts::CarPart;
use showroom_viewer::scene::{INITIAL_EYE, ORBIT_TARGET};

const FRAME: Duration = Duration::from_millis(16);

struct Harness {
    camera: Camera,
    orbit: OrbitController,
    dispatcher: HotspotDispatcher,
    clock: Instant,
}

impl Harness {
    fn new() -> Self {
        let camera = Camera::new(INITIAL_EYE, ORBIT_TARGET);
        let mut orbit = OrbitController::new(ORBIT_TARGET, OrbitLimits::default());
        orbit.sync_from_camera(&camera);
        Self {
            camera,
            orbit,
            dispatcher: HotspotDispatcher::new(),
            clock: Instant::now(),
        }
    }

    /// One frame of the event loop's advance step.
    fn frame(&mut self) {
        self.clock += FRAME;
        if self.dispatcher.tick(self.clock, &mut self.camera) {
            self.orbit.sync_from_camera(&self.camera);
        }
        self.orbit.update(FRAME, &mut self.camera);
    }

    fn run_until_landed(&mut self) {
        for _ in 0..200 {
            self.frame();
            if !self.dispatcher.is_animating() {
                return;
            }
        }
        panic!("flight never landed");
    }
}

#[test]
fn selecting_a_part_flies_lands_and_reveals() {
    let mut harness = Harness::new();
    let now = harness.clock;
    assert!(harness.dispatcher.focus_on_id("engine", &harness.camera, now));

    harness.run_until_landed();

    let destination = CarPart::Engine.viewpoint().destination;
    assert!((harness.camera.eye - destination).length() < 1e-3);
    assert!(harness.dispatcher.panel().is_visible());
    assert_eq!(
        harness.dispatcher.panel().text(),
        CarPart::Engine.explanation()
    );
    // The camera keeps looking at the orbit point throughout.
    assert_eq!(harness.camera.target, ORBIT_TARGET);
}

#[test]
fn dragging_after_landing_hides_the_panel_and_orbits_from_there() {
    let mut harness = Harness::new();
    let now = harness.clock;
    harness
        .dispatcher
        .focus_on_part(CarPart::Wheels, &harness.camera, now);
    harness.run_until_landed();
    assert!(harness.dispatcher.panel().is_visible());

    if harness.orbit.begin_drag() {
        harness.dispatcher.notify_drag_start();
    }
    assert!(!harness.dispatcher.panel().is_visible());

    // The drag continues from the landed viewpoint, not from the pre-flight
    // camera.
    let landed = harness.camera.eye;
    harness.orbit.drag_by(30.0, 0.0);
    harness.frame();
    let distance_before = (landed - ORBIT_TARGET).length();
    let distance_after = (harness.camera.eye - ORBIT_TARGET).length();
    assert!((distance_before - distance_after).abs() < 1e-2);
    assert!((harness.camera.eye - landed).length() > 1e-4);
}

#[test]
fn rapid_reselection_lands_only_the_last_flight() {
    let mut harness = Harness::new();
    let t0 = harness.clock;
    harness
        .dispatcher
        .focus_on_part(CarPart::Back, &harness.camera, t0);

    // A few frames in, the user clicks another hotspot.
    for _ in 0..10 {
        harness.frame();
    }
    let t1 = harness.clock;
    harness
        .dispatcher
        .focus_on_part(CarPart::Top, &harness.camera, t1);

    harness.run_until_landed();
    let destination = CarPart::Top.viewpoint().destination;
    assert!((harness.camera.eye - destination).length() < 1e-3);
    assert_eq!(harness.dispatcher.panel().text(), CarPart::Top.explanation());

    // Even well past the first flight's deadline nothing else lands.
    let elapsed_past_first = harness.clock.duration_since(t0);
    assert!(elapsed_past_first > FOCUS_FLIGHT_DURATION);
}

#[test]
fn unknown_selection_leaves_the_flow_untouched() {
    let mut harness = Harness::new();
    let now = harness.clock;
    assert!(
        !harness
            .dispatcher
            .focus_on_id("spoiler", &harness.camera, now)
    );
    for _ in 0..5 {
        harness.frame();
    }
    assert!(!harness.dispatcher.panel().is_visible());
    assert!((harness.camera.eye - INITIAL_EYE).length() < 1e-3);
}
