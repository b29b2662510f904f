//! Hotspot dispatch: turning a part selection into a camera flight and,
//! once the flight lands, into a visible explanation panel. The dispatcher
//! owns the single flight slot, so selecting a new part while a flight is
//! still in the air cancels the old flight outright; exactly one panel
//! reveal happens per landed flight.
//!
//! Hiding is not the dispatcher's job: the event loop forwards the orbit
//! controller's drag-start notification to `notify_drag_start`, a parallel
//! reaction to the same input stream.

use std::time::{Duration, Instant};

use crate::animate::{CameraFlight, FlightStatus};
use crate::camera::Camera;
use crate::parts::{CarPart, PanelAnchor};

pub const FOCUS_FLIGHT_DURATION: Duration = Duration::from_millis(1000);

/// Screen-side model of the explanation overlay: what it says, where it
/// anchors, and whether it shows. The GPU panel mirrors this each frame.
pub struct ExplanationPanel {
    text: String,
    anchor: PanelAnchor,
    visible: bool,
    dirty: bool,
}

impl ExplanationPanel {
    fn new() -> Self {
        Self {
            text: String::new(),
            anchor: PanelAnchor { dx: 0.0, dy: 0.0 },
            visible: false,
            dirty: false,
        }
    }

    fn reveal(&mut self, part: CarPart) {
        self.text = part.explanation().to_string();
        self.anchor = part.viewpoint().anchor;
        self.visible = true;
        self.dirty = true;
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.dirty = true;
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn anchor(&self) -> PanelAnchor {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// True once per change; used to avoid re-rasterizing the overlay
    /// texture on frames where nothing moved.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

pub struct HotspotDispatcher {
    flight: Option<CameraFlight>,
    pending: Option<CarPart>,
    panel: ExplanationPanel,
}

impl HotspotDispatcher {
    pub fn new() -> Self {
        Self {
            flight: None,
            pending: None,
            panel: ExplanationPanel::new(),
        }
    }

    /// String entry point for selections coming from the UI surface.
    /// Unknown identifiers are ignored; returns whether a flight started.
    pub fn focus_on_id(&mut self, id: &str, camera: &Camera, now: Instant) -> bool {
        match CarPart::from_id(id) {
            Some(part) => {
                self.focus_on_part(part, camera, now);
                true
            }
            None => false,
        }
    }

    pub fn focus_on_part(&mut self, part: CarPart, camera: &Camera, now: Instant) {
        let viewpoint = part.viewpoint();
        self.flight = Some(CameraFlight::new(
            camera,
            viewpoint.destination,
            FOCUS_FLIGHT_DURATION,
            now,
        ));
        self.pending = Some(part);
    }

    /// Advances the in-flight animation, revealing the panel on the tick
    /// that lands. Returns true when the camera was moved, so the caller
    /// knows to re-sync the orbit controller.
    pub fn tick(&mut self, now: Instant, camera: &mut Camera) -> bool {
        let Some(flight) = self.flight.as_ref() else {
            return false;
        };
        if flight.tick(now, camera) == FlightStatus::Complete {
            self.flight = None;
            if let Some(part) = self.pending.take() {
                self.panel.reveal(part);
            }
        }
        true
    }

    pub fn notify_drag_start(&mut self) {
        self.panel.hide();
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    pub fn panel(&self) -> &ExplanationPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ExplanationPanel {
        &mut self.panel
    }

    #[cfg(test)]
    fn flight_destination(&self) -> Option<glam::Vec3> {
        self.flight.as_ref().map(|flight| flight.destination())
    }
}

impl Default for HotspotDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn showroom_camera() -> Camera {
        Camera::new(Vec3::new(0.0, 1.0, 6.0), Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn engine_focus_flies_and_reveals_the_panel() {
        let mut camera = showroom_camera();
        let mut dispatcher = HotspotDispatcher::new();
        let t0 = Instant::now();

        assert!(dispatcher.focus_on_id("engine", &camera, t0));
        assert_eq!(
            dispatcher.flight_destination(),
            Some(Vec3::new(0.0, 1.5, -3.0))
        );
        assert!(!dispatcher.panel().is_visible());

        dispatcher.tick(t0 + Duration::from_millis(400), &mut camera);
        assert!(!dispatcher.panel().is_visible());

        dispatcher.tick(t0 + FOCUS_FLIGHT_DURATION, &mut camera);
        assert!(dispatcher.panel().is_visible());
        assert_eq!(dispatcher.panel().text(), CarPart::Engine.explanation());
        assert!((camera.eye - Vec3::new(0.0, 1.5, -3.0)).length() < 1e-4);
        assert!(!dispatcher.is_animating());
    }

    #[test]
    fn every_part_reveals_its_own_explanation() {
        for part in CarPart::ALL {
            let mut camera = showroom_camera();
            let mut dispatcher = HotspotDispatcher::new();
            let t0 = Instant::now();

            dispatcher.focus_on_part(part, &camera, t0);
            dispatcher.tick(t0 + FOCUS_FLIGHT_DURATION, &mut camera);

            assert!(dispatcher.panel().is_visible());
            assert_eq!(dispatcher.panel().text(), part.explanation());
            assert_eq!(dispatcher.panel().anchor(), part.viewpoint().anchor);
            assert!((camera.eye - part.viewpoint().destination).length() < 1e-4);
        }
    }

    #[test]
    fn unknown_part_is_a_no_op() {
        let mut camera = showroom_camera();
        let eye = camera.eye;
        let mut dispatcher = HotspotDispatcher::new();
        let t0 = Instant::now();

        assert!(!dispatcher.focus_on_id("unknown-part", &camera, t0));
        assert!(!dispatcher.is_animating());
        assert!(!dispatcher.tick(t0 + Duration::from_secs(2), &mut camera));
        assert_eq!(camera.eye, eye);
        assert!(!dispatcher.panel().is_visible());
    }

    #[test]
    fn drag_start_hides_a_visible_panel() {
        let mut camera = showroom_camera();
        let mut dispatcher = HotspotDispatcher::new();
        let t0 = Instant::now();

        dispatcher.focus_on_part(CarPart::Front, &camera, t0);
        dispatcher.tick(t0 + FOCUS_FLIGHT_DURATION, &mut camera);
        assert!(dispatcher.panel().is_visible());

        dispatcher.notify_drag_start();
        assert!(!dispatcher.panel().is_visible());
    }

    #[test]
    fn a_new_selection_supersedes_the_flight_in_the_air() {
        let mut camera = showroom_camera();
        let mut dispatcher = HotspotDispatcher::new();
        let t0 = Instant::now();

        dispatcher.focus_on_part(CarPart::Back, &camera, t0);
        dispatcher.tick(t0 + Duration::from_millis(300), &mut camera);

        let t1 = t0 + Duration::from_millis(500);
        dispatcher.focus_on_part(CarPart::Wheels, &camera, t1);
        assert_eq!(
            dispatcher.flight_destination(),
            Some(Vec3::new(3.0, 1.0, 0.0))
        );

        // Well past the first flight's deadline but short of the second's:
        // nothing lands yet, so no reveal for the canceled flight.
        dispatcher.tick(t0 + Duration::from_millis(1200), &mut camera);
        assert!(!dispatcher.panel().is_visible());

        dispatcher.tick(t1 + FOCUS_FLIGHT_DURATION, &mut camera);
        assert!(dispatcher.panel().is_visible());
        assert_eq!(dispatcher.panel().text(), CarPart::Wheels.explanation());
        assert!((camera.eye - Vec3::new(3.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn reselecting_while_visible_restarts_the_cycle() {
        let mut camera = showroom_camera();
        let mut dispatcher = HotspotDispatcher::new();
        let t0 = Instant::now();

        dispatcher.focus_on_part(CarPart::Top, &camera, t0);
        dispatcher.tick(t0 + FOCUS_FLIGHT_DURATION, &mut camera);
        assert!(dispatcher.panel().is_visible());

        let t1 = t0 + Duration::from_secs(5);
        dispatcher.focus_on_part(CarPart::Front, &camera, t1);
        dispatcher.tick(t1 + FOCUS_FLIGHT_DURATION, &mut camera);
        assert!(dispatcher.panel().is_visible());
        assert_eq!(dispatcher.panel().text(), CarPart::Front.explanation());
        assert_eq!(dispatcher.panel().anchor(), CarPart::Front.viewpoint().anchor);
    }

    #[test]
    fn dirty_flag_fires_once_per_change() {
        let mut camera = showroom_camera();
        let mut dispatcher = HotspotDispatcher::new();
        let t0 = Instant::now();

        assert!(!dispatcher.panel_mut().take_dirty());
        dispatcher.focus_on_part(CarPart::Wheels, &camera, t0);
        dispatcher.tick(t0 + FOCUS_FLIGHT_DURATION, &mut camera);
        assert!(dispatcher.panel_mut().take_dirty());
        assert!(!dispatcher.panel_mut().take_dirty());

        // Hiding an already hidden panel is not a change.
        dispatcher.notify_drag_start();
        assert!(dispatcher.panel_mut().take_dirty());
        dispatcher.notify_drag_start();
        assert!(!dispatcher.panel_mut().take_dirty());
    }
}
