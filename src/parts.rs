//! The fixed set of car parts the showroom can focus on, with each part's
//! camera viewpoint, explanation copy, and explanation-panel anchor. The
//! tables are immutable and defined at startup; everything else looks parts
//! up by identifier.

use std::collections::HashMap;

use glam::Vec3;
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CarPart {
    Front,
    Back,
    Top,
    Engine,
    Wheels,
}

/// Screen offset of the explanation panel, relative to the window center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelAnchor {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Viewpoint {
    pub destination: Vec3,
    pub anchor: PanelAnchor,
}

static PART_IDS: Lazy<HashMap<&'static str, CarPart>> = Lazy::new(|| {
    CarPart::ALL
        .iter()
        .map(|part| (part.id(), *part))
        .collect()
});

impl CarPart {
    pub const ALL: [CarPart; 5] = [
        CarPart::Front,
        CarPart::Back,
        CarPart::Top,
        CarPart::Engine,
        CarPart::Wheels,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CarPart::Front => "front",
            CarPart::Back => "back",
            CarPart::Top => "top",
            CarPart::Engine => "engine",
            CarPart::Wheels => "wheels",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CarPart::Front => "Front",
            CarPart::Back => "Back",
            CarPart::Top => "Top",
            CarPart::Engine => "Engine",
            CarPart::Wheels => "Wheels",
        }
    }

    /// Looks a part up by its string identifier. Unknown identifiers resolve
    /// to `None`; callers treat that as a no-op rather than an error.
    pub fn from_id(id: &str) -> Option<CarPart> {
        PART_IDS.get(id).copied()
    }

    pub fn viewpoint(self) -> Viewpoint {
        let (destination, anchor) = match self {
            CarPart::Front => (Vec3::new(0.0, 1.0, 6.0), PanelAnchor { dx: -150.0, dy: 0.0 }),
            CarPart::Back => (Vec3::new(0.0, 0.0, -7.0), PanelAnchor { dx: -150.0, dy: 0.0 }),
            CarPart::Top => (
                Vec3::new(0.0, 6.0, 0.0),
                PanelAnchor {
                    dx: -150.0,
                    dy: -200.0,
                },
            ),
            CarPart::Engine => (
                Vec3::new(0.0, 1.5, -3.0),
                PanelAnchor { dx: -150.0, dy: 0.0 },
            ),
            CarPart::Wheels => (Vec3::new(3.0, 1.0, 0.0), PanelAnchor { dx: -150.0, dy: 0.0 }),
        };
        Viewpoint {
            destination,
            anchor,
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            CarPart::Front => {
                "This is the front of the Bugatti Chiron. The front houses the distinctive \
                 horseshoe grille and the iconic Bugatti logo."
            }
            CarPart::Back => {
                "This is the back of the Bugatti Chiron. The back features the car's powerful \
                 exhaust system and signature rear lights."
            }
            CarPart::Top => {
                "This is the top view of the Bugatti Chiron. The top showcases the aerodynamic \
                 design and the streamlined roof."
            }
            CarPart::Engine => {
                "This is the engine of the Bugatti Chiron. The engine is a quad-turbocharged \
                 W16 that produces an incredible 1,479 horsepower."
            }
            CarPart::Wheels => {
                "These are the wheels of the Bugatti Chiron. The wheels are made from \
                 lightweight materials and designed for high performance."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_part_resolves_by_id() {
        for part in CarPart::ALL {
            assert_eq!(CarPart::from_id(part.id()), Some(part));
        }
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        assert_eq!(CarPart::from_id("unknown-part"), None);
        assert_eq!(CarPart::from_id(""), None);
        assert_eq!(CarPart::from_id("Front"), None);
    }

    #[test]
    fn every_part_has_explanation_copy() {
        for part in CarPart::ALL {
            assert!(!part.explanation().is_empty());
        }
    }

    #[test]
    fn engine_viewpoint_matches_showroom_table() {
        let viewpoint = CarPart::Engine.viewpoint();
        assert_eq!(viewpoint.destination, Vec3::new(0.0, 1.5, -3.0));
        assert_eq!(viewpoint.anchor, PanelAnchor { dx: -150.0, dy: 0.0 });
    }

    #[test]
    fn top_viewpoint_lifts_panel_anchor() {
        assert_eq!(CarPart::Top.viewpoint().anchor.dy, -200.0);
    }
}
