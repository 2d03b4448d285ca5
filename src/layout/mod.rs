mod aspects;
mod background;
mod planets;
pub(crate) mod types;
mod zodiac;
pub use types::*;
use aspects::*;
use background::*;
use planets::*;
use zodiac::*;

pub use aspects::resolve_aspect_lines;
pub use planets::{cluster_depths, place_planets};

use crate::config::WheelConfig;
use crate::ephemeris::EphemerisSnapshot;
use crate::geometry::WheelFrame;
use crate::scene::Scene;
use crate::theme::Theme;

/// Builds the wheel scene for one snapshot. Pure: identical inputs give
/// identical scenes.
pub fn compute_wheel(snapshot: &EphemerisSnapshot, theme: &Theme, config: &WheelConfig) -> WheelLayout {
    let frame = WheelFrame::for_canvas(config.size);
    let mut scene = Scene::new(config.size, config.size);

    let background = background_layer(&mut scene, &frame, theme, config);
    scene.push_layer(background);
    scene.push_layer(sacred_geometry_layer(&frame, theme, config));
    scene.push_layer(zodiac_layer(&frame, theme, config));
    scene.push_layer(tick_layer(&frame, theme, config));

    let aspects = resolve_aspect_lines(snapshot, &frame, config);
    scene.push_layer(aspect_layer(&aspects));

    let placements = place_planets(&snapshot.resolved_positions(), &frame, config);
    scene.push_layer(connector_layer(&placements, &frame, theme, config));
    scene.push_layer(planet_layer(&placements, theme, config));

    tracing::debug!(
        bodies = placements.len(),
        aspects = aspects.len(),
        dropped_aspects = snapshot.aspects.len() - aspects.len(),
        "computed wheel layout"
    );

    WheelLayout {
        scene,
        placements,
        aspects,
    }
}
