use std::cmp::Ordering;

use crate::config::WheelConfig;
use crate::ephemeris::CelestialPosition;
use crate::geometry::{WheelFrame, angular_separation};
use crate::scene::{Group, Node, Style, TextAnchor, TextNode};
use crate::style::{SymbolFont, body_glyph, sign_color};
use crate::theme::Theme;

use super::PlanetPlacement;

const PLANET_GLYPH_SIZE: f64 = 16.0;

/// Stagger level for each longitude. `sorted` must be ascending. A body sits
/// one level above the deepest earlier body closer than `min_separation`
/// degrees (wrapping across 0°), so any close pair lands on different rings.
/// Within a mutually-close cluster this equals the number of earlier members.
pub fn cluster_depths(sorted: &[f64], min_separation: f64) -> Vec<usize> {
    let mut depths: Vec<usize> = Vec::with_capacity(sorted.len());
    for (idx, longitude) in sorted.iter().enumerate() {
        let depth = sorted[..idx]
            .iter()
            .zip(&depths)
            .filter(|(placed, _)| angular_separation(**placed, *longitude) < min_separation)
            .map(|(_, depth)| depth + 1)
            .max()
            .unwrap_or(0);
        depths.push(depth);
    }
    depths
}

/// Places every body at its true angle, pushing clustered bodies outward.
/// Input longitudes are expected to be normalised (see
/// `EphemerisSnapshot::resolved_positions`).
pub fn place_planets(
    positions: &[CelestialPosition],
    frame: &WheelFrame,
    config: &WheelConfig,
) -> Vec<PlanetPlacement> {
    let mut ordered: Vec<&CelestialPosition> = positions.iter().collect();
    ordered.sort_by(|a, b| {
        a.longitude
            .partial_cmp(&b.longitude)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let longitudes: Vec<f64> = ordered.iter().map(|p| p.longitude).collect();
    let depths = cluster_depths(&longitudes, config.min_separation);

    ordered
        .into_iter()
        .zip(depths)
        .map(|(position, depth)| {
            let radius = config.planet_orbit_radius + depth as f64 * config.cluster_step;
            PlanetPlacement {
                name: position.name.clone(),
                longitude: position.longitude,
                depth,
                radius,
                point: frame.point_on_circle(position.longitude, radius),
                sign: position.effective_sign(),
                retrograde: position.retrograde,
                glyph: body_glyph(&position.name),
            }
        })
        .collect()
}

/// Dashed leaders tying each marker back to its true angle on the reference circle.
pub(super) fn connector_layer(
    placements: &[PlanetPlacement],
    frame: &WheelFrame,
    theme: &Theme,
    config: &WheelConfig,
) -> Group {
    let mut layer = Group::new("connectors");
    for placement in placements {
        layer.push(Node::line(
            placement.point,
            frame.point_on_circle(placement.longitude, config.reference_radius),
            Style::stroke(&theme.ring_stroke, 0.8)
                .with_stroke_opacity(0.45)
                .with_dash(Some("2 3")),
        ));
    }
    layer
}

pub(super) fn planet_layer(placements: &[PlanetPlacement], theme: &Theme, config: &WheelConfig) -> Group {
    let mut layer = Group::new("planets");
    for placement in placements {
        let mut marker = Group::new("planet");
        let ring_color = sign_color(placement.sign);
        if placement.retrograde {
            marker.push(Node::circle(
                placement.point,
                config.retrograde_ring_radius,
                Style::stroke(&theme.retrograde_color, 1.2),
            ));
        }
        marker.push(Node::circle(
            placement.point,
            config.marker_radius,
            Style::fill(&theme.marker_fill).with_stroke(ring_color, 1.5),
        ));
        let family = match placement.glyph.font {
            SymbolFont::Primary => &theme.symbol_font,
            SymbolFont::Alternate => &theme.symbol_alt_font,
        };
        marker.push(Node::Text(
            TextNode::new(placement.point, placement.glyph.symbol, family, PLANET_GLYPH_SIZE)
                .fill(&theme.glyph_color)
                .anchor(TextAnchor::Middle)
                .centered(),
        ));
        layer.push(marker.into());
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> WheelFrame {
        WheelFrame::for_canvas(600.0)
    }

    fn bodies(longitudes: &[(&str, f64)]) -> Vec<CelestialPosition> {
        longitudes
            .iter()
            .map(|(name, lon)| CelestialPosition::new(name, *lon))
            .collect()
    }

    #[test]
    fn spread_bodies_stay_on_base_orbit() {
        let config = WheelConfig::default();
        let placements = place_planets(
            &bodies(&[("Sun", 10.0), ("Moon", 22.0), ("Mars", 100.0), ("Venus", 350.0)]),
            &frame(),
            &config,
        );
        for p in &placements {
            assert_eq!(p.depth, 0, "{}", p.name);
            assert_eq!(p.radius, config.planet_orbit_radius);
        }
    }

    #[test]
    fn tight_cluster_gets_distinct_depths() {
        let depths = cluster_depths(&[100.0, 101.0, 103.5, 110.0], 12.0);
        assert_eq!(depths, vec![0, 1, 2, 3]);
    }

    #[test]
    fn close_pair_is_staggered() {
        let config = WheelConfig::default();
        let placements = place_planets(&bodies(&[("Sun", 45.0), ("Mercury", 50.0)]), &frame(), &config);
        assert_eq!(placements[0].depth, 0);
        assert_eq!(placements[1].depth, 1);
        assert_eq!(placements[1].radius, config.planet_orbit_radius + config.cluster_step);
    }

    #[test]
    fn chained_neighbours_never_share_a_ring() {
        let sorted = [276.5, 280.1, 283.4, 286.0, 288.7, 291.9];
        let depths = cluster_depths(&sorted, 12.0);
        assert_eq!(depths[..4], [0, 1, 2, 3]);
        for i in 0..sorted.len() {
            for j in (i + 1)..sorted.len() {
                if angular_separation(sorted[i], sorted[j]) < 12.0 {
                    assert_ne!(depths[i], depths[j], "{} and {}", sorted[i], sorted[j]);
                }
            }
        }
    }

    #[test]
    fn separation_wraps_across_zero() {
        let depths = cluster_depths(&[2.0, 180.0, 359.0], 12.0);
        assert_eq!(depths, vec![0, 0, 1]);
    }

    #[test]
    fn exactly_min_separation_is_not_a_collision() {
        assert_eq!(cluster_depths(&[10.0, 22.0], 12.0), vec![0, 0]);
        assert_eq!(cluster_depths(&[10.0, 21.999], 12.0), vec![0, 1]);
    }

    #[test]
    fn placement_preserves_true_angle() {
        let f = frame();
        let placements = place_planets(
            &bodies(&[
                ("Sun", 345.2),
                ("Mercury", 338.0),
                ("Venus", 350.1),
                ("Saturn", 341.0),
                ("Neptune", 357.9),
                ("Moon", 12.8),
            ]),
            &f,
            &WheelConfig::default(),
        );
        assert!(placements.iter().any(|p| p.depth >= 2));
        for p in &placements {
            let angle = f.angle_of(p.point);
            let diff = angular_separation(angle, p.longitude);
            assert!(diff < 1e-9, "{} drifted by {diff}", p.name);
            assert!((p.point.distance(f.center) - p.radius).abs() < 1e-9);
        }
    }

    #[test]
    fn sorted_by_longitude_then_name() {
        let placements = place_planets(
            &bodies(&[("Venus", 200.0), ("Mars", 200.0), ("Sun", 5.0)]),
            &frame(),
            &WheelConfig::default(),
        );
        let names: Vec<&str> = placements.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Sun", "Mars", "Venus"]);
        assert_eq!(placements[2].depth, 1);
    }

    #[test]
    fn connectors_end_on_reference_circle() {
        let f = frame();
        let config = WheelConfig::default();
        let placements = place_planets(&bodies(&[("Sun", 45.0), ("Mercury", 50.0)]), &f, &config);
        let layer = connector_layer(&placements, &f, &Theme::night(), &config);
        for (node, placement) in layer.children.iter().zip(&placements) {
            let Node::Line { from, to, style } = node else {
                panic!("connector is not a line");
            };
            assert_eq!(*from, placement.point);
            assert!((to.distance(f.center) - config.reference_radius).abs() < 1e-9);
            assert_eq!(style.dash.as_deref(), Some("2 3"));
        }
    }

    #[test]
    fn marker_ring_uses_sign_color() {
        let f = frame();
        let config = WheelConfig::default();
        let placements = place_planets(&bodies(&[("Sun", 5.0)]), &f, &config);
        let layer = planet_layer(&placements, &Theme::night(), &config);
        let Node::Group(marker) = &layer.children[0] else {
            panic!("marker is not a group");
        };
        let Node::Circle { style, .. } = &marker.children[0] else {
            panic!("disc missing");
        };
        assert_eq!(style.stroke.as_deref(), Some("#E8553D"));
    }
}
