use crate::config::WheelConfig;
use crate::ephemeris::EphemerisSnapshot;
use crate::geometry::WheelFrame;
use crate::scene::{Group, Node, Style};
use crate::style::resolve_aspect_style;

use super::AspectLine;

const ENDPOINT_DOT_RADIUS: f64 = 2.5;

/// Connector geometry for every aspect whose two bodies both resolve.
/// Aspects naming unknown bodies are skipped without error.
pub fn resolve_aspect_lines(
    snapshot: &EphemerisSnapshot,
    frame: &WheelFrame,
    config: &WheelConfig,
) -> Vec<AspectLine> {
    let longitude_of = |name: &str| {
        snapshot
            .position(name)
            .map(|p| p.longitude)
            .filter(|lon| lon.is_finite())
            .map(|lon| lon.rem_euclid(360.0))
    };

    let mut lines = Vec::with_capacity(snapshot.aspects.len());
    for aspect in &snapshot.aspects {
        let (Some(lon1), Some(lon2)) = (longitude_of(&aspect.body1), longitude_of(&aspect.body2)) else {
            tracing::debug!(
                body1 = %aspect.body1,
                body2 = %aspect.body2,
                aspect = %aspect.aspect_type,
                "skipping aspect with unresolved body"
            );
            continue;
        };
        lines.push(AspectLine {
            body1: aspect.body1.clone(),
            body2: aspect.body2.clone(),
            from: frame.point_on_circle(lon1, config.aspect_radius),
            to: frame.point_on_circle(lon2, config.aspect_radius),
            style: resolve_aspect_style(&aspect.aspect_type, aspect.orb_degrees, aspect.applying),
        });
    }
    lines
}

pub(super) fn aspect_layer(lines: &[AspectLine]) -> Group {
    let mut layer = Group::new("aspects");
    for line in lines {
        let style = &line.style;
        layer.push(Node::line(
            line.from,
            line.to,
            Style::stroke(style.color, style.stroke_width)
                .with_stroke_opacity(style.opacity)
                .with_dash(style.dash),
        ));
        for end in [line.from, line.to] {
            layer.push(Node::circle(
                end,
                ENDPOINT_DOT_RADIUS,
                Style::fill(style.color).with_fill_opacity(style.endpoint_opacity()),
            ));
        }
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{AspectRelation, AspectType, CelestialPosition};
    use crate::style::AspectWeight;

    fn snapshot() -> EphemerisSnapshot {
        EphemerisSnapshot::new()
            .with_position(CelestialPosition::new("Sun", 0.0))
            .with_position(CelestialPosition::new("Moon", 180.0))
            .with_position(CelestialPosition::new("Venus", 60.0))
    }

    #[test]
    fn endpoints_sit_on_aspect_circle() {
        let frame = WheelFrame::for_canvas(600.0);
        let config = WheelConfig::default();
        let snap = snapshot().with_aspect(
            AspectRelation::new("Sun", "Moon", AspectType::Opposition, 0.5).applying(),
        );
        let lines = resolve_aspect_lines(&snap, &frame, &config);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!((line.from.distance(frame.center) - config.aspect_radius).abs() < 1e-9);
        assert!((line.to.distance(frame.center) - config.aspect_radius).abs() < 1e-9);
        assert!((line.from.x - 150.0).abs() < 1e-9);
        assert!((line.to.x - 450.0).abs() < 1e-9);
        assert_eq!(line.style.weight, AspectWeight::Major);
        assert_eq!(line.style.dash, None);
    }

    #[test]
    fn unknown_bodies_are_dropped() {
        let frame = WheelFrame::for_canvas(600.0);
        let snap = snapshot()
            .with_aspect(AspectRelation::new("Sun", "Venus", AspectType::Sextile, 2.0))
            .with_aspect(AspectRelation::new("Sun", "Sedna", AspectType::Trine, 1.0))
            .with_aspect(AspectRelation::new("Vertex", "Moon", AspectType::Square, 1.0));
        let lines = resolve_aspect_lines(&snap, &frame, &WheelConfig::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].body2, "Venus");
    }

    #[test]
    fn body_names_resolve_case_insensitively() {
        let frame = WheelFrame::for_canvas(600.0);
        let snap = snapshot().with_aspect(AspectRelation::new("sun", "VENUS", AspectType::Sextile, 2.0));
        assert_eq!(resolve_aspect_lines(&snap, &frame, &WheelConfig::default()).len(), 1);
    }

    #[test]
    fn dots_are_dimmer_than_lines() {
        let frame = WheelFrame::for_canvas(600.0);
        let snap = snapshot().with_aspect(AspectRelation::new("Sun", "Venus", AspectType::Sextile, 2.0));
        let lines = resolve_aspect_lines(&snap, &frame, &WheelConfig::default());
        let layer = aspect_layer(&lines);
        assert_eq!(layer.children.len(), 3);
        let Node::Line { style: line_style, .. } = &layer.children[0] else {
            panic!("expected connector line first");
        };
        let Node::Circle { style: dot_style, .. } = &layer.children[1] else {
            panic!("expected endpoint dot");
        };
        let line_opacity = line_style.stroke_opacity.unwrap();
        let dot_opacity = dot_style.fill_opacity.unwrap();
        assert!((dot_opacity - line_opacity * 0.6).abs() < 1e-12);
        assert_eq!(line_style.dash.as_deref(), Some("6 4"));
    }
}
