use crate::config::WheelConfig;
use crate::ephemeris::ZodiacSign;
use crate::geometry::WheelFrame;
use crate::scene::{Group, Node, Style, TextAnchor, TextNode};
use crate::style::{sign_color, sign_glyph};
use crate::theme::Theme;

const SIGN_SPAN: f64 = 30.0;
const WEDGE_OPACITY: f64 = 0.18;
const SIGN_GLYPH_SIZE: f64 = 18.0;
const TICK_STEP: u32 = 5;

/// Twelve tinted wedges, the ring outlines, sign boundaries and glyphs.
pub(super) fn zodiac_layer(frame: &WheelFrame, theme: &Theme, config: &WheelConfig) -> Group {
    let mut layer = Group::new("zodiac");

    for sign in ZodiacSign::ALL {
        let start = sign.start_longitude();
        let wedge = frame.ring_segment_path(
            config.zodiac_inner_radius,
            config.outer_radius,
            start,
            start + SIGN_SPAN,
        );
        layer.push(Node::path(
            wedge,
            Style::fill(sign_color(sign)).with_fill_opacity(WEDGE_OPACITY),
        ));
    }

    let ring = Style::stroke(&theme.ring_stroke, 1.2).with_stroke_opacity(f64::from(theme.ring_stroke_opacity));
    layer.push(Node::circle(frame.center, config.outer_radius, ring.clone()));
    layer.push(Node::circle(frame.center, config.zodiac_inner_radius, ring.clone()));
    layer.push(Node::circle(
        frame.center,
        config.aspect_radius,
        Style::stroke(&theme.ring_stroke, 0.8).with_stroke_opacity(0.35),
    ));

    for sign in ZodiacSign::ALL {
        let angle = sign.start_longitude();
        layer.push(Node::line(
            frame.point_on_circle(angle, config.zodiac_inner_radius),
            frame.point_on_circle(angle, config.outer_radius),
            ring.clone(),
        ));
    }

    for sign in ZodiacSign::ALL {
        let mid = sign.start_longitude() + SIGN_SPAN / 2.0;
        let at = frame.point_on_circle(mid, config.sign_glyph_radius);
        layer.push(Node::Text(
            TextNode::new(at, sign_glyph(sign), &theme.symbol_font, SIGN_GLYPH_SIZE)
                .fill(sign_color(sign))
                .anchor(TextAnchor::Middle)
                .centered(),
        ));
    }

    layer
}

/// Degree ticks every 5°, skipping sign boundaries; 10° ticks are heavier.
pub(super) fn tick_layer(frame: &WheelFrame, theme: &Theme, config: &WheelConfig) -> Group {
    let mut layer = Group::new("ticks");
    for degree in (TICK_STEP..360).step_by(TICK_STEP as usize) {
        if degree % 30 == 0 {
            continue;
        }
        let major = degree % 10 == 0;
        let (length, width, opacity) = if major {
            (config.major_tick_length, 1.0, 0.55)
        } else {
            (config.minor_tick_length, 0.6, 0.35)
        };
        let angle = f64::from(degree);
        layer.push(Node::line(
            frame.point_on_circle(angle, config.zodiac_inner_radius),
            frame.point_on_circle(angle, config.zodiac_inner_radius - length),
            Style::stroke(&theme.ring_stroke, width).with_stroke_opacity(opacity),
        ));
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PathCommand;

    fn frame() -> WheelFrame {
        WheelFrame::for_canvas(600.0)
    }

    #[test]
    fn twelve_closed_wedges() {
        let layer = zodiac_layer(&frame(), &Theme::night(), &WheelConfig::default());
        let wedges: Vec<_> = layer
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Path { data, .. } => Some(data),
                _ => None,
            })
            .collect();
        assert_eq!(wedges.len(), 12);
        for wedge in wedges {
            assert_eq!(wedge.first_point(), wedge.last_point());
            assert_eq!(wedge.commands.last(), Some(&PathCommand::Close));
        }
    }

    #[test]
    fn glyphs_sit_mid_wedge() {
        let f = frame();
        let layer = zodiac_layer(&f, &Theme::night(), &WheelConfig::default());
        let glyphs: Vec<&TextNode> = layer
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(glyphs.len(), 12);
        for (idx, glyph) in glyphs.iter().enumerate() {
            let expected = idx as f64 * 30.0 + 15.0;
            assert!((f.angle_of(glyph.position) - expected).abs() < 1e-9);
            assert_eq!(glyph.font_family, "Noto Sans Symbols");
        }
    }

    #[test]
    fn ticks_skip_sign_boundaries() {
        let f = frame();
        let config = WheelConfig::default();
        let layer = tick_layer(&f, &Theme::night(), &config);
        // 72 five-degree steps minus 12 boundaries.
        assert_eq!(layer.children.len(), 60);

        let mut major = 0;
        let mut minor = 0;
        for node in &layer.children {
            let Node::Line { from, to, .. } = node else {
                panic!("tick is not a line");
            };
            let angle = f.angle_of(*from).round() as i64;
            assert_ne!(angle % 30, 0);
            let length = from.distance(*to);
            if angle % 10 == 0 {
                major += 1;
                assert!((length - config.major_tick_length).abs() < 1e-9);
            } else {
                minor += 1;
                assert!((length - config.minor_tick_length).abs() < 1e-9);
            }
        }
        assert_eq!((major, minor), (24, 36));
    }
}
