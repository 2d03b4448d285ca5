use crate::config::WheelConfig;
use crate::geometry::{PathData, Point, WheelFrame};
use crate::scene::{Gradient, GradientStop, Group, Node, Scene, Style};
use crate::theme::Theme;

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;
const GOLDEN_BASE_RADIUS: f64 = 24.0;
const GOLDEN_RINGS: i32 = 5;
const RAY_COUNT: usize = 24;

/// Glow discs behind the wheel. Registers its gradients on the scene.
pub(super) fn background_layer(
    scene: &mut Scene,
    frame: &WheelFrame,
    theme: &Theme,
    config: &WheelConfig,
) -> Group {
    let wheel_glow = scene.define(Gradient::Radial {
        id: "wheel-glow".to_string(),
        center: Point::new(0.5, 0.5),
        radius: 0.5,
        stops: vec![
            GradientStop::new(0.0, &theme.glow, 0.35),
            GradientStop::new(0.7, &theme.background_edge, 0.25),
            GradientStop::new(1.0, &theme.background, 0.0),
        ],
    });
    let core_glow = scene.define(Gradient::Radial {
        id: "core-glow".to_string(),
        center: Point::new(0.5, 0.5),
        radius: 0.5,
        stops: vec![
            GradientStop::new(0.0, &theme.accent_color, 0.18),
            GradientStop::new(1.0, &theme.glow, 0.0),
        ],
    });

    let mut layer = Group::new("background");
    layer.push(Node::circle(
        frame.center,
        config.outer_radius + 12.0,
        Style::fill(wheel_glow),
    ));
    layer.push(Node::circle(
        frame.center,
        config.zodiac_inner_radius,
        Style::fill(&theme.background).with_fill_opacity(0.55),
    ));
    layer.push(Node::circle(
        frame.center,
        config.aspect_radius,
        Style::fill(core_glow),
    ));
    layer
}

/// Golden-ratio circles, a hexagram and 24 rays. Independent of the input data.
pub(super) fn sacred_geometry_layer(frame: &WheelFrame, theme: &Theme, config: &WheelConfig) -> Group {
    let mut layer = Group::new("sacred-geometry").with_opacity(0.25);
    let line = Style::stroke(&theme.geometry_stroke, 0.6);

    for k in 0..GOLDEN_RINGS {
        let radius = GOLDEN_BASE_RADIUS * GOLDEN_RATIO.powi(k);
        layer.push(Node::circle(frame.center, radius, line.clone()));
    }

    for offset in [90.0, 30.0] {
        let triangle: Vec<Point> = (0..3)
            .map(|i| frame.point_on_circle(offset + 120.0 * i as f64, config.aspect_radius))
            .collect();
        layer.push(Node::path(PathData::polygon(&triangle), line.clone()));
    }

    let inner = config.aspect_radius * 0.2;
    for i in 0..RAY_COUNT {
        let angle = i as f64 * (360.0 / RAY_COUNT as f64);
        layer.push(Node::line(
            frame.point_on_circle(angle, inner),
            frame.point_on_circle(angle, config.aspect_radius),
            line.clone().with_stroke_opacity(0.6),
        ));
    }
    layer
}
