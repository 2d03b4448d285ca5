//! Trigonometry for the chart wheel.
//!
//! Chart angles are ecliptic longitudes: 0° sits at 9 o'clock (the ascendant
//! side of the reference component) and increasing longitude runs
//! counter-clockwise on screen. Screen space has y growing downward.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A wheel centred at `center` in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelFrame {
    pub center: Point,
}

impl WheelFrame {
    pub fn new(center: Point) -> Self {
        Self { center }
    }

    /// Frame for a square canvas of the given side length.
    pub fn for_canvas(size: f64) -> Self {
        Self::new(Point::new(size / 2.0, size / 2.0))
    }

    /// Point at chart angle `angle_deg` and distance `radius` from the centre.
    pub fn point_on_circle(&self, angle_deg: f64, radius: f64) -> Point {
        let theta = (180.0 - angle_deg).to_radians();
        Point::new(
            self.center.x + radius * theta.cos(),
            self.center.y + radius * theta.sin(),
        )
    }

    /// Chart angle of a canvas point, in `[0, 360)`.
    pub fn angle_of(&self, point: Point) -> f64 {
        let theta = (point.y - self.center.y)
            .atan2(point.x - self.center.x)
            .to_degrees();
        (180.0 - theta).rem_euclid(360.0)
    }

    /// Closed annular wedge between two radii spanning `start_deg..end_deg`.
    pub fn ring_segment_path(
        &self,
        inner_radius: f64,
        outer_radius: f64,
        start_deg: f64,
        end_deg: f64,
    ) -> PathData {
        let outer_start = self.point_on_circle(start_deg, outer_radius);
        let outer_end = self.point_on_circle(end_deg, outer_radius);
        let inner_end = self.point_on_circle(end_deg, inner_radius);
        let inner_start = self.point_on_circle(start_deg, inner_radius);
        let large_arc = (end_deg - start_deg).abs() > 180.0;

        PathData::new()
            .move_to(outer_start)
            .arc_to(outer_radius, large_arc, false, outer_end)
            .line_to(inner_end)
            .arc_to(inner_radius, large_arc, true, inner_start)
            .line_to(outer_start)
            .close()
    }
}

/// Smaller of the two arcs between two longitudes, in `[0, 180]`.
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs().rem_euclid(360.0);
    diff.min(360.0 - diff)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Arc {
        radius: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

/// Vector path as a list of commands; serialised to SVG `d` syntax on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    pub commands: Vec<PathCommand>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, point: Point) -> Self {
        self.commands.push(PathCommand::MoveTo(point));
        self
    }

    pub fn line_to(mut self, point: Point) -> Self {
        self.commands.push(PathCommand::LineTo(point));
        self
    }

    pub fn arc_to(mut self, radius: f64, large_arc: bool, sweep: bool, to: Point) -> Self {
        self.commands.push(PathCommand::Arc {
            radius,
            large_arc,
            sweep,
            to,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn polygon(points: &[Point]) -> Self {
        let mut path = PathData::new();
        for (idx, point) in points.iter().enumerate() {
            path = if idx == 0 {
                path.move_to(*point)
            } else {
                path.line_to(*point)
            };
        }
        if !points.is_empty() {
            path = path.close();
        }
        path
    }

    pub fn first_point(&self) -> Option<Point> {
        self.commands.iter().find_map(|cmd| match cmd {
            PathCommand::MoveTo(p) => Some(*p),
            _ => None,
        })
    }

    /// Final drawn point before any `Close`.
    pub fn last_point(&self) -> Option<Point> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
            PathCommand::Arc { to, .. } => Some(*to),
            PathCommand::Close => None,
        })
    }

    pub fn to_svg(&self) -> String {
        let mut d = String::new();
        for cmd in &self.commands {
            if !d.is_empty() {
                d.push(' ');
            }
            let _ = match cmd {
                PathCommand::MoveTo(p) => write!(d, "M {} {}", fmt_num(p.x), fmt_num(p.y)),
                PathCommand::LineTo(p) => write!(d, "L {} {}", fmt_num(p.x), fmt_num(p.y)),
                PathCommand::Arc {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } => {
                    let r = fmt_num(*radius);
                    write!(
                        d,
                        "A {r} {r} 0 {} {} {} {}",
                        u8::from(*large_arc),
                        u8::from(*sweep),
                        fmt_num(to.x),
                        fmt_num(to.y),
                    )
                }
                PathCommand::Close => write!(d, "Z"),
            };
        }
        d
    }
}

/// Two-decimal formatting shared by every serialised coordinate.
pub fn fmt_num(value: f64) -> String {
    let formatted = format!("{value:.2}");
    // "-0.00" and "0.00" must serialise identically.
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn frame() -> WheelFrame {
        WheelFrame::for_canvas(600.0)
    }

    #[test]
    fn zero_degrees_points_left() {
        let p = frame().point_on_circle(0.0, 100.0);
        assert!((p.x - 200.0).abs() < EPS);
        assert!((p.y - 300.0).abs() < EPS);
    }

    #[test]
    fn longitude_runs_counter_clockwise_on_screen() {
        // 90° lands at the bottom of the wheel, 180° on the right, 270° at the top.
        let bottom = frame().point_on_circle(90.0, 100.0);
        assert!((bottom.x - 300.0).abs() < 1e-6);
        assert!((bottom.y - 400.0).abs() < 1e-6);
        let right = frame().point_on_circle(180.0, 100.0);
        assert!((right.x - 400.0).abs() < 1e-6);
        let top = frame().point_on_circle(270.0, 100.0);
        assert!((top.y - 200.0).abs() < 1e-6);
    }

    #[test]
    fn point_on_circle_is_reproducible() {
        let a = frame().point_on_circle(123.456, 187.5);
        let b = frame().point_on_circle(123.456, 187.5);
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
    }

    #[test]
    fn angle_of_inverts_point_on_circle() {
        let f = frame();
        for step in 0..72 {
            let angle = step as f64 * 5.0 + 0.25;
            let p = f.point_on_circle(angle, 173.0);
            assert!((f.angle_of(p) - angle).abs() < 1e-9, "angle {angle}");
            assert!((p.distance(f.center) - 173.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ring_segment_closes_exactly() {
        let f = frame();
        let path = f.ring_segment_path(240.0, 280.0, 30.0, 60.0);
        let first = path.first_point().unwrap();
        let last = path.last_point().unwrap();
        assert_eq!(first, last);
        assert_eq!(path.commands.last(), Some(&PathCommand::Close));
        assert_eq!(
            path.commands
                .iter()
                .filter(|c| matches!(c, PathCommand::Arc { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn ring_segment_serialises_arcs() {
        let d = frame().ring_segment_path(240.0, 280.0, 0.0, 30.0).to_svg();
        assert!(d.starts_with("M 20.00 300.00 A 280.00 280.00 0 0 0 "));
        assert!(d.contains("A 240.00 240.00 0 0 1 60.00 300.00"));
        assert!(d.ends_with("L 20.00 300.00 Z"));
    }

    #[test]
    fn large_arc_flag_follows_span() {
        let d = frame().ring_segment_path(10.0, 20.0, 0.0, 200.0).to_svg();
        assert!(d.contains("A 20.00 20.00 0 1 0"));
    }

    #[test]
    fn separation_wraps_around() {
        assert!((angular_separation(359.0, 1.0) - 2.0).abs() < EPS);
        assert!((angular_separation(10.0, 190.0) - 180.0).abs() < EPS);
        assert!((angular_separation(45.0, 40.0) - 5.0).abs() < EPS);
    }
}
