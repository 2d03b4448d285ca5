//! In-memory vector scene and its SVG serialisation.
//!
//! Layout code builds a [`Scene`] tree; only [`Scene::to_svg`] knows about
//! markup. Every number is written with two decimals so identical scenes
//! serialise to identical bytes.

use crate::geometry::{PathData, Point, fmt_num};
use std::fmt::Write as _;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub fill: Option<String>,
    pub fill_opacity: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke_opacity: Option<f64>,
    pub dash: Option<String>,
    pub opacity: Option<f64>,
}

impl Style {
    pub fn fill(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Default::default()
        }
    }

    pub fn stroke(color: impl Into<String>, width: f64) -> Self {
        Self {
            fill: Some("none".to_string()),
            stroke: Some(color.into()),
            stroke_width: Some(width),
            ..Default::default()
        }
    }

    pub fn with_stroke(mut self, color: impl Into<String>, width: f64) -> Self {
        self.stroke = Some(color.into());
        self.stroke_width = Some(width);
        self
    }

    pub fn with_fill_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = Some(opacity);
        self
    }

    pub fn with_stroke_opacity(mut self, opacity: f64) -> Self {
        self.stroke_opacity = Some(opacity);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_dash(mut self, dash: Option<&str>) -> Self {
        self.dash = dash.map(str::to_string);
        self
    }

    fn write_attrs(&self, out: &mut String) {
        if let Some(fill) = &self.fill {
            attr(out, "fill", &escape_xml(fill));
        }
        if let Some(v) = self.fill_opacity {
            attr(out, "fill-opacity", &num(v));
        }
        if let Some(stroke) = &self.stroke {
            attr(out, "stroke", &escape_xml(stroke));
        }
        if let Some(v) = self.stroke_width {
            attr(out, "stroke-width", &num(v));
        }
        if let Some(v) = self.stroke_opacity {
            attr(out, "stroke-opacity", &num(v));
        }
        if let Some(dash) = &self.dash {
            attr(out, "stroke-dasharray", &escape_xml(dash));
        }
        if let Some(v) = self.opacity {
            attr(out, "opacity", &num(v));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub position: Point,
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    pub fill: String,
    pub anchor: TextAnchor,
    pub font_weight: Option<u16>,
    pub letter_spacing: Option<f64>,
    pub opacity: Option<f64>,
    /// Vertically centre the glyphs on `position` instead of sitting on the baseline.
    pub centered: bool,
}

impl TextNode {
    pub fn new(position: Point, content: impl Into<String>, font_family: &str, font_size: f64) -> Self {
        Self {
            position,
            content: content.into(),
            font_family: font_family.to_string(),
            font_size,
            fill: "#FFFFFF".to_string(),
            anchor: TextAnchor::Start,
            font_weight: None,
            letter_spacing: None,
            opacity: None,
            centered: false,
        }
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.fill = color.into();
        self
    }

    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn weight(mut self, weight: u16) -> Self {
        self.font_weight = Some(weight);
        self
    }

    pub fn letter_spacing(mut self, spacing: f64) -> Self {
        self.letter_spacing = Some(spacing);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Circle {
        center: Point,
        radius: f64,
        style: Style,
    },
    Line {
        from: Point,
        to: Point,
        style: Style,
    },
    Path {
        data: PathData,
        style: Style,
    },
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        corner_radius: f64,
        style: Style,
    },
    Text(TextNode),
    Image {
        origin: Point,
        width: f64,
        height: f64,
        href: String,
    },
}

impl Node {
    pub fn circle(center: Point, radius: f64, style: Style) -> Self {
        Node::Circle {
            center,
            radius,
            style,
        }
    }

    pub fn line(from: Point, to: Point, style: Style) -> Self {
        Node::Line { from, to, style }
    }

    pub fn path(data: PathData, style: Style) -> Self {
        Node::Path { data, style }
    }

    pub fn rect(origin: Point, width: f64, height: f64, style: Style) -> Self {
        Node::Rect {
            origin,
            width,
            height,
            corner_radius: 0.0,
            style,
        }
    }

    fn write_svg(&self, out: &mut String) {
        match self {
            Node::Group(group) => group.write_svg(out),
            Node::Circle {
                center,
                radius,
                style,
            } => {
                out.push_str("<circle");
                attr(out, "cx", &num(center.x));
                attr(out, "cy", &num(center.y));
                attr(out, "r", &num(*radius));
                style.write_attrs(out);
                out.push_str("/>");
            }
            Node::Line { from, to, style } => {
                out.push_str("<line");
                attr(out, "x1", &num(from.x));
                attr(out, "y1", &num(from.y));
                attr(out, "x2", &num(to.x));
                attr(out, "y2", &num(to.y));
                style.write_attrs(out);
                out.push_str("/>");
            }
            Node::Path { data, style } => {
                out.push_str("<path");
                attr(out, "d", &data.to_svg());
                style.write_attrs(out);
                out.push_str("/>");
            }
            Node::Rect {
                origin,
                width,
                height,
                corner_radius,
                style,
            } => {
                out.push_str("<rect");
                attr(out, "x", &num(origin.x));
                attr(out, "y", &num(origin.y));
                attr(out, "width", &num(*width));
                attr(out, "height", &num(*height));
                if *corner_radius > 0.0 {
                    attr(out, "rx", &num(*corner_radius));
                }
                style.write_attrs(out);
                out.push_str("/>");
            }
            Node::Text(text) => {
                out.push_str("<text");
                attr(out, "x", &num(text.position.x));
                attr(out, "y", &num(text.position.y));
                attr(out, "font-family", &escape_xml(&text.font_family));
                attr(out, "font-size", &num(text.font_size));
                attr(out, "fill", &escape_xml(&text.fill));
                attr(out, "text-anchor", text.anchor.as_str());
                if let Some(weight) = text.font_weight {
                    attr(out, "font-weight", &weight.to_string());
                }
                if let Some(spacing) = text.letter_spacing {
                    attr(out, "letter-spacing", &num(spacing));
                }
                if let Some(opacity) = text.opacity {
                    attr(out, "opacity", &num(opacity));
                }
                if text.centered {
                    attr(out, "dominant-baseline", "central");
                }
                out.push('>');
                out.push_str(&escape_xml(&text.content));
                out.push_str("</text>");
            }
            Node::Image {
                origin,
                width,
                height,
                href,
            } => {
                out.push_str("<image");
                attr(out, "x", &num(origin.x));
                attr(out, "y", &num(origin.y));
                attr(out, "width", &num(*width));
                attr(out, "height", &num(*height));
                attr(out, "xlink:href", &escape_xml(href));
                out.push_str("/>");
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub class: Option<String>,
    pub opacity: Option<f64>,
    pub children: Vec<Node>,
}

impl Group {
    pub fn new(class: &str) -> Self {
        Self {
            class: Some(class.to_string()),
            opacity: None,
            children: Vec::new(),
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    fn write_svg(&self, out: &mut String) {
        out.push_str("<g");
        if let Some(class) = &self.class {
            attr(out, "class", &escape_xml(class));
        }
        if let Some(opacity) = self.opacity {
            attr(out, "opacity", &num(opacity));
        }
        out.push('>');
        for child in &self.children {
            child.write_svg(out);
        }
        out.push_str("</g>");
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
    pub opacity: f64,
}

impl GradientStop {
    pub fn new(offset: f64, color: &str, opacity: f64) -> Self {
        Self {
            offset,
            color: color.to_string(),
            opacity,
        }
    }
}

/// Gradient definitions. Coordinates are fractions of the bounding box.
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    Radial {
        id: String,
        center: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
    Linear {
        id: String,
        from: Point,
        to: Point,
        stops: Vec<GradientStop>,
    },
}

impl Gradient {
    pub fn id(&self) -> &str {
        match self {
            Gradient::Radial { id, .. } | Gradient::Linear { id, .. } => id,
        }
    }

    /// Paint reference usable as a fill.
    pub fn paint(&self) -> String {
        format!("url(#{})", self.id())
    }

    fn write_svg(&self, out: &mut String) {
        let (tag, stops) = match self {
            Gradient::Radial {
                id,
                center,
                radius,
                stops,
            } => {
                out.push_str("<radialGradient");
                attr(out, "id", &escape_xml(id));
                attr(out, "cx", &num(center.x));
                attr(out, "cy", &num(center.y));
                attr(out, "r", &num(*radius));
                ("radialGradient", stops)
            }
            Gradient::Linear { id, from, to, stops } => {
                out.push_str("<linearGradient");
                attr(out, "id", &escape_xml(id));
                attr(out, "x1", &num(from.x));
                attr(out, "y1", &num(from.y));
                attr(out, "x2", &num(to.x));
                attr(out, "y2", &num(to.y));
                ("linearGradient", stops)
            }
        };
        out.push('>');
        for stop in stops {
            out.push_str("<stop");
            attr(out, "offset", &num(stop.offset));
            attr(out, "stop-color", &escape_xml(&stop.color));
            attr(out, "stop-opacity", &num(stop.opacity));
            out.push_str("/>");
        }
        let _ = write!(out, "</{tag}>");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub defs: Vec<Gradient>,
    pub layers: Vec<Group>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: Vec::new(),
            layers: Vec::new(),
        }
    }

    pub fn define(&mut self, gradient: Gradient) -> String {
        let paint = gradient.paint();
        self.defs.push(gradient);
        paint
    }

    pub fn push_layer(&mut self, layer: Group) {
        self.layers.push(layer);
    }

    /// Top-level layer with the given class.
    pub fn layer(&self, class: &str) -> Option<&Group> {
        self.layers
            .iter()
            .find(|layer| layer.class.as_deref() == Some(class))
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let (w, h) = (num(self.width), num(self.height));
        let _ = write!(
            svg,
            concat!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\"",
                " width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            ),
            w = w,
            h = h,
        );
        if !self.defs.is_empty() {
            svg.push_str("<defs>");
            for gradient in &self.defs {
                gradient.write_svg(&mut svg);
            }
            svg.push_str("</defs>");
        }
        for layer in &self.layers {
            layer.write_svg(&mut svg);
        }
        svg.push_str("</svg>");
        svg
    }
}

fn attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"{value}\"");
}

fn num(value: f64) -> String {
    fmt_num(value)
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
