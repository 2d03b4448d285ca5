//! Branded 1200×630 card: text column on the left, the rasterized wheel on
//! the right.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;

use crate::config::CardConfig;
use crate::geometry::Point;
use crate::scene::{Gradient, GradientStop, Group, Node, Scene, Style, TextNode};
use crate::theme::Theme;

const BRAND_SIZE: f64 = 22.0;
const BRAND_BASELINE: f64 = 120.0;
const DATE_SIZE: f64 = 26.0;
const TITLE_LINE_HEIGHT: f64 = 1.15;
const MAX_TITLE_LINES: usize = 4;
/// Average advance of a glyph relative to its font size, for wrapping.
const GLYPH_WIDTH_FACTOR: f64 = 0.5;
const COLUMN_GAP: f64 = 40.0;
const DIVIDER_WIDTH: f64 = 96.0;
const DIVIDER_HEIGHT: f64 = 2.0;
const ELLIPSIS: char = '…';

/// Font size for a title, by character count.
pub fn title_font_size(title: &str) -> f64 {
    match title.chars().count() {
        0..=25 => 64.0,
        26..=40 => 54.0,
        41..=55 => 46.0,
        _ => 38.0,
    }
}

pub fn fallback_title(date: &str) -> String {
    format!("Reading for {date}")
}

/// Upper-cased site label from a `Host`-style header value.
pub fn brand_label(host: Option<&str>, fallback: &str) -> String {
    let Some(host) = host.map(str::trim).filter(|h| !h.is_empty()) else {
        return fallback.to_string();
    };
    let without_port = if let Some(rest) = host.strip_prefix('[') {
        // Bracketed IPv6 literal.
        rest.split(']').next().unwrap_or(rest)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    let name = match without_port.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("www.") => &without_port[4..],
        _ => without_port,
    };
    if name.is_empty() {
        return fallback.to_string();
    }
    name.to_uppercase()
}

/// `2024-03-05` becomes `March 5, 2024`; anything else is shown as given.
pub fn format_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(day) => day.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Greedy word wrap at `max_chars` per line. Words longer than a line are
/// split; more than `max_lines` lines are cut and the last one ends in `…`.
pub fn wrap_title(title: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in title.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed <= max_chars {
                if current_len > 0 {
                    current.push(' ');
                }
                current.extend(word.iter());
                current_len = needed;
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let mut kept: Vec<char> = last.chars().collect();
            kept.truncate(max_chars.saturating_sub(1));
            while kept.last().is_some_and(|c| c.is_whitespace()) {
                kept.pop();
            }
            kept.push(ELLIPSIS);
            *last = kept.into_iter().collect();
        }
    }
    lines
}

/// Resolved text for one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub title: String,
    pub date: String,
    pub brand: String,
}

impl CardContent {
    /// Applies the title and brand fallbacks. `date` is the raw request date.
    pub fn new(title: Option<&str>, date: &str, host: Option<&str>, config: &CardConfig) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_title(date));
        Self {
            title,
            date: format_date(date),
            brand: brand_label(host, &config.fallback_brand),
        }
    }
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Card scene with `wheel_png` embedded as a bitmap.
pub fn build_card_scene(content: &CardContent, wheel_png: &[u8], theme: &Theme, config: &CardConfig) -> Scene {
    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let mut scene = Scene::new(width, height);

    let backdrop = scene.define(Gradient::Linear {
        id: "card-bg".to_string(),
        from: Point::new(0.0, 0.0),
        to: Point::new(1.0, 1.0),
        stops: vec![
            GradientStop::new(0.0, &theme.background, 1.0),
            GradientStop::new(1.0, &theme.background_edge, 1.0),
        ],
    });
    let halo = scene.define(Gradient::Radial {
        id: "card-halo".to_string(),
        center: Point::new(0.5, 0.5),
        radius: 0.5,
        stops: vec![
            GradientStop::new(0.0, &theme.glow, 0.35),
            GradientStop::new(1.0, &theme.glow, 0.0),
        ],
    });

    let mut base = Group::new("card-background");
    base.push(Node::rect(Point::new(0.0, 0.0), width, height, Style::fill(backdrop)));
    base.push(Node::circle(
        Point::new(config.wheel_x + config.wheel_size / 2.0, config.wheel_y + config.wheel_size / 2.0),
        config.wheel_size * 0.55,
        Style::fill(halo),
    ));
    scene.push_layer(base);

    scene.push_layer(text_column(content, theme, config));

    let mut wheel = Group::new("card-wheel");
    wheel.push(Node::Image {
        origin: Point::new(config.wheel_x, config.wheel_y),
        width: config.wheel_size,
        height: config.wheel_size,
        href: png_data_uri(wheel_png),
    });
    scene.push_layer(wheel);

    scene
}

fn text_column(content: &CardContent, theme: &Theme, config: &CardConfig) -> Group {
    let x = config.padding_x;
    let column_width = (config.wheel_x - config.padding_x - COLUMN_GAP).max(1.0);
    let mut column = Group::new("card-text");

    column.push(Node::Text(
        TextNode::new(Point::new(x, BRAND_BASELINE), &content.brand, &theme.text_font, BRAND_SIZE)
            .fill(&theme.accent_color)
            .weight(600)
            .letter_spacing(4.0),
    ));

    let size = title_font_size(&content.title);
    let max_chars = (column_width / (size * GLYPH_WIDTH_FACTOR)).floor() as usize;
    let line_step = size * TITLE_LINE_HEIGHT;
    let mut baseline = BRAND_BASELINE + 40.0 + size;
    let lines = wrap_title(&content.title, max_chars, MAX_TITLE_LINES);
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            baseline += line_step;
        }
        column.push(Node::Text(
            TextNode::new(Point::new(x, baseline), line.as_str(), &theme.display_font, size).fill(&theme.title_color),
        ));
    }

    let divider_y = baseline + 34.0;
    column.push(Node::rect(
        Point::new(x, divider_y),
        DIVIDER_WIDTH,
        DIVIDER_HEIGHT,
        Style::fill(&theme.accent_color).with_fill_opacity(0.8),
    ));

    column.push(Node::Text(
        TextNode::new(Point::new(x, divider_y + 52.0), &content.date, &theme.text_font, DATE_SIZE)
            .fill(&theme.muted_text_color),
    ));
    column
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn title_tiers_at_boundaries() {
        assert_eq!(title_font_size(&title_of(25)), 64.0);
        assert_eq!(title_font_size(&title_of(26)), 54.0);
        assert_eq!(title_font_size(&title_of(40)), 54.0);
        assert_eq!(title_font_size(&title_of(41)), 46.0);
        assert_eq!(title_font_size(&title_of(55)), 46.0);
        assert_eq!(title_font_size(&title_of(56)), 38.0);
    }

    #[test]
    fn title_tiers_for_typical_lengths() {
        let sizes: Vec<f64> = [10, 30, 50, 70].iter().map(|n| title_font_size(&title_of(*n))).collect();
        assert_eq!(sizes, vec![64.0, 54.0, 46.0, 38.0]);
    }

    #[test]
    fn tiers_count_characters_not_bytes() {
        assert_eq!(title_font_size(&"é".repeat(25)), 64.0);
    }

    #[test]
    fn brand_strips_port_and_www() {
        assert_eq!(brand_label(Some("www.stars.example:8443"), "ASTROLOGY"), "STARS.EXAMPLE");
        assert_eq!(brand_label(Some("WWW.Stars.io"), "ASTROLOGY"), "STARS.IO");
        assert_eq!(brand_label(Some("moon.app"), "ASTROLOGY"), "MOON.APP");
        assert_eq!(brand_label(Some("[::1]:3000"), "ASTROLOGY"), "::1");
        assert_eq!(brand_label(Some("  "), "ASTROLOGY"), "ASTROLOGY");
        assert_eq!(brand_label(None, "STARS"), "STARS");
    }

    #[test]
    fn dates_are_spelled_out_when_valid() {
        assert_eq!(format_date("2024-03-05"), "March 5, 2024");
        assert_eq!(format_date("2024-13-05"), "2024-13-05");
        assert_eq!(format_date("someday"), "someday");
    }

    #[test]
    fn wrap_keeps_words_whole() {
        let lines = wrap_title("The Moon enters Scorpio tonight", 12, 4);
        assert_eq!(lines, vec!["The Moon", "enters", "Scorpio", "tonight"]);
    }

    #[test]
    fn wrap_truncates_with_ellipsis() {
        let lines = wrap_title("one two three four five six seven eight", 9, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "one two");
        assert!(lines[1].ends_with('…'));
        assert!(lines[1].chars().count() <= 9);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_title("Supercalifragilistic", 8, 4);
        assert_eq!(lines, vec!["Supercal", "ifragili", "stic"]);
    }

    #[test]
    fn content_falls_back_when_title_blank() {
        let config = CardConfig::default();
        let content = CardContent::new(Some("   "), "2024-01-02", None, &config);
        assert_eq!(content.title, "Reading for 2024-01-02");
        assert_eq!(content.date, "January 2, 2024");
        assert_eq!(content.brand, "ASTROLOGY");

        let content = CardContent::new(Some(" Venus Returns "), "2024-01-02", Some("www.x.com"), &config);
        assert_eq!(content.title, "Venus Returns");
        assert_eq!(content.brand, "X.COM");
    }

    #[test]
    fn card_embeds_wheel_bitmap() {
        let config = CardConfig::default();
        let content = CardContent::new(Some("Mercury stations direct today"), "2024-04-25", Some("stars.io"), &config);
        let scene = build_card_scene(&content, &[0x89, b'P', b'N', b'G'], &Theme::night(), &config);
        let wheel = scene.layer("card-wheel").unwrap();
        let Node::Image { href, width, .. } = &wheel.children[0] else {
            panic!("wheel bitmap missing");
        };
        assert_eq!(href, "data:image/png;base64,iVBORw==");
        assert_eq!(*width, config.wheel_size);

        let svg = scene.to_svg();
        assert!(svg.contains("width=\"1200.00\" height=\"630.00\""));
        assert!(svg.contains("STARS.IO"));
        assert!(svg.contains("April 25, 2024"));
        assert!(svg.contains("font-family=\"Playfair Display\" font-size=\"54.00\""));
    }

    #[test]
    fn title_lines_stay_in_text_column() {
        let config = CardConfig::default();
        let content = CardContent::new(Some(&"word ".repeat(40)), "2024-04-25", None, &config);
        let scene = build_card_scene(&content, &[], &Theme::night(), &config);
        let column = scene.layer("card-text").unwrap();
        let titles: Vec<&TextNode> = column
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) if t.font_family == "Playfair Display" => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(titles.len(), MAX_TITLE_LINES);
        for line in titles {
            let estimate = line.content.chars().count() as f64 * line.font_size * GLYPH_WIDTH_FACTOR;
            assert!(config.padding_x + estimate <= config.wheel_x);
        }
    }
}
