//! Two-pass rasterization: the wheel alone with the symbol fonts, then the
//! card with the text fonts and the wheel embedded as a bitmap.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use resvg::tiny_skia::{Pixmap, Transform};
use usvg::fontdb::Database;

use crate::card::{CardContent, build_card_scene};
use crate::config::Config;
use crate::ephemeris::EphemerisSnapshot;
use crate::fonts::{FontError, FontSet};
use crate::layout::compute_wheel;
use crate::theme::Theme;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("fonts unavailable: {0}")]
    Fonts(#[from] Arc<FontError>),
    #[error("invalid vector scene: {0}")]
    Svg(#[from] usvg::Error),
    #[error("could not allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("render worker failed: {0}")]
    Worker(String),
}

/// Rasterizes `svg` scaled to `width` pixels, keeping its aspect ratio.
/// Only faces in `fontdb` are visible; there is no system-font fallback.
pub fn rasterize(svg: &str, fontdb: Arc<Database>, default_family: &str, width: u32) -> Result<Pixmap, RenderError> {
    let options = usvg::Options {
        font_family: default_family.to_string(),
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &options)?;

    let size = tree.size();
    let scale = width as f32 / size.width();
    let height = (size.height() * scale).round().max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    pixmap.encode_png().map_err(|err| RenderError::Encode(err.to_string()))
}

/// Stage one: the wheel scene at `width` pixels.
pub fn render_wheel_png(svg: &str, fonts: &FontSet, theme: &Theme, width: u32) -> Result<Vec<u8>, RenderError> {
    let pixmap = rasterize(svg, fonts.wheel_database(), &theme.symbol_font, width)?;
    encode_png(&pixmap)
}

/// Stage two: the card scene at its configured output width.
pub fn render_card_png(svg: &str, fonts: &FontSet, theme: &Theme, width: u32) -> Result<Vec<u8>, RenderError> {
    let pixmap = rasterize(svg, fonts.card_database(), &theme.text_font, width)?;
    encode_png(&pixmap)
}

/// Full preview image. Returns bytes only once both passes have succeeded.
pub fn render_preview(
    snapshot: &EphemerisSnapshot,
    content: &CardContent,
    fonts: &FontSet,
    theme: &Theme,
    config: &Config,
) -> Result<Vec<u8>, RenderError> {
    let wheel = compute_wheel(snapshot, theme, &config.wheel);
    let wheel_png = render_wheel_png(&wheel.to_svg(), fonts, theme, config.wheel.raster_width)?;

    let card = build_card_scene(content, &wheel_png, theme, &config.card);
    let png = render_card_png(&card.to_svg(), fonts, theme, config.card.width)?;
    tracing::debug!(
        bodies = wheel.placements.len(),
        aspects = wheel.aspects.len(),
        wheel_bytes = wheel_png.len(),
        card_bytes = png.len(),
        "rendered preview"
    );
    Ok(png)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

pub fn write_output_png(png: &[u8], output: &Path) -> Result<()> {
    std::fs::write(output, png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FontConfig;
    use crate::ephemeris::{AspectRelation, AspectType, CelestialPosition};
    use crate::fonts::load_font_set;
    use tempfile::TempDir;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_dimensions(png: &[u8]) -> (u32, u32) {
        let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (w, h)
    }

    /// Every face is Tuffy, registered under its real family name.
    fn tuffy_fonts() -> (TempDir, FontSet, Theme) {
        let dir = TempDir::new().unwrap();
        let mut config = FontConfig::default().with_candidate_dirs(vec![dir.path().to_path_buf()]);
        for spec in [&mut config.text, &mut config.display, &mut config.symbols, &mut config.symbols_alt] {
            spec.family = "Tuffy".to_string();
            std::fs::write(
                dir.path().join(&spec.file),
                include_bytes!("../tests/fixtures/fonts/Tuffy.ttf"),
            )
            .unwrap();
        }
        let set = load_font_set(&config).unwrap();
        (dir, set, Theme::from_fonts(&config))
    }

    #[test]
    fn rasterize_scales_to_requested_width() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
            <rect width="200" height="100" fill="#336699"/>
        </svg>"##;
        let pixmap = rasterize(svg, Arc::new(Database::new()), "Inter", 400).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (400, 200));
        let png = encode_png(&pixmap).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn malformed_scene_is_an_svg_error() {
        let err = rasterize("<svg><g></svg", Arc::new(Database::new()), "Inter", 100).unwrap_err();
        assert!(matches!(err, RenderError::Svg(_)), "{err}");
    }

    #[test]
    fn zero_width_is_a_pixmap_error() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        let err = rasterize(svg, Arc::new(Database::new()), "Inter", 0).unwrap_err();
        assert!(matches!(err, RenderError::Pixmap { width: 0, .. }));
    }

    #[test]
    fn wheel_pass_is_square() {
        let (_dir, fonts, theme) = tuffy_fonts();
        let config = Config::default();
        let wheel = compute_wheel(&EphemerisSnapshot::new(), &theme, &config.wheel);
        let png = render_wheel_png(&wheel.to_svg(), &fonts, &theme, config.wheel.raster_width).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(png_dimensions(&png), (560, 560));
    }

    #[test]
    fn preview_has_card_dimensions_and_is_deterministic() {
        let (_dir, fonts, theme) = tuffy_fonts();
        let config = Config::default();
        let snapshot = EphemerisSnapshot::new()
            .with_position(CelestialPosition::new("Sun", 15.0))
            .with_position(CelestialPosition::new("Moon", 20.0).retrograde())
            .with_aspect(AspectRelation::new("Sun", "Moon", AspectType::Conjunction, 5.0));
        let content = CardContent::new(Some("New Moon in Aries"), "2024-04-08", Some("stars.io"), &config.card);

        let first = render_preview(&snapshot, &content, &fonts, &theme, &config).unwrap();
        let second = render_preview(&snapshot, &content, &fonts, &theme, &config).unwrap();
        assert_eq!(&first[..8], &PNG_SIGNATURE);
        assert_eq!(png_dimensions(&first), (1200, 630));
        assert_eq!(first, second);

        // The title is real text now, so a different heading changes pixels.
        let other = CardContent::new(Some("Full Moon in Libra"), "2024-04-08", Some("stars.io"), &config.card);
        let third = render_preview(&snapshot, &other, &fonts, &theme, &config).unwrap();
        assert_ne!(first, third);
    }

    #[test]
    fn font_errors_convert() {
        let err: RenderError = Arc::new(FontError::NotFound {
            probe: "Inter-Regular.ttf".to_string(),
            probed: vec!["/nowhere".into()],
        })
        .into();
        assert!(err.to_string().contains("/nowhere"));
    }
}
