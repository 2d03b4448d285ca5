use crate::config::FontConfig;
use serde::{Deserialize, Serialize};

/// Palette and font families shared by the wheel and card passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub text_font: String,
    pub display_font: String,
    pub symbol_font: String,
    pub symbol_alt_font: String,
    pub background: String,
    pub background_edge: String,
    pub glow: String,
    pub ring_stroke: String,
    pub ring_stroke_opacity: f32,
    pub glyph_color: String,
    pub marker_fill: String,
    pub retrograde_color: String,
    pub geometry_stroke: String,
    pub title_color: String,
    pub muted_text_color: String,
    pub accent_color: String,
}

impl Theme {
    pub fn night() -> Self {
        Self {
            text_font: "Inter".to_string(),
            display_font: "Playfair Display".to_string(),
            symbol_font: "Noto Sans Symbols".to_string(),
            symbol_alt_font: "Noto Sans Symbols 2".to_string(),
            background: "#0B0817".to_string(),
            background_edge: "#1A1233".to_string(),
            glow: "#6D5BD0".to_string(),
            ring_stroke: "#C9B8FF".to_string(),
            ring_stroke_opacity: 0.55,
            glyph_color: "#F4EEFF".to_string(),
            marker_fill: "#130F26".to_string(),
            retrograde_color: "#E5484D".to_string(),
            geometry_stroke: "#B9A7F5".to_string(),
            title_color: "#FFFFFF".to_string(),
            muted_text_color: "#B7AED6".to_string(),
            accent_color: "#D8B4FE".to_string(),
        }
    }

    /// Night palette with font families taken from the configured font files.
    pub fn from_fonts(fonts: &FontConfig) -> Self {
        Self {
            text_font: fonts.text.family.clone(),
            display_font: fonts.display.family.clone(),
            symbol_font: fonts.symbols.family.clone(),
            symbol_alt_font: fonts.symbols_alt.family.clone(),
            ..Self::night()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::night()
    }
}
