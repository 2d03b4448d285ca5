//! Static lookup tables mapping chart categories to visual parameters.

use crate::ephemeris::{AspectType, ZodiacSign};

const SIGN_COLORS: [&str; 12] = [
    "#E8553D", // Aries
    "#6FAF5A", // Taurus
    "#F2C94C", // Gemini
    "#5BA4D9", // Cancer
    "#F29E4C", // Leo
    "#8CB369", // Virgo
    "#F7D774", // Libra
    "#3E7CB1", // Scorpio
    "#E0703A", // Sagittarius
    "#5E8C61", // Capricorn
    "#F5E27A", // Aquarius
    "#4F8FC0", // Pisces
];

const SIGN_GLYPHS: [&str; 12] = [
    "\u{2648}", "\u{2649}", "\u{264A}", "\u{264B}", "\u{264C}", "\u{264D}", "\u{264E}",
    "\u{264F}", "\u{2650}", "\u{2651}", "\u{2652}", "\u{2653}",
];

/// Opacity floor for wide-orb aspects.
pub const MIN_ASPECT_OPACITY: f64 = 0.15;
/// Opacity of an exact aspect.
pub const MAX_ASPECT_OPACITY: f64 = 0.7;
/// Orb at which the fade reaches zero before the floor applies.
pub const ORB_NORMALIZATION: f64 = 10.0;

pub fn sign_color(sign: ZodiacSign) -> &'static str {
    SIGN_COLORS[sign.index()]
}

pub fn sign_glyph(sign: ZodiacSign) -> &'static str {
    SIGN_GLYPHS[sign.index()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectWeight {
    Major,
    Moderate,
    Minor,
}

impl AspectWeight {
    pub fn of(aspect: &AspectType) -> Self {
        match aspect {
            AspectType::Conjunction
            | AspectType::Opposition
            | AspectType::Square
            | AspectType::Trine => AspectWeight::Major,
            AspectType::Sextile | AspectType::Quincunx => AspectWeight::Moderate,
            _ => AspectWeight::Minor,
        }
    }

    pub fn stroke_width(self) -> f64 {
        match self {
            AspectWeight::Major => 2.0,
            AspectWeight::Moderate => 1.4,
            AspectWeight::Minor => 0.9,
        }
    }
}

pub fn aspect_color(aspect: &AspectType) -> &'static str {
    match aspect {
        AspectType::Conjunction => "#F5C542",
        AspectType::Opposition => "#E5484D",
        AspectType::Square => "#FF6B35",
        AspectType::Trine => "#3DD68C",
        AspectType::Sextile => "#4CC9F0",
        AspectType::Quincunx => "#B57EDC",
        AspectType::Semisquare => "#F29E4C",
        AspectType::Sesquiquadrate => "#E879B9",
        AspectType::Other(_) => "#9AA0B4",
    }
}

/// `max(0.15, 0.7 × (1 − orb / 10))`; negative orbs count as exact.
pub fn aspect_opacity(orb_degrees: f64) -> f64 {
    let orb = if orb_degrees.is_nan() { ORB_NORMALIZATION } else { orb_degrees.max(0.0) };
    (MAX_ASPECT_OPACITY * (1.0 - orb / ORB_NORMALIZATION)).max(MIN_ASPECT_OPACITY)
}

/// Dash pattern: minor aspects always dashed, otherwise dashed unless applying.
pub fn aspect_dash(weight: AspectWeight, applying: bool) -> Option<&'static str> {
    match weight {
        AspectWeight::Minor => Some("2 4"),
        _ if applying => None,
        _ => Some("6 4"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AspectStyle {
    pub color: &'static str,
    pub weight: AspectWeight,
    pub stroke_width: f64,
    pub opacity: f64,
    pub dash: Option<&'static str>,
}

impl AspectStyle {
    pub fn endpoint_opacity(&self) -> f64 {
        self.opacity * 0.6
    }
}

pub fn resolve_aspect_style(aspect: &AspectType, orb_degrees: f64, applying: bool) -> AspectStyle {
    let weight = AspectWeight::of(aspect);
    AspectStyle {
        color: aspect_color(aspect),
        weight,
        stroke_width: weight.stroke_width(),
        opacity: aspect_opacity(orb_degrees),
        dash: aspect_dash(weight, applying),
    }
}

/// Which of the two symbol fonts carries a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFont {
    Primary,
    Alternate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyGlyph {
    pub symbol: &'static str,
    pub font: SymbolFont,
}

const FALLBACK_GLYPH: BodyGlyph = BodyGlyph {
    symbol: "\u{2605}",
    font: SymbolFont::Alternate,
};

/// Display glyph for a body name; case, spaces, hyphens and underscores are ignored.
pub fn body_glyph(name: &str) -> BodyGlyph {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect();
    let (symbol, font) = match key.as_str() {
        "sun" => ("\u{2609}", SymbolFont::Primary),
        "moon" => ("\u{263D}", SymbolFont::Primary),
        "mercury" => ("\u{263F}", SymbolFont::Primary),
        "venus" => ("\u{2640}", SymbolFont::Primary),
        "mars" => ("\u{2642}", SymbolFont::Primary),
        "jupiter" => ("\u{2643}", SymbolFont::Primary),
        "saturn" => ("\u{2644}", SymbolFont::Primary),
        "uranus" => ("\u{2645}", SymbolFont::Primary),
        "neptune" => ("\u{2646}", SymbolFont::Primary),
        "pluto" => ("\u{2647}", SymbolFont::Primary),
        "northnode" | "nnode" | "truenode" | "meannode" => ("\u{260A}", SymbolFont::Primary),
        "southnode" | "snode" => ("\u{260B}", SymbolFont::Primary),
        "chiron" => ("\u{26B7}", SymbolFont::Alternate),
        "partoffortune" | "fortune" => ("\u{2297}", SymbolFont::Alternate),
        "lilith" | "blackmoon" | "blackmoonlilith" => ("\u{26B8}", SymbolFont::Alternate),
        _ => return FALLBACK_GLYPH,
    };
    BodyGlyph { symbol, font }
}

/// Every glyph the wheel may draw, grouped by the font expected to carry it.
pub fn required_glyphs(font: SymbolFont) -> Vec<char> {
    let mut glyphs: Vec<char> = Vec::new();
    if font == SymbolFont::Primary {
        glyphs.extend(SIGN_GLYPHS.iter().filter_map(|g| g.chars().next()));
    }
    for name in [
        "sun", "moon", "mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune",
        "pluto", "northnode", "southnode", "chiron", "partoffortune", "lilith",
    ] {
        let glyph = body_glyph(name);
        if glyph.font == font {
            glyphs.extend(glyph.symbol.chars());
        }
    }
    if font == FALLBACK_GLYPH.font {
        glyphs.extend(FALLBACK_GLYPH.symbol.chars());
    }
    glyphs
}
