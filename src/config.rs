use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=86400";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub upstream_url: String,
    pub upstream_timeout_ms: u64,
    pub cache_control: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            upstream_url: "http://127.0.0.1:8000".to_string(),
            upstream_timeout_ms: 5000,
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFile {
    pub file: String,
    pub family: String,
}

impl FontFile {
    fn new(file: &str, family: &str) -> Self {
        Self {
            file: file.to_string(),
            family: family.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Probed in order; the first one holding `text.file` becomes the font root.
    pub candidate_dirs: Vec<PathBuf>,
    pub text: FontFile,
    pub display: FontFile,
    pub symbols: FontFile,
    pub symbols_alt: FontFile,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidate_dirs: vec![
                PathBuf::from("./fonts"),
                PathBuf::from("./assets/fonts"),
                PathBuf::from("/usr/share/fonts/wheelcard"),
                PathBuf::from("/usr/local/share/fonts/wheelcard"),
            ],
            text: FontFile::new("Inter-Regular.ttf", "Inter"),
            display: FontFile::new("PlayfairDisplay-Regular.ttf", "Playfair Display"),
            symbols: FontFile::new("NotoSansSymbols-Regular.ttf", "Noto Sans Symbols"),
            symbols_alt: FontFile::new("NotoSansSymbols2-Regular.ttf", "Noto Sans Symbols 2"),
        }
    }
}

impl FontConfig {
    pub fn with_candidate_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.candidate_dirs = dirs;
        self
    }
}

/// Wheel layout constants, in wheel-canvas units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    pub size: f64,
    pub outer_radius: f64,
    pub zodiac_inner_radius: f64,
    pub sign_glyph_radius: f64,
    pub planet_orbit_radius: f64,
    pub cluster_step: f64,
    pub min_separation: f64,
    pub reference_radius: f64,
    pub aspect_radius: f64,
    pub marker_radius: f64,
    pub retrograde_ring_radius: f64,
    pub major_tick_length: f64,
    pub minor_tick_length: f64,
    /// Pixel width of the stage-1 raster.
    pub raster_width: u32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            size: 600.0,
            outer_radius: 280.0,
            zodiac_inner_radius: 240.0,
            sign_glyph_radius: 260.0,
            planet_orbit_radius: 200.0,
            cluster_step: 20.0,
            min_separation: 12.0,
            reference_radius: 170.0,
            aspect_radius: 150.0,
            marker_radius: 13.0,
            retrograde_ring_radius: 17.0,
            major_tick_length: 10.0,
            minor_tick_length: 5.0,
            raster_width: 560,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub width: u32,
    pub height: u32,
    pub wheel_x: f64,
    pub wheel_y: f64,
    pub wheel_size: f64,
    pub padding_x: f64,
    pub fallback_brand: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            wheel_x: 610.0,
            wheel_y: 35.0,
            wheel_size: 560.0,
            padding_x: 72.0,
            fallback_brand: "ASTROLOGY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub fonts: FontConfig,
    pub wheel: WheelConfig,
    pub card: CardConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    server: Option<ServerConfigFile>,
    fonts: Option<FontConfigFile>,
    wheel: Option<WheelConfigFile>,
    card: Option<CardConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerConfigFile {
    bind: Option<String>,
    upstream_url: Option<String>,
    upstream_timeout_ms: Option<u64>,
    cache_control: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontConfigFile {
    candidate_dirs: Option<Vec<PathBuf>>,
    text: Option<FontFile>,
    display: Option<FontFile>,
    symbols: Option<FontFile>,
    symbols_alt: Option<FontFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WheelConfigFile {
    size: Option<f64>,
    outer_radius: Option<f64>,
    zodiac_inner_radius: Option<f64>,
    sign_glyph_radius: Option<f64>,
    planet_orbit_radius: Option<f64>,
    cluster_step: Option<f64>,
    min_separation: Option<f64>,
    reference_radius: Option<f64>,
    aspect_radius: Option<f64>,
    marker_radius: Option<f64>,
    retrograde_ring_radius: Option<f64>,
    major_tick_length: Option<f64>,
    minor_tick_length: Option<f64>,
    raster_width: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    wheel_x: Option<f64>,
    wheel_y: Option<f64>,
    wheel_size: Option<f64>,
    padding_x: Option<f64>,
    fallback_brand: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(server) = parsed.server {
        if let Some(v) = server.bind {
            config.server.bind = v;
        }
        if let Some(v) = server.upstream_url {
            config.server.upstream_url = v;
        }
        if let Some(v) = server.upstream_timeout_ms {
            config.server.upstream_timeout_ms = v;
        }
        if let Some(v) = server.cache_control {
            config.server.cache_control = v;
        }
    }

    if let Some(fonts) = parsed.fonts {
        if let Some(v) = fonts.candidate_dirs {
            config.fonts.candidate_dirs = v;
        }
        if let Some(v) = fonts.text {
            config.fonts.text = v;
        }
        if let Some(v) = fonts.display {
            config.fonts.display = v;
        }
        if let Some(v) = fonts.symbols {
            config.fonts.symbols = v;
        }
        if let Some(v) = fonts.symbols_alt {
            config.fonts.symbols_alt = v;
        }
    }

    if let Some(wheel) = parsed.wheel {
        let w = &mut config.wheel;
        if let Some(v) = wheel.size {
            w.size = v;
        }
        if let Some(v) = wheel.outer_radius {
            w.outer_radius = v;
        }
        if let Some(v) = wheel.zodiac_inner_radius {
            w.zodiac_inner_radius = v;
        }
        if let Some(v) = wheel.sign_glyph_radius {
            w.sign_glyph_radius = v;
        }
        if let Some(v) = wheel.planet_orbit_radius {
            w.planet_orbit_radius = v;
        }
        if let Some(v) = wheel.cluster_step {
            w.cluster_step = v;
        }
        if let Some(v) = wheel.min_separation {
            w.min_separation = v;
        }
        if let Some(v) = wheel.reference_radius {
            w.reference_radius = v;
        }
        if let Some(v) = wheel.aspect_radius {
            w.aspect_radius = v;
        }
        if let Some(v) = wheel.marker_radius {
            w.marker_radius = v;
        }
        if let Some(v) = wheel.retrograde_ring_radius {
            w.retrograde_ring_radius = v;
        }
        if let Some(v) = wheel.major_tick_length {
            w.major_tick_length = v;
        }
        if let Some(v) = wheel.minor_tick_length {
            w.minor_tick_length = v;
        }
        if let Some(v) = wheel.raster_width {
            w.raster_width = v;
        }
    }

    if let Some(card) = parsed.card {
        let c = &mut config.card;
        if let Some(v) = card.width {
            c.width = v;
        }
        if let Some(v) = card.height {
            c.height = v;
        }
        if let Some(v) = card.wheel_x {
            c.wheel_x = v;
        }
        if let Some(v) = card.wheel_y {
            c.wheel_y = v;
        }
        if let Some(v) = card.wheel_size {
            c.wheel_size = v;
        }
        if let Some(v) = card.padding_x {
            c.padding_x = v;
        }
        if let Some(v) = card.fallback_brand {
            c.fallback_brand = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.server.cache_control, DEFAULT_CACHE_CONTROL);
        assert_eq!(config.wheel.min_separation, 12.0);
        assert_eq!((config.card.width, config.card.height), (1200, 630));
        assert_eq!(config.fonts.text.file, "Inter-Regular.ttf");
    }

    #[test]
    fn file_overrides_only_present_keys() {
        let config = parse_config(
            r#"{
                "server": {"upstreamUrl": "https://api.example.com", "upstreamTimeoutMs": 1500},
                "fonts": {"candidateDirs": ["/opt/fonts"], "display": {"file": "Lora.ttf", "family": "Lora"}},
                "wheel": {"clusterStep": 16},
                "card": {"fallbackBrand": "STARS"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.upstream_url, "https://api.example.com");
        assert_eq!(config.server.upstream_timeout_ms, 1500);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.fonts.candidate_dirs, vec![PathBuf::from("/opt/fonts")]);
        assert_eq!(config.fonts.display.family, "Lora");
        assert_eq!(config.fonts.text.family, "Inter");
        assert_eq!(config.wheel.cluster_step, 16.0);
        assert_eq!(config.wheel.planet_orbit_radius, 200.0);
        assert_eq!(config.card.fallback_brand, "STARS");
    }

    #[test]
    fn rejects_malformed_file() {
        assert!(parse_config("{ not json").is_err());
    }
}
