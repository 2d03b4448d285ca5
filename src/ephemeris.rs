use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The twelve signs in canonical order, starting at 0° ecliptic longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sign containing an absolute ecliptic longitude.
    pub fn from_longitude(longitude: f64) -> Self {
        let idx = (longitude.rem_euclid(360.0) / 30.0).floor() as usize;
        Self::ALL[idx.min(11)]
    }

    /// Longitude at which this sign starts.
    pub fn start_longitude(self) -> f64 {
        self.index() as f64 * 30.0
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ZodiacSign {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ZodiacSign::ALL
            .into_iter()
            .find(|sign| sign.name().eq_ignore_ascii_case(&lower))
            .ok_or(())
    }
}

/// Aspect kinds the upstream service reports. Unknown kinds are kept verbatim
/// so newer payloads still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AspectType {
    Conjunction,
    Opposition,
    Square,
    Trine,
    Sextile,
    Quincunx,
    Semisquare,
    Sesquiquadrate,
    Other(String),
}

impl AspectType {
    pub fn as_str(&self) -> &str {
        match self {
            AspectType::Conjunction => "conjunction",
            AspectType::Opposition => "opposition",
            AspectType::Square => "square",
            AspectType::Trine => "trine",
            AspectType::Sextile => "sextile",
            AspectType::Quincunx => "quincunx",
            AspectType::Semisquare => "semisquare",
            AspectType::Sesquiquadrate => "sesquiquadrate",
            AspectType::Other(other) => other.as_str(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "conjunction" => AspectType::Conjunction,
            "opposition" => AspectType::Opposition,
            "square" => AspectType::Square,
            "trine" => AspectType::Trine,
            "sextile" => AspectType::Sextile,
            "quincunx" | "inconjunct" => AspectType::Quincunx,
            "semisquare" => AspectType::Semisquare,
            "sesquiquadrate" | "sesquisquare" => AspectType::Sesquiquadrate,
            _ => AspectType::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for AspectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AspectType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AspectType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AspectType::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelestialPosition {
    #[serde(default)]
    pub name: String,
    /// Upstream sign label; `None` when absent or not one of the twelve.
    #[serde(default, deserialize_with = "lenient_sign")]
    pub sign: Option<ZodiacSign>,
    /// `NaN` when absent or not a number; such bodies are dropped on resolve.
    #[serde(default = "unknown_number", deserialize_with = "lenient_number")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub degree: f64,
    #[serde(default)]
    pub retrograde: bool,
}

impl CelestialPosition {
    pub fn new(name: &str, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            sign: Some(ZodiacSign::from_longitude(longitude)),
            longitude,
            degree: longitude.rem_euclid(30.0),
            retrograde: false,
        }
    }

    pub fn retrograde(mut self) -> Self {
        self.retrograde = true;
        self
    }

    /// Sign used for styling: the reported sign, else the one implied by longitude.
    pub fn effective_sign(&self) -> ZodiacSign {
        self.sign
            .unwrap_or_else(|| ZodiacSign::from_longitude(self.longitude))
    }
}

fn lenient_sign<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ZodiacSign>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

fn unknown_number() -> f64 {
    f64::NAN
}

/// Numbers only; `null`, strings and other shapes become `NaN`.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_f64().unwrap_or(f64::NAN))
}

/// Decodes each entry on its own so one malformed body does not take the
/// whole chart down with it.
fn lenient_positions<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, CelestialPosition>, D::Error> {
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut positions = BTreeMap::new();
    for (key, value) in raw {
        match CelestialPosition::deserialize(value) {
            Ok(position) => {
                positions.insert(key, position);
            }
            Err(err) => tracing::debug!(body = %key, %err, "dropping malformed position"),
        }
    }
    Ok(positions)
}

fn lenient_aspects<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<AspectRelation>, D::Error> {
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match AspectRelation::deserialize(value) {
            Ok(aspect) => Some(aspect),
            Err(err) => {
                tracing::debug!(index = idx, %err, "dropping malformed aspect");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectRelation {
    pub body1: String,
    pub body2: String,
    #[serde(alias = "type", alias = "aspect")]
    pub aspect_type: AspectType,
    /// `NaN` when absent or not a number, which styles at the opacity floor.
    #[serde(default = "unknown_number", alias = "orb", deserialize_with = "lenient_number")]
    pub orb_degrees: f64,
    #[serde(default)]
    pub applying: bool,
}

impl AspectRelation {
    pub fn new(body1: &str, body2: &str, aspect_type: AspectType, orb_degrees: f64) -> Self {
        Self {
            body1: body1.to_string(),
            body2: body2.to_string(),
            aspect_type,
            orb_degrees,
            applying: false,
        }
    }

    pub fn applying(mut self) -> Self {
        self.applying = true;
        self
    }
}

/// Positions keyed by body name plus the ordered aspect list for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSnapshot {
    #[serde(default, deserialize_with = "lenient_positions")]
    pub positions: BTreeMap<String, CelestialPosition>,
    #[serde(default, deserialize_with = "lenient_aspects")]
    pub aspects: Vec<AspectRelation>,
}

impl EphemerisSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.aspects.is_empty()
    }

    pub fn with_position(mut self, position: CelestialPosition) -> Self {
        self.positions.insert(position.name.clone(), position);
        self
    }

    pub fn with_aspect(mut self, aspect: AspectRelation) -> Self {
        self.aspects.push(aspect);
        self
    }

    /// Looks a body up by key, falling back to a case-insensitive match.
    pub fn position(&self, name: &str) -> Option<&CelestialPosition> {
        if let Some(position) = self.positions.get(name) {
            return Some(position);
        }
        self.positions
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, position)| position)
    }

    /// Bodies with a usable longitude, in map order. Missing `name` fields
    /// inherit the map key.
    pub fn resolved_positions(&self) -> Vec<CelestialPosition> {
        let mut out = Vec::with_capacity(self.positions.len());
        for (key, position) in &self.positions {
            if !position.longitude.is_finite() {
                tracing::debug!(body = %key, "dropping body with non-finite longitude");
                continue;
            }
            let mut resolved = position.clone();
            if resolved.name.trim().is_empty() {
                resolved.name = key.clone();
            }
            resolved.longitude = resolved.longitude.rem_euclid(360.0);
            out.push(resolved);
        }
        out
    }

    pub fn parse_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}
