use crate::ephemeris::ZodiacSign;
use crate::geometry::Point;
use crate::scene::Scene;
use crate::style::{AspectStyle, BodyGlyph};

/// Where one body's marker ends up on the wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetPlacement {
    pub name: String,
    /// True ecliptic longitude, normalised to `[0, 360)`.
    pub longitude: f64,
    /// Number of earlier, angularly-near bodies; selects the stagger ring.
    pub depth: usize,
    pub radius: f64,
    pub point: Point,
    pub sign: ZodiacSign,
    pub retrograde: bool,
    pub glyph: BodyGlyph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AspectLine {
    pub body1: String,
    pub body2: String,
    pub from: Point,
    pub to: Point,
    pub style: AspectStyle,
}

#[derive(Debug, Clone)]
pub struct WheelLayout {
    pub scene: Scene,
    pub placements: Vec<PlanetPlacement>,
    pub aspects: Vec<AspectLine>,
}

impl WheelLayout {
    pub fn to_svg(&self) -> String {
        self.scene.to_svg()
    }
}
