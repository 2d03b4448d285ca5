pub mod card;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ephemeris;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod render;
pub mod scene;
pub mod server;
pub mod style;
pub mod theme;
pub mod upstream;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use ephemeris::{AspectRelation, AspectType, CelestialPosition, EphemerisSnapshot, ZodiacSign};
pub use layout::{WheelLayout, compute_wheel};
pub use render::{RenderError, render_preview};
