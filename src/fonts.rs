//! Font discovery and the process-lifetime font cache.
//!
//! The first candidate directory holding the body-text font becomes the font
//! root; all four faces are read from there once. A failed probe is cached
//! too: it means a deployment defect, so every later request sees the same
//! error instead of re-probing.

use crate::config::{FontConfig, FontFile};
use crate::style::{SymbolFont, required_glyphs};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttf_parser::Face;
use usvg::fontdb::Database;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font root not found: no candidate directory contains {probe} (probed: {})", ProbedDirs(.probed))]
    NotFound { probe: String, probed: Vec<PathBuf> },
    #[error("failed to read font file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font file {} is not a usable font: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ttf_parser::FaceParsingError,
    },
}

struct ProbedDirs<'a>(&'a [PathBuf]);

impl fmt::Display for ProbedDirs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<none configured>");
        }
        for (idx, dir) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", dir.display())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LoadedFont {
    pub family: String,
    pub path: PathBuf,
    pub data: Arc<Vec<u8>>,
}

impl LoadedFont {
    fn read(root: &Path, spec: &FontFile) -> Result<Self, FontError> {
        let path = root.join(&spec.file);
        let data = std::fs::read(&path).map_err(|source| FontError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            family: spec.family.clone(),
            path,
            data: Arc::new(data),
        })
    }
}

/// The four faces plus one font database per rendering pass.
pub struct FontSet {
    pub root: PathBuf,
    pub text: LoadedFont,
    pub display: LoadedFont,
    pub symbols: LoadedFont,
    pub symbols_alt: LoadedFont,
    wheel_db: Arc<Database>,
    card_db: Arc<Database>,
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet")
            .field("root", &self.root)
            .field("text", &self.text.path)
            .field("display", &self.display.path)
            .field("symbols", &self.symbols.path)
            .field("symbols_alt", &self.symbols_alt.path)
            .finish()
    }
}

impl FontSet {
    /// Symbol faces only: sign and planet glyphs.
    pub fn wheel_database(&self) -> Arc<Database> {
        Arc::clone(&self.wheel_db)
    }

    /// Text and display faces for the title card.
    pub fn card_database(&self) -> Arc<Database> {
        Arc::clone(&self.card_db)
    }
}

/// First directory in probe order that contains `probe_file`.
pub fn find_font_root(candidates: &[PathBuf], probe_file: &str) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.join(probe_file).is_file())
        .cloned()
}

pub fn load_font_set(config: &FontConfig) -> Result<FontSet, FontError> {
    let Some(root) = find_font_root(&config.candidate_dirs, &config.text.file) else {
        return Err(FontError::NotFound {
            probe: config.text.file.clone(),
            probed: config.candidate_dirs.clone(),
        });
    };
    tracing::info!(root = %root.display(), "adopted font root");

    let text = LoadedFont::read(&root, &config.text)?;
    let display = LoadedFont::read(&root, &config.display)?;
    let symbols = LoadedFont::read(&root, &config.symbols)?;
    let symbols_alt = LoadedFont::read(&root, &config.symbols_alt)?;

    audit_face(&text, &[])?;
    audit_face(&display, &[])?;
    audit_face(&symbols, &required_glyphs(SymbolFont::Primary))?;
    audit_face(&symbols_alt, &required_glyphs(SymbolFont::Alternate))?;

    let wheel_db = build_database(&[&symbols, &symbols_alt], &symbols.family, &symbols_alt.family);
    let card_db = build_database(&[&text, &display], &text.family, &display.family);

    Ok(FontSet {
        root,
        text,
        display,
        symbols,
        symbols_alt,
        wheel_db: Arc::new(wheel_db),
        card_db: Arc::new(card_db),
    })
}

fn build_database(fonts: &[&LoadedFont], sans: &str, serif: &str) -> Database {
    let mut db = Database::new();
    for font in fonts {
        db.load_font_data(font.data.as_ref().clone());
    }
    db.set_sans_serif_family(sans);
    db.set_serif_family(serif);
    db
}

/// A face that does not parse is fatal. An unexpected family name or missing
/// wheel glyphs only warn.
fn audit_face(font: &LoadedFont, glyphs: &[char]) -> Result<(), FontError> {
    let face = Face::parse(&font.data, 0).map_err(|source| FontError::Parse {
        path: font.path.clone(),
        source,
    })?;

    let family = face
        .names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string());
    if let Some(family) = family
        && family != font.family
    {
        tracing::warn!(
            path = %font.path.display(),
            configured = %font.family,
            actual = %family,
            "font family name differs from configuration"
        );
    }

    let missing: String = glyphs
        .iter()
        .copied()
        .filter(|ch| face.glyph_index(*ch).is_none())
        .collect();
    if !missing.is_empty() {
        tracing::warn!(path = %font.path.display(), %missing, "font is missing wheel glyphs");
    }
    Ok(())
}

pub type SharedFontResult = Result<Arc<FontSet>, Arc<FontError>>;

/// Lazily probed, process-lifetime font cache. Concurrent first use runs the
/// probe once; every caller then observes the same result.
pub struct FontCache {
    config: FontConfig,
    cell: OnceCell<SharedFontResult>,
}

impl FontCache {
    pub fn new(config: FontConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> SharedFontResult {
        self.cell
            .get_or_init(|| match load_font_set(&self.config) {
                Ok(set) => Ok(Arc::new(set)),
                Err(err) => {
                    tracing::error!(error = %err, "font initialization failed");
                    Err(Arc::new(err))
                }
            })
            .clone()
    }
}
