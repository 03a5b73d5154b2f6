//! This module contains everything that helps us dealing with fonts.
//!
//! Fonts are SVG font documents: a `font` element holding one `glyph` element per character,
//! each with its outline as svg path data and its horizontal advance in font units.

pub mod loader;
pub mod raster;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// The family used when the font does not name itself.
pub const DEFAULT_FAMILY: &str = "QEKunjarScript";

/// The advance used when neither the glyph nor the font gives one.
pub const DEFAULT_ADVANCE: f64 = 500.0;

/// An error that occured while getting a font.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontLoadError {
    /// The font resource could not be fetched.
    #[error("{0}")]
    FetchFailed(String),

    /// The font resource is not a well-formed svg document.
    #[error("malformed font document: {0}")]
    MalformedDocument(String),

    /// The document contains no `font` element.
    #[error("no <font> element found")]
    MissingFontDeclaration,
}

/// A character's outline and advance.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// The svg path data of the outline, in font units with the y axis pointing up.
    pub outline: Arc<str>,

    /// How far the cursor moves after drawing the glyph, in font units.
    pub advance: f64,
}

/// The global metrics of a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// How many font units make an em.
    pub units_per_em: f64,

    /// The height of the ascenders above the baseline.
    pub ascent: f64,

    /// The depth of the descenders, usually negative.
    pub descent: f64,

    /// The name of the font family.
    pub family: String,
}

impl Default for FontMetrics {
    fn default() -> FontMetrics {
        FontMetrics {
            units_per_em: 1000.0,
            ascent: 800.0,
            descent: -200.0,
            family: String::from(DEFAULT_FAMILY),
        }
    }
}

/// The glyphs of a loaded font.
///
/// Glyphs are reachable by the literal character they draw, and also, when they draw a single
/// code point, by its uppercase hexadecimal value, which is how TeX renderers label their paths.
#[derive(Debug, Clone)]
pub struct FontRepository {
    /// Glyphs by their `unicode` attribute.
    glyphs: HashMap<String, Glyph>,

    /// Glyphs by their hexadecimal code point.
    codes: HashMap<String, Glyph>,

    /// The metrics of the font.
    metrics: FontMetrics,

    /// The advance of glyphs that don't specify theirs.
    default_advance: f64,
}

/// Parses a positive number, or returns the default.
fn positive_or(value: Option<&str>, default: f64) -> f64 {
    value
        .and_then(|v| f64::from_str(v.trim()).ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}

/// Parses a finite number, or returns the default.
fn number_or(value: Option<&str>, default: f64) -> f64 {
    value
        .and_then(|v| f64::from_str(v.trim()).ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

impl FontRepository {
    /// Parses an svg font document.
    pub fn load(bytes: &[u8]) -> Result<FontRepository, FontLoadError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| FontLoadError::MalformedDocument(e.to_string()))?;

        let doc = roxmltree::Document::parse(text)
            .map_err(|e| FontLoadError::MalformedDocument(e.to_string()))?;

        let element = |name: &str| {
            doc.descendants()
                .find(|n| n.is_element() && n.tag_name().name() == name)
        };

        let font = element("font").ok_or(FontLoadError::MissingFontDeclaration)?;
        let default_advance = positive_or(font.attribute("horiz-adv-x"), DEFAULT_ADVANCE);

        let defaults = FontMetrics::default();
        let metrics = match element("font-face") {
            Some(face) => FontMetrics {
                units_per_em: positive_or(face.attribute("units-per-em"), defaults.units_per_em),
                ascent: number_or(face.attribute("ascent"), defaults.ascent),
                descent: number_or(face.attribute("descent"), defaults.descent),
                family: face
                    .attribute("font-family")
                    .filter(|f| !f.is_empty())
                    .map(String::from)
                    .unwrap_or(defaults.family),
            },
            None => defaults,
        };

        let mut glyphs = HashMap::new();
        let mut codes = HashMap::new();

        let glyph_elements = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "glyph");

        for node in glyph_elements {
            let key = match node.attribute("unicode") {
                Some(key) if !key.is_empty() => key,
                _ => continue,
            };

            let glyph = Glyph {
                outline: Arc::from(node.attribute("d").unwrap_or("")),
                advance: positive_or(node.attribute("horiz-adv-x"), default_advance),
            };

            let mut chars = key.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                codes.insert(format!("{:X}", c as u32), glyph.clone());
            }

            glyphs.insert(key.to_owned(), glyph);
        }

        info!("Parsed {} glyphs", glyphs.len());

        Ok(FontRepository {
            glyphs,
            codes,
            metrics,
            default_advance,
        })
    }

    /// Returns the glyph that draws a character.
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        let mut buffer = [0; 4];
        self.glyphs.get(&*c.encode_utf8(&mut buffer))
    }

    /// Returns the glyph that draws a code point, given in uppercase hexadecimal.
    pub fn by_code(&self, code: &str) -> Option<&Glyph> {
        self.codes.get(code)
    }

    /// Returns the metrics of the font.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Returns the advance of glyphs that don't have one.
    pub fn default_advance(&self) -> f64 {
        self.default_advance
    }

    /// Returns the number of glyphs of the font.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if the font has no glyph.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FontLoadError, FontRepository, DEFAULT_FAMILY};
    use crate::testing::{sample_font, SAMPLE_FONT};

    #[test]
    fn metrics_and_glyphs() {
        let font = sample_font();
        assert_eq!(font.metrics().units_per_em, 2000.0);
        assert_eq!(font.metrics().ascent, 1600.0);
        assert_eq!(font.metrics().family, "Sample");
        assert_eq!(font.default_advance(), 600.0);
        assert_eq!(font.len(), 4);

        let a = font.glyph('a').unwrap();
        assert_eq!(a.advance, 1000.0);
        // No advance on the glyph itself, the font one is used.
        assert_eq!(font.glyph('x').unwrap().advance, 600.0);
        assert!(font.glyph('z').is_none());
    }

    #[test]
    fn hex_keys() {
        let font = sample_font();
        assert_eq!(font.by_code("61"), font.glyph('a'));
        assert!(font.by_code("1D465").is_some());
        // Ligatures have no code point.
        assert!(font.by_code("6666").is_none());
        assert!(font.by_code("1d465").is_none());
    }

    #[test]
    fn defaults() {
        let font = FontRepository::load(
            br#"<svg><font><glyph unicode="a" d="M0 0"/><glyph d="M1 1"/></font></svg>"#,
        )
        .unwrap();
        assert_eq!(font.metrics().units_per_em, 1000.0);
        assert_eq!(font.metrics().ascent, 800.0);
        assert_eq!(font.metrics().descent, -200.0);
        assert_eq!(font.metrics().family, DEFAULT_FAMILY);
        assert_eq!(font.glyph('a').unwrap().advance, 500.0);
        assert_eq!(font.len(), 1);
    }

    #[test]
    fn errors() {
        assert!(matches!(
            FontRepository::load(b"<svg><font>"),
            Err(FontLoadError::MalformedDocument(_))
        ));
        assert!(matches!(
            FontRepository::load(&[0xff, 0xfe, 0x00]),
            Err(FontLoadError::MalformedDocument(_))
        ));
        assert_eq!(
            FontRepository::load(b"<svg><g/></svg>").unwrap_err(),
            FontLoadError::MissingFontDeclaration
        );
        assert!(FontRepository::load(SAMPLE_FONT.as_bytes()).is_ok());
    }
}
