//! Helpers shared by the unit tests.

use crate::drawing::{Drawing, Outline, INK};
use crate::fonts::FontRepository;
use crate::math::{MathError, MathResolver};
use crate::units::Px;

/// A small svg font: 2000 units per em, four glyphs.
pub const SAMPLE_FONT: &str = r#"<?xml version="1.0" standalone="no"?>
<svg xmlns="http://www.w3.org/2000/svg">
  <defs>
    <font id="Sample" horiz-adv-x="600">
      <font-face font-family="Sample" units-per-em="2000" ascent="1600" descent="-400"/>
      <missing-glyph horiz-adv-x="500"/>
      <glyph unicode="a" horiz-adv-x="1000" d="M100 0L900 0L900 800L100 800Z"/>
      <glyph unicode="x" d="M0 0L600 800M600 0L0 800"/>
      <glyph unicode="&#x1D465;" horiz-adv-x="700" d="M0 0L700 0L700 900Z"/>
      <glyph unicode="ff" horiz-adv-x="1200" d="M0 0L1200 0L1200 1000Z"/>
    </font>
  </defs>
</svg>"#;

/// Parses the sample font.
pub fn sample_font() -> FontRepository {
    FontRepository::load(SAMPLE_FONT.as_bytes()).unwrap()
}

/// A math resolver that fails on every call.
pub struct Failing;

impl MathResolver for Failing {
    async fn resolve(&self, _tex: &str, _display: bool) -> Result<Drawing, MathError> {
        Err(MathError::Unavailable)
    }
}

/// A math resolver that answers with a box whose size depends on the source.
///
/// Each character of the source is 10 px wide; display math is 40 px tall and inline math 20 px
/// tall. Sources containing `fail` are rejected.
pub struct Boxes;

impl MathResolver for Boxes {
    async fn resolve(&self, tex: &str, display: bool) -> Result<Drawing, MathError> {
        if tex.contains("fail") {
            return Err(MathError::InvalidSvg(String::from("rejected")));
        }

        Ok(Drawing {
            width: Px(10.0 * tex.chars().count() as f64),
            height: Px(if display { 40.0 } else { 20.0 }),
            descent: Px(5.0),
            outlines: vec![Outline {
                path: tex.into(),
                transform: Default::default(),
                color: INK,
            }],
        })
    }
}
