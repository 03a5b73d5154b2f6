//! Vector drawings: sequences of outlines placed by affine transforms, together with the box
//! they are meant to occupy.

pub mod path;
pub mod svg;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::units::Px;

/// An affine transform, with the same coefficients as an svg `matrix(a b c d e f)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling.
    pub a: f64,
    /// Vertical skewing.
    pub b: f64,
    /// Horizontal skewing.
    pub c: f64,
    /// Vertical scaling.
    pub d: f64,
    /// Horizontal translation.
    pub e: f64,
    /// Vertical translation.
    pub f: f64,
}

impl Matrix {
    /// The transform that changes nothing.
    pub fn identity() -> Matrix {
        Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Creates a matrix from its coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Matrix {
        Matrix { a, b, c, d, e, f }
    }

    /// A translation.
    pub fn translate(tx: f64, ty: f64) -> Matrix {
        Matrix::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// A scaling.
    pub fn scale(sx: f64, sy: f64) -> Matrix {
        Matrix::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Composes two transforms: `other` is applied first, then `self`.
    ///
    /// This is what nesting `<g transform="self"><g transform="other">` means in svg.
    pub fn then(self, other: Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Transforms a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

impl Default for Matrix {
    fn default() -> Matrix {
        Matrix::identity()
    }
}

/// An opaque rgb colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    /// The red component.
    pub r: u8,
    /// The green component.
    pub g: u8,
    /// The blue component.
    pub b: u8,
}

/// The colour of the ink, a very dark blue.
pub const INK: Color = Color {
    r: 0x1a,
    g: 0x1a,
    b: 0x2e,
};

impl Color {
    /// Creates a colour from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Returns the components between 0 and 1, as pdf wants them.
    pub fn unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

impl Default for Color {
    fn default() -> Color {
        INK
    }
}

/// The error returned when a colour is not written `#rgb` or `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour \"{0}\", expected #rgb or #rrggbb")]
pub struct ColorError(pub String);

impl FromStr for Color {
    type Err = ColorError;

    /// Parses a hexadecimal colour.
    ///
    /// ```
    /// # use mathpro::drawing::Color;
    /// assert_eq!("#1a1a2e".parse(), Ok(Color::new(0x1a, 0x1a, 0x2e)));
    /// assert_eq!("#fff".parse(), Ok(Color::new(255, 255, 255)));
    /// assert!("blue".parse::<Color>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Color, ColorError> {
        let error = || ColorError(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(error)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error());
        }

        let component = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| error());

        match hex.len() {
            3 => {
                let mut parts = hex.chars().map(|c| component(&c.to_string().repeat(2)));
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(r), Some(g), Some(b)) => Ok(Color::new(r?, g?, b?)),
                    _ => Err(error()),
                }
            }
            6 => Ok(Color::new(
                component(&hex[0..2])?,
                component(&hex[2..4])?,
                component(&hex[4..6])?,
            )),
            _ => Err(error()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Visitor for the `Color` structure.
struct ColorVisitor;

impl<'a> Visitor<'a> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a colour such as \"#1a1a2e\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Color, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'a> Deserialize<'a> for Color {
    fn deserialize<D: Deserializer<'a>>(deserializer: D) -> Result<Color, D::Error> {
        deserializer.deserialize_str(ColorVisitor)
    }
}

/// An outline, described by svg path data, placed somewhere by a transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// The svg path data, shared with the glyph it comes from.
    pub path: Arc<str>,

    /// The transform from the path space to the drawing space.
    pub transform: Matrix,

    /// The fill colour.
    pub color: Color,
}

/// A vector drawing, ready to be placed on a page.
///
/// Coordinates in the drawing space grow rightwards and downwards from the top left corner of
/// the drawing box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    /// The width of the drawing box.
    pub width: Px,

    /// The height of the drawing box.
    pub height: Px,

    /// How far below the baseline the bottom of the box lies.
    pub descent: Px,

    /// The outlines of the drawing, in painting order.
    pub outlines: Vec<Outline>,
}

impl Drawing {
    /// Creates an empty drawing with no size.
    pub fn empty() -> Drawing {
        Drawing::default()
    }

    /// Returns true if nothing would be painted.
    pub fn is_blank(&self) -> bool {
        self.outlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Matrix};

    #[test]
    fn matrix_composition() {
        let m = Matrix::translate(10.0, 20.0).then(Matrix::scale(2.0, -2.0));
        assert_eq!(m.apply(1.0, 1.0), (12.0, 18.0));

        let n = Matrix::scale(2.0, 2.0).then(Matrix::translate(1.0, 1.0));
        assert_eq!(n.apply(0.0, 0.0), (2.0, 2.0));
    }

    #[test]
    fn identity_is_neutral() {
        let m = Matrix::new(1.5, 0.5, -0.5, 2.0, 3.0, 4.0);
        assert_eq!(Matrix::identity().then(m), m);
        assert_eq!(m.then(Matrix::identity()), m);
    }

    #[test]
    fn color_display_round_trip() {
        let color: Color = "#C5D3E8".parse().unwrap();
        assert_eq!(color.to_string(), "#c5d3e8");
        assert_eq!(Color::new(255, 0, 0).unit(), (1.0, 0.0, 0.0));
    }

    #[test]
    fn invalid_colors() {
        for input in &["", "#", "#12", "#12345g", "123456", "#1234567"] {
            assert!(input.parse::<Color>().is_err(), "{:?} should not parse", input);
        }
    }
}
