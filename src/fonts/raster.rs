//! Turns strings into vector drawings using the outlines of a font.

use crate::drawing::{Color, Drawing, Matrix, Outline};
use crate::fonts::{FontRepository, DEFAULT_ADVANCE};
use crate::units::Px;

/// Extra room added to the right of the drawn text.
const RIGHT_PADDING: f64 = 4.0;

/// How much taller than the point size the drawing box is, to keep ascenders inside.
const BOX_RATIO: f64 = 1.3;

/// How far below the baseline the box goes, relative to the point size.
const DESCENT_RATIO: f64 = 0.25;

/// Draws a string with the glyphs of a font.
///
/// The drawing is empty if there is no font or nothing but whitespace to draw. Characters the
/// font doesn't know are not drawn but still move the cursor.
pub fn render(text: &str, size: f64, color: Color, font: Option<&FontRepository>) -> Drawing {
    let font = match font {
        Some(font) if !text.trim().is_empty() => font,
        _ => return Drawing::empty(),
    };

    let metrics = font.metrics();
    let scale = size / metrics.units_per_em;
    let mut x = 0.0;
    let mut outlines = vec![];

    for c in text.chars() {
        match font.glyph(c) {
            Some(glyph) => {
                if !glyph.outline.is_empty() {
                    let transform = Matrix::translate(x * scale, metrics.ascent * scale)
                        .then(Matrix::scale(scale, -scale));
                    outlines.push(Outline {
                        path: glyph.outline.clone(),
                        transform,
                        color,
                    });
                }
                x += glyph.advance;
            }
            None => x += DEFAULT_ADVANCE,
        }
    }

    Drawing {
        width: Px((x * scale + RIGHT_PADDING).ceil()),
        height: Px((size * BOX_RATIO).ceil()),
        descent: Px(size * DESCENT_RATIO),
        outlines,
    }
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::drawing::INK;
    use crate::testing::sample_font;
    use crate::units::Px;

    #[test]
    fn geometry() {
        let font = sample_font();
        // 2000 units per em at 500 px: scale is 0.25.
        let drawing = render("ax", 500.0, INK, Some(&font));
        assert_eq!(drawing.outlines.len(), 2);
        assert_eq!(drawing.width, Px(404.0));
        assert_eq!(drawing.height, Px(650.0));
        assert_eq!(drawing.descent, Px(125.0));

        // The second glyph starts after the advance of the first one, on the ascent line.
        assert_eq!(drawing.outlines[1].transform.apply(0.0, 0.0), (250.0, 400.0));
        // The y axis is flipped.
        assert_eq!(drawing.outlines[1].transform.apply(0.0, 100.0), (250.0, 375.0));
    }

    #[test]
    fn missing_glyphs_advance() {
        let font = sample_font();
        let drawing = render("a?a", 500.0, INK, Some(&font));
        assert_eq!(drawing.outlines.len(), 2);
        assert_eq!(drawing.width, Px(629.0));
        assert_eq!(drawing.outlines[1].transform.apply(0.0, 0.0).0, 375.0);
    }

    #[test]
    fn astral_code_points() {
        let font = sample_font();
        let drawing = render("\u{1D465}", 500.0, INK, Some(&font));
        assert_eq!(drawing.outlines.len(), 1);
        assert_eq!(drawing.width, Px(179.0));
    }

    #[test]
    fn nothing_to_draw() {
        let font = sample_font();
        assert_eq!(render("   ", 22.0, INK, Some(&font)).width, Px(0.0));
        assert!(render("", 22.0, INK, Some(&font)).is_blank());
        assert!(render("hello", 22.0, INK, None).is_blank());
        assert_eq!(render("hello", 22.0, INK, None).width, Px(0.0));
    }
}
