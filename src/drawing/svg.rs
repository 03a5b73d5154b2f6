//! Import of the svg documents produced by the math renderer.
//!
//! Only the subset of svg that TeX renderers emit is understood: groups, paths, rectangles and
//! `use` references, placed by `translate`, `scale` and `matrix` transforms. Elements carrying a
//! `data-c` attribute name the code point they draw; when the glyph font knows that code point,
//! its own outline replaces the renderer's so that formulas share the handwriting of the text.

use std::collections::HashMap;
use std::sync::Arc;

use crate::drawing::{Color, Drawing, Matrix, Outline};
use crate::fonts::FontRepository;
use crate::units::Px;

/// How many viewbox units make an em in the output of TeX renderers.
pub const UNITS_PER_EM: f64 = 1000.0;

/// How deep `use` references may be nested before they are ignored.
const MAX_USE_DEPTH: usize = 8;

/// The read-only state shared by the walk through the svg tree.
struct Walker<'a, 'input> {
    ids: HashMap<&'a str, roxmltree::Node<'a, 'input>>,
    color: Color,
    font: Option<&'a FontRepository>,
    outlines: Vec<Outline>,
}

/// Parses an svg document into a drawing.
///
/// The drawing is scaled so that an em of the renderer measures `size` pixels. The bottom of the
/// viewbox is considered to lie `descent` below the baseline, the baseline being the `y = 0` line
/// of the viewbox.
pub fn import(
    svg: &str,
    size: Px,
    color: Color,
    font: Option<&FontRepository>,
) -> Result<Drawing, roxmltree::Error> {
    let doc = roxmltree::Document::parse(svg)?;
    let root = doc.root_element();

    let (min_x, min_y, width, height) = match parse_viewbox(root.attribute("viewBox")) {
        Some(view_box) => view_box,
        None => {
            debug!("svg without a viewBox, nothing to draw");
            return Ok(Drawing::empty());
        }
    };

    let scale = size.0 / UNITS_PER_EM;
    let base = Matrix::scale(scale, scale).then(Matrix::translate(-min_x, -min_y));

    let ids = doc
        .descendants()
        .filter(|n| n.is_element())
        .filter_map(|n| n.attribute("id").map(|id| (id, n)))
        .collect();

    let mut walker = Walker {
        ids,
        color,
        font,
        outlines: vec![],
    };

    for child in root.children().filter(|n| n.is_element()) {
        walker.visit(child, base, 0);
    }

    Ok(Drawing {
        width: Px(width * scale).ceil(),
        height: Px(height * scale),
        descent: Px(((height + min_y) * scale).max(0.0)),
        outlines: walker.outlines,
    })
}

impl<'a, 'input> Walker<'a, 'input> {
    fn visit(&mut self, node: roxmltree::Node<'a, 'input>, ctm: Matrix, depth: usize) {
        let ctm = match node.attribute("transform") {
            Some(transform) => ctm.then(parse_transform(transform)),
            None => ctm,
        };

        match node.tag_name().name() {
            "defs" | "title" | "desc" | "style" => (),

            "g" | "svg" => {
                for child in node.children().filter(|n| n.is_element()) {
                    self.visit(child, ctm, depth);
                }
            }

            "use" => {
                if let Some(outline) = self.glyph_outline(node) {
                    self.push(outline, ctm);
                    return;
                }

                if depth >= MAX_USE_DEPTH {
                    warn!("svg references nested too deeply, ignoring");
                    return;
                }

                let target = href(node).and_then(|id| self.ids.get(id).copied());
                if let Some(target) = target {
                    let x = number(node.attribute("x")).unwrap_or(0.0);
                    let y = number(node.attribute("y")).unwrap_or(0.0);
                    self.visit(target, ctm.then(Matrix::translate(x, y)), depth + 1);
                }
            }

            "path" => {
                if let Some(outline) = self.glyph_outline(node) {
                    self.push(outline, ctm);
                } else if let Some(d) = node.attribute("d") {
                    self.push((Arc::from(d), Matrix::identity()), ctm);
                }
            }

            "rect" => {
                if let Some(d) = rect_to_path(node) {
                    self.push((Arc::from(d.as_str()), Matrix::identity()), ctm);
                }
            }

            other => trace!("skipping svg element <{}>", other),
        }
    }

    /// Returns the font outline to use instead of the element, if there is one.
    fn glyph_outline(&self, node: roxmltree::Node) -> Option<(Arc<str>, Matrix)> {
        let font = self.font?;
        let code = node.attribute("data-c")?;
        let glyph = font.by_code(code)?;
        if glyph.outline.is_empty() {
            return None;
        }

        let scale = UNITS_PER_EM / font.metrics().units_per_em;
        Some((glyph.outline.clone(), Matrix::scale(scale, scale)))
    }

    fn push(&mut self, (path, local): (Arc<str>, Matrix), ctm: Matrix) {
        self.outlines.push(Outline {
            path,
            transform: ctm.then(local),
            color: self.color,
        });
    }
}

fn href<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.attribute(("http://www.w3.org/1999/xlink", "href"))
        .or_else(|| node.attribute("href"))
        .and_then(|href| href.strip_prefix('#'))
}

fn number(value: Option<&str>) -> Option<f64> {
    value?.trim().parse().ok()
}

fn number_list(input: &str) -> Vec<f64> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn parse_viewbox(view_box: Option<&str>) -> Option<(f64, f64, f64, f64)> {
    match number_list(view_box?).as_slice() {
        &[min_x, min_y, width, height] if width > 0.0 && height > 0.0 => {
            Some((min_x, min_y, width, height))
        }
        _ => None,
    }
}

/// Parses the value of a `transform` attribute.
///
/// Unknown functions are ignored.
pub fn parse_transform(input: &str) -> Matrix {
    let mut out = Matrix::identity();
    let mut s = input.trim();

    while let Some(open) = s.find('(') {
        let name = s[..open].trim().trim_start_matches(',').trim();
        let close = match s[open + 1..].find(')') {
            Some(close) => open + 1 + close,
            None => break,
        };
        let args = number_list(&s[open + 1..close]);

        let m = match (name, args.as_slice()) {
            ("translate", &[tx]) => Matrix::translate(tx, 0.0),
            ("translate", &[tx, ty, ..]) => Matrix::translate(tx, ty),
            ("scale", &[sx]) => Matrix::scale(sx, sx),
            ("scale", &[sx, sy, ..]) => Matrix::scale(sx, sy),
            ("matrix", &[a, b, c, d, e, f, ..]) => Matrix::new(a, b, c, d, e, f),
            (other, _) => {
                trace!("ignoring transform {}", other);
                Matrix::identity()
            }
        };

        out = out.then(m);
        s = s[close + 1..].trim_start();
    }

    out
}

fn rect_to_path(node: roxmltree::Node) -> Option<String> {
    let x = number(node.attribute("x")).unwrap_or(0.0);
    let y = number(node.attribute("y")).unwrap_or(0.0);
    let w = number(node.attribute("width"))?;
    let h = number(node.attribute("height"))?;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some(format!("M{} {}H{}V{}H{}Z", x, y, x + w, y + h, x))
}

#[cfg(test)]
mod tests {
    use super::{import, parse_transform};
    use crate::drawing::{Matrix, INK};
    use crate::testing::sample_font;
    use crate::units::Px;

    const FORMULA: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 -750 2000 1000">
        <defs><path id="MJX-X" d="M0 0L10 0L10 10Z"/></defs>
        <g stroke="currentColor" fill="currentColor" transform="scale(1,-1)">
            <g data-mml-node="math">
                <use data-c="78" xlink:href="#MJX-X"/>
                <use data-c="2B" xlink:href="#MJX-X" x="500"/>
                <rect width="100" height="60" x="600" y="220"/>
            </g>
        </g>
    </svg>"##;

    #[test]
    fn viewbox_gives_the_box() {
        let drawing = import(FORMULA, Px(500.0), INK, None).unwrap();
        assert_eq!(drawing.width, Px(1000.0));
        assert_eq!(drawing.height, Px(500.0));
        assert_eq!(drawing.descent, Px(125.0));
        assert_eq!(drawing.outlines.len(), 3);
    }

    #[test]
    fn use_references_are_placed() {
        let drawing = import(FORMULA, Px(1000.0), INK, None).unwrap();
        let second = &drawing.outlines[1];
        assert_eq!(&*second.path, "M0 0L10 0L10 10Z");
        // Flipped around the baseline, which lies 750 units below the top.
        assert_eq!(second.transform.apply(0.0, 0.0), (500.0, 750.0));
        assert_eq!(second.transform.apply(0.0, 10.0), (500.0, 740.0));
    }

    #[test]
    fn font_glyphs_replace_known_codes() {
        let font = sample_font();
        let drawing = import(FORMULA, Px(1000.0), INK, Some(&font)).unwrap();
        let x = font.by_code("78").unwrap();
        assert_eq!(drawing.outlines[0].path, x.outline);
        // The font has 2000 units per em, so its outlines are halved.
        assert_eq!(drawing.outlines[0].transform.apply(100.0, 0.0), (50.0, 750.0));
        // "+" is not in the font, the renderer's outline is kept.
        assert_eq!(&*drawing.outlines[1].path, "M0 0L10 0L10 10Z");
    }

    #[test]
    fn invalid_documents() {
        assert!(import("<svg", Px(22.0), INK, None).is_err());
        let drawing = import("<svg><path d='M0 0'/></svg>", Px(22.0), INK, None).unwrap();
        assert!(drawing.is_blank());
    }

    #[test]
    fn transforms() {
        assert_eq!(parse_transform("translate(5)"), Matrix::translate(5.0, 0.0));
        assert_eq!(parse_transform("scale(2)"), Matrix::scale(2.0, 2.0));
        let m = parse_transform("translate(10, 20) scale(2,-2)");
        assert_eq!(m.apply(1.0, 1.0), (12.0, 18.0));
        assert_eq!(parse_transform("rotate(45)"), Matrix::identity());
        assert_eq!(
            parse_transform("matrix(1 0 0 1 3 4)"),
            Matrix::translate(3.0, 4.0)
        );
    }
}
