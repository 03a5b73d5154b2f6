//! This module writes laid out notebooks into pdf documents.

pub mod configuration;
pub mod session;
pub mod store;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Pt, Rgb,
};

use crate::drawing::path::{flatten, parse_path_data, split_counters, Polygon};
use crate::drawing::{Color, Drawing, Matrix};
use crate::layout::constants::{
    BASELINE_OFFSET, CONTENT_PADDING_TOP, DISPLAY_MATH_PADDING, INLINE_MATH_MARGIN,
};
use crate::layout::pages::{Fragment, Page};
use crate::layout::{BlockKind, Grid, Layout, TokenKind};
use crate::units::Px;
use crate::{Error, Result};

/// The document shown when there is nothing else to show.
pub const DEFAULT_DOCUMENT: &str = include_str!("../../assets/default.txt");

/// The colour of the ruled lines.
const RULING: Color = Color::new(220, 229, 241);

/// The colour of the vertical line at the left margin.
const MARGIN_RULE: Color = Color::new(242, 203, 203);

/// The colour of the line under top level headings.
const UNDERLINE: Color = Color::new(230, 230, 230);

/// The colour of the paper, used to punch the counters of glyphs out.
const PAPER: Color = Color::new(255, 255, 255);

/// The colour of page numbers.
const PAGE_NUMBER: Color = Color::new(0x6b, 0x72, 0x80);

/// The size of page numbers, in pt.
const PAGE_NUMBER_SIZE: f64 = 10.5;

/// Where page numbers end, from the right and the bottom of the page.
const PAGE_NUMBER_OFFSET: (Px, Px) = (Px(24.0), Px(16.0));

fn pdf_color(color: Color) -> PdfColor {
    let (r, g, b) = color.unit();
    PdfColor::Rgb(Rgb::new(r, g, b, None))
}

fn pdf_error(error: printpdf::Error) -> Error {
    Error::PrintpdfError(format!("{:?}", error))
}

/// This struct contains the pdf document.
pub struct Document {
    /// The inner document from printpdf.
    document: PdfDocumentReference,

    /// The current layer.
    layer: PdfLayerReference,

    /// The page size.
    page_size: (Mm, Mm),

    /// The font of the page numbers.
    font: IndirectFontRef,

    /// Whether something was drawn on the current page.
    used: bool,
}

impl Document {
    /// Creates a new pdf document from its name and its page size.
    pub fn new(name: &str, width: Mm, height: Mm) -> Result<Document> {
        let (document, page, layer) = PdfDocument::new(name, width, height, "");
        let layer = document.get_page(page).get_layer(layer);
        let font = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;

        Ok(Document {
            document,
            layer,
            page_size: (width, height),
            font,
            used: false,
        })
    }

    /// Creates a new page and append it to the document.
    pub fn new_page(&mut self) {
        let (page, layer) = self
            .document
            .add_page(self.page_size.0, self.page_size.1, "");
        self.layer = self.document.get_page(page).get_layer(layer);
        self.used = false;
    }

    /// Renders the pages of a layout, each on its own pdf page.
    pub fn render(&mut self, layout: &Layout) {
        let total = layout.pages.len();

        for page in &layout.pages {
            if self.used {
                self.new_page();
            }
            self.used = true;

            self.draw_chrome(&layout.grid, page.number, total);
            self.draw_page(layout, page);
        }
    }

    /// Converts a position on the page, from the top left corner in pixels, into pdf space.
    fn point(&self, x: Px, y: Px) -> Point {
        let x: Mm = x.into();
        let y: Mm = y.into();
        Point::new(x, Mm(self.page_size.1 .0 - y.0))
    }

    /// Draws a straight line.
    fn stroke(&self, from: (Px, Px), to: (Px, Px), color: Color, thickness: Px) {
        let thickness: Pt = thickness.into();
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(thickness.0);
        self.layer.add_shape(Line {
            points: vec![
                (self.point(from.0, from.1), false),
                (self.point(to.0, to.1), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
    }

    /// Draws the ruled lines, the margin rule and the page number.
    fn draw_chrome(&self, grid: &Grid, number: usize, total: usize) {
        let left = Px(0.0);
        let right = grid.page_width;

        for i in 0..grid.lines {
            let y = grid.margin + grid.line_height * i as f64;
            self.stroke((left, y), (right, y), RULING, Px(1.0));
        }

        self.stroke(
            (grid.margin, Px(0.0)),
            (grid.margin, grid.page_height),
            MARGIN_RULE,
            Px(2.0),
        );

        // Helvetica digits are 0.556 em wide, which is enough to right-align a page number.
        let text = format!("{} / {}", number, total);
        let width = Px(PAGE_NUMBER_SIZE / 0.75 * 0.556 * text.chars().count() as f64);
        let x = grid.page_width - PAGE_NUMBER_OFFSET.0 - width;
        let y = grid.page_height - PAGE_NUMBER_OFFSET.1;
        let position = self.point(x, y);

        self.layer.set_fill_color(pdf_color(PAGE_NUMBER));
        self.layer.use_text(
            text,
            PAGE_NUMBER_SIZE,
            position.x.into(),
            position.y.into(),
            &self.font,
        );
    }

    /// Draws the fragments of a page from top to bottom.
    fn draw_page(&self, layout: &Layout, page: &Page) {
        let mut top = layout.grid.margin + CONTENT_PADDING_TOP;
        for fragment in &page.fragments {
            self.draw_fragment(layout, fragment, top);
            top += fragment.extent.height;
        }
    }

    fn draw_fragment(&self, layout: &Layout, fragment: &Fragment, top: Px) {
        let grid = &layout.grid;
        let block = &layout.blocks[fragment.block];

        match block.kind {
            BlockKind::Heading(_) | BlockKind::Paragraph => {
                let tokens = block.tokens.get(fragment.tokens.clone()).unwrap_or(&[]);

                for (token, b) in tokens.iter().zip(&fragment.extent.boxes) {
                    let baseline = top + b.top + b.height - BASELINE_OFFSET;
                    let mut x = grid.margin + b.x;
                    if token.kind == TokenKind::Math {
                        x += INLINE_MATH_MARGIN;
                    }
                    let y = baseline + token.drawing.descent - token.drawing.height;
                    self.draw(&token.drawing, x, y);
                }

                let ends_block = fragment.tokens.end >= block.tokens.len();
                if block.kind == BlockKind::Heading(1) && ends_block {
                    if let Some(last) = fragment.extent.boxes.last() {
                        let y = top + last.top + last.height;
                        let right = grid.margin + grid.content_width();
                        self.stroke((grid.margin, y), (right, y), UNDERLINE, Px(2.0));
                    }
                }
            }

            BlockKind::DisplayMath => {
                let drawing = &block.drawing;
                let room = (grid.content_width() - drawing.width).max(Px(0.0));
                self.draw(
                    drawing,
                    grid.margin + room / 2.0,
                    top + DISPLAY_MATH_PADDING,
                );
            }

            BlockKind::Rule => {
                let y = top + grid.line_height / 2.0;
                let right = grid.margin + grid.content_width();
                self.stroke((grid.margin, y), (right, y), RULING, Px(2.0));
            }

            BlockKind::Blank => (),
        }
    }

    /// Fills the outlines of a drawing whose top left corner is at `(x, y)`.
    fn draw(&self, drawing: &Drawing, x: Px, y: Px) {
        let place = Matrix::translate(x.0, y.0);

        for outline in &drawing.outlines {
            let segments = parse_path_data(&outline.path);
            let polygons = flatten(&segments, &place.then(outline.transform));
            let (solid, counters) = split_counters(polygons);

            // printpdf 0.4 only fills subpaths one by one, counters are painted over with paper.
            self.fill(solid, outline.color);
            self.fill(counters, PAPER);
        }
    }

    fn fill(&self, polygons: Vec<Polygon>, color: Color) {
        self.layer.set_fill_color(pdf_color(color));
        for polygon in polygons {
            let points = polygon
                .into_iter()
                .map(|(px, py)| (self.point(Px(px), Px(py)), false))
                .collect();

            self.layer.add_shape(Line {
                points,
                is_closed: true,
                has_fill: true,
                has_stroke: false,
                is_clipping_path: false,
            });
        }
    }

    /// Saves the document into a file.
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.document.save(&mut writer).map_err(pdf_error)?;
        info!("wrote {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use printpdf::Mm;

    use super::{Document, DEFAULT_DOCUMENT};
    use crate::drawing::INK;
    use crate::layout::{typeset, Grid};
    use crate::parser::ast::ParseBlock;
    use crate::parser::parse;
    use crate::testing::{sample_font, Boxes};
    use crate::units::Px;

    #[test]
    fn default_document() {
        let blocks = parse(DEFAULT_DOCUMENT);
        assert_eq!(
            blocks[0],
            ParseBlock::Heading {
                level: 1,
                text: String::from("MathPro Notebook")
            }
        );
        assert!(blocks.contains(&ParseBlock::Rule));
        assert!(blocks
            .iter()
            .any(|b| matches!(b, ParseBlock::DisplayMath(tex) if tex.contains("\\frac{-b"))));
    }

    #[test]
    fn point_conversion() {
        let document = Document::new("test", Mm(210.0), Mm(297.0)).unwrap();
        let point = document.point(Px(0.0), Px(0.0));
        let top: Mm = point.y.into();
        // Points are kept in pt, the round trip is not exact.
        assert!((top.0 - 297.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn writes_every_page() {
        let font = sample_font();
        let text = "# Notes\n\n".to_owned() + &"a xa $x$ ff\n---\n$$\nint\n$$\n".repeat(20);
        let layout = typeset(&parse(&text), Some(&font), &Boxes, Grid::a4(), INK).await;
        assert!(layout.pages.len() > 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");

        let mut document = Document::new("Notes", Mm(210.0), Mm(297.0)).unwrap();
        document.render(&layout);
        document.save(&path).unwrap();

        let mut header = [0; 5];
        std::fs::File::open(&path)
            .unwrap()
            .read_exact(&mut header)
            .unwrap();
        assert_eq!(&header, b"%PDF-");
    }
}
