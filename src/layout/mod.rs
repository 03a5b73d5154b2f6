//! This module lays documents out on the pages of a ruled notebook.
//!
//! Laying out goes through four phases: the blocks are rendered into tokens whose words are drawn
//! with the glyph font ([render]), the math placeholders are resolved one at a time
//! ([render::MathQueue]), blocks are measured against the line grid ([measure]), and finally
//! packed into pages, splitting paragraphs between lines when they don't fit ([pages]).

pub mod constants;
pub mod measure;
pub mod pages;
pub mod render;

use printpdf::Mm;

use crate::drawing::{Color, Drawing};
use crate::fonts::FontRepository;
use crate::layout::constants::LINE_HEIGHT;
use crate::layout::measure::GridMeasurer;
use crate::layout::pages::{paginate, Page};
use crate::layout::render::render_blocks;
use crate::math::MathResolver;
use crate::parser::ast::ParseBlock;
use crate::units::Px;

/// The geometry of the pages and of their line grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// The width of a page.
    pub page_width: Px,

    /// The height of a page.
    pub page_height: Px,

    /// The margin on each side of the page.
    pub margin: Px,

    /// The height of a line of the grid.
    pub line_height: Px,

    /// How many lines fit on a page.
    pub lines: usize,
}

impl Grid {
    /// Computes the grid of a page, converting its dimensions to whole pixels.
    ///
    /// ```
    /// # use printpdf::Mm;
    /// # use mathpro::layout::Grid;
    /// # use mathpro::units::Px;
    /// let grid = Grid::new(Mm(210.0), Mm(297.0), Mm(25.4), Px(34.0));
    /// assert_eq!(grid.lines, 27);
    /// assert_eq!(grid.capacity(), Px(918.0));
    /// ```
    pub fn new(page_width: Mm, page_height: Mm, margin: Mm, line_height: Px) -> Grid {
        let page_width = Px::floor_from(page_width);
        let page_height = Px::floor_from(page_height);
        let margin = Px::floor_from(margin);
        let line_height = if line_height.0 >= 1.0 {
            line_height
        } else {
            warn!("line height {:?} is too small, using {:?}", line_height, LINE_HEIGHT);
            LINE_HEIGHT
        };

        let available = (page_height - margin * 2.0).max(Px(0.0));
        let lines = (available.0 / line_height.0).floor() as usize;

        Grid {
            page_width,
            page_height,
            margin,
            line_height,
            lines,
        }
    }

    /// The grid of an A4 page with one inch margins.
    pub fn a4() -> Grid {
        Grid::new(Mm(210.0), Mm(297.0), Mm(25.4), LINE_HEIGHT)
    }

    /// The height available for content on a page, a whole number of lines.
    pub fn capacity(&self) -> Px {
        self.line_height * self.lines as f64
    }

    /// The width available for content on a page.
    pub fn content_width(&self) -> Px {
        (self.page_width - self.margin * 2.0).max(Px(0.0))
    }
}

impl Default for Grid {
    fn default() -> Grid {
        Grid::a4()
    }
}

/// The different kinds of tokens a line of text is made of.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A word, drawn with the glyph font.
    Word,

    /// A run of whitespace.
    Space,

    /// Some inline math.
    Math,
}

/// A piece of a line of text that is never cut.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,

    /// The source of the token: the word, the whitespace, or the TeX.
    pub text: String,

    /// The drawing of the token, empty until math is resolved.
    pub drawing: Drawing,
}

impl Token {
    /// Creates a token.
    pub fn new<S: Into<String>>(kind: TokenKind, text: S, drawing: Drawing) -> Token {
        Token {
            kind,
            text: text.into(),
            drawing,
        }
    }
}

/// The different kinds of rendered blocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// A heading of some level.
    Heading(u8),

    /// A paragraph.
    Paragraph,

    /// Display math.
    DisplayMath,

    /// A horizontal rule.
    Rule,

    /// An empty line.
    Blank,
}

/// A block whose content has been drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    /// The kind of the block.
    pub kind: BlockKind,

    /// The tokens of a heading or a paragraph.
    pub tokens: Vec<Token>,

    /// The TeX of display math.
    pub source: String,

    /// The drawing of display math.
    pub drawing: Drawing,
}

impl RenderedBlock {
    /// Creates a block with no content.
    pub fn new(kind: BlockKind) -> RenderedBlock {
        RenderedBlock {
            kind,
            tokens: vec![],
            source: String::new(),
            drawing: Drawing::empty(),
        }
    }

    /// Returns true if the block is a heading or a paragraph.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, BlockKind::Heading(_) | BlockKind::Paragraph)
    }

    /// Returns true if `tokens` tokens of this block may be split between two pages.
    pub fn is_wrappable(&self, tokens: usize) -> bool {
        self.is_text() && tokens > 1
    }
}

/// A document laid out on pages.
#[derive(Debug, Clone)]
pub struct Layout {
    /// The grid the document was laid out on.
    pub grid: Grid,

    /// The rendered blocks of the document.
    pub blocks: Vec<RenderedBlock>,

    /// The pages, that refer to the blocks.
    pub pages: Vec<Page>,
}

/// Lays blocks out on pages.
///
/// This never fails: math that cannot be resolved is left empty, and text is left empty when
/// there is no font. There is always at least one page.
pub async fn typeset<R: MathResolver>(
    blocks: &[ParseBlock],
    font: Option<&FontRepository>,
    resolver: &R,
    grid: Grid,
    color: Color,
) -> Layout {
    let (mut rendered, queue) = render_blocks(blocks, font, color);
    debug!(
        "rendered {} blocks, {} math placeholders",
        rendered.len(),
        queue.len()
    );

    queue.resolve(resolver, &mut rendered).await;

    let measurer = GridMeasurer::new(grid);
    let pages = paginate(&rendered, &measurer, &grid);
    info!("laid out {} blocks on {} pages", rendered.len(), pages.len());

    Layout {
        grid,
        blocks: rendered,
        pages,
    }
}
