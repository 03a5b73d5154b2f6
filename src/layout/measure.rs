//! Measurement of rendered blocks.
//!
//! Packing blocks into pages only needs to know how tall a block, or a part of a block, is once
//! laid out, and where each of its tokens lands. The [Measure] trait gives that; [GridMeasurer]
//! computes it from the drawings and the line grid, without rendering anything.

use std::ops::Range;

use crate::layout::constants::{DISPLAY_MATH_PADDING, INLINE_MATH_MARGIN, SPACE_WIDTH};
use crate::layout::{BlockKind, Grid, RenderedBlock, Token, TokenKind};
use crate::units::Px;

/// Where a token lands, relative to the top left corner of its fragment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TokenBox {
    /// The horizontal offset of the token.
    pub x: Px,

    /// The top of the line the token is on.
    pub top: Px,

    /// The width of the token.
    pub width: Px,

    /// The height of the line the token is on.
    pub height: Px,
}

/// The size of a laid out block or part of a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extent {
    /// The total height.
    pub height: Px,

    /// The boxes of the tokens, in order.
    pub boxes: Vec<TokenBox>,
}

/// Something that can tell how blocks are laid out.
pub trait Measure {
    /// Measures the tokens of a block in the given range.
    ///
    /// Blocks without tokens ignore the range.
    fn measure(&self, block: &RenderedBlock, tokens: Range<usize>) -> Extent;
}

/// Measures blocks against a line grid.
///
/// Every line takes a whole number of grid lines, so that text always sits on the ruling of the
/// page.
#[derive(Debug, Clone, Copy)]
pub struct GridMeasurer {
    grid: Grid,
}

impl GridMeasurer {
    /// Creates a measurer for a grid.
    pub fn new(grid: Grid) -> GridMeasurer {
        GridMeasurer { grid }
    }

    /// Returns the width and height a token needs.
    fn token_size(&self, token: &Token) -> (Px, Px) {
        let line = self.grid.line_height;
        match token.kind {
            TokenKind::Word => (token.drawing.width, line),
            TokenKind::Space => (SPACE_WIDTH, line),
            TokenKind::Math => (
                token.drawing.width + INLINE_MATH_MARGIN * 2.0,
                token.drawing.height.max(line),
            ),
        }
    }

    /// Flows tokens into lines.
    fn measure_text(&self, block: &RenderedBlock, tokens: Range<usize>) -> Extent {
        let line = self.grid.line_height;
        let width = self.grid.content_width();

        let mut top = Px(0.0);
        if let BlockKind::Heading(_) = block.kind {
            if tokens.start == 0 {
                top += line;
            }
        }

        let mut boxes = vec![];
        let mut line_start = 0;
        let mut line_height = line;
        let mut x = Px(0.0);

        let tokens = block.tokens.get(tokens).unwrap_or(&[]);

        for token in tokens {
            let (token_width, token_height) = self.token_size(token);

            if x + token_width > width && boxes.len() > line_start {
                close_line(&mut boxes[line_start..], top, line_height);
                top += line_height;
                line_start = boxes.len();
                line_height = line;
                x = Px(0.0);
            }

            boxes.push(TokenBox {
                x,
                top,
                width: token_width,
                height: Px(0.0),
            });
            line_height = line_height.max(token_height.snap_up(line));
            x += token_width;
        }

        close_line(&mut boxes[line_start..], top, line_height);
        top += line_height;

        Extent { height: top, boxes }
    }
}

/// Gives the boxes of a line their final height.
fn close_line(boxes: &mut [TokenBox], top: Px, height: Px) {
    for b in boxes {
        b.top = top;
        b.height = height;
    }
}

impl Measure for GridMeasurer {
    fn measure(&self, block: &RenderedBlock, tokens: Range<usize>) -> Extent {
        let line = self.grid.line_height;

        match block.kind {
            BlockKind::Heading(level) => {
                let ends_block = tokens.end >= block.tokens.len();
                let mut extent = self.measure_text(block, tokens);
                if level == 1 && ends_block {
                    extent.height += line;
                }
                extent
            }

            BlockKind::Paragraph => self.measure_text(block, tokens),

            BlockKind::DisplayMath => {
                let content = block.drawing.height + DISPLAY_MATH_PADDING * 2.0;
                Extent {
                    height: content.snap_up(line) + line,
                    boxes: vec![],
                }
            }

            BlockKind::Rule | BlockKind::Blank => Extent {
                height: line,
                boxes: vec![],
            },
        }
    }
}
