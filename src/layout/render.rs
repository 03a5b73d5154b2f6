//! Turns parsed blocks into tokens and drawings.

use nom::branch::alt;
use nom::bytes::complete::{take_till1, take_while1};
use nom::combinator::map;
use nom::multi::many0;
use nom::IResult;

use crate::drawing::{Color, Drawing};
use crate::fonts::raster::render;
use crate::fonts::FontRepository;
use crate::layout::constants::{heading_size, BODY_SIZE};
use crate::layout::{BlockKind, RenderedBlock, Token, TokenKind};
use crate::math::MathResolver;
use crate::parser::ast::{InlineSegment, ParseBlock};
use crate::parser::segment;

/// Where the drawing of some math goes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A token of a heading or a paragraph.
    Inline {
        /// The index of the block.
        block: usize,

        /// The index of the token in the block.
        token: usize,
    },

    /// A display math block.
    Display {
        /// The index of the block.
        block: usize,
    },
}

/// Some math waiting for its drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathTask {
    /// The TeX source.
    pub source: String,

    /// Whether the math is displayed on its own lines.
    pub display: bool,

    /// Where the drawing goes.
    pub slot: Slot,
}

/// The math of a document, in the order it appears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MathQueue {
    tasks: Vec<MathTask>,
}

impl MathQueue {
    /// Returns the tasks of the queue.
    pub fn tasks(&self) -> &[MathTask] {
        &self.tasks
    }

    /// Returns the number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if there is no math.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolves the math one task after the other, and stores the drawings in the blocks.
    ///
    /// A task that fails leaves its slot empty and doesn't prevent the other ones from being
    /// resolved.
    pub async fn resolve<R: MathResolver>(self, resolver: &R, blocks: &mut [RenderedBlock]) {
        for task in self.tasks {
            let drawing = match resolver.resolve(&task.source, task.display).await {
                Ok(drawing) => drawing,
                Err(e) => {
                    debug!("cannot render math \"{}\": {}", task.source, e);
                    continue;
                }
            };

            let target = match task.slot {
                Slot::Inline { block, token } => blocks
                    .get_mut(block)
                    .and_then(|b| b.tokens.get_mut(token))
                    .map(|t| &mut t.drawing),
                Slot::Display { block } => blocks.get_mut(block).map(|b| &mut b.drawing),
            };

            match target {
                Some(target) => *target = drawing,
                None => warn!("no slot for math \"{}\"", task.source),
            }
        }
    }
}

/// Splits text into words and runs of whitespace.
fn words(input: &str) -> IResult<&str, Vec<(TokenKind, &str)>> {
    many0(alt((
        map(take_while1(char::is_whitespace), |s| (TokenKind::Space, s)),
        map(take_till1(char::is_whitespace), |s| (TokenKind::Word, s)),
    )))(input)
}

/// Splits text into words and runs of whitespace.
///
/// ```
/// # use mathpro::layout::TokenKind;
/// # use mathpro::layout::render::tokenize;
/// assert_eq!(tokenize(" a  bc"), vec![
///     (TokenKind::Space, " "),
///     (TokenKind::Word, "a"),
///     (TokenKind::Space, "  "),
///     (TokenKind::Word, "bc"),
/// ]);
/// ```
pub fn tokenize(text: &str) -> Vec<(TokenKind, &str)> {
    match words(text) {
        Ok((_, tokens)) => tokens,
        Err(_) => vec![],
    }
}

/// Renders the text of a heading or a paragraph into tokens, queueing its math.
fn render_text(
    text: &str,
    size: f64,
    index: usize,
    block: &mut RenderedBlock,
    queue: &mut MathQueue,
    font: Option<&FontRepository>,
    color: Color,
) {
    for segment in segment(text) {
        match segment {
            InlineSegment::Text(text) => {
                for (kind, content) in tokenize(&text) {
                    let drawing = match kind {
                        TokenKind::Word => render(content, size, color, font),
                        _ => Drawing::empty(),
                    };
                    block.tokens.push(Token::new(kind, content, drawing));
                }
            }

            InlineSegment::Math(tex) => {
                queue.tasks.push(MathTask {
                    source: tex.clone(),
                    display: false,
                    slot: Slot::Inline {
                        block: index,
                        token: block.tokens.len(),
                    },
                });
                block
                    .tokens
                    .push(Token::new(TokenKind::Math, tex, Drawing::empty()));
            }
        }
    }
}

/// Renders the blocks of a document.
///
/// Words are drawn right away; math is left empty and queued, in document order.
pub fn render_blocks(
    blocks: &[ParseBlock],
    font: Option<&FontRepository>,
    color: Color,
) -> (Vec<RenderedBlock>, MathQueue) {
    let mut rendered = Vec::with_capacity(blocks.len());
    let mut queue = MathQueue::default();

    for (index, block) in blocks.iter().enumerate() {
        let block = match block {
            ParseBlock::Heading { level, text } => {
                let mut block = RenderedBlock::new(BlockKind::Heading(*level));
                let size = heading_size(*level);
                render_text(text, size, index, &mut block, &mut queue, font, color);
                block
            }

            ParseBlock::Paragraph(text) => {
                let mut block = RenderedBlock::new(BlockKind::Paragraph);
                render_text(text, BODY_SIZE, index, &mut block, &mut queue, font, color);
                block
            }

            ParseBlock::DisplayMath(tex) => {
                queue.tasks.push(MathTask {
                    source: tex.clone(),
                    display: true,
                    slot: Slot::Display { block: index },
                });
                let mut block = RenderedBlock::new(BlockKind::DisplayMath);
                block.source = tex.clone();
                block
            }

            ParseBlock::Rule => RenderedBlock::new(BlockKind::Rule),
            ParseBlock::Blank => RenderedBlock::new(BlockKind::Blank),
        };

        rendered.push(block);
    }

    (rendered, queue)
}

#[cfg(test)]
mod tests {
    use super::{render_blocks, tokenize, Slot};
    use crate::drawing::INK;
    use crate::layout::TokenKind;
    use crate::parser::parse;
    use crate::testing::{sample_font, Boxes};
    use crate::units::Px;

    #[test]
    fn queue_in_document_order() {
        let blocks = parse("$$\nfirst\n$$\n## a $second$ b $third$\n\n$$\nfourth\n$$");
        let (rendered, queue) = render_blocks(&blocks, None, INK);

        let sources: Vec<&str> = queue.tasks().iter().map(|t| t.source.as_str()).collect();
        assert_eq!(sources, vec!["first", "second", "third", "fourth"]);
        assert_eq!(queue.tasks()[0].slot, Slot::Display { block: 0 });
        assert_eq!(queue.tasks()[2].slot, Slot::Inline { block: 1, token: 6 });
        assert!(queue.tasks()[3].display);
        assert_eq!(rendered[1].tokens[6].kind, TokenKind::Math);
    }

    #[test]
    fn words_are_drawn() {
        let font = sample_font();
        let blocks = parse("# ax\nax");
        let (rendered, queue) = render_blocks(&blocks, Some(&font), INK);
        assert!(queue.is_empty());

        // Headings of level 1 are drawn at 36 px, paragraphs at 22 px.
        assert_eq!(rendered[0].tokens[0].drawing.height, Px(47.0));
        assert_eq!(rendered[1].tokens[0].drawing.height, Px(29.0));
    }

    #[tokio::test]
    async fn failures_are_contained() {
        let blocks = parse("$a$ $fail$ $abc$\n$$\nfail\n$$\n$$\nxy\n$$");
        let (mut rendered, queue) = render_blocks(&blocks, None, INK);
        queue.resolve(&Boxes, &mut rendered).await;

        assert_eq!(rendered[0].tokens[0].drawing.width, Px(10.0));
        assert!(rendered[0].tokens[2].drawing.is_blank());
        assert_eq!(rendered[0].tokens[4].drawing.width, Px(30.0));
        assert!(rendered[1].drawing.is_blank());
        assert_eq!(rendered[2].drawing.height, Px(40.0));
    }

    #[test]
    fn whitespace_runs() {
        assert_eq!(tokenize(""), vec![]);
        assert_eq!(
            tokenize("a\t b"),
            vec![
                (TokenKind::Word, "a"),
                (TokenKind::Space, "\t "),
                (TokenKind::Word, "b")
            ]
        );
    }
}
