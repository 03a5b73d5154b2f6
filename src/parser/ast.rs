//! This module contains the blocks a document is made of.

use std::fmt;

/// A block of the document, one per line or per display math region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseBlock {
    /// A heading.
    Heading {
        /// The level of the heading, from 1 to 3.
        level: u8,

        /// The content of the heading, that may contain inline math.
        text: String,
    },

    /// A paragraph, that may contain inline math.
    Paragraph(String),

    /// Some TeX displayed on its own lines.
    DisplayMath(String),

    /// A horizontal rule.
    Rule,

    /// An empty line.
    Blank,
}

impl fmt::Display for ParseBlock {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseBlock::Heading { level, text } => {
                for _ in 0..*level {
                    write!(fmt, "#")?;
                }
                write!(fmt, " {}", text)
            }
            ParseBlock::Paragraph(text) => write!(fmt, "{}", text),
            ParseBlock::DisplayMath(tex) => write!(fmt, "$$\n{}\n$$", tex),
            ParseBlock::Rule => write!(fmt, "---"),
            ParseBlock::Blank => Ok(()),
        }
    }
}

/// Writes blocks back into a document.
///
/// ```
/// # use mathpro::parser::ast::{to_source, ParseBlock};
/// let blocks = vec![
///     ParseBlock::Heading { level: 2, text: String::from("Title") },
///     ParseBlock::Blank,
///     ParseBlock::DisplayMath(String::from("x^2")),
/// ];
/// assert_eq!(to_source(&blocks), "## Title\n\n$$\nx^2\n$$");
/// ```
pub fn to_source(blocks: &[ParseBlock]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A part of a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSegment {
    /// Plain text, drawn with the glyph font.
    Text(String),

    /// TeX source that was between dollars.
    Math(String),
}

impl fmt::Display for InlineSegment {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InlineSegment::Text(text) => write!(fmt, "{}", text),
            InlineSegment::Math(tex) => write!(fmt, "${}$", tex),
        }
    }
}
