//! This module contains the parser for notebook documents.
//!
//! A document is read line by line: `# `, `## ` and `### ` start headings, `---` and `***` are
//! rules, lines made of `$$` delimit display math, empty lines are kept, and everything else is
//! a paragraph. Inside headings and paragraphs, math is written between dollars.

pub mod ast;
pub mod combinators;
pub mod utils;
pub mod warning;

#[cfg(test)]
mod tests;

use nom_locate::LocatedSpan;

use crate::parser::ast::ParseBlock;
use crate::parser::warning::Warnings;

/// This type will allow us to know where we are while we're parsing the content.
pub type Span<'a> = LocatedSpan<&'a str>;

/// A position is a span but without the reference to the complete str.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// The line number of the position.
    pub line: u32,

    /// The column number of the position.
    pub column: usize,

    /// The offset from the beginning of the string.
    pub offset: usize,
}

/// Returns the position of a span.
pub fn position(span: &Span) -> Position {
    Position {
        line: span.location_line(),
        column: span.get_utf8_column(),
        offset: span.location_offset(),
    }
}

/// A document that was parsed.
#[derive(Debug)]
pub struct Parsed {
    /// The blocks of the document.
    pub blocks: Vec<ParseBlock>,

    /// The warnings that were produced.
    pub warnings: Warnings,
}

pub use combinators::{parse, parse_document, segment};
