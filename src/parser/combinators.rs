//! This module contains all the functions needed for parsing.

// Allow redundant closure because of nom.
#![allow(clippy::redundant_closure)]

use std::path::Path;

use nom::branch::*;
use nom::bytes::complete::*;
use nom::character::complete::char;
use nom::combinator::*;
use nom::multi::*;
use nom::sequence::*;
use nom::{IResult, Slice};

use crate::parser::ast::{InlineSegment, ParseBlock};
use crate::parser::warning::{EmptyWarning, WarningType, Warnings};
use crate::parser::{position, Parsed, Span};

/// Creates a warning.
pub fn warning(span: &Span, ty: WarningType) -> EmptyWarning {
    EmptyWarning {
        position: position(span),
        ty,
    }
}

/// Skips whitespace.
fn whitespace(input: Span) -> IResult<Span, Span> {
    take_while(char::is_whitespace)(input)
}

/// Splits the content into lines, keeping track of where they are.
///
/// An empty content gives an empty line, and a trailing newline gives a trailing empty line.
/// ```
/// # use mathpro::parser::Span;
/// # use mathpro::parser::combinators::split_lines;
/// let lines = split_lines(Span::new("a\nb\n"));
/// let lines: Vec<&str> = lines.iter().map(|l| *l.fragment()).collect();
/// assert_eq!(lines, vec!["a", "b", ""]);
/// ```
pub fn split_lines(mut input: Span) -> Vec<Span> {
    let mut lines = vec![];

    loop {
        let (rest, line) = match take_till::<_, _, ()>(|c: char| c == '\n')(input) {
            Ok(parsed) => parsed,
            Err(_) => break,
        };
        lines.push(line);

        match char::<_, ()>('\n')(rest) {
            Ok((rest, _)) => input = rest,
            Err(_) => break,
        }
    }

    lines
}

/// Removes the whitespace at the end of a line.
pub fn trim_end(line: Span) -> Span {
    line.slice(..line.fragment().trim_end().len())
}

/// Recognizes a line made of `$$` only, the fence of display math.
/// ```
/// # use mathpro::parser::Span;
/// # use mathpro::parser::combinators::parse_fence;
/// assert!(parse_fence(Span::new("  $$ ")).is_ok());
/// assert!(parse_fence(Span::new("$$x$$")).is_err());
/// ```
pub fn parse_fence(input: Span) -> IResult<Span, Span> {
    all_consuming(delimited(whitespace, tag("$$"), whitespace))(input)
}

/// Recognizes a horizontal rule, `---` or `***`.
pub fn parse_rule(input: Span) -> IResult<Span, ParseBlock> {
    value(
        ParseBlock::Rule,
        all_consuming(delimited(
            whitespace,
            alt((tag("---"), tag("***"))),
            whitespace,
        )),
    )(input)
}

/// Parses the hashes of a heading and the space that follows them.
/// ```
/// # use mathpro::parser::Span;
/// # use mathpro::parser::combinators::parse_heading_level;
/// let (rest, level) = parse_heading_level(Span::new("## Title")).unwrap();
/// assert_eq!(level, 2);
/// assert_eq!(*rest.fragment(), "Title");
/// assert!(parse_heading_level(Span::new("#### Title")).is_err());
/// assert!(parse_heading_level(Span::new("#Title")).is_err());
/// ```
pub fn parse_heading_level(input: Span) -> IResult<Span, u8> {
    alt((
        value(1, tag("# ")),
        value(2, tag("## ")),
        value(3, tag("### ")),
    ))(input)
}

/// Recognizes a line containing nothing but whitespace.
pub fn parse_blank(input: Span) -> IResult<Span, ParseBlock> {
    value(ParseBlock::Blank, all_consuming(whitespace))(input)
}

/// Parses some text up to the next dollar.
fn parse_text(input: Span) -> IResult<Span, (InlineSegment, Option<EmptyWarning>)> {
    map(take_till1(|c: char| c == '$'), |x: Span| {
        (InlineSegment::Text(x.fragment().to_string()), None)
    })(input)
}

/// Parses some inline math.
/// ```
/// # use mathpro::parser::Span;
/// # use mathpro::parser::ast::InlineSegment;
/// # use mathpro::parser::combinators::parse_inline_math;
/// let input = Span::new("$x = 9$ and");
/// let (rest, parsed) = parse_inline_math(input).unwrap();
/// assert_eq!(parsed.0, InlineSegment::Math(String::from("x = 9")));
/// assert_eq!(*rest.fragment(), " and");
/// ```
pub fn parse_inline_math(input: Span) -> IResult<Span, (InlineSegment, Option<EmptyWarning>)> {
    map(delimited(tag("$"), take_until("$"), tag("$")), |x: Span| {
        (InlineSegment::Math(x.fragment().to_string()), None)
    })(input)
}

/// Parses a dollar that is never closed: it and everything after it are text.
fn parse_unmatched_dollar(input: Span) -> IResult<Span, (InlineSegment, Option<EmptyWarning>)> {
    map(recognize(preceded(tag("$"), rest)), |x: Span| {
        (
            InlineSegment::Text(x.fragment().to_string()),
            Some(warning(&x, WarningType::UnmatchedDollar)),
        )
    })(input)
}

/// Splits a line into text and math, along with the warnings.
pub fn segment_span(input: Span) -> (Vec<InlineSegment>, Vec<EmptyWarning>) {
    let parsed = many0(alt((parse_text, parse_inline_math, parse_unmatched_dollar)))(input);

    let mut segments = vec![];
    let mut warnings = vec![];

    if let Ok((_, parsed)) = parsed {
        for (segment, warning) in parsed {
            segments.push(segment);
            warnings.extend(warning);
        }
    }

    (segments, warnings)
}

/// Splits a line into text and math.
///
/// ```
/// # use mathpro::parser::ast::InlineSegment;
/// # use mathpro::parser::combinators::segment;
/// assert_eq!(segment("Hello $x$ world"), vec![
///     InlineSegment::Text(String::from("Hello ")),
///     InlineSegment::Math(String::from("x")),
///     InlineSegment::Text(String::from(" world")),
/// ]);
/// assert_eq!(segment("costs 5$"), vec![
///     InlineSegment::Text(String::from("costs 5")),
///     InlineSegment::Text(String::from("$")),
/// ]);
/// ```
pub fn segment(line: &str) -> Vec<InlineSegment> {
    segment_span(Span::new(line)).0
}

/// Parses the lines of a display math region, after its opening fence.
///
/// Returns the number of lines consumed, closing fence included, and whether the region was
/// closed.
fn parse_display_math(lines: &[Span]) -> (String, usize, bool) {
    let end = lines.iter().position(|line| parse_fence(*line).is_ok());
    let content = &lines[..end.unwrap_or(lines.len())];

    let tex = content
        .iter()
        .map(|line| *line.fragment())
        .collect::<Vec<_>>()
        .join("\n");

    match end {
        Some(end) => (tex, end + 1, true),
        None => (tex, lines.len(), false),
    }
}

/// Parses a line that is not part of display math.
fn parse_line(line: Span, warnings: &mut Vec<EmptyWarning>) -> ParseBlock {
    let line = trim_end(line);

    if let Ok((_, rule)) = parse_rule(line) {
        return rule;
    }

    if let Ok((content, level)) = parse_heading_level(line) {
        warnings.extend(segment_span(content).1);
        return ParseBlock::Heading {
            level,
            text: content.fragment().to_string(),
        };
    }

    if let Ok((_, blank)) = parse_blank(line) {
        return blank;
    }

    warnings.extend(segment_span(line).1);
    ParseBlock::Paragraph(line.fragment().to_string())
}

/// Parses a whole document, keeping track of the warnings.
pub fn parse_content(input: &str) -> (Vec<ParseBlock>, Vec<EmptyWarning>) {
    let lines = split_lines(Span::new(input));
    let mut blocks = vec![];
    let mut warnings = vec![];
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        index += 1;

        if parse_fence(line).is_ok() {
            let (tex, consumed, closed) = parse_display_math(&lines[index..]);
            if !closed {
                let start = line.slice(line.fragment().len() - line.fragment().trim_start().len()..);
                warnings.push(warning(&start, WarningType::UnterminatedDisplayMath));
            }
            blocks.push(ParseBlock::DisplayMath(tex));
            index += consumed;
            continue;
        }

        blocks.push(parse_line(line, &mut warnings));
    }

    (blocks, warnings)
}

/// Parses a whole document.
///
/// Parsing never fails: every line gives a block, except the lines of display math that all go
/// into the same block.
/// ```
/// # use mathpro::parser::ast::ParseBlock;
/// # use mathpro::parser::parse;
/// assert_eq!(parse("# Title\n\nHello"), vec![
///     ParseBlock::Heading { level: 1, text: String::from("Title") },
///     ParseBlock::Blank,
///     ParseBlock::Paragraph(String::from("Hello")),
/// ]);
/// assert_eq!(parse(""), vec![ParseBlock::Blank]);
/// ```
pub fn parse(input: &str) -> Vec<ParseBlock> {
    parse_content(input).0
}

/// Parses a whole document and keeps the warnings, labelled with the path of the document.
pub fn parse_document<P: AsRef<Path>>(input: &str, path: P) -> Parsed {
    let (blocks, warnings) = parse_content(input);

    Parsed {
        blocks,
        warnings: Warnings {
            path: path.as_ref().to_path_buf(),
            content: input.to_owned(),
            warnings,
        },
    }
}
