//! This module contains the tests that check the blocks and segments produced by the parser.

use test_case::test_case;

use crate::parser::ast::{to_source, InlineSegment, ParseBlock};
use crate::parser::{parse, segment};

fn heading(level: u8, text: &str) -> ParseBlock {
    ParseBlock::Heading {
        level,
        text: text.into(),
    }
}

fn paragraph(text: &str) -> ParseBlock {
    ParseBlock::Paragraph(text.into())
}

fn text(text: &str) -> InlineSegment {
    InlineSegment::Text(text.into())
}

fn math(tex: &str) -> InlineSegment {
    InlineSegment::Math(tex.into())
}

#[test_case("# Title", heading(1, "Title") ; "level 1")]
#[test_case("## Title", heading(2, "Title") ; "level 2")]
#[test_case("### Title  ", heading(3, "Title") ; "level 3, trailing spaces")]
#[test_case("#  Title", heading(1, " Title") ; "leading space kept")]
#[test_case("#### Title", paragraph("#### Title") ; "level 4 is a paragraph")]
#[test_case("#Title", paragraph("#Title") ; "no space")]
#[test_case("# ", paragraph("#") ; "empty heading")]
#[test_case("---", ParseBlock::Rule ; "dashes")]
#[test_case("  *** ", ParseBlock::Rule ; "stars")]
#[test_case("----", paragraph("----") ; "four dashes")]
#[test_case(" \t ", ParseBlock::Blank ; "whitespace only")]
#[test_case("  indented\r", paragraph("  indented") ; "carriage return")]
fn single_line(input: &str, expected: ParseBlock) {
    assert_eq!(parse(input), vec![expected]);
}

#[test]
fn scenario() {
    let blocks = parse("# Title\n\nHello $x$ world");
    assert_eq!(
        blocks,
        vec![
            heading(1, "Title"),
            ParseBlock::Blank,
            paragraph("Hello $x$ world")
        ]
    );
}

#[test]
fn display_math() {
    let blocks = parse("before\n$$\n\\int_0^1 f\n  = 1  \n $$ \nafter");
    assert_eq!(
        blocks,
        vec![
            paragraph("before"),
            ParseBlock::DisplayMath(String::from("\\int_0^1 f\n  = 1  ")),
            paragraph("after"),
        ]
    );
}

#[test]
fn unterminated_display_math() {
    let blocks = parse("$$\nx\n\n# not a heading");
    assert_eq!(
        blocks,
        vec![ParseBlock::DisplayMath(String::from("x\n\n# not a heading"))]
    );
}

#[test]
fn empty_display_math() {
    assert_eq!(
        parse("$$\n$$"),
        vec![ParseBlock::DisplayMath(String::new())]
    );
}

#[test]
fn empty_document() {
    assert_eq!(parse(""), vec![ParseBlock::Blank]);
    assert_eq!(parse("\n"), vec![ParseBlock::Blank, ParseBlock::Blank]);
}

#[test_case("" ; "empty")]
#[test_case("# Title\n\nHello $x$ world" ; "scenario")]
#[test_case("$$\nx\ny  \n$$\n---\n### a $b\n" ; "mixed")]
#[test_case("$$\nunterminated" ; "unterminated")]
#[test_case("#  spaced\n  ***  \r\nend" ; "whitespace")]
fn parse_is_idempotent(input: &str) {
    let blocks = parse(input);
    assert_eq!(parse(&to_source(&blocks)), blocks);
}

#[test_case("Hello $x$ world", vec![text("Hello "), math("x"), text(" world")] ; "simple")]
#[test_case("$a$$b$", vec![math("a"), math("b")] ; "adjacent")]
#[test_case("$$", vec![math("")] ; "empty math")]
#[test_case("a $b", vec![text("a "), text("$b")] ; "unmatched")]
#[test_case("$a$ $b", vec![math("a"), text(" "), text("$b")] ; "unmatched after math")]
#[test_case("", vec![] ; "empty")]
#[test_case("no math", vec![text("no math")] ; "text only")]
fn segments(input: &str, expected: Vec<InlineSegment>) {
    assert_eq!(segment(input), expected);
}

#[test_case("Hello $x$ world")]
#[test_case("$a$$b$ and $c")]
#[test_case("price: 5$ or 6$ $")]
fn segments_reconstruct_the_line(input: &str) {
    let rebuilt: String = segment(input).iter().map(ToString::to_string).collect();
    assert_eq!(rebuilt, input);
}
