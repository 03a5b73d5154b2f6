//! This module contains everything related to parse warnings.
//!
//! Nothing is ever rejected by the parser, but some constructs probably don't do what the writer
//! meant, and we tell them.

use std::fmt;
use std::path::PathBuf;

use colored::*;

use crate::parser::utils::{next_new_line, previous_new_line, replicate};
use crate::parser::Position;

/// The different types of warning that can occur.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WarningType {
    /// A `$$` fence that is never closed.
    UnterminatedDisplayMath,

    /// A `$` with no closing `$` on the same line.
    UnmatchedDollar,
}

impl WarningType {
    /// Returns the headline, the label under the faulty text, and an optional hint.
    fn describe(self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            WarningType::UnterminatedDisplayMath => (
                "unterminated display math",
                "everything until the end is math",
                Some("display math ends with a line containing only '$$'"),
            ),
            WarningType::UnmatchedDollar => {
                ("unmatched dollar", "this will be written as text", None)
            }
        }
    }

    /// Number of characters of source the warning points at.
    fn width(self) -> usize {
        match self {
            WarningType::UnterminatedDisplayMath => 2,
            WarningType::UnmatchedDollar => 1,
        }
    }
}

/// A warning and where it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyWarning {
    /// The position of the warning.
    pub position: Position,

    /// The type of the warning.
    pub ty: WarningType,
}

/// The warnings found in one file, with its content to quote from.
#[derive(Debug)]
pub struct Warnings {
    /// The path to the corresponding file.
    pub path: PathBuf,

    /// The content that produced the warnings.
    pub content: String,

    /// The warnings produced.
    pub warnings: Vec<EmptyWarning>,
}

impl Warnings {
    /// Returns true if there is no warning.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Writes one warning the way rustc does.
    fn report(&self, fmt: &mut fmt::Formatter, warning: &EmptyWarning) -> fmt::Result {
        let Position {
            line,
            column,
            offset,
        } = warning.position;
        let (headline, label, hint) = warning.ty.describe();

        let start = previous_new_line(&self.content, offset);
        let source = &self.content[start..next_new_line(&self.content, offset)];
        let gutter = replicate(' ', line.to_string().len());
        let bar = "|".blue().bold();

        writeln!(fmt, "{} {}", "warning:".bold().yellow(), headline.bold())?;
        writeln!(
            fmt,
            "{}{} {}:{}:{}",
            gutter,
            "-->".bold().blue(),
            self.path.display(),
            line,
            column
        )?;
        writeln!(fmt, "{} {}", gutter, bar)?;
        writeln!(fmt, "{} {}", format!("{} |", line).blue().bold(), source)?;

        let marker = format!("{} {}", replicate('^', warning.ty.width()), label);
        writeln!(
            fmt,
            "{} {}{}{}",
            gutter,
            bar,
            replicate(' ', column),
            marker.bold().yellow()
        )?;
        writeln!(fmt, "{} {}", gutter, bar)?;

        match hint {
            Some(hint) => writeln!(
                fmt,
                "{} {} {} {}",
                gutter,
                "=".blue().bold(),
                "note:".bold(),
                hint
            ),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Warnings {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        self.warnings
            .iter()
            .try_for_each(|warning| self.report(fmt, warning))
    }
}
