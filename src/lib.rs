//! This crate contains all the tools we need to turn a plain-text notebook into ruled pages whose
//! text is drawn with the outlines of an SVG glyph font.
//!
//! The pipeline goes like this: the [parser] splits the document into blocks, the
//! [glyph rasterizer](fonts::raster) turns words into vector drawings, the
//! [math collaborator](math) turns TeX into vector drawings, and the [layout] packs everything
//! into pages of a fixed line grid that the [document] module finally writes into a pdf.

#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod document;
pub mod drawing;
pub mod fonts;
pub mod layout;
pub mod math;
pub mod parser;
pub mod units;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::{io, result};

use crate::fonts::FontLoadError;

/// The error type of the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cannot read current directory.
    #[error("cannot read current directory")]
    CannotReadCurrentDir,

    /// No mathpro.toml was found.
    #[error("no mathpro.toml was found")]
    NoConfigFile,

    /// The configuration file could not be understood.
    #[error("invalid configuration: {0}")]
    ConfigError(#[from] toml::de::Error),

    /// The configuration or the store could not be written.
    #[error("cannot serialize: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The input document was not found.
    #[error("couldn't find document \"{}\"", .0.display())]
    DocumentNotFound(PathBuf),

    /// The font could not be loaded.
    #[error("font error: {0}")]
    FontError(#[from] FontLoadError),

    /// Error while dealing with printpdf.
    #[error("printpdf error: {0}")]
    PrintpdfError(String),

    /// Another io error occured.
    #[error("an io error occured: {0}")]
    IoError(#[from] io::Error),
}

/// The result type of the library.
pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(Error::NoConfigFile.to_string(), "no mathpro.toml was found");

        let err = Error::DocumentNotFound(PathBuf::from("notes.txt"));
        assert_eq!(err.to_string(), "couldn't find document \"notes.txt\"");

        let err: Error = FontLoadError::FetchFailed(String::from("HTTP 404")).into();
        assert_eq!(err.to_string(), "font error: HTTP 404");
    }

    #[test]
    fn io_error_conversion() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::IoError(_)));
    }
}
