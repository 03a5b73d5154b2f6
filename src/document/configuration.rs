//! This module defines the configuration of a notebook. The configuration is parsed from a TOML
//! file located at the root of the project. Every field has a default value, provided by this
//! module, so that a configuration file only needs the fields it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fmt, fs, result};

use printpdf::Mm;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::drawing::{Color, INK};
use crate::fonts::loader::{FileSource, HttpSource, Source, FONT_URL};
use crate::layout::constants::LINE_HEIGHT;
use crate::layout::Grid;
use crate::math::command::CommandResolver;
use crate::units::Px;
use crate::{Error, Result};

/// The name of the configuration file.
pub const CONFIG_FILE: &str = "mathpro.toml";

/// Serializes a `Mm` structure.
// This is required to use in macro `serialize_with`.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize_mm<S: Serializer>(mm: &Mm, serializer: S) -> result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(mm.0)
}

/// Deserializes a `Mm` structure.
pub fn deserialize_mm<'a, D: Deserializer<'a>>(deserializer: D) -> result::Result<Mm, D::Error> {
    deserializer.deserialize_f64(MmVisitor)
}

macro_rules! visit_from {
    ($visit: ident, $ty: ty) => {
        fn $visit<E>(self, value: $ty) -> result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Mm(f64::from(value)))
        }
    };
}

macro_rules! visit_as {
    ($visit: ident, $ty: ty) => {
        fn $visit<E>(self, value: $ty) -> result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Mm(value as f64))
        }
    };
}

/// Visitor for the `Mm` structure.
pub struct MmVisitor;

impl<'a> Visitor<'a> for MmVisitor {
    type Value = Mm;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a length in millimetres")
    }

    visit_from!(visit_u8, u8);
    visit_from!(visit_u16, u16);
    visit_from!(visit_u32, u32);
    visit_as!(visit_u64, u64);
    visit_from!(visit_i8, i8);
    visit_from!(visit_i16, i16);
    visit_from!(visit_i32, i32);
    visit_as!(visit_i64, i64);
    visit_from!(visit_f32, f32);
    visit_from!(visit_f64, f64);
}

/// Holds the configuration of a notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The title of the notebook.
    pub title: String,

    /// The path to the text of the notebook.
    pub input: String,

    /// The path to the pdf to produce.
    pub output: String,

    /// The width of the pages.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub page_width: Mm,

    /// The height of the pages.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub page_height: Mm,

    /// The margin on each side of the pages.
    #[serde(serialize_with = "serialize_mm")]
    #[serde(deserialize_with = "deserialize_mm")]
    pub margin: Mm,

    /// The spacing of the ruling, in pixels.
    pub line_height: Px,

    /// Where to download the glyph font from.
    pub font_url: String,

    /// A local glyph font, used instead of downloading one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<String>,

    /// The colour of the ink.
    pub color: Color,

    /// The program that renders math, followed by its arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub math_command: Option<Vec<String>>,

    /// How long to wait after an edit before laying the notebook out again, in milliseconds.
    pub debounce_ms: u64,
}

impl Config {
    /// Creates a default configuration with a title.
    pub fn with_title(title: &str) -> Config {
        Config {
            title: String::from(title),
            input: String::from("main.txt"),
            output: String::from("output.pdf"),
            page_width: Mm(210.0),
            page_height: Mm(297.0),
            margin: Mm(25.4),
            line_height: LINE_HEIGHT,
            font_url: String::from(FONT_URL),
            font_path: None,
            color: INK,
            math_command: Some(vec![String::from("tex2svg")]),
            debounce_ms: 500,
        }
    }

    /// Reads a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Writes the configuration into a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), toml::to_string(self)?)?;
        Ok(())
    }

    /// Looks for a configuration file in a directory and its parents.
    pub fn find<P: AsRef<Path>>(start: P) -> Result<PathBuf> {
        let mut current = start.as_ref().to_path_buf();

        loop {
            current.push(CONFIG_FILE);

            if current.is_file() {
                return Ok(current);
            }

            // Remove mathpro.toml, then go to the parent directory.
            current.pop();
            if !current.pop() {
                return Err(Error::NoConfigFile);
            }
        }
    }

    /// Returns the line grid of the pages.
    pub fn grid(&self) -> Grid {
        Grid::new(
            self.page_width,
            self.page_height,
            self.margin,
            self.line_height,
        )
    }

    /// Returns where the font should be fetched from, relative paths being relative to `root`.
    pub fn font_source(&self, root: &Path) -> Source {
        match &self.font_path {
            Some(path) => Source::File(FileSource {
                path: root.join(path),
            }),
            None => Source::Http(HttpSource::new(self.font_url.clone())),
        }
    }

    /// Returns the math renderer, if one is configured.
    pub fn math_resolver(&self) -> Option<CommandResolver> {
        let command = self.math_command.as_ref()?;
        let resolver = CommandResolver::from_command_line(command)?;
        Some(resolver.with_color(self.color))
    }

    /// Returns how long to wait after an edit.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::with_title("notebook")
    }
}
