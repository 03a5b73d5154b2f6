//! This module contains the collaborators that turn TeX into drawings.
//!
//! Typesetting math is not done here: it is delegated to a [MathResolver], usually an external
//! program driven by [command::CommandResolver]. Resolving may fail for any formula, in which
//! case the formula is left empty and the rest of the document is laid out anyway.

pub mod command;

use std::io;

use crate::drawing::Drawing;

/// The error that can occur while resolving math.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// No math renderer is available.
    #[error("no math renderer available")]
    Unavailable,

    /// The math renderer exited with an error.
    #[error("math renderer failed ({status}): {stderr}")]
    Command {
        /// The exit status of the renderer.
        status: String,

        /// What the renderer wrote on its error output.
        stderr: String,
    },

    /// The math renderer produced something that is not a valid svg document.
    #[error("invalid svg: {0}")]
    InvalidSvg(String),

    /// The math renderer could not be run.
    #[error("cannot run math renderer: {0}")]
    Io(#[from] io::Error),
}

/// Something that can turn TeX into drawings.
#[allow(async_fn_in_trait)]
pub trait MathResolver {
    /// Typesets some TeX, either inline or displayed on its own lines.
    async fn resolve(&self, tex: &str, display: bool) -> Result<Drawing, MathError>;

    /// Returns true if the resolver can be used right away.
    fn is_ready(&self) -> bool {
        true
    }
}

impl<R: MathResolver> MathResolver for Option<R> {
    async fn resolve(&self, tex: &str, display: bool) -> Result<Drawing, MathError> {
        match self {
            Some(resolver) => resolver.resolve(tex, display).await,
            None => Err(MathError::Unavailable),
        }
    }

    fn is_ready(&self) -> bool {
        self.as_ref().map(R::is_ready).unwrap_or(false)
    }
}
