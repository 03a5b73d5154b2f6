//! Math rendered by an external program.

use std::env;
use std::path::Path;
use std::sync::Arc;

use tokio::process::Command;

use crate::drawing::svg::import;
use crate::drawing::{Color, Drawing, INK};
use crate::fonts::FontRepository;
use crate::layout::constants::MATH_SIZE;
use crate::math::{MathError, MathResolver};
use crate::units::Px;

/// Runs a program that writes the svg of a formula on its standard output.
///
/// The TeX source is given as the last argument, preceded by `--inline` for inline math, which
/// is how MathJax's `tex2svg` works.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    program: String,
    args: Vec<String>,
    color: Color,
    size: Px,
    font: Option<Arc<FontRepository>>,
}

impl CommandResolver {
    /// Creates a resolver that runs a program with some arguments.
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> CommandResolver {
        CommandResolver {
            program: program.into(),
            args,
            color: INK,
            size: MATH_SIZE,
            font: None,
        }
    }

    /// Creates a resolver from a command line, the program followed by its arguments.
    pub fn from_command_line(command: &[String]) -> Option<CommandResolver> {
        let (program, args) = command.split_first()?;
        Some(CommandResolver::new(program.clone(), args.to_vec()))
    }

    /// Sets the colour of the formulas.
    pub fn with_color(self, color: Color) -> CommandResolver {
        CommandResolver { color, ..self }
    }

    /// Sets the size of an em.
    pub fn with_size(self, size: Px) -> CommandResolver {
        CommandResolver { size, ..self }
    }

    /// Sets the font whose glyphs replace those of the renderer.
    pub fn with_font(self, font: Option<Arc<FontRepository>>) -> CommandResolver {
        CommandResolver { font, ..self }
    }

    /// Returns the program that is run.
    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Checks whether a program can be found.
fn find_program(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).is_file();
    }

    match env::var_os("PATH") {
        Some(paths) => env::split_paths(&paths).any(|dir| dir.join(program).is_file()),
        None => false,
    }
}

impl MathResolver for CommandResolver {
    async fn resolve(&self, tex: &str, display: bool) -> Result<Drawing, MathError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if !display {
            command.arg("--inline");
        }
        command.arg(tex);

        trace!("running {} for \"{}\"", self.program, tex);
        let output = command.output().await?;

        if !output.status.success() {
            return Err(MathError::Command {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let svg = String::from_utf8(output.stdout)
            .map_err(|e| MathError::InvalidSvg(e.to_string()))?;

        import(&svg, self.size, self.color, self.font.as_deref())
            .map_err(|e| MathError::InvalidSvg(e.to_string()))
    }

    fn is_ready(&self) -> bool {
        find_program(&self.program)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::CommandResolver;
    use crate::math::{MathError, MathResolver};
    use crate::testing::sample_font;
    use crate::units::Px;

    fn shell(script: &str) -> CommandResolver {
        CommandResolver::new("sh", vec![String::from("-c"), String::from(script)])
            .with_size(Px(1000.0))
    }

    #[tokio::test]
    async fn inline_flag() {
        let resolver = shell(
            r#"if [ "$0" = "--inline" ]; then w=1000; else w=2000; fi; printf '<svg viewBox="0 -800 %s 1000"></svg>' "$w""#,
        );
        assert!(resolver.is_ready());

        let inline = resolver.resolve("x", false).await.unwrap();
        assert_eq!(inline.width, Px(1000.0));
        assert_eq!(inline.descent, Px(200.0));

        let display = resolver.resolve("x", true).await.unwrap();
        assert_eq!(display.width, Px(2000.0));
    }

    #[tokio::test]
    async fn font_substitution() {
        let font = Arc::new(sample_font());
        let resolver = shell(
            r#"printf '<svg viewBox="0 0 1000 1000"><path data-c="78" d="M0 0L1 1L0 1Z"/></svg>'"#,
        )
        .with_font(Some(font.clone()));

        let drawing = resolver.resolve("x", false).await.unwrap();
        assert_eq!(drawing.outlines[0].path, font.glyph('x').unwrap().outline);
    }

    #[tokio::test]
    async fn failures() {
        let failing = shell("echo oops >&2; exit 3");
        match failing.resolve("x", true).await {
            Err(MathError::Command { stderr, .. }) => assert_eq!(stderr, "oops"),
            other => panic!("expected a command error, got {:?}", other),
        }

        let garbage = shell("echo not svg");
        assert!(matches!(
            garbage.resolve("x", true).await,
            Err(MathError::InvalidSvg(_))
        ));

        let missing = CommandResolver::new("definitely-not-a-tex-renderer", vec![]);
        assert!(!missing.is_ready());
        assert!(matches!(
            missing.resolve("x", true).await,
            Err(MathError::Io(_))
        ));
    }

    #[test]
    fn command_line() {
        let command = vec![String::from("tex2svg"), String::from("--ex=8")];
        let resolver = CommandResolver::from_command_line(&command).unwrap();
        assert_eq!(resolver.program(), "tex2svg");
        assert!(CommandResolver::from_command_line(&[]).is_none());
    }
}
