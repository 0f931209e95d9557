//! End-to-end compilation: source text in, [`Game`] out.

use std::fs;
use std::path::Path;

use tracing::debug;
use trogdor_foundation::{Error, Result};
use trogdor_language::{CompilerConfig, Instantiator, Parsed, Vocabulary, parse_markup};
use trogdor_parser::parse_natural;

use crate::game::Game;
use crate::runtime::Runtime;

/// Which front-end reads a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// The XML-like markup format.
    Markup,
    /// The natural-language format.
    Natural,
}

impl SourceFormat {
    /// Picks the format from a file extension: `.xml` is markup, anything
    /// else is natural language.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => Self::Markup,
            _ => Self::Natural,
        }
    }
}

/// Compiles a markup game definition.
///
/// # Errors
///
/// Returns the first parse, validation or instantiation error. Unresolved
/// references are reported together.
pub fn compile_markup(source: &str, config: &CompilerConfig) -> Result<Game> {
    compile(source, SourceFormat::Markup, config)
}

/// Compiles a natural-language game definition.
///
/// # Errors
///
/// Returns the first lex, parse, validation or instantiation error.
pub fn compile_natural(source: &str, config: &CompilerConfig) -> Result<Game> {
    compile(source, SourceFormat::Natural, config)
}

/// Reads and compiles a file, choosing the front-end from its extension.
/// Errors carry the file name unless the configuration names another.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or any compilation
/// error.
pub fn compile_file(path: impl AsRef<Path>, config: &CompilerConfig) -> Result<Game> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|e| Error::io(display.clone(), &e))?;
    let config = if config.filename.is_some() {
        config.clone()
    } else {
        config.clone().with_filename(display)
    };
    compile(&source, SourceFormat::from_path(path), &config)
}

fn compile(source: &str, format: SourceFormat, config: &CompilerConfig) -> Result<Game> {
    let result = run_pipeline(source, format, config);
    match &config.filename {
        Some(filename) => result.map_err(|e| e.with_filename(filename.clone())),
        None => result,
    }
}

fn run_pipeline(source: &str, format: SourceFormat, config: &CompilerConfig) -> Result<Game> {
    let vocabulary = Vocabulary::english();
    let Parsed { ast, symbols } = match format {
        SourceFormat::Markup => parse_markup(source, &vocabulary)?,
        SourceFormat::Natural => parse_natural(source, &vocabulary, config)?,
    };
    debug!(
        ?format,
        operations = ast.len(),
        entities = symbols.entity_count(),
        "parsed"
    );

    let runtime = Runtime::new()?.with_config(config.clone());
    let mut instantiator = Instantiator::new(runtime, &vocabulary).with_config(config);
    instantiator.instantiate(&ast)?;
    Ok(instantiator.into_backend().into_game())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trogdor_foundation::ErrorKind;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("game.xml")), SourceFormat::Markup);
        assert_eq!(SourceFormat::from_path(Path::new("GAME.XML")), SourceFormat::Markup);
        assert_eq!(SourceFormat::from_path(Path::new("story.ni")), SourceFormat::Natural);
        assert_eq!(SourceFormat::from_path(Path::new("story")), SourceFormat::Natural);
    }

    #[test]
    fn natural_story_compiles() {
        let game = compile_natural(
            "The Cave is a room. The lamp is in the Cave.",
            &CompilerConfig::default(),
        )
        .unwrap();
        let start = game.start_room().unwrap();
        assert_eq!(start.title(), "Cave");
        assert_eq!(game.entity("lamp").unwrap().location.as_deref(), Some("start"));
    }

    #[test]
    fn filename_is_stamped_on_errors() {
        let config = CompilerConfig::default().with_filename("broken.ni");
        let err = compile_natural("The box is not open. The box is open.", &config).unwrap_err();
        assert!(err.to_string().starts_with("broken.ni"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = compile_file("/nonexistent/trogdor/game.xml", &CompilerConfig::default()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io { .. }));
    }
}
