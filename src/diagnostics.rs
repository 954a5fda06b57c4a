use crate::language::errors::CompilerError;
use miette::{NamedSource, Report};

/// Pairs an error with the text it points into, ready for a miette
/// report handler to render.
pub fn attach_source(error: CompilerError, name: &str, source: impl Into<String>) -> Report {
    Report::new(error).with_source_code(NamedSource::new(name, source.into()))
}
