#![allow(clippy::collapsible_if)]

pub mod diagnostics;
pub mod driver;
pub mod language;
pub mod runtime;

pub use driver::{ProgramParser, Session, SessionOptions};
pub use language::errors::CompilerError;

#[cfg(test)]
mod tests;
