pub mod builtins;
pub mod environment;
pub mod interpreter;
pub mod value;

use crate::language::errors::CompilerError;

pub type RuntimeResult<T> = Result<T, CompilerError>;

pub use builtins::Builtin;
pub use environment::{Capture, OutputBuffer, RuntimeEnvironment};
pub use interpreter::{eval, Interpreter, MAX_CALL_DEPTH};
pub use value::Value;
