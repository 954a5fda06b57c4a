pub mod ast;
pub mod errors;
pub mod span;
pub mod typecheck;
pub mod typed_ast;
pub mod types;
