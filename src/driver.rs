use crate::language::{
    ast::Program, errors::CompilerError, typecheck::TypeEnvironment, typed_ast::TypedProgram,
};
use crate::runtime::{builtins, Builtin, RuntimeEnvironment, Value};
use std::io::{self, Write};
use std::rc::Rc;

/// Turns source text into a syntax tree. Implementations report failures as
/// [`CompilerError::Syntax`].
pub trait ProgramParser {
    fn parse(&self, source: &str) -> Result<Program, CompilerError>;
}

#[derive(Default)]
pub struct SessionOptions {
    /// Install the `sum` and `len` builtins.
    pub prelude: bool,
    /// Destination of `print`; stdout when `None`.
    pub output: Option<Box<dyn Write>>,
}

/// A type environment and a runtime environment that live across programs,
/// so later programs see earlier declarations.
pub struct Session {
    types: TypeEnvironment,
    runtime: RuntimeEnvironment,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let output = options
            .output
            .unwrap_or_else(|| Box::new(io::stdout()));
        let mut session = Self {
            types: TypeEnvironment::new(),
            runtime: RuntimeEnvironment::with_output(output),
        };
        if options.prelude {
            for builtin in builtins::prelude() {
                session.register_builtin(builtin);
            }
        }
        session
    }

    pub fn register_builtin(&mut self, builtin: Rc<dyn Builtin>) {
        self.types.define_builtin(builtin.signature());
        self.runtime.define_builtin(builtin);
    }

    pub fn type_env(&self) -> &TypeEnvironment {
        &self.types
    }

    pub fn runtime_env(&self) -> &RuntimeEnvironment {
        &self.runtime
    }

    pub fn check(&mut self, program: &Program) -> Result<TypedProgram, CompilerError> {
        crate::language::typecheck::typecheck(program, &mut self.types)
    }

    pub fn eval(&mut self, program: &TypedProgram) -> Result<Value, CompilerError> {
        crate::runtime::eval(program, &mut self.runtime)
    }

    /// Checks `program` and, only if that succeeds, evaluates it. A program
    /// that fails in either phase leaves no declarations behind, so the
    /// type and runtime environments stay in step.
    pub fn run(&mut self, program: &Program) -> Result<Value, CompilerError> {
        let types = self.types.clone();
        let globals = self.runtime.global_count();
        let result = self.check(program).and_then(|typed| self.eval(&typed));
        if result.is_err() {
            self.types = types;
            self.runtime.truncate_globals(globals);
        }
        result
    }

    pub fn run_source(
        &mut self,
        parser: &impl ProgramParser,
        source: &str,
    ) -> Result<Value, CompilerError> {
        let program = parser.parse(source)?;
        self.run(&program)
    }
}
