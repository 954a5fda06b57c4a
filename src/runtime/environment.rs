use crate::language::{errors::CompilerError, span::Span};
use crate::runtime::{builtins::Builtin, value::FunctionValue, value::Value, RuntimeResult};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
struct ParentLink {
    index: usize,
    /// Number of the parent's bindings visible through this link; `None`
    /// sees all of them.
    visible: Option<usize>,
}

struct Scope {
    id: u64,
    bindings: Vec<(String, Value)>,
    parent: Option<ParentLink>,
}

/// Where a function was declared: the declaring scope and how many of its
/// bindings existed at that point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capture {
    index: usize,
    id: u64,
    visible: usize,
}

/// Runtime name resolution plus the sink `print` writes to.
///
/// Scopes form a stack, but lookups follow parent links rather than stack
/// order: a function call scope links back to the scope its function was
/// declared in, so bodies resolve names lexically.
pub struct RuntimeEnvironment {
    scopes: Vec<Scope>,
    next_id: u64,
    output: Box<dyn Write>,
}

impl Default for RuntimeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeEnvironment {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self {
            scopes: vec![Scope {
                id: 0,
                bindings: Vec::new(),
                parent: None,
            }],
            next_id: 1,
            output,
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn push_linked(&mut self, parent: ParentLink) {
        let id = self.next_id;
        self.next_id += 1;
        self.scopes.push(Scope {
            id,
            bindings: Vec::new(),
            parent: Some(parent),
        });
    }

    pub fn push_scope(&mut self) {
        let index = self.scopes.len().saturating_sub(1);
        self.push_linked(ParentLink {
            index,
            visible: None,
        });
    }

    /// Enters a function body whose enclosing scope is the one recorded in
    /// `capture`.
    pub fn push_call_scope(&mut self, capture: Capture, span: Span) -> RuntimeResult<()> {
        match self.scopes.get(capture.index) {
            Some(scope) if scope.id == capture.id => {
                self.push_linked(ParentLink {
                    index: capture.index,
                    visible: Some(capture.visible),
                });
                Ok(())
            }
            _ => Err(CompilerError::internal(
                "function called after its declaring scope ended",
                span,
            )),
        }
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn capture(&self) -> Capture {
        let index = self.scopes.len().saturating_sub(1);
        let (id, visible) = self
            .scopes
            .get(index)
            .map(|scope| (scope.id, scope.bindings.len()))
            .unwrap_or((0, 0));
        Capture { index, id, visible }
    }

    /// Adds a binding to the innermost scope. Earlier bindings of the same
    /// name stay in place for functions that captured them.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.push((name.into(), value));
        }
    }

    fn resolve(&self, name: &str) -> Option<(usize, usize)> {
        let mut index = self.scopes.len().checked_sub(1)?;
        let mut limit = None;
        loop {
            let scope = self.scopes.get(index)?;
            let visible = limit
                .unwrap_or(scope.bindings.len())
                .min(scope.bindings.len());
            if let Some(slot) = scope.bindings[..visible]
                .iter()
                .rposition(|(binding, _)| binding == name)
            {
                return Some((index, slot));
            }
            let parent = scope.parent?;
            index = parent.index;
            limit = parent.visible;
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let (scope, slot) = self.resolve(name)?;
        self.scopes[scope].bindings.get(slot).map(|(_, value)| value)
    }

    /// Rebinds an existing name; returns `false` when no binding is visible.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        let Some((scope, slot)) = self.resolve(name) else {
            return false;
        };
        match self.scopes[scope].bindings.get_mut(slot) {
            Some(binding) => {
                binding.1 = value;
                true
            }
            None => false,
        }
    }

    /// Number of bindings in the global scope, for [`Self::truncate_globals`].
    pub fn global_count(&self) -> usize {
        self.scopes.first().map_or(0, |global| global.bindings.len())
    }

    /// Drops global bindings added after [`Self::global_count`] returned
    /// `count`.
    pub fn truncate_globals(&mut self, count: usize) {
        if let Some(global) = self.scopes.first_mut() {
            global.bindings.truncate(count);
        }
    }

    pub fn define_builtin(&mut self, builtin: Rc<dyn Builtin>) {
        let name = builtin.name().to_string();
        if let Some(global) = self.scopes.first_mut() {
            global
                .bindings
                .push((name, Value::Function(FunctionValue::Builtin(builtin))));
        }
    }

    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()
    }
}

/// In-memory print sink. Clones share the same buffer, so a host can keep
/// one handle and give the other to a [`RuntimeEnvironment`].
#[derive(Clone, Debug, Default)]
pub struct OutputBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut env = RuntimeEnvironment::new();
        env.define("x", Value::String("outside".into()));
        env.push_scope();
        env.define("x", Value::Int(8));
        assert_eq!(env.get("x"), Some(&Value::Int(8)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::String("outside".into())));
    }

    #[test]
    fn set_updates_nearest_binding() {
        let mut env = RuntimeEnvironment::new();
        env.define("x", Value::Int(1));
        env.push_scope();
        assert!(env.set("x", Value::Int(2)));
        assert!(!env.set("missing", Value::Int(0)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn call_scope_sees_only_captured_bindings() {
        let mut env = RuntimeEnvironment::new();
        env.define("x", Value::Int(1));
        let capture = env.capture();
        env.define("x", Value::String("later".into()));
        env.define("y", Value::Int(5));

        env.push_scope();
        env.define("local", Value::Bool(true));
        env.push_call_scope(capture, Span::default()).unwrap();
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
        assert_eq!(env.get("y"), None);
        assert_eq!(env.get("local"), None);
        env.pop_scope();
        env.pop_scope();
    }

    #[test]
    fn stale_capture_is_rejected() {
        let mut env = RuntimeEnvironment::new();
        env.push_scope();
        let capture = env.capture();
        env.pop_scope();
        env.push_scope();
        let err = env.push_call_scope(capture, Span::default()).unwrap_err();
        assert_eq!(err.kind(), "InternalCompilerError");
    }

    #[test]
    fn truncating_globals_forgets_later_bindings() {
        let mut env = RuntimeEnvironment::new();
        env.define("kept", Value::Int(1));
        let count = env.global_count();
        env.define("dropped", Value::Int(2));
        env.define("kept", Value::Int(3));
        env.truncate_globals(count);
        assert_eq!(env.global_count(), 1);
        assert_eq!(env.get("kept"), Some(&Value::Int(1)));
        assert_eq!(env.get("dropped"), None);
    }

    #[test]
    fn output_buffer_collects_lines() {
        let buffer = OutputBuffer::new();
        let mut env = RuntimeEnvironment::with_output(Box::new(buffer.clone()));
        env.write_line("hello").unwrap();
        env.write_line("world").unwrap();
        assert_eq!(buffer.lines(), vec!["hello", "world"]);
    }
}
