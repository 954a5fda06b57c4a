use crate::language::{
    ast::*,
    errors::{CompilerError, OperandSpan, OperatorSpan},
    span::Span,
    typed_ast::*,
    types::{EnumType, EnumVariant, FunctionType, StructType, Type, TypeAnnotation},
};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

pub mod exhaustiveness;

use exhaustiveness::Matcher;

pub type TypeResult<T> = Result<T, CompilerError>;

#[derive(Clone, Debug, PartialEq)]
pub struct VarBinding {
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeBinding {
    pub ty: Type,
    /// `None` for types that were never declared in source.
    pub span: Option<Span>,
}

/// Return contract of the function whose body is being checked.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionScope {
    pub name: String,
    pub return_type: Type,
    pub return_span: Span,
}

#[derive(Clone, Debug, Default)]
struct TypeScope {
    values: HashMap<String, VarBinding>,
    types: HashMap<String, TypeBinding>,
    function: Option<FunctionScope>,
}

/// Compile-time name resolution: a stack of scopes, innermost last. The
/// bottom scope is global and holds the primitive type names.
#[derive(Clone, Debug)]
pub struct TypeEnvironment {
    scopes: Vec<TypeScope>,
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeEnvironment {
    pub fn new() -> Self {
        let mut global = TypeScope::default();
        for (name, ty) in [("int", Type::Int), ("bool", Type::Bool), ("string", Type::String)] {
            global
                .types
                .insert(name.to_string(), TypeBinding { ty, span: None });
        }
        Self {
            scopes: vec![global],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(TypeScope::default());
    }

    pub fn push_function_scope(&mut self, function: FunctionScope) {
        self.scopes.push(TypeScope {
            function: Some(function),
            ..TypeScope::default()
        });
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn define_var(&mut self, name: impl Into<String>, ty: Type, span: Span) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.values.insert(name.into(), VarBinding { ty, span });
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&VarBinding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.values.get(name))
    }

    pub fn define_type(&mut self, name: impl Into<String>, ty: Type, span: Option<Span>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.types.insert(name.into(), TypeBinding { ty, span });
        }
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeBinding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(name))
    }

    /// Innermost enclosing function, if any.
    pub fn function_scope(&self) -> Option<&FunctionScope> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.function.as_ref())
    }

    /// Makes a host-provided function visible to every program checked
    /// against this environment.
    pub fn define_builtin(&mut self, signature: FunctionType) {
        let name = signature.name.clone();
        if let Some(global) = self.scopes.first_mut() {
            global.values.insert(
                name,
                VarBinding {
                    ty: Type::Function(Arc::new(signature)),
                    span: Span::default(),
                },
            );
        }
    }
}

mod checker;

pub use checker::{typecheck, Checker};

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: usize) -> Span {
        Span::new((line, 1), (line, 4), (line * 10, line * 10 + 3))
    }

    #[test]
    fn inner_scopes_shadow_and_restore() {
        let mut env = TypeEnvironment::new();
        env.define_var("x", Type::String, span(1));
        env.push_scope();
        env.define_var("x", Type::Int, span(2));
        assert_eq!(env.get_var("x").map(|binding| &binding.ty), Some(&Type::Int));
        env.pop_scope();
        assert_eq!(env.get_var("x").map(|binding| &binding.ty), Some(&Type::String));
    }

    #[test]
    fn global_scope_is_never_popped() {
        let mut env = TypeEnvironment::new();
        env.pop_scope();
        env.pop_scope();
        assert_eq!(env.depth(), 1);
        assert!(env.get_type("int").is_some());
    }

    #[test]
    fn function_scope_is_found_from_nested_blocks() {
        let mut env = TypeEnvironment::new();
        assert!(env.function_scope().is_none());
        env.push_function_scope(FunctionScope {
            name: "f".into(),
            return_type: Type::Bool,
            return_span: span(1),
        });
        env.push_scope();
        assert_eq!(
            env.function_scope().map(|function| &function.return_type),
            Some(&Type::Bool)
        );
        env.pop_scope();
        env.pop_scope();
        assert!(env.function_scope().is_none());
    }
}
