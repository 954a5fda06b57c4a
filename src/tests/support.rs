//! Builders for syntax trees. Every node gets its own span (one synthetic
//! source line per node) so tests can assert on error locations.

use crate::driver::{Session, SessionOptions};
use crate::language::{
    ast::*,
    errors::CompilerError,
    span::{Span, Spanned},
    typecheck::{typecheck, TypeEnvironment},
    typed_ast::TypedProgram,
    types::TypeAnnotation,
};
use crate::runtime::{OutputBuffer, Value};
use std::cell::Cell;

thread_local! {
    static NEXT_LINE: Cell<usize> = Cell::new(1);
}

pub fn span() -> Span {
    NEXT_LINE.with(|next| {
        let line = next.get();
        next.set(line + 1);
        Span::new((line, 1), (line, 20), (line * 100, line * 100 + 19))
    })
}

fn expr(node: ExprKind) -> Expr {
    Spanned::new(node, span())
}

fn statement(node: StatementKind) -> Statement {
    Spanned::new(node, span())
}

pub fn program(statements: Vec<Statement>) -> Program {
    Program {
        statements,
        span: span(),
    }
}

pub fn block(statements: Vec<Statement>) -> Block {
    Block {
        statements,
        span: span(),
    }
}

pub fn ty(name: &str) -> TypeAnnotation {
    TypeAnnotation::named(name, span())
}

pub fn array_ty(inner: TypeAnnotation) -> TypeAnnotation {
    TypeAnnotation::generic("array", inner, span())
}

pub fn int(value: i64) -> Expr {
    expr(ExprKind::Int(value))
}

pub fn boolean(value: bool) -> Expr {
    expr(ExprKind::Bool(value))
}

pub fn string(value: &str) -> Expr {
    expr(ExprKind::String(value.to_string()))
}

pub fn var(name: &str) -> Expr {
    expr(ExprKind::Variable(name.to_string()))
}

pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        op_span: span(),
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        op_span: span(),
        operand: Box::new(operand),
    })
}

pub fn array(elements: Vec<Expr>) -> Expr {
    expr(ExprKind::Array {
        elements,
        annotation: None,
    })
}

pub fn annotated_array(annotation: TypeAnnotation, elements: Vec<Expr>) -> Expr {
    expr(ExprKind::Array {
        elements,
        annotation: Some(annotation),
    })
}

pub fn index(target: Expr, idx: Expr) -> Expr {
    expr(ExprKind::Index {
        target: Box::new(target),
        index: Box::new(idx),
    })
}

pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        callee: callee.to_string(),
        callee_span: span(),
        args: CallArgs::Positional(args),
    })
}

pub fn construct(callee: &str, members: Vec<(&str, Expr)>) -> Expr {
    let members = members
        .into_iter()
        .map(|(name, value)| NamedArg {
            name: name.to_string(),
            value,
            span: span(),
        })
        .collect();
    expr(ExprKind::Call {
        callee: callee.to_string(),
        callee_span: span(),
        args: CallArgs::Named(members),
    })
}

pub fn member(target: Expr, name: &str) -> Expr {
    expr(ExprKind::Member {
        target: Box::new(target),
        member: name.to_string(),
        member_span: span(),
    })
}

pub fn variant(enum_name: &str, variant: &str, payload: Option<Expr>) -> Expr {
    expr(ExprKind::EnumLiteral {
        enum_name: enum_name.to_string(),
        variant: variant.to_string(),
        payload: payload.map(Box::new),
    })
}

pub fn let_(name: &str, value: Expr) -> Statement {
    statement(StatementKind::Let {
        name: name.to_string(),
        value,
    })
}

pub fn assign(name: &str, value: Expr) -> Statement {
    statement(StatementKind::Assign {
        name: name.to_string(),
        value,
    })
}

pub fn index_assign(target: Expr, idx: Expr, value: Expr) -> Statement {
    statement(StatementKind::IndexAssign {
        target,
        index: idx,
        value,
    })
}

pub fn member_assign(target: Expr, name: &str, value: Expr) -> Statement {
    statement(StatementKind::MemberAssign {
        target,
        member: name.to_string(),
        member_span: span(),
        value,
    })
}

pub fn print(value: Expr) -> Statement {
    statement(StatementKind::Print(value))
}

pub fn if_(condition: Expr, body: Vec<Statement>) -> Statement {
    if_chain(vec![(condition, body)], None)
}

pub fn if_chain(branches: Vec<(Expr, Vec<Statement>)>, otherwise: Option<Vec<Statement>>) -> Statement {
    let branches = branches
        .into_iter()
        .map(|(condition, body)| IfBranch {
            condition,
            body: block(body),
        })
        .collect();
    statement(StatementKind::If {
        branches,
        otherwise: otherwise.map(block),
    })
}

pub fn while_(condition: Expr, body: Vec<Statement>) -> Statement {
    statement(StatementKind::While {
        condition,
        body: block(body),
    })
}

pub fn for_in(binding: &str, iterable: Expr, body: Vec<Statement>) -> Statement {
    statement(StatementKind::For {
        binding: binding.to_string(),
        iterable,
        body: block(body),
    })
}

pub fn for_range(binding: &str, start: Expr, end: Expr, body: Vec<Statement>) -> Statement {
    statement(StatementKind::ForRange {
        binding: binding.to_string(),
        start,
        end,
        body: block(body),
    })
}

pub fn struct_decl(name: &str, members: Vec<(&str, TypeAnnotation)>) -> Statement {
    let members = members
        .into_iter()
        .map(|(name, ty)| MemberDecl {
            name: name.to_string(),
            ty,
            span: span(),
        })
        .collect();
    statement(StatementKind::Struct(StructDecl {
        name: name.to_string(),
        members,
    }))
}

pub fn enum_decl(name: &str, variants: Vec<(&str, Option<TypeAnnotation>)>) -> Statement {
    let variants = variants
        .into_iter()
        .map(|(name, payload)| VariantDecl {
            name: name.to_string(),
            payload,
            span: span(),
        })
        .collect();
    statement(StatementKind::Enum(EnumDecl {
        name: name.to_string(),
        variants,
    }))
}

pub fn function(
    name: &str,
    params: Vec<(&str, TypeAnnotation)>,
    return_type: TypeAnnotation,
    body: Vec<Statement>,
) -> Statement {
    let params = params
        .into_iter()
        .map(|(name, ty)| Param {
            name: name.to_string(),
            ty,
            span: span(),
        })
        .collect();
    statement(StatementKind::Function(FunctionDecl {
        name: name.to_string(),
        params,
        return_type,
        body: block(body),
    }))
}

pub fn ret(value: Expr) -> Statement {
    statement(StatementKind::Return(value))
}

pub fn match_(scrutinee: Expr, arms: Vec<(Pattern, Vec<Statement>)>) -> Statement {
    let arms = arms
        .into_iter()
        .map(|(pattern, body)| MatchArm {
            pattern,
            body: block(body),
            span: span(),
        })
        .collect();
    statement(StatementKind::Match { scrutinee, arms })
}

pub fn expr_stmt(value: Expr) -> Statement {
    statement(StatementKind::Expr(value))
}

pub fn p_bool(value: bool) -> Pattern {
    Spanned::new(PatternKind::Bool(value), span())
}

pub fn p_wild() -> Pattern {
    Spanned::new(PatternKind::Wildcard, span())
}

pub fn p_array(items: Vec<ArrayPatternItem>) -> Pattern {
    Spanned::new(PatternKind::Array(items), span())
}

pub fn p_variant(enum_name: &str, variant: &str, payload: Option<Pattern>) -> Pattern {
    Spanned::new(
        PatternKind::Enum {
            enum_name: enum_name.to_string(),
            variant: variant.to_string(),
            payload: payload.map(Box::new),
        },
        span(),
    )
}

/// Typechecks against a fresh environment.
pub fn check(statements: Vec<Statement>) -> Result<TypedProgram, CompilerError> {
    typecheck(&program(statements), &mut TypeEnvironment::new())
}

pub fn check_err(statements: Vec<Statement>) -> CompilerError {
    match check(statements) {
        Ok(typed) => panic!("expected a type error, program checked as {}", typed.ty),
        Err(err) => err,
    }
}

/// Session with the prelude installed and `print` captured.
pub fn session() -> (Session, OutputBuffer) {
    let output = OutputBuffer::new();
    let session = Session::new(SessionOptions {
        prelude: true,
        output: Some(Box::new(output.clone())),
    });
    (session, output)
}

pub fn run(statements: Vec<Statement>) -> (Result<Value, CompilerError>, OutputBuffer) {
    let (mut session, output) = session();
    let result = session.run(&program(statements));
    (result, output)
}

/// Runs a program expected to succeed and returns its printed lines.
pub fn run_lines(statements: Vec<Statement>) -> Vec<String> {
    let (result, output) = run(statements);
    if let Err(err) = result {
        panic!("program failed: {err:?}");
    }
    output.lines()
}
