//! Checked tree produced by [`crate::language::typecheck::typecheck`]. Every
//! expression, statement and pattern carries its inferred [`Type`]; the
//! evaluator only ever walks this form.

use crate::language::{
    ast::{ArrayPatternItem, BinaryOp, UnaryOp},
    span::Span,
    types::{EnumType, FunctionType, StructType, Type},
};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub struct TypedProgram {
    pub statements: Vec<TypedStatement>,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedBlock {
    pub statements: Vec<TypedStatement>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedExprKind {
    Bool(bool),
    Int(i64),
    String(String),
    Variable(String),
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Array(Vec<TypedExpr>),
    Index {
        target: Box<TypedExpr>,
        index: Box<TypedExpr>,
    },
    Call {
        callee: String,
        args: Vec<TypedExpr>,
    },
    /// Members in the order they were written, which is evaluation order.
    StructInit {
        struct_type: Arc<StructType>,
        members: Vec<(String, TypedExpr)>,
    },
    Member {
        target: Box<TypedExpr>,
        member: String,
    },
    EnumLiteral {
        enum_type: Arc<EnumType>,
        variant: String,
        payload: Option<Box<TypedExpr>>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedStatement {
    pub kind: TypedStatementKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedStatementKind {
    Let {
        name: String,
        value: TypedExpr,
    },
    Assign {
        name: String,
        value: TypedExpr,
    },
    IndexAssign {
        target: TypedExpr,
        index: TypedExpr,
        value: TypedExpr,
    },
    MemberAssign {
        target: TypedExpr,
        member: String,
        value: TypedExpr,
    },
    Print(TypedExpr),
    If {
        branches: Vec<TypedIfBranch>,
        otherwise: Option<TypedBlock>,
    },
    While {
        condition: TypedExpr,
        body: TypedBlock,
    },
    For {
        binding: String,
        iterable: TypedExpr,
        body: TypedBlock,
    },
    ForRange {
        binding: String,
        start: TypedExpr,
        end: TypedExpr,
        body: TypedBlock,
    },
    Struct(Arc<StructType>),
    Enum(Arc<EnumType>),
    Function(Rc<TypedFunction>),
    Return(TypedExpr),
    Match {
        scrutinee: TypedExpr,
        arms: Vec<TypedMatchArm>,
    },
    Expr(TypedExpr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedIfBranch {
    pub condition: TypedExpr,
    pub body: TypedBlock,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedFunction {
    pub name: String,
    pub params: Vec<String>,
    pub ty: Arc<FunctionType>,
    pub body: TypedBlock,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedMatchArm {
    pub pattern: TypedPattern,
    pub body: TypedBlock,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedPattern {
    pub kind: TypedPatternKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedPatternKind {
    Bool(bool),
    Wildcard,
    Array(Vec<ArrayPatternItem>),
    Enum {
        enum_type: Arc<EnumType>,
        variant: String,
        payload: Option<Box<TypedPattern>>,
    },
}
