//! Untyped syntax tree handed over by the parser. Every node carries a
//! [`Span`]; the checker turns it into a [`crate::language::typed_ast`] tree.

use crate::language::{
    span::{Span, Spanned},
    types::TypeAnnotation,
};
use std::fmt;

pub type Expr = Spanned<ExprKind>;
pub type Statement = Spanned<StatementKind>;
pub type Pattern = Spanned<PatternKind>;

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Lt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Bool(bool),
    Int(i64),
    String(String),
    Variable(String),
    Binary {
        op: BinaryOp,
        op_span: Span,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        op_span: Span,
        operand: Box<Expr>,
    },
    /// `[a, b]` or, with an element annotation, `[a, b]: int`.
    Array {
        elements: Vec<Expr>,
        annotation: Option<TypeAnnotation>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// Function call or struct construction; which one is decided by what
    /// `callee` resolves to.
    Call {
        callee: String,
        callee_span: Span,
        args: CallArgs,
    },
    Member {
        target: Box<Expr>,
        member: String,
        member_span: Span,
    },
    EnumLiteral {
        enum_name: String,
        variant: String,
        payload: Option<Box<Expr>>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallArgs {
    Positional(Vec<Expr>),
    Named(Vec<NamedArg>),
}

impl CallArgs {
    pub fn len(&self) -> usize {
        match self {
            CallArgs::Positional(args) => args.len(),
            CallArgs::Named(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedArg {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatementKind {
    Let {
        name: String,
        value: Expr,
    },
    Assign {
        name: String,
        value: Expr,
    },
    IndexAssign {
        target: Expr,
        index: Expr,
        value: Expr,
    },
    MemberAssign {
        target: Expr,
        member: String,
        member_span: Span,
        value: Expr,
    },
    Print(Expr),
    If {
        branches: Vec<IfBranch>,
        otherwise: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    For {
        binding: String,
        iterable: Expr,
        body: Block,
    },
    ForRange {
        binding: String,
        start: Expr,
        end: Expr,
        body: Block,
    },
    Struct(StructDecl),
    Enum(EnumDecl),
    Function(FunctionDecl),
    Return(Expr),
    Match {
        scrutinee: Expr,
        arms: Vec<MatchArm>,
    },
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub members: Vec<MemberDecl>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberDecl {
    pub name: String,
    pub ty: TypeAnnotation,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<VariantDecl>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariantDecl {
    pub name: String,
    pub payload: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeAnnotation,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeAnnotation,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    Bool(bool),
    Wildcard,
    Array(Vec<ArrayPatternItem>),
    Enum {
        enum_name: String,
        variant: String,
        payload: Option<Box<Pattern>>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayPatternItem {
    Int(i64),
    Wildcard,
}

impl fmt::Display for ArrayPatternItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayPatternItem::Int(value) => write!(f, "{value}"),
            ArrayPatternItem::Wildcard => write!(f, "_"),
        }
    }
}
