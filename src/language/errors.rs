use crate::language::{span::Span, types::Type};
use miette::{Diagnostic, LabeledSpan};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct OperatorSpan {
    pub symbol: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperandSpan {
    pub ty: Type,
    pub span: Span,
}

/// Every failure the front end and the evaluator can report. The first
/// error aborts the running phase.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CompilerError {
    #[error("{message}")]
    Syntax { message: String, span: Span },
    #[error("Variable `{name}` not defined in this scope")]
    UnknownVariable { name: String, span: Span },
    #[error("Cannot assign to `{name}`: variable not declared in this scope")]
    UndeclaredVariable { name: String, span: Span },
    #[error("Expected a type of {} but found {found}", join_types(.expected))]
    UnexpectedType {
        expected: Vec<Type>,
        found: Type,
        span: Span,
    },
    #[error("Expected a type of {expected} but found {found}")]
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Span,
        expected_span: Option<Span>,
    },
    #[error("{}", describe_invalid_operation(.operator, .operands))]
    InvalidOperation {
        operator: OperatorSpan,
        operands: Vec<OperandSpan>,
        span: Span,
    },
    #[error("Array elements must share one type: expected {expected} but found {found}")]
    ArrayTypeMismatch {
        expected: Type,
        found: Type,
        span: Span,
        expected_span: Span,
    },
    #[error("Empty array needs a type annotation")]
    EmptyArrayWithoutTypeAnnotation { span: Span },
    #[error("Cannot index into a value of type {found}")]
    IndexingNonArray { found: Type, span: Span },
    #[error("Index {index} is out of range for an array of length {length}")]
    IndexingOutOfRange {
        length: usize,
        index: i64,
        span: Span,
    },
    #[error("Cannot store a value of type {found} into an array of {expected}")]
    ArrayIndexAssignmentTypeMismatch {
        expected: Type,
        found: Type,
        span: Span,
        expected_span: Span,
    },
    #[error("Type `{name}` is already defined")]
    TypeRedefinition {
        name: String,
        span: Span,
        previous_span: Option<Span>,
    },
    #[error("`{name}` is declared more than once")]
    DuplicatedAttribute {
        name: String,
        span: Span,
        previous_span: Span,
    },
    #[error("Duplicated case found in match expression")]
    DuplicatedCase { span: Span, previous_span: Span },
    #[error("Match does not cover all cases for type {expected_type}")]
    InexhaustiveMatch {
        span: Span,
        expected_type: Type,
        scrutinee_span: Span,
        remaining_values: Vec<String>,
    },
    #[error("Unknown type `{name}`")]
    UnknownType { name: String, span: Span },
    #[error("Type {type_name} has no member `{member}`")]
    UnknownMember {
        type_name: String,
        member: String,
        span: Span,
    },
    #[error("Missing member `{member}` when constructing {type_name}")]
    MissingMember {
        type_name: String,
        member: String,
        span: Span,
    },
    #[error("Enum {enum_name} has no variant `{variant}`")]
    UnknownVariant {
        enum_name: String,
        variant: String,
        span: Span,
    },
    #[error("{}", describe_payload_mismatch(.enum_name, .variant, .expects_payload))]
    VariantPayloadMismatch {
        enum_name: String,
        variant: String,
        expects_payload: bool,
        span: Span,
    },
    #[error("Expected a struct but found {found}")]
    NotAStruct { found: Type, span: Span },
    #[error("`{name}` of type {found} cannot be called")]
    NotCallable {
        name: String,
        found: Type,
        span: Span,
    },
    #[error("{}", describe_argument_style(.name, .expects_named))]
    ArgumentStyleMismatch {
        name: String,
        expects_named: bool,
        span: Span,
    },
    #[error("`{name}` expects {expected} arguments but received {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("`return` outside of a function")]
    ReturnOutsideFunction { span: Span },
    #[error("Function `{function}` finished without returning a value")]
    MissingReturn { function: String, span: Span },
    #[error("Call to `{function}` exceeds the maximum call depth of {limit}")]
    RecursionLimit {
        function: String,
        limit: usize,
        span: Span,
    },
    #[error("Division by zero")]
    DivisionByZero { span: Span },
    #[error("Integer overflow in `{operator}`")]
    IntegerOverflow { operator: String, span: Span },
    #[error("Failed to write program output: {message}")]
    OutputFailure { message: String, span: Span },
    #[error("Internal compiler error: {message}")]
    InternalCompilerError { message: String, span: Span },
}

impl CompilerError {
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        CompilerError::InternalCompilerError {
            message: message.into(),
            span,
        }
    }

    /// Stable identifier of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompilerError::Syntax { .. } => "SyntaxError",
            CompilerError::UnknownVariable { .. } => "UnknownVariable",
            CompilerError::UndeclaredVariable { .. } => "UndeclaredVariable",
            CompilerError::UnexpectedType { .. } => "UnexpectedType",
            CompilerError::TypeMismatch { .. } => "TypeMismatch",
            CompilerError::InvalidOperation { .. } => "InvalidOperationError",
            CompilerError::ArrayTypeMismatch { .. } => "ArrayTypeMismatch",
            CompilerError::EmptyArrayWithoutTypeAnnotation { .. } => {
                "EmptyArrayWithoutTypeAnnotation"
            }
            CompilerError::IndexingNonArray { .. } => "IndexingNonArray",
            CompilerError::IndexingOutOfRange { .. } => "IndexingOutOfRange",
            CompilerError::ArrayIndexAssignmentTypeMismatch { .. } => {
                "ArrayIndexAssignmentTypeMismatch"
            }
            CompilerError::TypeRedefinition { .. } => "TypeRedefinition",
            CompilerError::DuplicatedAttribute { .. } => "DuplicatedAttribute",
            CompilerError::DuplicatedCase { .. } => "DuplicatedCase",
            CompilerError::InexhaustiveMatch { .. } => "InexhaustiveMatch",
            CompilerError::UnknownType { .. } => "UnknownType",
            CompilerError::UnknownMember { .. } => "UnknownMember",
            CompilerError::MissingMember { .. } => "MissingMember",
            CompilerError::UnknownVariant { .. } => "UnknownVariant",
            CompilerError::VariantPayloadMismatch { .. } => "VariantPayloadMismatch",
            CompilerError::NotAStruct { .. } => "NotAStruct",
            CompilerError::NotCallable { .. } => "NotCallable",
            CompilerError::ArgumentStyleMismatch { .. } => "ArgumentStyleMismatch",
            CompilerError::ArityMismatch { .. } => "ArityMismatch",
            CompilerError::ReturnOutsideFunction { .. } => "ReturnOutsideFunction",
            CompilerError::MissingReturn { .. } => "MissingReturn",
            CompilerError::RecursionLimit { .. } => "RecursionLimit",
            CompilerError::DivisionByZero { .. } => "DivisionByZero",
            CompilerError::IntegerOverflow { .. } => "IntegerOverflow",
            CompilerError::OutputFailure { .. } => "OutputFailure",
            CompilerError::InternalCompilerError { .. } => "InternalCompilerError",
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Primary location of the error.
    pub fn span(&self) -> Span {
        match self {
            CompilerError::Syntax { span, .. }
            | CompilerError::UnknownVariable { span, .. }
            | CompilerError::UndeclaredVariable { span, .. }
            | CompilerError::UnexpectedType { span, .. }
            | CompilerError::TypeMismatch { span, .. }
            | CompilerError::InvalidOperation { span, .. }
            | CompilerError::ArrayTypeMismatch { span, .. }
            | CompilerError::EmptyArrayWithoutTypeAnnotation { span }
            | CompilerError::IndexingNonArray { span, .. }
            | CompilerError::IndexingOutOfRange { span, .. }
            | CompilerError::ArrayIndexAssignmentTypeMismatch { span, .. }
            | CompilerError::TypeRedefinition { span, .. }
            | CompilerError::DuplicatedAttribute { span, .. }
            | CompilerError::DuplicatedCase { span, .. }
            | CompilerError::InexhaustiveMatch { span, .. }
            | CompilerError::UnknownType { span, .. }
            | CompilerError::UnknownMember { span, .. }
            | CompilerError::MissingMember { span, .. }
            | CompilerError::UnknownVariant { span, .. }
            | CompilerError::VariantPayloadMismatch { span, .. }
            | CompilerError::NotAStruct { span, .. }
            | CompilerError::NotCallable { span, .. }
            | CompilerError::ArgumentStyleMismatch { span, .. }
            | CompilerError::ArityMismatch { span, .. }
            | CompilerError::ReturnOutsideFunction { span }
            | CompilerError::MissingReturn { span, .. }
            | CompilerError::RecursionLimit { span, .. }
            | CompilerError::DivisionByZero { span }
            | CompilerError::IntegerOverflow { span, .. }
            | CompilerError::OutputFailure { span, .. }
            | CompilerError::InternalCompilerError { span, .. } => *span,
        }
    }

    fn labeled_spans(&self) -> Vec<LabeledSpan> {
        let label = |text: String, span: Span| LabeledSpan::new_with_span(Some(text), span);
        match self {
            CompilerError::UnknownVariable { span, .. }
            | CompilerError::UndeclaredVariable { span, .. } => {
                vec![label("Not defined".into(), *span)]
            }
            CompilerError::UnexpectedType { found, span, .. }
            | CompilerError::IndexingNonArray { found, span }
            | CompilerError::NotAStruct { found, span } => {
                vec![label(format!("This is of type {found}"), *span)]
            }
            CompilerError::TypeMismatch {
                expected,
                found,
                span,
                expected_span,
            } => {
                let mut labels = Vec::new();
                if let Some(expected_span) = expected_span {
                    labels.push(label(
                        format!("Since this is of type {expected}..."),
                        *expected_span,
                    ));
                }
                labels.push(label(
                    format!("...expected this to be {expected} too, but found {found}"),
                    *span,
                ));
                labels
            }
            CompilerError::InvalidOperation {
                operator, operands, ..
            } => {
                let mut labels = vec![label(
                    format!("Operator `{}`", operator.symbol),
                    operator.span,
                )];
                labels.extend(
                    operands
                        .iter()
                        .map(|operand| label(format!("This is of type {}", operand.ty), operand.span)),
                );
                labels
            }
            CompilerError::ArrayTypeMismatch {
                expected,
                found,
                span,
                expected_span,
            }
            | CompilerError::ArrayIndexAssignmentTypeMismatch {
                expected,
                found,
                span,
                expected_span,
            } => vec![
                label(format!("Expected because this is {expected}"), *expected_span),
                label(format!("This is of type {found}"), *span),
            ],
            CompilerError::IndexingOutOfRange { length, span, .. } => {
                vec![label(format!("Array has length {length}"), *span)]
            }
            CompilerError::TypeRedefinition {
                span,
                previous_span,
                ..
            } => {
                let mut labels = Vec::new();
                if let Some(previous) = previous_span {
                    labels.push(label("First defined here...".into(), *previous));
                }
                labels.push(label("...and redefined here".into(), *span));
                labels
            }
            CompilerError::DuplicatedAttribute {
                span,
                previous_span,
                ..
            }
            | CompilerError::DuplicatedCase {
                span,
                previous_span,
            } => vec![
                label("This is handled first here...".into(), *previous_span),
                label("...and duplicated here".into(), *span),
            ],
            CompilerError::InexhaustiveMatch {
                span,
                expected_type,
                scrutinee_span,
                ..
            } => vec![
                label(format!("This is of type {expected_type}"), *scrutinee_span),
                label("Match is not exhaustive".into(), *span),
            ],
            other => vec![label(other.to_string(), other.span())],
        }
    }
}

impl Diagnostic for CompilerError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            CompilerError::InexhaustiveMatch {
                remaining_values, ..
            } => {
                let rendered: Vec<String> = remaining_values
                    .iter()
                    .map(|value| format!("`{value}`"))
                    .collect();
                let noun = if rendered.len() == 1 { "value" } else { "values" };
                Some(Box::new(format!(
                    "Add case blocks for {noun} {}",
                    rendered.join(", ")
                )))
            }
            CompilerError::EmptyArrayWithoutTypeAnnotation { .. } => {
                Some(Box::new("Annotate the element type, e.g. `[]: int`"))
            }
            CompilerError::UndeclaredVariable { name, .. } => {
                Some(Box::new(format!("Declare it first with `let {name} = ...`")))
            }
            CompilerError::InternalCompilerError { .. } => {
                Some(Box::new("This is a bug in the compiler"))
            }
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(self.labeled_spans().into_iter()))
    }
}

fn join_types(types: &[Type]) -> String {
    let rendered: Vec<String> = types.iter().map(|ty| ty.to_string()).collect();
    rendered.join(" or ")
}

fn describe_invalid_operation(operator: &OperatorSpan, operands: &[OperandSpan]) -> String {
    match operands {
        [operand] => format!(
            "Invalid operation '{}' for type {}",
            operator.symbol, operand.ty
        ),
        [left, right] => format!(
            "Invalid operation '{}' for types {} and {}",
            operator.symbol, left.ty, right.ty
        ),
        _ => format!("Invalid operation '{}'", operator.symbol),
    }
}

fn describe_payload_mismatch(enum_name: &str, variant: &str, expects_payload: &bool) -> String {
    if *expects_payload {
        format!("Variant {enum_name}::{variant} carries a value")
    } else {
        format!("Variant {enum_name}::{variant} does not carry a value")
    }
}

fn describe_argument_style(name: &str, expects_named: &bool) -> String {
    if *expects_named {
        format!("Struct `{name}` must be constructed with named members")
    } else {
        format!("Function `{name}` takes positional arguments")
    }
}
