use crate::language::span::Span;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Syntactic type written by the user, e.g. `int` or `array<bool>`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub generic: Option<Box<TypeAnnotation>>,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            generic: None,
            span,
        }
    }

    pub fn generic(name: impl Into<String>, inner: TypeAnnotation, span: Span) -> Self {
        Self {
            name: name.into(),
            generic: Some(Box::new(inner)),
            span,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.generic {
            Some(inner) => write!(f, "{}<{}>", self.name, inner),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Semantic type assigned by the checker.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Bool,
    Int,
    String,
    Array(Box<Type>),
    /// Element type not known yet: wildcard-only array patterns.
    UntypedArray,
    Struct(Arc<StructType>),
    Enum(Arc<EnumType>),
    Function(Arc<FunctionType>),
    /// Type of a wildcard pattern.
    Placeholder,
    /// Pseudo-type of statements.
    Block,
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_) | Type::UntypedArray)
    }

    /// Equality used when a pattern type meets a scrutinee type: an array
    /// pattern whose element type could not be inferred fits any array.
    pub fn accepts_pattern(&self, pattern: &Type) -> bool {
        match (self, pattern) {
            (_, Type::Placeholder) => true,
            (Type::Array(_), Type::UntypedArray) => true,
            (Type::Array(expected), Type::Array(found)) => expected.accepts_pattern(found),
            _ => self == pattern,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::String => write!(f, "string"),
            Type::Array(element) => write!(f, "array<{element}>"),
            Type::UntypedArray => write!(f, "array<_>"),
            Type::Struct(def) => write!(f, "{}", def.name),
            Type::Enum(def) => write!(f, "{}", def.name),
            Type::Function(def) => write!(f, "{def}"),
            Type::Placeholder => write!(f, "_"),
            Type::Block => write!(f, "block"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StructType {
    pub name: String,
    pub members: IndexMap<String, Type>,
    pub span: Span,
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.members == other.members
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnumVariant {
    Simple(String),
    Tuple(String, Type),
}

impl EnumVariant {
    pub fn name(&self) -> &str {
        match self {
            EnumVariant::Simple(name) | EnumVariant::Tuple(name, _) => name,
        }
    }

    pub fn payload(&self) -> Option<&Type> {
        match self {
            EnumVariant::Simple(_) => None,
            EnumVariant::Tuple(_, inner) => Some(inner),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

impl EnumType {
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|variant| variant.name() == name)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.variants == other.variants
    }
}

/// Signature of a user function or builtin. `definition` is the span of the
/// declaring statement; two user functions with the same signature but
/// different declarations are distinct types, so a function value can never
/// be stored anywhere that outlives the scope it closes over.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub definition: Option<Span>,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        for (idx, param) in self.params.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}
