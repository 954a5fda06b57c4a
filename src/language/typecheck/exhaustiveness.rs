//! Coverage tracking for `match` arms.
//!
//! A [`Matcher`] is built from the scrutinee type and fed every arm's
//! pattern in order. Adding a pattern that an earlier arm already covers
//! fails with `DuplicatedCase`; once all arms are in, [`Matcher::remaining`]
//! lists representative values no arm handles.

use crate::language::{
    ast::ArrayPatternItem,
    errors::CompilerError,
    span::Span,
    typed_ast::{TypedPattern, TypedPatternKind},
    types::{EnumType, EnumVariant, Type},
};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum Matcher {
    Bool(BoolMatcher),
    Enum(EnumMatcher),
    /// Domains only a wildcard can exhaust: arrays and payloads of
    /// non-enumerable types.
    Open(OpenMatcher),
}

impl Matcher {
    /// Matcher for a `match` scrutinee. Only booleans, enums and integer
    /// arrays can be matched on.
    pub fn for_scrutinee(ty: &Type, span: Span) -> Result<Matcher, CompilerError> {
        match ty {
            Type::Bool | Type::Enum(_) => Ok(Matcher::for_type(ty)),
            Type::Array(element) if **element == Type::Int => Ok(Matcher::for_type(ty)),
            other => Err(CompilerError::internal(
                format!("cannot match on a value of type {other}"),
                span,
            )),
        }
    }

    fn for_type(ty: &Type) -> Matcher {
        match ty {
            Type::Bool => Matcher::Bool(BoolMatcher::default()),
            Type::Enum(def) => Matcher::Enum(EnumMatcher::new(def.clone())),
            _ => Matcher::Open(OpenMatcher::default()),
        }
    }

    pub fn add_case(&mut self, pattern: &TypedPattern) -> Result<(), CompilerError> {
        match self {
            Matcher::Bool(matcher) => matcher.add_case(pattern),
            Matcher::Enum(matcher) => matcher.add_case(pattern),
            Matcher::Open(matcher) => matcher.add_case(pattern),
        }
    }

    pub fn remaining(&self) -> Vec<String> {
        match self {
            Matcher::Bool(matcher) => matcher.remaining(),
            Matcher::Enum(matcher) => matcher.remaining(),
            Matcher::Open(matcher) => matcher.remaining(),
        }
    }

    pub fn is_exhaustive(&self) -> bool {
        self.remaining().is_empty()
    }
}

fn duplicated(pattern: &TypedPattern, previous_span: Span) -> CompilerError {
    CompilerError::DuplicatedCase {
        span: pattern.span,
        previous_span,
    }
}

fn unexpected_pattern(pattern: &TypedPattern, expected: &str) -> CompilerError {
    CompilerError::internal(
        format!("{expected} matcher received a pattern of type {}", pattern.ty),
        pattern.span,
    )
}

#[derive(Clone, Debug, Default)]
pub struct BoolMatcher {
    on_true: Option<Span>,
    on_false: Option<Span>,
    wildcard: Option<Span>,
}

impl BoolMatcher {
    fn add_case(&mut self, pattern: &TypedPattern) -> Result<(), CompilerError> {
        if let Some(previous) = self.wildcard {
            return Err(duplicated(pattern, previous));
        }
        let slot = match pattern.kind {
            TypedPatternKind::Bool(true) => &mut self.on_true,
            TypedPatternKind::Bool(false) => &mut self.on_false,
            TypedPatternKind::Wildcard => &mut self.wildcard,
            _ => return Err(unexpected_pattern(pattern, "bool")),
        };
        if let Some(previous) = slot {
            return Err(duplicated(pattern, *previous));
        }
        *slot = Some(pattern.span);
        Ok(())
    }

    fn remaining(&self) -> Vec<String> {
        if self.wildcard.is_some() {
            return Vec::new();
        }
        let mut remaining = Vec::new();
        if self.on_true.is_none() {
            remaining.push("true".to_string());
        }
        if self.on_false.is_none() {
            remaining.push("false".to_string());
        }
        remaining
    }
}

#[derive(Clone, Debug)]
enum VariantCoverage {
    Simple(Span),
    Tuple(Box<Matcher>),
}

#[derive(Clone, Debug)]
pub struct EnumMatcher {
    def: Arc<EnumType>,
    wildcard: Option<Span>,
    variants: IndexMap<String, VariantCoverage>,
}

impl EnumMatcher {
    fn new(def: Arc<EnumType>) -> Self {
        Self {
            def,
            wildcard: None,
            variants: IndexMap::new(),
        }
    }

    fn add_case(&mut self, pattern: &TypedPattern) -> Result<(), CompilerError> {
        if let Some(previous) = self.wildcard {
            return Err(duplicated(pattern, previous));
        }
        let (variant, payload) = match &pattern.kind {
            TypedPatternKind::Wildcard => {
                self.wildcard = Some(pattern.span);
                return Ok(());
            }
            TypedPatternKind::Enum {
                variant, payload, ..
            } => (variant, payload),
            _ => return Err(unexpected_pattern(pattern, "enum")),
        };
        let declared = self.def.variant(variant).ok_or_else(|| {
            CompilerError::internal(
                format!("{} has no variant {variant}", self.def.name),
                pattern.span,
            )
        })?;

        match (declared, payload) {
            (EnumVariant::Simple(_), None) => {
                if let Some(VariantCoverage::Simple(previous)) = self.variants.get(variant) {
                    return Err(duplicated(pattern, *previous));
                }
                self.variants
                    .insert(variant.clone(), VariantCoverage::Simple(pattern.span));
                Ok(())
            }
            (EnumVariant::Tuple(_, inner_type), Some(inner)) => {
                let coverage = self
                    .variants
                    .entry(variant.clone())
                    .or_insert_with(|| VariantCoverage::Tuple(Box::new(Matcher::for_type(inner_type))));
                match coverage {
                    VariantCoverage::Tuple(matcher) => matcher.add_case(inner),
                    VariantCoverage::Simple(_) => Err(unexpected_pattern(pattern, "enum")),
                }
            }
            _ => Err(CompilerError::internal(
                format!("payload shape of {}::{variant} was not checked", self.def.name),
                pattern.span,
            )),
        }
    }

    fn remaining(&self) -> Vec<String> {
        if self.wildcard.is_some() {
            return Vec::new();
        }
        let mut remaining = Vec::new();
        for variant in &self.def.variants {
            let name = variant.name();
            match (variant, self.variants.get(name)) {
                (EnumVariant::Simple(_), None) => {
                    remaining.push(format!("{}::{name}", self.def.name));
                }
                (EnumVariant::Tuple(..), None) => {
                    remaining.push(format!("{}::{name}(_)", self.def.name));
                }
                (_, Some(VariantCoverage::Tuple(matcher))) => {
                    for rest in matcher.remaining() {
                        remaining.push(format!("{}::{name}({rest})", self.def.name));
                    }
                }
                (_, Some(VariantCoverage::Simple(_))) => {}
            }
        }
        remaining
    }
}

#[derive(Clone, Debug, Default)]
pub struct OpenMatcher {
    wildcard: Option<Span>,
    shapes: Vec<(Vec<ArrayPatternItem>, Span)>,
}

impl OpenMatcher {
    fn add_case(&mut self, pattern: &TypedPattern) -> Result<(), CompilerError> {
        if let Some(previous) = self.wildcard {
            return Err(duplicated(pattern, previous));
        }
        match &pattern.kind {
            TypedPatternKind::Wildcard => {
                self.wildcard = Some(pattern.span);
                Ok(())
            }
            TypedPatternKind::Array(items) => {
                if let Some((_, previous)) = self.shapes.iter().find(|(shape, _)| shape == items) {
                    return Err(duplicated(pattern, *previous));
                }
                self.shapes.push((items.clone(), pattern.span));
                Ok(())
            }
            _ => Err(unexpected_pattern(pattern, "array")),
        }
    }

    fn remaining(&self) -> Vec<String> {
        if self.wildcard.is_some() {
            Vec::new()
        } else {
            vec!["_".to_string()]
        }
    }
}
