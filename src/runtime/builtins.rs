use crate::language::{
    errors::CompilerError,
    span::Span,
    types::{FunctionType, Type},
};
use crate::runtime::{environment::RuntimeEnvironment, value::Value, RuntimeResult};
use std::rc::Rc;

/// Host-implemented function. The checker sees [`Builtin::signature`]; the
/// evaluator only calls it with arguments of those types.
pub trait Builtin {
    fn name(&self) -> &str;

    fn signature(&self) -> FunctionType;

    fn call(&self, args: &[Value], env: &mut RuntimeEnvironment, span: Span)
        -> RuntimeResult<Value>;
}

fn signature(name: &str, params: Vec<Type>, return_type: Type) -> FunctionType {
    FunctionType {
        name: name.to_string(),
        params,
        return_type,
        definition: None,
    }
}

fn bad_arguments(name: &str, args: &[Value], span: Span) -> CompilerError {
    let received: Vec<&str> = args.iter().map(Value::type_name).collect();
    CompilerError::internal(
        format!("builtin `{name}` received ({})", received.join(", ")),
        span,
    )
}

/// `sum(int, int) -> int`
pub struct Sum;

impl Builtin for Sum {
    fn name(&self) -> &str {
        "sum"
    }

    fn signature(&self) -> FunctionType {
        signature("sum", vec![Type::Int, Type::Int], Type::Int)
    }

    fn call(&self, args: &[Value], _env: &mut RuntimeEnvironment, span: Span) -> RuntimeResult<Value> {
        match args {
            [Value::Int(a), Value::Int(b)] => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| CompilerError::IntegerOverflow {
                    operator: "sum".into(),
                    span,
                }),
            _ => Err(bad_arguments(self.name(), args, span)),
        }
    }
}

/// `len(array<int>) -> int`
pub struct Len;

impl Builtin for Len {
    fn name(&self) -> &str {
        "len"
    }

    fn signature(&self) -> FunctionType {
        signature("len", vec![Type::array(Type::Int)], Type::Int)
    }

    fn call(&self, args: &[Value], _env: &mut RuntimeEnvironment, span: Span) -> RuntimeResult<Value> {
        match args {
            [Value::Array(array)] => i64::try_from(array.len())
                .map(Value::Int)
                .map_err(|_| CompilerError::IntegerOverflow {
                    operator: "len".into(),
                    span,
                }),
            _ => Err(bad_arguments(self.name(), args, span)),
        }
    }
}

/// Builtins a host may opt into.
pub fn prelude() -> Vec<Rc<dyn Builtin>> {
    vec![Rc::new(Sum), Rc::new(Len)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_adds_two_ints() {
        let mut env = RuntimeEnvironment::new();
        let result = Sum
            .call(&[Value::Int(3), Value::Int(4)], &mut env, Span::default())
            .unwrap();
        assert_eq!(result, Value::Int(7));
    }

    #[test]
    fn sum_reports_overflow() {
        let mut env = RuntimeEnvironment::new();
        let err = Sum
            .call(&[Value::Int(i64::MAX), Value::Int(1)], &mut env, Span::default())
            .unwrap_err();
        assert_eq!(err.kind(), "IntegerOverflow");
    }

    #[test]
    fn len_counts_elements() {
        let mut env = RuntimeEnvironment::new();
        let array = Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(
            Len.call(&[array], &mut env, Span::default()).unwrap(),
            Value::Int(3)
        );
        assert_eq!(Len.signature().params, vec![Type::array(Type::Int)]);
    }
}
