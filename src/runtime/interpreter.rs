use crate::language::{
    ast::{ArrayPatternItem, BinaryOp, UnaryOp},
    errors::CompilerError,
    span::Span,
    typed_ast::*,
};
use crate::runtime::{
    environment::RuntimeEnvironment,
    value::{ArrayValue, EnumValue, FunctionValue, StructValue, UserFunction, Value},
    RuntimeResult,
};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluates a checked program. Top-level bindings stay in `env`.
pub fn eval(program: &TypedProgram, env: &mut RuntimeEnvironment) -> RuntimeResult<Value> {
    Interpreter::new(env).eval_program(program)
}

enum Flow {
    Normal(Value),
    Return(Value, Span),
}

/// Nesting limit for user function calls. Deeper recursion fails with
/// [`CompilerError::RecursionLimit`] instead of exhausting the native stack.
pub const MAX_CALL_DEPTH: usize = 256;

pub struct Interpreter<'env> {
    env: &'env mut RuntimeEnvironment,
    call_depth: usize,
}

impl<'env> Interpreter<'env> {
    pub fn new(env: &'env mut RuntimeEnvironment) -> Self {
        Self { env, call_depth: 0 }
    }

    pub fn eval_program(&mut self, program: &TypedProgram) -> RuntimeResult<Value> {
        let mut last = Value::Unit;
        for statement in &program.statements {
            match self.eval_statement(statement)? {
                Flow::Normal(value) => last = value,
                Flow::Return(_, span) => {
                    return Err(CompilerError::internal("`return` escaped to top level", span))
                }
            }
        }
        Ok(match program.statements.last() {
            Some(TypedStatement {
                kind: TypedStatementKind::Expr(_),
                ..
            }) => last,
            _ => Value::Unit,
        })
    }

    fn scoped<T>(&mut self, run: impl FnOnce(&mut Self) -> RuntimeResult<T>) -> RuntimeResult<T> {
        self.env.push_scope();
        let result = run(self);
        self.env.pop_scope();
        result
    }

    fn eval_statements(&mut self, statements: &[TypedStatement]) -> RuntimeResult<Flow> {
        for statement in statements {
            if let Flow::Return(value, span) = self.eval_statement(statement)? {
                return Ok(Flow::Return(value, span));
            }
        }
        Ok(Flow::Normal(Value::Unit))
    }

    fn eval_block(&mut self, block: &TypedBlock) -> RuntimeResult<Flow> {
        self.scoped(|interpreter| interpreter.eval_statements(&block.statements))
    }

    fn eval_statement(&mut self, statement: &TypedStatement) -> RuntimeResult<Flow> {
        let span = statement.span;
        match &statement.kind {
            TypedStatementKind::Let { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.define(name.clone(), value);
            }
            TypedStatementKind::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                if !self.env.set(name, value) {
                    return Err(CompilerError::internal(
                        format!("assignment to unbound `{name}`"),
                        span,
                    ));
                }
            }
            TypedStatementKind::IndexAssign {
                target,
                index,
                value,
            } => {
                let array = self.eval_array(target)?;
                let index = self.eval_int(index)?;
                let value = self.eval_expr(value)?;
                let slot = checked_index(&array, index, span)?;
                array.set(slot, value);
            }
            TypedStatementKind::MemberAssign {
                target,
                member,
                value,
            } => {
                let instance = self.eval_struct(target)?;
                let value = self.eval_expr(value)?;
                if !instance.set(member, value) {
                    return Err(CompilerError::internal(
                        format!("struct has no member `{member}`"),
                        span,
                    ));
                }
            }
            TypedStatementKind::Print(expr) => {
                let value = self.eval_expr(expr)?;
                self.env
                    .write_line(&value.to_string())
                    .map_err(|err| CompilerError::OutputFailure {
                        message: err.to_string(),
                        span,
                    })?;
            }
            TypedStatementKind::If {
                branches,
                otherwise,
            } => {
                for branch in branches {
                    if self.eval_bool(&branch.condition)? {
                        return self.eval_block(&branch.body);
                    }
                }
                if let Some(block) = otherwise {
                    return self.eval_block(block);
                }
            }
            TypedStatementKind::While { condition, body } => {
                while self.eval_bool(condition)? {
                    if let flow @ Flow::Return(..) = self.eval_block(body)? {
                        return Ok(flow);
                    }
                }
            }
            TypedStatementKind::For {
                binding,
                iterable,
                body,
            } => match self.eval_expr(iterable)? {
                Value::Array(array) => {
                    for idx in 0..array.len() {
                        let Some(item) = array.get(idx) else { break };
                        if let flow @ Flow::Return(..) = self.eval_iteration(binding, item, body)? {
                            return Ok(flow);
                        }
                    }
                }
                Value::String(text) => {
                    for ch in text.chars() {
                        let item = Value::String(ch.to_string());
                        if let flow @ Flow::Return(..) = self.eval_iteration(binding, item, body)? {
                            return Ok(flow);
                        }
                    }
                }
                other => {
                    return Err(CompilerError::internal(
                        format!("cannot iterate over {}", other.type_name()),
                        iterable.span,
                    ))
                }
            },
            TypedStatementKind::ForRange {
                binding,
                start,
                end,
                body,
            } => {
                let start = self.eval_int(start)?;
                let end = self.eval_int(end)?;
                for current in start..end {
                    if let flow @ Flow::Return(..) =
                        self.eval_iteration(binding, Value::Int(current), body)?
                    {
                        return Ok(flow);
                    }
                }
            }
            TypedStatementKind::Struct(_) | TypedStatementKind::Enum(_) => {}
            TypedStatementKind::Function(def) => {
                let function = UserFunction {
                    def: def.clone(),
                    capture: self.env.capture(),
                };
                self.env.define(
                    def.name.clone(),
                    Value::Function(FunctionValue::User(Rc::new(function))),
                );
            }
            TypedStatementKind::Return(value) => {
                let value = self.eval_expr(value)?;
                return Ok(Flow::Return(value, span));
            }
            TypedStatementKind::Match { scrutinee, arms } => {
                let value = self.eval_expr(scrutinee)?;
                return match arms.iter().find(|arm| matches_pattern(&arm.pattern, &value)) {
                    Some(arm) => self.eval_block(&arm.body),
                    None => Err(CompilerError::internal(
                        format!("no case matched {value}"),
                        span,
                    )),
                };
            }
            TypedStatementKind::Expr(expr) => {
                return Ok(Flow::Normal(self.eval_expr(expr)?));
            }
        }
        Ok(Flow::Normal(Value::Unit))
    }

    fn eval_iteration(&mut self, binding: &str, item: Value, body: &TypedBlock) -> RuntimeResult<Flow> {
        self.scoped(|interpreter| {
            interpreter.env.define(binding, item);
            interpreter.eval_statements(&body.statements)
        })
    }

    fn eval_expr(&mut self, expr: &TypedExpr) -> RuntimeResult<Value> {
        let span = expr.span;
        match &expr.kind {
            TypedExprKind::Bool(value) => Ok(Value::Bool(*value)),
            TypedExprKind::Int(value) => Ok(Value::Int(*value)),
            TypedExprKind::String(value) => Ok(Value::String(value.clone())),
            TypedExprKind::Variable(name) => self.env.get(name).cloned().ok_or_else(|| {
                CompilerError::internal(format!("`{name}` is not bound at runtime"), span)
            }),
            TypedExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                eval_binary(*op, left, right, span)
            }
            TypedExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                match (op, operand) {
                    (UnaryOp::Plus, Value::Int(value)) => Ok(Value::Int(value)),
                    (UnaryOp::Minus, Value::Int(value)) => value
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| overflow(*op, span)),
                    (UnaryOp::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
                    (op, value) => Err(CompilerError::internal(
                        format!("operator `{op}` applied to {}", value.type_name()),
                        span,
                    )),
                }
            }
            TypedExprKind::Array(elements) => {
                let items = elements
                    .iter()
                    .map(|element| self.eval_expr(element))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::array(items))
            }
            TypedExprKind::Index { target, index } => {
                let array = self.eval_array(target)?;
                let index = self.eval_int(index)?;
                let slot = checked_index(&array, index, span)?;
                array.get(slot).ok_or_else(|| out_of_range(&array, index, span))
            }
            TypedExprKind::Call { callee, args } => {
                let function = match self.env.get(callee) {
                    Some(Value::Function(function)) => function.clone(),
                    _ => {
                        return Err(CompilerError::internal(
                            format!("`{callee}` is not a function at runtime"),
                            span,
                        ))
                    }
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval_expr(arg))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                self.call_function(&function, args, span)
            }
            TypedExprKind::StructInit {
                struct_type,
                members,
            } => {
                let mut provided = HashMap::with_capacity(members.len());
                for (name, value) in members {
                    provided.insert(name.as_str(), self.eval_expr(value)?);
                }
                let mut attrs = IndexMap::with_capacity(struct_type.members.len());
                for name in struct_type.members.keys() {
                    let value = provided.remove(name.as_str()).ok_or_else(|| {
                        CompilerError::internal(
                            format!("member `{name}` of {} was never initialised", struct_type.name),
                            span,
                        )
                    })?;
                    attrs.insert(name.clone(), value);
                }
                Ok(Value::Struct(StructValue::new(struct_type.name.clone(), attrs)))
            }
            TypedExprKind::Member { target, member } => {
                let instance = self.eval_struct(target)?;
                instance.get(member).ok_or_else(|| {
                    CompilerError::internal(format!("struct has no member `{member}`"), span)
                })
            }
            TypedExprKind::EnumLiteral {
                enum_type,
                variant,
                payload,
            } => {
                let payload = match payload {
                    Some(payload) => Some(Box::new(self.eval_expr(payload)?)),
                    None => None,
                };
                Ok(Value::Enum(EnumValue {
                    enum_name: enum_type.name.clone(),
                    variant: variant.clone(),
                    payload,
                }))
            }
        }
    }

    fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
        span: Span,
    ) -> RuntimeResult<Value> {
        match function {
            FunctionValue::Builtin(builtin) => builtin.call(&args, self.env, span),
            FunctionValue::User(user) => {
                if args.len() != user.def.params.len() {
                    return Err(CompilerError::internal(
                        format!("`{}` called with {} arguments", user.def.name, args.len()),
                        span,
                    ));
                }
                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(CompilerError::RecursionLimit {
                        function: user.def.name.clone(),
                        limit: MAX_CALL_DEPTH,
                        span,
                    });
                }
                self.env.push_call_scope(user.capture, span)?;
                self.call_depth += 1;
                self.env
                    .define(user.def.name.clone(), Value::Function(function.clone()));
                for (param, arg) in user.def.params.iter().zip(args) {
                    self.env.define(param.clone(), arg);
                }
                let flow = self.eval_statements(&user.def.body.statements);
                self.call_depth -= 1;
                self.env.pop_scope();
                match flow? {
                    Flow::Return(value, _) => Ok(value),
                    Flow::Normal(_) => Err(CompilerError::MissingReturn {
                        function: user.def.name.clone(),
                        span,
                    }),
                }
            }
        }
    }

    fn eval_bool(&mut self, expr: &TypedExpr) -> RuntimeResult<bool> {
        match self.eval_expr(expr)? {
            Value::Bool(value) => Ok(value),
            other => Err(unexpected_value("bool", &other, expr.span)),
        }
    }

    fn eval_int(&mut self, expr: &TypedExpr) -> RuntimeResult<i64> {
        match self.eval_expr(expr)? {
            Value::Int(value) => Ok(value),
            other => Err(unexpected_value("int", &other, expr.span)),
        }
    }

    fn eval_array(&mut self, expr: &TypedExpr) -> RuntimeResult<ArrayValue> {
        match self.eval_expr(expr)? {
            Value::Array(array) => Ok(array),
            other => Err(unexpected_value("array", &other, expr.span)),
        }
    }

    fn eval_struct(&mut self, expr: &TypedExpr) -> RuntimeResult<StructValue> {
        match self.eval_expr(expr)? {
            Value::Struct(instance) => Ok(instance),
            other => Err(unexpected_value("struct", &other, expr.span)),
        }
    }
}

fn unexpected_value(expected: &str, found: &Value, span: Span) -> CompilerError {
    CompilerError::internal(
        format!("expected {expected} at runtime but found {}", found.type_name()),
        span,
    )
}

fn out_of_range(array: &ArrayValue, index: i64, span: Span) -> CompilerError {
    CompilerError::IndexingOutOfRange {
        length: array.len(),
        index,
        span,
    }
}

fn checked_index(array: &ArrayValue, index: i64, span: Span) -> RuntimeResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|slot| *slot < array.len())
        .ok_or_else(|| out_of_range(array, index, span))
}

fn overflow(op: impl ToString, span: Span) -> CompilerError {
    CompilerError::IntegerOverflow {
        operator: op.to_string(),
        span,
    }
}

/// Integer division rounding toward negative infinity.
pub fn floor_div(left: i64, right: i64) -> Option<i64> {
    let quotient = left.checked_div(right)?;
    let remainder = left.wrapping_rem(right);
    if remainder != 0 && (remainder < 0) != (right < 0) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

/// Remainder whose sign follows the divisor.
pub fn floor_mod(left: i64, right: i64) -> Option<i64> {
    if right == 0 {
        return None;
    }
    let remainder = left.wrapping_rem(right);
    if remainder != 0 && (remainder < 0) != (right < 0) {
        Some(remainder + right)
    } else {
        Some(remainder)
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value, span: Span) -> RuntimeResult<Value> {
    let result = match (op, left, right) {
        (BinaryOp::Add, Value::String(left), Value::String(right)) => Value::String(left + &right),
        (BinaryOp::Add, Value::Int(left), Value::Int(right)) => {
            Value::Int(left.checked_add(right).ok_or_else(|| overflow(op, span))?)
        }
        (BinaryOp::Sub, Value::Int(left), Value::Int(right)) => {
            Value::Int(left.checked_sub(right).ok_or_else(|| overflow(op, span))?)
        }
        (BinaryOp::Mul, Value::Int(left), Value::Int(right)) => {
            Value::Int(left.checked_mul(right).ok_or_else(|| overflow(op, span))?)
        }
        (BinaryOp::Div | BinaryOp::Mod, Value::Int(_), Value::Int(0)) => {
            return Err(CompilerError::DivisionByZero { span })
        }
        (BinaryOp::Div, Value::Int(left), Value::Int(right)) => {
            Value::Int(floor_div(left, right).ok_or_else(|| overflow(op, span))?)
        }
        (BinaryOp::Mod, Value::Int(left), Value::Int(right)) => {
            Value::Int(floor_mod(left, right).ok_or_else(|| overflow(op, span))?)
        }
        (BinaryOp::Gt, Value::Int(left), Value::Int(right)) => Value::Bool(left > right),
        (BinaryOp::Lt, Value::Int(left), Value::Int(right)) => Value::Bool(left < right),
        (BinaryOp::Le, Value::Int(left), Value::Int(right)) => Value::Bool(left <= right),
        (BinaryOp::Ge, Value::Int(left), Value::Int(right)) => Value::Bool(left >= right),
        (BinaryOp::Eq, left, right) => Value::Bool(left == right),
        (BinaryOp::Ne, left, right) => Value::Bool(left != right),
        (BinaryOp::And, Value::Bool(left), Value::Bool(right)) => Value::Bool(left && right),
        (BinaryOp::Or, Value::Bool(left), Value::Bool(right)) => Value::Bool(left || right),
        (op, left, right) => {
            return Err(CompilerError::internal(
                format!(
                    "operator `{op}` applied to {} and {}",
                    left.type_name(),
                    right.type_name()
                ),
                span,
            ))
        }
    };
    Ok(result)
}

/// Runtime test of a checked pattern against a value.
pub fn matches_pattern(pattern: &TypedPattern, value: &Value) -> bool {
    match (&pattern.kind, value) {
        (TypedPatternKind::Wildcard, _) => true,
        (TypedPatternKind::Bool(expected), Value::Bool(actual)) => expected == actual,
        (TypedPatternKind::Array(items), Value::Array(array)) => {
            let elements = array.items.borrow();
            elements.len() == items.len()
                && items.iter().zip(elements.iter()).all(|(item, element)| match item {
                    ArrayPatternItem::Wildcard => true,
                    ArrayPatternItem::Int(expected) => *element == Value::Int(*expected),
                })
        }
        (
            TypedPatternKind::Enum {
                enum_type,
                variant,
                payload,
            },
            Value::Enum(actual),
        ) => {
            actual.enum_name == enum_type.name
                && actual.variant == *variant
                && match (payload, &actual.payload) {
                    (None, _) => true,
                    (Some(inner), Some(value)) => matches_pattern(inner, value),
                    (Some(_), None) => false,
                }
        }
        _ => false,
    }
}
