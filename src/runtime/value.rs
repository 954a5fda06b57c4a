use crate::language::typed_ast::TypedFunction;
use crate::runtime::{builtins::Builtin, environment::Capture};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    String(String),
    Array(ArrayValue),
    Struct(StructValue),
    Enum(EnumValue),
    Function(FunctionValue),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::from_vec(items))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Enum(_) => "enum",
            Value::Function(_) => "function",
        }
    }

    /// Display form used inside containers, where strings are quoted.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(text) => write!(f, "{text:?}"),
            other => write!(f, "{other}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Array(array) => write!(f, "{array}"),
            Value::Struct(instance) => write!(f, "{}", instance.cell.borrow()),
            Value::Enum(value) => write!(f, "{value}"),
            Value::Function(function) => write!(f, "<fn {}>", function.name()),
        }
    }
}

/// Shared, mutable element storage. Clones alias the same array.
#[derive(Clone, Debug, Default)]
pub struct ArrayValue {
    pub items: Rc<RefCell<Vec<Value>>>,
}

impl ArrayValue {
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Replaces the element at `index`; returns `false` when out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.items.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.items, &other.items) || *self.items.borrow() == *other.items.borrow()
    }
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, value) in self.items.borrow().iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            value.fmt_nested(f)?;
        }
        write!(f, "]")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructInstance {
    pub name: String,
    pub attrs: IndexMap<String, Value>,
}

impl fmt::Display for StructInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (idx, (name, value)) in self.attrs.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, " {name}: ")?;
            value.fmt_nested(f)?;
        }
        if self.attrs.is_empty() {
            write!(f, "}}")
        } else {
            write!(f, " }}")
        }
    }
}

/// Struct instance shared by reference: member assignment through any
/// holder is visible to all of them.
#[derive(Clone, Debug)]
pub struct StructValue {
    pub cell: Rc<RefCell<StructInstance>>,
}

impl StructValue {
    pub fn new(name: impl Into<String>, attrs: IndexMap<String, Value>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(StructInstance {
                name: name.into(),
                attrs,
            })),
        }
    }

    pub fn get(&self, member: &str) -> Option<Value> {
        self.cell.borrow().attrs.get(member).cloned()
    }

    /// Overwrites an existing member; returns `false` for unknown names.
    pub fn set(&self, member: &str, value: Value) -> bool {
        match self.cell.borrow_mut().attrs.get_mut(member) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell) || *self.cell.borrow() == *other.cell.borrow()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    pub enum_name: String,
    pub variant: String,
    pub payload: Option<Box<Value>>,
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.enum_name, self.variant)?;
        if let Some(payload) = &self.payload {
            write!(f, "(")?;
            payload.fmt_nested(f)?;
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct UserFunction {
    pub def: Rc<TypedFunction>,
    pub capture: Capture,
}

#[derive(Clone)]
pub enum FunctionValue {
    User(Rc<UserFunction>),
    Builtin(Rc<dyn Builtin>),
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        match self {
            FunctionValue::User(function) => &function.def.name,
            FunctionValue::Builtin(builtin) => builtin.name(),
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionValue::User(function) => f
                .debug_struct("User")
                .field("name", &function.def.name)
                .field("capture", &function.capture)
                .finish(),
            FunctionValue::Builtin(builtin) => {
                f.debug_tuple("Builtin").field(&builtin.name()).finish()
            }
        }
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionValue::User(a), FunctionValue::User(b)) => Rc::ptr_eq(a, b),
            (FunctionValue::Builtin(a), FunctionValue::Builtin(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}
