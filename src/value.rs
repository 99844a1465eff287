// ABOUTME: Runtime value representation shared by the evaluator and built-ins

use crate::ast::Stmt;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::lexer::Span;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A runtime value. Arrays and objects are shared mutable heap cells:
/// cloning a `Value` clones the handle, not the contents.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<FunctionValue>),
    Native(NativeFn),
}

/// A user-defined function: parameters, body, and the environment captured
/// at the point the `function` expression was evaluated.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub closure: Rc<Environment>,
    pub span: Span,
}

/// A host-implemented callable. `arity` of `None` means variadic.
#[derive(Clone)]
pub struct NativeFn {
    pub name: String,
    pub arity: Option<usize>,
    func: Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>,
}

impl NativeFn {
    pub fn new(
        name: impl Into<String>,
        arity: Option<usize>,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        NativeFn {
            name: name.into(),
            arity,
            func: Rc::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        if let Some(expected) = self.arity {
            if args.len() != expected {
                return Err(RuntimeError::arity_error(
                    format!(
                        "Native '{}' expected {} args, got {}",
                        self.name,
                        expected,
                        args.len()
                    ),
                    None,
                ));
            }
        }
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(map: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Native(_) => "native function",
        }
    }

    /// Null, false, zero, and the empty string are falsy; everything else,
    /// including empty arrays and objects, is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }
}

/// Primitives compare by value (int and float numerically); arrays,
/// objects, and functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(&a.func, &b.func),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => {
                write!(f, "<function {}>", func.name.as_deref().unwrap_or("anonymous"))
            }
            Value::Native(native) => write!(f, "<native {}>", native.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn test_container_display() {
        let array = Value::array(vec![Value::Int(1), Value::Str("a".into()), Value::Null]);
        assert_eq!(array.to_string(), "[1, a, null]");

        let mut map = IndexMap::new();
        map.insert("x".to_string(), Value::Int(1));
        map.insert("y".to_string(), Value::Bool(true));
        assert_eq!(Value::object(map).to_string(), "{x: 1, y: true}");
    }

    #[test]
    fn test_numeric_equality_crosses_kinds() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(1.0), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Float(1.5));
    }

    #[test]
    fn test_arrays_compare_by_identity() {
        let a = Value::array(vec![Value::Int(1)]);
        let b = Value::array(vec![Value::Int(1)]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Bool(false).truthy());
        assert!(!Value::Int(0).truthy());
        assert!(!Value::Float(0.0).truthy());
        assert!(!Value::Str(String::new()).truthy());

        assert!(Value::Int(-1).truthy());
        assert!(Value::Str(" ".into()).truthy());
        assert!(Value::array(vec![]).truthy());
        assert!(Value::object(IndexMap::new()).truthy());
    }

    #[test]
    fn test_native_arity_check() {
        let native = NativeFn::new("probe", Some(1), |args| Ok(args[0].clone()));
        assert!(native.call(&[]).is_err());
        assert_eq!(native.call(&[Value::Int(7)]).unwrap(), Value::Int(7));
    }
}
