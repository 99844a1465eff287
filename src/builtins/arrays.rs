//! Array helpers that take the array as their first argument. The
//! synthetic `push`/`pop`/`length` members live in the evaluator; these
//! cover what member syntax cannot express.

use super::{array_arg, namespace};
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};

fn length(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = array_arg("array.length", args, 0)?;
    let len = items.borrow().len();
    Ok(Value::Int(len as i64))
}

fn contains(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = array_arg("array.contains", args, 0)?;
    let found = items.borrow().iter().any(|item| item == &args[1]);
    Ok(Value::Bool(found))
}

fn shift(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = array_arg("array.shift", args, 0)?;
    let mut items = items.borrow_mut();
    if items.is_empty() {
        return Ok(Value::Null);
    }
    Ok(items.remove(0))
}

pub fn build() -> Value {
    namespace(vec![
        ("length", NativeFn::new("array.length", Some(1), length)),
        ("contains", NativeFn::new("array.contains", Some(2), contains)),
        ("shift", NativeFn::new("array.shift", Some(1), shift)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        let arr = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(length(&[arr]).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_length_rejects_non_arrays() {
        assert!(length(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_contains_uses_value_equality() {
        let arr = Value::array(vec![Value::Int(1), Value::Str("x".into())]);
        assert_eq!(contains(&[arr.clone(), Value::Float(1.0)]).unwrap(), Value::Bool(true));
        assert_eq!(contains(&[arr.clone(), Value::Str("x".into())]).unwrap(), Value::Bool(true));
        assert_eq!(contains(&[arr, Value::Int(2)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_shift_removes_from_the_front() {
        let arr = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(shift(&[arr.clone()]).unwrap(), Value::Int(1));
        assert_eq!(length(&[arr]).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_shift_on_empty_yields_null() {
        let arr = Value::array(vec![]);
        assert_eq!(shift(&[arr]).unwrap(), Value::Null);
    }
}
