//! Deferred-task and sleep helpers: thread.run, thread.sleep, and the
//! top-level pauseExecution.
//!
//! Runtime values are intentionally single-threaded (`Rc`-based), so
//! `thread.run` executes its task to completion on the interpreter thread
//! and hands back an already-settled handle with the same shape a real
//! scheduler would return: `{ done, result, error, join }`.

use super::{int_arg, namespace};
use crate::error::RuntimeError;
use crate::eval::call_value;
use crate::value::{NativeFn, Value};
use indexmap::IndexMap;
use std::time::Duration;

fn run(args: &[Value]) -> Result<Value, RuntimeError> {
    let task = &args[0];
    if !matches!(task, Value::Function(_) | Value::Native(_)) {
        return Err(RuntimeError::type_error(
            "thread.run expects a function",
            None,
        ));
    }
    let (result, error) = match call_value(task, &[], None) {
        Ok(value) => (value, Value::Null),
        Err(e) => (Value::Null, Value::Str(e.to_string())),
    };

    let mut handle = IndexMap::new();
    handle.insert("done".to_string(), Value::Bool(true));
    handle.insert("result".to_string(), result.clone());
    handle.insert("error".to_string(), error);
    let join = NativeFn::new("thread.join", Some(0), move |_| Ok(result.clone()));
    handle.insert("join".to_string(), Value::Native(join));
    Ok(Value::object(handle))
}

fn sleep(args: &[Value]) -> Result<Value, RuntimeError> {
    std::thread::sleep(millis("thread.sleep", args)?);
    Ok(Value::Null)
}

pub fn pause_execution(args: &[Value]) -> Result<Value, RuntimeError> {
    std::thread::sleep(millis("pauseExecution", args)?);
    Ok(Value::Null)
}

fn millis(func: &str, args: &[Value]) -> Result<Duration, RuntimeError> {
    let ms = int_arg(func, args, 0)?.max(0) as u64;
    Ok(Duration::from_millis(ms))
}

pub fn build() -> Value {
    namespace(vec![
        ("run", NativeFn::new("thread.run", Some(1), run)),
        ("sleep", NativeFn::new("thread.sleep", Some(1), sleep)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(object: &Value, name: &str) -> Value {
        let Value::Object(map) = object else {
            panic!("expected object");
        };
        let value = map.borrow().get(name).cloned();
        value.unwrap_or_else(|| panic!("field {name} missing"))
    }

    #[test]
    fn test_run_returns_a_settled_handle() {
        let task = Value::Native(NativeFn::new("task", Some(0), |_| Ok(Value::Int(21))));
        let handle = run(&[task]).unwrap();
        assert_eq!(field(&handle, "done"), Value::Bool(true));
        assert_eq!(field(&handle, "result"), Value::Int(21));
        assert_eq!(field(&handle, "error"), Value::Null);
        let Value::Native(join) = field(&handle, "join") else {
            panic!("expected join to be callable");
        };
        assert_eq!(join.call(&[]).unwrap(), Value::Int(21));
    }

    #[test]
    fn test_run_captures_task_errors() {
        let task = Value::Native(NativeFn::new("task", Some(0), |_| {
            Err(RuntimeError::type_error("nope", None))
        }));
        let handle = run(&[task]).unwrap();
        assert_eq!(field(&handle, "result"), Value::Null);
        assert_eq!(field(&handle, "error"), Value::Str("nope".into()));
    }

    #[test]
    fn test_run_rejects_non_callables() {
        assert!(run(&[Value::Int(1)]).is_err());
    }
}
