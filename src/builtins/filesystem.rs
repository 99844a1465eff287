//! File I/O: read, write, append. Every path resolves inside the
//! capability sandbox installed by the host; there is no ambient access.

use super::{namespace, text, with_sandbox};
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};

fn read(args: &[Value]) -> Result<Value, RuntimeError> {
    let path = text(&args[0]);
    with_sandbox(|sandbox| {
        sandbox
            .read(&path)
            .map(Value::Str)
            .map_err(|e| RuntimeError::io_error(e.to_string(), None))
    })
}

fn write(args: &[Value]) -> Result<Value, RuntimeError> {
    let path = text(&args[0]);
    let contents = text(&args[1]);
    with_sandbox(|sandbox| {
        sandbox
            .write(&path, &contents)
            .map(|_| Value::Null)
            .map_err(|e| RuntimeError::io_error(e.to_string(), None))
    })
}

fn append(args: &[Value]) -> Result<Value, RuntimeError> {
    let path = text(&args[0]);
    let contents = text(&args[1]);
    with_sandbox(|sandbox| {
        sandbox
            .append(&path, &contents)
            .map(|_| Value::Null)
            .map_err(|e| RuntimeError::io_error(e.to_string(), None))
    })
}

pub fn build() -> Value {
    namespace(vec![
        ("read", NativeFn::new("file.read", Some(1), read)),
        ("write", NativeFn::new("file.write", Some(2), write)),
        ("append", NativeFn::new("file.append", Some(2), append)),
    ])
}
