//! Random helpers: int, pick, char.

use super::{array_arg, int_arg, namespace, text};
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};
use rand::Rng;

fn int(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut lo = int_arg("random.int", args, 0)?;
    let mut hi = int_arg("random.int", args, 1)?;
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
    }
    Ok(Value::Int(rand::thread_rng().gen_range(lo..=hi)))
}

fn pick(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = array_arg("random.pick", args, 0)?;
    let items = items.borrow();
    if items.is_empty() {
        return Err(RuntimeError::index_error(
            "random.pick called with empty array",
            None,
        ));
    }
    let index = rand::thread_rng().gen_range(0..items.len());
    Ok(items[index].clone())
}

fn char(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut lo = single_code_point("random.char", &args[0])?;
    let mut hi = single_code_point("random.char", &args[1])?;
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
    }
    let point = rand::thread_rng().gen_range(lo..=hi);
    char::from_u32(point)
        .map(|c| Value::Str(c.to_string()))
        .ok_or_else(|| {
            RuntimeError::type_error("random.char: range contains invalid code points", None)
        })
}

fn single_code_point(func: &str, value: &Value) -> Result<u32, RuntimeError> {
    let s = text(value);
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(u32::from(c)),
        _ => Err(RuntimeError::type_error(
            format!("{func} expects single-character strings"),
            None,
        )),
    }
}

pub fn build() -> Value {
    namespace(vec![
        ("int", NativeFn::new("random.int", Some(2), int)),
        ("pick", NativeFn::new("random.pick", Some(1), pick)),
        ("char", NativeFn::new("random.char", Some(2), char)),
    ])
}
