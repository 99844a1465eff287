//! String operations. Arguments are coerced through the default textual
//! rendering, and all indices count code points, not bytes.

use super::{array_arg, int_arg, namespace, text};
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};

fn length(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Int(text(&args[0]).chars().count() as i64))
}

fn char_at(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = text(&args[0]);
    let i = int_arg("string.charAt", args, 1)?;
    usize::try_from(i)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .map(|c| Value::Str(c.to_string()))
        .ok_or_else(|| {
            RuntimeError::index_error(format!("string.charAt: index {i} out of range"), None)
        })
}

fn upper(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Str(text(&args[0]).to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Str(text(&args[0]).to_lowercase()))
}

/// Slices by code-point positions; negative indices count from the end.
fn slice(args: &[Value]) -> Result<Value, RuntimeError> {
    let chars: Vec<char> = text(&args[0]).chars().collect();
    let start = resolve_bound(int_arg("string.slice", args, 1)?, chars.len());
    let end = resolve_bound(int_arg("string.slice", args, 2)?, chars.len());
    if start >= end {
        return Ok(Value::Str(String::new()));
    }
    Ok(Value::Str(chars[start..end].iter().collect()))
}

fn resolve_bound(i: i64, len: usize) -> usize {
    if i < 0 {
        (len as i64 + i).max(0) as usize
    } else {
        (i as usize).min(len)
    }
}

fn split(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = text(&args[0]);
    let separator = text(&args[1]);
    if separator.is_empty() {
        return Err(RuntimeError::type_error(
            "string.split: separator must not be empty",
            None,
        ));
    }
    let parts = s
        .split(&separator)
        .map(|part| Value::Str(part.to_string()))
        .collect();
    Ok(Value::array(parts))
}

fn join(args: &[Value]) -> Result<Value, RuntimeError> {
    let items = array_arg("string.join", args, 0)?;
    let separator = text(&args[1]);
    let joined = items
        .borrow()
        .iter()
        .map(text)
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(Value::Str(joined))
}

fn index_of(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = text(&args[0]);
    let needle = text(&args[1]);
    match s.find(&needle) {
        Some(byte) => Ok(Value::Int(s[..byte].chars().count() as i64)),
        None => Ok(Value::Int(-1)),
    }
}

fn code_point_at(args: &[Value]) -> Result<Value, RuntimeError> {
    let s = text(&args[0]);
    let i = int_arg("string.codePointAt", args, 1)?;
    usize::try_from(i)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .map(|c| Value::Int(i64::from(u32::from(c))))
        .ok_or_else(|| {
            RuntimeError::index_error(format!("string.codePointAt: index {i} out of range"), None)
        })
}

pub fn build() -> Value {
    namespace(vec![
        ("length", NativeFn::new("string.length", Some(1), length)),
        ("charAt", NativeFn::new("string.charAt", Some(2), char_at)),
        ("upper", NativeFn::new("string.upper", Some(1), upper)),
        ("lower", NativeFn::new("string.lower", Some(1), lower)),
        ("slice", NativeFn::new("string.slice", Some(3), slice)),
        ("split", NativeFn::new("string.split", Some(2), split)),
        ("join", NativeFn::new("string.join", Some(2), join)),
        ("indexOf", NativeFn::new("string.indexOf", Some(2), index_of)),
        (
            "codePointAt",
            NativeFn::new("string.codePointAt", Some(2), code_point_at),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[test]
    fn test_length_counts_code_points() {
        assert_eq!(length(&[s("héllo")]).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_length_coerces_non_strings() {
        assert_eq!(length(&[Value::Int(123)]).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_char_at() {
        assert_eq!(char_at(&[s("abc"), Value::Int(1)]).unwrap(), s("b"));
        assert!(char_at(&[s("abc"), Value::Int(3)]).is_err());
        assert!(char_at(&[s("abc"), Value::Int(-1)]).is_err());
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(upper(&[s("brew")]).unwrap(), s("BREW"));
        assert_eq!(lower(&[s("BREW")]).unwrap(), s("brew"));
    }

    #[test]
    fn test_slice_with_negative_bounds() {
        assert_eq!(slice(&[s("hello"), Value::Int(1), Value::Int(3)]).unwrap(), s("el"));
        assert_eq!(slice(&[s("hello"), Value::Int(-3), Value::Int(5)]).unwrap(), s("llo"));
        assert_eq!(slice(&[s("hello"), Value::Int(3), Value::Int(1)]).unwrap(), s(""));
        assert_eq!(slice(&[s("hello"), Value::Int(0), Value::Int(99)]).unwrap(), s("hello"));
    }

    #[test]
    fn test_split_and_join() {
        let parts = split(&[s("a,b,c"), s(",")]).unwrap();
        let Value::Array(items) = &parts else {
            panic!("expected array");
        };
        assert_eq!(items.borrow().len(), 3);
        assert_eq!(join(&[parts.clone(), s("-")]).unwrap(), s("a-b-c"));
    }

    #[test]
    fn test_split_rejects_empty_separator() {
        assert!(split(&[s("abc"), s("")]).is_err());
    }

    #[test]
    fn test_join_renders_non_string_items() {
        let items = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(join(&[items, s("+")]).unwrap(), s("1+2"));
    }

    #[test]
    fn test_index_of_counts_code_points() {
        assert_eq!(index_of(&[s("héllo"), s("llo")]).unwrap(), Value::Int(2));
        assert_eq!(index_of(&[s("abc"), s("z")]).unwrap(), Value::Int(-1));
    }

    #[test]
    fn test_code_point_at() {
        assert_eq!(code_point_at(&[s("A"), Value::Int(0)]).unwrap(), Value::Int(65));
        assert!(code_point_at(&[s("A"), Value::Int(1)]).is_err());
    }
}
