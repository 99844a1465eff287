//! JSON bridge: parse and stringify.
//!
//! Integers survive the round trip as integers; functions and natives do
//! not stringify.

use super::{namespace, text};
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};
use indexmap::IndexMap;

fn parse(args: &[Value]) -> Result<Value, RuntimeError> {
    let source = text(&args[0]);
    let parsed: serde_json::Value = serde_json::from_str(&source)
        .map_err(|e| RuntimeError::type_error(format!("json.parse: {e}"), None))?;
    Ok(from_json(&parsed))
}

fn stringify(args: &[Value]) -> Result<Value, RuntimeError> {
    let json = to_json(&args[0])?;
    Ok(Value::Str(json.to_string()))
}

fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut object = IndexMap::with_capacity(map.len());
            for (key, value) in map {
                object.insert(key.clone(), from_json(value));
            }
            Value::object(object)
        }
    }
}

fn to_json(value: &Value) -> Result<serde_json::Value, RuntimeError> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(i) => Ok(serde_json::Value::from(*i)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                RuntimeError::type_error("json.stringify: cannot stringify a non-finite number", None)
            }),
        Value::Str(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Array(items) => {
            let mut array = Vec::with_capacity(items.borrow().len());
            for item in items.borrow().iter() {
                array.push(to_json(item)?);
            }
            Ok(serde_json::Value::Array(array))
        }
        Value::Object(map) => {
            let mut object = serde_json::Map::with_capacity(map.borrow().len());
            for (key, value) in map.borrow().iter() {
                object.insert(key.clone(), to_json(value)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        Value::Function(_) | Value::Native(_) => Err(RuntimeError::type_error(
            "json.stringify: cannot stringify a function",
            None,
        )),
    }
}

pub fn build() -> Value {
    namespace(vec![
        ("parse", NativeFn::new("json.parse", Some(1), parse)),
        ("stringify", NativeFn::new("json.stringify", Some(1), stringify)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_document() {
        let parsed = parse(&[Value::Str(r#"{"a": 1, "b": [true, null], "c": 1.5}"#.into())])
            .expect("parse failed");
        let Value::Object(map) = &parsed else {
            panic!("expected object");
        };
        let map = map.borrow();
        assert_eq!(map.get("a"), Some(&Value::Int(1)));
        assert_eq!(map.get("c"), Some(&Value::Float(1.5)));
        let Some(Value::Array(items)) = map.get("b") else {
            panic!("expected array");
        };
        assert_eq!(items.borrow().as_slice(), [Value::Bool(true), Value::Null]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse(&[Value::Str("{nope".into())]).is_err());
    }

    #[test]
    fn test_stringify_preserves_insertion_order() {
        let mut map = IndexMap::new();
        map.insert("z".to_string(), Value::Int(1));
        map.insert("a".to_string(), Value::Str("two".into()));
        let out = stringify(&[Value::object(map)]).expect("stringify failed");
        assert_eq!(out, Value::Str(r#"{"z":1,"a":"two"}"#.into()));
    }

    #[test]
    fn test_round_trip_keeps_integers() {
        let out = stringify(&[Value::array(vec![Value::Int(3), Value::Float(3.5)])])
            .expect("stringify failed");
        let back = parse(&[out]).expect("parse failed");
        let Value::Array(items) = &back else {
            panic!("expected array");
        };
        assert_eq!(items.borrow().as_slice(), [Value::Int(3), Value::Float(3.5)]);
    }

    #[test]
    fn test_stringify_rejects_functions() {
        let native = Value::Native(crate::value::NativeFn::new("f", None, |_| Ok(Value::Null)));
        assert!(stringify(&[native]).is_err());
    }
}
