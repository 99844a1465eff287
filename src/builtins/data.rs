//! Data-structure factories: queue, stack, set, map.
//!
//! Each factory returns an object of closures over one shared interior
//! cell, so every handle to the structure observes the same state.

use super::{namespace, text};
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

fn queue(_args: &[Value]) -> Result<Value, RuntimeError> {
    let items: Rc<RefCell<VecDeque<Value>>> = Rc::new(RefCell::new(VecDeque::new()));
    let push = {
        let items = items.clone();
        NativeFn::new("queue.push", Some(1), move |args| {
            items.borrow_mut().push_back(args[0].clone());
            Ok(Value::Null)
        })
    };
    let pop = {
        let items = items.clone();
        NativeFn::new("queue.pop", Some(0), move |_| {
            Ok(items.borrow_mut().pop_front().unwrap_or(Value::Null))
        })
    };
    let peek = {
        let items = items.clone();
        NativeFn::new("queue.peek", Some(0), move |_| {
            Ok(items.borrow().front().cloned().unwrap_or(Value::Null))
        })
    };
    let size = {
        let items = items.clone();
        NativeFn::new("queue.size", Some(0), move |_| {
            let len = items.borrow().len();
            Ok(Value::Int(len as i64))
        })
    };
    Ok(namespace(vec![
        ("push", push),
        ("pop", pop),
        ("peek", peek),
        ("size", size),
    ]))
}

fn stack(_args: &[Value]) -> Result<Value, RuntimeError> {
    let items: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
    let push = {
        let items = items.clone();
        NativeFn::new("stack.push", Some(1), move |args| {
            items.borrow_mut().push(args[0].clone());
            Ok(Value::Null)
        })
    };
    let pop = {
        let items = items.clone();
        NativeFn::new("stack.pop", Some(0), move |_| {
            Ok(items.borrow_mut().pop().unwrap_or(Value::Null))
        })
    };
    let peek = {
        let items = items.clone();
        NativeFn::new("stack.peek", Some(0), move |_| {
            Ok(items.borrow().last().cloned().unwrap_or(Value::Null))
        })
    };
    let size = {
        let items = items.clone();
        NativeFn::new("stack.size", Some(0), move |_| {
            let len = items.borrow().len();
            Ok(Value::Int(len as i64))
        })
    };
    Ok(namespace(vec![
        ("push", push),
        ("pop", pop),
        ("peek", peek),
        ("size", size),
    ]))
}

/// Membership uses the language's value equality, so `1` and `1.0`
/// collapse to one element.
fn set(args: &[Value]) -> Result<Value, RuntimeError> {
    let items: Rc<RefCell<Vec<Value>>> = Rc::new(RefCell::new(Vec::new()));
    for item in args {
        let mut items = items.borrow_mut();
        if !items.contains(item) {
            items.push(item.clone());
        }
    }
    let add = {
        let items = items.clone();
        NativeFn::new("set.add", Some(1), move |args| {
            let mut items = items.borrow_mut();
            if !items.contains(&args[0]) {
                items.push(args[0].clone());
            }
            Ok(Value::Null)
        })
    };
    let has = {
        let items = items.clone();
        NativeFn::new("set.has", Some(1), move |args| {
            Ok(Value::Bool(items.borrow().contains(&args[0])))
        })
    };
    let delete = {
        let items = items.clone();
        NativeFn::new("set.delete", Some(1), move |args| {
            items.borrow_mut().retain(|item| item != &args[0]);
            Ok(Value::Null)
        })
    };
    let size = {
        let items = items.clone();
        NativeFn::new("set.size", Some(0), move |_| {
            let len = items.borrow().len();
            Ok(Value::Int(len as i64))
        })
    };
    let values = {
        let items = items.clone();
        NativeFn::new("set.values", Some(0), move |_| {
            Ok(Value::array(items.borrow().clone()))
        })
    };
    Ok(namespace(vec![
        ("add", add),
        ("has", has),
        ("delete", delete),
        ("size", size),
        ("values", values),
    ]))
}

fn map(_args: &[Value]) -> Result<Value, RuntimeError> {
    let entries: Rc<RefCell<IndexMap<String, Value>>> = Rc::new(RefCell::new(IndexMap::new()));
    let set_entry = {
        let entries = entries.clone();
        NativeFn::new("map.set", Some(2), move |args| {
            entries.borrow_mut().insert(text(&args[0]), args[1].clone());
            Ok(Value::Null)
        })
    };
    let get = {
        let entries = entries.clone();
        NativeFn::new("map.get", Some(1), move |args| {
            Ok(entries
                .borrow()
                .get(&text(&args[0]))
                .cloned()
                .unwrap_or(Value::Null))
        })
    };
    let has = {
        let entries = entries.clone();
        NativeFn::new("map.has", Some(1), move |args| {
            Ok(Value::Bool(entries.borrow().contains_key(&text(&args[0]))))
        })
    };
    let delete = {
        let entries = entries.clone();
        NativeFn::new("map.delete", Some(1), move |args| {
            Ok(entries
                .borrow_mut()
                .shift_remove(&text(&args[0]))
                .unwrap_or(Value::Null))
        })
    };
    let keys = {
        let entries = entries.clone();
        NativeFn::new("map.keys", Some(0), move |_| {
            let keys = entries
                .borrow()
                .keys()
                .map(|k| Value::Str(k.clone()))
                .collect();
            Ok(Value::array(keys))
        })
    };
    let values = {
        let entries = entries.clone();
        NativeFn::new("map.values", Some(0), move |_| {
            let values = entries.borrow().values().cloned().collect();
            Ok(Value::array(values))
        })
    };
    Ok(namespace(vec![
        ("set", set_entry),
        ("get", get),
        ("has", has),
        ("delete", delete),
        ("keys", keys),
        ("values", values),
    ]))
}

pub fn build() -> Value {
    namespace(vec![
        ("queue", NativeFn::new("data.queue", Some(0), queue)),
        ("stack", NativeFn::new("data.stack", Some(0), stack)),
        ("set", NativeFn::new("data.set", None, set)),
        ("map", NativeFn::new("data.map", Some(0), map)),
    ])
}
