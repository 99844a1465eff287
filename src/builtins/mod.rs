//! # Built-in library
//!
//! The host-provided globals installed into the root environment before a
//! program runs. Each group lives in its own sub-module and builds an
//! object of named native functions:
//!
//! - **[console]** - log, info, warn, error, colorize
//! - **[random]** - int, pick, char
//! - **[strings]** - length, charAt, upper, lower, slice, split, join, indexOf, codePointAt
//! - **[arrays]** - length, contains, shift
//! - **[clock]** - now
//! - **[filesystem]** - read, write, append (sandboxed)
//! - **[json]** - parse, stringify
//! - **[data]** - queue, stack, set, map factories
//! - **[concurrency]** - thread.run, thread.sleep, pauseExecution
//!
//! The evaluator knows nothing about any of this; it only sees objects and
//! native functions.

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::sandbox::Sandbox;
use crate::value::{NativeFn, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

pub mod arrays;
pub mod clock;
pub mod concurrency;
pub mod console;
pub mod data;
pub mod filesystem;
pub mod json;
pub mod random;
pub mod strings;

// ============================================================================
// Sandbox storage for the file built-ins
// ============================================================================

thread_local! {
    static SANDBOX: RefCell<Option<Sandbox>> = const { RefCell::new(None) };
}

/// Installs the filesystem sandbox the `file` group operates in.
pub fn set_sandbox_storage(sandbox: Sandbox) {
    SANDBOX.with(|s| {
        *s.borrow_mut() = Some(sandbox);
    });
}

pub(crate) fn with_sandbox<T>(
    f: impl FnOnce(&Sandbox) -> Result<T, RuntimeError>,
) -> Result<T, RuntimeError> {
    SANDBOX.with(|s| {
        let guard = s.borrow();
        let sandbox = guard
            .as_ref()
            .ok_or_else(|| RuntimeError::io_error("File sandbox not initialized", None))?;
        f(sandbox)
    })
}

// ============================================================================
// Registration
// ============================================================================

/// Builds the root environment with every built-in group installed.
pub fn default_globals() -> Rc<Environment> {
    let globals = Environment::new();
    globals.define("console", console::build());
    globals.define("random", random::build());
    globals.define("string", strings::build());
    globals.define("array", arrays::build());
    globals.define("time", clock::build());
    globals.define("file", filesystem::build());
    globals.define("json", json::build());
    globals.define("data", data::build());
    globals.define("thread", concurrency::build());
    globals.define(
        "pauseExecution",
        Value::Native(NativeFn::new(
            "pauseExecution",
            Some(1),
            concurrency::pause_execution,
        )),
    );
    globals
}

/// Assembles an object value out of named native functions.
pub(crate) fn namespace(entries: Vec<(&str, NativeFn)>) -> Value {
    let mut map = IndexMap::with_capacity(entries.len());
    for (name, func) in entries {
        map.insert(name.to_string(), Value::Native(func));
    }
    Value::object(map)
}

// ============================================================================
// Argument helpers shared by the groups
// ============================================================================

/// Renders any value with the host's default textual rendering.
pub(crate) fn text(value: &Value) -> String {
    value.to_string()
}

pub(crate) fn int_arg(func: &str, args: &[Value], position: usize) -> Result<i64, RuntimeError> {
    match &args[position] {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => Ok(*f as i64),
        other => Err(RuntimeError::type_error(
            format!("{func}: expected number, got {}", other.type_name()),
            None,
        )),
    }
}

pub(crate) fn array_arg(
    func: &str,
    args: &[Value],
    position: usize,
) -> Result<Rc<RefCell<Vec<Value>>>, RuntimeError> {
    match &args[position] {
        Value::Array(items) => Ok(items.clone()),
        other => Err(RuntimeError::type_error(
            format!("{func}: expected array, got {}", other.type_name()),
            None,
        )),
    }
}
