//! Console output: log, info, warn, error, colorize.
//!
//! `log` is variadic; a trailing `{ text, color }` object colorizes the
//! line. `info`, `warn`, and `error` apply a fixed color.

use super::{namespace, text};
use crate::error::RuntimeError;
use crate::value::{NativeFn, Value};

const ANSI_COLORS: &[(&str, &str)] = &[
    ("red", "\u{1b}[31m"),
    ("green", "\u{1b}[32m"),
    ("yellow", "\u{1b}[33m"),
    ("blue", "\u{1b}[34m"),
    ("magenta", "\u{1b}[35m"),
    ("cyan", "\u{1b}[36m"),
    ("gray", "\u{1b}[90m"),
];

const ANSI_RESET: &str = "\u{1b}[0m";

/// Wraps `text` in the ANSI escape for `color`; unknown colors pass the
/// text through unchanged.
pub fn colorize(text: &str, color: &str) -> String {
    let color = color.to_lowercase();
    match ANSI_COLORS.iter().find(|(name, _)| *name == color) {
        Some((_, prefix)) => format!("{prefix}{text}{ANSI_RESET}"),
        None => text.to_string(),
    }
}

fn join_rendered(args: &[Value]) -> String {
    args.iter().map(text).collect::<Vec<_>>().join(" ")
}

fn log(args: &[Value]) -> Result<Value, RuntimeError> {
    let Some((last, rest)) = args.split_last() else {
        println!();
        return Ok(Value::Null);
    };
    let mut color = None;
    let mut parts: Vec<String> = rest.iter().map(text).collect();
    match last {
        Value::Object(map) if map.borrow().contains_key("color") => {
            let map = map.borrow();
            color = map.get("color").map(text);
            parts.push(map.get("text").map(text).unwrap_or_default());
        }
        other => parts.push(text(other)),
    }
    let mut message = parts.join(" ");
    if let Some(color) = color {
        message = colorize(&message, &color);
    }
    println!("{message}");
    Ok(Value::Null)
}

fn info(args: &[Value]) -> Result<Value, RuntimeError> {
    println!("{}", colorize(&join_rendered(args), "cyan"));
    Ok(Value::Null)
}

fn warn(args: &[Value]) -> Result<Value, RuntimeError> {
    println!("{}", colorize(&join_rendered(args), "yellow"));
    Ok(Value::Null)
}

fn error(args: &[Value]) -> Result<Value, RuntimeError> {
    println!("{}", colorize(&join_rendered(args), "red"));
    Ok(Value::Null)
}

fn colorize_builtin(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Str(colorize(&text(&args[0]), &text(&args[1]))))
}

pub fn build() -> Value {
    namespace(vec![
        ("log", NativeFn::new("console.log", None, log)),
        ("info", NativeFn::new("console.info", None, info)),
        ("warn", NativeFn::new("console.warn", None, warn)),
        ("error", NativeFn::new("console.error", None, error)),
        (
            "colorize",
            NativeFn::new("console.colorize", Some(2), colorize_builtin),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_known_color() {
        assert_eq!(colorize("hi", "red"), "\u{1b}[31mhi\u{1b}[0m");
        assert_eq!(colorize("hi", "RED"), "\u{1b}[31mhi\u{1b}[0m");
    }

    #[test]
    fn test_colorize_unknown_color_passes_through() {
        assert_eq!(colorize("hi", "mauve"), "hi");
    }

    #[test]
    fn test_join_rendered_spaces_values() {
        let joined = join_rendered(&[Value::Int(1), Value::Str("two".into()), Value::Null]);
        assert_eq!(joined, "1 two null");
    }
}
