// ABOUTME: End-to-end tests driving whole programs through parse + interpret

use brew_lang::builtins::default_globals;
use brew_lang::env::Environment;
use brew_lang::error::Error;
use brew_lang::value::{NativeFn, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Builds the default globals with `console` swapped for a capturing
/// version, exercising the same embedding API a host would use.
fn setup() -> (Rc<Environment>, Rc<RefCell<Vec<String>>>) {
    let globals = default_globals();
    let output = Rc::new(RefCell::new(Vec::new()));

    let log = {
        let output = output.clone();
        NativeFn::new("console.log", None, move |args| {
            let line = args
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            output.borrow_mut().push(line);
            Ok(Value::Null)
        })
    };
    let mut console = IndexMap::new();
    console.insert("log".to_string(), Value::Native(log));
    globals.define("console", Value::object(console));

    (globals, output)
}

fn run_program(source: &str) -> Vec<String> {
    let (globals, output) = setup();
    brew_lang::run(source, &globals).expect("program failed");
    let lines = output.borrow().clone();
    lines
}

fn run_program_err(source: &str) -> Error {
    let (globals, _) = setup();
    brew_lang::run(source, &globals).expect_err("program should have failed")
}

#[test]
fn test_arithmetic_program_prints_seven() {
    let output = run_program("obj x = 1 + 2 * 3; console.log(x);");
    assert_eq!(output, vec!["7"]);
}

#[test]
fn test_recursive_factorial() {
    let output = run_program(concat!(
        "function fact(n) { if n <= 1 { return 1; } return n * fact(n - 1); }\n",
        "console.log(fact(5));\n",
    ));
    assert_eq!(output, vec!["120"]);
}

#[test]
fn test_counter_closure() {
    let output = run_program(concat!(
        "function makeCounter() { obj n = 0; return function() { n = n + 1; return n; }; }\n",
        "obj c = makeCounter();\n",
        "c(); c();\n",
        "console.log(c());\n",
    ));
    assert_eq!(output, vec!["3"]);
}

#[test]
fn test_try_catch_finally_order() {
    let output = run_program(concat!(
        "try { throw \"boom\"; }\n",
        "catch e { console.log(\"caught \" + e); }\n",
        "finally { console.log(\"done\"); }\n",
    ));
    assert_eq!(output, vec!["caught boom", "done"]);
}

#[test]
fn test_array_push_and_length() {
    let output = run_program("obj a = [1,2,3]; a.push(4); console.log(a.length);");
    assert_eq!(output, vec!["4"]);
}

#[test]
fn test_object_member_assignment() {
    let output = run_program("obj o = { x: 1, y: 2 }; o.z = o.x + o.y; console.log(o.z);");
    assert_eq!(output, vec!["3"]);
}

#[test]
fn test_member_access_on_null_fails() {
    let err = run_program_err("obj x = null; x.anything;");
    assert!(matches!(err, Error::Runtime(_)));
}

#[test]
fn test_index_at_length_fails() {
    let err = run_program_err("obj a = [1, 2]; console.log(a[2]);");
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_index_into_empty_array_fails() {
    let err = run_program_err("obj a = []; a[0];");
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_integer_division_by_zero_fails() {
    let err = run_program_err("1 / 0;");
    assert_eq!(err.to_string(), "Division by zero at 1:1");
}

#[test]
fn test_return_outside_function_fails() {
    let err = run_program_err("return;");
    assert!(err.to_string().contains("return"));
}

#[test]
fn test_rethrow_still_runs_surrounding_finally() {
    let output = run_program(concat!(
        "try {\n",
        "  try { throw \"boom\"; } catch e { throw e; } finally { console.log(\"inner done\"); }\n",
        "} catch e {\n",
        "  console.log(\"outer \" + e);\n",
        "}\n",
    ));
    assert_eq!(output, vec!["inner done", "outer boom"]);
}

#[test]
fn test_uncaught_throw_surfaces_with_site() {
    let err = run_program_err("\n  throw \"kaboom\";");
    assert_eq!(err.to_string(), "Uncaught exception: kaboom at 2:9");
}

#[test]
fn test_lex_error_aborts_the_pipeline() {
    let err = run_program_err("obj s = \"unterminated");
    assert!(matches!(err, Error::Lex(_)));
}

#[test]
fn test_parse_error_aborts_the_pipeline() {
    let err = run_program_err("if { }");
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn test_shared_builtin_state_across_statements() {
    let output = run_program(concat!(
        "obj q = data.queue();\n",
        "q.push(\"a\");\n",
        "q.push(\"b\");\n",
        "console.log(q.pop());\n",
        "console.log(q.size());\n",
    ));
    assert_eq!(output, vec!["a", "1"]);
}

#[test]
fn test_string_builtins_compose() {
    let output = run_program(concat!(
        "obj parts = string.split(\"one,two,three\", \",\");\n",
        "console.log(string.join(parts, \" & \"));\n",
        "console.log(string.upper(parts[0]));\n",
    ));
    assert_eq!(output, vec!["one & two & three", "ONE"]);
}

#[test]
fn test_json_round_trip_in_language() {
    let output = run_program(concat!(
        "obj parsed = json.parse(\"{\\\"n\\\": 3, \\\"s\\\": \\\"hi\\\"}\");\n",
        "console.log(parsed.n + 1);\n",
        "console.log(json.stringify([1, true, null]));\n",
    ));
    assert_eq!(output, vec!["4", "[1,true,null]"]);
}

#[test]
fn test_thread_run_handle() {
    let output = run_program(concat!(
        "obj handle = thread.run(function() { return 6 * 7; });\n",
        "console.log(handle.done);\n",
        "console.log(handle.join());\n",
    ));
    assert_eq!(output, vec!["true", "42"]);
}

#[test]
fn test_array_builtin_group() {
    let output = run_program(concat!(
        "obj a = [10, 20, 30];\n",
        "console.log(array.contains(a, 20));\n",
        "console.log(array.shift(a));\n",
        "console.log(array.length(a));\n",
    ));
    assert_eq!(output, vec!["true", "10", "2"]);
}

#[test]
fn test_random_builtins_are_installed() {
    let output = run_program(concat!(
        "obj n = random.int(1, 1);\n",
        "console.log(n);\n",
        "console.log(random.pick([\"only\"]));\n",
    ));
    assert_eq!(output, vec!["1", "only"]);
}

#[test]
fn test_scoping_across_blocks_and_calls() {
    let output = run_program(concat!(
        "obj x = \"global\";\n",
        "function show() { console.log(x); }\n",
        "{\n",
        "  obj x = \"block\";\n",
        "  console.log(x);\n",
        "  show();\n",
        "}\n",
        "show();\n",
    ));
    // `show` closes over the global frame, not the caller's block.
    assert_eq!(output, vec!["block", "global", "global"]);
}

#[test]
fn test_custom_native_global_via_embedding_api() {
    let globals = Environment::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let probe = {
        let seen = seen.clone();
        NativeFn::new("probe", Some(1), move |args| {
            seen.borrow_mut().push(args[0].clone());
            Ok(Value::Int(args.len() as i64))
        })
    };
    globals.define("probe", Value::Native(probe));

    brew_lang::run("obj r = probe(\"ping\");", &globals).expect("program failed");
    assert_eq!(globals.get("r"), Some(Value::Int(1)));
    assert_eq!(seen.borrow().as_slice(), [Value::Str("ping".into())]);
}
