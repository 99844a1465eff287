// ABOUTME: Tree-walking evaluator with explicit signals for return and throw

use crate::ast::{BinaryOp, Expr, Literal, Program, Stmt, UnaryOp};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::lexer::Span;
use crate::value::{FunctionValue, NativeFn, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

/// Outcome of a statement. A user `throw` travels as
/// `RuntimeError::Thrown` through the `Result` channel instead, so it can
/// cross expression and call boundaries; `try` intercepts exactly that
/// variant.
enum Flow {
    Normal,
    Return(Value),
}

/// Executes a program against a pre-populated root environment.
pub fn interpret(program: &Program, globals: &Rc<Environment>) -> Result<(), RuntimeError> {
    for stmt in &program.statements {
        if let Flow::Return(_) = exec_stmt(stmt, globals)? {
            return Err(RuntimeError::type_error(
                "Cannot return from top-level code",
                Some(stmt.span()),
            ));
        }
    }
    Ok(())
}

/// Evaluates a single expression. Used by the REPL to print results.
pub fn eval_expression(expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    eval_expr(expr, env)
}

fn exec_stmt(stmt: &Stmt, env: &Rc<Environment>) -> Result<Flow, RuntimeError> {
    match stmt {
        Stmt::Expression { expr, .. } => {
            eval_expr(expr, env)?;
            Ok(Flow::Normal)
        }
        Stmt::VarDecl {
            name, initializer, ..
        } => {
            let value = match initializer {
                Some(expr) => eval_expr(expr, env)?,
                None => Value::Null,
            };
            env.define(name.clone(), value);
            Ok(Flow::Normal)
        }
        Stmt::Block(block) => exec_stmts(
            &block.statements,
            &Environment::with_parent(env.clone()),
        ),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            if eval_expr(condition, env)?.truthy() {
                exec_stmts(
                    &then_branch.statements,
                    &Environment::with_parent(env.clone()),
                )
            } else if let Some(else_stmt) = else_branch {
                exec_stmt(else_stmt, env)
            } else {
                Ok(Flow::Normal)
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            while eval_expr(condition, env)?.truthy() {
                let frame = Environment::with_parent(env.clone());
                if let Flow::Return(value) = exec_stmts(&body.statements, &frame)? {
                    return Ok(Flow::Return(value));
                }
            }
            Ok(Flow::Normal)
        }
        Stmt::Return { value, .. } => {
            let value = match value {
                Some(expr) => eval_expr(expr, env)?,
                None => Value::Null,
            };
            Ok(Flow::Return(value))
        }
        Stmt::Throw { value, span } => {
            let value = eval_expr(value, env)?;
            Err(RuntimeError::Thrown { value, span: *span })
        }
        Stmt::Try {
            try_block,
            catch_name,
            catch_block,
            finally_block,
            ..
        } => {
            let mut outcome = exec_stmts(
                &try_block.statements,
                &Environment::with_parent(env.clone()),
            );
            if let Err(RuntimeError::Thrown { value, .. }) = &outcome {
                if let Some(catch) = catch_block {
                    let frame = Environment::with_parent(env.clone());
                    if let Some(name) = catch_name {
                        frame.define(name.clone(), value.clone());
                    }
                    outcome = exec_stmts(&catch.statements, &frame);
                }
            }
            if let Some(finally) = finally_block {
                let frame = Environment::with_parent(env.clone());
                match exec_stmts(&finally.statements, &frame) {
                    // Normal completion of finally keeps the pending signal.
                    Ok(Flow::Normal) => {}
                    // A return or throw inside finally replaces it.
                    replacement => outcome = replacement,
                }
            }
            outcome
        }
    }
}

/// Runs statements in the given frame; callers decide whether the frame is
/// fresh (blocks, calls) or the current one.
fn exec_stmts(statements: &[Stmt], env: &Rc<Environment>) -> Result<Flow, RuntimeError> {
    for stmt in statements {
        if let Flow::Return(value) = exec_stmt(stmt, env)? {
            return Ok(Flow::Return(value));
        }
    }
    Ok(Flow::Normal)
}

fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Literal { value, .. } => Ok(match value {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Str(s) => Value::Str(s.clone()),
        }),
        Expr::Identifier { name, span } => env
            .get(name)
            .ok_or_else(|| RuntimeError::name_error(name, Some(*span))),
        Expr::Array { items, .. } => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval_expr(item, env)?);
            }
            Ok(Value::array(values))
        }
        Expr::Object { pairs, .. } => {
            let mut map = IndexMap::with_capacity(pairs.len());
            for (key, value) in pairs {
                map.insert(key.clone(), eval_expr(value, env)?);
            }
            Ok(Value::object(map))
        }
        Expr::Unary { op, right, span } => {
            let right = eval_expr(right, env)?;
            match op {
                UnaryOp::Neg => match right {
                    Value::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(|| {
                        RuntimeError::arithmetic_error("Integer overflow", Some(*span))
                    }),
                    Value::Float(f) => Ok(Value::Float(-f)),
                    _ => Err(RuntimeError::type_error("Expected number", Some(*span))),
                },
                UnaryOp::Not => Ok(Value::Bool(!right.truthy())),
            }
        }
        Expr::Binary {
            left,
            op,
            right,
            span,
        } => eval_binary(*op, left, right, *span, env),
        Expr::Assign {
            target,
            value,
            span,
        } => eval_assign(target, value, *span, env),
        Expr::Member { object, name, span } => {
            let object = eval_expr(object, env)?;
            member_get(&object, name, *span)
        }
        Expr::Index {
            object,
            index,
            span,
        } => {
            let object = eval_expr(object, env)?;
            let index = eval_expr(index, env)?;
            index_get(&object, &index, *span)
        }
        Expr::Call { callee, args, span } => {
            let callee = eval_expr(callee, env)?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, env)?);
            }
            call_value(&callee, &values, Some(*span))
        }
        Expr::Function {
            name,
            params,
            body,
            span,
        } => Ok(Value::Function(Rc::new(FunctionValue {
            name: name.clone(),
            params: params.clone(),
            body: body.clone(),
            closure: env.clone(),
            span: *span,
        }))),
    }
}

/// Invokes any callable value; the entry point built-ins use to call back
/// into user code.
pub fn call_value(
    callee: &Value,
    args: &[Value],
    span: Option<Span>,
) -> Result<Value, RuntimeError> {
    match callee {
        Value::Function(func) => call_function(func, args, span),
        Value::Native(native) => native.call(args),
        _ => Err(RuntimeError::type_error("Can only call functions", span)),
    }
}

pub fn call_function(
    func: &FunctionValue,
    args: &[Value],
    span: Option<Span>,
) -> Result<Value, RuntimeError> {
    if args.len() != func.params.len() {
        return Err(RuntimeError::arity_error(
            format!(
                "Function '{}' expected {} args, got {}",
                func.name.as_deref().unwrap_or("<anonymous>"),
                func.params.len(),
                args.len()
            ),
            span.or(Some(func.span)),
        ));
    }
    // The call frame parents to the captured closure, not the caller.
    let frame = Environment::with_parent(func.closure.clone());
    for (param, arg) in func.params.iter().zip(args) {
        frame.define(param.clone(), arg.clone());
    }
    match exec_stmts(&func.body, &frame)? {
        Flow::Return(value) => Ok(value),
        Flow::Normal => Ok(Value::Null),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    span: Span,
    env: &Rc<Environment>,
) -> Result<Value, RuntimeError> {
    match op {
        // Short-circuit forms yield the deciding operand unchanged.
        BinaryOp::And => {
            let left = eval_expr(left, env)?;
            if left.truthy() {
                eval_expr(right, env)
            } else {
                Ok(left)
            }
        }
        BinaryOp::Or => {
            let left = eval_expr(left, env)?;
            if left.truthy() {
                Ok(left)
            } else {
                eval_expr(right, env)
            }
        }
        _ => {
            let left = eval_expr(left, env)?;
            let right = eval_expr(right, env)?;
            apply_binary(op, &left, &right, span)
        }
    }
}

enum NumPair {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn numeric_pair(left: &Value, right: &Value) -> Option<NumPair> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(NumPair::Ints(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(NumPair::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(NumPair::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(NumPair::Floats(*a, *b)),
        _ => None,
    }
}

fn require_numbers(left: &Value, right: &Value, span: Span) -> Result<NumPair, RuntimeError> {
    numeric_pair(left, right).ok_or_else(|| RuntimeError::type_error("Expected number", Some(span)))
}

fn apply_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Lt => compare_values(left, right, span, Ordering::is_lt),
        BinaryOp::Le => compare_values(left, right, span, Ordering::is_le),
        BinaryOp::Gt => compare_values(left, right, span, Ordering::is_gt),
        BinaryOp::Ge => compare_values(left, right, span, Ordering::is_ge),
        BinaryOp::Add => match numeric_pair(left, right) {
            Some(NumPair::Ints(a, b)) => a
                .checked_add(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(span)),
            Some(NumPair::Floats(a, b)) => Ok(Value::Float(a + b)),
            None => match (left, right) {
                (Value::Str(a), b) => Ok(Value::Str(format!("{a}{b}"))),
                (a, Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
                _ => Err(RuntimeError::type_error(
                    format!(
                        "Cannot add {} and {}",
                        left.type_name(),
                        right.type_name()
                    ),
                    Some(span),
                )),
            },
        },
        BinaryOp::Sub => match require_numbers(left, right, span)? {
            NumPair::Ints(a, b) => a
                .checked_sub(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(span)),
            NumPair::Floats(a, b) => Ok(Value::Float(a - b)),
        },
        BinaryOp::Mul => match require_numbers(left, right, span)? {
            NumPair::Ints(a, b) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(span)),
            NumPair::Floats(a, b) => Ok(Value::Float(a * b)),
        },
        BinaryOp::Div => match require_numbers(left, right, span)? {
            NumPair::Ints(_, 0) => Err(division_by_zero(span)),
            NumPair::Ints(a, b) => a
                .checked_div(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(span)),
            NumPair::Floats(_, b) if b == 0.0 => Err(division_by_zero(span)),
            NumPair::Floats(a, b) => Ok(Value::Float(a / b)),
        },
        BinaryOp::Rem => match require_numbers(left, right, span)? {
            NumPair::Ints(_, 0) => Err(RuntimeError::arithmetic_error(
                "Modulo by zero",
                Some(span),
            )),
            NumPair::Ints(a, b) => a
                .checked_rem(b)
                .map(Value::Int)
                .ok_or_else(|| overflow(span)),
            NumPair::Floats(_, b) if b == 0.0 => Err(RuntimeError::arithmetic_error(
                "Modulo by zero",
                Some(span),
            )),
            NumPair::Floats(a, b) => Ok(Value::Float(a % b)),
        },
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit ops handled in eval_binary"),
    }
}

fn compare_values(
    left: &Value,
    right: &Value,
    span: Span,
    test: fn(Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    if let Some(pair) = numeric_pair(left, right) {
        let ordering = match pair {
            NumPair::Ints(a, b) => Some(a.cmp(&b)),
            NumPair::Floats(a, b) => a.partial_cmp(&b),
        };
        return Ok(Value::Bool(ordering.is_some_and(test)));
    }
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Ok(Value::Bool(test(a.cmp(b))));
    }
    Err(RuntimeError::type_error(
        format!(
            "Cannot compare {} and {}",
            left.type_name(),
            right.type_name()
        ),
        Some(span),
    ))
}

fn overflow(span: Span) -> RuntimeError {
    RuntimeError::arithmetic_error("Integer overflow", Some(span))
}

fn division_by_zero(span: Span) -> RuntimeError {
    RuntimeError::arithmetic_error("Division by zero", Some(span))
}

fn eval_assign(
    target: &Expr,
    value: &Expr,
    span: Span,
    env: &Rc<Environment>,
) -> Result<Value, RuntimeError> {
    let value = eval_expr(value, env)?;
    match target {
        Expr::Identifier { name, span } => {
            env.assign(name, value.clone())
                .map_err(|_| RuntimeError::name_error(name, Some(*span)))?;
        }
        Expr::Member { object, name, span } => {
            let object = eval_expr(object, env)?;
            member_set(&object, name, value.clone(), *span)?;
        }
        Expr::Index {
            object,
            index,
            span,
        } => {
            let object = eval_expr(object, env)?;
            let index = eval_expr(index, env)?;
            index_set(&object, &index, value.clone(), *span)?;
        }
        _ => {
            return Err(RuntimeError::type_error(
                "Invalid assignment target",
                Some(span),
            ));
        }
    }
    Ok(value)
}

fn member_get(object: &Value, name: &str, span: Span) -> Result<Value, RuntimeError> {
    match object {
        Value::Object(map) => map.borrow().get(name).cloned().ok_or_else(|| {
            RuntimeError::index_error(format!("Property '{name}' not found"), Some(span))
        }),
        Value::Array(items) => array_member(items, name, span),
        other => Err(RuntimeError::type_error(
            format!("Cannot read property '{name}' of {}", other.type_name()),
            Some(span),
        )),
    }
}

/// Arrays expose `push`, `pop`, and `length` as synthetic members; the
/// callables capture the array cell itself.
fn array_member(
    items: &Rc<RefCell<Vec<Value>>>,
    name: &str,
    span: Span,
) -> Result<Value, RuntimeError> {
    match name {
        "push" => {
            let items = items.clone();
            Ok(Value::Native(NativeFn::new(
                "array.push",
                Some(1),
                move |args| {
                    items.borrow_mut().push(args[0].clone());
                    Ok(Value::Null)
                },
            )))
        }
        "pop" => {
            let items = items.clone();
            Ok(Value::Native(NativeFn::new(
                "array.pop",
                Some(0),
                move |_| Ok(items.borrow_mut().pop().unwrap_or(Value::Null)),
            )))
        }
        "length" => Ok(Value::Int(items.borrow().len() as i64)),
        other => Err(RuntimeError::index_error(
            format!("Property '{other}' not found"),
            Some(span),
        )),
    }
}

fn member_set(object: &Value, name: &str, value: Value, span: Span) -> Result<(), RuntimeError> {
    match object {
        Value::Object(map) => {
            map.borrow_mut().insert(name.to_string(), value);
            Ok(())
        }
        _ => Err(RuntimeError::type_error(
            "Cannot set property on non-object",
            Some(span),
        )),
    }
}

fn index_get(object: &Value, index: &Value, span: Span) -> Result<Value, RuntimeError> {
    match object {
        Value::Array(items) => {
            let items = items.borrow();
            let slot = array_slot(index, items.len(), span)?;
            Ok(items[slot].clone())
        }
        Value::Object(map) => {
            let key = object_key(index, span)?;
            map.borrow().get(&key).cloned().ok_or_else(|| {
                RuntimeError::index_error(format!("Property '{key}' not found"), Some(span))
            })
        }
        Value::Str(s) => {
            let i = int_index(index, span)?;
            usize::try_from(i)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::Str(c.to_string()))
                .ok_or_else(|| {
                    RuntimeError::index_error(format!("String index {i} out of range"), Some(span))
                })
        }
        other => Err(RuntimeError::type_error(
            format!("Cannot index {}", other.type_name()),
            Some(span),
        )),
    }
}

fn index_set(
    object: &Value,
    index: &Value,
    value: Value,
    span: Span,
) -> Result<(), RuntimeError> {
    match object {
        Value::Array(items) => {
            let mut items = items.borrow_mut();
            let len = items.len();
            let slot = array_slot(index, len, span)?;
            items[slot] = value;
            Ok(())
        }
        Value::Object(map) => {
            let key = object_key(index, span)?;
            map.borrow_mut().insert(key, value);
            Ok(())
        }
        other => Err(RuntimeError::type_error(
            format!("Cannot index {}", other.type_name()),
            Some(span),
        )),
    }
}

fn array_slot(index: &Value, len: usize, span: Span) -> Result<usize, RuntimeError> {
    let i = int_index(index, span)?;
    usize::try_from(i)
        .ok()
        .filter(|slot| *slot < len)
        .ok_or_else(|| {
            RuntimeError::index_error(format!("Array index {i} out of range"), Some(span))
        })
}

fn int_index(index: &Value, span: Span) -> Result<i64, RuntimeError> {
    match index {
        Value::Int(i) => Ok(*i),
        other => Err(RuntimeError::type_error(
            format!("Index must be an integer, got {}", other.type_name()),
            Some(span),
        )),
    }
}

fn object_key(index: &Value, span: Span) -> Result<String, RuntimeError> {
    match index {
        Value::Str(s) => Ok(s.clone()),
        Value::Int(_) | Value::Float(_) | Value::Bool(_) => Ok(index.to_string()),
        other => Err(RuntimeError::type_error(
            format!("Object index must be a string, got {}", other.type_name()),
            Some(span),
        )),
    }
}
