//! The built-in function library.
//!
//! A fixed table, built once behind a `LazyLock` and shared read-only by
//! every runtime that doesn't supply its own. All functions are pure: no
//! I/O, no mutable process state, deterministic for a given argument list.
//!
//! Argument values reach these implementations already coerced to the
//! declared parameter types by the evaluator's generic argument-checking
//! step; the bodies only handle their own edge cases (negative lengths,
//! out-of-range positions, overflow).

use std::sync::{Arc, LazyLock};

use super::error::EvaluationContext;
use super::functions::{Function, FunctionTable};
use super::result::EvaluationResult;
use super::value::{TypeTag, Value};

/// The standard function table, constructed before any evaluation begins
/// and never mutated afterwards.
pub static STANDARD_LIBRARY: LazyLock<Arc<FunctionTable>> =
    LazyLock::new(|| Arc::new(build_standard_library()));

fn build_standard_library() -> FunctionTable {
    let mut table = FunctionTable::new();

    // ==================== String inspection ====================
    table.register(Function::fixed(
        "LENGTH",
        vec![TypeTag::String],
        TypeTag::Integer,
        length,
    ));
    table.register(Function::fixed(
        "CONTAINS",
        vec![TypeTag::String, TypeTag::String],
        TypeTag::Boolean,
        contains,
    ));

    // ==================== String transforms ====================
    table.register(Function::fixed(
        "LOWER",
        vec![TypeTag::String],
        TypeTag::String,
        lower,
    ));
    table.register(Function::fixed(
        "UPPER",
        vec![TypeTag::String],
        TypeTag::String,
        upper,
    ));
    table.register(Function::fixed(
        "TRIM",
        vec![TypeTag::String],
        TypeTag::String,
        trim,
    ));
    table.register(Function::fixed(
        "LEFT",
        vec![TypeTag::String, TypeTag::Integer],
        TypeTag::String,
        left,
    ));
    table.register(Function::fixed(
        "RIGHT",
        vec![TypeTag::String, TypeTag::Integer],
        TypeTag::String,
        right,
    ));
    table.register(Function::fixed(
        "SUBSTRING",
        vec![TypeTag::String, TypeTag::Integer],
        TypeTag::String,
        substring,
    ));
    table.register(Function::fixed(
        "SUBSTRING",
        vec![TypeTag::String, TypeTag::Integer, TypeTag::Integer],
        TypeTag::String,
        substring_with_length,
    ));
    table.register(Function::variadic(
        "CONCAT",
        vec![],
        TypeTag::String,
        TypeTag::String,
        concat,
    ));
    table.register(Function::variadic(
        "CONCAT_WS",
        vec![TypeTag::String],
        TypeTag::String,
        TypeTag::String,
        concat_ws,
    ));

    // ==================== Arithmetic ====================
    table.register(Function::fixed(
        "ABS",
        vec![TypeTag::Integer],
        TypeTag::Integer,
        abs,
    ));

    // ==================== Explicit casts ====================
    table.register(Function::fixed(
        "INT",
        vec![TypeTag::String],
        TypeTag::Integer,
        int_cast,
    ));
    table.register(Function::fixed(
        "BOOL",
        vec![TypeTag::String],
        TypeTag::Boolean,
        bool_cast,
    ));
    table.register(Function::fixed(
        "STRING",
        vec![TypeTag::String],
        TypeTag::String,
        string_cast,
    ));
    table.register(Function::fixed(
        "TIMESTAMP",
        vec![TypeTag::String],
        TypeTag::Timestamp,
        timestamp_cast,
    ));
    table.register(Function::fixed(
        "IS_BOOL",
        vec![TypeTag::String],
        TypeTag::Boolean,
        is_bool,
    ));
    table.register(Function::fixed(
        "IS_INT",
        vec![TypeTag::String],
        TypeTag::Boolean,
        is_int,
    ));

    table
}

// ==================== Unicode helpers ====================

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the code point at `index`, `Some(s.len())` when `index`
/// equals the code-point count, `None` past the end.
fn char_to_byte_offset(s: &str, index: usize) -> Option<usize> {
    if index == 0 {
        return Some(0);
    }
    s.char_indices()
        .nth(index)
        .map(|(offset, _)| offset)
        .or_else(|| (index == char_len(s)).then_some(s.len()))
}

/// Implementations are only reachable through the registry, which has
/// already matched arity and coerced argument types; a mismatch here means
/// the registry and a signature disagree.
fn shape_error(ctx: &EvaluationContext, function: &str, result: TypeTag) -> EvaluationResult {
    EvaluationResult::of_error(
        result.zero_value(),
        ctx.internal(format!("{} arguments out of shape", function)),
    )
}

// ==================== String inspection ====================

fn length(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let s = match &args[0] {
        Value::String(s) => s,
        _ => return shape_error(ctx, "LENGTH", TypeTag::Integer),
    };
    let count = i32::try_from(char_len(s)).unwrap_or(i32::MAX);
    EvaluationResult::of(Value::Integer(count))
}

fn contains(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let (s, needle) = match (&args[0], &args[1]) {
        (Value::String(s), Value::String(needle)) => (s, needle),
        _ => return shape_error(ctx, "CONTAINS", TypeTag::Boolean),
    };
    EvaluationResult::of(Value::Boolean(s.contains(&**needle)))
}

// ==================== String transforms ====================

fn lower(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let s = match &args[0] {
        Value::String(s) => s,
        _ => return shape_error(ctx, "LOWER", TypeTag::String),
    };
    EvaluationResult::of(Value::string(s.to_lowercase()))
}

fn upper(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let s = match &args[0] {
        Value::String(s) => s,
        _ => return shape_error(ctx, "UPPER", TypeTag::String),
    };
    EvaluationResult::of(Value::string(s.to_uppercase()))
}

fn trim(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let s = match &args[0] {
        Value::String(s) => s,
        _ => return shape_error(ctx, "TRIM", TypeTag::String),
    };
    EvaluationResult::of(Value::string(s.trim()))
}

fn left(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let (s, n) = match (&args[0], &args[1]) {
        (Value::String(s), Value::Integer(n)) => (s, *n),
        _ => return shape_error(ctx, "LEFT", TypeTag::String),
    };
    if n < 0 {
        return EvaluationResult::of_error(
            Value::String(s.clone()),
            ctx.function_execution_error("LEFT", format!("substring length is negative: {}", n)),
        );
    }
    match char_to_byte_offset(s, n as usize) {
        Some(end) => EvaluationResult::of(Value::string(&s[..end])),
        // Longer than the string: return it unmodified.
        None => EvaluationResult::of(Value::String(s.clone())),
    }
}

fn right(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let (s, n) = match (&args[0], &args[1]) {
        (Value::String(s), Value::Integer(n)) => (s, *n),
        _ => return shape_error(ctx, "RIGHT", TypeTag::String),
    };
    if n < 0 {
        return EvaluationResult::of_error(
            Value::String(s.clone()),
            ctx.function_execution_error("RIGHT", format!("substring length is negative: {}", n)),
        );
    }
    let len = char_len(s);
    if n as usize >= len {
        return EvaluationResult::of(Value::String(s.clone()));
    }
    match char_to_byte_offset(s, len - n as usize) {
        Some(start) => EvaluationResult::of(Value::string(&s[start..])),
        None => EvaluationResult::of(Value::String(s.clone())),
    }
}

/// Resolve a 1-based start position to a code-point index.
///
/// Position 0 selects the whole string; negative positions count from the
/// end (-1 is the last character).
fn substring_start(s: &str, pos: i32) -> Result<usize, String> {
    if pos == 0 {
        return Ok(0);
    }
    let len = char_len(s);
    let magnitude = pos.unsigned_abs() as usize;
    if magnitude > len {
        return Err(format!(
            "start position {} is out of range for a {}-character string",
            pos, len
        ));
    }
    if pos > 0 {
        Ok(magnitude - 1)
    } else {
        Ok(len - magnitude)
    }
}

fn substring(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let (s, pos) = match (&args[0], &args[1]) {
        (Value::String(s), Value::Integer(pos)) => (s, *pos),
        _ => return shape_error(ctx, "SUBSTRING", TypeTag::String),
    };
    match substring_start(s, pos) {
        Ok(start) => EvaluationResult::of(Value::string(
            s.chars().skip(start).collect::<String>(),
        )),
        Err(detail) => EvaluationResult::of_error(
            Value::string(""),
            ctx.function_execution_error("SUBSTRING", detail),
        ),
    }
}

fn substring_with_length(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let (s, pos, len) = match (&args[0], &args[1], &args[2]) {
        (Value::String(s), Value::Integer(pos), Value::Integer(len)) => (s, *pos, *len),
        _ => return shape_error(ctx, "SUBSTRING", TypeTag::String),
    };
    if len < 0 {
        return EvaluationResult::of_error(
            Value::string(""),
            ctx.function_execution_error(
                "SUBSTRING",
                format!("substring length is negative: {}", len),
            ),
        );
    }
    match substring_start(s, pos) {
        Ok(start) => EvaluationResult::of(Value::string(
            s.chars().skip(start).take(len as usize).collect::<String>(),
        )),
        Err(detail) => EvaluationResult::of_error(
            Value::string(""),
            ctx.function_execution_error("SUBSTRING", detail),
        ),
    }
}

fn concat(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let mut out = String::new();
    for arg in args {
        match arg {
            Value::String(s) => out.push_str(s),
            _ => return shape_error(ctx, "CONCAT", TypeTag::String),
        }
    }
    EvaluationResult::of(Value::string(out))
}

fn concat_ws(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let separator = match &args[0] {
        Value::String(s) => s,
        _ => return shape_error(ctx, "CONCAT_WS", TypeTag::String),
    };
    let mut out = String::new();
    for (i, arg) in args[1..].iter().enumerate() {
        match arg {
            Value::String(s) => {
                if i > 0 {
                    out.push_str(separator);
                }
                out.push_str(s);
            }
            _ => return shape_error(ctx, "CONCAT_WS", TypeTag::String),
        }
    }
    EvaluationResult::of(Value::string(out))
}

// ==================== Arithmetic ====================

fn abs(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    let n = match &args[0] {
        Value::Integer(n) => *n,
        _ => return shape_error(ctx, "ABS", TypeTag::Integer),
    };
    match n.checked_abs() {
        Some(v) => EvaluationResult::of(Value::Integer(v)),
        None => EvaluationResult::of_error(
            Value::Integer(n),
            ctx.function_execution_error("ABS", format!("{} has no 32-bit absolute value", n)),
        ),
    }
}

// ==================== Explicit casts ====================

fn int_cast(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    match args[0].coerce(TypeTag::Integer) {
        Ok(v) => EvaluationResult::of(v),
        Err(failure) => EvaluationResult::of_error(
            TypeTag::Integer.zero_value(),
            ctx.function_execution_error("INT", failure),
        ),
    }
}

fn bool_cast(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    match args[0].coerce(TypeTag::Boolean) {
        Ok(v) => EvaluationResult::of(v),
        Err(failure) => EvaluationResult::of_error(
            TypeTag::Boolean.zero_value(),
            ctx.function_execution_error("BOOL", failure),
        ),
    }
}

fn string_cast(_ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    // The generic argument step has already coerced to String, which is
    // total over every type.
    EvaluationResult::of(args[0].clone())
}

fn timestamp_cast(ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    match args[0].coerce(TypeTag::Timestamp) {
        Ok(v) => EvaluationResult::of(v),
        Err(failure) => EvaluationResult::of_error(
            TypeTag::Timestamp.zero_value(),
            ctx.function_execution_error("TIMESTAMP", failure),
        ),
    }
}

fn is_bool(_ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    EvaluationResult::of(Value::Boolean(args[0].coerce(TypeTag::Boolean).is_ok()))
}

fn is_int(_ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
    EvaluationResult::of(Value::Boolean(args[0].coerce(TypeTag::Integer).is_ok()))
}
