// File: src/interpreter/methods/strings.rs
//
// String methods. Indices are byte offsets; negative indices count from
// the end and out-of-range indices clamp, so `substring` never fails.

use crate::errors::Error;
use crate::interpreter::value::Value;

type MethodResult = Result<Value, Box<Error>>;

/// Claim and run a string-only method. Returns `None` for names owned by
/// other categories (the shared `length`/`contains`/`indexOf` trio is
/// routed by the dispatcher).
pub fn handle(method: &str, args: &[Value]) -> Option<MethodResult> {
    let result = match method {
        "toUpper" => to_upper(args),
        "toLower" => to_lower(args),
        "trim" => trim(args),
        "substring" => substring(args),
        "replace" => replace(args),
        "startsWith" => starts_with(args),
        "endsWith" => ends_with(args),
        "split" => split(args),
        "hasMatch" => has_match(args),
        "replaceMatch" => replace_match(args),
        _ => return None,
    };
    Some(result)
}

fn expect_arity(method: &str, args: &[Value], with_receiver: usize) -> Result<(), Box<Error>> {
    if args.len() != with_receiver {
        // The receiver is not counted in the user-facing arity.
        return Err(Error::arity(format!(
            "{}() expects {} argument{}",
            method,
            with_receiver - 1,
            if with_receiver == 2 { "" } else { "s" }
        )));
    }
    Ok(())
}

fn receiver<'a>(method: &str, args: &'a [Value]) -> Result<&'a str, Box<Error>> {
    match args.first() {
        Some(Value::Str(s)) => Ok(s),
        _ => Err(Error::type_error(format!("{}() can only be called on string type", method))),
    }
}

fn string_arg<'a>(method: &str, args: &'a [Value], idx: usize) -> Result<&'a str, Box<Error>> {
    match args.get(idx) {
        Some(Value::Str(s)) => Ok(s),
        _ => Err(Error::type_error(format!("{}() expects a string argument", method))),
    }
}

fn int_arg(method: &str, args: &[Value], idx: usize) -> Result<i64, Box<Error>> {
    match args.get(idx) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(Error::type_error(format!("{}() expects an integer argument", method))),
    }
}

/// Resolve a possibly-negative index against `len`, clamped into
/// `0..=len`, then floored to a char boundary.
fn clamp_index(s: &str, index: i64) -> usize {
    let len = s.len() as i64;
    let resolved = if index < 0 { len + index } else { index };
    let mut byte = resolved.clamp(0, len) as usize;
    while byte > 0 && !s.is_char_boundary(byte) {
        byte -= 1;
    }
    byte
}

pub fn length(args: &[Value]) -> MethodResult {
    expect_arity("length", args, 1)?;
    let s = receiver("length", args)?;
    Ok(Value::Int(s.len() as i64))
}

fn to_upper(args: &[Value]) -> MethodResult {
    expect_arity("toUpper", args, 1)?;
    let s = receiver("toUpper", args)?;
    Ok(Value::Str(s.to_uppercase()))
}

fn to_lower(args: &[Value]) -> MethodResult {
    expect_arity("toLower", args, 1)?;
    let s = receiver("toLower", args)?;
    Ok(Value::Str(s.to_lowercase()))
}

fn trim(args: &[Value]) -> MethodResult {
    expect_arity("trim", args, 1)?;
    let s = receiver("trim", args)?;
    Ok(Value::Str(s.trim().to_string()))
}

fn substring(args: &[Value]) -> MethodResult {
    expect_arity("substring", args, 3)?;
    let s = receiver("substring", args)?;
    let start = clamp_index(s, int_arg("substring", args, 1)?);
    let end = clamp_index(s, int_arg("substring", args, 2)?);
    if start > end {
        return Ok(Value::Str(String::new()));
    }
    Ok(Value::Str(s[start..end].to_string()))
}

fn replace(args: &[Value]) -> MethodResult {
    expect_arity("replace", args, 3)?;
    let s = receiver("replace", args)?;
    let old = string_arg("replace", args, 1)?;
    let new = string_arg("replace", args, 2)?;
    if old.is_empty() {
        return Ok(Value::Str(s.to_string()));
    }
    Ok(Value::Str(s.replace(old, new)))
}

pub fn contains(args: &[Value]) -> MethodResult {
    expect_arity("contains", args, 2)?;
    let s = receiver("contains", args)?;
    let needle = string_arg("contains", args, 1)?;
    Ok(Value::Bool(s.contains(needle)))
}

fn starts_with(args: &[Value]) -> MethodResult {
    expect_arity("startsWith", args, 2)?;
    let s = receiver("startsWith", args)?;
    let prefix = string_arg("startsWith", args, 1)?;
    Ok(Value::Bool(s.starts_with(prefix)))
}

fn ends_with(args: &[Value]) -> MethodResult {
    expect_arity("endsWith", args, 2)?;
    let s = receiver("endsWith", args)?;
    let suffix = string_arg("endsWith", args, 1)?;
    Ok(Value::Bool(s.ends_with(suffix)))
}

pub fn index_of(args: &[Value]) -> MethodResult {
    expect_arity("indexOf", args, 2)?;
    let s = receiver("indexOf", args)?;
    let needle = string_arg("indexOf", args, 1)?;
    let index = s.find(needle).map(|i| i as i64).unwrap_or(-1);
    Ok(Value::Int(index))
}

fn split(args: &[Value]) -> MethodResult {
    expect_arity("split", args, 2)?;
    let s = receiver("split", args)?;
    let delimiter = string_arg("split", args, 1)?;

    let parts: Vec<Value> = if delimiter.is_empty() {
        s.chars().map(|c| Value::Str(c.to_string())).collect()
    } else {
        s.split(delimiter).map(|part| Value::Str(part.to_string())).collect()
    };
    Ok(Value::List(parts))
}

fn has_match(args: &[Value]) -> MethodResult {
    expect_arity("hasMatch", args, 2)?;
    let s = receiver("hasMatch", args)?;
    let m = match args.get(1) {
        Some(Value::Match(m)) => m,
        _ => return Err(Error::type_error("hasMatch() expects a match argument")),
    };
    Ok(Value::Bool(s.contains(&m.content)))
}

fn replace_match(args: &[Value]) -> MethodResult {
    expect_arity("replaceMatch", args, 3)?;
    let s = receiver("replaceMatch", args)?;
    let m = match args.get(1) {
        Some(Value::Match(m)) => m,
        _ => return Err(Error::type_error("replaceMatch() expects a match as first argument")),
    };
    let replacement = string_arg("replaceMatch", args, 2)?;

    let mut out = s.to_string();
    let range_valid = m.start < m.end
        && m.end <= out.len()
        && out.is_char_boundary(m.start)
        && out.is_char_boundary(m.end);
    if range_valid {
        out.replace_range(m.start..m.end, replacement);
    }
    Ok(Value::Str(out))
}
