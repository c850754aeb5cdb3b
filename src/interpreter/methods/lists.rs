// File: src/interpreter/methods/lists.rs
//
// List methods. Lists are immutable through this surface: `push` hands
// back a new list and leaves the receiver untouched.

use crate::errors::Error;
use crate::interpreter::value::Value;

type MethodResult = Result<Value, Box<Error>>;

/// Claim and run a list-only method; the shared trio is routed by the
/// dispatcher.
pub fn handle(method: &str, args: &[Value]) -> Option<MethodResult> {
    let result = match method {
        "get" => get(args),
        "push" => push(args),
        "slice" => slice(args),
        _ => return None,
    };
    Some(result)
}

fn expect_arity(method: &str, args: &[Value], with_receiver: usize) -> Result<(), Box<Error>> {
    if args.len() != with_receiver {
        return Err(Error::arity(format!(
            "{}() expects {} argument{}",
            method,
            with_receiver - 1,
            if with_receiver == 2 { "" } else { "s" }
        )));
    }
    Ok(())
}

fn receiver<'a>(method: &str, args: &'a [Value]) -> Result<&'a [Value], Box<Error>> {
    match args.first() {
        Some(Value::List(items)) => Ok(items),
        _ => Err(Error::type_error(format!("{}() can only be called on list type", method))),
    }
}

fn int_arg(method: &str, args: &[Value], idx: usize) -> Result<i64, Box<Error>> {
    match args.get(idx) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(Error::type_error(format!("{}() expects an integer argument", method))),
    }
}

pub fn length(args: &[Value]) -> MethodResult {
    expect_arity("length", args, 1)?;
    let items = receiver("length", args)?;
    Ok(Value::Int(items.len() as i64))
}

fn get(args: &[Value]) -> MethodResult {
    expect_arity("get", args, 2)?;
    let items = receiver("get", args)?;
    let mut index = int_arg("get", args, 1)?;

    if index < 0 {
        index += items.len() as i64;
    }
    if index < 0 || index >= items.len() as i64 {
        return Err(Error::runtime("list index out of range"));
    }
    Ok(items[index as usize].clone())
}

fn push(args: &[Value]) -> MethodResult {
    expect_arity("push", args, 2)?;
    let items = receiver("push", args)?;

    let mut out = items.to_vec();
    out.push(args[1].clone());
    Ok(Value::List(out))
}

fn slice(args: &[Value]) -> MethodResult {
    expect_arity("slice", args, 3)?;
    let items = receiver("slice", args)?;
    let len = items.len() as i64;

    let mut start = int_arg("slice", args, 1)?;
    let mut end = int_arg("slice", args, 2)?;
    if start < 0 {
        start += len;
    }
    if end < 0 {
        end += len;
    }
    let start = start.clamp(0, len) as usize;
    let end = end.clamp(0, len) as usize;

    let out = if start < end { items[start..end].to_vec() } else { Vec::new() };
    Ok(Value::List(out))
}

pub fn contains(args: &[Value]) -> MethodResult {
    expect_arity("contains", args, 2)?;
    let items = receiver("contains", args)?;
    Ok(Value::Bool(items.iter().any(|item| item.loosely_equals(&args[1]))))
}

pub fn index_of(args: &[Value]) -> MethodResult {
    expect_arity("indexOf", args, 2)?;
    let items = receiver("indexOf", args)?;
    let index = items
        .iter()
        .position(|item| item.loosely_equals(&args[1]))
        .map(|i| i as i64)
        .unwrap_or(-1);
    Ok(Value::Int(index))
}
