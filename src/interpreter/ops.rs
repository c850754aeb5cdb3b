// File: src/interpreter/ops.rs
//
// Operand tables for the built-in operators. Each helper returns
// `Some(value)` when the operand shapes are accepted and `None` on a type
// mismatch; the evaluator turns `None` into a Type error naming the
// operator. Division by zero is screened by the evaluator before `div`
// runs.

use crate::ast::Operator;

use super::value::Value;

/// Int op Int stays int; any other accepted pairing is computed in f64.
fn arithmetic(l: &Value, r: &Value, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Option<Value> {
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        return Some(Value::Int(int_op(*a, *b)));
    }
    match (l.as_f64(), r.as_f64()) {
        (Some(a), Some(b)) => Some(Value::Float(float_op(a, b))),
        _ => None,
    }
}

pub fn add(l: &Value, r: &Value) -> Option<Value> {
    arithmetic(l, r, i64::wrapping_add, |a, b| a + b)
}

pub fn sub(l: &Value, r: &Value) -> Option<Value> {
    arithmetic(l, r, i64::wrapping_sub, |a, b| a - b)
}

pub fn mul(l: &Value, r: &Value) -> Option<Value> {
    arithmetic(l, r, i64::wrapping_mul, |a, b| a * b)
}

/// Caller guarantees the divisor is non-zero.
pub fn div(l: &Value, r: &Value) -> Option<Value> {
    arithmetic(l, r, i64::wrapping_div, |a, b| a / b)
}

/// `**`. Computed in f64; collapses back to int when both operands are
/// ints, the exponent is non-negative and the result is integral.
pub fn pow(l: &Value, r: &Value) -> Option<Value> {
    let a = l.as_f64()?;
    let b = r.as_f64()?;
    let result = a.powf(b);
    if let (Value::Int(_), Value::Int(exp)) = (l, r) {
        if *exp >= 0 && result.fract() == 0.0 && result.is_finite() {
            return Some(Value::Int(result as i64));
        }
    }
    Some(Value::Float(result))
}

/// `++`. Two strings concatenate directly; anything else is stringified
/// first. Never fails.
pub fn concat(l: &Value, r: &Value) -> Value {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Value::Str(out)
        }
        _ => Value::Str(format!("{}{}", l, r)),
    }
}

/// Ordering comparisons: both operands numeric (via f64) or both strings
/// (lexicographic).
pub fn compare(op: Operator, l: &Value, r: &Value) -> Option<Value> {
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        let result = match op {
            Operator::Gt => a > b,
            Operator::Lt => a < b,
            Operator::Ge => a >= b,
            Operator::Le => a <= b,
            _ => return None,
        };
        return Some(Value::Bool(result));
    }
    if let (Value::Str(a), Value::Str(b)) = (l, r) {
        let result = match op {
            Operator::Gt => a > b,
            Operator::Lt => a < b,
            Operator::Ge => a >= b,
            Operator::Le => a <= b,
            _ => return None,
        };
        return Some(Value::Bool(result));
    }
    None
}

/// Unary `-`: ints and floats only.
pub fn negate(v: &Value) -> Option<Value> {
    match v {
        Value::Int(n) => Some(Value::Int(-n)),
        Value::Float(n) => Some(Value::Float(-n)),
        _ => None,
    }
}
