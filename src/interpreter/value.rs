// File: src/interpreter/value.rs
//
// Runtime values for the CopyClean interpreter, plus the universal
// operations the evaluator builds on: truthiness, display formatting,
// language-level equality and the declared-type match predicate.

use std::fmt;

use crate::ast::Type;

/// A regex value keeps the literal source between the slashes and the
/// trailing flag letters; compilation happens when a method needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexValue {
    pub pattern: String,
    pub flags: String,
}

/// One regex hit: half-open byte offsets into the matched-against string
/// and the matched substring.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchValue {
    pub start: usize,
    pub end: usize,
    pub content: String,
}

/// Runtime values. A closed tagged union; lists own their elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Vec<Value>),
    Regex(RegexValue),
    Match(MatchValue),
    Null,
}

/// Tolerance for comparing an int against a float with `==`.
const NUMERIC_EQ_EPSILON: f64 = 1e-9;

impl Value {
    /// The value's type as named in the language, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Regex(_) => "regex",
            Value::Match(_) => "match",
            Value::Null => "null",
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Regex(re) => !re.pattern.is_empty(),
            Value::Match(_) => true,
            Value::Null => false,
        }
    }

    /// Language-level `==`. Structural, with one exception: an int and a
    /// float compare numerically within a small absolute tolerance.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64 - b).abs() < NUMERIC_EQ_EPSILON
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            (Value::Regex(a), Value::Regex(b)) => a.pattern == b.pattern && a.flags == b.flags,
            (Value::Match(a), Value::Match(b)) => {
                a.start == b.start && a.end == b.end && a.content == b.content
            }
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// Whether the value satisfies a declared type. Ints and floats satisfy
    /// each other; `list<T>` checks every element recursively.
    pub fn matches_type(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Int(_), Type::Int) | (Value::Int(_), Type::Float) => true,
            (Value::Float(_), Type::Float) | (Value::Float(_), Type::Int) => true,
            (Value::Bool(_), Type::Bool) => true,
            (Value::Str(_), Type::String) => true,
            (Value::Regex(_), Type::Regex) => true,
            (Value::Match(_), Type::Match) => true,
            (Value::Null, Type::Null) => true,
            (Value::List(items), Type::List(elem)) => {
                items.iter().all(|item| item.matches_type(elem))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Regex(re) => write!(f, "/{}/{}", re.pattern, re.flags),
            Value::Match(m) => write!(f, "{}", m.content),
            Value::Null => write!(f, "null"),
        }
    }
}
