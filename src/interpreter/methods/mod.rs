// File: src/interpreter/methods/mod.rs
//
// Method dispatch for `receiver.method(args)` calls. The receiver travels
// as the first element of `args`. `length`, `contains` and `indexOf` exist
// on both strings and lists and are routed here on the receiver's type;
// everything else is claimed by exactly one category module.

pub mod lists;
pub mod regexes;
pub mod strings;

use crate::errors::Error;

use super::value::Value;

pub fn dispatch(method: &str, args: &[Value]) -> Result<Value, Box<Error>> {
    // Methods shared between strings and lists.
    if matches!(method, "length" | "contains" | "indexOf") {
        return match args.first() {
            Some(Value::Str(_)) => match method {
                "length" => strings::length(args),
                "contains" => strings::contains(args),
                _ => strings::index_of(args),
            },
            Some(Value::List(_)) => match method {
                "length" => lists::length(args),
                "contains" => lists::contains(args),
                _ => lists::index_of(args),
            },
            _ => Err(Error::type_error(format!(
                "{}() can only be called on string or list type",
                method
            ))),
        };
    }

    if let Some(result) = strings::handle(method, args) {
        return result;
    }
    if let Some(result) = lists::handle(method, args) {
        return result;
    }
    if let Some(result) = regexes::handle(method, args) {
        return result;
    }
    Err(Error::runtime(format!("unknown method `{}`", method)))
}
