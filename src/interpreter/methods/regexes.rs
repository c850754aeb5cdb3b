// File: src/interpreter/methods/regexes.rs
//
// Regex methods. Patterns are stored as written in the script and compiled
// here on use; the `i` flag maps to case-insensitive matching, other flag
// letters stay on the value but have no engine-level effect.

use regex::RegexBuilder;

use crate::errors::Error;
use crate::interpreter::value::{MatchValue, RegexValue, Value};

type MethodResult = Result<Value, Box<Error>>;

pub fn handle(method: &str, args: &[Value]) -> Option<MethodResult> {
    let result = match method {
        "getAll" => get_all(args),
        _ => return None,
    };
    Some(result)
}

fn compile(re: &RegexValue) -> Result<regex::Regex, Box<Error>> {
    RegexBuilder::new(&re.pattern)
        .case_insensitive(re.flags.contains('i'))
        .build()
        .map_err(|e| Error::runtime(format!("regex error: {}", e)))
}

/// Every non-overlapping match in the text, in order. Offsets are byte
/// offsets into the argument string.
fn get_all(args: &[Value]) -> MethodResult {
    if args.len() != 2 {
        return Err(Error::arity("getAll() expects 1 argument"));
    }
    let re = match args.first() {
        Some(Value::Regex(re)) => re,
        _ => return Err(Error::type_error("getAll() can only be called on regex type")),
    };
    let text = match args.get(1) {
        Some(Value::Str(s)) => s,
        _ => return Err(Error::type_error("getAll() expects a string argument")),
    };

    let compiled = compile(re)?;
    let matches = compiled
        .find_iter(text)
        .map(|m| {
            Value::Match(MatchValue { start: m.start(), end: m.end(), content: m.as_str().to_string() })
        })
        .collect();
    Ok(Value::List(matches))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str, flags: &str) -> Value {
        Value::Regex(RegexValue { pattern: pattern.into(), flags: flags.into() })
    }

    #[test]
    fn get_all_finds_every_match_with_offsets() {
        let result = get_all(&[re("[0-9]+", ""), Value::Str("a12 bc 345".into())]).unwrap();
        let Value::List(matches) = result else { panic!("expected a list of matches") };
        assert_eq!(matches.len(), 2);
        assert_eq!(
            matches[0],
            Value::Match(MatchValue { start: 1, end: 3, content: "12".into() })
        );
        assert_eq!(
            matches[1],
            Value::Match(MatchValue { start: 7, end: 10, content: "345".into() })
        );
    }

    #[test]
    fn get_all_with_no_matches_returns_empty_list() {
        let result = get_all(&[re("z+", ""), Value::Str("abc".into())]).unwrap();
        assert_eq!(result, Value::List(vec![]));
    }

    #[test]
    fn case_insensitive_flag_is_honored() {
        let result = get_all(&[re("abc", "i"), Value::Str("xABCx".into())]).unwrap();
        let Value::List(matches) = result else { panic!("expected a list of matches") };
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn invalid_pattern_is_a_runtime_error() {
        let err = get_all(&[re("[unclosed", ""), Value::Str("x".into())]).unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::Runtime);
        assert!(err.message.starts_with("regex error: "));
    }

    #[test]
    fn wrong_receiver_is_a_type_error() {
        let err = get_all(&[Value::Str("not a regex".into()), Value::Str("x".into())]).unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::Type);
    }
}
