// File: src/interpreter/effects/mod.rs
//
// Effect built-ins: the I/O surface a script can reach. The evaluator
// hands every call it does not reserve for itself to `handle`, which
// checks arity and argument types and forwards to the owning handler.

pub mod alert;
pub mod clipboard;
pub mod console;
pub mod logger;

pub use alert::{Alert, AlertResponse};
pub use clipboard::Clipboard;
pub use console::Console;
pub use logger::Logger;

use crate::errors::Error;

use super::value::Value;

/// The effect handlers owned by one interpreter instance.
#[derive(Default)]
pub struct Effects {
    pub console: Console,
    pub logger: Logger,
    pub clipboard: Clipboard,
    pub alert: Alert,
}

impl Effects {
    pub fn new() -> Self {
        Effects {
            console: Console::new(),
            logger: Logger::new(),
            clipboard: Clipboard::new(),
            alert: Alert::new(),
        }
    }
}

fn expect_arity(name: &str, args: &[Value], count: usize) -> Result<(), Box<Error>> {
    if args.len() != count {
        let noun = match count {
            0 => "no arguments".to_string(),
            1 => "1 argument".to_string(),
            n => format!("{} arguments", n),
        };
        return Err(Error::arity(format!("{}() expects {}", name, noun)));
    }
    Ok(())
}

fn string_arg<'a>(name: &str, args: &'a [Value], idx: usize) -> Result<&'a str, Box<Error>> {
    match args.get(idx) {
        Some(Value::Str(s)) => Ok(s),
        _ => Err(Error::type_error(format!("{}() expects a string argument", name))),
    }
}

/// Run an effect built-in. Returns `None` if `name` is not an effect
/// built-in so the evaluator can try the user function registry.
pub fn handle(
    effects: &mut Effects,
    name: &str,
    args: &[Value],
) -> Option<Result<Value, Box<Error>>> {
    let result = match name {
        "print" => expect_arity("print", args, 1).map(|_| {
            effects.console.print(&args[0].to_string());
            Value::Null
        }),
        "setLog" => expect_arity("setLog", args, 1)
            .and_then(|_| string_arg("setLog", args, 0).map(|s| s.to_string()))
            .map(|path| Value::Bool(effects.logger.set_log(&path))),
        "log" => expect_arity("log", args, 1)
            .and_then(|_| effects.logger.log(&args[0].to_string()))
            .map(|_| Value::Null),
        "clipboard_isText" => expect_arity("clipboard_isText", args, 0)
            .map(|_| Value::Bool(effects.clipboard.is_text())),
        "clipboard_read" => expect_arity("clipboard_read", args, 0)
            .map(|_| Value::Str(effects.clipboard.read())),
        "clipboard_write" => expect_arity("clipboard_write", args, 1)
            .and_then(|_| string_arg("clipboard_write", args, 0).map(|s| s.to_string()))
            .map(|text| Value::Bool(effects.clipboard.write(&text))),
        "showAlertOK" => expect_arity("showAlertOK", args, 2).map(|_| {
            effects.alert.show_ok(&args[0].to_string(), &args[1].to_string());
            Value::Null
        }),
        "showAlert" => expect_arity("showAlert", args, 2).map(|_| {
            Value::Bool(effects.alert.show_ok_cancel(&args[0].to_string(), &args[1].to_string()))
        }),
        "showAlertYesNoCancel" => expect_arity("showAlertYesNoCancel", args, 2).map(|_| {
            Value::Int(effects.alert.show_yes_no_cancel(&args[0].to_string(), &args[1].to_string()))
        }),
        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn print_stringifies_and_appends_newline() {
        let mut effects = Effects::new();
        let sink = Arc::new(Mutex::new(Vec::new()));
        effects.console.set_output(sink.clone());

        let result = handle(&mut effects, "print", &[Value::Int(14)]).unwrap().unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(String::from_utf8(sink.lock().unwrap().clone()).unwrap(), "14\n");
    }

    #[test]
    fn unknown_names_fall_through() {
        let mut effects = Effects::new();
        assert!(handle(&mut effects, "definitely_not_builtin", &[]).is_none());
    }

    #[test]
    fn print_arity_is_enforced() {
        let mut effects = Effects::new();
        let err = handle(&mut effects, "print", &[]).unwrap().unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::Arity);
        assert_eq!(err.message, "print() expects 1 argument");
    }

    #[test]
    fn set_log_requires_a_string() {
        let mut effects = Effects::new();
        let err = handle(&mut effects, "setLog", &[Value::Int(3)]).unwrap().unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::Type);
    }

    #[test]
    fn log_before_set_log_is_a_runtime_error() {
        let mut effects = Effects::new();
        let err =
            handle(&mut effects, "log", &[Value::Str("msg".into())]).unwrap().unwrap_err();
        assert_eq!(err.kind, crate::errors::ErrorKind::Runtime);
    }

    #[test]
    fn scripted_alert_results_reach_the_caller() {
        let mut effects = Effects::new();
        effects.alert.push_response(AlertResponse::Ok);
        let args = [Value::Str("title".into()), Value::Str("message".into())];

        let result = handle(&mut effects, "showAlert", &args).unwrap().unwrap();
        assert_eq!(result, Value::Bool(true));

        let result = handle(&mut effects, "showAlertYesNoCancel", &args).unwrap().unwrap();
        assert_eq!(result, Value::Int(2));
    }
}
