// Integration tests for the CopyClean interpreter.
//
// These run complete scripts through the real lexer/parser/evaluator
// pipeline with console output captured, and check both the observable
// output and the final status.

use std::sync::{Arc, Mutex};

use copyclean::errors::{Error, ErrorKind};
use copyclean::interpreter::{Interpreter, Value};
use copyclean::parser::Parser;

struct Run {
    interp: Interpreter,
    result: Result<Value, Box<Error>>,
    stdout: String,
}

fn run_code(source: &str) -> Run {
    let stmts = Parser::parse_source(source).expect("script should parse");
    let mut interp = Interpreter::new();
    let sink = Arc::new(Mutex::new(Vec::new()));
    interp.set_output(sink.clone());

    let result = interp.run(&stmts);
    let stdout = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
    Run { interp, result, stdout }
}

fn global(run: &Run, name: &str) -> Value {
    run.interp.globals.borrow().get(name).unwrap_or(Value::Null)
}

#[test]
fn arithmetic_and_printing() {
    let run = run_code("print(\"\" ++ (2 + 3 * 4));");
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "14\n");
}

#[test]
fn function_with_typed_return() {
    let run = run_code(
        "function add returns int(int a, int b) { return a + b; };\n\
         print(\"\" ++ add(2, 3));",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "5\n");
}

#[test]
fn type_mismatch_on_return_is_reported() {
    let run = run_code("function bad returns int() { return \"x\"; }; bad();");
    let err = run.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Type);
    assert!(err.message.contains("declared return type"));
    colored::control::set_override(false);
    assert!(err.to_string().contains("Type Error"));
}

#[test]
fn short_circuit_avoids_division_error() {
    let run = run_code("print(\"\" ++ (false && (1/0 == 0)));");
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "false\n");
}

#[test]
fn regex_extraction_end_to_end() {
    let run = run_code(
        "regex r(/[0-9]+/);\n\
         list<match> ms() = r.getAll(\"a12 bc 345\");\n\
         print(\"\" ++ ms.get(1).content);",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "345\n");
}

#[test]
fn graceful_exit_stops_execution() {
    let run = run_code("print(\"before\"); exit(); print(\"after\");");
    let err = run.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Exit);
    assert_eq!(run.stdout, "before\n");
}

#[test]
fn while_loop_builds_a_string() {
    let run = run_code(
        "string out(\"\");\n\
         int i(0);\n\
         while (i < 3) {\n\
             out = out ++ \"ab\";\n\
             i = i + 1;\n\
         };\n\
         print(out);",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "ababab\n");
}

#[test]
fn elif_chain_selects_the_first_truthy_branch() {
    let run = run_code(
        "int n(7);\n\
         if (n < 5) { print(\"small\"); }\n\
         elif (n < 10) { print(\"medium\"); }\n\
         else { print(\"large\"); };",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "medium\n");
}

#[test]
fn string_methods_compose() {
    let run = run_code(
        "string raw(\"  Hello, World  \");\n\
         string cleaned() = raw.trim().toLower().replace(\",\", \"\");\n\
         print(cleaned);\n\
         print(\"\" ++ cleaned.length());\n\
         print(\"\" ++ cleaned.startsWith(\"hello\"));",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "hello world\n11\ntrue\n");
}

#[test]
fn split_and_list_methods() {
    let run = run_code(
        "list<string> parts() = \"a,b,c\".split(\",\");\n\
         print(\"\" ++ parts.length());\n\
         print(parts.get(-1));\n\
         list<string> more() = parts.push(\"d\");\n\
         print(\"\" ++ more.length());\n\
         print(\"\" ++ parts.length());\n\
         print(\"\" ++ more.indexOf(\"d\"));",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "3\nc\n4\n3\n3\n");
}

#[test]
fn replace_match_cleans_text() {
    let run = run_code(
        "regex digits(/[0-9]+/);\n\
         string text(\"order 1234 shipped\");\n\
         list<match> ms() = digits.getAll(text);\n\
         string cleaned() = text.replaceMatch(ms.get(0), \"####\");\n\
         print(cleaned);",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "order #### shipped\n");
}

#[test]
fn fstring_formats_with_one_based_indices() {
    let run = run_code(
        "string who(\"world\");\n\
         print(fstring(\"hello %1, %2 times\", who, 3));",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "hello world, 3 times\n");
}

#[test]
fn nested_function_calls_and_recursion() {
    let run = run_code(
        "function fact returns int(int n) {\n\
             if (n <= 1) { return 1; };\n\
             return n * fact(n - 1);\n\
         };\n\
         print(\"\" ++ fact(6));",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "720\n");
}

#[test]
fn list_of_matches_satisfies_declared_type() {
    let run = run_code(
        "regex r(/[a-z]+/);\n\
         list<match> words() = r.getAll(\"one two three\");\n\
         print(\"\" ++ words.length());\n\
         print(\"\" ++ words.get(2).start);",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "3\n8\n");
}

#[test]
fn division_by_zero_unwinds_with_its_own_kind() {
    let run = run_code("print(\"ok\"); x = 10 / 0; print(\"never\");");
    let err = run.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::DivideByZero);
    assert_eq!(run.stdout, "ok\n");
    assert!(err.span.is_some());
}

#[test]
fn exit_unwinds_through_nested_scopes_and_loops() {
    let run = run_code(
        "int i(0);\n\
         while (true) {\n\
             i = i + 1;\n\
             if (i == 2) {\n\
                 if (true) { exit(); };\n\
             };\n\
             print(\"\" ++ i);\n\
         };",
    );
    let err = run.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Exit);
    assert_eq!(run.stdout, "1\n");
}

#[test]
fn comparisons_work_on_strings_and_numbers() {
    let run = run_code(
        "print(\"\" ++ (\"abc\" < \"abd\"));\n\
         print(\"\" ++ (2 >= 2.0));\n\
         print(\"\" ++ (1 == 1.0));\n\
         print(\"\" ++ (\"1\" == 1));",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "true\ntrue\ntrue\nfalse\n");
}

#[test]
fn ternary_and_casts_in_one_pipeline() {
    let run = run_code(
        "int hits(3);\n\
         string label() = hits > 0 ? \"found \" ++ string(hits) : \"none\";\n\
         print(label);\n\
         print(\"\" ++ int(2.9));\n\
         print(\"\" ++ boolean(\"text\"));",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "found 3\n2\ntrue\n");
}

#[test]
fn unknown_function_reports_name_and_location() {
    let run = run_code("x = 1;\nmystery(x);");
    let err = run.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert!(err.message.contains("mystery"));
    assert_eq!(err.span.unwrap().start.line, 2);
}

#[test]
fn log_before_set_log_fails_cleanly() {
    let run = run_code("log(\"message\");");
    let err = run.result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert!(err.message.contains("setLog()"));
}

#[test]
fn set_log_then_log_writes_timestamped_lines() {
    let mut path = std::env::temp_dir();
    path.push(format!("copyclean_e2e_{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let source = format!(
        "b = setLog(\"{}\");\nprint(\"\" ++ b);\nlog(\"hello\");\nlog(42);",
        path.display()
    );
    let run = run_code(&source);
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "true\n");

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("] : [hello]"));
    assert!(lines[1].ends_with("] : [42]"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn alerts_answer_with_scripted_responses() {
    let stmts = Parser::parse_source(
        "a = showAlert(\"t\", \"m\");\n\
         b = showAlertYesNoCancel(\"t\", \"m\");\n\
         c = showAlertYesNoCancel(\"t\", \"m\");\n\
         showAlertOK(\"t\", \"m\");",
    )
    .unwrap();
    let mut interp = Interpreter::new();
    interp.effects.alert.push_response(copyclean::interpreter::AlertResponse::Ok);
    interp.effects.alert.push_response(copyclean::interpreter::AlertResponse::Yes);

    interp.run(&stmts).unwrap();
    assert_eq!(interp.globals.borrow().get("a"), Some(Value::Bool(true)));
    assert_eq!(interp.globals.borrow().get("b"), Some(Value::Int(0)));
    // Queue exhausted: the cancel default.
    assert_eq!(interp.globals.borrow().get("c"), Some(Value::Int(2)));
}

#[test]
fn parse_errors_carry_spans() {
    let err = Parser::parse_source("int x(1)").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.span.is_some());

    let err = Parser::parse_source("if (1) { x = 2; }").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("';' after if statement"));
}

#[test]
fn a_realistic_cleanup_script() {
    let run = run_code(
        "// Normalize a pasted list of order ids.\n\
         string pasted(\"ID-0012, id-0034,ID-0056\");\n\
         regex id(/id-[0-9]+/i);\n\
         list<match> found() = id.getAll(pasted);\n\
         int i(0);\n\
         string out(\"\");\n\
         while (i < found.length()) {\n\
             string one() = found.get(i).content.toUpper();\n\
             out = i == 0 ? one : out ++ \";\" ++ one;\n\
             i = i + 1;\n\
         };\n\
         print(out);",
    );
    run.result.as_ref().unwrap();
    assert_eq!(run.stdout, "ID-0012;ID-0034;ID-0056\n");
}

#[test]
fn final_value_comes_from_top_level_return() {
    let run = run_code("int x(21); return x * 2;");
    assert_eq!(run.result.unwrap(), Value::Int(42));
}
