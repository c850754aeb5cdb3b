// File: src/main.rs
//
// Command-line entry point for the CopyClean interpreter. Reads a script
// file, runs it, and maps outcomes onto exit codes: 0 success (including a
// script-requested exit), 1 usage or I/O error, 2 parse error, 3 runtime
// error.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use copyclean::errors::ErrorKind;
use copyclean::interpreter::Interpreter;
use copyclean::lexer::Lexer;
use copyclean::parser::Parser;

#[derive(ClapParser)]
#[command(
    name = "copyclean",
    about = "CopyClean: a scripting language for text and clipboard automation",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Path to the script file (.ccl)
    script: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.script) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", cli.script.display(), e);
            return ExitCode::from(1);
        }
    };

    let mut parser = match Parser::new(Lexer::new(&source)) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let statements = match parser.parse() {
        Ok(statements) => statements,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let mut interpreter = Interpreter::new();
    match interpreter.run(&statements) {
        Ok(_) => ExitCode::SUCCESS,
        // A script calling exit() terminates cleanly.
        Err(e) if e.kind == ErrorKind::Exit => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(3)
        }
    }
}
