// File: src/interpreter/effects/logger.rs
//
// Timestamped file logging for `setLog` / `log`. The log file is opened in
// append mode and the handle lives until the interpreter is dropped, so
// every exit path releases it.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::errors::Error;

#[derive(Default)]
pub struct Logger {
    path: Option<PathBuf>,
    file: Option<File>,
}

impl Logger {
    pub fn new() -> Self {
        Logger { path: None, file: None }
    }

    /// Open (or replace) the log file in append mode. Returns whether the
    /// file could be opened.
    pub fn set_log(&mut self, path: &str) -> bool {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                self.path = Some(PathBuf::from(path));
                self.file = Some(file);
                true
            }
            Err(_) => {
                self.path = None;
                self.file = None;
                false
            }
        }
    }

    /// Append a `[YYYY-MM-DD HH:MM:SS:mmm] : [message]` line.
    pub fn log(&mut self, message: &str) -> Result<(), Box<Error>> {
        let file = self.file.as_mut().ok_or_else(|| {
            Error::runtime("No log file initialized. Call setLog() before logging.")
        })?;

        let now = Local::now();
        let line = format!(
            "[{}:{:03}] : [{}]",
            now.format("%Y-%m-%d %H:%M:%S"),
            now.timestamp_subsec_millis(),
            message
        );
        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .map_err(|e| Error::runtime(format!("failed to write log file: {}", e)))
    }
}
