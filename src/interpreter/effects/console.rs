// File: src/interpreter/effects/console.rs
//
// Console output for `print`. Output normally goes to stdout; tests (and
// embedders) can install a byte sink to capture everything instead.

use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct Console {
    capture: Option<Arc<Mutex<Vec<u8>>>>,
}

impl Console {
    pub fn new() -> Self {
        Console { capture: None }
    }

    /// Redirect all subsequent output into `sink`.
    pub fn set_output(&mut self, sink: Arc<Mutex<Vec<u8>>>) {
        self.capture = Some(sink);
    }

    /// Write `message` followed by a newline.
    pub fn print(&self, message: &str) {
        if let Some(sink) = &self.capture {
            let mut buffer = sink.lock().expect("console capture lock poisoned");
            buffer.extend_from_slice(message.as_bytes());
            buffer.push(b'\n');
        } else {
            println!("{}", message);
        }
    }
}
