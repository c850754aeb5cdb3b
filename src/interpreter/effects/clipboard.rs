// File: src/interpreter/effects/clipboard.rs
//
// Clipboard access through arboard. Initialization is lazy and allowed to
// fail: on headless systems the script-visible behavior degrades to
// "no text available" / "write failed" rather than an error.

pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
    initialized: bool,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard {
    pub fn new() -> Self {
        Clipboard { inner: None, initialized: false }
    }

    fn backend(&mut self) -> Option<&mut arboard::Clipboard> {
        if !self.initialized {
            self.initialized = true;
            self.inner = arboard::Clipboard::new().ok();
        }
        self.inner.as_mut()
    }

    /// Whether the platform clipboard currently holds text.
    pub fn is_text(&mut self) -> bool {
        match self.backend() {
            Some(clipboard) => clipboard.get_text().is_ok(),
            None => false,
        }
    }

    /// Read the clipboard as text; empty string when unavailable.
    pub fn read(&mut self) -> String {
        match self.backend() {
            Some(clipboard) => clipboard.get_text().unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Replace the clipboard contents. Returns whether the write succeeded.
    pub fn write(&mut self, text: &str) -> bool {
        match self.backend() {
            Some(clipboard) => clipboard.set_text(text.to_string()).is_ok(),
            None => false,
        }
    }
}
