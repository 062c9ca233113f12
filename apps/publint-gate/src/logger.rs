//! The logging capability a release host hands to the verifier.

use std::sync::{Arc, Mutex};

/// Minimal sink for user-facing run output.
pub trait Logger {
    fn log(&self, text: &str);
}

impl<F: Fn(&str)> Logger for F {
    fn log(&self, text: &str) {
        self(text)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutLogger;

impl Logger for StdoutLogger {
    fn log(&self, text: &str) {
        println!("{}", text);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn log(&self, text: &str) {
        eprintln!("{}", text);
    }
}

#[derive(Debug, Default, Clone)]
/// Captures lines in memory. Clones share the same buffer.
pub struct MemoryLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, text: &str) {
        match self.lines.lock() {
            Ok(mut g) => g.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
    }
}
