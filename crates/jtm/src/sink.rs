//! Primary and diagnostic output channels

use colored::Colorize;

use crate::prelude::eprintln;

/// Where rendered content and status messages go
///
/// `primary` receives rendered content verbatim (callers end it with a
/// newline); `diagnostic` receives one message per call.
pub trait OutputSink {
    fn primary(&mut self, text: &str);

    fn diagnostic(&mut self, message: &str);

    /// Confirmation of a successful write operation, on the primary channel
    fn confirm(&mut self, message: &str) {
        self.primary(&format!("{message}\n"));
    }
}

/// stdout / stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StdSink;

impl OutputSink for StdSink {
    fn primary(&mut self, text: &str) {
        anstream::print!("{text}");
    }

    fn diagnostic(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn confirm(&mut self, message: &str) {
        anstream::println!("{}", message.green().bold());
    }
}

/// Captures both channels in memory
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    pub primary: String,
    pub diagnostics: Vec<String>,
}

#[cfg(test)]
impl OutputSink for BufferSink {
    fn primary(&mut self, text: &str) {
        self.primary.push_str(text);
    }

    fn diagnostic(&mut self, message: &str) {
        self.diagnostics.push(message.to_string());
    }
}
