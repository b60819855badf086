//! Transient status line on stderr

use std::io::{self, IsTerminal, Write};

/// Single-line status shown while waiting on remote services
///
/// Stays silent when stderr is not a terminal so piped output is clean.
pub struct StatusLine {
    enabled: bool,
    width: usize,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            enabled: io::stderr().is_terminal(),
            width: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str) {
        if !self.enabled {
            return;
        }
        let pad = self.width.saturating_sub(msg.chars().count());
        eprint!("\r{}{}", msg, " ".repeat(pad));
        io::stderr().flush().ok();
        self.width = self.width.max(msg.chars().count());
    }

    pub fn clear(&mut self) {
        if !self.enabled || self.width == 0 {
            return;
        }
        eprint!("\r{}\r", " ".repeat(self.width));
        io::stderr().flush().ok();
        self.width = 0;
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        self.clear();
    }
}
