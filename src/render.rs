//! Terminal rendering for host-level diagnostics.
//!
//! Script output never passes through here; only the runtime's own
//! warnings and errors do, and they always go to stderr.

use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";

fn color_warning() -> Color {
    Color::Yellow
}

fn color_error() -> Color {
    Color::Red
}

/// Handles diagnostic output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether ANSI color/style output is enabled.
    color: bool,
}

impl Renderer {
    /// Create a renderer with optional color output.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Print a warning (to stderr).
    pub fn warn(&self, msg: &str) {
        let _ = self.write_warn(&mut io::stderr().lock(), msg);
    }

    /// Print an error (to stderr).
    pub fn error(&self, msg: &str) {
        let _ = self.write_error(&mut io::stderr().lock(), msg);
    }

    pub fn write_warn(&self, out: &mut dyn Write, msg: &str) -> io::Result<()> {
        if self.color {
            writeln!(out, "{} {msg}", LABEL_WARNING.with(color_warning()).bold())
        } else {
            writeln!(out, "{LABEL_WARNING} {msg}")
        }
    }

    pub fn write_error(&self, out: &mut dyn Write, msg: &str) -> io::Result<()> {
        if self.color {
            writeln!(out, "{} {msg}", LABEL_ERROR.with(color_error()).bold())
        } else {
            writeln!(out, "{LABEL_ERROR} {msg}")
        }
    }
}
