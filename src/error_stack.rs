//! Error reports raised by user code and the stack-trace formatter hook.
//!
//! Dispatch installs a [`PrepareStackTrace`] implementation exactly once,
//! before any user code runs. Every later rendering of an [`ErrorReport`]
//! goes through [`format_error`], which picks up the installed formatter.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PREPARE_STACK_TRACE: OnceLock<Box<dyn PrepareStackTrace>> = OnceLock::new();

/// Error class names surfaced to user code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    SyntaxError,
    ReferenceError,
    TypeError,
    RangeError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::SyntaxError => "SyntaxError",
            Self::ReferenceError => "ReferenceError",
            Self::TypeError => "TypeError",
            Self::RangeError => "RangeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call site in an error's stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name, `None` for top-level code.
    pub function: Option<String>,
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

/// A user-code error together with its captured frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub frames: Vec<StackFrame>,
    /// Set for syntax errors caused only by input ending early.
    pub recoverable: bool,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            frames: Vec::new(),
            recoverable: false,
        }
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn recoverable(mut self) -> Self {
        self.recoverable = true;
        self
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ErrorReport {}

/// Hook that turns an error report into its printable stack trace.
pub trait PrepareStackTrace: Send + Sync {
    fn prepare(&self, error: &ErrorReport) -> String;
}

/// Install the process-wide formatter.
///
/// Returns `false` when a formatter was already installed; the first one
/// stays in effect.
pub fn set_prepare_stack_trace(formatter: Box<dyn PrepareStackTrace>) -> bool {
    PREPARE_STACK_TRACE.set(formatter).is_ok()
}

/// Whether dispatch has installed a formatter in this process.
pub fn is_prepare_stack_trace_installed() -> bool {
    PREPARE_STACK_TRACE.get().is_some()
}

/// Render `error` with the installed formatter, or as `Kind: message`.
pub fn format_error(error: &ErrorReport) -> String {
    match PREPARE_STACK_TRACE.get() {
        Some(formatter) => formatter.prepare(error),
        None => error.to_string(),
    }
}

/// Default formatter: one `at` line per frame, paths shown relative to cwd.
#[derive(Debug, Clone)]
pub struct CallSiteFormatter {
    cwd: PathBuf,
}

impl CallSiteFormatter {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn display_file<'a>(&self, file: &'a str) -> std::borrow::Cow<'a, str> {
        let path = Path::new(file);
        match path.strip_prefix(&self.cwd) {
            Ok(relative) if path.is_absolute() => relative.display().to_string().into(),
            _ => file.into(),
        }
    }
}

impl PrepareStackTrace for CallSiteFormatter {
    fn prepare(&self, error: &ErrorReport) -> String {
        let mut out = error.to_string();
        for frame in &error.frames {
            let function = frame.function.as_deref().unwrap_or("<anonymous>");
            out.push_str(&format!(
                "\n    at {function} ({}:{}:{})",
                self.display_file(&frame.file),
                frame.line,
                frame.column
            ));
        }
        out
    }
}
