//! Unified error types for the runtime bootstrap.

use crate::error_stack::ErrorReport;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ArgsError
// ---------------------------------------------------------------------------

/// Errors raised when mutating the user-argument sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    /// The sequence was frozen before user code started running.
    Frozen { op: &'static str },
    /// Positional access past the end of the sequence.
    OutOfBounds { index: usize, len: usize },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frozen { op } => write!(f, "cannot {op}: args are frozen"),
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for args of length {len}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

// ---------------------------------------------------------------------------
// StateError
// ---------------------------------------------------------------------------

/// Violations of the write-once process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A write-once field was assigned twice.
    AlreadySet(&'static str),
    /// A required field was never assigned before the snapshot was taken.
    Missing(&'static str),
    Args(ArgsError),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySet(field) => write!(f, "{field} has already been set"),
            Self::Missing(field) => write!(f, "{field} was never set"),
            Self::Args(e) => write!(f, "args: {e}"),
        }
    }
}

impl std::error::Error for StateError {}

impl From<ArgsError> for StateError {
    fn from(e: ArgsError) -> Self {
        Self::Args(e)
    }
}

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Fatal failures of the startup dispatch sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Host initialization produced a main module that is present but empty.
    EmptyMainModule,
    State(StateError),
    /// Writing the version report to stdout failed.
    Output(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMainModule => {
                write!(f, "assertion failed: main module must not be empty")
            }
            Self::State(e) => write!(f, "state: {e}"),
            Self::Output(msg) => write!(f, "output: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<StateError> for DispatchError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<ArgsError> for DispatchError {
    fn from(e: ArgsError) -> Self {
        Self::State(StateError::Args(e))
    }
}

impl From<std::io::Error> for DispatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Output(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// HostError
// ---------------------------------------------------------------------------

/// Failures while turning raw process input into startup information.
#[derive(Debug)]
pub enum HostError {
    /// The working directory could not be determined.
    Cwd(std::io::Error),
    /// The code given to `xeval` does not parse.
    XevalSource(ErrorReport),
    /// The eval-mode variable name is not an identifier.
    InvalidReplvar(String),
    Config(ConfigError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cwd(e) => write!(f, "failed to read current directory: {e}"),
            Self::XevalSource(report) => write!(f, "xeval: {report}"),
            Self::InvalidReplvar(name) => {
                write!(f, "xeval: replvar `{name}` is not a valid identifier")
            }
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for HostError {}

impl From<ConfigError> for HostError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// LogError
// ---------------------------------------------------------------------------

/// Failures while installing the diagnostic log subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// The filter directive does not parse.
    Filter(String),
    /// Another global subscriber is already installed.
    Subscriber(String),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(msg) => write!(f, "invalid log filter: {msg}"),
            Self::Subscriber(msg) => write!(f, "failed to install log subscriber: {msg}"),
        }
    }
}

impl std::error::Error for LogError {}

// ---------------------------------------------------------------------------
// EvalError
// ---------------------------------------------------------------------------

/// Failures of eval mode: reading input or running the hook.
#[derive(Debug)]
pub enum EvalError {
    Io(std::io::Error),
    Script(ErrorReport),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Script(report) => write!(f, "{report}"),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<std::io::Error> for EvalError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ErrorReport> for EvalError {
    fn from(e: ErrorReport) -> Self {
        Self::Script(e)
    }
}

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// Failures of the module loader.
#[derive(Debug)]
pub enum LoadError {
    /// The process state carries no script location.
    NoLocation,
    /// The location names a scheme the file loader cannot read.
    UnsupportedScheme(String),
    Read { path: PathBuf, source: std::io::Error },
    Script(ErrorReport),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLocation => write!(f, "no main module location is set"),
            Self::UnsupportedScheme(protocol) => {
                write!(f, "unsupported module scheme `{protocol}`")
            }
            Self::Read { path, source } => {
                write!(f, "cannot read module `{}`: {source}", path.display())
            }
            Self::Script(report) => write!(f, "{report}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ErrorReport> for LoadError {
    fn from(e: ErrorReport) -> Self {
        Self::Script(e)
    }
}
