//! Process-wide startup state: versions, script location, and user args.
//!
//! Dispatch fills a [`ProcessStateBuilder`] in order and then converts it into
//! an immutable [`ProcessState`] snapshot. Every collaborator (eval mode, the
//! REPL, the module loader) receives that snapshot explicitly instead of
//! reading global cells.

use crate::error::{ArgsError, StateError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Version of the type-system layer bundled with the runtime.
pub const TYPESCRIPT_VERSION: &str = "3.5.1";

/// Default process name when the host does not supply one.
pub const DEFAULT_PROCESS_NAME: &str = "main";

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Runtime identification strings reported by `--version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    pub deno: String,
    pub v8: String,
    pub typescript: String,
}

impl Versions {
    /// Build version state from host-reported runtime and engine versions.
    pub fn new(deno: impl Into<String>, v8: impl Into<String>) -> Self {
        Self {
            deno: deno.into(),
            v8: v8.into(),
            typescript: TYPESCRIPT_VERSION.to_string(),
        }
    }

    /// The three `label: value` lines of the version report, in fixed order.
    pub fn report_lines(&self) -> [String; 3] {
        [
            format!("deno: {}", self.deno),
            format!("v8: {}", self.v8),
            format!("typescript: {}", self.typescript),
        ]
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Current script location, derived from the main module specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    href: String,
}

impl Location {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// The specifier exactly as given by the host.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// URL scheme including the trailing colon. Bare paths report `file:`.
    pub fn protocol(&self) -> String {
        match scheme_of(&self.href) {
            Some(scheme) => format!("{}:", scheme.to_ascii_lowercase()),
            None => "file:".to_string(),
        }
    }

    /// Path component of the location.
    pub fn pathname(&self) -> &str {
        let Some(scheme) = scheme_of(&self.href) else {
            return &self.href;
        };
        let rest = &self.href[scheme.len() + 1..];
        match rest.strip_prefix("//") {
            Some(authority_and_path) => authority_and_path
                .find('/')
                .map(|idx| &authority_and_path[idx..])
                .unwrap_or("/"),
            None => rest,
        }
    }

    /// Filesystem path for `file:` locations, resolved against `cwd`.
    pub fn file_path(&self, cwd: &Path) -> Option<PathBuf> {
        if self.protocol() != "file:" {
            return None;
        }
        let path = Path::new(self.pathname());
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(cwd.join(path))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}

/// Return the URL scheme of `specifier`, if it has one.
///
/// Single-letter schemes are treated as Windows drive letters, not URLs.
fn scheme_of(specifier: &str) -> Option<&str> {
    let colon = specifier.find(':')?;
    let scheme = &specifier[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if scheme.len() < 2 || !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

/// User-visible argument sequence with freeze-once semantics.
///
/// Before [`Args::freeze`] the sequence behaves like a `Vec<String>`. After
/// freezing every mutating method returns [`ArgsError::Frozen`] and leaves the
/// contents untouched. Clones of a frozen sequence are frozen too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    items: Vec<String>,
    frozen: bool,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arg: impl Into<String>) -> Result<(), ArgsError> {
        self.check_mutable("push")?;
        self.items.push(arg.into());
        Ok(())
    }

    pub fn extend<I, S>(&mut self, args: I) -> Result<(), ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_mutable("extend")?;
        self.items.extend(args.into_iter().map(Into::into));
        Ok(())
    }

    pub fn insert(&mut self, index: usize, arg: impl Into<String>) -> Result<(), ArgsError> {
        self.check_mutable("insert")?;
        if index > self.items.len() {
            return Err(ArgsError::OutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index, arg.into());
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<String, ArgsError> {
        self.check_mutable("remove")?;
        if index >= self.items.len() {
            return Err(ArgsError::OutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) -> Result<(), ArgsError> {
        self.check_mutable("clear")?;
        self.items.clear();
        Ok(())
    }

    /// Make the sequence permanently immutable. Freezing twice is a no-op.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    fn check_mutable(&self, op: &'static str) -> Result<(), ArgsError> {
        if self.frozen {
            Err(ArgsError::Frozen { op })
        } else {
            Ok(())
        }
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ---------------------------------------------------------------------------
// ProcessState
// ---------------------------------------------------------------------------

/// Immutable snapshot of startup state handed to user-code entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessState {
    pub versions: Versions,
    pub location: Option<Location>,
    pub args: Args,
    pub cwd: PathBuf,
    pub name: String,
    /// Whether the `Deno` namespace stays visible to user code.
    pub namespace_visible: bool,
}

/// Mutable accumulator used while the dispatch sequence runs.
#[derive(Debug)]
pub struct ProcessStateBuilder {
    versions: Option<Versions>,
    location: Option<Location>,
    args: Args,
    cwd: PathBuf,
    name: String,
    namespace_visible: bool,
}

impl ProcessStateBuilder {
    pub fn new(cwd: PathBuf, name: Option<String>, namespace_visible: bool) -> Self {
        Self {
            versions: None,
            location: None,
            args: Args::new(),
            cwd,
            name: name.unwrap_or_else(|| DEFAULT_PROCESS_NAME.to_string()),
            namespace_visible,
        }
    }

    pub fn set_versions(&mut self, versions: Versions) -> Result<(), StateError> {
        if self.versions.is_some() {
            return Err(StateError::AlreadySet("versions"));
        }
        self.versions = Some(versions);
        Ok(())
    }

    pub fn set_location(&mut self, location: Location) -> Result<(), StateError> {
        if self.location.is_some() {
            return Err(StateError::AlreadySet("location"));
        }
        self.location = Some(location);
        Ok(())
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Args {
        &mut self.args
    }

    /// Consume the builder into the shared snapshot.
    ///
    /// Fails unless versions were recorded and args were frozen.
    pub fn build(self) -> Result<Arc<ProcessState>, StateError> {
        let versions = self.versions.ok_or(StateError::Missing("versions"))?;
        if !self.args.is_frozen() {
            return Err(StateError::Missing("frozen args"));
        }
        Ok(Arc::new(ProcessState {
            versions,
            location: self.location,
            args: self.args,
            cwd: self.cwd,
            name: self.name,
            namespace_visible: self.namespace_visible,
        }))
    }
}
