//! Startup dispatch: turn host startup information into one execution mode.
//!
//! The sequence is strictly ordered. Versions are recorded first so that the
//! version report can short-circuit everything else. The stack-trace
//! formatter is installed before any user code can observe an error, and the
//! argument list is frozen before control is handed to an entry point.
//!
//! Nothing here is ambient: the finished [`ProcessState`] snapshot is passed
//! to the entry point that takes over the process.

use crate::error::DispatchError;
use crate::error_stack::{set_prepare_stack_trace, CallSiteFormatter};
use crate::state::{Location, ProcessState, ProcessStateBuilder, Versions};
use crate::xeval::EvalHook;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything host initialization knows before dispatch starts.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupInfo {
    pub deno_version: String,
    pub v8_version: String,
    pub version_flag: bool,
    /// `Some("")` is a host contract violation and fails dispatch.
    pub main_module: Option<String>,
    pub cwd: PathBuf,
    /// Raw process arguments; index 0 is the program and never reaches `Args`.
    pub argv: Vec<String>,
    pub xeval_delim: String,
    /// Present when eval mode was requested.
    pub eval: Option<EvalHook>,
}

/// Flags the host passes through to the published state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    pub preserve_namespace: bool,
    pub name: Option<String>,
}

/// The single mode a startup resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionMode {
    VersionReport,
    Eval { hook: EvalHook, delimiter: String },
    Repl,
    ModuleExecution { path: String },
}

impl ExecutionMode {
    /// Decide the mode. Priority: version report, eval, REPL, module.
    ///
    /// An eval hook wins even when a main module is also present.
    pub fn resolve(info: &StartupInfo) -> Self {
        if info.version_flag {
            return Self::VersionReport;
        }
        if let Some(hook) = &info.eval {
            return Self::Eval {
                hook: hook.clone(),
                delimiter: info.xeval_delim.clone(),
            };
        }
        match &info.main_module {
            None => Self::Repl,
            Some(path) => Self::ModuleExecution { path: path.clone() },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::VersionReport => "version-report",
            Self::Eval { .. } => "eval",
            Self::Repl => "repl",
            Self::ModuleExecution { .. } => "module",
        }
    }
}

/// Entry points that own the process once dispatch hands over.
///
/// Each returns the process exit code.
pub trait Entrypoints {
    fn xeval_main(&mut self, hook: &EvalHook, delim: &str, state: Arc<ProcessState>) -> i32;
    fn repl_loop(&mut self, state: Arc<ProcessState>) -> i32;
}

/// How dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Terminal branch; the caller exits with this code.
    Exit(i32),
    /// An entry point ran to completion and returned this code.
    Completed(i32),
    /// Location is set; the module loader takes over with this state.
    ModuleExecution(Arc<ProcessState>),
}

/// Run the startup sequence exactly once.
pub fn dispatch<E, W>(
    info: StartupInfo,
    options: StartOptions,
    entrypoints: &mut E,
    stdout: &mut W,
) -> Result<Dispatched, DispatchError>
where
    E: Entrypoints + ?Sized,
    W: Write + ?Sized,
{
    let mode = ExecutionMode::resolve(&info);
    let mut builder =
        ProcessStateBuilder::new(info.cwd.clone(), options.name, options.preserve_namespace);

    let versions = Versions::new(info.deno_version.as_str(), info.v8_version.as_str());
    builder.set_versions(versions.clone())?;

    debug!(mode = mode.name(), "dispatching");
    match mode {
        ExecutionMode::VersionReport => {
            for line in versions.report_lines() {
                writeln!(stdout, "{line}")?;
            }
            stdout.flush()?;
            Ok(Dispatched::Exit(0))
        }
        ExecutionMode::Eval { hook, delimiter } => {
            let state = publish(&info, builder)?;
            if let Some(main_module) = &info.main_module {
                warn!(
                    main_module = %main_module,
                    "eval mode requested; main module will not run"
                );
            }
            let code = entrypoints.xeval_main(&hook, &delimiter, state);
            Ok(Dispatched::Completed(code))
        }
        ExecutionMode::Repl => {
            let state = publish(&info, builder)?;
            Ok(Dispatched::Completed(entrypoints.repl_loop(state)))
        }
        ExecutionMode::ModuleExecution { .. } => {
            Ok(Dispatched::ModuleExecution(publish(&info, builder)?))
        }
    }
}

/// Install the formatter, record location and args, then freeze the snapshot.
fn publish(
    info: &StartupInfo,
    mut builder: ProcessStateBuilder,
) -> Result<Arc<ProcessState>, DispatchError> {
    if !set_prepare_stack_trace(Box::new(CallSiteFormatter::new(info.cwd.clone()))) {
        debug!("stack trace formatter already installed");
    }

    if let Some(main_module) = &info.main_module {
        if main_module.is_empty() {
            return Err(DispatchError::EmptyMainModule);
        }
        builder.set_location(Location::new(main_module.as_str()))?;
    }

    debug!(cwd = %info.cwd.display(), "cwd");

    builder.args_mut().extend(info.argv.iter().skip(1))?;
    debug!(args = ?builder.args().as_slice(), "args");
    builder.args_mut().freeze();

    Ok(builder.build()?)
}
