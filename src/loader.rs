//! Module execution driven by the script location published at startup.

use crate::engine::{compile, Engine};
use crate::error::LoadError;
use crate::state::ProcessState;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Runs the main module named by [`ProcessState::location`].
pub trait ModuleLoader {
    fn run_main_module(&self, state: &ProcessState, out: &mut dyn Write)
        -> Result<(), LoadError>;
}

/// Loader that reads `file:` locations from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsModuleLoader;

impl FsModuleLoader {
    /// Resolve the location to a path on disk.
    pub fn resolve(&self, state: &ProcessState) -> Result<PathBuf, LoadError> {
        let location = state.location.as_ref().ok_or(LoadError::NoLocation)?;
        location
            .file_path(&state.cwd)
            .ok_or_else(|| LoadError::UnsupportedScheme(location.protocol()))
    }
}

impl ModuleLoader for FsModuleLoader {
    fn run_main_module(
        &self,
        state: &ProcessState,
        out: &mut dyn Write,
    ) -> Result<(), LoadError> {
        let path = self.resolve(state)?;
        debug!(path = %path.display(), "loading main module");
        let source = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;
        let program = compile(&source, &path.display().to_string())?;
        let mut engine = Engine::for_process(state);
        engine.run(&program, out)?;
        out.flush().map_err(|source| LoadError::Read { path, source })?;
        Ok(())
    }
}
