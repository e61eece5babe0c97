//! Fixtures shared by the loader, config and dispatch tests.

use crate::state::{Args, Location, ProcessState, Versions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Scratch working directory for scripts and config files, removed on drop.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Unique per process and per call, so parallel tests never collide.
    pub fn new(label: &str) -> Self {
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "deno-boot-{label}-{}-{n}",
            std::process::id()
        ));
        fs::create_dir_all(&root).expect("create scratch dir");
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `text` to `name` under the root and return the full path.
    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, text).expect("write scratch file");
        path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Frozen process state for collaborator tests.
pub fn frozen_state(args: &[&str], location: Option<&str>, cwd: &Path) -> ProcessState {
    let mut frozen = Args::new();
    frozen.extend(args.iter().copied()).expect("fresh args are mutable");
    frozen.freeze();
    ProcessState {
        versions: Versions::new("0.9.0", "0.3.0"),
        location: location.map(Location::new),
        args: frozen,
        cwd: cwd.to_path_buf(),
        name: "main".to_string(),
        namespace_visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let scratch = ScratchDir::new("fixture");
        let file = scratch.write("main.js", "print(1)");
        assert_eq!(fs::read_to_string(&file).unwrap(), "print(1)");
        let root = scratch.path().to_path_buf();
        drop(scratch);
        assert!(!root.exists());
    }

    #[test]
    fn frozen_state_is_frozen() {
        let state = frozen_state(&["a"], Some("a.js"), Path::new("/"));
        assert!(state.args.is_frozen());
        assert_eq!(state.location.map(|l| l.href().to_string()), Some("a.js".into()));
    }
}
