//! Stamps the `deno` binary with the commit and build time shown by
//! `deno --help` and in the startup debug log.
//!
//! Either value can be pinned from the environment for reproducible builds;
//! otherwise git and `date` are asked, with "unknown" markers on failure.

use std::env;
use std::fs;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const GIT_HASH_VAR: &str = "DENO_BUILD_GIT_HASH";
const TIMESTAMP_VAR: &str = "DENO_BUILD_TIMESTAMP";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    watch_head_ref();
    stamp(GIT_HASH_VAR, git_short_hash);
    stamp(TIMESTAMP_VAR, build_timestamp_utc);
}

/// Export `var` to the crate, preferring a value pinned in the environment.
fn stamp(var: &str, detect: fn() -> String) {
    println!("cargo:rerun-if-env-changed={var}");
    let value = env::var(var).unwrap_or_else(|_| detect());
    println!("cargo:rustc-env={var}={value}");
}

fn watch_head_ref() {
    let Ok(head) = fs::read_to_string(".git/HEAD") else {
        return;
    };
    if let Some(reference) = head.trim().strip_prefix("ref: ") {
        println!("cargo:rerun-if-changed=.git/{reference}");
    }
}

fn git_short_hash() -> String {
    command_output("git", &["rev-parse", "--short=12", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string())
}

fn build_timestamp_utc() -> String {
    if let Some(timestamp) = command_output("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]) {
        return timestamp;
    }
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|delta| delta.as_secs())
        .unwrap_or(0);
    format!("unix:{secs}")
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
