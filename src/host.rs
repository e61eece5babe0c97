//! Host initialization: turn parsed command-line input into [`StartupInfo`].
//!
//! `argv` follows the runtime convention of `[program, script, script args...]`
//! so that user code sees the script name as its first argument.

use std::path::PathBuf;

use crate::build_info;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::dispatch::StartupInfo;
use crate::engine::ENGINE_VERSION;
use crate::error::HostError;
use crate::xeval::{is_valid_replvar, EvalHook};

/// Build the startup record for `cli`.
///
/// Eval code is compiled here so a syntax error is reported before dispatch.
/// When the version report was requested nothing is compiled.
pub fn start(
    cli: &Cli,
    program: &str,
    cwd: PathBuf,
    config: &Config,
) -> Result<StartupInfo, HostError> {
    let (main_module, script_args, eval, delim) = match &cli.command {
        Some(Command::Run { script, args }) => (Some(script.clone()), args.clone(), None, None),
        Some(Command::Repl) => (None, Vec::new(), None, None),
        Some(Command::Xeval {
            delim,
            replvar,
            code,
        }) => {
            let eval = if cli.version {
                None
            } else {
                let replvar = replvar.as_deref().unwrap_or(&config.xeval.replvar);
                Some(compile_hook(code, replvar)?)
            };
            (None, Vec::new(), eval, delim.clone())
        }
        None => (cli.script.clone(), cli.args.clone(), None, None),
    };

    let mut argv = Vec::with_capacity(2 + script_args.len());
    argv.push(program.to_string());
    argv.extend(main_module.iter().cloned());
    argv.extend(script_args);

    Ok(StartupInfo {
        deno_version: build_info::VERSION.to_string(),
        v8_version: ENGINE_VERSION.to_string(),
        version_flag: cli.version,
        main_module,
        cwd,
        argv,
        xeval_delim: delim.unwrap_or_else(|| config.xeval.delimiter.clone()),
        eval,
    })
}

fn compile_hook(code: &str, replvar: &str) -> Result<EvalHook, HostError> {
    if !is_valid_replvar(replvar) {
        return Err(HostError::InvalidReplvar(replvar.to_string()));
    }
    EvalHook::compile(code, replvar).map_err(HostError::XevalSource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn startup(args: &[&str]) -> Result<StartupInfo, HostError> {
        startup_with(args, &Config::default())
    }

    fn startup_with(args: &[&str], config: &Config) -> Result<StartupInfo, HostError> {
        let cli = Cli::parse_from(args);
        start(&cli, "deno", PathBuf::from("/work"), config)
    }

    #[test]
    fn bare_invocation_is_repl_shaped() {
        let info = startup(&["deno"]).expect("start");
        assert_eq!(info.main_module, None);
        assert_eq!(info.argv, vec!["deno"]);
        assert!(info.eval.is_none());
        assert!(!info.version_flag);
        assert_eq!(info.v8_version, ENGINE_VERSION);
        assert_eq!(info.deno_version, build_info::VERSION);
    }

    #[test]
    fn script_name_leads_user_args() {
        let info = startup(&["deno", "main.js", "a", "b"]).expect("start");
        assert_eq!(info.main_module.as_deref(), Some("main.js"));
        assert_eq!(info.argv, vec!["deno", "main.js", "a", "b"]);
    }

    #[test]
    fn run_subcommand_matches_positional_form() {
        let run = startup(&["deno", "run", "main.js", "a"]).expect("start");
        let bare = startup(&["deno", "main.js", "a"]).expect("start");
        assert_eq!(run, bare);
    }

    #[test]
    fn xeval_compiles_hook_and_takes_delimiter() {
        let info = startup(&["deno", "xeval", "-d", "::", "print($)"]).expect("start");
        let hook = info.eval.expect("hook");
        assert_eq!(hook.replvar(), "$");
        assert_eq!(info.xeval_delim, "::");
        assert_eq!(info.main_module, None);
    }

    #[test]
    fn xeval_falls_back_to_config_defaults() {
        let mut config = Config::default();
        config.xeval.delimiter = ",".into();
        config.xeval.replvar = "row".into();
        let info = startup_with(&["deno", "xeval", "print(row)"], &config).expect("start");
        assert_eq!(info.xeval_delim, ",");
        assert_eq!(info.eval.expect("hook").replvar(), "row");
    }

    #[test]
    fn xeval_syntax_error_is_reported_before_dispatch() {
        let err = startup(&["deno", "xeval", "print("]).unwrap_err();
        assert!(matches!(err, HostError::XevalSource(_)), "got: {err:?}");
    }

    #[test]
    fn invalid_replvar_is_rejected() {
        let err = startup(&["deno", "xeval", "-I", "9x", "1"]).unwrap_err();
        assert!(matches!(err, HostError::InvalidReplvar(ref n) if n == "9x"));
    }

    #[test]
    fn version_flag_skips_eval_compilation() {
        let info = startup(&["deno", "xeval", "-v", "print("]).expect("start");
        assert!(info.version_flag);
        assert!(info.eval.is_none());
    }
}
