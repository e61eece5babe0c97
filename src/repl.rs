//! Interactive read-eval-print loop.
//!
//! Input is plain line-based text; there is no line editor. An entry whose
//! parse fails only because input ended early keeps collecting lines under
//! the continuation prompt until it parses or fails for real.

use crate::engine::{compile, Engine, Value};
use crate::error_stack::format_error;
use crate::state::ProcessState;
use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use crossterm::QueueableCommand;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Virtual file name used in frames raised by REPL input.
pub const REPL_FILE: &str = "<repl>";

/// Binding that holds the last successful result.
pub const LAST_RESULT_BINDING: &str = "_";

/// Binding that holds the message of the last thrown error.
pub const LAST_ERROR_BINDING: &str = "_error";

pub const HELP_TEXT: &str = "\
_       Get last evaluation result
_error  Get last thrown error
exit    Exit the REPL
help    Print this help message";

/// Prompt strings and styling for the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplOptions {
    pub prompt: String,
    pub continuation_prompt: String,
    pub color: bool,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            continuation_prompt: "... ".to_string(),
            color: false,
        }
    }
}

/// REPL entry point. Runs until `exit` or end of input and returns the exit code.
///
/// Results go to `out`; formatted errors go to `err`.
pub fn repl_loop<R, W, E>(
    mut input: R,
    out: &mut W,
    err: &mut E,
    state: &ProcessState,
    options: &ReplOptions,
) -> io::Result<i32>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    debug!(name = %state.name, "repl started");
    let mut engine = Engine::for_process(state);
    let mut pending = String::new();
    let mut line = String::new();

    loop {
        let prompt = if pending.is_empty() {
            &options.prompt
        } else {
            &options.continuation_prompt
        };
        write_prompt(out, prompt, options.color)?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            out.flush()?;
            return Ok(0);
        }

        if pending.is_empty() {
            match line.trim() {
                "" => continue,
                "exit" => return Ok(0),
                "help" => {
                    writeln!(out, "{HELP_TEXT}")?;
                    continue;
                }
                _ => {}
            }
        }
        pending.push_str(&line);

        let program = match compile(&pending, REPL_FILE) {
            Ok(program) => program,
            Err(report) if report.recoverable => continue,
            Err(report) => {
                pending.clear();
                engine.bind(LAST_ERROR_BINDING, Value::from(report.to_string()));
                writeln!(err, "{}", format_error(&report))?;
                continue;
            }
        };
        pending.clear();

        match engine.run(&program, out) {
            Ok(Value::Undefined) => {}
            Ok(value) => {
                writeln!(out, "{}", value.inspect())?;
                engine.bind(LAST_RESULT_BINDING, value);
            }
            Err(report) => {
                engine.bind(LAST_ERROR_BINDING, Value::from(report.to_string()));
                writeln!(err, "{}", format_error(&report))?;
            }
        }
    }
}

fn write_prompt<W: Write>(out: &mut W, prompt: &str, color: bool) -> io::Result<()> {
    if color {
        out.queue(PrintStyledContent(prompt.with(Color::Green)))?;
    } else {
        out.queue(Print(prompt))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::frozen_state;
    use std::path::Path;

    struct Session {
        code: i32,
        out: String,
        err: String,
    }

    fn state() -> ProcessState {
        frozen_state(&["first"], None, Path::new("/"))
    }

    fn run(input: &str) -> Session {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = repl_loop(
            input.as_bytes(),
            &mut out,
            &mut err,
            &state(),
            &ReplOptions::default(),
        )
        .expect("repl io");
        Session {
            code,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    #[test]
    fn evaluates_and_prints_results() {
        let session = run("1 + 1\n'hi'\n");
        assert_eq!(session.code, 0);
        assert_eq!(session.out, "> 2\n> \"hi\"\n> \n");
        assert!(session.err.is_empty());
    }

    #[test]
    fn undefined_results_are_not_echoed() {
        let session = run("let x = 3\nprint(x)\n");
        assert_eq!(session.out, "> > 3\n> \n");
    }

    #[test]
    fn exit_command_stops_the_loop() {
        let session = run("exit\n1 + 1\n");
        assert_eq!(session.code, 0);
        assert_eq!(session.out, "> ");
    }

    #[test]
    fn help_command_prints_help() {
        let session = run("help\n");
        assert!(session.out.contains("Exit the REPL"), "got: {}", session.out);
    }

    #[test]
    fn errors_are_reported_and_loop_continues() {
        let session = run("missing\n_error\n");
        assert!(
            session.err.contains("ReferenceError: missing is not defined"),
            "got: {}",
            session.err
        );
        assert!(
            session.out.contains("\"ReferenceError: missing is not defined\""),
            "got: {}",
            session.out
        );
    }

    #[test]
    fn last_result_is_bound() {
        let session = run("20 + 1\n_ * 2\n");
        assert_eq!(session.out, "> 21\n> 42\n> \n");
    }

    #[test]
    fn incomplete_input_continues_on_next_line() {
        let session = run("1 +\n2\n");
        assert_eq!(session.out, "> ... 3\n> \n");
    }

    #[test]
    fn namespace_is_available() {
        let session = run("Deno.args\n");
        assert_eq!(session.out, "> [ \"first\" ]\n> \n");
    }

    #[test]
    fn syntax_errors_reset_pending_input() {
        let session = run("1 2\n5\n");
        assert!(session.err.contains("SyntaxError"), "got: {}", session.err);
        assert_eq!(session.out, "> > 5\n> \n");
    }
}
