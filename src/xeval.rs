//! Eval mode: run a compiled hook once per delimited chunk of input.
//!
//! Input is consumed as a byte stream and split on a delimiter of any length.
//! Matching uses a KMP automaton so a delimiter straddling two reads is still
//! recognized. Empty chunks are skipped.

use crate::engine::{compile, Engine, Program, Value};
use crate::error::EvalError;
use crate::error_stack::ErrorReport;
use crate::state::ProcessState;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use tracing::trace;

/// Delimiter used when the host supplies an empty one.
pub const DEFAULT_DELIMITER: &str = "\n";

/// Variable bound to each chunk when none is configured.
pub const DEFAULT_REPLVAR: &str = "$";

/// Virtual file name used in frames raised by eval-mode code.
pub const XEVAL_FILE: &str = "<xeval>";

const READ_BUFFER_BYTES: usize = 8 * 1024;

/// User code to run per chunk, with the name it sees the chunk under.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalHook {
    program: Program,
    replvar: String,
}

impl EvalHook {
    /// Compile `code` into a hook that receives each chunk as `replvar`.
    pub fn compile(code: &str, replvar: &str) -> Result<Self, ErrorReport> {
        Ok(Self {
            program: compile(code, XEVAL_FILE)?,
            replvar: replvar.to_string(),
        })
    }

    pub fn replvar(&self) -> &str {
        &self.replvar
    }

    /// Run the hook for a single chunk.
    pub fn call(
        &self,
        engine: &mut Engine,
        chunk: &str,
        out: &mut dyn Write,
    ) -> Result<Value, ErrorReport> {
        engine.bind(self.replvar.as_str(), Value::from(chunk));
        engine.run(&self.program, out)
    }
}

/// Whether `name` can be referenced from script code.
pub fn is_valid_replvar(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !matches!(name, "let" | "true" | "false" | "null" | "undefined")
}

/// Eval-mode entry point.
///
/// Reads `input` to EOF, invoking `hook` for every non-empty chunk. Returns the
/// number of chunks processed; the first failing chunk aborts the run.
pub fn xeval_main<R: Read>(
    hook: &EvalHook,
    delim: &str,
    input: R,
    out: &mut dyn Write,
    state: &ProcessState,
) -> Result<usize, EvalError> {
    let delim = if delim.is_empty() {
        DEFAULT_DELIMITER
    } else {
        delim
    };
    let mut engine = Engine::for_process(state);
    let mut processed = 0;
    for chunk in Chunks::new(input, delim.as_bytes()) {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        let text = String::from_utf8_lossy(&chunk);
        trace!(bytes = chunk.len(), "xeval chunk");
        hook.call(&mut engine, &text, out)?;
        processed += 1;
    }
    out.flush()?;
    Ok(processed)
}

/// Streaming splitter yielding the byte runs between delimiter matches.
pub struct Chunks<R> {
    reader: R,
    delim: Vec<u8>,
    /// Longest proper prefix that is also a suffix, per delimiter prefix.
    lps: Vec<usize>,
    current: Vec<u8>,
    matched: usize,
    ready: VecDeque<Vec<u8>>,
    eof: bool,
}

impl<R: Read> Chunks<R> {
    /// Split `reader` on `delim`, which must not be empty.
    pub fn new(reader: R, delim: &[u8]) -> Self {
        let delim = if delim.is_empty() {
            DEFAULT_DELIMITER.as_bytes().to_vec()
        } else {
            delim.to_vec()
        };
        Self {
            reader,
            lps: longest_prefix_suffix(&delim),
            delim,
            current: Vec::new(),
            matched: 0,
            ready: VecDeque::new(),
            eof: false,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            while self.matched > 0 && self.delim[self.matched] != b {
                self.matched = self.lps[self.matched - 1];
            }
            if self.delim[self.matched] == b {
                self.matched += 1;
            }
            self.current.push(b);
            if self.matched == self.delim.len() {
                let end = self.current.len() - self.delim.len();
                self.current.truncate(end);
                self.ready.push_back(std::mem::take(&mut self.current));
                self.matched = 0;
            }
        }
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = [0u8; READ_BUFFER_BYTES];
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                return Some(Ok(chunk));
            }
            if self.eof {
                return None;
            }
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.eof = true;
                    // Bytes of an unfinished delimiter match are ordinary content.
                    self.ready.push_back(std::mem::take(&mut self.current));
                }
                Ok(n) => self.feed(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.eof = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn longest_prefix_suffix(pattern: &[u8]) -> Vec<usize> {
    let mut lps = vec![0; pattern.len()];
    let mut len = 0;
    let mut i = 1;
    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            lps[i] = len;
            i += 1;
        } else if len > 0 {
            len = lps[len - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }
    lps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_stack::ErrorKind;
    use crate::testsupport::frozen_state;
    use std::path::Path;

    /// Reader that hands out at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn split(data: &str, delim: &str, step: usize) -> Vec<String> {
        Chunks::new(
            Trickle {
                data: data.as_bytes(),
                step,
            },
            delim.as_bytes(),
        )
        .map(|chunk| String::from_utf8(chunk.expect("read")).expect("utf8"))
        .collect()
    }

    fn state() -> ProcessState {
        frozen_state(&[], None, Path::new("/"))
    }

    #[test]
    fn lps_table_matches_known_pattern() {
        assert_eq!(longest_prefix_suffix(b"aabaaab"), vec![0, 1, 0, 1, 2, 2, 3]);
    }

    #[test]
    fn splits_on_newlines_by_default() {
        assert_eq!(split("a\nb\n\nc", "\n", 64), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn multi_byte_delimiter_across_reads() {
        for step in 1..6 {
            assert_eq!(
                split("one<>two<>three", "<>", step),
                vec!["one", "two", "three"],
                "step {step}"
            );
        }
    }

    #[test]
    fn overlapping_partial_match_is_content() {
        assert_eq!(split("xaaby", "aab", 1), vec!["x", "y"]);
        assert_eq!(split("aaaab", "aab", 2), vec!["aa", ""]);
        assert_eq!(split("tail<", "<>", 3), vec!["tail<"]);
    }

    #[test]
    fn empty_delimiter_falls_back_to_newline() {
        assert_eq!(split("a\nb", "", 4), vec!["a", "b"]);
    }

    #[test]
    fn xeval_main_runs_hook_for_non_empty_chunks() {
        let hook = EvalHook::compile("print('<' + $ + '>')", DEFAULT_REPLVAR).expect("compile");
        let mut out = Vec::new();
        let processed =
            xeval_main(&hook, "", "a\n\nb\n".as_bytes(), &mut out, &state()).expect("xeval");
        assert_eq!(processed, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "<a>\n<b>\n");
    }

    #[test]
    fn xeval_main_honours_custom_delimiter_and_replvar() {
        let hook = EvalHook::compile("print(len(line))", "line").expect("compile");
        assert_eq!(hook.replvar(), "line");
        let mut out = Vec::new();
        xeval_main(&hook, ",", "ab,cde,".as_bytes(), &mut out, &state()).expect("xeval");
        assert_eq!(String::from_utf8(out).unwrap(), "2\n3\n");
    }

    #[test]
    fn xeval_main_stops_on_first_script_error() {
        let hook = EvalHook::compile("print($); $ - 1", DEFAULT_REPLVAR).expect("compile");
        let mut out = Vec::new();
        let err = xeval_main(&hook, "\n", "a\nb\n".as_bytes(), &mut out, &state()).unwrap_err();
        let EvalError::Script(report) = err else {
            panic!("expected script error, got {err:?}");
        };
        assert_eq!(report.kind, ErrorKind::TypeError);
        assert_eq!(String::from_utf8(out).unwrap(), "a\n");
    }

    #[test]
    fn replvar_validation() {
        assert!(is_valid_replvar("$"));
        assert!(is_valid_replvar("line_2"));
        assert!(!is_valid_replvar(""));
        assert!(!is_valid_replvar("2x"));
        assert!(!is_valid_replvar("let"));
        assert!(!is_valid_replvar("a-b"));
    }
}
