//! Runtime values and their two renderings.

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Functions provided by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Len,
    Str,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Len => "len",
            Self::Str => "str",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    /// Read-only record such as the `Deno` namespace.
    Namespace(BTreeMap<String, Value>),
    Builtin(Builtin),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Namespace(_) => "object",
            Self::Builtin(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::List(_) | Self::Namespace(_) | Self::Builtin(_) => true,
        }
    }

    /// Plain rendering used by `print` and string concatenation.
    pub fn display(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Value::display)
                .collect::<Vec<_>>()
                .join(","),
            other => other.inspect(),
        }
    }

    /// Debug-style rendering used for REPL results: strings are quoted.
    pub fn inspect(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Str(s) => format!("{s:?}"),
            Self::List(items) if items.is_empty() => "[]".to_string(),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::inspect).collect();
                format!("[ {} ]", inner.join(", "))
            }
            Self::Namespace(fields) if fields.is_empty() => "{}".to_string(),
            Self::Namespace(fields) => {
                let mut out = String::from("{ ");
                for (idx, (key, value)) in fields.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{key}: {}", value.inspect());
                }
                out.push_str(" }");
                out
            }
            Self::Builtin(builtin) => format!("[Function: {}]", builtin.name()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        // Integral values print without a fractional part; `-0` prints as `0`.
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
