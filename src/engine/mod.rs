//! Embedded expression engine shared by eval mode, the REPL, and the loader.
//!
//! The language is deliberately small: `let` bindings, expression statements,
//! arithmetic/comparison/logical operators, lists, member access, and a few
//! builtins. Each entry point compiles source into a [`Program`] and runs it
//! against an [`Engine`] whose global scope mirrors the process state.

mod lexer;
mod parser;
pub mod value;

use crate::error_stack::{ErrorKind, ErrorReport, StackFrame};
use crate::state::ProcessState;
use parser::{BinaryOp, Expr, ExprKind, Parser, Stmt, UnaryOp};
use std::collections::BTreeMap;
use std::io::Write;

pub use value::{Builtin, Value};

/// Version of the embedded engine, reported on the `v8:` line.
pub const ENGINE_VERSION: &str = "0.3.0";

/// Name of the runtime namespace injected into the global scope.
pub const NAMESPACE_GLOBAL: &str = "Deno";

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pos {
    pub line: u32,
    pub column: u32,
}

pub(crate) fn frame_at(file: &str, pos: Pos) -> StackFrame {
    StackFrame {
        function: None,
        file: file.to_string(),
        line: pos.line,
        column: pos.column,
    }
}

/// Parsed source ready to run, remembering the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    statements: Vec<Stmt>,
    file: String,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Parse `source`; syntax errors carry a frame pointing into `file`.
pub fn compile(source: &str, file: &str) -> Result<Program, ErrorReport> {
    let tokens = lexer::tokenize(source, file)?;
    let statements = Parser::new(tokens, file).parse_program()?;
    Ok(Program {
        statements,
        file: file.to_string(),
    })
}

/// Global scope plus user bindings that persist across runs.
#[derive(Debug, Clone)]
pub struct Engine {
    globals: BTreeMap<String, Value>,
    bindings: BTreeMap<String, Value>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with builtins only.
    pub fn new() -> Self {
        let globals = [Builtin::Print, Builtin::Len, Builtin::Str]
            .into_iter()
            .map(|b| (b.name().to_string(), Value::Builtin(b)))
            .collect();
        Self {
            globals,
            bindings: BTreeMap::new(),
        }
    }

    /// Engine whose globals expose the process state.
    ///
    /// The `Deno` namespace is only installed when the host asked to keep it
    /// visible to user code.
    pub fn for_process(state: &ProcessState) -> Self {
        let mut engine = Self::new();
        if state.namespace_visible {
            engine
                .globals
                .insert(NAMESPACE_GLOBAL.to_string(), namespace_value(state));
        }
        engine
    }

    /// Bind `name` in the user scope, shadowing any global of the same name.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).or_else(|| self.globals.get(name))
    }

    /// Compile and run `source` in one step.
    pub fn eval(
        &mut self,
        source: &str,
        file: &str,
        out: &mut dyn Write,
    ) -> Result<Value, ErrorReport> {
        let program = compile(source, file)?;
        self.run(&program, out)
    }

    /// Run `program`, returning the value of its last expression statement.
    pub fn run(&mut self, program: &Program, out: &mut dyn Write) -> Result<Value, ErrorReport> {
        let mut ctx = Context {
            engine: self,
            out,
            file: &program.file,
        };
        let mut last = Value::Undefined;
        for stmt in &program.statements {
            last = match stmt {
                Stmt::Let { name, value } => {
                    let value = ctx.eval(value)?;
                    ctx.engine.bindings.insert(name.clone(), value);
                    Value::Undefined
                }
                Stmt::Expr(expr) => ctx.eval(expr)?,
            };
        }
        Ok(last)
    }
}

fn namespace_value(state: &ProcessState) -> Value {
    let mut version = BTreeMap::new();
    version.insert("deno".to_string(), Value::from(state.versions.deno.as_str()));
    version.insert("v8".to_string(), Value::from(state.versions.v8.as_str()));
    version.insert(
        "typescript".to_string(),
        Value::from(state.versions.typescript.as_str()),
    );

    let mut fields = BTreeMap::new();
    fields.insert(
        "args".to_string(),
        Value::List(state.args.iter().map(|a| Value::from(a.as_str())).collect()),
    );
    fields.insert("version".to_string(), Value::Namespace(version));
    fields.insert(
        "cwd".to_string(),
        Value::from(state.cwd.display().to_string()),
    );
    if let Some(location) = &state.location {
        fields.insert("location".to_string(), Value::from(location.href()));
    }
    Value::Namespace(fields)
}

struct Context<'a> {
    engine: &'a mut Engine,
    out: &'a mut dyn Write,
    file: &'a str,
}

impl Context<'_> {
    fn error(&self, kind: ErrorKind, message: impl Into<String>, pos: Pos) -> ErrorReport {
        ErrorReport::new(kind, message).with_frame(frame_at(self.file, pos))
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, ErrorReport> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Undefined => Ok(Value::Undefined),
            ExprKind::Ident(name) => self.engine.lookup(name).cloned().ok_or_else(|| {
                self.error(
                    ErrorKind::ReferenceError,
                    format!("{name} is not defined"),
                    expr.pos,
                )
            }),
            ExprKind::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match (op, value) {
                    (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
                    (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOp::Neg, other) => Err(self.error(
                        ErrorKind::TypeError,
                        format!("cannot negate a {}", other.type_name()),
                        expr.pos,
                    )),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs, expr.pos),
            ExprKind::Call { callee, args } => {
                let target = self.eval(callee)?;
                let Value::Builtin(builtin) = target else {
                    return Err(self.error(
                        ErrorKind::TypeError,
                        format!("{} is not a function", describe_callee(callee)),
                        expr.pos,
                    ));
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(builtin, args, expr.pos)
            }
            ExprKind::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                self.index(target, index, expr.pos)
            }
            ExprKind::Member { target, name } => {
                let target = self.eval(target)?;
                self.member(target, name, expr.pos)
            }
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        pos: Pos,
    ) -> Result<Value, ErrorReport> {
        let left = self.eval(lhs)?;
        match op {
            BinaryOp::And if !left.is_truthy() => return Ok(left),
            BinaryOp::Or if left.is_truthy() => return Ok(left),
            BinaryOp::And | BinaryOp::Or => return self.eval(rhs),
            _ => {}
        }
        let right = self.eval(rhs)?;
        let result = match (op, &left, &right) {
            (BinaryOp::Eq, l, r) => Value::Bool(l == r),
            (BinaryOp::Ne, l, r) => Value::Bool(l != r),
            (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (BinaryOp::Add, Value::Str(_), _) | (BinaryOp::Add, _, Value::Str(_)) => {
                Value::Str(left.display() + &right.display())
            }
            (BinaryOp::Add, Value::List(a), Value::List(b)) => {
                Value::List(a.iter().chain(b).cloned().collect())
            }
            (BinaryOp::Sub, Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            (BinaryOp::Mul, Value::Number(a), Value::Number(b)) => Value::Number(a * b),
            (BinaryOp::Div, Value::Number(a), Value::Number(b)) => Value::Number(a / b),
            (BinaryOp::Rem, Value::Number(a), Value::Number(b)) => Value::Number(a % b),
            (BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge, l, r) => {
                let ordering = match (l, r) {
                    (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    _ => return Err(self.operand_error(op, &left, &right, pos)),
                };
                Value::Bool(ordering.is_some_and(|ordering| match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                }))
            }
            _ => return Err(self.operand_error(op, &left, &right, pos)),
        };
        Ok(result)
    }

    fn operand_error(&self, op: BinaryOp, left: &Value, right: &Value, pos: Pos) -> ErrorReport {
        self.error(
            ErrorKind::TypeError,
            format!(
                "cannot apply `{}` to {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            pos,
        )
    }

    fn call(&mut self, builtin: Builtin, args: Vec<Value>, pos: Pos) -> Result<Value, ErrorReport> {
        match builtin {
            Builtin::Print => {
                let line: Vec<String> = args.iter().map(Value::display).collect();
                writeln!(self.out, "{}", line.join(" ")).map_err(|e| {
                    self.error(ErrorKind::Error, format!("failed to write output: {e}"), pos)
                })?;
                Ok(Value::Undefined)
            }
            Builtin::Len => match args.as_slice() {
                [Value::Str(s)] => Ok(Value::Number(s.chars().count() as f64)),
                [Value::List(items)] => Ok(Value::Number(items.len() as f64)),
                [other] => Err(self.error(
                    ErrorKind::TypeError,
                    format!("len() does not accept a {}", other.type_name()),
                    pos,
                )),
                _ => Err(self.arity_error(builtin, 1, args.len(), pos)),
            },
            Builtin::Str => match args.as_slice() {
                [value] => Ok(Value::Str(value.display())),
                _ => Err(self.arity_error(builtin, 1, args.len(), pos)),
            },
        }
    }

    fn arity_error(&self, builtin: Builtin, expected: usize, got: usize, pos: Pos) -> ErrorReport {
        self.error(
            ErrorKind::TypeError,
            format!(
                "{}() takes {expected} argument(s) but {got} were given",
                builtin.name()
            ),
            pos,
        )
    }

    fn index(&self, target: Value, index: Value, pos: Pos) -> Result<Value, ErrorReport> {
        match (target, index) {
            (Value::List(items), Value::Number(n)) => {
                Ok(list_slot(n).and_then(|i| items.get(i).cloned()).unwrap_or(Value::Undefined))
            }
            (Value::Str(s), Value::Number(n)) => Ok(list_slot(n)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::Str(c.to_string()))
                .unwrap_or(Value::Undefined)),
            (Value::Namespace(fields), Value::Str(key)) => {
                Ok(fields.get(&key).cloned().unwrap_or(Value::Undefined))
            }
            (target @ (Value::Undefined | Value::Null), _) => Err(self.error(
                ErrorKind::TypeError,
                format!("cannot index into {}", target.type_name()),
                pos,
            )),
            (target, index) => Err(self.error(
                ErrorKind::TypeError,
                format!(
                    "cannot index a {} with a {}",
                    target.type_name(),
                    index.type_name()
                ),
                pos,
            )),
        }
    }

    fn member(&self, target: Value, name: &str, pos: Pos) -> Result<Value, ErrorReport> {
        match (target, name) {
            (Value::Namespace(fields), _) => {
                Ok(fields.get(name).cloned().unwrap_or(Value::Undefined))
            }
            (Value::List(items), "length") => Ok(Value::Number(items.len() as f64)),
            (Value::Str(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
            (target @ (Value::Undefined | Value::Null), _) => Err(self.error(
                ErrorKind::TypeError,
                format!("cannot read property `{name}` of {}", target.type_name()),
                pos,
            )),
            _ => Ok(Value::Undefined),
        }
    }
}

/// Integral, non-negative number as a list position.
fn list_slot(n: f64) -> Option<usize> {
    (n >= 0.0 && n == n.trunc()).then_some(n as usize)
}

fn describe_callee(callee: &Expr) -> String {
    match &callee.kind {
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Member { name, .. } => name.clone(),
        _ => "expression".to_string(),
    }
}
