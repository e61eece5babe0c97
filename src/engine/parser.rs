//! Precedence-climbing parser producing the statement tree.

use crate::error_stack::{ErrorKind, ErrorReport};

use super::lexer::{Token, TokenKind};
use super::{frame_at, Pos};

/// Deepest expression tree the parser will build. Evaluation and drop both
/// recurse over the tree, so the bound keeps every pass off the stack limit.
pub(crate) const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    Let { name: String, value: Expr },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExprKind {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Ident(String),
    List(Vec<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        target: Box<Expr>,
        name: String,
    },
}

pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    cursor: usize,
    /// Open `(`/`[` count; newlines inside brackets are insignificant.
    nesting: usize,
    /// Height of the expression tree under construction.
    depth: usize,
    file: &'a str,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: Vec<Token>, file: &'a str) -> Self {
        Self {
            tokens,
            cursor: 0,
            nesting: 0,
            depth: 0,
            file,
        }
    }

    pub(crate) fn parse_program(mut self) -> Result<Vec<Stmt>, ErrorReport> {
        let mut statements = Vec::new();
        loop {
            while matches!(self.peek_raw().kind, TokenKind::Newline | TokenKind::Semicolon) {
                self.cursor += 1;
            }
            if self.peek_raw().kind == TokenKind::Eof {
                return Ok(statements);
            }
            statements.push(self.statement()?);
            match self.peek_raw().kind {
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn statement(&mut self) -> Result<Stmt, ErrorReport> {
        if self.peek().kind != TokenKind::Let {
            return Ok(Stmt::Expr(self.expression()?));
        }
        self.advance();
        let name = match self.advance() {
            Token {
                kind: TokenKind::Ident(name),
                ..
            } => name,
            token => return Err(self.unexpected_token(&token)),
        };
        self.expect(TokenKind::Assign, "`=`")?;
        self.skip_newlines();
        let value = self.expression()?;
        Ok(Stmt::Let { name, value })
    }

    fn expression(&mut self) -> Result<Expr, ErrorReport> {
        self.binary(0)
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expr, ErrorReport> {
        let outer = self.depth;
        let mut lhs = self.unary()?;
        while let Some((op, precedence)) = binary_op(&self.peek().kind) {
            if precedence < min_precedence {
                break;
            }
            let pos = self.advance().pos;
            self.descend(pos)?;
            self.skip_newlines();
            let rhs = self.binary(precedence + 1)?;
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                pos,
            };
        }
        self.depth = outer;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ErrorReport> {
        let pos = self.peek().pos;
        self.descend(pos)?;
        let expr = self.unary_operand();
        self.depth -= 1;
        expr
    }

    fn unary_operand(&mut self) -> Result<Expr, ErrorReport> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.postfix(),
        };
        let pos = self.advance().pos;
        let operand = self.unary()?;
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            pos,
        })
    }

    fn postfix(&mut self) -> Result<Expr, ErrorReport> {
        let outer = self.depth;
        let mut expr = self.primary()?;
        loop {
            match self.peek().kind {
                TokenKind::LParen => {
                    let pos = self.advance().pos;
                    self.descend(pos)?;
                    let args = self.delimited(TokenKind::RParen)?;
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        pos,
                    };
                }
                TokenKind::LBracket => {
                    let pos = self.advance().pos;
                    self.descend(pos)?;
                    self.nesting += 1;
                    let index = self.expression();
                    let closed = index.and_then(|index| {
                        self.expect(TokenKind::RBracket, "`]`")?;
                        Ok(index)
                    });
                    self.nesting -= 1;
                    expr = Expr {
                        kind: ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(closed?),
                        },
                        pos,
                    };
                }
                TokenKind::Dot => {
                    let pos = self.advance().pos;
                    self.descend(pos)?;
                    let name = match self.advance() {
                        Token {
                            kind: TokenKind::Ident(name),
                            ..
                        } => name,
                        token => return Err(self.unexpected_token(&token)),
                    };
                    expr = Expr {
                        kind: ExprKind::Member {
                            target: Box::new(expr),
                            name,
                        },
                        pos,
                    };
                }
                _ => {
                    self.depth = outer;
                    return Ok(expr);
                }
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ErrorReport> {
        let token = self.advance();
        let kind = match token.kind {
            TokenKind::Number(n) => ExprKind::Number(n),
            TokenKind::Str(s) => ExprKind::Str(s),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Undefined => ExprKind::Undefined,
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::LBracket => ExprKind::List(self.delimited(TokenKind::RBracket)?),
            TokenKind::LParen => {
                self.nesting += 1;
                let inner = self.expression().and_then(|inner| {
                    self.expect(TokenKind::RParen, "`)`")?;
                    Ok(inner)
                });
                self.nesting -= 1;
                return inner;
            }
            _ => return Err(self.unexpected_token(&token)),
        };
        Ok(Expr {
            kind,
            pos: token.pos,
        })
    }

    /// Parse a comma-separated list up to `close`; the opener is already consumed.
    fn delimited(&mut self, close: TokenKind) -> Result<Vec<Expr>, ErrorReport> {
        self.nesting += 1;
        let items = self.delimited_inner(&close);
        self.nesting -= 1;
        items
    }

    fn delimited_inner(&mut self, close: &TokenKind) -> Result<Vec<Expr>, ErrorReport> {
        let mut items = Vec::new();
        loop {
            if &self.peek().kind == close {
                self.advance();
                return Ok(items);
            }
            items.push(self.expression()?);
            let token = self.advance();
            if &token.kind == close {
                return Ok(items);
            }
            if token.kind != TokenKind::Comma {
                return Err(self.unexpected_token(&token));
            }
        }
    }

    /// Count one more level of tree height, failing once past `MAX_NESTING`.
    fn descend(&mut self, pos: Pos) -> Result<(), ErrorReport> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(pos, "expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ErrorReport> {
        let token = self.advance();
        if token.kind == kind {
            return Ok(());
        }
        if token.kind == TokenKind::Eof {
            return Err(self.unexpected_token(&token));
        }
        Err(self.error(token.pos, format!("expected {what}")))
    }

    fn skip_newlines(&mut self) {
        while self.peek_raw().kind == TokenKind::Newline {
            self.cursor += 1;
        }
    }

    fn peek_raw(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.cursor.min(last)]
    }

    fn peek(&mut self) -> &Token {
        if self.nesting > 0 {
            self.skip_newlines();
        }
        self.peek_raw()
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        token
    }

    fn unexpected(&mut self) -> ErrorReport {
        let token = self.peek().clone();
        self.unexpected_token(&token)
    }

    fn unexpected_token(&self, token: &Token) -> ErrorReport {
        match &token.kind {
            TokenKind::Eof => self.error(token.pos, "unexpected end of input").recoverable(),
            TokenKind::Newline => self.error(token.pos, "unexpected end of line"),
            other => self.error(token.pos, format!("unexpected token {}", describe(other))),
        }
    }

    fn error(&self, pos: Pos, message: impl Into<String>) -> ErrorReport {
        ErrorReport::new(ErrorKind::SyntaxError, message).with_frame(frame_at(self.file, pos))
    }
}

fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 1),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::EqEq => (BinaryOp::Eq, 3),
        TokenKind::BangEq => (BinaryOp::Ne, 3),
        TokenKind::Lt => (BinaryOp::Lt, 4),
        TokenKind::Le => (BinaryOp::Le, 4),
        TokenKind::Gt => (BinaryOp::Gt, 4),
        TokenKind::Ge => (BinaryOp::Ge, 4),
        TokenKind::Plus => (BinaryOp::Add, 5),
        TokenKind::Minus => (BinaryOp::Sub, 5),
        TokenKind::Star => (BinaryOp::Mul, 6),
        TokenKind::Slash => (BinaryOp::Div, 6),
        TokenKind::Percent => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(op)
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => format!("number `{n}`"),
        TokenKind::Str(s) => format!("string {s:?}"),
        TokenKind::Ident(name) => format!("`{name}`"),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lexer::tokenize;

    fn parse(source: &str) -> Result<Vec<Stmt>, ErrorReport> {
        Parser::new(tokenize(source, "<test>")?, "<test>").parse_program()
    }

    fn binary_of(stmt: &Stmt) -> (BinaryOp, &Expr, &Expr) {
        let Stmt::Expr(Expr {
            kind: ExprKind::Binary { op, lhs, rhs },
            ..
        }) = stmt
        else {
            panic!("expected binary expression, got {stmt:?}");
        };
        (*op, lhs, rhs)
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("1 + 2 * 3").expect("parse");
        let (op, lhs, rhs) = binary_of(&program[0]);
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(lhs.kind, ExprKind::Number(1.0));
        assert!(matches!(
            rhs.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let program = parse("5 - 2 - 1").expect("parse");
        let (op, lhs, rhs) = binary_of(&program[0]);
        assert_eq!(op, BinaryOp::Sub);
        assert!(matches!(lhs.kind, ExprKind::Binary { .. }));
        assert_eq!(rhs.kind, ExprKind::Number(1.0));
    }

    #[test]
    fn statements_split_on_newlines_and_semicolons() {
        let program = parse("let a = 1; a\n\n print(a)").expect("parse");
        assert_eq!(program.len(), 3);
        assert!(matches!(program[0], Stmt::Let { ref name, .. } if name == "a"));
    }

    #[test]
    fn newlines_inside_brackets_are_ignored() {
        let program = parse("print(\n  1,\n  [2,\n 3]\n)").expect("parse");
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn postfix_chains_parse() {
        let program = parse("Deno.args[0].length").expect("parse");
        let Stmt::Expr(expr) = &program[0] else {
            panic!("expected expression");
        };
        assert!(matches!(expr.kind, ExprKind::Member { ref name, .. } if name == "length"));
    }

    #[test]
    fn trailing_operator_is_recoverable() {
        let err = parse("1 +").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SyntaxError);
        assert!(err.recoverable);

        let err = parse("print(1,").unwrap_err();
        assert!(err.recoverable);
    }

    #[test]
    fn stray_token_is_not_recoverable() {
        let err = parse("1 2").unwrap_err();
        assert!(!err.recoverable);
        assert!(err.message.contains("number `2`"), "got: {err}");
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        for source in [
            format!("{}1", "!".repeat(100_000)),
            "(".repeat(100_000),
            format!("{}1{}", "[".repeat(100_000), "]".repeat(100_000)),
            format!("1{}", "+1".repeat(100_000)),
            format!("x{}", ".y".repeat(100_000)),
        ] {
            let err = parse(&source).unwrap_err();
            assert_eq!(err.kind, ErrorKind::SyntaxError);
            assert!(err.message.contains("nested too deeply"), "got: {err}");
            assert!(!err.recoverable);
        }
    }

    #[test]
    fn nesting_below_the_limit_parses() {
        let depth = MAX_NESTING / 4;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&source).expect("parse").len(), 1);
        assert_eq!(parse(&format!("1{}", "+1".repeat(depth))).expect("parse").len(), 1);
    }

    #[test]
    fn let_requires_identifier() {
        let err = parse("let 1 = 2").unwrap_err();
        assert!(err.message.starts_with("unexpected token"), "got: {err}");
    }
}
