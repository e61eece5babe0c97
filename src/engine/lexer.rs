//! Tokenizer for the script language.

use crate::error_stack::{ErrorKind, ErrorReport};

use super::{frame_at, Pos};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),
    Let,
    True,
    False,
    Null,
    Undefined,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Newline,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
    EqEq,
    BangEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    file: &'a str,
    line: u32,
    column: u32,
}

/// Split `source` into tokens, always ending with [`TokenKind::Eof`].
pub(crate) fn tokenize(source: &str, file: &str) -> Result<Vec<Token>, ErrorReport> {
    let mut lexer = Lexer {
        chars: source.chars().peekable(),
        file,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

impl Lexer<'_> {
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, pos: Pos, message: impl Into<String>) -> ErrorReport {
        ErrorReport::new(ErrorKind::SyntaxError, message).with_frame(frame_at(self.file, pos))
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '/' => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.next() != Some('/') {
                        return;
                    }
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ErrorReport> {
        self.skip_trivia();
        let pos = Pos {
            line: self.line,
            column: self.column,
        };
        let Some(c) = self.bump() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos,
            });
        };
        let kind = match c {
            '\n' => TokenKind::Newline,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' if self.eat('=') => TokenKind::BangEq,
            '!' => TokenKind::Bang,
            '=' if self.eat('=') => TokenKind::EqEq,
            '=' => TokenKind::Assign,
            '<' if self.eat('=') => TokenKind::Le,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::Ge,
            '>' => TokenKind::Gt,
            '&' if self.eat('&') => TokenKind::AndAnd,
            '|' if self.eat('|') => TokenKind::OrOr,
            '"' | '\'' => TokenKind::Str(self.string(c, pos)?),
            c if c.is_ascii_digit() => TokenKind::Number(self.number(c, pos)?),
            c if is_ident_start(c) => keyword_or_ident(self.ident(c)),
            other => return Err(self.error(pos, format!("unexpected character `{other}`"))),
        };
        Ok(Token { kind, pos })
    }

    fn string(&mut self, quote: char, start: Pos) -> Result<String, ErrorReport> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error(start, "unterminated string literal"));
                }
                Some(c) if c == quote => return Ok(text),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some(c @ ('\\' | '"' | '\'')) => c,
                        Some(other) => {
                            return Err(
                                self.error(start, format!("invalid escape sequence `\\{other}`"))
                            );
                        }
                        None => return Err(self.error(start, "unterminated string literal")),
                    };
                    text.push(escaped);
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn number(&mut self, first: char, start: Pos) -> Result<f64, ErrorReport> {
        let mut text = String::from(first);
        let mut seen_dot = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.bump();
                if c != '_' {
                    text.push(c);
                }
            } else if c == '.' && !seen_dot {
                // Only a digit after the dot makes it a fraction; `1.foo` is member access.
                let mut ahead = self.chars.clone();
                ahead.next();
                if !ahead.next().is_some_and(|d| d.is_ascii_digit()) {
                    break;
                }
                seen_dot = true;
                self.bump();
                text.push('.');
            } else {
                break;
            }
        }
        text.parse::<f64>()
            .map_err(|_| self.error(start, format!("invalid number literal `{text}`")))
    }

    fn ident(&mut self, first: char) -> String {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !is_ident_continue(c) {
                break;
            }
            self.bump();
            text.push(c);
        }
        text
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn keyword_or_ident(word: String) -> TokenKind {
    match word.as_str() {
        "let" => TokenKind::Let,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "undefined" => TokenKind::Undefined,
        _ => TokenKind::Ident(word),
    }
}
