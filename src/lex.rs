// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Tokenizer for the function language.
//!
//! The lexical grammar lives in `func.pest`; this module runs it and turns the
//! resulting pairs into a flat token vector that the parser can rewind over.

use std::fmt;
use pest_derive::Parser;
use pest::{Parser, error::{Error, InputLocation, LineColLocation}, iterators::Pair};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Parser)]
#[grammar = "func.pest"]
pub struct FuncLexer;

/// Terminal categories produced by the lexer.
///
/// The display form is what error messages show in their "expected" lists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter, EnumString)]
pub enum TokenKind {
    #[strum(serialize = "<integer>")]   IntLiteral,
    #[strum(serialize = "<float>")]     FloatLiteral,
    #[strum(serialize = "<string>")]    StringLiteral,
    #[strum(serialize = "<identifier>")] Identifier,

    #[strum(serialize = "var")]      Var,
    #[strum(serialize = "func")]     Func,
    #[strum(serialize = "if")]       If,
    #[strum(serialize = "else")]     Else,
    #[strum(serialize = "while")]    While,
    #[strum(serialize = "break")]    Break,
    #[strum(serialize = "continue")] Continue,
    #[strum(serialize = "return")]   Return,

    #[strum(serialize = "=")]   Assign,
    #[strum(serialize = "==")]  Eq,
    #[strum(serialize = "!=")]  Ne,
    #[strum(serialize = "<")]   Lt,
    #[strum(serialize = "<=")]  Le,
    #[strum(serialize = ">")]   Gt,
    #[strum(serialize = ">=")]  Ge,
    #[strum(serialize = "&&")]  AndAnd,
    #[strum(serialize = "||")]  OrOr,
    #[strum(serialize = "++")]  Incr,
    #[strum(serialize = "--")]  Decr,
    #[strum(serialize = "+")]   Plus,
    #[strum(serialize = "-")]   Minus,
    #[strum(serialize = "*")]   Star,
    #[strum(serialize = "/")]   Slash,
    #[strum(serialize = "%")]   Percent,
    #[strum(serialize = "&")]   BitAnd,
    #[strum(serialize = "|")]   BitOr,
    #[strum(serialize = "^")]   Caret,
    #[strum(serialize = "(")]   LParen,
    #[strum(serialize = ")")]   RParen,
    #[strum(serialize = "{")]   LBrace,
    #[strum(serialize = "}")]   RBrace,
    #[strum(serialize = "[")]   LBracket,
    #[strum(serialize = "]")]   RBracket,
    #[strum(serialize = ";")]   Semicolon,
    #[strum(serialize = ",")]   Comma,
    #[strum(serialize = ".")]   Dot,
    #[strum(serialize = "<<")]  Shl,
    #[strum(serialize = ">>")]  Shr,
    #[strum(serialize = ">>>")] UShr,
    #[strum(serialize = "~")]   Tilde,
    #[strum(serialize = "!")]   Bang,

    #[strum(serialize = "<end of input>")] Eof,
}

impl TokenKind {
    pub fn is_literal(self) -> bool {
        matches!(self, TokenKind::IntLiteral | TokenKind::FloatLiteral | TokenKind::StringLiteral)
    }
}

/// A single token with its source text and position.
///
/// `start` and `end` are byte offsets into the source, `line` and `column`
/// are 1-based.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub image: String,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "`{}`", self.image)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub kind: LexErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    /// No token starts with this character (`None` at end of input).
    UnexpectedChar(Option<char>),
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape(String),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}: ", self.line, self.column)?;
        match &self.kind {
            LexErrorKind::UnexpectedChar(Some(ch)) =>
                write!(f, "unexpected character {:?}", ch),
            LexErrorKind::UnexpectedChar(None) =>
                write!(f, "unexpected end of input"),
            LexErrorKind::UnterminatedString =>
                write!(f, "unterminated string literal"),
            LexErrorKind::UnterminatedComment =>
                write!(f, "unterminated block comment"),
            LexErrorKind::InvalidEscape(esc) =>
                write!(f, "invalid escape sequence `{}`", esc),
        }
    }
}

impl std::error::Error for LexError {}

impl LexError {
    fn at(pair: &Pair<Rule>, kind: LexErrorKind) -> Self {
        let (line, column) = pair.as_span().start_pos().line_col();
        LexError { line, column, kind }
    }

    fn from_pest(input: &str, e: Error<Rule>) -> Self {
        let (line, column) = match e.line_col {
            LineColLocation::Pos(lc) => lc,
            LineColLocation::Span(lc, _) => lc,
        };
        let offset = match e.location {
            InputLocation::Pos(p) => p,
            InputLocation::Span((p, _)) => p,
        };
        let ch = input.get(offset..).and_then(|rest| rest.chars().next());
        LexError { line, column, kind: LexErrorKind::UnexpectedChar(ch) }
    }
}

/// Decodes the body of a string literal (without the quotes).
///
/// On failure, returns the offending escape sequence.
pub fn unescape(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let esc = match chars.next() {
            Some(esc) => esc,
            None => return Err("\\".into()),
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'r' => out.push('\r'),
            'f' => out.push('\u{c}'),
            '"' | '\'' | '\\' => out.push(esc),
            'x' | 'u' => {
                let width = if esc == 'x' { 2 } else { 4 };
                let digits: String = (0..width).filter_map(|_| chars.next()).collect();
                let decoded = if digits.len() == width {
                    u32::from_str_radix(&digits, 16).ok().and_then(std::char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(c) => out.push(c),
                    None => return Err(format!("\\{}{}", esc, digits)),
                }
            }
            '0'..='7' => {
                // up to three octal digits, at most \377
                let mut value = esc.to_digit(8).unwrap_or(0);
                let max_len = if esc <= '3' { 3 } else { 2 };
                for _ in 1..max_len {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(std::char::from_u32(value).unwrap_or('\0'));
            }
            other => return Err(format!("\\{}", other)),
        }
    }
    Ok(out)
}

fn make_token(pair: &Pair<Rule>, kind: TokenKind) -> Token {
    let span = pair.as_span();
    let (line, column) = span.start_pos().line_col();
    Token {
        kind,
        image: span.as_str().into(),
        line,
        column,
        start: span.start(),
        end: span.end(),
    }
}

/// Splits `input` into tokens.
///
/// Whitespace and comments are dropped. The returned vector always ends with
/// a single `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let pairs = FuncLexer::parse(Rule::file, input).map_err(|e| LexError::from_pest(input, e))?;
    let mut tokens = Vec::new();
    for pair in pairs {
        let kind = match pair.as_rule() {
            Rule::int => TokenKind::IntLiteral,
            Rule::float => TokenKind::FloatLiteral,
            Rule::string => {
                let text = pair.as_str();
                if let Err(esc) = unescape(&text[1..text.len() - 1]) {
                    return Err(LexError::at(&pair, LexErrorKind::InvalidEscape(esc)));
                }
                TokenKind::StringLiteral
            }
            Rule::ident => TokenKind::Identifier,
            Rule::keyword | Rule::op => pair.as_str().parse().expect("grammar matches TokenKind"),
            Rule::open_string => return Err(LexError::at(&pair, LexErrorKind::UnterminatedString)),
            Rule::open_comment => return Err(LexError::at(&pair, LexErrorKind::UnterminatedComment)),
            Rule::EOI => TokenKind::Eof,
            _ => unreachable!()
        };
        tokens.push(make_token(&pair, kind));
    }
    if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
        // EOI is always the last pair, but keep the invariant explicit
        let (line, column) = line_col_at_end(input);
        tokens.push(Token { kind: TokenKind::Eof, image: String::new(), line, column,
                            start: input.len(), end: input.len() });
    }
    Ok(tokens)
}

fn line_col_at_end(input: &str) -> (usize, usize) {
    let line = input.matches('\n').count() + 1;
    let column = input.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}
