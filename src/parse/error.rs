// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::fmt;
use itertools::Itertools;

use crate::lex::{LexError, Token, TokenKind};

/// A grammar error, located at the offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    /// Byte range of the offending token.
    pub start: usize,
    pub end: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    Syntax { found: Token, expected: Vec<TokenKind> },
    UnknownFunction(String),
    /// Nesting beyond `parse::MAX_NESTING`.
    TooDeep,
}

impl ParseError {
    pub(crate) fn syntax(found: &Token, expected: Vec<TokenKind>) -> Self {
        ParseError {
            line: found.line,
            column: found.column,
            start: found.start,
            end: found.end,
            kind: ParseErrorKind::Syntax { found: found.clone(), expected },
        }
    }

    pub(crate) fn unknown_function(name: &Token) -> Self {
        ParseError {
            line: name.line,
            column: name.column,
            start: name.start,
            end: name.end,
            kind: ParseErrorKind::UnknownFunction(name.image.clone()),
        }
    }

    pub(crate) fn too_deep(at: &Token) -> Self {
        ParseError {
            line: at.line,
            column: at.column,
            start: at.start,
            end: at.end,
            kind: ParseErrorKind::TooDeep,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Syntax { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}: ", self.line, self.column)?;
        match &self.kind {
            ParseErrorKind::Syntax { found, expected } => match expected.len() {
                0 => write!(f, "unexpected {}", found),
                1 => write!(f, "unexpected {}, expected {}", found, expected[0]),
                _ => write!(f, "unexpected {}, expected one of {}",
                            found, expected.iter().join(", ")),
            },
            ParseErrorKind::UnknownFunction(name) =>
                write!(f, "Invalid function call: {}", name),
            ParseErrorKind::TooDeep =>
                write!(f, "nested too deeply (limit {})", super::MAX_NESTING),
        }
    }
}

impl std::error::Error for ParseError {}

/// Any error that prevents a program from being parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
}

impl Error {
    pub fn line_col(&self) -> (usize, usize) {
        match self {
            Error::Lex(e) => (e.line, e.column),
            Error::Parse(e) => (e.line, e.column),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "{}", e),
            Error::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(e) => Some(e),
            Error::Parse(e) => Some(e),
        }
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}
