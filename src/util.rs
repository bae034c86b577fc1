// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use itertools::Itertools;

use crate::lex::{Token, TokenKind};

/// Joins token images with single spaces.
pub fn span_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.image.as_str()).join(" ")
}

/// Like `span_text`, but glues a trailing `;` onto the last token.
pub fn statement_text(tokens: &[Token]) -> String {
    match tokens.split_last() {
        Some((last, rest)) if last.kind == TokenKind::Semicolon => {
            let mut text = span_text(rest);
            text.push(';');
            text
        }
        _ => span_text(tokens),
    }
}
