// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Recursive-descent parser from tokens to the command tree.
//!
//! Expressions are only recognized, not built: the tree keeps statements and
//! conditions as source text. Assignment versus plain expression is decided
//! by trying an assignment first and rewinding the token cursor on failure.

mod error;

use std::collections::HashMap;
use fixedbitset::FixedBitSet as BitSet;
use strum::IntoEnumIterator;
use tracing::{debug, trace};

use crate::ast::{self, Block, Command, Function, FunctionCall, Param};
use crate::lex::{tokenize, Token, TokenKind};
use crate::registry::FunctionRegistry;
use crate::util::{span_text, statement_text};

pub use self::error::*;

use TokenKind::*;

pub type ParseResult<T> = Result<T, ParseError>;

/// Binary operator levels, loosest first.
const LEVELS: &[&[TokenKind]] = &[
    &[OrOr],
    &[AndAnd],
    &[BitOr],
    &[Caret],
    &[BitAnd],
    &[Eq, Ne],
    &[Lt, Gt, Le, Ge],
    &[Shl, Shr, UShr],
    &[Plus, Minus],
    &[Star, Slash, Percent],
];

/// Deepest nesting of expressions, statements and initializers.
pub const MAX_NESTING: usize = 100;

const LITERALS: &[TokenKind] = &[IntLiteral, FloatLiteral, StringLiteral];
const PREFIX_OPS: &[TokenKind] = &[Plus, Minus, Incr, Decr, Bang, Tilde];
const STATEMENT_START: &[TokenKind] = &[
    Var, If, While, Break, Continue, Return, LBrace, Semicolon,
    IntLiteral, FloatLiteral, StringLiteral, Identifier, LParen,
    Plus, Minus, Incr, Decr, Bang, Tilde,
];

/// A recognized `name(args)` call: token indices of the name and the parens.
#[derive(Clone, Copy, Debug)]
struct CallSite {
    name: usize,
    lparen: usize,
    rparen: usize,
}

/// Saved cursor state for backtracking.
#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    calls: usize,
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    registry: &'a dyn FunctionRegistry,
    eof: Token,
    pos: usize,
    // call sites seen in the current expression statement
    calls: Vec<CallSite>,
    // end position and call sites of every primary parsed so far, by start
    memo: HashMap<usize, (usize, Vec<CallSite>)>,
    depth: usize,
    // furthest token position that failed a check, and what it was checked for
    furthest: usize,
    expected: BitSet,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `tokens`, which must come from `tokenize(source)`.
    pub fn new(source: &'a str, tokens: &'a [Token], registry: &'a dyn FunctionRegistry) -> Self {
        let eof = tokens.last().filter(|t| t.kind == Eof).cloned().unwrap_or_else(|| Token {
            kind: Eof,
            image: String::new(),
            line: 0,
            column: 0,
            start: source.len(),
            end: source.len(),
        });
        Parser {
            source,
            tokens,
            registry,
            eof,
            pos: 0,
            calls: Vec::new(),
            memo: HashMap::new(),
            depth: 0,
            furthest: 0,
            expected: BitSet::with_capacity(TokenKind::iter().count()),
        }
    }

    // -- cursor --

    fn token(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or(&self.eof)
    }

    fn peek(&self) -> &Token {
        self.token(self.pos)
    }

    fn advance(&mut self) {
        if self.peek().kind != Eof {
            self.pos += 1;
        }
    }

    fn mark(&self) -> Mark {
        Mark { pos: self.pos, calls: self.calls.len() }
    }

    fn rewind(&mut self, mark: Mark) {
        trace!(from = self.pos, to = mark.pos, "rewinding token cursor");
        self.pos = mark.pos;
        self.calls.truncate(mark.calls);
    }

    /// Checks the current token, remembering `kind` as acceptable here.
    fn at(&mut self, kind: TokenKind) -> bool {
        if self.pos > self.furthest {
            self.furthest = self.pos;
            self.expected.clear();
        }
        if self.pos == self.furthest {
            self.expected.insert(kind as usize);
        }
        self.peek().kind == kind
    }

    fn at_any(&mut self, kinds: &[TokenKind]) -> bool {
        let mut found = false;
        for &kind in kinds {
            found |= self.at(kind);
        }
        found
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind` and returns its index.
    fn expect(&mut self, kind: TokenKind) -> ParseResult<usize> {
        if self.at(kind) {
            let index = self.pos;
            self.advance();
            Ok(index)
        } else {
            Err(self.error())
        }
    }

    fn error(&self) -> ParseError {
        let expected = TokenKind::iter().filter(|&k| self.expected.contains(k as usize)).collect();
        ParseError::syntax(self.token(self.furthest), expected)
    }

    /// Runs `f` one nesting level deeper, failing past `MAX_NESTING`.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth == MAX_NESTING {
            return Err(ParseError::too_deep(self.peek()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn text(&self, start: usize) -> String {
        span_text(&self.tokens[start..self.pos])
    }

    // -- top level --

    /// `'func' IDENT '(' params? ')' block`, followed by end of input.
    pub fn function(&mut self) -> ParseResult<Function> {
        self.expect(Func)?;
        let name = self.expect(Identifier)?;
        self.expect(LParen)?;
        let mut params = Vec::new();
        if !self.at(RParen) {
            loop {
                self.eat(Var);
                let (name, dims, init) = self.declarator()?;
                params.push(Param { name, dims, init });
                if !self.eat(Comma) {
                    break;
                }
            }
        }
        self.expect(RParen)?;
        let mut body = Block::new();
        self.block_body(&mut body)?;
        self.expect(Eof)?;
        Ok(Function { name: self.token(name).image.clone(), params, body })
    }

    /// `IDENT ('[' ']')* ('=' init)?`
    fn declarator(&mut self) -> ParseResult<(String, usize, Option<String>)> {
        let name = self.expect(Identifier)?;
        let mut dims = 0;
        while self.eat(LBracket) {
            self.expect(RBracket)?;
            dims += 1;
        }
        let init = if self.eat(Assign) {
            let start = self.pos;
            self.var_init()?;
            Some(self.text(start))
        } else {
            None
        };
        Ok((self.token(name).image.clone(), dims, init))
    }

    fn var_init(&mut self) -> ParseResult<()> {
        self.nested(Self::var_init_inner)
    }

    fn var_init_inner(&mut self) -> ParseResult<()> {
        if self.eat(LBracket) {
            if !self.at(RBracket) {
                self.var_init()?;
                while self.eat(Comma) {
                    if self.at(RBracket) {
                        break;
                    }
                    self.var_init()?;
                }
            }
            self.expect(RBracket)?;
            Ok(())
        } else {
            self.expression()
        }
    }

    // -- statements --

    /// `'{' statement* '}'`, with the statements appended to `block`.
    fn block_body(&mut self, block: &mut Block) -> ParseResult<()> {
        self.expect(LBrace)?;
        while self.at_any(STATEMENT_START) {
            self.statement(block)?;
        }
        self.expect(RBrace)?;
        Ok(())
    }

    /// Body of `if`/`else`/`while`: a braced block fills `block` directly.
    fn body(&mut self, block: &mut Block) -> ParseResult<()> {
        if self.at(LBrace) {
            self.block_body(block)
        } else {
            self.statement(block)
        }
    }

    fn statement(&mut self, block: &mut Block) -> ParseResult<()> {
        self.nested(|p| p.statement_inner(block))
    }

    fn statement_inner(&mut self, block: &mut Block) -> ParseResult<()> {
        if !self.at_any(STATEMENT_START) {
            return Err(self.error());
        }
        let start = self.pos;
        let kind = self.peek().kind;
        match kind {
            LBrace => {
                let mut inner = Block::new();
                self.block_body(&mut inner)?;
                block.push(Command::Block(inner));
            }
            Semicolon => self.advance(),
            If => self.if_statement(block)?,
            While => self.while_statement(block)?,
            Var => {
                self.advance();
                self.declarator()?;
                while self.eat(Comma) {
                    self.declarator()?;
                }
                self.expect(Semicolon)?;
                block.push_statement(&statement_text(&self.tokens[start..self.pos]));
            }
            Break | Continue => {
                self.advance();
                self.expect(Semicolon)?;
                block.push_statement(&statement_text(&self.tokens[start..self.pos]));
            }
            Return => {
                self.advance();
                if !self.at(Semicolon) {
                    self.expression()?;
                }
                self.expect(Semicolon)?;
                block.push_statement(&statement_text(&self.tokens[start..self.pos]));
            }
            _ => {
                self.calls.clear();
                self.expression()?;
                let end = self.pos;
                self.expect(Semicolon)?;
                match self.whole_call(start, end) {
                    Some(call) => block.push(Command::Call(call)),
                    None => block.push_statement(&statement_text(&self.tokens[start..self.pos])),
                }
            }
        }
        Ok(())
    }

    /// If the expression in `start..end` is exactly one registry call,
    /// instantiates it.
    fn whole_call(&self, start: usize, end: usize) -> Option<FunctionCall> {
        let site = self.calls.iter().find(|c| c.name == start && c.rparen + 1 == end)?;
        let name = &self.token(site.name).image;
        // from the first to the last argument token, so no comment is cut in half
        let args = if site.rparen == site.lparen + 1 {
            ""
        } else {
            &self.source[self.token(site.lparen + 1).start..self.token(site.rparen - 1).end]
        };
        let factory = self.registry.find_by_token(name)?;
        Some(factory.create_instance(args))
    }

    /// `'(' expression ')'`, returning the expression's text.
    fn condition(&mut self) -> ParseResult<String> {
        self.expect(LParen)?;
        let start = self.pos;
        self.expression()?;
        let text = self.text(start);
        self.expect(RParen)?;
        Ok(text)
    }

    fn if_statement(&mut self, block: &mut Block) -> ParseResult<()> {
        self.expect(If)?;
        let mut node = ast::If { condition: self.condition()?, ..ast::If::default() };
        self.body(&mut node.then_block)?;
        if self.eat(Else) {
            self.body(&mut node.else_block)?;
        }
        block.push(Command::If(node));
        Ok(())
    }

    fn while_statement(&mut self, block: &mut Block) -> ParseResult<()> {
        self.expect(While)?;
        let mut node = ast::While { condition: self.condition()?, ..ast::While::default() };
        self.body(&mut node.body)?;
        block.push(Command::While(node));
        Ok(())
    }

    // -- expressions --

    /// Tries `primary '=' init` first and falls back to a plain expression.
    fn expression(&mut self) -> ParseResult<()> {
        self.nested(Self::expression_inner)
    }

    fn expression_inner(&mut self) -> ParseResult<()> {
        let mark = self.mark();
        match self.assignment() {
            Err(e) if e.is_syntax() => {
                self.rewind(mark);
                self.binary(0)
            }
            result => result,
        }
    }

    fn assignment(&mut self) -> ParseResult<()> {
        self.primary()?;
        self.expect(Assign)?;
        self.var_init()
    }

    fn binary(&mut self, level: usize) -> ParseResult<()> {
        if level == LEVELS.len() {
            return self.unary();
        }
        self.binary(level + 1)?;
        while self.at_any(LEVELS[level]) {
            self.advance();
            self.binary(level + 1)?;
        }
        Ok(())
    }

    fn unary(&mut self) -> ParseResult<()> {
        if self.at_any(PREFIX_OPS) {
            self.advance();
            self.nested(Self::unary)
        } else {
            self.primary()?;
            if self.at_any(&[Incr, Decr]) {
                self.advance();
            }
            Ok(())
        }
    }

    /// Primaries are memoized by start position, so that the rewind after a
    /// failed assignment does not re-parse nested parentheses.
    ///
    /// A cache hit skips the token checks inside the primary. The expected set
    /// stays exact: `furthest` never decreases, so those checks were already
    /// recorded (or superseded) when the entry was made.
    fn primary(&mut self) -> ParseResult<()> {
        let start = self.pos;
        if let Some((end, calls)) = self.memo.get(&start) {
            self.pos = *end;
            self.calls.extend_from_slice(calls);
            return Ok(());
        }
        let first_call = self.calls.len();
        self.primary_uncached()?;
        self.memo.insert(start, (self.pos, self.calls[first_call..].to_vec()));
        Ok(())
    }

    fn primary_uncached(&mut self) -> ParseResult<()> {
        let prefix = self.pos;
        if self.at_any(LITERALS) || self.at(Identifier) {
            self.advance();
        } else if self.eat(LParen) {
            self.expression()?;
            self.expect(RParen)?;
        } else {
            return Err(self.error());
        }
        loop {
            if self.eat(LBracket) {
                self.expression()?;
                self.expect(RBracket)?;
            } else if self.eat(Dot) {
                self.expect(Identifier)?;
            } else if self.at(LParen) {
                let lparen = self.pos;
                self.advance();
                if !self.at(RParen) {
                    self.expression()?;
                    while self.eat(Comma) {
                        self.expression()?;
                    }
                }
                let rparen = self.expect(RParen)?;
                if lparen == prefix + 1 && self.token(prefix).kind == Identifier {
                    self.call_site(CallSite { name: prefix, lparen, rparen })?;
                }
            } else {
                return Ok(());
            }
        }
    }

    fn call_site(&mut self, site: CallSite) -> ParseResult<()> {
        let name = self.token(site.name);
        if self.registry.find_by_token(&name.image).is_none() {
            return Err(ParseError::unknown_function(name));
        }
        self.calls.push(site);
        Ok(())
    }
}

/// Parses an already tokenized program.
pub fn parse_tokens(source: &str, tokens: &[Token], registry: &dyn FunctionRegistry)
                    -> ParseResult<Function> {
    Parser::new(source, tokens, registry).function()
}

/// Parses a complete program.
///
/// Any error means that no tree was produced.
pub fn parse(input: &str, registry: &dyn FunctionRegistry) -> Result<Function, Error> {
    let tokens = tokenize(input)?;
    let func = parse_tokens(input, &tokens, registry)?;
    debug!(function = %func.name, params = func.params.len(),
           commands = func.body.len(), "parsed function");
    Ok(func)
}
