// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! The command tree produced by the parser.
//!
//! The `Display` implementations are the encoder: they produce canonical
//! source text that parses back into the same tree.

use std::fmt::{self, Display, Formatter};
use serde::Serialize;

const INDENT: &str = "    ";

/// The root of a parsed program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
}

/// A declared parameter, e.g. `var speeds[] = [1, 2]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    /// Number of trailing `[]` pairs.
    pub dims: usize,
    pub init: Option<String>,
}

/// An ordered sequence of commands, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Command {
    Procedure(Procedure),
    Block(Block),
    If(If),
    While(While),
    Call(FunctionCall),
}

/// Straight-line statements kept as source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Procedure {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct If {
    pub condition: String,
    pub then_block: Block,
    pub else_block: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct While {
    pub condition: String,
    pub body: Block,
}

/// A call to a function known to the registry; `args` is the raw text that
/// appeared between the parentheses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: String,
}

impl Procedure {
    pub fn new(text: impl Into<String>) -> Self {
        Procedure { text: text.into() }
    }

    pub fn append(&mut self, text: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }
}

impl Block {
    pub fn new() -> Self {
        Block::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    /// Adds a plain statement, merging it into the last command if that is a
    /// procedure as well.
    pub fn push_statement(&mut self, text: &str) {
        if let Some(Command::Procedure(last)) = self.commands.last_mut() {
            last.append(text);
        } else {
            self.commands.push(Command::Procedure(Procedure::new(text)));
        }
    }
}

/// Returns the canonical source text for `func`.
pub fn encode(func: &Function) -> String {
    func.to_string()
}

fn write_indent(f: &mut Formatter, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_body(f: &mut Formatter, block: &Block, depth: usize) -> fmt::Result {
    for cmd in &block.commands {
        write_command(f, cmd, depth)?;
    }
    Ok(())
}

fn write_command(f: &mut Formatter, cmd: &Command, depth: usize) -> fmt::Result {
    write_indent(f, depth)?;
    match cmd {
        Command::Procedure(p) => writeln!(f, "{}", p.text),
        Command::Call(c) => writeln!(f, "{}", c),
        Command::Block(b) => {
            writeln!(f, "{{")?;
            write_body(f, b, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
        Command::If(i) => {
            writeln!(f, "if ({}) {{", i.condition)?;
            write_body(f, &i.then_block, depth + 1)?;
            write_indent(f, depth)?;
            if i.else_block.is_empty() {
                writeln!(f, "}}")
            } else {
                writeln!(f, "}} else {{")?;
                write_body(f, &i.else_block, depth + 1)?;
                write_indent(f, depth)?;
                writeln!(f, "}}")
            }
        }
        Command::While(w) => {
            writeln!(f, "while ({}) {{", w.condition)?;
            write_body(f, &w.body, depth + 1)?;
            write_indent(f, depth)?;
            writeln!(f, "}}")
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "func {}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        writeln!(f, ") {{")?;
        write_body(f, &self.body, 1)?;
        writeln!(f, "}}")
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "var {}", self.name)?;
        for _ in 0..self.dims {
            write!(f, "[]")?;
        }
        if let Some(init) = &self.init {
            write!(f, " = {}", init)?;
        }
        Ok(())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write_command(f, self, 0)
    }
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}({});", self.name, self.args)
    }
}
