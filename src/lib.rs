// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Language front-end and device protocol for programming small robots.
//!
//! Programs are written in a small C-like language: a single `func` with
//! variables, expressions, `if`/`while` and calls to functions the robot
//! knows about. The parser turns such a program into a command tree in which
//! straight-line code is kept as text ("procedures"), while control structures
//! and calls to known functions become nodes of their own.
//!
//! The `device` module builds and interprets the byte messages exchanged
//! with the robot's devices.
//!
//! ## Basic usage
//!
//! Use `robolang::parse::parse` with a registry of callable functions to get
//! a tree, then work with the datastructures from `robolang::ast`.
//!
//! The following code (the same as the "robolang-fmt" demo binary, minus the
//! command line handling) takes a file as an argument, parses it and outputs
//! the canonical form of the program, cleaned of comments and with uniform
//! spacing.
//!
//! ```rust,no_run
//! use std::{env, fs};
//! use robolang::parse::parse;
//! use robolang::registry::FunctionTable;
//!
//! fn main() {
//!     let filename = env::args().nth(1).unwrap();
//!     let input = fs::read_to_string(&filename).unwrap();
//!     let functions = FunctionTable::with_names(vec!["move", "wait"]);
//!
//!     match parse(&input, &functions) {
//!         Err(e) => eprintln!("Parse error: {}", e),
//!         Ok(func) => print!("{}", func),
//!     }
//! }
//! ```

pub mod ast;
pub mod device;
pub mod lex;
pub mod parse;
pub mod registry;

// internal helpers
pub(crate) mod util;
