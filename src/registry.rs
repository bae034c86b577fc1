// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Lookup of the functions a program may call.
//!
//! The parser is handed a registry at construction time and consults it for
//! every `name(...)` call it sees.

use std::collections::BTreeMap;

use crate::ast::FunctionCall;

/// Builds call nodes for one function name.
pub trait FunctionFactory {
    fn create_instance(&self, args: &str) -> FunctionCall;
}

impl<F> FunctionFactory for F where F: Fn(&str) -> FunctionCall {
    fn create_instance(&self, args: &str) -> FunctionCall {
        self(args)
    }
}

pub trait FunctionRegistry {
    fn find_by_token(&self, name: &str) -> Option<&dyn FunctionFactory>;
}

/// Factory that records the name and the raw argument text.
pub struct PlainCall {
    name: String,
}

impl FunctionFactory for PlainCall {
    fn create_instance(&self, args: &str) -> FunctionCall {
        FunctionCall { name: self.name.clone(), args: args.into() }
    }
}

/// A registry backed by a name -> factory map.
#[derive(Default)]
pub struct FunctionTable {
    factories: BTreeMap<String, Box<dyn FunctionFactory>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table where each name gets a `PlainCall` factory.
    pub fn with_names<I, S>(names: I) -> Self
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        let mut table = Self::new();
        for name in names {
            let name = name.into();
            table.register(name.clone(), PlainCall { name });
        }
        table
    }

    pub fn register(&mut self, name: impl Into<String>, factory: impl FunctionFactory + 'static) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|s| s.as_str())
    }
}

impl FunctionRegistry for FunctionTable {
    fn find_by_token(&self, name: &str) -> Option<&dyn FunctionFactory> {
        self.factories.get(name).map(|f| f.as_ref())
    }
}
