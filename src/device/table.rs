// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// The commands understood by the robot firmware.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    Stop,
    Echo,
    Print,
    Get,
    Set,
    Reset,
    Done,
    Add,
}

/// Command byte values for one firmware revision.
///
/// Missing fields of a JSON profile keep their default value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTable {
    pub stop: u8,
    pub echo: u8,
    pub print: u8,
    pub get: u8,
    pub set: u8,
    pub reset: u8,
    pub done: u8,
    pub add: u8,
}

impl Default for CommandTable {
    fn default() -> Self {
        CommandTable {
            stop: 1,
            echo: 2,
            print: 3,
            get: 4,
            set: 5,
            reset: 6,
            done: 7,
            add: 8,
        }
    }
}

impl CommandTable {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn byte(&self, kind: CommandKind) -> u8 {
        match kind {
            CommandKind::Stop => self.stop,
            CommandKind::Echo => self.echo,
            CommandKind::Print => self.print,
            CommandKind::Get => self.get,
            CommandKind::Set => self.set,
            CommandKind::Reset => self.reset,
            CommandKind::Done => self.done,
            CommandKind::Add => self.add,
        }
    }

    /// Reverse lookup; the first matching kind wins if bytes are shared.
    pub fn kind_of(&self, byte: u8) -> Option<CommandKind> {
        CommandKind::iter().find(|&kind| self.byte(kind) == byte)
    }
}
