// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use super::{put_message, CommandKind, CommandTable, Device};

/// Two-channel motor driver.
///
/// State payloads are `[channel, speed]`, where channel 0 is the left wheel
/// and any other value the right wheel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HBridge {
    left: i8,
    right: i8,
}

impl HBridge {
    pub const CLASS_ID: u8 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn left(&self) -> i8 {
        self.left
    }

    pub fn right(&self) -> i8 {
        self.right
    }

    fn store(&mut self, channel: u8, speed: i8) {
        if channel == 0 {
            self.left = speed;
        } else {
            self.right = speed;
        }
    }

    /// Builds the SET message for one motor and updates the mirror without
    /// waiting for the robot.
    pub fn set_motor(&mut self, table: &CommandTable, device_id: u8, motor: u8, speed: i8) -> Vec<u8> {
        let mut msg = Vec::with_capacity(5);
        put_message(&mut msg, table, device_id, CommandKind::Set, &[motor, speed as u8]);
        self.store(motor, speed);
        msg
    }

    /// Builds two SET messages, one per motor, in a single buffer.
    pub fn set_full_state(&mut self, table: &CommandTable, device_id: u8, left: i8, right: i8) -> Vec<u8> {
        let mut msg = Vec::with_capacity(10);
        put_message(&mut msg, table, device_id, CommandKind::Set, &[0, left as u8]);
        put_message(&mut msg, table, device_id, CommandKind::Set, &[1, right as u8]);
        self.left = left;
        self.right = right;
        msg
    }
}

impl Device for HBridge {
    fn class_id(&self) -> u8 {
        Self::CLASS_ID
    }

    fn name(&self) -> &'static str {
        "hbridge"
    }

    fn apply_incoming(&mut self, data: &[u8]) -> bool {
        match data {
            [channel, speed] => {
                self.store(*channel, *speed as i8);
                true
            }
            _ => false,
        }
    }

    fn snapshot(&self, buf: &mut Vec<u8>) {
        buf.push(2);
        buf.push(self.left as u8);
        buf.push(self.right as u8);
    }

    fn describe(&self) -> String {
        format!("left: {}, right: {}", self.left, self.right)
    }

    fn reset(&mut self) {
        self.left = 0;
        self.right = 0;
    }
}
