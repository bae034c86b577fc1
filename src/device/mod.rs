// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Byte-level messages exchanged with the robot's devices.
//!
//! Every message has the layout `[command, device id, payload length,
//! payload...]`. The command byte values come from a `CommandTable` so that
//! different firmware revisions can be targeted.
//!
//! Devices keep a mirror of the last known hardware state. Inbound state
//! buffers that do not fit a device are dropped without changing the mirror.

mod error;
mod hbridge;
mod robot;
mod table;

use itertools::Itertools;
use tracing::warn;

pub use self::error::*;
pub use self::hbridge::*;
pub use self::robot::*;
pub use self::table::*;

/// Behavior shared by all device mirrors.
pub trait Device {
    fn class_id(&self) -> u8;
    fn name(&self) -> &'static str;
    /// Applies a state payload received from (or sent to) the hardware.
    ///
    /// Returns false, leaving the state untouched, if the payload is malformed.
    fn apply_incoming(&mut self, data: &[u8]) -> bool;
    /// Appends the current state, length-prefixed, to `buf`.
    fn snapshot(&self, buf: &mut Vec<u8>);
    fn describe(&self) -> String;
    fn reset(&mut self);
}

/// A device without a dedicated mirror; it keeps its last payload verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawDevice {
    pub class_id: u8,
    pub state: Vec<u8>,
}

impl RawDevice {
    pub fn new(class_id: u8) -> Self {
        RawDevice { class_id, state: Vec::new() }
    }
}

impl Device for RawDevice {
    fn class_id(&self) -> u8 {
        self.class_id
    }

    fn name(&self) -> &'static str {
        "raw"
    }

    fn apply_incoming(&mut self, data: &[u8]) -> bool {
        if data.len() > u8::MAX as usize {
            return false;
        }
        self.state = data.to_vec();
        true
    }

    fn snapshot(&self, buf: &mut Vec<u8>) {
        buf.push(self.state.len() as u8);
        buf.extend_from_slice(&self.state);
    }

    fn describe(&self) -> String {
        format!("[{}]", self.state.iter().map(|b| format!("{:02x}", b)).join(" "))
    }

    fn reset(&mut self) {
        self.state.clear();
    }
}

/// The closed set of device mirrors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyDevice {
    HBridge(HBridge),
    Raw(RawDevice),
}

macro_rules! dispatch {
    ($self:expr, $dev:ident => $e:expr) => {
        match $self {
            AnyDevice::HBridge($dev) => $e,
            AnyDevice::Raw($dev) => $e,
        }
    }
}

impl AnyDevice {
    /// Creates the mirror for a device class announced by the robot.
    pub fn for_class(class_id: u8) -> Self {
        match class_id {
            HBridge::CLASS_ID => AnyDevice::HBridge(HBridge::new()),
            _ => AnyDevice::Raw(RawDevice::new(class_id)),
        }
    }
}

impl Device for AnyDevice {
    fn class_id(&self) -> u8 {
        dispatch!(self, d => d.class_id())
    }

    fn name(&self) -> &'static str {
        dispatch!(self, d => d.name())
    }

    fn apply_incoming(&mut self, data: &[u8]) -> bool {
        dispatch!(self, d => d.apply_incoming(data))
    }

    fn snapshot(&self, buf: &mut Vec<u8>) {
        dispatch!(self, d => d.snapshot(buf))
    }

    fn describe(&self) -> String {
        dispatch!(self, d => d.describe())
    }

    fn reset(&mut self) {
        dispatch!(self, d => d.reset())
    }
}

/// Appends one message to `buf`.
///
/// The length byte is the payload length truncated to 8 bits; payloads longer
/// than 255 bytes are the caller's error and are only logged.
pub fn put_message(buf: &mut Vec<u8>, table: &CommandTable, device_id: u8,
                   kind: CommandKind, payload: &[u8]) {
    if payload.len() > u8::MAX as usize {
        warn!(device_id, len = payload.len(), "payload too long, length byte truncated");
    }
    buf.push(table.byte(kind));
    buf.push(device_id);
    buf.push(payload.len() as u8);
    buf.extend_from_slice(payload);
}

pub fn build_message(table: &CommandTable, device_id: u8, kind: CommandKind, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3 + payload.len());
    put_message(&mut buf, table, device_id, kind, payload);
    buf
}

/// One decoded message, borrowing its payload from the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame<'a> {
    pub command: u8,
    pub device_id: u8,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Splits the first frame off `buf`.
    ///
    /// Returns `None` if `buf` does not hold a complete frame.
    pub fn decode(buf: &'a [u8]) -> Option<(Frame<'a>, &'a [u8])> {
        if buf.len() < 3 {
            return None;
        }
        let len = buf[2] as usize;
        let rest = &buf[3..];
        if rest.len() < len {
            return None;
        }
        let (payload, rest) = rest.split_at(len);
        Some((Frame { command: buf[0], device_id: buf[1], payload }, rest))
    }
}

/// An outbound request to the robot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Push new state to a device.
    Set { device_id: u8, payload: Vec<u8> },
    /// Register a device, with opaque configuration bytes.
    Add { device_id: u8, config: Vec<u8> },
    /// Ask a device for its state.
    Get { device_id: u8 },
}

impl Action {
    pub fn put_message(&self, buf: &mut Vec<u8>, table: &CommandTable) {
        match self {
            Action::Set { device_id, payload } =>
                put_message(buf, table, *device_id, CommandKind::Set, payload),
            Action::Add { device_id, config } =>
                put_message(buf, table, *device_id, CommandKind::Add, config),
            Action::Get { device_id } =>
                put_message(buf, table, *device_id, CommandKind::Get, &[]),
        }
    }

    pub fn to_bytes(&self, table: &CommandTable) -> Vec<u8> {
        let mut buf = Vec::new();
        self.put_message(&mut buf, table);
        buf
    }
}
