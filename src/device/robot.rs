// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::collections::BTreeMap;
use std::io;
use tracing::{debug, warn};

use super::*;

/// The connection to the robot (serial port, socket, simulator).
pub trait Transport {
    fn send(&mut self, message: &[u8]) -> io::Result<()>;
}

/// Collects everything sent, for tests and dry runs.
impl Transport for Vec<u8> {
    fn send(&mut self, message: &[u8]) -> io::Result<()> {
        self.extend_from_slice(message);
        Ok(())
    }
}

/// Counters for inbound traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// State replies applied to a device mirror.
    pub applied: u64,
    /// Frames thrown away: malformed state, unknown device or truncated frame.
    pub dropped: u64,
    /// DONE acknowledgements.
    pub acknowledged: u64,
}

/// Mirror of a robot's devices.
///
/// All methods take `&mut self`; a robot must only be driven by one owner
/// at a time.
pub struct Robot {
    table: CommandTable,
    devices: BTreeMap<u8, AnyDevice>,
    stats: Stats,
}

impl Robot {
    pub fn new(table: CommandTable) -> Self {
        Robot { table, devices: BTreeMap::new(), stats: Stats::default() }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn device(&self, id: u8) -> Option<&AnyDevice> {
        self.devices.get(&id)
    }

    pub fn device_mut(&mut self, id: u8) -> Option<&mut AnyDevice> {
        self.devices.get_mut(&id)
    }

    pub fn devices(&self) -> impl Iterator<Item = (u8, &AnyDevice)> {
        self.devices.iter().map(|(&id, dev)| (id, dev))
    }

    /// Sends an ADD request and starts mirroring the device.
    pub fn add_device(&mut self, transport: &mut impl Transport, id: u8, device: AnyDevice,
                      config: &[u8]) -> Result<(), ProtocolError> {
        let msg = Action::Add { device_id: id, config: config.to_vec() }.to_bytes(&self.table);
        transport.send(&msg)?;
        debug!(id, class = device.class_id(), "added device");
        self.devices.insert(id, device);
        Ok(())
    }

    /// Sends new state to a device.
    ///
    /// The mirror is updated once the message is sent, without waiting for the
    /// robot to confirm. A failed send leaves it unchanged.
    pub fn set(&mut self, transport: &mut impl Transport, id: u8, payload: &[u8])
               -> Result<(), ProtocolError> {
        let device = self.devices.get_mut(&id).ok_or(ProtocolError::UnknownDevice(id))?;
        let msg = build_message(&self.table, id, CommandKind::Set, payload);
        transport.send(&msg)?;
        if !device.apply_incoming(payload) {
            debug!(id, len = payload.len(), "payload does not fit the mirror, left unchanged");
        }
        Ok(())
    }

    /// Asks a device for its current state.
    pub fn poll(&self, transport: &mut impl Transport, id: u8) -> Result<(), ProtocolError> {
        if !self.devices.contains_key(&id) {
            return Err(ProtocolError::UnknownDevice(id));
        }
        transport.send(&Action::Get { device_id: id }.to_bytes(&self.table))?;
        Ok(())
    }

    /// Appends `[id, state...]` of every device, in id order.
    pub fn snapshot(&self, buf: &mut Vec<u8>) {
        for (&id, dev) in &self.devices {
            buf.push(id);
            dev.snapshot(buf);
        }
    }

    pub fn describe(&self) -> String {
        let mut s = String::new();
        for (id, dev) in &self.devices {
            s.push_str(&format!("{} {}: {}\n", id, dev.name(), dev.describe()));
        }
        s
    }

    pub fn reset(&mut self) {
        for dev in self.devices.values_mut() {
            dev.reset();
        }
    }

    /// Processes bytes received from the robot.
    ///
    /// Nothing here fails: frames that cannot be applied are counted in
    /// `Stats::dropped` and logged.
    pub fn receive(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            match Frame::decode(bytes) {
                Some((frame, rest)) => {
                    self.handle(frame);
                    bytes = rest;
                }
                None => {
                    self.drop_frame(bytes.get(1).cloned(), "truncated frame");
                    return;
                }
            }
        }
    }

    fn handle(&mut self, frame: Frame) {
        match self.table.kind_of(frame.command) {
            Some(CommandKind::Set) | Some(CommandKind::Get) => {
                let applied = self.devices.get_mut(&frame.device_id)
                                          .map(|dev| dev.apply_incoming(frame.payload));
                match applied {
                    Some(true) => self.stats.applied += 1,
                    Some(false) => self.drop_frame(Some(frame.device_id), "malformed state"),
                    None => self.drop_frame(Some(frame.device_id), "unknown device"),
                }
            }
            Some(CommandKind::Done) => self.stats.acknowledged += 1,
            kind => debug!(command = frame.command, ?kind, "ignoring frame"),
        }
    }

    fn drop_frame(&mut self, device_id: Option<u8>, reason: &str) {
        self.stats.dropped += 1;
        warn!(?device_id, reason, dropped = self.stats.dropped, "dropped inbound frame");
    }
}
