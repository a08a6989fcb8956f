//! A bus that only logs.

use tracing::{debug, trace};
use vsq_engine::{ControlBus, MessageDecoder};

/// Logs every register write and every decoded MIDI message instead of
/// driving hardware. Useful to dry-run a score without a device attached.
#[derive(Debug, Default)]
pub struct TracingBus {
    decoder: MessageDecoder,
    register_writes: usize,
    messages: usize,
}

impl TracingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_writes(&self) -> usize {
        self.register_writes
    }

    /// Complete MIDI messages seen so far.
    pub fn messages(&self) -> usize {
        self.messages
    }
}

impl ControlBus for TracingBus {
    fn write_control_register(&mut self, addr: u8, high: u8, low: u8) {
        self.register_writes += 1;
        trace!(addr, value = u16::from_be_bytes([high, low]), "sci write");
    }

    fn write_data_byte(&mut self, byte: u8) {
        if let Some(msg) = self.decoder.push(byte) {
            self.messages += 1;
            debug!(status = msg.status, data1 = msg.data1, data2 = msg.data2, "midi");
        }
    }
}
