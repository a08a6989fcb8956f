//! Collaborator traits: the command bus the chip sits on and the clock.

use alloc::vec::Vec;
use core::cell::Cell;
use vsq_ir::Timestamp;

use crate::protocol::{MessageDecoder, MidiMessage};

/// Register-oriented command bus to the synthesis chip.
///
/// Implementations may block until the device signals it is ready; the
/// engine treats every write as succeeding.
pub trait ControlBus {
    /// Write a 16-bit control register as high and low byte.
    fn write_control_register(&mut self, addr: u8, high: u8, low: u8);

    /// Write one byte to the MIDI data port.
    fn write_data_byte(&mut self, byte: u8);
}

impl<B: ControlBus + ?Sized> ControlBus for &mut B {
    fn write_control_register(&mut self, addr: u8, high: u8, low: u8) {
        (**self).write_control_register(addr, high, low);
    }

    fn write_data_byte(&mut self, byte: u8) {
        (**self).write_data_byte(byte);
    }
}

/// Source of the current time.
pub trait Clock {
    /// Current time. Must not go backwards (apart from counter wrap).
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at the given millisecond count.
    pub fn starting_at(ms: u32) -> Self {
        Self { now: Cell::new(Timestamp::from_millis(ms)) }
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: u32) {
        self.now.set(Timestamp::from_millis(ms));
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().add_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// One write seen by a [`RecordingBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusWrite {
    Register { addr: u8, high: u8, low: u8 },
    Data(u8),
}

/// A bus that records every write, for tests and offline rendering.
#[derive(Clone, Debug, Default)]
pub struct RecordingBus {
    writes: Vec<BusWrite>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write, in order.
    pub fn writes(&self) -> &[BusWrite] {
        &self.writes
    }

    /// Only the data-port bytes.
    pub fn data_bytes(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                BusWrite::Data(b) => Some(*b),
                BusWrite::Register { .. } => None,
            })
            .collect()
    }

    /// Data-port bytes decoded into MIDI messages.
    pub fn messages(&self) -> Vec<MidiMessage> {
        let mut decoder = MessageDecoder::new();
        self.data_bytes()
            .into_iter()
            .filter_map(|b| decoder.push(b))
            .collect()
    }

    /// Take the recorded writes, leaving the bus empty.
    pub fn take(&mut self) -> Vec<BusWrite> {
        core::mem::take(&mut self.writes)
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl ControlBus for RecordingBus {
    fn write_control_register(&mut self, addr: u8, high: u8, low: u8) {
        self.writes.push(BusWrite::Register { addr, high, low });
    }

    fn write_data_byte(&mut self, byte: u8) {
        self.writes.push(BusWrite::Data(byte));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_on_request() {
        let clock = ManualClock::starting_at(10);
        assert_eq!(clock.now().as_millis(), 10);
        clock.advance(5);
        assert_eq!(clock.now().as_millis(), 15);
        clock.set(3);
        assert_eq!((&clock).now().as_millis(), 3);
    }

    #[test]
    fn recording_bus_separates_registers_and_data() {
        let mut bus = RecordingBus::new();
        bus.write_control_register(0x0B, 0, 0);
        bus.write_data_byte(0x90);
        assert_eq!(bus.writes().len(), 2);
        assert_eq!(bus.data_bytes(), [0x90]);
        let taken = bus.take();
        assert_eq!(taken[0], BusWrite::Register { addr: 0x0B, high: 0, low: 0 });
        assert!(bus.writes().is_empty());
    }
}
