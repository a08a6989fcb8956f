//! MIDI message framing for the VS1053 real-time MIDI data port.
//!
//! Every byte of a message is written with a separate data-port write; the
//! transport takes care of the SDI framing around each byte.

use arrayvec::ArrayVec;
use vsq_ir::Note;

use crate::bus::ControlBus;

/// Release velocity used for note-offs the engine generates itself.
pub const DEFAULT_RELEASE_VELOCITY: u8 = 64;

/// Control change numbers used by the helpers.
pub mod cc {
    /// Channel volume (coarse)
    pub const VOLUME: u8 = 7;
    /// Pan (coarse)
    pub const PAN: u8 = 10;
    /// Reverb send level
    pub const REVERB: u8 = 91;
}

/// Serial control interface (SCI) register addresses.
pub mod sci {
    pub const MODE: u8 = 0x00;
    pub const STATUS: u8 = 0x01;
    /// Bass/treble enhancer
    pub const BASS: u8 = 0x02;
    pub const CLOCKF: u8 = 0x03;
    pub const WRAM: u8 = 0x06;
    pub const WRAMADDR: u8 = 0x07;
    pub const AIADDR: u8 = 0x0A;
    /// Attenuation per side; 0x0000 is loudest
    pub const VOL: u8 = 0x0B;
}

/// Message class, taken from the high nibble of the status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    System,
}

impl StatusKind {
    /// Classify a status byte. Bytes below 0x80 are data bytes.
    pub const fn of(status: u8) -> Option<Self> {
        match status & 0xF0 {
            0x80 => Some(Self::NoteOff),
            0x90 => Some(Self::NoteOn),
            0xA0 => Some(Self::PolyPressure),
            0xB0 => Some(Self::ControlChange),
            0xC0 => Some(Self::ProgramChange),
            0xD0 => Some(Self::ChannelPressure),
            0xE0 => Some(Self::PitchBend),
            0xF0 => Some(Self::System),
            _ => None,
        }
    }

    /// Number of data bytes the device expects after the status byte.
    ///
    /// Only program change is framed short; everything else, channel
    /// pressure included, goes out as three bytes.
    pub const fn data_len(self) -> usize {
        match self {
            Self::ProgramChange => 1,
            _ => 2,
        }
    }
}

/// A channel message: status byte plus up to two data bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiMessage {
    /// Build a message from raw bytes.
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self { status, data1, data2 }
    }

    pub const fn note_on(channel: u8, note: Note, velocity: u8) -> Self {
        Self::new(0x90 | (channel & 0x0F), note.0, velocity)
    }

    pub const fn note_off(channel: u8, note: Note, velocity: u8) -> Self {
        Self::new(0x80 | (channel & 0x0F), note.0, velocity)
    }

    pub const fn program_change(channel: u8, program: u8) -> Self {
        Self::new(0xC0 | (channel & 0x0F), program, 0)
    }

    pub const fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(0xB0 | (channel & 0x0F), controller, value)
    }

    /// Message class, or `None` if the status byte is not a status byte.
    pub const fn kind(&self) -> Option<StatusKind> {
        StatusKind::of(self.status)
    }

    /// Channel in the low nibble of the status byte.
    pub const fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    /// The bytes as they go out on the data port.
    pub fn encode(&self) -> ArrayVec<u8, 3> {
        let mut bytes = ArrayVec::new();
        bytes.push(self.status);
        bytes.push(self.data1);
        if self.status & 0xF0 != 0xC0 {
            bytes.push(self.data2);
        }
        bytes
    }
}

/// Write one message to the data port.
pub fn send<B: ControlBus + ?Sized>(bus: &mut B, message: MidiMessage) {
    for byte in message.encode() {
        bus.write_data_byte(byte);
    }
}

/// Reassembles a data-port byte stream into messages.
///
/// A status byte always starts a new message, discarding any partial one.
/// Stray data bytes with no preceding status are ignored.
#[derive(Clone, Debug, Default)]
pub struct MessageDecoder {
    status: Option<u8>,
    data: ArrayVec<u8, 2>,
}

impl MessageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns a message when it completes one.
    pub fn push(&mut self, byte: u8) -> Option<MidiMessage> {
        if let Some(kind) = StatusKind::of(byte) {
            self.status = Some(byte);
            self.data.clear();
            if kind == StatusKind::System {
                self.status = None;
            }
            return None;
        }

        let status = self.status?;
        self.data.push(byte & 0x7F);
        let kind = StatusKind::of(status)?;
        if self.data.len() < kind.data_len() {
            return None;
        }

        let message = MidiMessage::new(
            status,
            self.data[0],
            self.data.get(1).copied().unwrap_or(0),
        );
        self.status = None;
        self.data.clear();
        Some(message)
    }
}
