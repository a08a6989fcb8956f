//! Real-time MIDI plugin image and loader.
//!
//! The image is a flat list of records: register address, value count, then
//! that many 16-bit values, each written to the same register in order.

use tracing::debug;
use vsq_engine::ControlBus;

use crate::error::DeviceError;

/// Plugin that switches a VS1053b into real-time MIDI mode.
pub const REALTIME_MIDI_PLUGIN: [u16; 28] = [
    0x0007, 0x0001, 0x8050, 0x0006, 0x0014, 0x0030, 0x0715, 0xb080,
    0x3400, 0x0007, 0x9255, 0x3d00, 0x0024, 0x0030, 0x0295, 0x6890,
    0x3400, 0x0030, 0x0495, 0x3d00, 0x0024, 0x2908, 0x4d40, 0x0030,
    0x0200, 0x000a, 0x0001, 0x0050,
];

/// Iterator over `(register, values)` records of a plugin image.
#[derive(Clone, Debug)]
pub struct PluginRecords<'a> {
    words: &'a [u16],
    pos: usize,
}

impl<'a> PluginRecords<'a> {
    pub fn new(words: &'a [u16]) -> Self {
        Self { words, pos: 0 }
    }
}

impl<'a> Iterator for PluginRecords<'a> {
    type Item = Result<(u8, &'a [u16]), DeviceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.words.len() {
            return None;
        }
        let offset = self.pos;
        let truncated = DeviceError::TruncatedPlugin { offset };

        let Some(&[addr, count]) = self.words.get(offset..offset + 2) else {
            self.pos = self.words.len();
            return Some(Err(truncated));
        };
        let start = offset + 2;
        let end = start + count as usize;
        let Some(values) = self.words.get(start..end) else {
            self.pos = self.words.len();
            return Some(Err(truncated));
        };
        self.pos = end;
        Some(Ok(((addr & 0xFF) as u8, values)))
    }
}

/// Write a plugin image to the device, returning the number of register
/// writes.
///
/// The image is validated before anything is written, so a truncated blob
/// leaves the device untouched.
pub fn load_plugin<B: ControlBus + ?Sized>(bus: &mut B, image: &[u16]) -> Result<usize, DeviceError> {
    for record in PluginRecords::new(image) {
        record?;
    }

    let mut writes = 0;
    for record in PluginRecords::new(image) {
        let (addr, values) = record?;
        for &value in values {
            bus.write_control_register(addr, (value >> 8) as u8, (value & 0xFF) as u8);
            writes += 1;
        }
    }
    debug!(writes, words = image.len(), "plugin loaded");
    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsq_engine::{BusWrite, RecordingBus};

    #[test]
    fn default_plugin_has_three_records() {
        let records: Vec<_> = PluginRecords::new(&REALTIME_MIDI_PLUGIN)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], (0x07, &[0x8050][..]));
        assert_eq!(records[1].0, 0x06);
        assert_eq!(records[1].1.len(), 20);
        assert_eq!(records[2], (0x0A, &[0x0050][..]));
    }

    #[test]
    fn load_writes_every_value_high_byte_first() {
        let mut bus = RecordingBus::new();
        let writes = load_plugin(&mut bus, &REALTIME_MIDI_PLUGIN).unwrap();
        assert_eq!(writes, 22);
        assert_eq!(bus.writes().len(), 22);
        assert_eq!(bus.writes()[0], BusWrite::Register { addr: 0x07, high: 0x80, low: 0x50 });
        assert_eq!(bus.writes()[21], BusWrite::Register { addr: 0x0A, high: 0x00, low: 0x50 });
    }

    #[test]
    fn truncated_image_is_rejected_before_writing() {
        let image = [0x0007, 0x0001, 0x8050, 0x0006, 0x0004, 0x0030];
        let mut bus = RecordingBus::new();
        assert_eq!(
            load_plugin(&mut bus, &image),
            Err(DeviceError::TruncatedPlugin { offset: 3 })
        );
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn dangling_address_word_is_truncation() {
        let image = [0x0007, 0x0001, 0x8050, 0x000B];
        let mut records = PluginRecords::new(&image);
        assert!(records.next().unwrap().is_ok());
        assert_eq!(records.next(), Some(Err(DeviceError::TruncatedPlugin { offset: 3 })));
        assert_eq!(records.next(), None);
    }
}
