//! Per-channel memory of the last program sent.

use vsq_ir::{Instrument, MIDI_CHANNELS};

/// Suppresses program changes that would re-select the current instrument.
///
/// The cache is the only record of what each channel plays; the device is
/// never queried.
#[derive(Clone, Debug, Default)]
pub struct InstrumentCache {
    programs: [Option<Instrument>; MIDI_CHANNELS],
}

impl InstrumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instrument last selected on `channel`, if any.
    pub fn get(&self, channel: u8) -> Option<Instrument> {
        self.programs[(channel & 0x0F) as usize]
    }

    /// Record `instrument` for `channel`.
    ///
    /// Returns true if a program change has to be sent, i.e. the channel was
    /// unset or held a different instrument.
    pub fn select(&mut self, channel: u8, instrument: Instrument) -> bool {
        let slot = &mut self.programs[(channel & 0x0F) as usize];
        if *slot == Some(instrument) {
            return false;
        }
        *slot = Some(instrument);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_selection_is_suppressed() {
        let mut cache = InstrumentCache::new();
        assert!(cache.select(0, Instrument::Marimba));
        assert!(!cache.select(0, Instrument::Marimba));
        assert!(cache.select(0, Instrument::Violin));
        assert_eq!(cache.get(0), Some(Instrument::Violin));
    }

    #[test]
    fn channels_are_independent() {
        let mut cache = InstrumentCache::new();
        assert!(cache.select(0, Instrument::Marimba));
        assert!(cache.select(1, Instrument::Marimba));
        assert_eq!(cache.get(2), None);
    }

    #[test]
    fn unset_channel_always_sends() {
        let mut cache = InstrumentCache::new();
        assert!(cache.select(9, Instrument::AcousticGrandPiano));
    }
}
