//! The output side of the engine: everything that ends up on the bus.

use tracing::{debug, trace, warn};
use vsq_ir::{Instrument, Note, Timestamp, MAX_DURATION_MS};

use crate::bus::ControlBus;
use crate::config::ExhaustionPolicy;
use crate::instrument_cache::InstrumentCache;
use crate::protocol::{self, MidiMessage, DEFAULT_RELEASE_VELOCITY};
use crate::voice_pool::VoicePool;

/// Bus, instrument cache and voice pool, owned together so the sequencer can
/// fire events while it iterates its own tracks.
pub(crate) struct MidiPort<B, const VOICES: usize> {
    pub(crate) bus: B,
    pub(crate) cache: InstrumentCache,
    pub(crate) voices: VoicePool<VOICES>,
    pub(crate) exhaustion: ExhaustionPolicy,
}

impl<B: ControlBus, const VOICES: usize> MidiPort<B, VOICES> {
    pub(crate) fn new(bus: B, exhaustion: ExhaustionPolicy) -> Self {
        Self {
            bus,
            cache: InstrumentCache::new(),
            voices: VoicePool::new(),
            exhaustion,
        }
    }

    pub(crate) fn send(&mut self, message: MidiMessage) {
        protocol::send(&mut self.bus, message);
    }

    /// Program change, unless the channel already plays `instrument`.
    pub(crate) fn set_instrument(&mut self, channel: u8, instrument: Instrument) {
        let channel = channel & 0x0F;
        if self.cache.select(channel, instrument) {
            self.send(MidiMessage::program_change(channel, instrument.program()));
            debug!(channel, program = instrument.program(), "program change");
        } else {
            trace!(channel, program = instrument.program(), "program change skipped");
        }
    }

    pub(crate) fn note_on(&mut self, channel: u8, note: Note, velocity: u8) {
        self.send(MidiMessage::note_on(channel, note, velocity));
        trace!(channel, note = note.0, velocity, "note on");
    }

    pub(crate) fn note_off(&mut self, channel: u8, note: Note, velocity: u8) {
        self.send(MidiMessage::note_off(channel, note, velocity));
        trace!(channel, note = note.0, "note off");
    }

    /// Sound a note now and schedule its off-message `duration` ms later.
    ///
    /// `instrument` of `None` keeps whatever the channel has selected.
    /// Durations above [`MAX_DURATION_MS`] are shortened to it.
    pub(crate) fn play(
        &mut self,
        channel: u8,
        instrument: Option<Instrument>,
        note: Note,
        velocity: u8,
        duration: u32,
        now: Timestamp,
    ) {
        if let Some(instrument) = instrument {
            self.set_instrument(channel, instrument);
        }
        self.note_on(channel, note, velocity);

        if duration > MAX_DURATION_MS {
            debug!(duration, "duration too long, shortening to {}", MAX_DURATION_MS);
        }
        let due = now.add_millis(duration.min(MAX_DURATION_MS));
        if self.voices.reserve(channel & 0x0F, note, due).is_ok() {
            return;
        }
        match self.exhaustion {
            ExhaustionPolicy::Drop => {
                warn!(channel, note = note.0, "no free voice slot, note-off dropped");
            }
            ExhaustionPolicy::ForceOff => {
                warn!(channel, note = note.0, "no free voice slot, cutting note");
                self.note_off(channel, note, DEFAULT_RELEASE_VELOCITY);
            }
        }
    }

    pub(crate) fn expire_due(&mut self, now: Timestamp) -> usize {
        self.voices.expire_due(now, &mut self.bus)
    }

    pub(crate) fn release_all(&mut self) -> usize {
        self.voices.release_all(&mut self.bus)
    }
}
