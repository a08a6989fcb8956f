//! Main sequencer engine.

use tracing::{debug, info, warn};
use vsq_ir::{Instrument, Note, SeqEvent, Timestamp, MIDI_DATA_MAX};

use crate::bus::{Clock, ControlBus};
use crate::config::{EngineConfig, DEFAULT_EVENTS_PER_TRACK, DEFAULT_TRACKS, DEFAULT_VOICES};
use crate::error::SequencerError;
use crate::pattern_store::PatternStore;
use crate::port::MidiPort;
use crate::protocol::{cc, sci, MidiMessage};
use crate::scheduler::{advance_cycle_start, loop_position, LoopLength, LoopPosition, RunState};
use crate::voice_pool::VoicePool;

/// Highest bass enhancer level accepted by [`Engine::set_bass_boost`].
pub const BASS_BOOST_MAX: u8 = 15;

/// The sequencer engine.
///
/// Owns the bus, the clock, the pattern store, the voice pool and the
/// instrument cache. Capacities are fixed at compile time:
///
/// - `TRACKS`: number of tracks (default 8)
/// - `EVENTS`: events per track (default 128)
/// - `VOICES`: notes awaiting their note-off (default 32)
///
/// Call [`update`](Self::update) from the application's main loop; every
/// method is non-blocking apart from what the bus itself does.
pub struct Engine<
    B,
    C,
    const TRACKS: usize = DEFAULT_TRACKS,
    const EVENTS: usize = DEFAULT_EVENTS_PER_TRACK,
    const VOICES: usize = DEFAULT_VOICES,
> {
    port: MidiPort<B, VOICES>,
    clock: C,
    patterns: PatternStore<TRACKS, EVENTS>,
    state: RunState,
}

impl<B, C, const TRACKS: usize, const EVENTS: usize, const VOICES: usize>
    Engine<B, C, TRACKS, EVENTS, VOICES>
where
    B: ControlBus,
    C: Clock,
{
    /// Create a stopped engine with empty tracks.
    pub fn new(bus: B, clock: C, config: EngineConfig) -> Self {
        Self {
            port: MidiPort::new(bus, config.exhaustion),
            clock,
            patterns: PatternStore::new(),
            state: RunState::Stopped,
        }
    }

    // --- Collaborators ---

    pub fn bus(&self) -> &B {
        &self.port.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.port.bus
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Tear down the engine, returning the bus.
    pub fn into_bus(self) -> B {
        self.port.bus
    }

    pub fn patterns(&self) -> &PatternStore<TRACKS, EVENTS> {
        &self.patterns
    }

    pub fn voices(&self) -> &VoicePool<VOICES> {
        &self.port.voices
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    // --- Immediate MIDI ---

    /// Select an instrument on a channel. Skipped when the channel already
    /// plays it.
    pub fn set_instrument(&mut self, channel: u8, instrument: Instrument) {
        self.port.set_instrument(channel, instrument);
    }

    pub fn note_on(&mut self, channel: u8, note: Note, velocity: u8) {
        self.port.note_on(channel, note, velocity);
    }

    pub fn note_off(&mut self, channel: u8, note: Note, velocity: u8) {
        self.port.note_off(channel, note, velocity);
    }

    /// Select `instrument`, sound `note`, and schedule its note-off after
    /// `duration` ms, capped at [`MAX_DURATION_MS`](vsq_ir::MAX_DURATION_MS).
    pub fn play_note_async(
        &mut self,
        channel: u8,
        instrument: Instrument,
        note: Note,
        duration: u32,
        velocity: u8,
    ) {
        let now = self.clock.now();
        self.port.play(channel, Some(instrument), note, velocity, duration, now);
    }

    /// [`play_note_async`](Self::play_note_async) with the channel's current
    /// instrument.
    pub fn play_note_async_current(&mut self, channel: u8, note: Note, duration: u32, velocity: u8) {
        let now = self.clock.now();
        self.port.play(channel, None, note, velocity, duration, now);
    }

    /// Raw control change.
    pub fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.port.send(MidiMessage::control_change(channel, controller, value));
        debug!(channel = channel & 0x0F, controller, value, "control change");
    }

    /// Pan (CC#10), 0 = left, 127 = right.
    pub fn set_pan(&mut self, channel: u8, pan: u8) {
        let pan = clamp_data("pan", pan);
        self.control_change(channel, cc::PAN, pan);
    }

    /// Reverb send (CC#91) on channel 0.
    pub fn set_reverb(&mut self, level: u8) {
        let level = clamp_data("reverb", level);
        self.control_change(0, cc::REVERB, level);
    }

    /// Volume (CC#7) on channel 0.
    pub fn set_master_volume(&mut self, volume: u8) {
        let volume = clamp_data("master volume", volume);
        self.control_change(0, cc::VOLUME, volume);
    }

    /// Volume (CC#7) on one channel.
    pub fn set_channel_volume(&mut self, channel: u8, volume: u8) {
        let volume = clamp_data("channel volume", volume);
        self.control_change(channel, cc::VOLUME, volume);
    }

    /// Bass enhancer amplitude, 0 (off) to 15.
    pub fn set_bass_boost(&mut self, level: u8) {
        let level = if level > BASS_BOOST_MAX {
            warn!(level, "bass boost too high, clamping to {}", BASS_BOOST_MAX);
            BASS_BOOST_MAX
        } else {
            level
        };
        self.port.bus.write_control_register(sci::BASS, level << 4, 0x00);
        debug!(level, "bass boost");
    }

    // --- Pattern editing ---

    /// Remove every event from a track.
    pub fn clear_track(&mut self, track: usize) -> Result<(), SequencerError> {
        self.patterns.clear(track)
    }

    /// Append an event to a track.
    pub fn add_event(&mut self, track: usize, event: SeqEvent) -> Result<(), SequencerError> {
        self.patterns.append(track, event)?;
        debug!(
            track,
            offset = event.offset,
            channel = event.channel,
            program = event.instrument.program(),
            note = event.note.0,
            velocity = event.velocity,
            duration = event.duration,
            "event added"
        );
        Ok(())
    }

    // --- Transport ---

    /// Start (or restart) the sequencer from position 0.
    ///
    /// `loop_ms == 0` loops over the longest track; any other value fixes the
    /// loop length.
    pub fn start(&mut self, loop_ms: u32) {
        self.start_with(LoopLength::from_millis(loop_ms));
    }

    /// [`start`](Self::start) with an explicit loop policy, including
    /// [`LoopLength::Once`] for one pass without wrapping.
    pub fn start_with(&mut self, loop_length: LoopLength) {
        let started_at = self.clock.now();
        self.state = RunState::Running {
            started_at,
            loop_length,
            cycle_start: started_at,
            cycle: 0,
        };
        self.patterns.rearm_all();
        info!(?loop_length, at = started_at.as_millis(), "sequencer started");
    }

    /// Stop firing events. Notes already sounding still get their note-offs.
    pub fn stop(&mut self) {
        self.state = RunState::Stopped;
        info!("sequencer stopped");
    }

    /// Current loop position, if running. `cycle` counts from `start`.
    pub fn position(&self) -> Option<LoopPosition> {
        let RunState::Running { loop_length, cycle_start, cycle, .. } = self.state else {
            return None;
        };
        let pos = loop_position(
            cycle_start,
            self.clock.now(),
            loop_length,
            self.patterns.max_loop_length(),
        );
        Some(LoopPosition { cycle: cycle.wrapping_add(pos.cycle), ..pos })
    }

    /// Send every pending note-off immediately.
    pub fn release_all(&mut self) -> usize {
        self.port.release_all()
    }

    /// Run one tick at the clock's current time.
    pub fn update(&mut self) {
        let now = self.clock.now();
        self.tick_at(now);
    }

    /// Run one tick at `now`.
    ///
    /// Due note-offs go out first, so a note ending and one starting in the
    /// same tick are sent off-before-on. Then, if running, every armed event
    /// whose offset has been reached in the current cycle fires.
    ///
    /// Position is measured from the start of the current cycle against the
    /// current loop length. Crossing the cycle end re-arms every event; a
    /// track growing mid-cycle only lengthens the cycle.
    pub fn tick_at(&mut self, now: Timestamp) {
        self.port.expire_due(now);

        let RunState::Running { started_at, loop_length, cycle_start, cycle } = self.state else {
            return;
        };

        let pos = loop_position(cycle_start, now, loop_length, self.patterns.max_loop_length());
        if pos.cycle != 0 {
            self.patterns.rearm_all();
            self.state = RunState::Running {
                started_at,
                loop_length,
                cycle_start: advance_cycle_start(cycle_start, &pos),
                cycle: cycle.wrapping_add(pos.cycle),
            };
        }

        for (t, track) in self.patterns.tracks_mut().iter_mut().enumerate() {
            for (i, slot) in track.events_mut().iter_mut().enumerate() {
                let ev = slot.event;
                if !slot.fired && ev.offset <= pos.position {
                    self.port.play(
                        ev.channel,
                        Some(ev.instrument),
                        ev.note,
                        ev.velocity,
                        ev.duration,
                        now,
                    );
                    slot.fired = true;
                    debug!(
                        track = t,
                        event = i,
                        channel = ev.channel,
                        note = ev.note.0,
                        duration = ev.duration,
                        position = pos.position,
                        "event fired"
                    );
                } else if slot.fired && ev.offset > pos.position {
                    slot.fired = false;
                }
            }
        }
    }
}

fn clamp_data(what: &'static str, value: u8) -> u8 {
    if value > MIDI_DATA_MAX {
        warn!(value, "{} too high, clamping to {}", what, MIDI_DATA_MAX);
        MIDI_DATA_MAX
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusWrite, ManualClock, RecordingBus};
    use crate::config::ExhaustionPolicy;
    use alloc::vec::Vec;

    type TestEngine<'a> = Engine<RecordingBus, &'a ManualClock, 2, 8, 4>;

    fn engine(clock: &ManualClock) -> TestEngine<'_> {
        Engine::new(RecordingBus::new(), clock, EngineConfig::default())
    }

    fn note_ons(engine: &mut TestEngine<'_>) -> Vec<u8> {
        let notes = engine
            .bus()
            .messages()
            .iter()
            .filter(|m| m.status & 0xF0 == 0x90)
            .map(|m| m.data1)
            .collect();
        engine.bus_mut().clear();
        notes
    }

    fn ev(offset: u32, note: u8, duration: u32) -> SeqEvent {
        SeqEvent::new(offset, Instrument::AcousticGrandPiano, Note(note), duration)
    }

    #[test]
    fn stopped_engine_fires_nothing_but_expires_voices() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(0, ev(0, 60, 100)).unwrap();
        engine.play_note_async(0, Instrument::Marimba, Note(72), 50, 100);
        engine.bus_mut().clear();

        clock.set(50);
        engine.update();
        assert_eq!(engine.bus().messages(), [MidiMessage::note_off(0, Note(72), 64)]);
        assert!(!engine.is_running());
    }

    #[test]
    fn fixed_loop_refires_each_cycle() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(0, ev(0, 60, 100)).unwrap();
        engine.start(200);

        engine.update();
        assert_eq!(note_ons(&mut engine), [60]);

        clock.set(50);
        engine.update();
        assert!(note_ons(&mut engine).is_empty());

        clock.set(200);
        engine.update();
        assert_eq!(note_ons(&mut engine), [60]);

        clock.set(210);
        engine.update();
        assert!(note_ons(&mut engine).is_empty());
    }

    #[test]
    fn growing_track_mid_cycle_does_not_refire() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(0, ev(0, 60, 500)).unwrap();
        engine.add_event(0, ev(100, 62, 100)).unwrap();
        engine.start(0);

        let steps: [(u32, &[u8]); 4] = [(0, &[60]), (150, &[62]), (1_000, &[60]), (1_150, &[62])];
        for (at, expected) in steps {
            clock.set(at);
            engine.update();
            assert_eq!(note_ons(&mut engine), expected, "tick at {at}");
        }

        // Loop grows from 500 to 1000 ms in the middle of a cycle.
        engine.add_event(1, ev(0, 70, 1_000)).unwrap();
        clock.set(1_160);
        engine.update();
        assert_eq!(note_ons(&mut engine), [70]);

        clock.set(1_600);
        engine.update();
        assert!(note_ons(&mut engine).is_empty());
        assert_eq!(engine.position().map(|p| (p.cycle, p.position)), Some((2, 600)));

        clock.set(2_000);
        engine.update();
        assert_eq!(note_ons(&mut engine), [60, 70]);
    }

    #[test]
    fn once_plays_each_event_a_single_time() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(0, ev(0, 60, 100)).unwrap();
        engine.add_event(0, ev(500, 64, 100)).unwrap();
        engine.start_with(LoopLength::Once);

        let mut ons = Vec::new();
        for at in (0..2_000).step_by(5) {
            clock.set(at);
            engine.update();
            ons.extend(note_ons(&mut engine));
        }
        assert_eq!(ons, [60, 64]);
        assert_eq!(engine.voices().active_count(), 0);
    }

    #[test]
    fn start_rearms_every_event() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(0, ev(0, 60, 10)).unwrap();
        engine.add_event(1, ev(5, 62, 10)).unwrap();
        engine.start(0);
        clock.set(5);
        engine.update();
        assert_eq!(note_ons(&mut engine), [60, 62]);

        engine.start(0);
        assert!(engine.patterns().tracks().iter().all(|t| t.events().iter().all(|e| !e.fired)));
        engine.update();
        assert_eq!(note_ons(&mut engine), [60]);
    }

    #[test]
    fn stop_halts_firing_but_not_note_offs() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(0, ev(0, 60, 100)).unwrap();
        engine.add_event(0, ev(50, 62, 100)).unwrap();
        engine.start(0);
        engine.update();
        engine.stop();
        engine.bus_mut().clear();

        clock.set(100);
        engine.update();
        assert_eq!(engine.bus().messages(), [MidiMessage::note_off(0, Note(60), 64)]);
        assert_eq!(engine.position(), None);
    }

    #[test]
    fn events_fire_in_track_then_append_order() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(1, ev(0, 70, 10)).unwrap();
        engine.add_event(0, ev(20, 61, 10)).unwrap();
        engine.add_event(0, ev(10, 60, 10)).unwrap();
        engine.start(0);
        clock.set(25);
        engine.update();
        assert_eq!(note_ons(&mut engine), [61, 60, 70]);
    }

    #[test]
    fn late_tick_fires_everything_due() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        for (i, n) in [60, 62, 64, 65].into_iter().enumerate() {
            engine.add_event(0, ev(i as u32 * 100, n, 100)).unwrap();
        }
        engine.start(0);
        clock.set(250);
        engine.update();
        assert_eq!(note_ons(&mut engine), [60, 62, 64]);
    }

    #[test]
    fn sequenced_program_changes_are_deduplicated() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.add_event(0, ev(0, 60, 10)).unwrap();
        engine.add_event(0, ev(0, 64, 10)).unwrap();
        engine.start(0);
        engine.update();
        let programs = engine
            .bus()
            .messages()
            .iter()
            .filter(|m| m.status & 0xF0 == 0xC0)
            .count();
        assert_eq!(programs, 1);
    }

    #[test]
    fn immediate_set_instrument_uses_cache() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.set_instrument(0, Instrument::Violin);
        engine.set_instrument(0, Instrument::Violin);
        engine.set_instrument(0, Instrument::Cello);
        engine.set_instrument(1, Instrument::Violin);
        assert_eq!(
            engine.bus().messages(),
            [
                MidiMessage::program_change(0, 40),
                MidiMessage::program_change(0, 42),
                MidiMessage::program_change(1, 40),
            ]
        );
    }

    #[test]
    fn play_note_async_current_keeps_instrument() {
        let clock = ManualClock::starting_at(1_000);
        let mut engine = engine(&clock);
        engine.play_note_async_current(3, Note(50), 20, 80);
        assert_eq!(engine.bus().messages(), [MidiMessage::note_on(3, Note(50), 80)]);
        assert_eq!(engine.voices().get(0).unwrap().due.as_millis(), 1_020);
    }

    #[test]
    fn control_helpers_clamp() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.set_pan(2, 200);
        engine.set_reverb(40);
        engine.set_master_volume(255);
        engine.set_channel_volume(5, 90);
        assert_eq!(
            engine.bus().messages(),
            [
                MidiMessage::control_change(2, 10, 127),
                MidiMessage::control_change(0, 91, 40),
                MidiMessage::control_change(0, 7, 127),
                MidiMessage::control_change(5, 7, 90),
            ]
        );
    }

    #[test]
    fn bass_boost_writes_register() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.set_bass_boost(7);
        engine.set_bass_boost(99);
        assert_eq!(
            engine.bus().writes(),
            &[
                BusWrite::Register { addr: 0x02, high: 0x70, low: 0 },
                BusWrite::Register { addr: 0x02, high: 0xF0, low: 0 },
            ]
        );
    }

    #[test]
    fn exhaustion_policy_reaches_sequenced_notes() {
        let clock = ManualClock::new();
        let config = EngineConfig::default().with_exhaustion(ExhaustionPolicy::ForceOff);
        let mut engine: Engine<_, _, 1, 8, 1> = Engine::new(RecordingBus::new(), &clock, config);
        engine.add_event(0, ev(0, 60, 100)).unwrap();
        engine.add_event(0, ev(0, 64, 100)).unwrap();
        engine.start(0);
        engine.update();
        assert_eq!(
            engine.bus().messages(),
            [
                MidiMessage::program_change(0, 0),
                MidiMessage::note_on(0, Note(60), 110),
                MidiMessage::note_on(0, Note(64), 110),
                MidiMessage::note_off(0, Note(64), 64),
            ]
        );
    }

    #[test]
    fn empty_pattern_does_not_divide_by_zero() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start(0);
        clock.set(1_234);
        engine.update();
        assert_eq!(engine.position().map(|p| p.length), Some(1));
        assert!(engine.bus().writes().is_empty());
    }

    #[test]
    fn release_all_silences_pending_notes() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.play_note_async(0, Instrument::Flute, Note(60), 10_000, 100);
        engine.play_note_async(1, Instrument::Flute, Note(67), 10_000, 100);
        assert_eq!(engine.release_all(), 2);
        assert_eq!(engine.voices().active_count(), 0);
    }
}
