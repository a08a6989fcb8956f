//! Headless controller for the vsq sequencer.
//!
//! Provides real-time playback on a background thread and offline
//! rendering of scores to a timed message log, shared by the CLI and tests.

mod clock;
mod render;

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{info, warn};
use vsq_engine::{ControlBus, Engine, DEFAULT_EVENTS_PER_TRACK, DEFAULT_TRACKS, DEFAULT_VOICES};

// Re-export common types so callers don't need vsq-compose/vsq-engine directly.
pub use clock::SystemClock;
pub use render::{render, RenderError, TimedMessage};
pub use vsq_compose::{ComposeError, Score};
pub use vsq_engine::MidiMessage;

/// Engine type the controller drives: real time, owned clock.
pub type LiveEngine<B, const TRACKS: usize, const EVENTS: usize, const VOICES: usize> =
    Engine<B, SystemClock, TRACKS, EVENTS, VOICES>;

/// Runs an engine on a playback thread.
///
/// The engine is moved onto the thread by [`play`](Self::play) and handed
/// back by [`stop`](Self::stop), so only one thread ever touches it.
pub struct Controller<
    B: ControlBus,
    const TRACKS: usize = DEFAULT_TRACKS,
    const EVENTS: usize = DEFAULT_EVENTS_PER_TRACK,
    const VOICES: usize = DEFAULT_VOICES,
> {
    playback: Option<PlaybackHandle<LiveEngine<B, TRACKS, EVENTS, VOICES>>>,
}

struct PlaybackHandle<E> {
    stop_signal: Arc<AtomicBool>,
    position: Arc<AtomicU32>,
    thread: JoinHandle<E>,
}

impl<B, const TRACKS: usize, const EVENTS: usize, const VOICES: usize>
    Controller<B, TRACKS, EVENTS, VOICES>
where
    B: ControlBus + Send + 'static,
{
    pub fn new() -> Self {
        Self { playback: None }
    }

    /// Start the engine's transport and call `update` every `tick_interval`
    /// on a playback thread.
    ///
    /// If something is already playing, that engine is stopped and returned.
    pub fn play(
        &mut self,
        mut engine: LiveEngine<B, TRACKS, EVENTS, VOICES>,
        loop_ms: u32,
        tick_interval: Duration,
    ) -> Option<LiveEngine<B, TRACKS, EVENTS, VOICES>> {
        let previous = self.stop();

        let stop_signal = Arc::new(AtomicBool::new(false));
        let position = Arc::new(AtomicU32::new(0));
        let stop = stop_signal.clone();
        let pos = position.clone();

        engine.start(loop_ms);
        info!(loop_ms, interval_ms = tick_interval.as_millis() as u64, "playback started");
        let thread = std::thread::spawn(move || {
            playback_thread(&mut engine, &stop, &pos, tick_interval);
            engine
        });

        self.playback = Some(PlaybackHandle { stop_signal, position, thread });
        previous
    }

    /// Stop playback, send every outstanding note-off and return the engine.
    ///
    /// Returns `None` when nothing was playing or the playback thread
    /// panicked.
    pub fn stop(&mut self) -> Option<LiveEngine<B, TRACKS, EVENTS, VOICES>> {
        shutdown(self.playback.take()?)
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Position within the loop in ms, as of the last tick.
    pub fn position(&self) -> Option<u32> {
        let pb = self.playback.as_ref()?;
        Some(pb.position.load(Ordering::Relaxed))
    }
}

impl<B, const TRACKS: usize, const EVENTS: usize, const VOICES: usize> Default
    for Controller<B, TRACKS, EVENTS, VOICES>
where
    B: ControlBus + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ControlBus, const TRACKS: usize, const EVENTS: usize, const VOICES: usize> Drop
    for Controller<B, TRACKS, EVENTS, VOICES>
{
    fn drop(&mut self) {
        if let Some(pb) = self.playback.take() {
            shutdown(pb);
        }
    }
}

/// Signal the playback thread, join it and silence the engine.
fn shutdown<B, const TRACKS: usize, const EVENTS: usize, const VOICES: usize>(
    pb: PlaybackHandle<LiveEngine<B, TRACKS, EVENTS, VOICES>>,
) -> Option<LiveEngine<B, TRACKS, EVENTS, VOICES>>
where
    B: ControlBus,
{
    pb.stop_signal.store(true, Ordering::Relaxed);
    match pb.thread.join() {
        Ok(mut engine) => {
            engine.stop();
            let released = engine.release_all();
            info!(released, "playback stopped");
            Some(engine)
        }
        Err(_) => {
            warn!("playback thread panicked");
            None
        }
    }
}

fn playback_thread<B, const TRACKS: usize, const EVENTS: usize, const VOICES: usize>(
    engine: &mut LiveEngine<B, TRACKS, EVENTS, VOICES>,
    stop_signal: &AtomicBool,
    position: &AtomicU32,
    tick_interval: Duration,
) where
    B: ControlBus,
{
    while !stop_signal.load(Ordering::Relaxed) {
        engine.update();
        if let Some(pos) = engine.position() {
            position.store(pos.position, Ordering::Relaxed);
        }
        std::thread::sleep(tick_interval);
    }
}
