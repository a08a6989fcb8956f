//! Offline rendering of a score to a timed message log.

use std::fmt;

use tracing::debug;
use vsq_compose::{ComposeError, Score};
use vsq_engine::{Engine, EngineConfig, ManualClock, MidiMessage, RecordingBus};

/// Error type for offline rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("render step must be at least 1 ms")]
    ZeroStep,
}

/// A message together with the time of the tick that sent it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedMessage {
    pub at: u32,
    pub message: MidiMessage,
}

impl fmt::Display for TimedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.message;
        write!(f, "{:>8} ms  {:02X} {:3}", self.at, m.status, m.data1)?;
        if m.status & 0xF0 != 0xC0 {
            write!(f, " {:3}", m.data2)?;
        }
        Ok(())
    }
}

/// Play `score` against a recording bus with a simulated clock.
///
/// The engine is ticked every `step_ms` from 0 up to and including
/// `duration_ms`; notes still sounding at the end are released at
/// `duration_ms`.
pub fn render(score: &Score, duration_ms: u32, step_ms: u32) -> Result<Vec<TimedMessage>, RenderError> {
    if step_ms == 0 {
        return Err(RenderError::ZeroStep);
    }

    let clock = ManualClock::new();
    let mut engine: Engine<_, _> = Engine::new(RecordingBus::new(), &clock, EngineConfig::default());
    let longest = score.apply(&mut engine)?;
    debug!(longest, loop_ms = score.loop_ms, "score loaded");

    let mut log = Vec::new();
    engine.start(score.loop_ms);
    let mut at = 0u32;
    loop {
        clock.set(at);
        engine.update();
        collect(&mut engine, at, &mut log);
        if at >= duration_ms {
            break;
        }
        at = at.saturating_add(step_ms).min(duration_ms);
    }

    engine.stop();
    engine.release_all();
    collect(&mut engine, duration_ms, &mut log);
    Ok(log)
}

fn collect(engine: &mut Engine<RecordingBus, &ManualClock>, at: u32, log: &mut Vec<TimedMessage>) {
    let bus = engine.bus_mut();
    log.extend(bus.messages().into_iter().map(|message| TimedMessage { at, message }));
    bus.clear();
}
