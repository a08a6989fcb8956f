//! VS1053 device layer for vsq.
//!
//! Everything the sequencer core treats as an external collaborator: the
//! SCI/SDI transport with its ready-line handshake, the real-time MIDI plugin
//! and the bring-up sequence that loads it.

mod boot;
mod error;
mod plugin;
mod tracing_bus;
mod transport;

pub use boot::{boot, reset};
pub use error::DeviceError;
pub use plugin::{load_plugin, PluginRecords, REALTIME_MIDI_PLUGIN};
pub use tracing_bus::TracingBus;
pub use transport::{InputPin, OutputPin, SpiTransfer, Vs1053Bus};
pub use vsq_engine::protocol::sci;
