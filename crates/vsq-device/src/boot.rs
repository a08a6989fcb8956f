//! Device bring-up.

use tracing::info;
use vsq_engine::protocol::sci;
use vsq_engine::ControlBus;

use crate::error::DeviceError;
use crate::plugin::{load_plugin, REALTIME_MIDI_PLUGIN};
use crate::transport::OutputPin;

/// Pulse the hardware reset line: low for 10 ms, then high and 10 ms to
/// settle.
pub fn reset<P: OutputPin>(pin: &mut P, mut delay_ms: impl FnMut(u32)) {
    pin.set_low();
    delay_ms(10);
    pin.set_high();
    delay_ms(10);
}

/// Load the real-time MIDI plugin and set the output to full volume.
///
/// After this the data port accepts MIDI bytes.
pub fn boot<B: ControlBus + ?Sized>(bus: &mut B) -> Result<(), DeviceError> {
    let writes = load_plugin(bus, &REALTIME_MIDI_PLUGIN)?;
    bus.write_control_register(sci::VOL, 0x00, 0x00);
    info!(plugin_writes = writes, "VS1053 initialized");
    Ok(())
}
