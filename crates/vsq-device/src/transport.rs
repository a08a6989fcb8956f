//! SCI/SDI transport over an SPI bus and three control lines.

use vsq_engine::ControlBus;

/// SCI opcode for a register write.
const SCI_WRITE: u8 = 0x02;
/// Byte clocked out ahead of every data byte on the SDI port.
const SDI_PAD: u8 = 0x00;

/// Full-duplex SPI byte transfer.
pub trait SpiTransfer {
    fn transfer(&mut self, byte: u8) -> u8;
}

/// A push-pull output line.
pub trait OutputPin {
    fn set_low(&mut self);
    fn set_high(&mut self);
}

/// An input line.
pub trait InputPin {
    fn is_high(&self) -> bool;
}

/// `ControlBus` for a VS1053 wired to SPI with separate control (XCS) and
/// data (XDCS) selects and a DREQ ready line.
///
/// Every transfer first waits for DREQ, which is the only place this crate
/// blocks.
pub struct Vs1053Bus<S, CS, DCS, DREQ> {
    spi: S,
    cs: CS,
    dcs: DCS,
    dreq: DREQ,
}

impl<S, CS, DCS, DREQ> Vs1053Bus<S, CS, DCS, DREQ>
where
    S: SpiTransfer,
    CS: OutputPin,
    DCS: OutputPin,
    DREQ: InputPin,
{
    /// Take ownership of the bus and lines, deselecting both ports.
    pub fn new(spi: S, mut cs: CS, mut dcs: DCS, dreq: DREQ) -> Self {
        cs.set_high();
        dcs.set_high();
        Self { spi, cs, dcs, dreq }
    }

    /// Give the bus and lines back.
    pub fn release(self) -> (S, CS, DCS, DREQ) {
        (self.spi, self.cs, self.dcs, self.dreq)
    }

    fn wait_ready(&self) {
        while !self.dreq.is_high() {
            core::hint::spin_loop();
        }
    }
}

impl<S, CS, DCS, DREQ> ControlBus for Vs1053Bus<S, CS, DCS, DREQ>
where
    S: SpiTransfer,
    CS: OutputPin,
    DCS: OutputPin,
    DREQ: InputPin,
{
    fn write_control_register(&mut self, addr: u8, high: u8, low: u8) {
        self.wait_ready();
        self.cs.set_low();
        for byte in [SCI_WRITE, addr, high, low] {
            self.spi.transfer(byte);
        }
        self.cs.set_high();
    }

    fn write_data_byte(&mut self, byte: u8) {
        self.wait_ready();
        self.dcs.set_low();
        self.spi.transfer(SDI_PAD);
        self.spi.transfer(byte);
        self.dcs.set_high();
    }
}
