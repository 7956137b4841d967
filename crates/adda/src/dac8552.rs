use embedded_hal::spi::SpiDevice;

/// DAC8552 driver.
pub struct Dac8552<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Dac8552<SPI> {
    /// Creates a new driver from an SPI peripheral.
    /// Please ensure the SPI bus is in SPI mode 1, aka (0, 1).
    pub fn new(spi: SPI) -> Self {
        spi.into()
    }

    /// Write a 16-bit code to one output channel.
    ///
    /// Sends the channel's command byte followed by the code MSB-first in a
    /// single chip-select session; the output updates when chip-select
    /// deasserts.
    pub fn write(&mut self, channel: Channel, code: u16) -> Result<(), SPI::Error> {
        let [high, low] = code.to_be_bytes();
        self.spi.write(&[channel as u8, high, low])
    }

    /// Drive an output channel to `volts`, given the board's reference
    /// voltage. Out-of-range targets clamp to the ends of the code range.
    pub fn set_voltage(&mut self, channel: Channel, vref: f32, volts: f32) -> Result<(), SPI::Error> {
        self.write(channel, voltage_to_code(vref, volts))
    }
}

impl<SPI: SpiDevice> From<SPI> for Dac8552<SPI> {
    fn from(spi: SPI) -> Self {
        Self { spi }
    }
}

/// Output channel selection. The discriminant is the command byte: buffer
/// select plus the load-DAC bits for that output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    /// VOUTA, labelled channel 1 on the hat's terminals.
    A = 0x10,
    /// VOUTB, labelled channel 2.
    B = 0x24,
}

/// Out-of-range DAC channel number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidChannel(pub u8);

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    /// Map the terminal labels 1 and 2 onto the outputs.
    fn try_from(number: u8) -> Result<Self, InvalidChannel> {
        match number {
            1 => Ok(Self::A),
            2 => Ok(Self::B),
            other => Err(InvalidChannel(other)),
        }
    }
}

/// Convert a target voltage into the 16-bit DAC code for a reference
/// voltage, truncating toward zero.
///
/// Clamps rather than wraps: negative targets floor to 0, targets at or
/// beyond `vref` ceiling to 65535.
pub fn voltage_to_code(vref: f32, volts: f32) -> u16 {
    let code = 65536.0 * volts / vref;
    if code < 0.0 {
        0
    } else if code > 65535.0 {
        65535
    } else {
        code as u16
    }
}
