use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use embedded_hal::spi::{Operation, SpiDevice};

/// Factory-programmed chip identification, STATUS register bits 7-4.
pub const CHIP_ID: u8 = 3;

/// Command opcodes, ADS1256 datasheet table 24. Only the opcodes the driver
/// issues are listed.
mod cmd {
    pub const WAKEUP: u8 = 0x00;
    pub const RDATA: u8 = 0x01;
    pub const RREG: u8 = 0x10;
    pub const WREG: u8 = 0x50;
    pub const SELFCAL: u8 = 0xF0;
    pub const SYNC: u8 = 0xFC;
    pub const RESET: u8 = 0xFE;
}

/// Delay from the last SCLK edge of an RREG/RDATA command to the first SCLK
/// edge of the response (datasheet t6, min 50 clkin periods = 6.5 us).
const DATA_DELAY_US: u32 = 10;

// Settle times between scan-step commands. Chip-mandated margins, not
// tunables.
const MUX_SETTLE_US: u32 = 5;
const SYNC_SETTLE_US: u32 = 5;
const WAKEUP_SETTLE_US: u32 = 25;
const CONFIG_SETTLE_US: u32 = 50;

/// DRDY poll interval and total bound. The bound is expressed as elapsed
/// time through the delay provider so it holds across host CPU speeds.
const READY_POLL_US: u32 = 5;
const READY_TIMEOUT_US: u32 = 500_000;

/// Register map, ADS1256 datasheet table 23.
#[derive(Clone, Copy, Debug)]
#[repr(u8)]
pub enum Register {
    Status = 0x00,
    Mux = 0x01,
    Adcon = 0x02,
    Drate = 0x03,
    Io = 0x04,
    Ofc0 = 0x05,
    Ofc1 = 0x06,
    Ofc2 = 0x07,
    Fsc0 = 0x08,
    Fsc1 = 0x09,
    Fsc2 = 0x0A,
}

/// Programmable gain amplifier setting. The discriminant is the ADCON PGA
/// bit pattern.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Gain {
    Gain1 = 0b000,
    Gain2 = 0b001,
    Gain4 = 0b010,
    Gain8 = 0b011,
    Gain16 = 0b100,
    Gain32 = 0b101,
    Gain64 = 0b110,
}

impl Gain {
    /// Amplification factor applied before conversion.
    pub fn factor(self) -> u8 {
        1 << (self as u8)
    }
}

/// Output data rate. The discriminant is the DRATE register code, taken
/// from the vendor demo table for this board (note the 10 SPS entry is
/// 0x20 there while the datasheet lists 0x23).
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DataRate {
    Sps30000 = 0xF0,
    Sps15000 = 0xE0,
    Sps7500 = 0xD0,
    Sps3750 = 0xC0,
    Sps2000 = 0xB0,
    Sps1000 = 0xA1,
    Sps500 = 0x92,
    Sps100 = 0x82,
    Sps60 = 0x72,
    Sps50 = 0x63,
    Sps30 = 0x53,
    Sps25 = 0x43,
    Sps15 = 0x33,
    Sps10 = 0x20,
    Sps5 = 0x13,
    Sps2_5 = 0x03,
}

/// Input multiplexing scheme for the scan cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    /// 8 channels, each measured against AINCOM.
    SingleEnded,
    /// 4 channel pairs: (0,1), (2,3), (4,5), (6,7).
    Differential,
}

impl ScanMode {
    /// Number of logical channels a scan cycle covers.
    pub fn channel_count(self) -> u8 {
        match self {
            ScanMode::SingleEnded => 8,
            ScanMode::Differential => 4,
        }
    }
}

/// Driver errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<SpiE, PinE> {
    /// Transport failure, propagated from the SPI device.
    Spi(SpiE),
    /// Failure reading the DRDY line.
    Pin(PinE),
    /// DRDY did not go ready within the poll bound.
    Timeout,
    /// Channel out of range for the current scan mode.
    InvalidChannel(u8),
}

/// Reconstruct a sample from the 3 raw bytes the chip shifts out MSB-first:
/// a big-endian 24-bit two's-complement value, sign-extended to `i32`.
pub fn decode_sample(raw: [u8; 3]) -> i32 {
    let mut value = u32::from(raw[0]) << 16 | u32::from(raw[1]) << 8 | u32::from(raw[2]);
    if value & 0x80_0000 != 0 {
        value |= 0xFF00_0000;
    }
    value as i32
}

/// MUX register value for a single-ended channel against AINCOM.
fn mux_single(channel: u8) -> u8 {
    (channel << 4) | 0x08
}

/// MUX register value for a differential pair: AINp = 2*pair, AINn = 2*pair+1.
fn mux_differential(pair: u8) -> u8 {
    let positive = pair * 2;
    (positive << 4) | (positive + 1)
}

/// ADS1256 driver.
///
/// Owns the conversion configuration and the channel-scan state machine.
/// One `advance` per DRDY pulse walks the channel multiplexer and collects
/// the conversion that completed for the previously selected channel.
pub struct Ads1256<SPI, DRDY, D> {
    spi: SPI,
    drdy: DRDY,
    delay: D,
    gain: Gain,
    rate: DataRate,
    mode: ScanMode,
    channel: u8,
    samples: [i32; 8],
}

impl<SPI, DRDY, D> Ads1256<SPI, DRDY, D>
where
    SPI: SpiDevice,
    DRDY: InputPin,
    D: DelayNs,
{
    /// Creates a new driver from an SPI peripheral, the DRDY input and a
    /// delay provider. Please ensure the SPI bus is in SPI mode 1, aka
    /// (0, 1), at 1.92 MHz or less.
    ///
    /// Gain and data rate fields start at the chip's power-on defaults;
    /// call [`Self::configure`] before scanning.
    pub fn new(spi: SPI, drdy: DRDY, delay: D) -> Self {
        Self {
            spi,
            drdy,
            delay,
            gain: Gain::Gain1,
            rate: DataRate::Sps30000,
            mode: ScanMode::SingleEnded,
            channel: 0,
            samples: [0; 8],
        }
    }

    /// Currently configured gain.
    pub fn gain(&self) -> Gain {
        self.gain
    }

    /// Currently configured data rate.
    pub fn data_rate(&self) -> DataRate {
        self.rate
    }

    /// Write gain and data rate to the chip.
    ///
    /// Waits for DRDY, then writes STATUS (MSB-first output, auto-calibration
    /// off, input buffer off), MUX (AIN0 against AINCOM), ADCON (clock out
    /// and sensor-detect off, PGA bits) and DRATE in a single chip-select
    /// session, then blocks for the settle time the chip requires.
    pub fn configure(
        &mut self,
        gain: Gain,
        rate: DataRate,
    ) -> Result<(), Error<SPI::Error, DRDY::Error>> {
        self.wait_ready()?;
        let frame = [
            cmd::WREG | Register::Status as u8,
            0x03, // register count - 1: STATUS through DRATE
            0x00,
            mux_single(0),
            gain as u8,
            rate as u8,
        ];
        self.spi.write(&frame).map_err(Error::Spi)?;
        self.delay.delay_us(CONFIG_SETTLE_US);
        self.gain = gain;
        self.rate = rate;
        Ok(())
    }

    /// Read the factory chip identification (expected [`CHIP_ID`]).
    pub fn chip_id(&mut self) -> Result<u8, Error<SPI::Error, DRDY::Error>> {
        self.wait_ready()?;
        Ok(self.read_register(Register::Status)? >> 4)
    }

    /// Run offset and gain self-calibration and wait for it to finish.
    pub fn self_calibrate(&mut self) -> Result<(), Error<SPI::Error, DRDY::Error>> {
        self.command(cmd::SELFCAL)?;
        self.wait_ready()
    }

    /// Reset the chip to its power-up register values.
    pub fn reset(&mut self) -> Result<(), Error<SPI::Error, DRDY::Error>> {
        self.command(cmd::RESET)?;
        self.wait_ready()
    }

    /// Write a single register.
    pub fn write_register(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), Error<SPI::Error, DRDY::Error>> {
        self.spi
            .write(&[cmd::WREG | register as u8, 0x00, value])
            .map_err(Error::Spi)
    }

    /// Read a single register.
    pub fn read_register(
        &mut self,
        register: Register,
    ) -> Result<u8, Error<SPI::Error, DRDY::Error>> {
        let mut value = [0u8; 1];
        self.spi
            .transaction(&mut [
                Operation::Write(&[cmd::RREG | register as u8, 0x00]),
                Operation::DelayNs(DATA_DELAY_US * 1_000),
                Operation::Read(&mut value),
            ])
            .map_err(Error::Spi)?;
        Ok(value[0])
    }

    /// Read one 24-bit conversion result from the data register.
    pub fn read_data(&mut self) -> Result<i32, Error<SPI::Error, DRDY::Error>> {
        let mut raw = [0u8; 3];
        self.spi
            .transaction(&mut [
                Operation::Write(&[cmd::RDATA]),
                Operation::DelayNs(DATA_DELAY_US * 1_000),
                Operation::Read(&mut raw),
            ])
            .map_err(Error::Spi)?;
        Ok(decode_sample(raw))
    }

    /// Restart the scan cycle: channel index back to 0, stored samples
    /// zeroed, mode applied.
    pub fn start_scan(&mut self, mode: ScanMode) {
        self.mode = mode;
        self.channel = 0;
        self.samples = [0; 8];
    }

    /// Index of the channel the scan will select next. Reads back 0 right
    /// after a cycle completes.
    pub fn current_channel(&self) -> u8 {
        self.channel
    }

    /// Most recent completed conversion for `channel` under the current
    /// scan mode. Holds zero until the first cycle has covered the channel.
    pub fn sample(&self, channel: u8) -> Result<i32, Error<SPI::Error, DRDY::Error>> {
        if channel >= self.mode.channel_count() {
            return Err(Error::InvalidChannel(channel));
        }
        Ok(self.samples[channel as usize])
    }

    /// Perform one scan step if DRDY signals a pending result.
    ///
    /// Non-blocking poll; returns whether a step was taken. Call from the
    /// host loop once per DRDY pulse.
    pub fn scan_if_ready(&mut self) -> Result<bool, Error<SPI::Error, DRDY::Error>> {
        if !self.drdy.is_low().map_err(Error::Pin)? {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    /// One scan step: select the next input, SYNC, WAKEUP, then collect the
    /// conversion result and wrap-advance the channel index.
    ///
    /// The result collected here started converting before this step's mux
    /// change took effect, so it is stored for the previously selected
    /// channel (index 0 stores into the last slot).
    pub fn advance(&mut self) -> Result<(), Error<SPI::Error, DRDY::Error>> {
        let count = self.mode.channel_count();
        let mux = match self.mode {
            ScanMode::SingleEnded => mux_single(self.channel),
            ScanMode::Differential => mux_differential(self.channel),
        };
        self.write_register(Register::Mux, mux)?;
        self.delay.delay_us(MUX_SETTLE_US);

        self.command(cmd::SYNC)?;
        self.delay.delay_us(SYNC_SETTLE_US);

        self.command(cmd::WAKEUP)?;
        self.delay.delay_us(WAKEUP_SETTLE_US);

        let slot = if self.channel == 0 {
            count - 1
        } else {
            self.channel - 1
        };
        self.samples[slot as usize] = self.read_data()?;

        self.channel = (self.channel + 1) % count;
        Ok(())
    }

    /// Send a single-byte command in its own chip-select session.
    fn command(&mut self, opcode: u8) -> Result<(), Error<SPI::Error, DRDY::Error>> {
        self.spi.write(&[opcode]).map_err(Error::Spi)
    }

    /// Block until DRDY reads ready, polling at [`READY_POLL_US`] intervals
    /// up to [`READY_TIMEOUT_US`] of elapsed delay.
    fn wait_ready(&mut self) -> Result<(), Error<SPI::Error, DRDY::Error>> {
        let mut waited = 0;
        while waited < READY_TIMEOUT_US {
            if self.drdy.is_low().map_err(Error::Pin)? {
                return Ok(());
            }
            self.delay.delay_us(READY_POLL_US);
            waited += READY_POLL_US;
        }
        Err(Error::Timeout)
    }
}
