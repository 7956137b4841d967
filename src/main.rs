mod cli;

#[cfg(feature = "raspberry_pi")]
fn main() -> Result<(), anyhow::Error> {
    use std::cell::RefCell;

    use adda::ads1256::{Ads1256, CHIP_ID};
    use adda::dac8552::{voltage_to_code, Channel, Dac8552};
    use anyhow::anyhow;
    use embedded_hal_bus::spi::RefCellDevice;
    use rppal::gpio::Gpio;
    use rppal::hal::Delay;
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

    // BCM pin numbers for the hat: chip-selects and the ADC's DRDY line.
    const ADC_CS: u8 = 22;
    const DAC_CS: u8 = 23;
    const DRDY: u8 = 17;

    // Both converters run from the board's 5 V reference.
    const VREF: f64 = 5.0;

    env_logger::init();
    let args = cli::parse(std::env::args().skip(1))?;

    let gpio = Gpio::new()?;
    let spi = RefCell::new(Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_000_000, Mode::Mode1)?);

    let adc_cs = gpio.get(ADC_CS)?.into_output_high();
    let dac_cs = gpio.get(DAC_CS)?.into_output_high();
    let drdy = gpio.get(DRDY)?.into_input_pullup();

    let mut adc = Ads1256::new(
        RefCellDevice::new(&spi, adc_cs, Delay::new()),
        drdy,
        Delay::new(),
    );
    let mut dac = Dac8552::new(RefCellDevice::new(&spi, dac_cs, Delay::new()));

    let id = adc.chip_id().map_err(|e| anyhow!("read chip id: {e:?}"))?;
    if id != CHIP_ID {
        log::warn!("unexpected ADS1256 chip id {id}, expected {CHIP_ID}");
    }

    adc.configure(args.gain, args.rate)
        .map_err(|e| anyhow!("configure: {e:?}"))?;
    adc.start_scan(args.mode);
    log::info!(
        "scanning {:?}, gain {}, rate {:?}",
        args.mode,
        args.gain.factor(),
        args.rate
    );

    let gain = f64::from(args.gain.factor());
    let channels = args.mode.channel_count();

    loop {
        if !adc.scan_if_ready().map_err(|e| anyhow!("scan: {e:?}"))? {
            continue;
        }
        if adc.current_channel() != 0 {
            // Cycle still in progress.
            continue;
        }

        let mut echo = 0.0;
        for channel in 0..channels {
            let raw = adc.sample(channel).map_err(|e| anyhow!("sample: {e:?}"))?;
            let volts = f64::from(raw) * VREF / 8_388_607.0 / gain;
            if channel == 0 {
                echo = volts;
            }
            print!("ch{channel}: {volts:9.6} V  ");
        }
        println!();

        // Echo channel 0 onto the first DAC output.
        dac.write(Channel::A, voltage_to_code(VREF as f32, echo as f32))
            .map_err(|e| anyhow!("write dac: {e:?}"))?;
    }
}

#[cfg(not(feature = "raspberry_pi"))]
fn main() -> Result<(), anyhow::Error> {
    let _ = cli::parse(std::env::args().skip(1))?;
    anyhow::bail!("piadda was built without the `raspberry_pi` feature; no hardware to drive")
}
