//! Drivers for the High-Precision AD/DA Raspberry Pi hat via the
//! `embedded-hal` ecosystem: a TI ADS1256 24-bit delta-sigma ADC and a
//! DAC8552 dual 16-bit DAC sharing one SPI bus behind separate chip-select
//! lines.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

#[cfg(feature = "ads1256")]
pub mod ads1256;

#[cfg(feature = "dac8552")]
pub mod dac8552;
