/*
 *  tixel-driver-max7219 - MAX7219 cascade over SPI
 *
 *  Tixel - time, in pixels
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
//! Driver for a daisy chain of MAX7219 LED controllers, each wired to one
//! 8x8 matrix module. Every SPI transaction carries one register/data pair
//! per device; pairs are shifted out furthest-device-first so that pair 0
//! of the caller's buffer lands on device 0 (the module nearest the SPI
//! input).
//!
//! The chip addresses its matrix through "digit" registers DIG0..DIG7.
//! On the common FC-16 style modules DIGn maps to matrix row n, with data
//! bit 7 on the leftmost column.

use embedded_hal::spi::SpiDevice;
use log::debug;
use thiserror::Error;

/// Upper bound on chain length; sized for the 16-byte transaction buffer.
pub const MAX_DEVICES: usize = 8;

/// Hardware intensity range is a 4-bit duty cycle.
pub const MAX_INTENSITY: u8 = 0x0F;

// Register map (MAX7219 datasheet, table 2).
const REG_DIGIT0: u8 = 0x01;
const REG_DECODE_MODE: u8 = 0x09;
const REG_INTENSITY: u8 = 0x0A;
const REG_SCAN_LIMIT: u8 = 0x0B;
const REG_SHUTDOWN: u8 = 0x0C;
const REG_DISPLAY_TEST: u8 = 0x0F;

#[derive(Debug, Error)]
pub enum Error<E: core::fmt::Debug> {
    #[error("SPI transfer failed: {0:?}")]
    Spi(E),
    #[error("unsupported device count {0} (1..={MAX_DEVICES})")]
    DeviceCount(usize),
    #[error("row data length {got} does not match device count {want}")]
    RowLength { got: usize, want: usize },
}

/// A chain of `devices` MAX7219 controllers sharing one chip select.
pub struct Max7219<SPI> {
    spi: SPI,
    devices: usize,
}

impl<SPI: SpiDevice<u8>> Max7219<SPI> {
    pub fn new(spi: SPI, devices: usize) -> Result<Self, Error<SPI::Error>> {
        if devices == 0 || devices > MAX_DEVICES {
            return Err(Error::DeviceCount(devices));
        }
        Ok(Self { spi, devices })
    }

    pub fn devices(&self) -> usize {
        self.devices
    }

    /// Brings the whole chain out of shutdown into a known state:
    /// no BCD decode, all eight digits scanned, matrix cleared,
    /// display-test off.
    pub fn init(&mut self) -> Result<(), Error<SPI::Error>> {
        debug!("initializing {} MAX7219 device(s)", self.devices);
        self.broadcast(REG_DISPLAY_TEST, 0x00)?;
        self.broadcast(REG_SCAN_LIMIT, 0x07)?;
        self.broadcast(REG_DECODE_MODE, 0x00)?;
        self.clear()?;
        self.broadcast(REG_SHUTDOWN, 0x01)?;
        Ok(())
    }

    /// Sets the 4-bit intensity duty cycle on every device.
    pub fn set_intensity(&mut self, level: u8) -> Result<(), Error<SPI::Error>> {
        self.broadcast(REG_INTENSITY, level.min(MAX_INTENSITY))
    }

    /// Writes one matrix row across the chain. `data[d]` is the row byte
    /// for device `d`, bit 7 leftmost.
    pub fn write_row(&mut self, row: u8, data: &[u8]) -> Result<(), Error<SPI::Error>> {
        if data.len() != self.devices {
            return Err(Error::RowLength {
                got: data.len(),
                want: self.devices,
            });
        }
        let reg = REG_DIGIT0 + (row & 0x07);
        let mut buf = [0u8; MAX_DEVICES * 2];
        for (d, byte) in data.iter().enumerate() {
            // Furthest device receives its pair first.
            let slot = self.devices - 1 - d;
            buf[slot * 2] = reg;
            buf[slot * 2 + 1] = *byte;
        }
        self.spi
            .write(&buf[..self.devices * 2])
            .map_err(Error::Spi)
    }

    /// Blanks all eight rows on every device.
    pub fn clear(&mut self) -> Result<(), Error<SPI::Error>> {
        for row in 0..8 {
            self.broadcast(REG_DIGIT0 + row, 0x00)?;
        }
        Ok(())
    }

    pub fn power_on(&mut self) -> Result<(), Error<SPI::Error>> {
        self.broadcast(REG_SHUTDOWN, 0x01)
    }

    pub fn power_off(&mut self) -> Result<(), Error<SPI::Error>> {
        self.broadcast(REG_SHUTDOWN, 0x00)
    }

    /// Lights every segment regardless of register contents; a raw
    /// hardware check, distinct from the pattern self-tests upstream.
    pub fn display_test(&mut self, on: bool) -> Result<(), Error<SPI::Error>> {
        self.broadcast(REG_DISPLAY_TEST, on as u8)
    }

    fn broadcast(&mut self, reg: u8, value: u8) -> Result<(), Error<SPI::Error>> {
        let mut buf = [0u8; MAX_DEVICES * 2];
        for d in 0..self.devices {
            buf[d * 2] = reg;
            buf[d * 2 + 1] = value;
        }
        self.spi
            .write(&buf[..self.devices * 2])
            .map_err(Error::Spi)
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{ErrorType, Operation};

    /// Records every byte written through the SPI device.
    #[derive(Default)]
    struct SpiLog {
        writes: Vec<Vec<u8>>,
    }

    impl ErrorType for SpiLog {
        type Error = core::convert::Infallible;
    }

    impl SpiDevice<u8> for SpiLog {
        fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push(bytes.to_vec());
                }
            }
            Ok(())
        }
    }

    #[test]
    fn rejects_zero_devices() {
        assert!(matches!(
            Max7219::new(SpiLog::default(), 0),
            Err(Error::DeviceCount(0))
        ));
    }

    #[test]
    fn write_row_orders_furthest_device_first() {
        let mut chain = Max7219::new(SpiLog::default(), 4).unwrap();
        chain.write_row(2, &[0xA0, 0xB0, 0xC0, 0xD0]).unwrap();
        let spi = chain.release();
        assert_eq!(
            spi.writes,
            vec![vec![
                REG_DIGIT0 + 2, 0xD0,
                REG_DIGIT0 + 2, 0xC0,
                REG_DIGIT0 + 2, 0xB0,
                REG_DIGIT0 + 2, 0xA0,
            ]]
        );
    }

    #[test]
    fn intensity_is_clamped_and_broadcast() {
        let mut chain = Max7219::new(SpiLog::default(), 2).unwrap();
        chain.set_intensity(0x20).unwrap();
        let spi = chain.release();
        assert_eq!(spi.writes, vec![vec![REG_INTENSITY, 0x0F, REG_INTENSITY, 0x0F]]);
    }

    #[test]
    fn row_length_mismatch_is_an_error() {
        let mut chain = Max7219::new(SpiLog::default(), 4).unwrap();
        let err = chain.write_row(0, &[0x00; 3]).unwrap_err();
        assert!(matches!(err, Error::RowLength { got: 3, want: 4 }));
    }

    #[test]
    fn init_sequences_setup_registers() {
        let mut chain = Max7219::new(SpiLog::default(), 1).unwrap();
        chain.init().unwrap();
        let spi = chain.release();
        let first: Vec<u8> = spi.writes.first().cloned().unwrap_or_default();
        assert_eq!(first, vec![REG_DISPLAY_TEST, 0x00]);
        let last: Vec<u8> = spi.writes.last().cloned().unwrap_or_default();
        assert_eq!(last, vec![REG_SHUTDOWN, 0x01]);
    }
}
