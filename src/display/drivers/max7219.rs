/*
 *  display/drivers/max7219.rs
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
//! Hardware path: adapts the cascaded MAX7219 chain crate to the
//! `MatrixDriver` trait over a Linux spidev device.

use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;
use log::info;
use tixel_driver_max7219::{Max7219, MAX_DEVICES, MAX_INTENSITY};

use crate::display::error::DisplayError;
use crate::display::framebuffer::{MatrixFrame, DISPLAY_HEIGHT};
use crate::display::traits::MatrixDriver;

const SPI_SPEED_HZ: u32 = 10_000_000;

pub struct Max7219Driver {
    chain: Max7219<SpidevDevice>,
    devices: usize,
}

impl Max7219Driver {
    pub fn open(spidev_path: &str, devices: usize) -> Result<Self, DisplayError> {
        let mut dev = SpidevDevice::open(spidev_path)
            .map_err(|e| DisplayError::Io(format!("open {spidev_path}: {e}")))?;
        dev.0
            .configure(
                &SpidevOptions::new()
                    .bits_per_word(8)
                    .max_speed_hz(SPI_SPEED_HZ)
                    .mode(SpiModeFlags::SPI_MODE_0)
                    .build(),
            )
            .map_err(|e| DisplayError::Io(format!("configure {spidev_path}: {e}")))?;
        let chain = Max7219::new(dev, devices)
            .map_err(|e| DisplayError::Io(e.to_string()))?;
        info!("MAX7219 chain on {spidev_path}: {devices} device(s)");
        Ok(Self { chain, devices })
    }
}

impl MatrixDriver for Max7219Driver {
    fn name(&self) -> &'static str {
        "max7219"
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.devices * 8, DISPLAY_HEIGHT)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.chain
            .init()
            .map_err(|e| DisplayError::Io(e.to_string()))
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), DisplayError> {
        if level > self.max_intensity() {
            return Err(DisplayError::IntensityRange {
                level,
                max: self.max_intensity(),
            });
        }
        self.chain
            .set_intensity(level)
            .map_err(|e| DisplayError::Io(e.to_string()))
    }

    fn max_intensity(&self) -> u8 {
        MAX_INTENSITY
    }

    fn push_frame(&mut self, frame: &MatrixFrame) -> Result<(), DisplayError> {
        let mut bytes = [0u8; MAX_DEVICES];
        for row in 0..DISPLAY_HEIGHT {
            for device in 0..self.devices {
                bytes[device] = frame.device_row(device, row);
            }
            self.chain
                .write_row(row as u8, &bytes[..self.devices])
                .map_err(|e| DisplayError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.chain
            .clear()
            .map_err(|e| DisplayError::Io(e.to_string()))
    }
}
