/*
 *  display/factory.rs
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
use log::info;

use crate::config::{Config, DriverKind};
use crate::display::drivers::{ConsoleDriver, MockDriver};
use crate::display::error::DisplayError;
use crate::display::traits::MatrixDriver;

/// Builds the display driver selected by the configuration.
pub fn build_driver(config: &Config) -> Result<Box<dyn MatrixDriver>, DisplayError> {
    let driver: Box<dyn MatrixDriver> = match config.driver {
        DriverKind::Mock => Box::new(MockDriver::new()),
        DriverKind::Console => Box::new(ConsoleDriver::new()),
        #[cfg(feature = "hardware")]
        DriverKind::Max7219 => Box::new(
            crate::display::drivers::Max7219Driver::open(&config.spidev, config.devices)?,
        ),
        #[cfg(not(feature = "hardware"))]
        DriverKind::Max7219 => {
            return Err(DisplayError::DriverUnavailable("max7219"));
        }
    };
    info!("display driver: {}", driver.name());
    Ok(driver)
}
