/*
 *  display/drivers/console.rs
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
//! ASCII preview driver for development without a panel attached.
//! Redraws only when the frame content actually changes, so a terminal
//! stays readable at the 20 ms redraw cadence.

use log::info;

use crate::display::error::DisplayError;
use crate::display::framebuffer::{MatrixFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::traits::MatrixDriver;

pub struct ConsoleDriver {
    last: Option<MatrixFrame>,
    intensity: u8,
}

impl ConsoleDriver {
    pub fn new() -> Self {
        Self {
            last: None,
            intensity: 0,
        }
    }

    fn dump(&self, frame: &MatrixFrame) {
        let mut out = String::with_capacity((DISPLAY_WIDTH + 3) * (DISPLAY_HEIGHT + 2));
        out.push('+');
        out.push_str(&"-".repeat(DISPLAY_WIDTH));
        out.push_str("+\n");
        for row in 0..DISPLAY_HEIGHT {
            out.push('|');
            for col in 0..DISPLAY_WIDTH {
                out.push(if frame.point(row, col) { '#' } else { ' ' });
            }
            out.push_str("|\n");
        }
        out.push('+');
        out.push_str(&"-".repeat(DISPLAY_WIDTH));
        out.push('+');
        println!("{}  [intensity {}]", out, self.intensity);
    }
}

impl Default for ConsoleDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixDriver for ConsoleDriver {
    fn name(&self) -> &'static str {
        "console"
    }

    fn dimensions(&self) -> (usize, usize) {
        (DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!("console display ready ({}x{})", DISPLAY_WIDTH, DISPLAY_HEIGHT);
        self.last = None;
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), DisplayError> {
        if level > self.max_intensity() {
            return Err(DisplayError::IntensityRange {
                level,
                max: self.max_intensity(),
            });
        }
        self.intensity = level;
        Ok(())
    }

    fn push_frame(&mut self, frame: &MatrixFrame) -> Result<(), DisplayError> {
        if self.last.as_ref() != Some(frame) {
            self.dump(frame);
            self.last = Some(*frame);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.push_frame(&MatrixFrame::new())
    }
}
