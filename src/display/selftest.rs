/*
 *  display/selftest.rs
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
//! Diagnostic light sequences. These deliberately block the render loop
//! for their duration; they are reachable only through control events,
//! never from the steady-state tick. The pause hook is injected so tests
//! can run the sequences instantly.

use std::time::Duration;

use log::info;

use crate::display::error::DisplayError;
use crate::display::framebuffer::{MatrixFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::traits::MatrixDriver;

const ROW_STEP: Duration = Duration::from_millis(400);
const COLUMN_STEP: Duration = Duration::from_millis(200);
const PATTERN_HOLD: Duration = Duration::from_millis(1500);
const ALL_ON_HOLD: Duration = Duration::from_millis(1800);
const NIGHT_PREVIEW: Duration = Duration::from_secs(6);

/// Walks every pixel group: one row at a time, one column at a time,
/// two diagonal lattices, a 4x4 grid, then everything on at once.
pub fn run_led_test(
    driver: &mut dyn MatrixDriver,
    mut pause: impl FnMut(Duration),
) -> Result<(), DisplayError> {
    info!("running LED self-test");
    let mut frame = MatrixFrame::new();

    for row in 0..DISPLAY_HEIGHT {
        frame.clear();
        for col in 0..DISPLAY_WIDTH {
            frame.set_point(row, col, true);
        }
        driver.push_frame(&frame)?;
        pause(ROW_STEP);
    }

    for col in 0..DISPLAY_WIDTH {
        frame.clear();
        for row in 0..DISPLAY_HEIGHT {
            frame.set_point(row, col, true);
        }
        driver.push_frame(&frame)?;
        pause(COLUMN_STEP);
    }

    for modulus in [2usize, 3] {
        fill(&mut frame, |row, col| col % modulus == row % modulus);
        driver.push_frame(&frame)?;
        pause(PATTERN_HOLD);
    }

    fill(&mut frame, |row, col| row % 4 == 0 || col % 4 == 0);
    driver.push_frame(&frame)?;
    pause(PATTERN_HOLD);

    fill(&mut frame, |_, _| true);
    driver.push_frame(&frame)?;
    pause(ALL_ON_HOLD);

    driver.clear()
}

/// Drops the panel to the night brightness level for a few seconds so
/// the night setting can be judged by eye, then restores the previous
/// level.
pub fn run_night_test(
    driver: &mut dyn MatrixDriver,
    night_level: u8,
    restore_level: u8,
    mut pause: impl FnMut(Duration),
) -> Result<(), DisplayError> {
    info!("previewing night brightness level {night_level}");
    driver.set_intensity(night_level)?;
    pause(NIGHT_PREVIEW);
    driver.set_intensity(restore_level)
}

fn fill(frame: &mut MatrixFrame, pattern: impl Fn(usize, usize) -> bool) {
    for row in 0..DISPLAY_HEIGHT {
        for col in 0..DISPLAY_WIDTH {
            frame.set_point(row, col, pattern(row, col));
        }
    }
}
