/*
 *  display/traits.rs
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
use super::error::DisplayError;
use super::framebuffer::MatrixFrame;

/// The operations a matrix panel must support. The core never reads
/// pixels back from hardware; the frame is the single source of truth.
pub trait MatrixDriver: Send {
    /// Short identifier for logs and the driver factory.
    fn name(&self) -> &'static str;

    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (usize, usize);

    /// Brings the panel into a known, blank, powered-on state.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Writes the intensity register. `level` must be within
    /// `0..=max_intensity()`.
    fn set_intensity(&mut self, level: u8) -> Result<(), DisplayError>;

    /// Upper bound of the intensity range, inclusive.
    fn max_intensity(&self) -> u8 {
        15
    }

    fn push_frame(&mut self, frame: &MatrixFrame) -> Result<(), DisplayError>;

    fn clear(&mut self) -> Result<(), DisplayError>;
}
