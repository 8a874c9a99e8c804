/*
 *  display/framebuffer.rs
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
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::{Dimensions, DrawTarget, Pixel, Point, Size},
    primitives::Rectangle,
};

pub const DISPLAY_WIDTH: usize = 32;
pub const DISPLAY_HEIGHT: usize = 8;

/// One 32x8 monochrome frame. Each row is a bit field with bit `col`
/// holding the pixel at that column; column 0 is the leftmost pixel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MatrixFrame {
    rows: [u32; DISPLAY_HEIGHT],
}

impl MatrixFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.rows = [0; DISPLAY_HEIGHT];
    }

    pub fn set_point(&mut self, row: usize, col: usize, on: bool) {
        if row >= DISPLAY_HEIGHT || col >= DISPLAY_WIDTH {
            return;
        }
        if on {
            self.rows[row] |= 1 << col;
        } else {
            self.rows[row] &= !(1 << col);
        }
    }

    pub fn point(&self, row: usize, col: usize) -> bool {
        if row >= DISPLAY_HEIGHT || col >= DISPLAY_WIDTH {
            return false;
        }
        (self.rows[row] >> col) & 1 != 0
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|r| *r == 0)
    }

    /// Packs one row of one 8-column device into the MAX7219 digit-register
    /// byte layout: bit 7 is the device's leftmost column.
    pub fn device_row(&self, device: usize, row: usize) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.point(row, device * 8 + i) {
                byte |= 1 << (7 - i);
            }
        }
        byte
    }
}

impl Dimensions for MatrixFrame {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(
            Point::zero(),
            Size::new(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32),
        )
    }
}

impl DrawTarget for MatrixFrame {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_point(point.y as usize, point.x as usize, color.is_on());
            }
        }
        Ok(())
    }
}
