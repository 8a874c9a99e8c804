/*
 *  display/mod.rs
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
//! Display abstraction: the 32x8 frame, the driver trait, the concrete
//! drivers, and the diagnostic self-test sequences.

pub mod drivers;
pub mod error;
pub mod factory;
pub mod framebuffer;
pub mod selftest;
pub mod traits;

pub use error::DisplayError;
pub use framebuffer::{MatrixFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use traits::MatrixDriver;
