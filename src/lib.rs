/*
 *  lib.rs
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
//! Core of a WiFi-synchronized LED matrix clock: glyph compositor with
//! animated digit transitions, ambient-brightness control, a dual-source
//! time adapter, and the cooperative scheduler loop that ties them to a
//! 32x8 MAX7219 panel (or a console/mock stand-in).

pub mod brightness;
pub mod clock_font;
pub mod compositor;
pub mod config;
pub mod control;
pub mod display;
pub mod fontstore;
pub mod scheduler;
pub mod sensor;
pub mod timekeeper;
