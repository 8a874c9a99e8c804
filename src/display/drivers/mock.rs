/*
 *  display/drivers/mock.rs
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
//! Driver that records every operation instead of touching hardware.
//! Tests clone the shared state handle and inspect it after the fact.

use std::sync::{Arc, Mutex};

use log::debug;

use crate::display::error::DisplayError;
use crate::display::framebuffer::{MatrixFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::traits::MatrixDriver;

#[derive(Default)]
pub struct MockState {
    pub init_count: usize,
    pub clear_count: usize,
    pub push_count: usize,
    pub intensity_writes: Vec<u8>,
    pub last_frame: Option<MatrixFrame>,
    /// When set, every I/O operation fails.
    pub fail_io: bool,
}

pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<MockState>> {
        Arc::clone(&self.state)
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut MockState) -> T,
    ) -> Result<T, DisplayError> {
        let mut st = self
            .state
            .lock()
            .map_err(|_| DisplayError::Io("mock state poisoned".into()))?;
        if st.fail_io {
            return Err(DisplayError::Io("simulated failure".into()));
        }
        Ok(f(&mut st))
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixDriver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn dimensions(&self) -> (usize, usize) {
        (DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        debug!("mock display init");
        self.with_state(|st| st.init_count += 1)
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), DisplayError> {
        if level > self.max_intensity() {
            return Err(DisplayError::IntensityRange {
                level,
                max: self.max_intensity(),
            });
        }
        self.with_state(|st| st.intensity_writes.push(level))
    }

    fn push_frame(&mut self, frame: &MatrixFrame) -> Result<(), DisplayError> {
        self.with_state(|st| {
            st.push_count += 1;
            st.last_frame = Some(*frame);
        })
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.with_state(|st| {
            st.clear_count += 1;
            st.last_frame = Some(MatrixFrame::new());
        })
    }
}
