/*
 *  scheduler.rs
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
//! The single cooperative task driving the clock. Per tick, in this
//! order: drain control events, sample brightness on its cadence,
//! evaluate the redraw decision, render, push. The order matters: a
//! freshly-changed intensity and a freshly-rendered frame must never be
//! observably out of sync for more than one tick.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::watch;

use crate::brightness::{BrightnessController, CADENCE_MS};
use crate::clock_font::FontBook;
use crate::compositor::{Compositor, RenderRequest};
use crate::config::{ClockSettings, Config};
use crate::control::{ControlEvent, ControlReceiver};
use crate::display::{selftest, DisplayError, MatrixDriver, MatrixFrame};
use crate::fontstore;
use crate::sensor::LightSensor;
use crate::timekeeper::{self, TimeKeeper};

pub const REDRAW_TICK_MS: u64 = 20;
const FAST_BLINK_MS: u64 = 500;
const IDLE_SLEEP: Duration = Duration::from_millis(2);

/// What an external monitoring surface sees of the brightness loop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MonitorSnapshot {
    pub raw: u32,
    pub average: f64,
    pub target: f64,
    pub applied: Option<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct Scheduler {
    driver: Box<dyn MatrixDriver>,
    sensor: Box<dyn LightSensor>,
    events: ControlReceiver,
    settings: ClockSettings,
    fonts: FontBook,
    timekeeper: TimeKeeper,
    brightness: BrightnessController,
    compositor: Compositor,
    frame: MatrixFrame,
    font_file: Option<PathBuf>,
    monitor_tx: watch::Sender<MonitorSnapshot>,
    started: Instant,
    next_brightness_ms: u64,
    next_redraw_ms: u64,
    /// Level-triggered: re-evaluate the frame now instead of waiting for
    /// the redraw tick. Setting it twice before consumption is the same
    /// as setting it once.
    force_sync: bool,
    /// A pending redraw that must not be skipped, even when the blink
    /// state is unchanged.
    render_override: bool,
    /// The next render must not animate (settings changed, font swapped).
    suppress_animation: bool,
    last_separator: Option<bool>,
    rendered_once: bool,
}

impl Scheduler {
    pub fn new(
        driver: Box<dyn MatrixDriver>,
        sensor: Box<dyn LightSensor>,
        events: ControlReceiver,
        config: &Config,
        fonts: FontBook,
    ) -> Self {
        let (monitor_tx, _) = watch::channel(MonitorSnapshot::default());
        Self {
            driver,
            sensor,
            events,
            settings: config.clock.clone(),
            fonts,
            timekeeper: TimeKeeper::new(),
            brightness: BrightnessController::new(),
            compositor: Compositor::new(),
            frame: MatrixFrame::new(),
            font_file: config.font_file.clone(),
            monitor_tx,
            started: Instant::now(),
            next_brightness_ms: 0,
            next_redraw_ms: 0,
            force_sync: false,
            render_override: false,
            suppress_animation: false,
            last_separator: None,
            rendered_once: false,
        }
    }

    /// Handle for the external layer to observe the brightness loop.
    pub fn monitor_watch(&self) -> watch::Receiver<MonitorSnapshot> {
        self.monitor_tx.subscribe()
    }

    fn mono_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub async fn run(mut self) -> Result<(), DisplayError> {
        self.driver.init()?;
        info!("clock loop starting on '{}' display", self.driver.name());
        loop {
            let now = self.mono_ms();
            if self.tick(now)? == Flow::Stop {
                break;
            }
            tokio::time::sleep(IDLE_SLEEP).await;
        }
        self.driver.clear()?;
        info!("clock loop stopped");
        Ok(())
    }

    /// One scheduler iteration, driven by a monotonic millisecond clock.
    /// Split from `run` so tests can advance simulated time directly.
    pub fn tick(&mut self, now: u64) -> Result<Flow, DisplayError> {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if self.handle_event(event, now)? == Flow::Stop {
                        return Ok(Flow::Stop);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("control channel closed; shutting down");
                    return Ok(Flow::Stop);
                }
            }
        }

        if now >= self.next_brightness_ms {
            self.next_brightness_ms = now + CADENCE_MS;
            let raw = self.sensor.read_raw();
            if let Some(level) = self.brightness.sample(raw, &self.settings) {
                self.driver
                    .set_intensity(level.min(self.driver.max_intensity()))?;
            }
            let _ = self.monitor_tx.send(MonitorSnapshot {
                raw,
                average: self.brightness.average(),
                target: self.brightness.target(),
                applied: self.brightness.applied(),
            });
        }

        let epoch_ms = self.timekeeper.epoch_millis(now as u32);
        let separator_visible = match epoch_ms {
            Some(ms) => {
                if self.settings.slow_separator {
                    (ms / 1000) % 2 == 0
                } else {
                    ms % 1000 < FAST_BLINK_MS
                }
            }
            None => false,
        };

        let mut do_render = false;
        if !self.rendered_once {
            do_render = true;
            self.next_redraw_ms = now + REDRAW_TICK_MS;
        } else if self.force_sync {
            // re-align the redraw phase to the sub-second boundary, so
            // the blink flips exactly on it from here on
            let subsec = epoch_ms.map_or(0, |ms| ms % 1000);
            self.next_redraw_ms = now + REDRAW_TICK_MS - (subsec % REDRAW_TICK_MS);
            // unchanged blink state means the frame content is already
            // right, unless a render override is pending
            if self.last_separator != Some(separator_visible) || self.render_override {
                do_render = true;
            }
        } else if now >= self.next_redraw_ms {
            self.next_redraw_ms = now + REDRAW_TICK_MS;
            do_render = true;
        }
        self.force_sync = false;

        if do_render {
            let (hour, minute, second) = match epoch_ms {
                Some(ms) => timekeeper::format_hms(ms / 1000, self.settings.single_digit_hour),
                None => Default::default(),
            };
            let request = RenderRequest {
                hour: &hour,
                minute: &minute,
                second: &second,
                separator_visible,
                time_available: epoch_ms.is_some(),
                animate: !self.suppress_animation,
                now_ms: now,
            };
            self.compositor
                .render(&request, &self.settings, &self.fonts, &mut self.frame);
            self.driver.push_frame(&self.frame)?;
            self.last_separator = Some(separator_visible);
            self.rendered_once = true;
            self.render_override = false;
            self.suppress_animation = false;
        }

        Ok(Flow::Continue)
    }

    fn handle_event(&mut self, event: ControlEvent, now: u64) -> Result<Flow, DisplayError> {
        match event {
            ControlEvent::ApplySettings(new) => {
                if let Err(err) = new.validate(self.sensor.max_raw()) {
                    warn!("rejecting settings update: {err}");
                    return Ok(Flow::Continue);
                }
                if self.settings.needs_rerender(&new) {
                    self.force_sync = true;
                    self.render_override = true;
                    self.suppress_animation = true;
                }
                if self.settings.needs_intensity_update(&new) {
                    self.brightness.force_reapply();
                }
                self.settings = new;
            }
            ControlEvent::ForceSync => {
                self.force_sync = true;
                self.render_override = true;
            }
            ControlEvent::InjectTime { epoch_millis } => {
                self.timekeeper.set_manual(epoch_millis, now as u32);
                self.force_sync = true;
                self.render_override = true;
                self.suppress_animation = true;
            }
            ControlEvent::TimeSynced => {
                self.timekeeper.mark_synced();
                self.force_sync = true;
                self.render_override = true;
            }
            ControlEvent::SetCustomFont(font) => {
                self.fonts.set_custom(*font);
                if let Some(path) = &self.font_file {
                    if let Err(err) = fontstore::save(path, self.fonts.custom()) {
                        error!("cannot persist custom font: {err}");
                    }
                }
                self.force_sync = true;
                self.render_override = true;
                self.suppress_animation = true;
            }
            ControlEvent::RunLedTest => {
                // deliberately blocks the loop; diagnostic only
                selftest::run_led_test(self.driver.as_mut(), std::thread::sleep)?;
                self.force_sync = true;
                self.render_override = true;
                self.suppress_animation = true;
            }
            ControlEvent::RunNightTest => {
                let restore = self
                    .brightness
                    .applied()
                    .unwrap_or(self.settings.day_level);
                selftest::run_night_test(
                    self.driver.as_mut(),
                    self.settings.night_level,
                    restore,
                    std::thread::sleep,
                )?;
            }
            ControlEvent::Shutdown => {
                info!("shutdown requested");
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }
}
