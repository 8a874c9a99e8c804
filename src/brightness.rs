/*
 *  brightness.rs
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
//! Ambient-brightness control: a rolling average over the raw sensor,
//! an eased day/night mapping to a fractional intensity target, and a
//! hysteresis gate that turns the fast analog signal into a slow,
//! flicker-free integer step function.

use log::debug;

use crate::config::ClockSettings;

/// The controller is sampled on this fixed cadence.
pub const CADENCE_MS: u64 = 100;

const WINDOW: f64 = 15.0;
/// Fraction of a level the target must pass the rounding boundary by.
const HYSTERESIS_MARGIN: f64 = 0.10;
/// A sub-margin difference applies anyway after this long.
const SUSTAIN_MS: u32 = 10_000;

pub struct BrightnessController {
    average: Option<f64>,
    target: f64,
    applied: Option<u8>,
    sustained_ms: u32,
    last_raw: u32,
}

impl BrightnessController {
    pub fn new() -> Self {
        Self {
            average: None,
            target: 0.0,
            applied: None,
            sustained_ms: 0,
            last_raw: 0,
        }
    }

    /// Feeds one raw sensor reading. Returns the intensity level to push
    /// to the driver, if the hysteresis gate lets one through.
    pub fn sample(&mut self, raw: u32, settings: &ClockSettings) -> Option<u8> {
        self.last_raw = raw;
        let average = match self.average {
            None => raw as f64,
            Some(avg) => (avg * (WINDOW - 1.0) + raw as f64) / WINDOW,
        };
        self.average = Some(average);
        self.target = map_level(average, settings);

        let (push, sustained_ms) = apply_decision(self.target, self.applied, self.sustained_ms);
        self.sustained_ms = sustained_ms;
        if let Some(level) = push {
            debug!(
                "intensity {} -> {} (raw {}, avg {:.1}, target {:.2})",
                self.applied.map_or_else(|| "-".into(), |l| l.to_string()),
                level,
                raw,
                average,
                self.target
            );
            self.applied = Some(level);
        }
        push
    }

    /// Forgets the applied level so the next sample pushes
    /// unconditionally (used after level settings change or a self-test
    /// overrode the register).
    pub fn force_reapply(&mut self) {
        self.applied = None;
        self.sustained_ms = 0;
    }

    pub fn last_raw(&self) -> u32 {
        self.last_raw
    }

    pub fn average(&self) -> f64 {
        self.average.unwrap_or(0.0)
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn applied(&self) -> Option<u8> {
        self.applied
    }
}

impl Default for BrightnessController {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps the averaged reading to a fractional level: flat night below the
/// night threshold, flat day above the day threshold, eased in between.
fn map_level(average: f64, settings: &ClockSettings) -> f64 {
    let night = settings.night_level as f64;
    let day = settings.day_level as f64;
    let night_thr = settings.night_threshold as f64;
    let day_thr = settings.day_threshold as f64;

    if average <= night_thr {
        night
    } else if average >= day_thr {
        day
    } else {
        let normalized = (average - night_thr) / (day_thr - night_thr);
        let eased = 1.0 - (1.0 - normalized) * (1.0 - normalized);
        night + (day - night) * eased
    }
}

/// The pure application decision: `(level to push, new sustain
/// accumulator)`. The first application always pushes; after that a
/// rounded change must clear the rounding boundary by more than the
/// margin, or persist for the full sustain window, accumulated in
/// cadence-sized increments.
fn apply_decision(target: f64, applied: Option<u8>, sustained_ms: u32) -> (Option<u8>, u32) {
    let rounded = target.round() as u8;
    let Some(last) = applied else {
        return (Some(rounded), 0);
    };
    if rounded == last {
        return (None, 0);
    }
    let boundary = if target > last as f64 {
        target - (last as f64 + 0.5)
    } else {
        (last as f64 - 0.5) - target
    };
    if boundary > HYSTERESIS_MARGIN {
        (Some(rounded), 0)
    } else {
        let sustained_ms = sustained_ms + CADENCE_MS as u32;
        if sustained_ms >= SUSTAIN_MS {
            (Some(rounded), 0)
        } else {
            (None, sustained_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ClockSettings {
        ClockSettings::default() // night 1 @ <=10, day 9 @ >=350
    }

    #[test]
    fn first_sample_seeds_the_average_and_pushes() {
        let mut ctl = BrightnessController::new();
        let level = ctl.sample(400, &settings());
        assert_eq!(level, Some(9));
        assert_eq!(ctl.average(), 400.0);
    }

    #[test]
    fn average_converges_to_a_constant_input() {
        let mut ctl = BrightnessController::new();
        ctl.sample(0, &settings());
        for _ in 0..500 {
            ctl.sample(200, &settings());
        }
        assert!((ctl.average() - 200.0).abs() < 0.01);
    }

    #[test]
    fn flat_regions_hit_the_levels_exactly() {
        let s = settings();
        let mut ctl = BrightnessController::new();
        ctl.sample(5, &s);
        assert_eq!(ctl.target(), 1.0);

        let mut ctl = BrightnessController::new();
        ctl.sample(800, &s);
        assert_eq!(ctl.target(), 9.0);
    }

    #[test]
    fn interpolation_is_eased_not_linear() {
        let s = settings();
        let mut ctl = BrightnessController::new();
        // midpoint of 10..350
        ctl.sample(180, &s);
        let expected = 1.0 + 8.0 * 0.75; // 1 - (1-0.5)^2
        assert!((ctl.target() - expected).abs() < 1e-9);
        // strictly above the linear midpoint of 5.0
        assert!(ctl.target() > 5.0);
    }

    #[test]
    fn sub_margin_wobble_is_suppressed() {
        // crossing 5.5 by only 0.05, then reverting
        let (push, acc) = apply_decision(5.55, Some(5), 0);
        assert_eq!(push, None);
        assert_eq!(acc, 100);
        let (push, acc) = apply_decision(5.40, Some(5), acc);
        assert_eq!(push, None);
        assert_eq!(acc, 0); // accumulator resets once rounding agrees
    }

    #[test]
    fn clear_boundary_crossings_push_immediately() {
        assert_eq!(apply_decision(5.65, Some(5), 0).0, Some(6));
        assert_eq!(apply_decision(4.35, Some(5), 0).0, Some(4));
        // multi-level jump
        assert_eq!(apply_decision(9.0, Some(2), 0).0, Some(9));
    }

    #[test]
    fn sustained_sub_margin_difference_applies_eventually() {
        let mut acc = 0;
        for tick in 1..=100 {
            let (push, next) = apply_decision(5.55, Some(5), acc);
            acc = next;
            if tick < 100 {
                assert_eq!(push, None, "tick {tick}");
            } else {
                // 100 ticks x 100 ms = the 10 s sustain window
                assert_eq!(push, Some(6));
            }
        }
    }

    #[test]
    fn force_reapply_pushes_on_next_sample() {
        let mut ctl = BrightnessController::new();
        ctl.sample(800, &settings());
        assert_eq!(ctl.sample(800, &settings()), None);
        ctl.force_reapply();
        assert_eq!(ctl.sample(800, &settings()), Some(9));
    }
}
