/*
 *  timekeeper.rs
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
//! Dual-source time: the synced system clock once a sync signal has
//! arrived, or a manually injected epoch extrapolated from a wrapping
//! monotonic millisecond counter. Local time uses a fixed regional DST
//! rule (last Sunday of March to last Sunday of October, 01:00 UTC,
//! UTC+3 inside, UTC+2 outside), not a timezone database.

use core::fmt::Write as _;

use arrayvec::ArrayString;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use log::info;

/// Zero- or space-padded two-character time field.
pub type TimeField = ArrayString<2>;

/// Overflow-safe difference on a wrapping u32 millisecond counter.
pub fn diff_wrapping_millis(start: u32, end: u32) -> u32 {
    if end >= start {
        end - start
    } else {
        (u32::MAX - start) + end + 1
    }
}

struct ManualTime {
    base_epoch_ms: u64,
    base_mono_ms: u32,
}

pub struct TimeKeeper {
    synced: bool,
    manual: Option<ManualTime>,
}

impl TimeKeeper {
    pub fn new() -> Self {
        Self {
            synced: false,
            manual: None,
        }
    }

    pub fn is_time_available(&self) -> bool {
        self.synced || self.manual.is_some()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// A network sync arrived; the system clock is authoritative from
    /// here on and any manual base is dropped.
    pub fn mark_synced(&mut self) {
        if !self.synced {
            info!("time source: network-synced clock");
        }
        self.synced = true;
        self.manual = None;
    }

    /// Manual injection, aligned to the start of the injected second so
    /// sub-second phase begins at zero. An explicit injection overrides
    /// a previous sync.
    pub fn set_manual(&mut self, epoch_millis: u64, now_mono_ms: u32) {
        let aligned = epoch_millis - (epoch_millis % 1000);
        info!("time source: manual injection at epoch {}s", aligned / 1000);
        self.manual = Some(ManualTime {
            base_epoch_ms: aligned,
            base_mono_ms: now_mono_ms,
        });
        self.synced = false;
    }

    /// Current epoch milliseconds, or None before any source exists.
    /// The manual base is rebased on every call, which keeps each
    /// wrapping diff far below the counter period.
    pub fn epoch_millis(&mut self, now_mono_ms: u32) -> Option<u64> {
        if self.synced {
            return Some(Utc::now().timestamp_millis().max(0) as u64);
        }
        let manual = self.manual.as_mut()?;
        let elapsed = diff_wrapping_millis(manual.base_mono_ms, now_mono_ms) as u64;
        manual.base_epoch_ms += elapsed;
        manual.base_mono_ms = now_mono_ms;
        Some(manual.base_epoch_ms)
    }
}

impl Default for TimeKeeper {
    fn default() -> Self {
        Self::new()
    }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    let mut day = next_month.pred_opt()?;
    while day.weekday() != Weekday::Sun {
        day = day.pred_opt()?;
    }
    Some(day)
}

fn dst_boundary(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let date = last_sunday(year, month)?;
    let naive = date.and_hms_opt(1, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Half-open summer interval: `[last Sun of March 01:00, last Sun of
/// October 01:00)` in UTC.
pub fn is_summer_time(utc: DateTime<Utc>) -> bool {
    let year = utc.year();
    match (dst_boundary(year, 3), dst_boundary(year, 10)) {
        (Some(march), Some(october)) => utc >= march && utc < october,
        _ => false,
    }
}

pub fn utc_offset_hours(utc: DateTime<Utc>) -> i64 {
    if is_summer_time(utc) {
        3
    } else {
        2
    }
}

/// Formats local hour/minute/second. All fields are zero-padded except
/// that a single-digit hour is space-padded when the flag asks for it.
pub fn format_hms(
    epoch_seconds: u64,
    single_digit_hour: bool,
) -> (TimeField, TimeField, TimeField) {
    let utc = DateTime::from_timestamp(epoch_seconds as i64, 0).unwrap_or_default();
    let local = utc + Duration::hours(utc_offset_hours(utc));

    let mut hour = TimeField::new();
    if single_digit_hour && local.hour() < 10 {
        let _ = write!(hour, " {}", local.hour());
    } else {
        let _ = write!(hour, "{:02}", local.hour());
    }
    let mut minute = TimeField::new();
    let _ = write!(minute, "{:02}", local.minute());
    let mut second = TimeField::new();
    let _ = write!(second, "{:02}", local.second());
    (hour, minute, second)
}
