//! End-to-end scenarios through the public API: a mock display on the
//! scheduler loop, driven by simulated monotonic time.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use tixel::clock_font::FontBook;
use tixel::compositor::Compositor;
use tixel::config::{ClockSettings, Config};
use tixel::control::{self, ControlEvent, ControlSender};
use tixel::display::drivers::mock::MockState;
use tixel::display::drivers::MockDriver;
use tixel::display::MatrixFrame;
use tixel::scheduler::{Flow, Scheduler};
use tixel::sensor::FixedSensor;

struct Rig {
    scheduler: Scheduler,
    control: ControlSender,
    display: Arc<Mutex<MockState>>,
}

impl Rig {
    fn new() -> Self {
        let driver = MockDriver::new();
        let display = driver.state();
        let (control, events) = control::channel();
        let config = Config::default();
        let scheduler = Scheduler::new(
            Box::new(driver),
            Box::new(FixedSensor::new(800, 1023)),
            events,
            &config,
            FontBook::new(),
        );
        Self {
            scheduler,
            control,
            display,
        }
    }

    fn tick(&mut self, now: u64) -> Flow {
        self.scheduler.tick(now).unwrap()
    }

    fn frame(&self) -> MatrixFrame {
        self.display.lock().unwrap().last_frame.unwrap()
    }

    fn pushes(&self) -> usize {
        self.display.lock().unwrap().push_count
    }
}

/// 14:04:59 UTC on a January day is 16:04:59 local (winter, +2).
fn winter_epoch_millis() -> u64 {
    Utc.with_ymd_and_hms(2023, 1, 15, 14, 4, 59)
        .unwrap()
        .timestamp_millis() as u64
}

#[test]
fn blank_until_a_time_source_appears() {
    let mut rig = Rig::new();
    rig.tick(0);
    assert!(rig.frame().is_blank());

    rig.control
        .try_send(ControlEvent::InjectTime {
            epoch_millis: winter_epoch_millis(),
        })
        .unwrap();
    rig.tick(20);
    assert!(!rig.frame().is_blank());
}

#[test]
fn injected_winter_time_renders_the_expected_digits() {
    let mut rig = Rig::new();
    rig.control
        .try_send(ControlEvent::InjectTime {
            epoch_millis: winter_epoch_millis(),
        })
        .unwrap();
    rig.tick(0);

    let expected = Compositor::render_preview(
        &ClockSettings::default(),
        &FontBook::new(),
        "16",
        "04",
        "59",
    );
    assert_eq!(rig.frame(), expected);
}

#[test]
fn minute_rollover_animates_then_settles() {
    let mut rig = Rig::new();
    rig.control
        .try_send(ControlEvent::InjectTime {
            epoch_millis: winter_epoch_millis(),
        })
        .unwrap();
    rig.tick(0); // 16:04:59

    let settings = ClockSettings::default();
    let fonts = FontBook::new();
    let old = Compositor::render_preview(&settings, &fonts, "16", "04", "00");
    let new = Compositor::render_preview(&settings, &fonts, "16", "05", "00");

    // crossing the minute arms the transition
    rig.tick(1000);
    // mid-animation the frame matches neither endpoint
    rig.tick(1100);
    let mid = rig.frame();
    assert_ne!(mid, old);
    assert_ne!(mid, new);

    // past the full duration it settles on the new time
    rig.tick(1400);
    assert_eq!(rig.frame(), new);
}

#[test]
fn force_sync_redraws_once_even_when_queued_twice() {
    let mut rig = Rig::new();
    rig.control
        .try_send(ControlEvent::InjectTime {
            epoch_millis: winter_epoch_millis(),
        })
        .unwrap();
    rig.tick(0);
    let base = rig.pushes();

    // two pending ForceSync events coalesce into a single redraw
    rig.control.try_send(ControlEvent::ForceSync).unwrap();
    rig.control.try_send(ControlEvent::ForceSync).unwrap();
    rig.tick(5);
    assert_eq!(rig.pushes(), base + 1);
}

#[test]
fn seconds_ticking_never_starts_a_transition() {
    let mut rig = Rig::new();
    // 16:04:30 local, mid-minute so only the seconds block moves
    let epoch = Utc
        .with_ymd_and_hms(2023, 1, 15, 14, 4, 30)
        .unwrap()
        .timestamp_millis() as u64;
    rig.control
        .try_send(ControlEvent::InjectTime {
            epoch_millis: epoch,
        })
        .unwrap();
    rig.tick(0);

    let mut with_seconds = ClockSettings::default();
    with_seconds.show_seconds = true;
    rig.control
        .try_send(ControlEvent::ApplySettings(with_seconds.clone()))
        .unwrap();
    rig.tick(5);

    // across the second boundary the frame stays the static layout; a
    // transition would mix rows at the 1100 ms sample
    rig.tick(1000);
    rig.tick(1100);
    let expected =
        Compositor::render_preview(&with_seconds, &FontBook::new(), "16", "04", "31");
    assert_eq!(rig.frame(), expected);
}

#[test]
fn seconds_toggle_snaps_to_the_new_layout() {
    let mut rig = Rig::new();
    rig.control
        .try_send(ControlEvent::InjectTime {
            epoch_millis: winter_epoch_millis(),
        })
        .unwrap();
    rig.tick(0);

    let mut with_seconds = ClockSettings::default();
    with_seconds.show_seconds = true;
    rig.control
        .try_send(ControlEvent::ApplySettings(with_seconds.clone()))
        .unwrap();
    rig.tick(5);

    // immediately equal to the static seconds layout: snapped, not
    // animated
    let expected =
        Compositor::render_preview(&with_seconds, &FontBook::new(), "16", "04", "59");
    assert_eq!(rig.frame(), expected);
}

#[test]
fn custom_font_change_redraws() {
    let mut rig = Rig::new();
    rig.control
        .try_send(ControlEvent::InjectTime {
            epoch_millis: winter_epoch_millis(),
        })
        .unwrap();
    rig.tick(0);
    let before = rig.frame();

    let mut font = tixel::clock_font::CustomFont::default();
    font.wide = [[0xAA; 8]; 10];
    rig.control
        .try_send(ControlEvent::SetCustomFont(Box::new(font)))
        .unwrap();

    let mut custom = ClockSettings::default();
    custom.font = tixel::clock_font::FontFamily::Custom;
    rig.control
        .try_send(ControlEvent::ApplySettings(custom))
        .unwrap();
    rig.tick(5);
    assert_ne!(rig.frame(), before);
}

#[test]
fn shutdown_event_stops_the_loop() {
    let mut rig = Rig::new();
    rig.tick(0);
    rig.control.try_send(ControlEvent::Shutdown).unwrap();
    assert_eq!(rig.tick(20), Flow::Stop);
}
