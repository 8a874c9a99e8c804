//! Control boundary between the clock core and the external
//! configuration layer (HTTP UI, NTP client, and so on — all out of
//! scope here). Everything the outside world may do to a running clock
//! arrives as one of these events on an mpsc channel.

use tokio::sync::mpsc;

use crate::clock_font::CustomFont;
use crate::config::ClockSettings;

const CHANNEL_DEPTH: usize = 16;

#[derive(Debug)]
pub enum ControlEvent {
    /// Replace the runtime settings wholesale. The scheduler diffs old
    /// vs. new to decide whether a re-render or an intensity update is
    /// needed.
    ApplySettings(ClockSettings),
    /// Level-triggered redraw request; duplicates before consumption
    /// coalesce.
    ForceSync,
    /// Manual time injection for setups without network time.
    InjectTime { epoch_millis: u64 },
    /// The external NTP client obtained a sync; the system clock is
    /// valid from now on.
    TimeSynced,
    SetCustomFont(Box<CustomFont>),
    RunLedTest,
    RunNightTest,
    Shutdown,
}

pub type ControlSender = mpsc::Sender<ControlEvent>;
pub type ControlReceiver = mpsc::Receiver<ControlEvent>;

pub fn channel() -> (ControlSender, ControlReceiver) {
    mpsc::channel(CHANNEL_DEPTH)
}
