/*
 *  config.rs
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
//! Layered configuration: built-in defaults, then the YAML file, then
//! CLI overrides. `ClockSettings` is the runtime-tunable block the
//! scheduler re-reads every tick and the control boundary can replace
//! wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock_font::FontFamily;
use crate::compositor::AnimationStyle;

/// MAX7219 intensity registers are 4 bits.
pub const MAX_LEVEL: u8 = 15;

const CONFIG_DIR_FILE: &str = "tixel/config.yaml";
const LOCAL_FILE: &str = "tixel.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("day threshold ({day}) must be greater than night threshold ({night})")]
    ThresholdOrder { night: u32, day: u32 },

    #[error("threshold {value} exceeds the sensor range 0..={max}")]
    ThresholdRange { value: u32, max: u32 },

    #[error("brightness level {0} exceeds the maximum of {MAX_LEVEL}")]
    LevelRange(u8),

    #[error("device count {0} out of range 1..=8")]
    DeviceCount(usize),
}

#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DriverKind {
    #[default]
    Console,
    Mock,
    Max7219,
}

/// Everything the clock core reads fresh each tick. Mutated only through
/// the control boundary, never by the core itself.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClockSettings {
    pub font: FontFamily,
    pub bold: bool,
    pub compact: bool,
    pub show_seconds: bool,
    pub single_digit_hour: bool,
    pub rotate_180: bool,
    pub animation_style: AnimationStyle,
    pub animated: bool,
    pub slow_separator: bool,
    pub day_level: u8,
    pub night_level: u8,
    pub night_threshold: u32,
    pub day_threshold: u32,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            font: FontFamily::Block,
            bold: false,
            compact: false,
            show_seconds: false,
            single_digit_hour: false,
            rotate_180: false,
            animation_style: AnimationStyle::WipeWithGap,
            animated: true,
            slow_separator: false,
            day_level: 9,
            night_level: 1,
            night_threshold: 10,
            day_threshold: 350,
        }
    }
}

impl ClockSettings {
    /// True when replacing `self` with `other` changes what is drawn, so
    /// the frame must be re-rendered without animation.
    pub fn needs_rerender(&self, other: &ClockSettings) -> bool {
        self.font != other.font
            || self.bold != other.bold
            || self.compact != other.compact
            || self.show_seconds != other.show_seconds
            || self.single_digit_hour != other.single_digit_hour
            || self.rotate_180 != other.rotate_180
            || self.slow_separator != other.slow_separator
    }

    /// True when replacing `self` with `other` changes the brightness
    /// mapping, so the intensity must be recomputed and re-applied.
    pub fn needs_intensity_update(&self, other: &ClockSettings) -> bool {
        self.day_level != other.day_level
            || self.night_level != other.night_level
            || self.night_threshold != other.night_threshold
            || self.day_threshold != other.day_threshold
    }

    pub fn validate(&self, sensor_max_raw: u32) -> Result<(), ConfigError> {
        for level in [self.day_level, self.night_level] {
            if level > MAX_LEVEL {
                return Err(ConfigError::LevelRange(level));
            }
        }
        if self.night_threshold >= self.day_threshold {
            return Err(ConfigError::ThresholdOrder {
                night: self.night_threshold,
                day: self.day_threshold,
            });
        }
        if self.day_threshold > sensor_max_raw {
            return Err(ConfigError::ThresholdRange {
                value: self.day_threshold,
                max: sensor_max_raw,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub driver: DriverKind,
    /// SPI device node the MAX7219 chain hangs off.
    pub spidev: String,
    /// Number of cascaded 8x8 modules.
    pub devices: usize,
    /// sysfs file exposing the ambient light reading; fixed mid-range
    /// value when absent.
    pub sensor_path: Option<PathBuf>,
    pub sensor_max_raw: u32,
    /// Where the custom font table is persisted.
    pub font_file: Option<PathBuf>,
    pub log_level: String,
    pub clock: ClockSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver: DriverKind::Console,
            spidev: "/dev/spidev0.0".into(),
            devices: 4,
            sensor_path: None,
            sensor_max_raw: 1023,
            font_file: None,
            log_level: "info".into(),
            clock: ClockSettings::default(),
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(name = "tixel", about = "WiFi-synchronized LED matrix clock", version)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Display driver
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,

    /// SPI device node for the MAX7219 chain
    #[arg(long, value_name = "DEV")]
    pub spidev: Option<String>,

    /// Number of cascaded 8x8 modules
    #[arg(long)]
    pub devices: Option<usize>,

    /// sysfs path of the ambient light sensor
    #[arg(long, value_name = "FILE")]
    pub sensor: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub dump_config: bool,
}

/// Explicit CLI path first, then the user config directory, then a
/// project-local file.
pub fn find_config_file(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Some(dir) = dirs_next::config_dir() {
        let candidate = dir.join(CONFIG_DIR_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    let local = PathBuf::from(LOCAL_FILE);
    local.exists().then_some(local)
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
        let mut config = match find_config_file(cli.config.as_deref()) {
            Some(path) => {
                debug!("loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Config::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(driver) = cli.driver {
            self.driver = driver;
        }
        if let Some(spidev) = &cli.spidev {
            self.spidev = spidev.clone();
        }
        if let Some(devices) = cli.devices {
            self.devices = devices;
        }
        if let Some(sensor) = &cli.sensor {
            self.sensor_path = Some(sensor.clone());
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices == 0 || self.devices > 8 {
            return Err(ConfigError::DeviceCount(self.devices));
        }
        self.clock.validate(self.sensor_max_raw)
    }

    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(self).unwrap_or_default()
    }
}
