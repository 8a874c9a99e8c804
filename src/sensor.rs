//! Ambient light sensor boundary. The controller only needs a raw
//! reading and the upper bound of the sensor's range.

use std::fs;
use std::path::PathBuf;

use log::warn;

pub trait LightSensor: Send {
    /// Raw reading in `0..=max_raw()`. Must be cheap; it is called from
    /// the scheduler tick.
    fn read_raw(&mut self) -> u32;

    /// Upper bound of the raw range, inclusive.
    fn max_raw(&self) -> u32;
}

/// Reads a sysfs/IIO attribute file such as
/// `/sys/bus/iio/devices/iio:device0/in_illuminance_raw`. A failed read
/// repeats the previous value rather than spiking the average.
pub struct SysfsSensor {
    path: PathBuf,
    max_raw: u32,
    last: u32,
    warned: bool,
}

impl SysfsSensor {
    pub fn new(path: impl Into<PathBuf>, max_raw: u32) -> Self {
        Self {
            path: path.into(),
            max_raw,
            last: 0,
            warned: false,
        }
    }
}

impl LightSensor for SysfsSensor {
    fn read_raw(&mut self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(text) => match text.trim().parse::<u32>() {
                Ok(value) => {
                    self.last = value.min(self.max_raw);
                    self.warned = false;
                    self.last
                }
                Err(_) => self.last,
            },
            Err(err) => {
                if !self.warned {
                    warn!("light sensor read failed ({}): {err}", self.path.display());
                    self.warned = true;
                }
                self.last
            }
        }
    }

    fn max_raw(&self) -> u32 {
        self.max_raw
    }
}

/// Constant reading, for setups without a sensor and for tests.
pub struct FixedSensor {
    value: u32,
    max_raw: u32,
}

impl FixedSensor {
    pub fn new(value: u32, max_raw: u32) -> Self {
        Self {
            value: value.min(max_raw),
            max_raw,
        }
    }
}

impl LightSensor for FixedSensor {
    fn read_raw(&mut self) -> u32 {
        self.value
    }

    fn max_raw(&self) -> u32 {
        self.max_raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysfs_sensor_parses_and_clamps() {
        let dir = std::env::temp_dir().join("tixel-sensor-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("in_illuminance_raw");
        std::fs::write(&path, "2000\n").unwrap();
        let mut sensor = SysfsSensor::new(&path, 1023);
        assert_eq!(sensor.read_raw(), 1023);
        std::fs::write(&path, "42\n").unwrap();
        assert_eq!(sensor.read_raw(), 42);
        // unreadable file repeats the last value
        std::fs::remove_file(&path).unwrap();
        assert_eq!(sensor.read_raw(), 42);
    }

    #[test]
    fn fixed_sensor_is_constant() {
        let mut sensor = FixedSensor::new(512, 1023);
        assert_eq!(sensor.read_raw(), 512);
        assert_eq!(sensor.max_raw(), 1023);
    }
}
