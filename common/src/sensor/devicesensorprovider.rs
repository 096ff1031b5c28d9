// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::io::Read;
use std::path::PathBuf;

use crate::sensor::bme280::{self, FRAME_SIZE};
use crate::sensor::sensorprovider::{parse_period, Reading, SensorError, SensorProvider};

/// Reads the BME280 through its kernel driver.
///
/// Every reading opens the character device, which makes the driver configure
/// the sensor, and reads one frame of calibration and measurement data.
/// The refresh period is owned by the driver and exposed through sysfs.
pub struct DeviceSensorProvider {
    device_path: PathBuf,
    period_path: PathBuf,
}

impl DeviceSensorProvider {
    pub const DEVICE_PATH: &'static str = "/dev/bme280";
    pub const PERIOD_PATH: &'static str = "/sys/kernel/WeatherKObject/WeatherAttrGroup/period_ms";

    pub fn new(device_path: impl Into<PathBuf>, period_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
            period_path: period_path.into(),
        }
    }

    fn read_frame(&self) -> Result<Vec<u8>, SensorError> {
        let mut device = std::fs::File::open(&self.device_path)
            .map_err(|e| SensorError::io(&self.device_path, e))?;

        let mut frame = Vec::with_capacity(FRAME_SIZE);
        device
            .by_ref()
            .take(FRAME_SIZE as u64)
            .read_to_end(&mut frame)
            .map_err(|e| SensorError::io(&self.device_path, e))?;

        Ok(frame)
    }
}

impl Default for DeviceSensorProvider {
    fn default() -> Self {
        Self::new(Self::DEVICE_PATH, Self::PERIOD_PATH)
    }
}

impl SensorProvider for DeviceSensorProvider {
    fn read_reading(&mut self) -> Result<Reading, SensorError> {
        let frame = self.read_frame()?;
        let reading = bme280::reading_from_frame(&frame)?;
        log::trace!("BME280 frame {frame:02x?} -> {reading:?}");

        Ok(reading)
    }

    fn read_period(&mut self) -> Result<u32, SensorError> {
        let raw = std::fs::read_to_string(&self.period_path)
            .map_err(|e| SensorError::io(&self.period_path, e))?;

        parse_period(&raw)
    }
}
