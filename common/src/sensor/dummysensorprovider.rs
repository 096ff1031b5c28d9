// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::sensor::periodstepper::PeriodStepper;
use crate::sensor::sensorprovider::{Reading, SensorError, SensorProvider};

/// Replays a fixed series of readings, for running without the sensor.
#[derive(Deserialize, Default)]
pub struct DummySensorProvider {
    readings: Vec<Reading>,

    #[serde(skip)]
    next: usize,

    #[serde(skip)]
    stepper: PeriodStepper,
}

impl DummySensorProvider {
    pub fn new() -> Result<Self, SensorError> {
        let json_data = std::include_str!("./dummysensor.json");

        Ok(serde_json::from_str::<Self>(json_data)?)
    }

    pub fn from_readings(readings: Vec<Reading>) -> Self {
        Self {
            readings,
            ..Default::default()
        }
    }
}

impl SensorProvider for DummySensorProvider {
    fn read_reading(&mut self) -> Result<Reading, SensorError> {
        if self.readings.is_empty() {
            return Ok(Reading::default());
        }

        let reading = self.readings[self.next % self.readings.len()];
        self.next = (self.next + 1) % self.readings.len();

        Ok(reading)
    }

    fn read_period(&mut self) -> Result<u32, SensorError> {
        Ok(self.stepper.period_ms())
    }

    fn cycle_period(&mut self) -> Result<bool, SensorError> {
        let accepted = self.stepper.press();
        if accepted {
            log::info!("Update period changed to {}ms", self.stepper.period_ms());
        }

        Ok(accepted)
    }
}

#[test]
fn test_dummy_sensor_provider() {
    let mut provider = DummySensorProvider::new().unwrap();

    let first = provider.read_reading().unwrap();
    assert_eq!(
        first,
        Reading {
            temperature: 21.456,
            humidity: 47.321,
            pressure: 1013.789,
        }
    );
    assert_eq!(provider.read_period().unwrap(), PeriodStepper::START);

    // Cycles back to the first reading
    for _ in 0..4 {
        provider.read_reading().unwrap();
    }
    assert_eq!(provider.read_reading().unwrap(), first);
}

#[test]
fn test_dummy_cycle_period() {
    let mut provider = DummySensorProvider::from_readings(vec![]);

    assert_eq!(provider.read_reading().unwrap(), Reading::default());
    assert!(provider.cycle_period().unwrap());
    assert_eq!(provider.read_period().unwrap(), 1000);

    // A second click right away is debounced
    assert!(!provider.cycle_period().unwrap());
    assert_eq!(provider.read_period().unwrap(), 1000);
}
