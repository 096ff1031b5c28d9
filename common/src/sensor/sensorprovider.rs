// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One sampled set of environmental values.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f64,

    /// Relative humidity in percent.
    pub humidity: f64,

    /// Air pressure in hPa.
    pub pressure: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sensor frame too short: expected {expected} bytes, got {actual}")]
    ShortFrame { expected: usize, actual: usize },

    #[error("invalid refresh period {raw:?}")]
    InvalidPeriod { raw: String },

    #[error("invalid sensor data: {0}")]
    Data(#[from] serde_json::Error),
}

impl SensorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Parses a refresh period in milliseconds as written by the driver, e.g. `"2000\n"`.
///
/// Zero is rejected, a zero period would make the refresh loop spin.
pub fn parse_period(raw: &str) -> Result<u32, SensorError> {
    match raw.trim().parse::<u32>() {
        Ok(period) if period > 0 => Ok(period),
        _ => Err(SensorError::InvalidPeriod { raw: raw.into() }),
    }
}

pub type SensorProviderPointer = Box<dyn SensorProvider>;

/// The sensor provider trait that delivers readings and the refresh period.
pub trait SensorProvider {
    /// Samples the sensor.
    fn read_reading(&mut self) -> Result<Reading, SensorError>;

    /// Fetches the current refresh period in milliseconds.
    fn read_period(&mut self) -> Result<u32, SensorError>;

    /// Advances the refresh period to its next step.
    ///
    /// Returns `false` if the period did not change, either because it is
    /// not controlled by software or because the request came too soon.
    fn cycle_period(&mut self) -> Result<bool, SensorError> {
        Ok(false)
    }
}

impl<P: SensorProvider + ?Sized> SensorProvider for Box<P> {
    fn read_reading(&mut self) -> Result<Reading, SensorError> {
        (**self).read_reading()
    }

    fn read_period(&mut self) -> Result<u32, SensorError> {
        (**self).read_period()
    }

    fn cycle_period(&mut self) -> Result<bool, SensorError> {
        (**self).cycle_period()
    }
}

#[test]
fn test_parse_period() {
    assert_eq!(parse_period("2000\n").unwrap(), 2000);
    assert_eq!(parse_period(" 125 ").unwrap(), 125);

    assert!(matches!(parse_period("0\n"), Err(SensorError::InvalidPeriod { .. })));
    assert!(matches!(parse_period("-5"), Err(SensorError::InvalidPeriod { .. })));
    assert!(matches!(parse_period("fast"), Err(SensorError::InvalidPeriod { .. })));
    assert!(matches!(parse_period(""), Err(SensorError::InvalidPeriod { .. })));
}
