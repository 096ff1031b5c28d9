// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use crate::sensor::Reading;

/// Rounds the stored binary value to two decimal places.
///
/// Exact ties (only multiples of 1/8 such as `0.125` are representable) round
/// half away from zero, everything else to the nearest two-digit decimal.
pub fn round2(value: f64) -> f64 {
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && (eighths % 2.0).abs() == 1.0 {
        return (value * 100.0).round() / 100.0;
    }

    format!("{value:.2}").parse().unwrap_or(value)
}

/// Shortest representation that round-trips, always with a decimal point.
fn decimal(value: f64) -> String {
    format!("{value:?}")
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{} C", decimal(round2(celsius)))
}

pub fn format_humidity(percent: f64) -> String {
    format!("{} %", decimal(round2(percent)))
}

pub fn format_pressure(hpa: f64) -> String {
    format!("{} hPa", decimal(round2(hpa)))
}

pub fn format_period(period_ms: u32) -> String {
    format!("Update each: {}s", decimal(period_ms as f64 / 1000.0))
}

/// The texts of all display slots after one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplaySlots {
    pub temperature: String,
    pub humidity: String,
    pub pressure: String,
    pub period: String,
}

impl DisplaySlots {
    pub fn new(reading: &Reading, period_ms: u32) -> Self {
        Self {
            temperature: format_temperature(reading.temperature),
            humidity: format_humidity(reading.humidity),
            pressure: format_pressure(reading.pressure),
            period: format_period(period_ms),
        }
    }
}

#[test]
fn test_display_slots() {
    let reading = Reading {
        temperature: 21.456,
        pressure: 1013.789,
        humidity: 47.321,
    };

    assert_eq!(
        DisplaySlots::new(&reading, 2000),
        DisplaySlots {
            temperature: "21.46 C".into(),
            humidity: "47.32 %".into(),
            pressure: "1013.79 hPa".into(),
            period: "Update each: 2.0s".into(),
        }
    );
}

#[test]
fn test_format_values() {
    assert_eq!(format_temperature(20.0), "20.0 C");
    assert_eq!(format_temperature(-3.14159), "-3.14 C");
    assert_eq!(format_humidity(55.5), "55.5 %");
    assert_eq!(format_humidity(100.0), "100.0 %");
    assert_eq!(format_pressure(987.004), "987.0 hPa");
}

#[test]
fn test_rounding_uses_stored_value() {
    // These decimals are stored just below the halfway point
    assert_eq!(format_humidity(62.845), "62.84 %");
    assert_eq!(format_pressure(398.005), "398.0 hPa");
    assert_eq!(format_pressure(1072.695), "1072.69 hPa");
    assert_eq!(format_temperature(2.675), "2.67 C");

    // Exact ties round away from zero
    assert_eq!(format_temperature(0.125), "0.13 C");
    assert_eq!(format_temperature(-0.125), "-0.13 C");
    assert_eq!(format_humidity(40.375), "40.38 %");
    assert_eq!(format_humidity(40.625), "40.63 %");
}

#[test]
fn test_format_period() {
    assert_eq!(format_period(2000), "Update each: 2.0s");
    assert_eq!(format_period(1000), "Update each: 1.0s");
    assert_eq!(format_period(500), "Update each: 0.5s");
    assert_eq!(format_period(250), "Update each: 0.25s");
    assert_eq!(format_period(125), "Update each: 0.125s");
    assert_eq!(format_period(1500), "Update each: 1.5s");
}
