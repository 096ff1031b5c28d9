// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

//! Decoding of the block delivered by the BME280 character device.
//!
//! The driver copies the three calibration register blocks and the measurement
//! registers into one frame:
//!
//! | Offset | Length | Register | Content |
//! |--------|--------|----------|---------|
//! | 0      | 24     | 0x88     | dig_T1..dig_T3, dig_P1..dig_P9 |
//! | 24     | 1      | 0xA1     | dig_H1 |
//! | 25     | 7      | 0xE1     | dig_H2..dig_H6 |
//! | 32     | 8      | 0xF7     | press, temp, hum ADC values |

use crate::sensor::{Reading, SensorError};

pub const FRAME_SIZE: usize = 40;

const CAL1_OFFSET: usize = 0;
const CAL2_OFFSET: usize = 24;
const CAL3_OFFSET: usize = 25;
const DATA_OFFSET: usize = 32;

/// Factory trimming parameters of one sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Calibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,

    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,

    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

/// Uncompensated ADC values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawSample {
    pub adc_t: i32,
    pub adc_p: i32,
    pub adc_h: i32,
}

fn u16_le(data: &[u8], index: usize) -> u16 {
    u16::from_le_bytes([data[index], data[index + 1]])
}

fn i16_le(data: &[u8], index: usize) -> i16 {
    i16::from_le_bytes([data[index], data[index + 1]])
}

fn adc_20bit(data: &[u8]) -> i32 {
    ((data[0] as i32) << 12) | ((data[1] as i32) << 4) | ((data[2] as i32) >> 4)
}

/// Splits a device frame into calibration and raw sample.
pub fn decode_frame(frame: &[u8]) -> Result<(Calibration, RawSample), SensorError> {
    if frame.len() < FRAME_SIZE {
        return Err(SensorError::ShortFrame {
            expected: FRAME_SIZE,
            actual: frame.len(),
        });
    }

    let cal1 = &frame[CAL1_OFFSET..CAL2_OFFSET];
    let cal3 = &frame[CAL3_OFFSET..DATA_OFFSET];
    let data = &frame[DATA_OFFSET..FRAME_SIZE];

    let calibration = Calibration {
        dig_t1: u16_le(cal1, 0),
        dig_t2: i16_le(cal1, 2),
        dig_t3: i16_le(cal1, 4),

        dig_p1: u16_le(cal1, 6),
        dig_p2: i16_le(cal1, 8),
        dig_p3: i16_le(cal1, 10),
        dig_p4: i16_le(cal1, 12),
        dig_p5: i16_le(cal1, 14),
        dig_p6: i16_le(cal1, 16),
        dig_p7: i16_le(cal1, 18),
        dig_p8: i16_le(cal1, 20),
        dig_p9: i16_le(cal1, 22),

        dig_h1: frame[CAL2_OFFSET],
        dig_h2: i16_le(cal3, 0),
        dig_h3: cal3[2],
        // H4 and H5 share the nibbles of 0xE5
        dig_h4: ((cal3[3] as i8 as i16) << 4) | (cal3[4] & 0x0F) as i16,
        dig_h5: ((cal3[5] as i8 as i16) << 4) | (cal3[4] >> 4) as i16,
        dig_h6: cal3[6] as i8,
    };

    let sample = RawSample {
        adc_p: adc_20bit(&data[0..3]),
        adc_t: adc_20bit(&data[3..6]),
        adc_h: ((data[6] as i32) << 8) | data[7] as i32,
    };

    Ok((calibration, sample))
}

impl Calibration {
    /// Fine temperature shared by the pressure and humidity formulas.
    fn t_fine(&self, adc_t: i32) -> f64 {
        let adc_t = adc_t as f64;
        let t1 = self.dig_t1 as f64;

        let var1 = (adc_t / 16384.0 - t1 / 1024.0) * self.dig_t2 as f64;
        let var2 = (adc_t / 131072.0 - t1 / 8192.0).powi(2) * self.dig_t3 as f64;

        var1 + var2
    }

    /// Pressure in Pa.
    fn pressure(&self, adc_p: i32, t_fine: f64) -> f64 {
        let mut var1 = t_fine / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * self.dig_p6 as f64 / 32768.0;
        var2 += var1 * self.dig_p5 as f64 * 2.0;
        var2 = var2 / 4.0 + self.dig_p4 as f64 * 65536.0;
        var1 = (self.dig_p3 as f64 * var1 * var1 / 524288.0 + self.dig_p2 as f64 * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * self.dig_p1 as f64;

        if var1 == 0.0 {
            return 0.0;
        }

        let mut p = 1048576.0 - adc_p as f64;
        p = (p - var2 / 4096.0) * 6250.0 / var1;
        let var1 = self.dig_p9 as f64 * p * p / 2147483648.0;
        let var2 = p * self.dig_p8 as f64 / 32768.0;

        p + (var1 + var2 + self.dig_p7 as f64) / 16.0
    }

    /// Relative humidity in percent, clamped to 0..=100.
    fn humidity(&self, adc_h: i32, t_fine: f64) -> f64 {
        let h = t_fine - 76800.0;
        let h = (adc_h as f64 - (self.dig_h4 as f64 * 64.0 + self.dig_h5 as f64 / 16384.0 * h))
            * (self.dig_h2 as f64 / 65536.0
                * (1.0
                    + self.dig_h6 as f64 / 67108864.0
                        * h
                        * (1.0 + self.dig_h3 as f64 / 67108864.0 * h)));
        let h = h * (1.0 - self.dig_h1 as f64 * h / 524288.0);

        h.clamp(0.0, 100.0)
    }

    /// Turns raw ADC values into physical units.
    pub fn compensate(&self, sample: RawSample) -> Reading {
        let t_fine = self.t_fine(sample.adc_t);

        Reading {
            temperature: t_fine / 5120.0,
            pressure: self.pressure(sample.adc_p, t_fine) / 100.0,
            humidity: self.humidity(sample.adc_h, t_fine),
        }
    }
}

/// Decodes and compensates one device frame.
pub fn reading_from_frame(frame: &[u8]) -> Result<Reading, SensorError> {
    let (calibration, sample) = decode_frame(frame)?;
    Ok(calibration.compensate(sample))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Trimming values of the Bosch datasheet calculation example.
    pub(crate) fn datasheet_calibration() -> Calibration {
        Calibration {
            dig_t1: 27504,
            dig_t2: 26435,
            dig_t3: -1000,
            dig_p1: 36477,
            dig_p2: -10685,
            dig_p3: 3024,
            dig_p4: 2855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15500,
            dig_p8: -14600,
            dig_p9: 6000,
            ..Default::default()
        }
    }

    /// Lays out a frame the way the driver copies the registers.
    pub(crate) fn frame(cal: &Calibration, sample: RawSample) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];

        let words: [[u8; 2]; 12] = [
            cal.dig_t1.to_le_bytes(),
            cal.dig_t2.to_le_bytes(),
            cal.dig_t3.to_le_bytes(),
            cal.dig_p1.to_le_bytes(),
            cal.dig_p2.to_le_bytes(),
            cal.dig_p3.to_le_bytes(),
            cal.dig_p4.to_le_bytes(),
            cal.dig_p5.to_le_bytes(),
            cal.dig_p6.to_le_bytes(),
            cal.dig_p7.to_le_bytes(),
            cal.dig_p8.to_le_bytes(),
            cal.dig_p9.to_le_bytes(),
        ];
        for (i, word) in words.iter().enumerate() {
            frame[2 * i..2 * i + 2].copy_from_slice(word);
        }

        frame[24] = cal.dig_h1;
        frame[25..27].copy_from_slice(&cal.dig_h2.to_le_bytes());
        frame[27] = cal.dig_h3;
        frame[28] = (cal.dig_h4 >> 4) as u8;
        frame[29] = ((cal.dig_h4 & 0x0F) as u8) | (((cal.dig_h5 & 0x0F) as u8) << 4);
        frame[30] = (cal.dig_h5 >> 4) as u8;
        frame[31] = cal.dig_h6 as u8;

        let put_20bit = |buf: &mut [u8], value: i32| {
            buf[0] = (value >> 12) as u8;
            buf[1] = (value >> 4) as u8;
            buf[2] = ((value & 0x0F) << 4) as u8;
        };
        put_20bit(&mut frame[32..35], sample.adc_p);
        put_20bit(&mut frame[35..38], sample.adc_t);
        frame[38] = (sample.adc_h >> 8) as u8;
        frame[39] = sample.adc_h as u8;

        frame
    }

    #[test]
    fn test_datasheet_example() {
        let cal = datasheet_calibration();
        let reading = cal.compensate(RawSample {
            adc_t: 519888,
            adc_p: 415148,
            adc_h: 0,
        });

        assert!((reading.temperature - 25.08).abs() < 0.01, "{reading:?}");
        assert!((reading.pressure - 1006.53).abs() < 0.01, "{reading:?}");
    }

    #[test]
    fn test_decode_frame_layout() {
        let cal = Calibration {
            dig_h1: 75,
            dig_h2: 362,
            dig_h3: 0,
            dig_h4: 324,
            dig_h5: -50,
            dig_h6: 30,
            ..datasheet_calibration()
        };
        let sample = RawSample {
            adc_t: 519888,
            adc_p: 415148,
            adc_h: 27000,
        };

        let (decoded, decoded_sample) = decode_frame(&frame(&cal, sample)).unwrap();

        assert_eq!(decoded, cal);
        assert_eq!(decoded_sample, sample);
    }

    #[test]
    fn test_short_frame() {
        let err = decode_frame(&[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            SensorError::ShortFrame {
                expected: 40,
                actual: 16
            }
        ));
    }

    #[test]
    fn test_zero_pressure_calibration() {
        // dig_P1 == 0 would divide by zero
        let cal = Calibration {
            dig_p1: 0,
            ..datasheet_calibration()
        };
        let reading = cal.compensate(RawSample {
            adc_t: 519888,
            adc_p: 415148,
            adc_h: 0,
        });

        assert_eq!(reading.pressure, 0.0);
    }

    #[test]
    fn test_humidity_linear_and_clamped() {
        let cal = Calibration {
            dig_h2: 32767,
            ..datasheet_calibration()
        };

        let reading = cal.compensate(RawSample {
            adc_t: 519888,
            adc_p: 415148,
            adc_h: 80,
        });
        assert!((reading.humidity - 40.0).abs() < 0.01, "{reading:?}");

        let reading = cal.compensate(RawSample {
            adc_t: 519888,
            adc_p: 415148,
            adc_h: 0xFFFF,
        });
        assert_eq!(reading.humidity, 100.0);

        let reading = datasheet_calibration().compensate(RawSample {
            adc_t: 519888,
            adc_p: 415148,
            adc_h: 30000,
        });
        assert_eq!(reading.humidity, 0.0);
    }
}
