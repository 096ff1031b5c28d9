// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

/// Software version of the driver's "update period" button.
///
/// Every accepted press halves the period, every fourth press resets it to
/// [`PeriodStepper::START`]. Presses that follow the previous accepted press
/// within [`PeriodStepper::DEBOUNCE`] are ignored.
#[derive(Debug, Clone)]
pub struct PeriodStepper {
    period_ms: u32,
    presses: u32,
    last_press: Option<Instant>,
}

impl Default for PeriodStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodStepper {
    pub const START: u32 = 2000;
    pub const DIVISOR: u32 = 2;
    pub const MAX_STEPS: u32 = 4;
    pub const DEBOUNCE: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self {
            period_ms: Self::START,
            presses: 0,
            last_press: None,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Registers a press at `now`. Returns `false` if it was debounced.
    pub fn press_at(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_press {
            if now.saturating_duration_since(last) < Self::DEBOUNCE {
                return false;
            }
        }

        self.last_press = Some(now);
        self.presses = self.presses.wrapping_add(1);

        if self.presses % Self::MAX_STEPS != 0 {
            self.period_ms /= Self::DIVISOR;
        } else {
            self.period_ms = Self::START;
        }

        true
    }

    pub fn press(&mut self) -> bool {
        self.press_at(Instant::now())
    }
}

#[test]
fn test_period_cycle() {
    let mut stepper = PeriodStepper::new();
    let start = Instant::now();

    let periods: Vec<u32> = (1..=8)
        .map(|i| {
            assert!(stepper.press_at(start + Duration::from_secs(i)));
            stepper.period_ms()
        })
        .collect();

    assert_eq!(periods, [1000, 500, 250, 2000, 1000, 500, 250, 2000]);
}

#[test]
fn test_period_debounce() {
    let mut stepper = PeriodStepper::new();
    let start = Instant::now();

    assert!(stepper.press_at(start));
    assert!(!stepper.press_at(start + Duration::from_millis(100)));
    assert_eq!(stepper.period_ms(), 1000);

    assert!(stepper.press_at(start + Duration::from_millis(250)));
    assert_eq!(stepper.period_ms(), 500);
}
