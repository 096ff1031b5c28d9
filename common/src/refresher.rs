// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::display::DisplaySlots;
use crate::sensor::{SensorError, SensorProvider};

/// Result of one tick: what to show and when to tick again.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub slots: DisplaySlots,

    /// Delay until the next tick, the period read during this tick.
    pub delay: Duration,
}

/// Fetches readings and the period from a provider and turns them into slot texts.
///
/// The refresher does not own a timer. The caller applies [`Tick::slots`] and
/// only then arms a single-shot timer with [`Tick::delay`], so there is never
/// more than one tick in flight.
pub struct DisplayRefresher<P> {
    provider: P,
    last_delay: Option<Duration>,
}

impl<P: SensorProvider> DisplayRefresher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            last_delay: None,
        }
    }

    /// Runs one tick. A provider error ends the refresh cycle.
    pub fn tick(&mut self) -> Result<Tick, SensorError> {
        let reading = self.provider.read_reading()?;
        let period_ms = self.provider.read_period()?;

        let slots = DisplaySlots::new(&reading, period_ms);
        let delay = Duration::from_millis(period_ms as u64);

        match self.last_delay.replace(delay) {
            Some(previous) if previous != delay => {
                log::info!("Update period changed from {previous:?} to {delay:?}")
            }
            _ => {}
        }

        log::debug!("Tick: {slots:?}, next in {delay:?}");

        Ok(Tick { slots, delay })
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::Reading;
    use std::collections::VecDeque;

    /// Provider returning scripted results, recording the order of calls.
    #[derive(Default)]
    struct ScriptedProvider {
        readings: VecDeque<Result<Reading, SensorError>>,
        periods: VecDeque<u32>,
        calls: Vec<&'static str>,
    }

    impl SensorProvider for ScriptedProvider {
        fn read_reading(&mut self) -> Result<Reading, SensorError> {
            self.calls.push("reading");
            self.readings.pop_front().expect("unexpected reading")
        }

        fn read_period(&mut self) -> Result<u32, SensorError> {
            self.calls.push("period");
            Ok(self.periods.pop_front().expect("unexpected period"))
        }
    }

    fn reading(temperature: f64) -> Reading {
        Reading {
            temperature,
            humidity: 47.321,
            pressure: 1013.789,
        }
    }

    #[test]
    fn test_first_tick() {
        let provider = ScriptedProvider {
            readings: [Ok(reading(21.456))].into(),
            periods: [2000].into(),
            ..Default::default()
        };
        let mut refresher = DisplayRefresher::new(provider);

        let tick = refresher.tick().unwrap();

        assert_eq!(tick.slots.temperature, "21.46 C");
        assert_eq!(tick.slots.humidity, "47.32 %");
        assert_eq!(tick.slots.pressure, "1013.79 hPa");
        assert_eq!(tick.slots.period, "Update each: 2.0s");
        assert_eq!(tick.delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_comes_from_same_tick() {
        let provider = ScriptedProvider {
            readings: [Ok(reading(20.0)), Ok(reading(20.1)), Ok(reading(20.2))].into(),
            periods: [2000, 2000, 500].into(),
            ..Default::default()
        };
        let mut refresher = DisplayRefresher::new(provider);

        let delays: Vec<Duration> = (0..3).map(|_| refresher.tick().unwrap().delay).collect();

        assert_eq!(
            delays,
            [
                Duration::from_millis(2000),
                Duration::from_millis(2000),
                Duration::from_millis(500),
            ]
        );
        assert_eq!(
            refresher.provider_mut().calls,
            ["reading", "period", "reading", "period", "reading", "period"]
        );
    }

    #[test]
    fn test_read_failure_ends_tick() {
        let provider = ScriptedProvider {
            readings: [Err(SensorError::ShortFrame {
                expected: 40,
                actual: 0,
            })]
            .into(),
            ..Default::default()
        };
        let mut refresher = DisplayRefresher::new(provider);

        assert!(refresher.tick().is_err());
        // The period is not read, so there is no delay to arm a timer with
        assert_eq!(refresher.provider_mut().calls, ["reading"]);
    }
}
