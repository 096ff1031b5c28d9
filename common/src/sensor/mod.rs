// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

mod sensorprovider;
mod devicesensorprovider;
mod dummysensorprovider;
mod periodstepper;

pub mod bme280;

pub use sensorprovider::parse_period;
pub use sensorprovider::Reading;
pub use sensorprovider::SensorError;
pub use sensorprovider::SensorProvider;
pub use sensorprovider::SensorProviderPointer;

pub use devicesensorprovider::DeviceSensorProvider;
pub use dummysensorprovider::DummySensorProvider;
pub use periodstepper::PeriodStepper;
