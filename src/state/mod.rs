// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device records.
//!
//! A [`Device`] is the canonical view of one board: its identity, health,
//! the GPIO pins it has reported and a bounded [`MessageLog`] per topic.
//! Records are plain values; sharing and synchronization are the job of
//! [`DeviceAggregator`](crate::manager::DeviceAggregator).
//!
//! # Examples
//!
//! ```
//! use espdash_lib::state::Device;
//! use espdash_lib::telemetry::PinReading;
//! use espdash_lib::types::PinState;
//!
//! let mut device = Device::new("d1");
//! device.apply_gpio_states(&[PinReading::new(2, PinState::High)]);
//! device.apply_gpio_states(&[PinReading::new(2, PinState::Low)]);
//!
//! assert_eq!(device.gpios().len(), 1);
//! assert_eq!(device.gpio(2).map(|g| g.state), Some(PinState::Low));
//! ```

mod device;
mod gpio;
mod message_log;

pub use device::Device;
pub use gpio::{DEFAULT_GROUP, Gpio};
pub use message_log::{MessageLog, RETENTION_CAP};
