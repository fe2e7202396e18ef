// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-state aggregation.
//!
//! The [`DeviceAggregator`] owns the device collection. It applies decoded
//! messages, bounds their history, and hands out consistent copies for
//! display or persistence.
//!
//! # Overview
//!
//! - **Registration**: devices are created by [`initialize`], [`upsert_device`]
//!   or [`register`] and never removed
//! - **Merging**: each message kind has one mutation that updates the record
//!   and logs the message under its topic
//! - **Reads**: [`snapshot`], [`list_devices`] and [`get_device`] copy under a
//!   read lock
//! - **Events**: every applied change is broadcast via [`subscribe`]
//!
//! [`initialize`]: DeviceAggregator::initialize
//! [`upsert_device`]: DeviceAggregator::upsert_device
//! [`register`]: DeviceAggregator::register
//! [`snapshot`]: DeviceAggregator::snapshot
//! [`list_devices`]: DeviceAggregator::list_devices
//! [`get_device`]: DeviceAggregator::get_device
//! [`subscribe`]: DeviceAggregator::subscribe
//!
//! # Examples
//!
//! ## Event Subscription
//!
//! ```no_run
//! use espdash_lib::event::DeviceEvent;
//! use espdash_lib::manager::DeviceAggregator;
//!
//! # fn example() {
//! let aggregator = DeviceAggregator::new();
//! let mut events = aggregator.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if let DeviceEvent::GpioChanged { device_id, pin, state } = event {
//!             println!("{device_id}: GPIO {pin} is {state}");
//!         }
//!     }
//! });
//! # }
//! ```

mod device_aggregator;
mod outcome;

pub use device_aggregator::DeviceAggregator;
pub use outcome::Outcome;
