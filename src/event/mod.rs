// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notifications for the device collection.
//!
//! The [`DeviceAggregator`](crate::manager::DeviceAggregator) publishes a
//! [`DeviceEvent`] on its [`EventBus`] after every mutation that changed
//! state. Events are sent once the state lock is released, so a subscriber
//! may read the aggregator from its handler.
//!
//! # Examples
//!
//! ```
//! use espdash_lib::event::{DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::device_added("d1"));
//! assert_eq!(rx.try_recv().unwrap().device_id(), Some("d1"));
//! ```

mod device_event;
mod event_bus;

pub use device_event::DeviceEvent;
pub use event_bus::EventBus;
