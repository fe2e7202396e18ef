// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound device commands.
//!
//! A command is published to `<prefix>/<device_id>/<topic suffix>`.
//!
//! # Available Commands
//!
//! | Command Type | Topic suffix | Payload |
//! |-------------|--------------|---------|
//! | [`GpioSetCommand`] | `gpio/set` | `{"2":"ON","4":"OFF"}` |
//!
//! # Examples
//!
//! ```
//! use espdash_lib::command::{Command, GpioSetCommand};
//! use espdash_lib::types::PinState;
//!
//! let cmd = GpioSetCommand::new()
//!     .with_pin(4, PinState::Low)
//!     .with_pin(2, PinState::High);
//!
//! assert_eq!(cmd.topic_suffix(), "gpio/set");
//! assert_eq!(cmd.payload(), r#"{"2":"ON","4":"OFF"}"#);
//! ```

mod gpio;

pub use gpio::GpioSetCommand;

/// A command that can be published to a device.
pub trait Command {
    /// Returns the part of the topic after `<prefix>/<device_id>/`.
    fn topic_suffix(&self) -> String;

    /// Returns the payload to publish.
    fn payload(&self) -> String;

    /// Returns the full topic for a device under `prefix`.
    fn topic_for(&self, prefix: &str, device_id: &str) -> String {
        format!("{prefix}/{device_id}/{}", self.topic_suffix())
    }
}
