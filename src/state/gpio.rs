// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GPIO pin record.

use serde::{Deserialize, Serialize};

use crate::types::PinState;

/// Group assigned to pins the user has not categorized.
pub const DEFAULT_GROUP: &str = "none";

/// One GPIO pin of a device.
///
/// `state` follows the device reports. `group` and `label` are display
/// metadata and are only changed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gpio {
    /// The GPIO number.
    pub pin_number: u8,
    /// Last reported level.
    pub state: PinState,
    /// Display group such as `"lamp"` or `"pump"`.
    #[serde(default = "default_group")]
    pub group: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
}

impl Gpio {
    /// Creates a record with the default group and an empty label.
    #[must_use]
    pub fn new(pin_number: u8, state: PinState) -> Self {
        Self {
            pin_number,
            state,
            group: default_group(),
            label: String::new(),
        }
    }

    /// Sets the display group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let gpio = Gpio::new(2, PinState::High);
        assert_eq!(gpio.group, "none");
        assert!(gpio.label.is_empty());
    }

    #[test]
    fn deserialize_fills_missing_metadata() {
        let gpio: Gpio = serde_json::from_str(r#"{"pinNumber":4,"state":"low"}"#).unwrap();
        assert_eq!(gpio, Gpio::new(4, PinState::Low));
    }
}
