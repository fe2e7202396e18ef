// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Supported GPIO pins per hardware family.
//!
//! Each [`HardwareFamily`] exposes a static capability set of pins that the
//! firmware drives or reports. A [`PinRegistry`] is a lookup over one such
//! set and is consulted by the message codec to reject payloads that
//! reference pins the board does not expose.
//!
//! # Examples
//!
//! ```
//! use espdash_lib::{HardwareFamily, PinRegistry};
//!
//! let pins = PinRegistry::for_family(HardwareFamily::Esp32);
//! assert!(pins.is_valid_pin(2));
//! assert!(!pins.is_valid_pin(6)); // flash pin
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidPinError;

/// GPIOs usable on an ESP32 without interfering with flash or boot strapping.
const ESP32_PINS: &[u8] = &[2, 4, 16, 17, 18, 19, 21, 22, 23, 25, 26, 27];

/// GPIOs usable on an ESP8266 (`NodeMCU` D0-D8).
const ESP8266_PINS: &[u8] = &[0, 2, 4, 5, 12, 13, 14, 15, 16];

/// A family of microcontroller boards sharing one pin layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareFamily {
    /// Espressif ESP32.
    Esp32,
    /// Espressif ESP8266.
    Esp8266,
}

impl HardwareFamily {
    /// Returns the pins supported by this family.
    #[must_use]
    pub const fn pins(self) -> &'static [u8] {
        match self {
            Self::Esp32 => ESP32_PINS,
            Self::Esp8266 => ESP8266_PINS,
        }
    }

    /// Returns the conventional topic prefix for this family.
    #[must_use]
    pub const fn topic_prefix(self) -> &'static str {
        match self {
            Self::Esp32 => "esp32",
            Self::Esp8266 => "esp8266",
        }
    }
}

impl fmt::Display for HardwareFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Esp32 => f.write_str("ESP32"),
            Self::Esp8266 => f.write_str("ESP8266"),
        }
    }
}

/// Lookup of valid GPIO pin numbers for one hardware family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRegistry {
    family: HardwareFamily,
    pins: BTreeSet<u8>,
}

impl PinRegistry {
    /// Creates a registry holding the built-in pin set of `family`.
    #[must_use]
    pub fn for_family(family: HardwareFamily) -> Self {
        Self {
            family,
            pins: family.pins().iter().copied().collect(),
        }
    }

    /// Creates a registry with a board-specific pin set.
    ///
    /// Use this for boards of a known family whose wiring exposes a
    /// different subset of pins than the default.
    #[must_use]
    pub fn custom(family: HardwareFamily, pins: impl IntoIterator<Item = u8>) -> Self {
        Self {
            family,
            pins: pins.into_iter().collect(),
        }
    }

    /// Returns the hardware family of this registry.
    #[must_use]
    pub fn family(&self) -> HardwareFamily {
        self.family
    }

    /// Returns `true` if `pin` is supported.
    #[must_use]
    pub fn is_valid_pin(&self, pin: u32) -> bool {
        u8::try_from(pin).is_ok_and(|p| self.pins.contains(&p))
    }

    /// Validates a pin number and narrows it to `u8`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPinError`] if the pin is not in the set.
    pub fn validate(&self, pin: u32) -> Result<u8, InvalidPinError> {
        match u8::try_from(pin) {
            Ok(p) if self.pins.contains(&p) => Ok(p),
            _ => Err(InvalidPinError {
                pin,
                family: self.family,
            }),
        }
    }

    /// Iterates the supported pins in ascending order.
    pub fn pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.pins.iter().copied()
    }
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::for_family(HardwareFamily::Esp32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esp32_accepts_firmware_pins() {
        let registry = PinRegistry::for_family(HardwareFamily::Esp32);
        for pin in [2, 4, 16, 17, 18, 19, 21, 22, 23, 25, 26, 27] {
            assert!(registry.is_valid_pin(pin), "pin {pin} should be valid");
        }
    }

    #[test]
    fn esp32_rejects_flash_and_boot_pins() {
        let registry = PinRegistry::for_family(HardwareFamily::Esp32);
        for pin in [0, 1, 3, 5, 6, 11, 12, 14, 15] {
            assert!(!registry.is_valid_pin(pin), "pin {pin} should be invalid");
        }
    }

    #[test]
    fn out_of_range_pin_is_invalid() {
        let registry = PinRegistry::default();
        assert!(!registry.is_valid_pin(258));
        assert_eq!(
            registry.validate(258),
            Err(InvalidPinError {
                pin: 258,
                family: HardwareFamily::Esp32
            })
        );
    }

    #[test]
    fn validate_narrows_valid_pin() {
        let registry = PinRegistry::default();
        assert_eq!(registry.validate(27), Ok(27));
    }

    #[test]
    fn families_differ() {
        let esp8266 = PinRegistry::for_family(HardwareFamily::Esp8266);
        assert!(esp8266.is_valid_pin(5));
        assert!(!PinRegistry::default().is_valid_pin(5));
    }

    #[test]
    fn custom_registry() {
        let registry = PinRegistry::custom(HardwareFamily::Esp32, [2, 4]);
        assert!(registry.is_valid_pin(4));
        assert!(!registry.is_valid_pin(16));
        assert_eq!(registry.pins().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn topic_prefixes() {
        assert_eq!(HardwareFamily::Esp32.topic_prefix(), "esp32");
        assert_eq!(HardwareFamily::Esp8266.topic_prefix(), "esp8266");
    }
}
