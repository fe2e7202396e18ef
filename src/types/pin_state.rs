// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GPIO pin level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// The binary level of a GPIO pin.
///
/// # Examples
///
/// ```
/// use espdash_lib::types::PinState;
///
/// assert_eq!("ON".parse::<PinState>().unwrap(), PinState::High);
/// assert_eq!("0".parse::<PinState>().unwrap(), PinState::Low);
/// assert_eq!(PinState::High.as_num(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    /// Pin is driven or read low.
    #[default]
    Low,
    /// Pin is driven or read high.
    High,
}

impl PinState {
    /// Returns the numeric level used by the firmware.
    #[must_use]
    pub const fn as_num(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    /// Returns the command keyword understood by the firmware.
    #[must_use]
    pub const fn as_command(self) -> &'static str {
        match self {
            Self::Low => "OFF",
            Self::High => "ON",
        }
    }

    /// Returns the opposite level.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("LOW"),
            Self::High => f.write_str("HIGH"),
        }
    }
}

impl FromStr for PinState {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" | "OFF" | "0" | "FALSE" => Ok(Self::Low),
            "HIGH" | "ON" | "1" | "TRUE" => Ok(Self::High),
            _ => Err(DecodeError::invalid("state", format!("unknown pin state {s:?}"))),
        }
    }
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value { Self::High } else { Self::Low }
    }
}
