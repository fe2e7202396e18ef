// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wi-Fi authentication modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authentication mode of a scanned Wi-Fi network.
///
/// Values follow the ESP-IDF `wifi_auth_mode_t` numbering, which is what the
/// firmware puts in the `encryption` field of a scan result. Codes this
/// library does not know are kept as [`Other`](Self::Other) so they survive
/// a snapshot round trip.
///
/// # Examples
///
/// ```
/// use espdash_lib::types::EncryptionType;
///
/// assert_eq!(EncryptionType::from(3), EncryptionType::Wpa2Psk);
/// assert!(EncryptionType::from(0).is_open());
/// assert_eq!(u8::from(EncryptionType::Other(42)), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum EncryptionType {
    /// No authentication.
    Open,
    /// WEP.
    Wep,
    /// WPA-PSK.
    WpaPsk,
    /// WPA2-PSK.
    Wpa2Psk,
    /// Mixed WPA/WPA2-PSK.
    WpaWpa2Psk,
    /// WPA2-Enterprise.
    Wpa2Enterprise,
    /// WPA3-PSK.
    Wpa3Psk,
    /// Mixed WPA2/WPA3-PSK.
    Wpa2Wpa3Psk,
    /// WAPI-PSK.
    WapiPsk,
    /// Any other firmware code.
    Other(u8),
}

impl EncryptionType {
    /// Returns `true` for networks without authentication.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl From<u8> for EncryptionType {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Open,
            1 => Self::Wep,
            2 => Self::WpaPsk,
            3 => Self::Wpa2Psk,
            4 => Self::WpaWpa2Psk,
            5 => Self::Wpa2Enterprise,
            6 => Self::Wpa3Psk,
            7 => Self::Wpa2Wpa3Psk,
            8 => Self::WapiPsk,
            other => Self::Other(other),
        }
    }
}

impl From<EncryptionType> for u8 {
    fn from(value: EncryptionType) -> Self {
        match value {
            EncryptionType::Open => 0,
            EncryptionType::Wep => 1,
            EncryptionType::WpaPsk => 2,
            EncryptionType::Wpa2Psk => 3,
            EncryptionType::WpaWpa2Psk => 4,
            EncryptionType::Wpa2Enterprise => 5,
            EncryptionType::Wpa3Psk => 6,
            EncryptionType::Wpa2Wpa3Psk => 7,
            EncryptionType::WapiPsk => 8,
            EncryptionType::Other(code) => code,
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Wep => f.write_str("WEP"),
            Self::WpaPsk => f.write_str("WPA-PSK"),
            Self::Wpa2Psk => f.write_str("WPA2-PSK"),
            Self::WpaWpa2Psk => f.write_str("WPA/WPA2-PSK"),
            Self::Wpa2Enterprise => f.write_str("WPA2-Enterprise"),
            Self::Wpa3Psk => f.write_str("WPA3-PSK"),
            Self::Wpa2Wpa3Psk => f.write_str("WPA2/WPA3-PSK"),
            Self::WapiPsk => f.write_str("WAPI-PSK"),
            Self::Other(code) => write!(f, "unknown ({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_variants() {
        assert_eq!(EncryptionType::from(0), EncryptionType::Open);
        assert_eq!(EncryptionType::from(6), EncryptionType::Wpa3Psk);
        assert_eq!(EncryptionType::from(8), EncryptionType::WapiPsk);
    }

    #[test]
    fn unknown_code_is_preserved() {
        let enc = EncryptionType::from(200);
        assert_eq!(enc, EncryptionType::Other(200));
        assert_eq!(u8::from(enc), 200);
    }

    #[test]
    fn serializes_as_firmware_code() {
        assert_eq!(serde_json::to_string(&EncryptionType::Wpa2Psk).unwrap(), "3");
        let parsed: EncryptionType = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, EncryptionType::WpaWpa2Psk);
    }

    #[test]
    fn display() {
        assert_eq!(EncryptionType::Wpa2Psk.to_string(), "WPA2-PSK");
        assert_eq!(EncryptionType::Other(9).to_string(), "unknown (9)");
    }
}
