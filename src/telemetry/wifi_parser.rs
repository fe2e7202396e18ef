// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for `wifi/scan` messages.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::EncryptionType;

/// One network observed during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    /// Network name.
    pub ssid: String,
    /// Signal strength in dBm.
    pub rssi: i32,
    /// Authentication mode.
    pub encryption: EncryptionType,
}

/// Parsed `wifi/scan` message.
///
/// A failed or empty scan is published as `{"networks":[]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiScanMessage {
    /// Networks in the order the device reported them.
    pub networks: Vec<WifiNetwork>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl WifiScanMessage {
    /// Returns the network with the strongest signal.
    #[must_use]
    pub fn strongest(&self) -> Option<&WifiNetwork> {
        self.networks.iter().max_by_key(|n| n.rssi)
    }
}

#[derive(Debug, Deserialize)]
struct RawWifiScan {
    #[serde(default)]
    networks: Option<Vec<RawNetwork>>,
    #[serde(default)]
    timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawNetwork {
    #[serde(default)]
    ssid: Option<String>,
    #[serde(default)]
    rssi: Option<i32>,
    #[serde(default)]
    encryption: Option<u8>,
}

impl RawNetwork {
    fn into_network(self) -> Result<WifiNetwork, DecodeError> {
        Ok(WifiNetwork {
            ssid: self.ssid.ok_or(DecodeError::MissingField("ssid"))?,
            rssi: self.rssi.ok_or(DecodeError::MissingField("rssi"))?,
            encryption: self
                .encryption
                .map(EncryptionType::from)
                .ok_or(DecodeError::MissingField("encryption"))?,
        })
    }
}

pub(crate) fn parse_wifi_scan(payload: &[u8]) -> Result<WifiScanMessage, DecodeError> {
    let raw: RawWifiScan = serde_json::from_slice(payload)?;
    let networks = raw
        .networks
        .ok_or(DecodeError::MissingField("networks"))?
        .into_iter()
        .map(RawNetwork::into_network)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WifiScanMessage {
        networks,
        timestamp: raw.timestamp.unwrap_or_else(super::now_millis),
    })
}
