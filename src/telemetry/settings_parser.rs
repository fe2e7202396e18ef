// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for `settings/get` messages.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::pin_registry::PinRegistry;
use crate::state::DEFAULT_GROUP;

/// Display metadata the firmware stores for one pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpioConfig {
    /// The GPIO number.
    pub pin_number: u8,
    /// Group such as `"lamp"` or `"pump"`.
    pub group: String,
    /// Free-form label.
    pub label: String,
}

/// Parsed `settings/get` message.
///
/// Settings are a singleton per device: a newer message replaces the older
/// one entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsMessage {
    /// Name configured on the device.
    pub device_name: String,
    /// Interval between Wi-Fi scans, in milliseconds.
    pub wifi_scan_interval: u64,
    /// Per-pin metadata, possibly empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpio_configs: Vec<GpioConfig>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    #[serde(default)]
    device_name: Option<String>,
    #[serde(default)]
    wifi_scan_interval: Option<u64>,
    #[serde(default)]
    gpio_configs: Option<Vec<RawGpioConfig>>,
    #[serde(default)]
    timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGpioConfig {
    #[serde(default)]
    pin_number: Option<i64>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

pub(crate) fn parse_settings(
    payload: &[u8],
    pins: &PinRegistry,
) -> Result<SettingsMessage, DecodeError> {
    let raw: RawSettings = serde_json::from_slice(payload)?;

    let mut gpio_configs = Vec::new();
    for config in raw.gpio_configs.unwrap_or_default() {
        // Unused slots carry pinNumber -1.
        let Some(pin) = config.pin_number.and_then(|p| u32::try_from(p).ok()) else {
            continue;
        };
        gpio_configs.push(GpioConfig {
            pin_number: pins.validate(pin)?,
            group: config.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            label: config.label.unwrap_or_default(),
        });
    }

    Ok(SettingsMessage {
        device_name: raw.device_name.ok_or(DecodeError::MissingField("deviceName"))?,
        wifi_scan_interval: raw
            .wifi_scan_interval
            .ok_or(DecodeError::MissingField("wifiScanInterval"))?,
        gpio_configs,
        timestamp: raw.timestamp.unwrap_or_else(super::now_millis),
    })
}
