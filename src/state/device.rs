// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::{DeviceMessage, PinReading, SettingsMessage, Topic};
use crate::types::DeviceStatus;

use super::{Gpio, MessageLog};

/// Canonical state of one device.
///
/// GPIO records keep the order in which pins were first reported and hold at
/// most one entry per pin. Message logs are created on the first message of
/// their topic.
///
/// # Examples
///
/// ```
/// use espdash_lib::state::Device;
/// use espdash_lib::types::DeviceStatus;
///
/// let device = Device::new("kitchen").with_name("Kitchen lights");
/// assert_eq!(device.id(), "kitchen");
/// assert_eq!(device.name(), "Kitchen lights");
/// assert_eq!(device.status(), DeviceStatus::Offline);
/// assert!(device.last_seen().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    id: String,
    name: String,
    #[serde(default)]
    last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    status: DeviceStatus,
    #[serde(default)]
    gpios: Vec<Gpio>,
    #[serde(default)]
    messages: BTreeMap<Topic, MessageLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<SettingsMessage>,
}

impl Device {
    /// Creates a device whose display name is its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            last_seen: None,
            status: DeviceStatus::default(),
            gpios: Vec::new(),
            messages: BTreeMap::new(),
            settings: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds or replaces a GPIO record.
    #[must_use]
    pub fn with_gpio(mut self, gpio: Gpio) -> Self {
        match self.gpios.iter_mut().find(|g| g.pin_number == gpio.pin_number) {
            Some(existing) => *existing = gpio,
            None => self.gpios.push(gpio),
        }
        self
    }

    /// Sets the last-seen time.
    #[must_use]
    pub fn with_last_seen(mut self, at: DateTime<Utc>) -> Self {
        self.last_seen = Some(at);
        self
    }

    /// Returns the unique id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when the device was last heard from.
    #[must_use]
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Returns the health from the most recent status message.
    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// Returns the GPIO records in first-reported order.
    #[must_use]
    pub fn gpios(&self) -> &[Gpio] {
        &self.gpios
    }

    /// Returns the record of one pin.
    #[must_use]
    pub fn gpio(&self, pin: u8) -> Option<&Gpio> {
        self.gpios.iter().find(|g| g.pin_number == pin)
    }

    /// Returns the message log of a topic, if any message was recorded.
    #[must_use]
    pub fn messages(&self, topic: Topic) -> Option<&MessageLog> {
        self.messages.get(&topic)
    }

    /// Returns the newest message of a topic.
    #[must_use]
    pub fn latest_message(&self, topic: Topic) -> Option<&DeviceMessage> {
        self.messages.get(&topic).and_then(MessageLog::latest)
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> Option<&SettingsMessage> {
        self.settings.as_ref()
    }

    /// Sets the display name. Returns `true` if it changed.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.name == name {
            return false;
        }
        self.name = name;
        true
    }

    /// Sets the last-seen time unconditionally.
    pub fn set_last_seen(&mut self, at: DateTime<Utc>) {
        self.last_seen = Some(at);
    }

    /// Sets the reported health.
    pub fn set_status(&mut self, status: DeviceStatus) {
        self.status = status;
    }

    /// Replaces the settings.
    pub fn set_settings(&mut self, settings: SettingsMessage) {
        self.settings = Some(settings);
    }

    /// Merges reported pin levels into the GPIO records.
    ///
    /// Known pins only change `state`; unknown pins are appended with the
    /// default group and an empty label. Returns the readings that changed a
    /// level or created a record.
    pub fn apply_gpio_states(&mut self, readings: &[PinReading]) -> Vec<PinReading> {
        let mut changed = Vec::new();
        for reading in readings {
            match self.gpios.iter_mut().find(|g| g.pin_number == reading.pin_number) {
                Some(gpio) => {
                    if gpio.state != reading.state {
                        gpio.state = reading.state;
                        changed.push(*reading);
                    }
                }
                None => {
                    self.gpios.push(Gpio::new(reading.pin_number, reading.state));
                    changed.push(*reading);
                }
            }
        }
        changed
    }

    /// Sets display metadata of a known pin. Returns `false` if the pin has
    /// no record.
    pub fn set_gpio_metadata(
        &mut self,
        pin: u8,
        group: impl Into<String>,
        label: impl Into<String>,
    ) -> bool {
        let Some(gpio) = self.gpios.iter_mut().find(|g| g.pin_number == pin) else {
            return false;
        };
        gpio.group = group.into();
        gpio.label = label.into();
        true
    }

    /// Prepends a message to the log of its topic.
    pub fn push_message(&mut self, message: DeviceMessage) {
        self.messages.entry(message.topic()).or_default().push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{StatusMessage, WifiScanMessage};
    use crate::types::PinState;

    #[test]
    fn new_device_defaults() {
        let device = Device::new("d1");
        assert_eq!(device.name(), "d1");
        assert!(device.gpios().is_empty());
        assert!(device.messages(Topic::Status).is_none());
        assert!(device.settings().is_none());
    }

    #[test]
    fn gpio_merge_updates_in_place() {
        let mut device = Device::new("d1");
        device.apply_gpio_states(&[PinReading::new(2, PinState::High)]);
        device.apply_gpio_states(&[PinReading::new(4, PinState::Low)]);
        device.apply_gpio_states(&[PinReading::new(2, PinState::Low)]);

        assert_eq!(
            device.gpios(),
            &[Gpio::new(2, PinState::Low), Gpio::new(4, PinState::Low)]
        );
    }

    #[test]
    fn gpio_merge_keeps_metadata() {
        let mut device = Device::new("d1").with_gpio(
            Gpio::new(16, PinState::Low)
                .with_group("pump")
                .with_label("Water"),
        );
        device.apply_gpio_states(&[PinReading::new(16, PinState::High)]);

        let gpio = device.gpio(16).unwrap();
        assert_eq!(gpio.state, PinState::High);
        assert_eq!(gpio.group, "pump");
        assert_eq!(gpio.label, "Water");
    }

    #[test]
    fn gpio_merge_reports_changes_only() {
        let mut device = Device::new("d1");
        let first = device.apply_gpio_states(&[
            PinReading::new(2, PinState::High),
            PinReading::new(4, PinState::Low),
        ]);
        assert_eq!(first.len(), 2);

        let second = device.apply_gpio_states(&[
            PinReading::new(2, PinState::High),
            PinReading::new(4, PinState::High),
        ]);
        assert_eq!(second, vec![PinReading::new(4, PinState::High)]);
    }

    #[test]
    fn metadata_on_unknown_pin() {
        let mut device = Device::new("d1");
        assert!(!device.set_gpio_metadata(2, "lamp", "Desk"));
    }

    #[test]
    fn messages_are_logged_per_topic() {
        let mut device = Device::new("d1");
        device.push_message(DeviceMessage::WifiScan(WifiScanMessage {
            networks: vec![],
            timestamp: 1,
        }));
        device.push_message(DeviceMessage::Status(StatusMessage {
            status: DeviceStatus::Online,
            ssid: None,
            rssi: None,
            uptime: None,
            timestamp: 2,
            device_name: None,
            gpio_states: vec![],
        }));

        assert_eq!(device.messages(Topic::Wifi).map(MessageLog::len), Some(1));
        assert_eq!(device.messages(Topic::Status).map(MessageLog::len), Some(1));
        assert!(device.messages(Topic::Gpio).is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let device = Device::new("d1").with_gpio(Gpio::new(2, PinState::High));
        let json = serde_json::to_value(&device).unwrap();

        assert_eq!(json["id"], "d1");
        assert!(json["lastSeen"].is_null());
        assert_eq!(json["gpios"][0]["pinNumber"], 2);
        assert!(json.get("settings").is_none());
    }
}
