// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the device aggregator's merge rules.

use chrono::{TimeZone, Utc};
use espdash_lib::error::Warning;
use espdash_lib::state::{Gpio, RETENTION_CAP};
use espdash_lib::telemetry::{
    DeviceMessage, GpioStateMessage, PinReading, SettingsMessage, StatusMessage, Topic,
    WifiNetwork, WifiScanMessage,
};
use espdash_lib::types::{DeviceStatus, EncryptionType, PinState};
use espdash_lib::{Device, DeviceAggregator, Outcome};

fn gpio_message(readings: &[(u8, PinState)], timestamp: i64) -> GpioStateMessage {
    GpioStateMessage {
        gpio_states: readings
            .iter()
            .map(|&(pin, state)| PinReading::new(pin, state))
            .collect(),
        timestamp,
    }
}

fn wifi_message(timestamp: i64) -> WifiScanMessage {
    WifiScanMessage {
        networks: vec![WifiNetwork {
            ssid: format!("net-{timestamp}"),
            rssi: -60,
            encryption: EncryptionType::Wpa2Psk,
        }],
        timestamp,
    }
}

fn status_message(status: DeviceStatus, readings: &[(u8, PinState)]) -> StatusMessage {
    StatusMessage {
        status,
        ssid: Some("home".to_string()),
        rssi: Some(-55),
        uptime: Some(120),
        timestamp: 1_700_000_000,
        device_name: None,
        gpio_states: readings
            .iter()
            .map(|&(pin, state)| PinReading::new(pin, state))
            .collect(),
    }
}

fn settings_message(name: &str) -> SettingsMessage {
    SettingsMessage {
        device_name: name.to_string(),
        wifi_scan_interval: 60_000,
        gpio_configs: vec![],
        timestamp: 1_700_000_000,
    }
}

fn pin_states(device: &Device) -> Vec<(u8, PinState)> {
    device
        .gpios()
        .iter()
        .map(|g| (g.pin_number, g.state))
        .collect()
}

// ============================================================================
// GPIO merging
// ============================================================================

#[test]
fn gpio_pin_is_updated_in_place() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");

    aggregator.record_gpio_state_message("d1", gpio_message(&[(2, PinState::High)], 1));
    aggregator.record_gpio_state_message("d1", gpio_message(&[(4, PinState::Low)], 2));
    aggregator.record_gpio_state_message("d1", gpio_message(&[(2, PinState::Low)], 3));

    let device = aggregator.get_device("d1").unwrap();
    assert_eq!(
        pin_states(&device),
        vec![(2, PinState::Low), (4, PinState::Low)]
    );
}

#[test]
fn latest_reading_per_pin_wins() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");

    let sequence: &[&[(u8, PinState)]] = &[
        &[(2, PinState::High), (16, PinState::High)],
        &[(16, PinState::Low)],
        &[(4, PinState::High), (2, PinState::Low)],
        &[(16, PinState::High), (4, PinState::Low)],
    ];
    for readings in sequence {
        let readings: Vec<PinReading> = readings
            .iter()
            .map(|&(pin, state)| PinReading::new(pin, state))
            .collect();
        aggregator.apply_gpio_states("d1", &readings);
    }

    let device = aggregator.get_device("d1").unwrap();
    assert_eq!(device.gpio(2).unwrap().state, PinState::Low);
    assert_eq!(device.gpio(4).unwrap().state, PinState::Low);
    assert_eq!(device.gpio(16).unwrap().state, PinState::High);
    assert_eq!(device.gpios().len(), 3);
}

#[test]
fn gpio_state_does_not_touch_metadata() {
    let aggregator = DeviceAggregator::new();
    aggregator.upsert_device(
        Device::new("d1").with_gpio(
            Gpio::new(2, PinState::Low)
                .with_group("lights")
                .with_label("Porch"),
        ),
    );

    aggregator.record_gpio_state_message("d1", gpio_message(&[(2, PinState::High)], 1));

    let device = aggregator.get_device("d1").unwrap();
    let gpio = device.gpio(2).unwrap();
    assert_eq!(gpio.state, PinState::High);
    assert_eq!(gpio.group, "lights");
    assert_eq!(gpio.label, "Porch");
}

// ============================================================================
// Message retention
// ============================================================================

#[test]
fn wifi_log_keeps_ten_newest_first() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");

    for ts in 1..=12 {
        aggregator.record_wifi_scan_message("d1", wifi_message(ts));
    }

    let device = aggregator.get_device("d1").unwrap();
    let log = device.messages(Topic::Wifi).unwrap();
    let stamps: Vec<i64> = log.iter().map(|m| m.timestamp()).collect();
    assert_eq!(log.len(), RETENTION_CAP);
    assert_eq!(stamps, vec![12, 11, 10, 9, 8, 7, 6, 5, 4, 3]);
}

#[test]
fn retention_is_per_topic() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");

    for ts in 1..=15 {
        aggregator.record_gpio_state_message("d1", gpio_message(&[(2, PinState::High)], ts));
    }
    aggregator.record_wifi_scan_message("d1", wifi_message(100));

    let device = aggregator.get_device("d1").unwrap();
    assert_eq!(device.messages(Topic::Gpio).unwrap().len(), RETENTION_CAP);
    assert_eq!(device.messages(Topic::Wifi).unwrap().len(), 1);
    assert_eq!(
        device.latest_message(Topic::Gpio).map(|m| m.timestamp()),
        Some(15)
    );
    assert!(device.messages(Topic::Status).is_none());
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn upsert_is_idempotent() {
    let aggregator = DeviceAggregator::new();
    let seen = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let first = Device::new("d1")
        .with_name("Kitchen")
        .with_last_seen(seen)
        .with_gpio(Gpio::new(2, PinState::High));

    assert!(aggregator.upsert_device(first.clone()).is_applied());
    let second = aggregator.upsert_device(Device::new("d1").with_name("Other"));

    assert_eq!(
        second,
        Outcome::Ignored(Warning::DuplicateDevice("d1".to_string()))
    );
    assert_eq!(aggregator.device_count(), 1);
    assert_eq!(aggregator.get_device("d1").unwrap(), first);
}

#[test]
fn unknown_device_mutations_leave_collection_unchanged() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");
    aggregator.record_gpio_state_message("d1", gpio_message(&[(2, PinState::High)], 1));
    let before = aggregator.snapshot();

    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let outcomes = [
        aggregator.rename_device("ghost", "Ghost"),
        aggregator.touch_last_seen("ghost", at),
        aggregator.apply_gpio_states("ghost", &[PinReading::new(4, PinState::High)]),
        aggregator.record_status_message(
            "ghost",
            status_message(DeviceStatus::Online, &[(16, PinState::High)]),
        ),
        aggregator.record_wifi_scan_message("ghost", wifi_message(5)),
        aggregator.record_gpio_state_message("ghost", gpio_message(&[(2, PinState::Low)], 2)),
        aggregator.record_settings_message("ghost", settings_message("Ghost")),
        aggregator.record_message("ghost", DeviceMessage::Settings(settings_message("Ghost"))),
        aggregator.receive_message("ghost", at, DeviceMessage::WifiScan(wifi_message(6))),
    ];

    for outcome in outcomes {
        assert_eq!(
            outcome,
            Outcome::Ignored(Warning::UnknownDevice("ghost".to_string()))
        );
    }
    assert!(!aggregator.contains("ghost"));
    assert_eq!(aggregator.snapshot(), before);
}

#[test]
fn ghost_status_creates_nothing() {
    let aggregator = DeviceAggregator::new();

    let outcome = aggregator.record_status_message(
        "ghost",
        status_message(DeviceStatus::Online, &[(16, PinState::High)]),
    );

    assert!(!outcome.is_applied());
    assert_eq!(aggregator.device_count(), 0);
    assert!(aggregator.snapshot().is_empty());
}

// ============================================================================
// Status and snapshots
// ============================================================================

#[test]
fn status_message_merges_embedded_gpio() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");

    aggregator.record_status_message(
        "d1",
        status_message(DeviceStatus::Online, &[(16, PinState::High)]),
    );

    let device = aggregator.get_device("d1").unwrap();
    assert_eq!(device.status(), DeviceStatus::Online);
    assert_eq!(device.gpio(16).unwrap().state, PinState::High);
    assert_eq!(device.messages(Topic::Status).unwrap().len(), 1);
}

#[test]
fn snapshot_round_trips_through_initialize() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");
    aggregator.upsert_device(Device::new("d2").with_name("Garage"));
    aggregator.touch_last_seen("d1", Utc.with_ymd_and_hms(2024, 3, 3, 3, 3, 3).unwrap());
    aggregator.record_gpio_state_message("d1", gpio_message(&[(2, PinState::High)], 1));
    aggregator.record_status_message("d2", status_message(DeviceStatus::Error, &[]));
    for ts in 1..=4 {
        aggregator.record_wifi_scan_message("d1", wifi_message(ts));
    }

    let snapshot = aggregator.snapshot();
    let restored = DeviceAggregator::new();
    assert!(restored.initialize(snapshot.clone()));

    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(restored.list_devices(), aggregator.list_devices());
}

#[test]
fn snapshot_is_detached_from_later_updates() {
    let aggregator = DeviceAggregator::new();
    aggregator.register("d1");
    let snapshot = aggregator.snapshot();

    aggregator.rename_device("d1", "Renamed");

    assert_eq!(snapshot[0].name(), "d1");
    assert_eq!(aggregator.get_device("d1").unwrap().name(), "Renamed");
}
