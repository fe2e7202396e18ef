// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device aggregator: the single owner of the device collection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::error::{StoreError, Warning};
use crate::event::{DeviceEvent, EventBus};
use crate::state::Device;
use crate::store::{self, SnapshotStore};
use crate::telemetry::{
    DeviceMessage, GpioStateMessage, PinReading, SettingsMessage, StatusMessage, Topic,
    WifiScanMessage,
};

use super::Outcome;

#[derive(Debug, Default)]
struct Inner {
    /// Devices in registration order.
    devices: Vec<Device>,
    /// Device id to position in `devices`. Devices are never removed.
    index: HashMap<String, usize>,
    initialized: bool,
}

impl Inner {
    fn get(&self, id: &str) -> Option<&Device> {
        self.index.get(id).map(|&i| &self.devices[i])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Device> {
        self.index.get(id).map(|&i| &mut self.devices[i])
    }

    fn insert(&mut self, device: Device) -> bool {
        if self.index.contains_key(device.id()) {
            return false;
        }
        self.index.insert(device.id().to_string(), self.devices.len());
        self.devices.push(device);
        true
    }
}

/// Owner of the per-device view of all telemetry.
///
/// The aggregator is a cheap handle: clones share the same collection and
/// event bus. Mutations are serialized under a write lock; reads return
/// copies taken under a read lock, so a caller never observes a
/// half-applied message. No method blocks on I/O.
///
/// Mutations addressed to an unregistered device are dropped, logged and
/// reported as [`Outcome::Ignored`]. They never create a device.
///
/// # Examples
///
/// ```
/// use espdash_lib::manager::DeviceAggregator;
/// use espdash_lib::telemetry::{GpioStateMessage, PinReading};
/// use espdash_lib::types::PinState;
///
/// let aggregator = DeviceAggregator::new();
/// aggregator.register("d1");
///
/// let msg = GpioStateMessage {
///     gpio_states: vec![PinReading::new(2, PinState::High)],
///     timestamp: 1,
/// };
/// assert!(aggregator.record_gpio_state_message("d1", msg).is_applied());
///
/// let device = aggregator.get_device("d1").unwrap();
/// assert_eq!(device.gpio(2).map(|g| g.state), Some(PinState::High));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceAggregator {
    inner: Arc<RwLock<Inner>>,
    event_bus: EventBus,
}

impl DeviceAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty aggregator whose event bus buffers `capacity`
    /// events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            event_bus: EventBus::with_capacity(capacity),
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Installs the initial collection.
    ///
    /// Only the first call per aggregator has an effect; it replaces whatever
    /// was registered before. Later calls return `false`. Within the seed the
    /// first record of a duplicated id wins.
    pub fn initialize(&self, seed: Vec<Device>) -> bool {
        let count = {
            let mut inner = self.inner.write();
            if inner.initialized {
                tracing::debug!("Aggregator already initialized, ignoring seed");
                return false;
            }

            let mut fresh = Inner {
                initialized: true,
                ..Inner::default()
            };
            for device in seed {
                let id = device.id().to_string();
                if !fresh.insert(device) {
                    tracing::warn!(device_id = %id, "Duplicate device in seed, keeping first");
                }
            }
            *inner = fresh;
            inner.devices.len()
        };

        tracing::debug!(device_count = count, "Aggregator initialized");
        self.event_bus
            .publish(DeviceEvent::Initialized { device_count: count });
        true
    }

    /// Returns `true` once [`initialize`](Self::initialize) has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.read().initialized
    }

    /// Adds a device unless its id is already registered.
    ///
    /// An existing record is left untouched.
    pub fn upsert_device(&self, device: Device) -> Outcome {
        let id = device.id().to_string();
        let inserted = self.inner.write().insert(device);

        if inserted {
            tracing::debug!(device_id = %id, "Device registered");
            self.event_bus.publish(DeviceEvent::device_added(id));
            Outcome::Applied
        } else {
            tracing::warn!(device_id = %id, "Device already registered");
            Outcome::Ignored(Warning::DuplicateDevice(id))
        }
    }

    /// Registers a device with default fields.
    pub fn register(&self, id: impl Into<String>) -> Outcome {
        self.upsert_device(Device::new(id))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Changes the display name.
    pub fn rename_device(&self, id: &str, name: impl Into<String>) -> Outcome {
        let name = name.into();
        self.mutate(id, "rename_device", |device| {
            if device.set_name(name.clone()) {
                vec![DeviceEvent::DeviceRenamed {
                    device_id: device.id().to_string(),
                    name,
                }]
            } else {
                Vec::new()
            }
        })
    }

    /// Sets the last-seen time. The latest call wins, even if it is older.
    pub fn touch_last_seen(&self, id: &str, at: DateTime<Utc>) -> Outcome {
        self.mutate(id, "touch_last_seen", |device| {
            device.set_last_seen(at);
            vec![DeviceEvent::LastSeenUpdated {
                device_id: device.id().to_string(),
                at,
            }]
        })
    }

    /// Merges pin levels into the GPIO records.
    ///
    /// Known pins only change `state`. New pins are appended with the default
    /// group and an empty label.
    pub fn apply_gpio_states(&self, id: &str, readings: &[PinReading]) -> Outcome {
        self.mutate(id, "apply_gpio_states", |device| {
            gpio_events(device, readings)
        })
    }

    /// Applies a status message.
    ///
    /// The embedded GPIO snapshot is merged first, then the reported health
    /// is stored and the message is logged.
    pub fn record_status_message(&self, id: &str, msg: StatusMessage) -> Outcome {
        self.mutate(id, "record_status_message", |device| apply_status(device, msg))
    }

    /// Logs a Wi-Fi scan.
    pub fn record_wifi_scan_message(&self, id: &str, msg: WifiScanMessage) -> Outcome {
        self.mutate(id, "record_wifi_scan_message", |device| {
            apply_wifi_scan(device, msg)
        })
    }

    /// Merges a GPIO state vector and logs the message.
    pub fn record_gpio_state_message(&self, id: &str, msg: GpioStateMessage) -> Outcome {
        self.mutate(id, "record_gpio_state_message", |device| {
            apply_gpio_state(device, msg)
        })
    }

    /// Replaces the settings.
    pub fn record_settings_message(&self, id: &str, msg: SettingsMessage) -> Outcome {
        self.mutate(id, "record_settings_message", |device| apply_settings(device, msg))
    }

    /// Applies any decoded message.
    pub fn record_message(&self, id: &str, msg: DeviceMessage) -> Outcome {
        self.mutate(id, "record_message", |device| apply_message(device, msg))
    }

    /// Sets the last-seen time and applies a message in one step.
    ///
    /// Readers see either neither change or both.
    pub fn receive_message(&self, id: &str, at: DateTime<Utc>, msg: DeviceMessage) -> Outcome {
        self.mutate(id, "receive_message", |device| {
            device.set_last_seen(at);
            let mut events = vec![DeviceEvent::LastSeenUpdated {
                device_id: device.id().to_string(),
                at,
            }];
            events.extend(apply_message(device, msg));
            events
        })
    }

    /// Sets the display group and label of a pin the device has reported.
    pub fn set_gpio_metadata(
        &self,
        id: &str,
        pin: u8,
        group: impl Into<String>,
        label: impl Into<String>,
    ) -> Outcome {
        let (group, label) = (group.into(), label.into());
        let mut known_pin = true;
        let outcome = self.mutate(id, "set_gpio_metadata", |device| {
            if device.set_gpio_metadata(pin, group, label) {
                vec![DeviceEvent::GpioMetadataChanged {
                    device_id: device.id().to_string(),
                    pin,
                }]
            } else {
                known_pin = false;
                Vec::new()
            }
        });

        if outcome.is_applied() && !known_pin {
            tracing::warn!(device_id = %id, pin, "Ignoring metadata for unreported pin");
            return Outcome::Ignored(Warning::UnknownPin {
                device_id: id.to_string(),
                pin,
            });
        }
        outcome
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns a point-in-time copy of every device in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Device> {
        self.inner.read().devices.clone()
    }

    /// Returns every device in registration order.
    #[must_use]
    pub fn list_devices(&self) -> Vec<Device> {
        self.snapshot()
    }

    /// Returns a copy of one device.
    #[must_use]
    pub fn get_device(&self, id: &str) -> Option<Device> {
        self.inner.read().get(id).cloned()
    }

    /// Returns `true` if the device is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().index.contains_key(id)
    }

    /// Returns the number of registered devices.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.inner.read().devices.len()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Seeds the aggregator from a stored snapshot.
    ///
    /// A missing, unreadable or unparseable snapshot is logged and treated
    /// as an empty collection. Returns the result of
    /// [`initialize`](Self::initialize).
    pub fn restore(&self, store: &impl SnapshotStore) -> bool {
        let devices = match store.load() {
            Ok(Some(bytes)) => store::decode_snapshot(&bytes).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Discarding unparseable device snapshot");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load device snapshot");
                Vec::new()
            }
        };
        self.initialize(devices)
    }

    /// Writes the current collection to `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be encoded or written.
    pub fn persist(&self, store: &impl SnapshotStore) -> Result<(), StoreError> {
        let bytes = store::encode_snapshot(&self.snapshot())?;
        store.save(&bytes).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to save device snapshot");
        })
    }

    /// Runs `op` against a registered device and publishes the events it
    /// returns once the lock is released.
    fn mutate<F>(&self, id: &str, operation: &'static str, op: F) -> Outcome
    where
        F: FnOnce(&mut Device) -> Vec<DeviceEvent>,
    {
        let events = {
            let mut inner = self.inner.write();
            let Some(device) = inner.get_mut(id) else {
                tracing::warn!(device_id = %id, operation, "Ignoring mutation for unknown device");
                return Outcome::Ignored(Warning::UnknownDevice(id.to_string()));
            };
            op(device)
        };

        for event in events {
            self.event_bus.publish(event);
        }
        Outcome::Applied
    }
}

fn apply_message(device: &mut Device, msg: DeviceMessage) -> Vec<DeviceEvent> {
    match msg {
        DeviceMessage::Status(m) => apply_status(device, m),
        DeviceMessage::WifiScan(m) => apply_wifi_scan(device, m),
        DeviceMessage::GpioState(m) => apply_gpio_state(device, m),
        DeviceMessage::Settings(m) => apply_settings(device, m),
    }
}

fn apply_status(device: &mut Device, msg: StatusMessage) -> Vec<DeviceEvent> {
    let mut events = gpio_events(device, &msg.gpio_states);
    if device.status() != msg.status {
        device.set_status(msg.status);
        events.push(DeviceEvent::StatusChanged {
            device_id: device.id().to_string(),
            status: msg.status,
        });
    }
    device.push_message(DeviceMessage::Status(msg));
    events.push(DeviceEvent::message_recorded(device.id(), Topic::Status));
    events
}

fn apply_wifi_scan(device: &mut Device, msg: WifiScanMessage) -> Vec<DeviceEvent> {
    device.push_message(DeviceMessage::WifiScan(msg));
    vec![DeviceEvent::message_recorded(device.id(), Topic::Wifi)]
}

fn apply_gpio_state(device: &mut Device, msg: GpioStateMessage) -> Vec<DeviceEvent> {
    let mut events = gpio_events(device, &msg.gpio_states);
    device.push_message(DeviceMessage::GpioState(msg));
    events.push(DeviceEvent::message_recorded(device.id(), Topic::Gpio));
    events
}

fn apply_settings(device: &mut Device, msg: SettingsMessage) -> Vec<DeviceEvent> {
    device.set_settings(msg);
    vec![DeviceEvent::SettingsChanged {
        device_id: device.id().to_string(),
    }]
}

fn gpio_events(device: &mut Device, readings: &[PinReading]) -> Vec<DeviceEvent> {
    device
        .apply_gpio_states(readings)
        .into_iter()
        .map(|r| DeviceEvent::GpioChanged {
            device_id: device.id().to_string(),
            pin: r.pin_number,
            state: r.state,
        })
        .collect()
}
