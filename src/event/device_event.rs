// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::Topic;
use crate::types::{DeviceStatus, PinState};

/// Events emitted by the device aggregator.
///
/// # Examples
///
/// ```
/// use espdash_lib::event::DeviceEvent;
/// use espdash_lib::types::PinState;
///
/// let event = DeviceEvent::GpioChanged {
///     device_id: "d1".to_string(),
///     pin: 2,
///     state: PinState::High,
/// };
/// assert!(event.is_state_change());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DeviceEvent {
    /// The collection was seeded.
    Initialized {
        /// Number of devices installed.
        device_count: usize,
    },

    /// A device was registered.
    DeviceAdded {
        /// The registered device.
        device_id: String,
    },

    /// A device's display name changed.
    DeviceRenamed {
        /// The device.
        device_id: String,
        /// The new name.
        name: String,
    },

    /// A device was heard from.
    LastSeenUpdated {
        /// The device.
        device_id: String,
        /// The new last-seen time.
        at: DateTime<Utc>,
    },

    /// A status message changed the reported health.
    StatusChanged {
        /// The device.
        device_id: String,
        /// The new health.
        status: DeviceStatus,
    },

    /// A pin level changed or a pin was reported for the first time.
    GpioChanged {
        /// The device.
        device_id: String,
        /// The pin.
        pin: u8,
        /// The new level.
        state: PinState,
    },

    /// A pin's group or label was edited.
    GpioMetadataChanged {
        /// The device.
        device_id: String,
        /// The pin.
        pin: u8,
    },

    /// A message was prepended to a topic log.
    MessageRecorded {
        /// The device.
        device_id: String,
        /// The log the message went to.
        topic: Topic,
    },

    /// The settings were replaced.
    SettingsChanged {
        /// The device.
        device_id: String,
    },
}

impl DeviceEvent {
    /// Returns the device this event concerns, or `None` for
    /// collection-wide events.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Initialized { .. } => None,
            Self::DeviceAdded { device_id }
            | Self::DeviceRenamed { device_id, .. }
            | Self::LastSeenUpdated { device_id, .. }
            | Self::StatusChanged { device_id, .. }
            | Self::GpioChanged { device_id, .. }
            | Self::GpioMetadataChanged { device_id, .. }
            | Self::MessageRecorded { device_id, .. }
            | Self::SettingsChanged { device_id } => Some(device_id),
        }
    }

    /// Returns `true` for events that change the membership of the
    /// collection.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Initialized { .. } | Self::DeviceAdded { .. })
    }

    /// Returns `true` for events that change a device record.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        !self.is_lifecycle()
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: impl Into<String>) -> Self {
        Self::DeviceAdded {
            device_id: device_id.into(),
        }
    }

    /// Creates a message recorded event.
    #[must_use]
    pub fn message_recorded(device_id: impl Into<String>, topic: Topic) -> Self {
        Self::MessageRecorded {
            device_id: device_id.into(),
            topic,
        }
    }
}
