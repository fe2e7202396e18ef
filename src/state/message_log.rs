// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded per-topic message history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::telemetry::DeviceMessage;

/// Maximum number of messages kept per topic per device.
pub const RETENTION_CAP: usize = 10;

/// Most recent messages of one topic, newest first.
///
/// Recency is insertion order. Payload timestamps are not consulted, so an
/// out-of-order delivery still lands at the front.
///
/// # Examples
///
/// ```
/// use espdash_lib::state::{MessageLog, RETENTION_CAP};
/// use espdash_lib::telemetry::{DeviceMessage, WifiScanMessage};
///
/// let mut log = MessageLog::new();
/// for ts in 1..=12 {
///     log.push(DeviceMessage::WifiScan(WifiScanMessage { networks: vec![], timestamp: ts }));
/// }
///
/// assert_eq!(log.len(), RETENTION_CAP);
/// assert_eq!(log.latest().map(DeviceMessage::timestamp), Some(12));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "VecDeque<DeviceMessage>", into = "VecDeque<DeviceMessage>")]
pub struct MessageLog {
    entries: VecDeque<DeviceMessage>,
}

impl MessageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a message, dropping the oldest entries beyond the cap.
    pub fn push(&mut self, message: DeviceMessage) {
        self.entries.push_front(message);
        self.entries.truncate(RETENTION_CAP);
    }

    /// Returns the newest message.
    #[must_use]
    pub fn latest(&self) -> Option<&DeviceMessage> {
        self.entries.front()
    }

    /// Iterates messages newest first.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceMessage> {
        self.entries.iter()
    }

    /// Returns the number of retained messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no message has been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<VecDeque<DeviceMessage>> for MessageLog {
    fn from(mut entries: VecDeque<DeviceMessage>) -> Self {
        entries.truncate(RETENTION_CAP);
        Self { entries }
    }
}

impl From<MessageLog> for VecDeque<DeviceMessage> {
    fn from(log: MessageLog) -> Self {
        log.entries
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a DeviceMessage;
    type IntoIter = std::collections::vec_deque::Iter<'a, DeviceMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
