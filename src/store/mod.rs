// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot persistence.
//!
//! A snapshot is the whole device collection encoded as a JSON array with
//! camelCase field names. Stores only move opaque bytes; encoding lives in
//! [`encode_snapshot`] and [`decode_snapshot`].
//!
//! # Examples
//!
//! ```
//! use espdash_lib::manager::DeviceAggregator;
//! use espdash_lib::store::MemoryStore;
//!
//! let store = MemoryStore::new();
//!
//! let aggregator = DeviceAggregator::new();
//! aggregator.register("d1");
//! aggregator.persist(&store).unwrap();
//!
//! let restored = DeviceAggregator::new();
//! restored.restore(&store);
//! assert!(restored.contains("d1"));
//! ```

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::error::StoreError;
use crate::state::Device;

/// Byte-oriented backing storage for snapshots.
pub trait SnapshotStore {
    /// Loads the last saved snapshot, or `None` if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage cannot be read.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the storage cannot be written.
    fn save(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Encodes a device collection.
///
/// # Errors
///
/// Returns [`StoreError::Format`] if serialization fails.
pub fn encode_snapshot(devices: &[Device]) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(devices)?)
}

/// Decodes a device collection.
///
/// # Errors
///
/// Returns [`StoreError::Format`] if `bytes` is not a valid snapshot.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<Device>, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Gpio;
    use crate::types::PinState;

    #[test]
    fn snapshot_field_names() {
        let devices = vec![Device::new("d1").with_gpio(Gpio::new(2, PinState::High))];
        let bytes = encode_snapshot(&devices).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["id"], "d1");
        assert_eq!(json[0]["status"], "offline");
        assert_eq!(json[0]["gpios"][0]["pinNumber"], 2);
        assert_eq!(json[0]["gpios"][0]["group"], "none");
    }

    #[test]
    fn decode_accepts_minimal_device() {
        let devices = decode_snapshot(br#"[{"id":"d1","name":"Desk"}]"#).unwrap();
        assert_eq!(devices, vec![Device::new("d1").with_name("Desk")]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_snapshot(b"{}"),
            Err(StoreError::Format(_))
        ));
    }
}
