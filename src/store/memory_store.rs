// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process snapshot store.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StoreError;

use super::SnapshotStore;

/// Snapshot store held in memory. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `bytes`.
    #[must_use]
    pub fn with_contents(bytes: Vec<u8>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(bytes))),
        }
    }

    /// Returns a copy of the stored bytes.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.slot.lock().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.contents())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        *self.slot.lock() = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_loads_none() {
        assert_eq!(MemoryStore::new().load().unwrap(), None);
    }

    #[test]
    fn save_replaces_contents() {
        let store = MemoryStore::with_contents(b"old".to_vec());
        store.save(b"new").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some(&b"new"[..]));
    }

    #[test]
    fn clones_share_slot() {
        let store = MemoryStore::new();
        store.clone().save(b"x").unwrap();
        assert_eq!(store.contents().as_deref(), Some(&b"x"[..]));
    }
}
