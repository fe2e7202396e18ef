// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot store backed by a JSON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

use super::SnapshotStore;

const APP_DIR: &str = "espdash";
const FILE_NAME: &str = "device_data.json";

/// Snapshot store writing to one file.
///
/// Saves go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous snapshot intact.
///
/// # Examples
///
/// ```no_run
/// use espdash_lib::manager::DeviceAggregator;
/// use espdash_lib::store::FileStore;
///
/// # fn main() -> Result<(), espdash_lib::error::StoreError> {
/// let store = FileStore::default_location()?;
/// let aggregator = DeviceAggregator::new();
/// aggregator.restore(&store);
/// // ...
/// aggregator.persist(&store)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at `<config dir>/espdash/device_data.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoLocation`] if the platform has no
    /// configuration directory.
    pub fn default_location() -> Result<Self, StoreError> {
        let mut path = dirs::config_dir().ok_or(StoreError::NoLocation)?;
        path.push(APP_DIR);
        path.push(FILE_NAME);
        Ok(Self::new(path))
    }

    /// Returns the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                tracing::debug!(path = %self.path.display(), len = bytes.len(), "Loaded snapshot");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No snapshot file, starting empty");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, bytes)?;
        fs::rename(&temp, &self.path)?;

        tracing::debug!(path = %self.path.display(), len = bytes.len(), "Saved snapshot");
        Ok(())
    }
}
