// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types reported by devices.
//!
//! # Types
//!
//! - [`PinState`] - Binary GPIO level (low/high)
//! - [`DeviceStatus`] - Reported device health (online/error/offline)
//! - [`EncryptionType`] - Wi-Fi authentication mode of a scanned network

mod device_status;
mod encryption;
mod pin_state;

pub use device_status::DeviceStatus;
pub use encryption::EncryptionType;
pub use pin_state::PinState;
