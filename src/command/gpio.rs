// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GPIO control command.

use std::collections::BTreeMap;

use crate::command::Command;
use crate::error::InvalidPinError;
use crate::pin_registry::PinRegistry;
use crate::telemetry::{SubTopic, Topic};
use crate::types::PinState;

/// Command to drive one or more GPIO pins.
///
/// The firmware answers with a fresh `gpio/state` report, so the aggregator
/// learns the new levels through the normal ingest path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpioSetCommand {
    pins: BTreeMap<u8, PinState>,
}

impl GpioSetCommand {
    /// Creates a command that sets no pin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a command for one pin.
    #[must_use]
    pub fn single(pin: u8, state: PinState) -> Self {
        Self::new().with_pin(pin, state)
    }

    /// Adds a pin. A repeated pin keeps the last state.
    #[must_use]
    pub fn with_pin(mut self, pin: u8, state: PinState) -> Self {
        self.pins.insert(pin, state);
        self
    }

    /// Returns `true` if no pin is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Checks every pin against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPinError`] for the first unsupported pin.
    pub fn validate(&self, registry: &PinRegistry) -> Result<(), InvalidPinError> {
        for &pin in self.pins.keys() {
            registry.validate(u32::from(pin))?;
        }
        Ok(())
    }
}

impl Command for GpioSetCommand {
    fn topic_suffix(&self) -> String {
        format!("{}/{}", Topic::Gpio, SubTopic::Set)
    }

    fn payload(&self) -> String {
        let body: BTreeMap<u8, &str> = self
            .pins
            .iter()
            .map(|(&pin, state)| (pin, state.as_command()))
            .collect();
        serde_json::to_string(&body).unwrap_or_default()
    }
}
