// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `EspDash` Lib - Device-state aggregation for ESP32 telemetry.
//!
//! ESP32 boards publish status heartbeats, Wi-Fi scans, GPIO levels and
//! their settings over MQTT. This library decodes those payloads, merges them
//! into one record per device and keeps a bounded history of each message
//! kind, ready to be rendered by a dashboard or persisted between runs.
//!
//! # Components
//!
//! - [`telemetry`]: payload codec, one message type per topic
//! - [`DeviceAggregator`]: the device collection, its merge rules and events
//! - [`protocol`]: topic routing, the ingest queue and the MQTT source
//! - [`store`]: snapshot persistence to a file or memory
//! - [`command`]: outbound GPIO commands
//!
//! # Quick Start
//!
//! ```no_run
//! use espdash_lib::DeviceAggregator;
//! use espdash_lib::protocol::{
//!     MqttSource, MqttSourceConfig, RouterConfig, TopicRouter, ingest_channel, spawn_ingest,
//!     DEFAULT_INGEST_CAPACITY,
//! };
//! use espdash_lib::store::FileStore;
//!
//! #[tokio::main]
//! async fn main() -> espdash_lib::Result<()> {
//!     let store = FileStore::default_location()?;
//!     let aggregator = DeviceAggregator::new();
//!     aggregator.restore(&store);
//!
//!     let router = TopicRouter::new(aggregator.clone(), RouterConfig::default().with_auto_register(true));
//!     let config = MqttSourceConfig::new("mqtt://192.168.1.10:1883")
//!         .with_subscriptions(router.subscription_filters());
//!
//!     let (tx, rx) = ingest_channel(DEFAULT_INGEST_CAPACITY);
//!     spawn_ingest(router, rx);
//!     let _source = MqttSource::connect(config, tx).await?;
//!
//!     let mut events = aggregator.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!         aggregator.persist(&store)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Offline Use
//!
//! The aggregator does not need a broker. Decoded messages can be applied
//! directly:
//!
//! ```
//! use espdash_lib::{DeviceAggregator, PinRegistry};
//! use espdash_lib::telemetry::{SubTopic, Topic, decode};
//!
//! let aggregator = DeviceAggregator::new();
//! aggregator.register("kitchen");
//!
//! let msg = decode(
//!     Topic::Gpio,
//!     Some(SubTopic::State),
//!     br#"{"gpio_states":{"2":1}}"#,
//!     &PinRegistry::default(),
//! )
//! .unwrap();
//! assert!(aggregator.record_message("kitchen", msg).is_applied());
//! ```

pub mod command;
pub mod error;
pub mod event;
pub mod manager;
pub mod pin_registry;
pub mod protocol;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod types;

pub use command::{Command, GpioSetCommand};
pub use error::{Error, ProtocolError, Result};
pub use manager::{DeviceAggregator, Outcome};
pub use pin_registry::{HardwareFamily, PinRegistry};
pub use state::Device;
pub use types::{DeviceStatus, EncryptionType, PinState};
