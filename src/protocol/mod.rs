// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport plumbing between the broker and the aggregator.
//!
//! Messages flow in one direction through three stages:
//!
//! 1. [`MqttSource`] (feature `mqtt`) receives publishes and queues them as
//!    [`InboundMessage`]s.
//! 2. [`spawn_ingest`] drains the queue on a single task, so the aggregator
//!    sees messages in arrival order.
//! 3. [`TopicRouter`] splits each topic, decodes the payload and applies it.
//!
//! Outbound commands go the other way through
//! [`MqttSource::publish_command`].
//!
//! Any other transport can feed the router by sending [`InboundMessage`]s
//! into the queue returned by [`ingest_channel`].

mod ingest;
#[cfg(feature = "mqtt")]
mod mqtt_source;
mod topic_router;

pub use ingest::{DEFAULT_INGEST_CAPACITY, InboundMessage, ingest_channel, spawn_ingest};
#[cfg(feature = "mqtt")]
pub use mqtt_source::{MqttSource, MqttSourceConfig};
pub use topic_router::{RouterConfig, TopicRouter};
