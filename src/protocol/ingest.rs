// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-writer ingest queue.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::TopicRouter;

/// Default capacity of the ingest channel.
pub const DEFAULT_INGEST_CAPACITY: usize = 128;

/// A raw message as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Full transport topic, e.g. `esp32/kitchen/gpio/state`.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl InboundMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Creates a bounded ingest channel.
#[must_use]
pub fn ingest_channel(
    capacity: usize,
) -> (mpsc::Sender<InboundMessage>, mpsc::Receiver<InboundMessage>) {
    mpsc::channel(capacity)
}

/// Spawns the task that drains `rx` into `router`, one message at a time.
///
/// Routing failures are logged and skipped. The task ends once every sender
/// has been dropped and the queue is empty.
///
/// # Examples
///
/// ```
/// use espdash_lib::manager::DeviceAggregator;
/// use espdash_lib::protocol::{InboundMessage, RouterConfig, TopicRouter, ingest_channel, spawn_ingest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let aggregator = DeviceAggregator::new();
/// aggregator.register("d1");
///
/// let (tx, rx) = ingest_channel(16);
/// let handle = spawn_ingest(TopicRouter::new(aggregator.clone(), RouterConfig::default()), rx);
///
/// tx.send(InboundMessage::new("esp32/d1/status", "online")).await.unwrap();
/// drop(tx);
/// handle.await.unwrap();
///
/// assert!(aggregator.get_device("d1").unwrap().status().is_online());
/// # }
/// ```
pub fn spawn_ingest(router: TopicRouter, mut rx: mpsc::Receiver<InboundMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::debug!("Starting ingest task");
        while let Some(message) = rx.recv().await {
            match router.route(&message.topic, &message.payload) {
                Ok(outcome) => {
                    if let Some(warning) = outcome.warning() {
                        tracing::trace!(topic = %message.topic, %warning, "Message ignored");
                    }
                }
                Err(e) => {
                    tracing::warn!(topic = %message.topic, error = %e, "Failed to route message");
                }
            }
        }
        tracing::debug!("Ingest task stopped");
    })
}
