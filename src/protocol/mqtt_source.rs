// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport feeding the ingest queue.

use std::time::Duration;

use rumqttc::{AsyncClient, ClientError, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeFilter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::command::Command;
use crate::error::ProtocolError;
use crate::pin_registry::HardwareFamily;

use super::InboundMessage;

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(5);
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
const REQUEST_CAPACITY: usize = 32;

/// Connection settings for [`MqttSource`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use espdash_lib::protocol::MqttSourceConfig;
///
/// let config = MqttSourceConfig::new("mqtt://192.168.1.10:1883")
///     .with_credentials("dashboard", "secret")
///     .with_keep_alive(Duration::from_secs(10));
///
/// assert!(config.client_id().starts_with("espdash-"));
/// assert_eq!(config.topic_prefix(), "esp32");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSourceConfig {
    broker: String,
    username: Option<String>,
    password: Option<String>,
    client_id: String,
    keep_alive: Duration,
    reconnect_delay: Duration,
    topic_prefix: String,
    subscriptions: Vec<String>,
}

impl MqttSourceConfig {
    /// Creates a configuration for `broker` (`mqtt://host:port`, `tcp://host:port`
    /// or `host[:port]`).
    ///
    /// The client id defaults to `espdash-` followed by six random hex digits.
    /// Subscriptions default to the inbound topics under `esp32`.
    #[must_use]
    pub fn new(broker: impl Into<String>) -> Self {
        let prefix = HardwareFamily::Esp32.topic_prefix();
        Self {
            broker: broker.into(),
            username: None,
            password: None,
            client_id: generate_client_id(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            topic_prefix: prefix.to_string(),
            subscriptions: vec![
                format!("{prefix}/+/status"),
                format!("{prefix}/+/wifi/scan"),
                format!("{prefix}/+/gpio/state"),
                format!("{prefix}/+/settings/get"),
            ],
        }
    }

    /// Sets broker credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the pause after a connection error before polling again.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the prefix used for outbound commands.
    #[must_use]
    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    /// Replaces the subscription filters, typically with
    /// [`TopicRouter::subscription_filters`](super::TopicRouter::subscription_filters).
    #[must_use]
    pub fn with_subscriptions(mut self, filters: Vec<String>) -> Self {
        self.subscriptions = filters;
        self
    }

    /// Returns the broker address.
    #[must_use]
    pub fn broker(&self) -> &str {
        &self.broker
    }

    /// Returns the client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the reconnect delay.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Returns the command topic prefix.
    #[must_use]
    pub fn topic_prefix(&self) -> &str {
        &self.topic_prefix
    }

    /// Returns the subscription filters.
    #[must_use]
    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    fn mqtt_options(&self) -> Result<MqttOptions, ProtocolError> {
        let (host, port) = parse_mqtt_url(&self.broker)?;
        let mut options = MqttOptions::new(&self.client_id, host, port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            options.set_credentials(username, password);
        }
        Ok(options)
    }
}

/// Live MQTT connection forwarding device publishes to an ingest queue.
///
/// Subscriptions are (re)issued on every broker acknowledgment, so they
/// survive reconnects. After a connection error the event loop waits the
/// configured delay and polls again, which makes `rumqttc` reconnect.
///
/// The event loop never waits on the ingest queue: publishes arriving while
/// it is full are logged and dropped.
///
/// # Examples
///
/// ```no_run
/// use espdash_lib::manager::DeviceAggregator;
/// use espdash_lib::protocol::{
///     MqttSource, MqttSourceConfig, RouterConfig, TopicRouter, ingest_channel, spawn_ingest,
/// };
///
/// # async fn example() -> Result<(), espdash_lib::error::ProtocolError> {
/// let aggregator = DeviceAggregator::new();
/// let router = TopicRouter::new(aggregator.clone(), RouterConfig::default().with_auto_register(true));
/// let config = MqttSourceConfig::new("mqtt://localhost:1883")
///     .with_subscriptions(router.subscription_filters());
///
/// let (tx, rx) = ingest_channel(128);
/// spawn_ingest(router, rx);
/// let _source = MqttSource::connect(config, tx).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MqttSource {
    client: AsyncClient,
    topic_prefix: String,
    task: JoinHandle<()>,
}

impl MqttSource {
    /// Starts the connection and its event loop task.
    ///
    /// The broker is contacted in the background; this returns as soon as
    /// the event loop is running.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the broker address cannot
    /// be parsed.
    pub async fn connect(
        config: MqttSourceConfig,
        sender: mpsc::Sender<InboundMessage>,
    ) -> Result<Self, ProtocolError> {
        let options = config.mqtt_options()?;
        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

        tracing::debug!(
            broker = %config.broker,
            client_id = %config.client_id,
            "Starting MQTT source"
        );

        let task = tokio::spawn(run_event_loop(
            event_loop,
            client.clone(),
            config.subscriptions,
            sender,
            config.reconnect_delay,
        ));

        Ok(Self {
            client,
            topic_prefix: config.topic_prefix,
            task,
        })
    }

    /// Publishes a command to `<prefix>/<device_id>/<suffix>`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the request cannot be queued.
    pub async fn publish_command<C: Command + Sync>(
        &self,
        device_id: &str,
        command: &C,
    ) -> Result<(), ProtocolError> {
        let topic = command.topic_for(&self.topic_prefix, device_id);
        let payload = command.payload();

        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT command");

        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(ProtocolError::Mqtt)
    }

    /// Returns `true` while the event loop task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Disconnects from the broker and stops the event loop.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Mqtt`] if the disconnect request cannot be
    /// queued.
    pub async fn disconnect(self) -> Result<(), ProtocolError> {
        let result = self.client.disconnect().await.map_err(ProtocolError::Mqtt);
        self.task.abort();
        result
    }
}

async fn run_event_loop(
    mut event_loop: EventLoop,
    client: AsyncClient,
    subscriptions: Vec<String>,
    sender: mpsc::Sender<InboundMessage>,
    reconnect_delay: Duration,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connected");
                if let Err(e) = subscribe_all(&client, &subscriptions) {
                    tracing::error!(
                        filters = subscriptions.len(),
                        error = %e,
                        "Failed to subscribe"
                    );
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::trace!(topic = %publish.topic, len = publish.payload.len(), "Received MQTT message");
                let message = InboundMessage::new(publish.topic, publish.payload.to_vec());
                if !forward(&sender, message) {
                    tracing::debug!("Ingest queue closed, stopping MQTT event loop");
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    retry_in = ?reconnect_delay,
                    "MQTT connection error"
                );
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}

/// Queues every filter as one SUBSCRIBE request.
///
/// The request channel is drained by the same task that calls this, so a
/// per-filter request would overflow it for long filter lists.
fn subscribe_all(client: &AsyncClient, filters: &[String]) -> Result<(), ClientError> {
    if filters.is_empty() {
        return Ok(());
    }
    client.try_subscribe_many(
        filters
            .iter()
            .map(|f| SubscribeFilter::new(f.clone(), QoS::AtLeastOnce)),
    )
}

/// Hands a message to the ingest queue without waiting.
///
/// A full queue drops the message so the poll loop keeps answering
/// keep-alives. Returns `false` once the queue is closed.
fn forward(sender: &mpsc::Sender<InboundMessage>, message: InboundMessage) -> bool {
    match sender.try_send(message) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            tracing::warn!(topic = %dropped.topic, "Ingest queue full, dropping MQTT message");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = match url.rsplit_once(':') {
        Some((h, p)) => {
            let port = p
                .parse()
                .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
            (h, port)
        }
        None => (url, DEFAULT_PORT),
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress(format!("Missing host in {url:?}")));
    }
    Ok((host.to_string(), port))
}

fn generate_client_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("espdash-{}", &hex[..6])
}
