// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport topic routing into the aggregator.
//!
//! The [`TopicRouter`] turns a raw transport message into an aggregator
//! mutation.
//!
//! # Architecture
//!
//! ```text
//! MQTT Message: esp32/kitchen/gpio/state → {"gpio_states":{"2":1}}
//!                     ↓
//!             TopicRouter.route()
//!                     ↓
//!     prefix "esp32" → PinRegistry(ESP32)
//!                     ↓
//!     telemetry::decode(Gpio, Some(State), payload)
//!                     ↓
//!     aggregator.receive_message("kitchen", now, GpioState(..))
//! ```

use std::collections::BTreeMap;

use chrono::Utc;

use crate::error::RouteError;
use crate::manager::{DeviceAggregator, Outcome};
use crate::pin_registry::{HardwareFamily, PinRegistry};
use crate::telemetry::{self, SubTopic, Topic};

const INBOUND_TOPICS: [Topic; 4] = [Topic::Status, Topic::Wifi, Topic::Gpio, Topic::Settings];

/// Router configuration.
///
/// # Examples
///
/// ```
/// use espdash_lib::{HardwareFamily, PinRegistry};
/// use espdash_lib::protocol::RouterConfig;
///
/// let config = RouterConfig::default()
///     .with_family("esp8266", HardwareFamily::Esp8266)
///     .with_registry("lab", PinRegistry::custom(HardwareFamily::Esp32, [2, 4]))
///     .with_auto_register(true);
///
/// assert_eq!(config.prefixes().count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RouterConfig {
    registries: BTreeMap<String, PinRegistry>,
    auto_register: bool,
}

impl RouterConfig {
    /// Creates a configuration without any prefix.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            registries: BTreeMap::new(),
            auto_register: false,
        }
    }

    /// Maps a topic prefix to the built-in pin set of `family`.
    #[must_use]
    pub fn with_family(self, prefix: impl Into<String>, family: HardwareFamily) -> Self {
        self.with_registry(prefix, PinRegistry::for_family(family))
    }

    /// Maps a topic prefix to a specific pin registry.
    #[must_use]
    pub fn with_registry(mut self, prefix: impl Into<String>, registry: PinRegistry) -> Self {
        self.registries.insert(prefix.into(), registry);
        self
    }

    /// Registers unknown devices on their first valid message.
    ///
    /// Off by default: messages from unregistered devices are dropped.
    #[must_use]
    pub fn with_auto_register(mut self, enabled: bool) -> Self {
        self.auto_register = enabled;
        self
    }

    /// Returns `true` if auto-registration is enabled.
    #[must_use]
    pub fn auto_register(&self) -> bool {
        self.auto_register
    }

    /// Iterates the configured prefixes.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.registries.keys().map(String::as_str)
    }

    /// Returns the pin registry for a prefix.
    #[must_use]
    pub fn registry(&self, prefix: &str) -> Option<&PinRegistry> {
        self.registries.get(prefix)
    }
}

impl Default for RouterConfig {
    /// `esp32` mapped to [`HardwareFamily::Esp32`], no auto-registration.
    fn default() -> Self {
        Self::empty().with_family(HardwareFamily::Esp32.topic_prefix(), HardwareFamily::Esp32)
    }
}

/// Routes transport messages to the device aggregator.
///
/// Topics have the shape `<prefix>/<device_id>/<topic>[/<sub_topic>]`. The
/// prefix selects the pin registry used to validate GPIO payloads.
#[derive(Debug, Clone)]
pub struct TopicRouter {
    aggregator: DeviceAggregator,
    config: RouterConfig,
}

impl TopicRouter {
    /// Creates a router feeding `aggregator`.
    #[must_use]
    pub fn new(aggregator: DeviceAggregator, config: RouterConfig) -> Self {
        Self { aggregator, config }
    }

    /// Returns the aggregator this router feeds.
    #[must_use]
    pub fn aggregator(&self) -> &DeviceAggregator {
        &self.aggregator
    }

    /// Returns the router configuration.
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Routes one transport message.
    ///
    /// A decoded message refreshes the device's last-seen time and is
    /// recorded under one write lock, so readers never see one without the
    /// other. Unregistered devices are ignored unless auto-registration
    /// is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the topic cannot be parsed, names an
    /// unknown prefix, topic or sub-topic, or if the payload is rejected by
    /// the codec. State is unchanged in every error case.
    pub fn route(&self, topic: &str, payload: &[u8]) -> Result<Outcome, RouteError> {
        let parsed = ParsedTopic::parse(topic)?;

        let registry = self.config.registry(parsed.prefix).ok_or_else(|| {
            tracing::trace!(topic = %topic, "Ignoring topic with unknown prefix");
            RouteError::UnknownPrefix(parsed.prefix.to_string())
        })?;
        let message_topic = Topic::from_segment(parsed.topic)
            .ok_or_else(|| RouteError::UnknownTopic(parsed.topic.to_string()))?;
        let sub_topic = parsed
            .sub_topic
            .map(|s| SubTopic::from_segment(s).ok_or_else(|| RouteError::UnknownSubTopic(s.to_string())))
            .transpose()?;

        let message = telemetry::decode(message_topic, sub_topic, payload, registry).map_err(|source| {
            tracing::debug!(
                device = %parsed.device_id,
                topic = %topic,
                error = %source,
                "Rejected payload"
            );
            RouteError::Decode {
                device_id: parsed.device_id.to_string(),
                source,
            }
        })?;

        if self.config.auto_register && !self.aggregator.contains(parsed.device_id) {
            tracing::debug!(device = %parsed.device_id, "Auto-registering device");
            self.aggregator.register(parsed.device_id);
        }

        tracing::debug!(
            device = %parsed.device_id,
            topic = %message_topic,
            "Routing message"
        );
        Ok(self
            .aggregator
            .receive_message(parsed.device_id, Utc::now(), message))
    }

    /// Returns the MQTT subscription filters for every configured prefix.
    ///
    /// For prefix `esp32`: `esp32/+/status`, `esp32/+/wifi/scan`,
    /// `esp32/+/gpio/state` and `esp32/+/settings/get`.
    #[must_use]
    pub fn subscription_filters(&self) -> Vec<String> {
        self.config
            .prefixes()
            .flat_map(|prefix| {
                INBOUND_TOPICS.iter().map(move |topic| match topic.inbound_sub_topic() {
                    Some(sub) => format!("{prefix}/+/{topic}/{sub}"),
                    None => format!("{prefix}/+/{topic}"),
                })
            })
            .collect()
    }
}

/// Parsed transport topic components.
#[derive(Debug, PartialEq, Eq)]
struct ParsedTopic<'a> {
    prefix: &'a str,
    device_id: &'a str,
    topic: &'a str,
    sub_topic: Option<&'a str>,
}

impl<'a> ParsedTopic<'a> {
    /// Expected format: `prefix/device_id/topic[/sub_topic]`
    fn parse(topic: &'a str) -> Result<Self, RouteError> {
        let parts: Vec<&str> = topic.split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(RouteError::InvalidTopic(topic.to_string()));
        }
        match *parts.as_slice() {
            [prefix, device_id, topic] => Ok(Self {
                prefix,
                device_id,
                topic,
                sub_topic: None,
            }),
            [prefix, device_id, topic, sub_topic] => Ok(Self {
                prefix,
                device_id,
                topic,
                sub_topic: Some(sub_topic),
            }),
            _ => Err(RouteError::InvalidTopic(topic.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, Warning};
    use crate::types::{DeviceStatus, PinState};

    fn router() -> TopicRouter {
        let aggregator = DeviceAggregator::new();
        aggregator.register("d1");
        TopicRouter::new(aggregator, RouterConfig::default())
    }

    #[test]
    fn parse_topic_with_sub_topic() {
        let parsed = ParsedTopic::parse("esp32/d1/wifi/scan").unwrap();
        assert_eq!(
            parsed,
            ParsedTopic {
                prefix: "esp32",
                device_id: "d1",
                topic: "wifi",
                sub_topic: Some("scan"),
            }
        );
    }

    #[test]
    fn parse_topic_without_sub_topic() {
        let parsed = ParsedTopic::parse("esp32/d1/status").unwrap();
        assert_eq!(parsed.sub_topic, None);
    }

    #[test]
    fn parse_topic_invalid() {
        for topic in ["invalid", "only/two", "a/b/c/d/e", "esp32//status", "esp32/d1/"] {
            assert!(
                matches!(ParsedTopic::parse(topic), Err(RouteError::InvalidTopic(_))),
                "{topic} should be invalid"
            );
        }
    }

    #[test]
    fn route_gpio_state() {
        let router = router();
        let outcome = router
            .route("esp32/d1/gpio/state", br#"{"gpio_states":{"2":1}}"#)
            .unwrap();
        assert_eq!(outcome, Outcome::Applied);

        let device = router.aggregator().get_device("d1").unwrap();
        assert_eq!(device.gpio(2).map(|g| g.state), Some(PinState::High));
        assert!(device.last_seen().is_some());
    }

    #[test]
    fn route_updates_last_seen_and_log_together() {
        let router = router();
        let mut rx = router.aggregator().subscribe();

        router.route("esp32/d1/wifi/scan", br#"{"networks":[]}"#).unwrap();

        let device = router.aggregator().get_device("d1").unwrap();
        assert!(device.last_seen().is_some());
        assert_eq!(device.messages(Topic::Wifi).map(|log| log.len()), Some(1));
        assert!(matches!(rx.try_recv().unwrap(), crate::event::DeviceEvent::LastSeenUpdated { .. }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            crate::event::DeviceEvent::MessageRecorded { topic: Topic::Wifi, .. }
        ));
    }

    #[test]
    fn route_bare_status() {
        let router = router();
        router.route("esp32/d1/status", b"online").unwrap();
        assert_eq!(
            router.aggregator().get_device("d1").unwrap().status(),
            DeviceStatus::Online
        );
    }

    #[test]
    fn unknown_prefix() {
        let err = router().route("esp8266/d1/status", b"online").unwrap_err();
        assert!(matches!(err, RouteError::UnknownPrefix(p) if p == "esp8266"));
    }

    #[test]
    fn unknown_topic_and_sub_topic() {
        let router = router();
        assert!(matches!(
            router.route("esp32/d1/power", b"{}"),
            Err(RouteError::UnknownTopic(_))
        ));
        assert!(matches!(
            router.route("esp32/d1/gpio/toggle", b"{}"),
            Err(RouteError::UnknownSubTopic(_))
        ));
    }

    #[test]
    fn outbound_command_topic_is_rejected() {
        let err = router()
            .route("esp32/d1/gpio/set", br#"{"2":"ON"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::Decode {
                source: DecodeError::UnsupportedSubTopic { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejected_payload_leaves_state_unchanged() {
        let router = router();
        let before = router.aggregator().snapshot();

        let err = router
            .route("esp32/d1/gpio/state", br#"{"gpio_states":{"6":1}}"#)
            .unwrap_err();
        assert!(matches!(err, RouteError::Decode { ref device_id, .. } if device_id == "d1"));
        assert_eq!(router.aggregator().snapshot(), before);
    }

    #[test]
    fn unknown_device_is_ignored_by_default() {
        let router = router();
        let outcome = router.route("esp32/ghost/status", b"online").unwrap();

        assert_eq!(
            outcome,
            Outcome::Ignored(Warning::UnknownDevice("ghost".to_string()))
        );
        assert!(!router.aggregator().contains("ghost"));
    }

    #[test]
    fn auto_register_creates_device() {
        let router = TopicRouter::new(
            DeviceAggregator::new(),
            RouterConfig::default().with_auto_register(true),
        );

        router.route("esp32/new/status", b"online").unwrap();
        assert!(router.aggregator().contains("new"));
    }

    #[test]
    fn prefix_selects_registry() {
        let aggregator = DeviceAggregator::new();
        aggregator.register("d1");
        let router = TopicRouter::new(
            aggregator,
            RouterConfig::default().with_family("esp8266", HardwareFamily::Esp8266),
        );

        // GPIO 5 exists on ESP8266 only.
        assert!(router.route("esp8266/d1/gpio/state", br#"{"gpio_states":{"5":1}}"#).is_ok());
        assert!(router.route("esp32/d1/gpio/state", br#"{"gpio_states":{"5":1}}"#).is_err());
    }

    #[test]
    fn subscription_filters_cover_inbound_topics() {
        let filters = router().subscription_filters();
        assert_eq!(
            filters,
            vec![
                "esp32/+/status",
                "esp32/+/wifi/scan",
                "esp32/+/gpio/state",
                "esp32/+/settings/get",
            ]
        );
    }
}
