//! Wire formats: how a [`LogEvent`] becomes a request body.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

use crate::controls::SendControls;
use crate::metadata::{Metadata, MetadataValue};
use crate::normalize::{format_timestamp, is_reserved, normalize_metadata};
use crate::record::LogEvent;
use crate::severity::Severity;
use crate::transport::Headers;

/// Encoding of log events for one kind of endpoint.
pub trait WireFormat: Send + Sync + 'static {
    /// Turn merged handler and call metadata into the event's metadata.
    fn project_metadata(&self, metadata: &Metadata) -> Map<String, Value>;

    /// Encode a complete event as a JSON request body.
    fn encode(&self, event: &LogEvent) -> Result<Vec<u8>, serde_json::Error>;

    /// Extra headers sent with every request.
    fn headers(&self) -> &Headers;

    /// Whether metadata shares the top-level object with envelope fields,
    /// making collisions with reserved keys possible.
    fn reserves_keys(&self) -> bool {
        false
    }

    /// Process-wide controls shared by every handler of this format that
    /// was not given its own.
    fn global_controls() -> Arc<SendControls>
    where
        Self: Sized;
}

/// Generic JSON log collector. Metadata is flattened into the top-level
/// object next to the envelope fields.
#[derive(Debug, Clone, Default)]
pub struct JsonCollector {
    headers: Headers,
}

impl JsonCollector {
    pub fn new(headers: Headers) -> Self {
        Self { headers }
    }
}

impl WireFormat for JsonCollector {
    fn project_metadata(&self, metadata: &Metadata) -> Map<String, Value> {
        normalize_metadata(metadata)
    }

    fn encode(&self, event: &LogEvent) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&CollectorEnvelope(event))
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn reserves_keys(&self) -> bool {
        true
    }

    fn global_controls() -> Arc<SendControls> {
        static CONTROLS: OnceLock<Arc<SendControls>> = OnceLock::new();
        Arc::clone(CONTROLS.get_or_init(|| SendControls::shared(Severity::Info)))
    }
}

struct CollectorEnvelope<'a>(&'a LogEvent);

impl Serialize for CollectorEnvelope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let event = self.0;
        let mut map = serializer.serialize_map(None)?;
        if let Some(metadata) = &event.metadata {
            // Envelope fields always win over metadata with the same key.
            for (key, value) in metadata.iter().filter(|(key, _)| !is_reserved(key)) {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("label", &event.label)?;
        map.serialize_entry("level", &event.level)?;
        map.serialize_entry("message", &event.message)?;
        if let Some(location) = &event.location {
            map.serialize_entry("sourceLocation", location)?;
        }
        map.serialize_entry("timestamp", &format_timestamp(&event.timestamp))?;
        map.end()
    }
}

/// Slack incoming webhook.
///
/// Only plain text metadata values are forwarded; everything else is
/// dropped so the message renders as flat `key: value` pairs.
#[derive(Debug, Clone, Default)]
pub struct SlackWebhook {
    headers: Headers,
}

impl SlackWebhook {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Serialize)]
struct SlackPayload<'a> {
    level: &'a str,
    message: &'a str,
    metadata: &'a Map<String, Value>,
}

impl WireFormat for SlackWebhook {
    fn project_metadata(&self, metadata: &Metadata) -> Map<String, Value> {
        metadata
            .iter()
            .filter_map(|(key, value)| match value {
                MetadataValue::Text(text) => Some((key.clone(), Value::String(text.clone()))),
                _ => None,
            })
            .collect()
    }

    fn encode(&self, event: &LogEvent) -> Result<Vec<u8>, serde_json::Error> {
        let empty = Map::new();
        serde_json::to_vec(&SlackPayload {
            level: &event.level,
            message: &event.message,
            metadata: event.metadata.as_ref().unwrap_or(&empty),
        })
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn global_controls() -> Arc<SendControls> {
        static CONTROLS: OnceLock<Arc<SendControls>> = OnceLock::new();
        Arc::clone(CONTROLS.get_or_init(|| SendControls::shared(Severity::Info)))
    }
}
