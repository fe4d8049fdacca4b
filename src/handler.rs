use chrono::Utc;
use std::sync::Arc;
use tokio::runtime::Handle;
use url::Url;

use crate::config::{parse_endpoint, validate_headers, HandlerConfig};
use crate::controls::SendControls;
use crate::error::{ConfigError, SendError};
use crate::format::{JsonCollector, SlackWebhook, WireFormat};
use crate::metadata::{Metadata, MetadataValue};
use crate::normalize::reserved_collisions;
use crate::record::{concise_source_path, LogEvent, SourceLocation};
use crate::severity::Severity;
use crate::transport::Transport;

/// Capabilities a logging facade needs from a handler.
pub trait LogHandler: Send + Sync {
    /// Handle one log call. Never blocks on I/O and never fails.
    fn log(
        &self,
        level: Severity,
        message: &str,
        metadata: Option<&Metadata>,
        location: Option<SourceLocation>,
    );

    fn metadata_value(&self, key: &str) -> Option<&MetadataValue>;

    /// Set or, with `None`, remove a handler-level metadata entry.
    fn set_metadata_value(&mut self, key: &str, value: Option<MetadataValue>);

    fn log_level(&self) -> Severity;

    fn set_log_level(&mut self, level: Severity);
}

/// Handler that ships every accepted event to a remote endpoint.
///
/// Each accepted call is encoded on the calling thread and sent from its own
/// task on the Tokio runtime captured at build time. Completion order across
/// events is unspecified.
pub struct RemoteLogHandler<F: WireFormat> {
    label: String,
    url: Arc<Url>,
    format: Arc<F>,
    level: Severity,
    metadata: Metadata,
    transport: Arc<dyn Transport>,
    controls: Arc<SendControls>,
    runtime: Handle,
    assert_reserved_keys: bool,
}

/// Handler for generic JSON collectors.
pub type HttpLogHandler = RemoteLogHandler<JsonCollector>;

/// Handler for Slack incoming webhooks.
pub type SlackLogHandler = RemoteLogHandler<SlackWebhook>;

impl HttpLogHandler {
    pub fn builder(config: HandlerConfig) -> HandlerBuilder<JsonCollector> {
        let format = JsonCollector::new(config.headers.clone());
        HandlerBuilder::new(config, format)
    }

    /// Build a handler with the default HTTP transport and global controls.
    pub fn new(config: HandlerConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }
}

impl SlackLogHandler {
    /// Custom headers in `config` are not sent to Slack.
    pub fn builder(config: HandlerConfig) -> HandlerBuilder<SlackWebhook> {
        HandlerBuilder::new(config, SlackWebhook::new())
    }

    pub fn new(config: HandlerConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }
}

impl<F: WireFormat> RemoteLogHandler<F> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn controls(&self) -> &Arc<SendControls> {
        &self.controls
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn check_reserved_keys(&self, metadata: &Metadata) {
        let collisions = reserved_collisions(metadata);
        if collisions.is_empty() {
            return;
        }
        debug_assert!(
            !self.assert_reserved_keys,
            "metadata keys {collisions:?} are reserved by the log envelope and will be overridden"
        );
        tracing::warn!(
            label = %self.label,
            keys = ?collisions,
            "metadata uses reserved keys; envelope fields take precedence"
        );
    }

    fn build_event(
        &self,
        level: Severity,
        message: &str,
        metadata: Option<&Metadata>,
        location: Option<SourceLocation>,
    ) -> LogEvent {
        // Merge before projecting so a call value the format drops still
        // hides the handler value under the same key.
        let projected = match metadata {
            Some(call_metadata) if !call_metadata.is_empty() => {
                let mut merged = self.metadata.clone();
                merged.extend(call_metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
                self.format.project_metadata(&merged)
            }
            _ => self.format.project_metadata(&self.metadata),
        };

        LogEvent {
            label: self.label.clone(),
            level: level.as_str().to_string(),
            message: message.to_string(),
            location: location.map(|loc| SourceLocation {
                file: concise_source_path(&loc.file),
                ..loc
            }),
            metadata: (!projected.is_empty()).then_some(projected),
            timestamp: Utc::now(),
        }
    }

    fn dispatch(&self, payload: Result<Vec<u8>, serde_json::Error>) {
        let transport = Arc::clone(&self.transport);
        let controls = Arc::clone(&self.controls);
        let format = Arc::clone(&self.format);
        let url = Arc::clone(&self.url);

        self.runtime.spawn(async move {
            let result = match payload {
                Ok(body) => transport.send(body, &url, format.headers()).await,
                Err(err) => Err(SendError::from(err)),
            };
            if let Err(err) = &result {
                tracing::warn!(endpoint = %url, error = %err, "failed to send log payload");
            }
            controls.notify(&result);
        });
    }
}

impl<F: WireFormat> LogHandler for RemoteLogHandler<F> {
    fn log(
        &self,
        level: Severity,
        message: &str,
        metadata: Option<&Metadata>,
        location: Option<SourceLocation>,
    ) {
        if !self.controls.accepts(level) {
            return;
        }

        if self.format.reserves_keys() {
            self.check_reserved_keys(&self.metadata);
            if let Some(call_metadata) = metadata {
                self.check_reserved_keys(call_metadata);
            }
        }

        let event = self.build_event(level, message, metadata, location);
        let payload = self.format.encode(&event);
        self.dispatch(payload);
    }

    fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    fn set_metadata_value(&mut self, key: &str, value: Option<MetadataValue>) {
        match value {
            Some(value) => {
                self.metadata.insert(key.to_string(), value);
            }
            None => {
                self.metadata.remove(key);
            }
        }
    }

    fn log_level(&self) -> Severity {
        self.level
    }

    fn set_log_level(&mut self, level: Severity) {
        self.level = level;
    }
}

/// Builder for [`RemoteLogHandler`].
///
/// Unset parts fall back to the HTTP transport, the format's global
/// controls and the Tokio runtime of the calling context.
pub struct HandlerBuilder<F: WireFormat> {
    config: HandlerConfig,
    format: F,
    metadata: Metadata,
    transport: Option<Arc<dyn Transport>>,
    controls: Option<Arc<SendControls>>,
    runtime: Option<Handle>,
}

impl<F: WireFormat> HandlerBuilder<F> {
    pub fn new(config: HandlerConfig, format: F) -> Self {
        Self {
            config,
            format,
            metadata: Metadata::new(),
            transport: None,
            controls: None,
            runtime: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn controls(mut self, controls: Arc<SendControls>) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn build(self) -> Result<RemoteLogHandler<F>, ConfigError> {
        let url = parse_endpoint(&self.config.url)?;
        validate_headers(self.format.headers())?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| ConfigError::NoRuntime)?,
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };

        Ok(RemoteLogHandler {
            label: self.config.label,
            url: Arc::new(url),
            format: Arc::new(self.format),
            level: self.config.level,
            metadata: self.metadata,
            transport,
            controls: self.controls.unwrap_or_else(F::global_controls),
            runtime,
            assert_reserved_keys: self.config.assert_reserved_keys,
        })
    }
}

#[cfg(feature = "reqwest-transport")]
fn default_transport() -> Result<Arc<dyn Transport>, ConfigError> {
    Ok(Arc::new(crate::http::HttpTransport::new()))
}

#[cfg(not(feature = "reqwest-transport"))]
fn default_transport() -> Result<Arc<dyn Transport>, ConfigError> {
    Err(ConfigError::MissingTransport)
}
