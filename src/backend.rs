use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;
use url::Url;

use crate::config::HandlerConfig;
use crate::error::ConfigError;
use crate::handler::{HttpLogHandler, SlackLogHandler};
use crate::layer::RemoteLayer;

const SLACK_WEBHOOK_HOST: &str = "hooks.slack.com";
const SLACK_SCHEME_PREFIX: &str = "slack+";

/// Endpoint kinds that can be selected from a single DSN string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Collector,
    Slack,
}

/// Endpoint selected from a DSN.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Selected wire format.
    pub kind: BackendKind,
    /// Plain `http(s)` URL the requests go to.
    pub url: String,
    /// Raw DSN that was used to construct this config.
    pub dsn: String,
}

/// Parse a DSN string and infer the endpoint kind.
///
/// Examples:
/// - "https://logs.example.com/ingest" (JSON collector)
/// - "https://hooks.slack.com/services/T0/B0/XYZ" (Slack)
/// - "slack+https://chat-proxy.internal/hook" (Slack behind a proxy)
pub fn parse_dsn(dsn: &str) -> Result<BackendConfig, DsnError> {
    let trimmed = dsn.trim();
    let lower = trimmed.to_ascii_lowercase();

    let (forced_slack, url) = match lower.strip_prefix(SLACK_SCHEME_PREFIX) {
        Some(_) => (true, &trimmed[SLACK_SCHEME_PREFIX.len()..]),
        None => (false, trimmed),
    };

    let parsed = Url::parse(url).map_err(|_| DsnError::InvalidUrl(dsn.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DsnError::UnknownScheme);
    }

    let kind = if forced_slack || parsed.host_str() == Some(SLACK_WEBHOOK_HOST) {
        BackendKind::Slack
    } else {
        BackendKind::Collector
    };

    Ok(BackendConfig {
        kind,
        url: url.to_string(),
        dsn: dsn.to_string(),
    })
}

/// Error type returned when parsing a DSN.
#[derive(thiserror::Error, Debug)]
pub enum DsnError {
    #[error("unknown or unsupported DSN scheme")]
    UnknownScheme,

    #[error("invalid DSN url `{0}`")]
    InvalidUrl(String),
}

/// Error type returned when building a layer from a DSN.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error(transparent)]
    Dsn(#[from] DsnError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Build a boxed layer for the endpoint named by `cfg`.
///
/// This is the entry point for services that select their log endpoint
/// with a single string. Handlers use the default HTTP transport, the
/// global controls of their format and the current Tokio runtime.
/// `label` and `headers` come from `handler`; its `url` is replaced by the
/// DSN's.
pub fn make_layer_from_config<S>(
    cfg: &BackendConfig,
    handler: HandlerConfig,
) -> Result<Box<dyn Layer<S> + Send + Sync>, BackendBuildError>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let handler = HandlerConfig {
        url: cfg.url.clone(),
        ..handler
    };
    match cfg.kind {
        BackendKind::Collector => Ok(Box::new(RemoteLayer::new(HttpLogHandler::new(handler)?))),
        BackendKind::Slack => Ok(Box::new(RemoteLayer::new(SlackLogHandler::new(handler)?))),
    }
}

/// Parse `dsn` and build its layer in one step.
pub fn make_layer_from_dsn<S>(
    dsn: &str,
    handler: HandlerConfig,
) -> Result<Box<dyn Layer<S> + Send + Sync>, BackendBuildError>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    make_layer_from_config(&parse_dsn(dsn)?, handler)
}
