//! Environment variable names for configuring handlers from services.
//!
//! These are helpers only; handler types never read the environment
//! themselves.

use crate::config::{parse_header_list, HandlerConfig};
use crate::error::ConfigError;
use crate::severity::Severity;

/// Collector URL, e.g. `https://logs.example.com/ingest`.
pub const LOG_HTTP_URL_ENV: &str = "LOG_HTTP_URL";

/// Extra collector headers as `name=value` pairs separated by commas.
pub const LOG_HTTP_HEADERS_ENV: &str = "LOG_HTTP_HEADERS";

/// Logger label copied into every collector event.
pub const LOG_HTTP_LABEL_ENV: &str = "LOG_HTTP_LABEL";

/// Minimum severity shipped to the collector.
pub const LOG_HTTP_THRESHOLD_ENV: &str = "LOG_HTTP_THRESHOLD";

/// Slack incoming webhook URL.
pub const LOG_SLACK_WEBHOOK_URL_ENV: &str = "LOG_SLACK_WEBHOOK_URL";

/// Minimum severity shipped to Slack.
pub const LOG_SLACK_THRESHOLD_ENV: &str = "LOG_SLACK_THRESHOLD";

/// Collector settings plus the threshold to apply to its controls.
#[derive(Clone, Debug)]
pub struct EnvSettings {
    pub handler: HandlerConfig,
    pub threshold: Option<Severity>,
}

/// Build collector settings from `LOG_HTTP_*` variables.
pub fn http_settings_from_env() -> Result<EnvSettings, ConfigError> {
    settings_from(|key| std::env::var(key).ok(), Target::Http)
}

/// Build Slack settings from `LOG_SLACK_*` variables. The label is shared
/// with the collector (`LOG_HTTP_LABEL`).
pub fn slack_settings_from_env() -> Result<EnvSettings, ConfigError> {
    settings_from(|key| std::env::var(key).ok(), Target::Slack)
}

#[derive(Clone, Copy)]
enum Target {
    Http,
    Slack,
}

fn settings_from(lookup: impl Fn(&str) -> Option<String>, target: Target) -> Result<EnvSettings, ConfigError> {
    let (url_key, threshold_key) = match target {
        Target::Http => (LOG_HTTP_URL_ENV, LOG_HTTP_THRESHOLD_ENV),
        Target::Slack => (LOG_SLACK_WEBHOOK_URL_ENV, LOG_SLACK_THRESHOLD_ENV),
    };

    let url = lookup(url_key).ok_or(ConfigError::MissingEnv(url_key))?;
    let label = lookup(LOG_HTTP_LABEL_ENV).unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let mut handler = HandlerConfig::new(label, url);

    if let Target::Http = target {
        if let Some(raw) = lookup(LOG_HTTP_HEADERS_ENV) {
            handler.headers = parse_header_list(&raw)?;
        }
    }

    let threshold = lookup(threshold_key)
        .map(|raw| {
            raw.parse::<Severity>().map_err(|err| ConfigError::InvalidEnv {
                name: threshold_key,
                reason: err.to_string(),
            })
        })
        .transpose()?;

    Ok(EnvSettings { handler, threshold })
}
