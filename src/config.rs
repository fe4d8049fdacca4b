use http::{HeaderName, HeaderValue};
use url::Url;

use crate::error::ConfigError;
use crate::severity::Severity;
use crate::transport::Headers;

/// Construction-time settings for a remote handler.
///
/// **Fields**
/// - `label`: logger label copied into every event.
/// - `url`: collector or webhook URL, `http` or `https`.
/// - `headers`: extra request headers (ignored by the Slack format).
/// - `level`: per-instance level. Kept for facade compatibility; send
///   decisions use the shared threshold in [`crate::SendControls`].
/// - `assert_reserved_keys`: in debug builds, panic when metadata uses a
///   key reserved by the envelope. When `false` a warning is logged.
#[derive(Clone, Debug)]
pub struct HandlerConfig {
    pub label: String,
    pub url: String,
    pub headers: Headers,
    pub level: Severity,
    pub assert_reserved_keys: bool,
}

impl HandlerConfig {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            headers: Headers::new(),
            level: Severity::Info,
            assert_reserved_keys: true,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Parse and check an endpoint URL.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

/// Reject headers that could not be put on a request.
pub fn validate_headers(headers: &Headers) -> Result<(), ConfigError> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
        HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
    }
    Ok(())
}

/// Parse `name=value` pairs separated by commas, e.g.
/// `Authorization=Bearer abc,X-Source=api`.
pub fn parse_header_list(raw: &str) -> Result<Headers, ConfigError> {
    let mut headers = Headers::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidHeader(pair.to_string()))?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }
    validate_headers(&headers)?;
    Ok(headers)
}
