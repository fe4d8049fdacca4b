use std::error::Error;

/// Outcome of a failed send attempt.
///
/// Reported to the diagnostic channel and to the send observer; never
/// returned to the code that emitted the log event.
#[derive(thiserror::Error, Debug)]
pub enum SendError {
    /// No response was received (connect failure, timeout, reset).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn Error + Send + Sync>),

    /// Something came back, but it was not a well-formed HTTP response.
    #[error("invalid response type")]
    InvalidResponseType,

    /// The endpoint answered with a status outside `200..300`.
    #[error("error status code {code}{}", body_suffix(.body))]
    ErrorStatusCode { code: u16, body: Option<String> },

    /// The event could not be encoded as JSON.
    #[error("failed to serialize log event: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref().map(|b| format!(": {b}")).unwrap_or_default()
}

impl SendError {
    pub fn transport(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        SendError::Transport(err.into())
    }
}

/// Error returned when a handler cannot be constructed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid endpoint url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported url scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),

    #[error("invalid header `{0}`")]
    InvalidHeader(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    #[error("no tokio runtime available to drive log delivery")]
    NoRuntime,

    #[error("no transport configured and the reqwest-transport feature is disabled")]
    MissingTransport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_body_when_present() {
        let err = SendError::ErrorStatusCode {
            code: 500,
            body: Some("server error".into()),
        };
        assert_eq!(err.to_string(), "error status code 500: server error");

        let err = SendError::ErrorStatusCode { code: 404, body: None };
        assert_eq!(err.to_string(), "error status code 404");
    }
}
