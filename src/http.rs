use crate::error::SendError;
use crate::transport::{Headers, Transport};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::error::Error;
use url::Url;

const APPLICATION_JSON: &str = "application/json";

/// [`Transport`] implementation backed by a shared `reqwest` client.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Use a preconfigured client, e.g. one built with a request timeout.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: Vec<u8>, endpoint: &Url, headers: &Headers) -> Result<(), SendError> {
        let mut request = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON);

        for (name, value) in headers {
            if is_content_negotiation(name) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }

        let resp = request.body(payload).send().await.map_err(classify)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.ok().filter(|text| !text.is_empty());
        Err(SendError::ErrorStatusCode {
            code: status.as_u16(),
            body,
        })
    }
}

fn is_content_negotiation(name: &str) -> bool {
    name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) || name.eq_ignore_ascii_case(ACCEPT.as_str())
}

/// Split request failures into "nothing usable came back" and "something
/// came back that was not HTTP".
fn classify(err: reqwest::Error) -> SendError {
    if is_malformed_response(&err) {
        SendError::InvalidResponseType
    } else {
        SendError::transport(err)
    }
}

fn is_malformed_response(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(hyper_err) = inner.downcast_ref::<hyper::Error>() {
            return hyper_err.is_parse() || hyper_err.is_parse_status();
        }
        source = inner.source();
    }
    false
}
