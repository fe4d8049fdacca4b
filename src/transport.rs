use async_trait::async_trait;
use std::collections::BTreeMap;
use url::Url;

use crate::error::SendError;

/// Extra request headers, keyed by header name.
pub type Headers = BTreeMap<String, String>;

/// Asynchronous "POST these JSON bytes to this URL" capability.
///
/// Implementations make exactly one attempt per call and never retry. The
/// handler calls `send` from a spawned task and never awaits it on the
/// thread that emitted the log event.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` to `endpoint`.
    ///
    /// **Parameters**
    /// - `payload`: encoded JSON body, owned by the call and released when
    ///   it returns.
    /// - `endpoint`: target URL.
    /// - `headers`: caller-supplied headers. `Content-Type` and `Accept`
    ///   are always `application/json` and cannot be overridden here.
    ///
    /// **Returns**
    /// - `Ok(())` when the endpoint answered with a 2xx status.
    /// - `Err(SendError)` classified as transport failure, malformed
    ///   response, or error status, in that order of priority.
    async fn send(&self, payload: Vec<u8>, endpoint: &Url, headers: &Headers) -> Result<(), SendError>;
}

/// A transport that accepts every payload without doing any I/O.
///
/// Useful for measuring handler overhead and for tests that only care about
/// dispatch decisions.
#[derive(Clone, Default, Debug)]
pub struct NoopTransport;

#[async_trait]
impl Transport for NoopTransport {
    async fn send(&self, _payload: Vec<u8>, _endpoint: &Url, _headers: &Headers) -> Result<(), SendError> {
        Ok(())
    }
}
