use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use url::Url;

use http_log_sink::init::init_tracing;
use http_log_sink::{HandlerConfig, Headers, HttpLogHandler, SendError, Transport};

/// Example of plugging in a custom transport by implementing the
/// `Transport` trait directly. Imagine this hands payloads to an in-house
/// delivery agent instead of talking HTTP itself.
struct StdoutTransport;

#[async_trait]
impl Transport for StdoutTransport {
    async fn send(&self, payload: Vec<u8>, endpoint: &Url, _headers: &Headers) -> Result<(), SendError> {
        println!("[{endpoint}] {}", String::from_utf8_lossy(&payload));
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handler = HttpLogHandler::builder(HandlerConfig::new("custom", "https://agent.local/ingest"))
        .transport(Arc::new(StdoutTransport))
        .build()?;

    init_tracing(handler)?;

    info!("custom transport example started");
    error!(db = "orders", "simulated error sent via custom transport");

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    Ok(())
}
