use tokio::time::{sleep, Duration};
use tracing::{error, info};

use http_log_sink::env::http_settings_from_env;
use http_log_sink::init::init_tracing;
use http_log_sink::HttpLogHandler;

/// Ships events to the collector named by `LOG_HTTP_URL`, e.g.
///
/// ```sh
/// LOG_HTTP_URL=http://127.0.0.1:8080/logs \
/// LOG_HTTP_HEADERS="Authorization=Bearer dev" \
/// cargo run --example collector_example
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = http_settings_from_env()?;
    let handler = HttpLogHandler::new(settings.handler)?;
    if let Some(threshold) = settings.threshold {
        handler.controls().set_threshold(threshold);
    }
    handler.controls().set_observer(|result| {
        if result.is_ok() {
            println!("[collector] event delivered");
        }
    });

    init_tracing(handler)?;

    info!("starting service");
    error!(user_id = 42, reason = "invalid password", "authentication failed");

    sleep(Duration::from_secs(2)).await;
    Ok(())
}
