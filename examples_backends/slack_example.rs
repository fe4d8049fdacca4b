use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use http_log_sink::env::slack_settings_from_env;
use http_log_sink::init::init_tracing;
use http_log_sink::{LogHandler, Severity, SlackLogHandler};

/// Posts warnings and errors to the webhook in `LOG_SLACK_WEBHOOK_URL`.
/// Only text fields show up in the Slack message.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = slack_settings_from_env()?;
    let mut handler = SlackLogHandler::new(settings.handler)?;
    handler
        .controls()
        .set_threshold(settings.threshold.unwrap_or(Severity::Warning));
    handler.set_metadata_value("service", Some("checkout".into()));

    init_tracing(handler)?;

    warn!(queue = "payments", depth = 1200, "queue backing up");
    error!(order_id = "A-1001", "order failed");

    sleep(Duration::from_secs(2)).await;
    Ok(())
}
