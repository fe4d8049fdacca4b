use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::error;

use http_log_sink::init::{init_tracing_with_config, LayerConfig};
use http_log_sink::{HandlerConfig, HttpLogHandler, NoopTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handler = HttpLogHandler::builder(HandlerConfig::new("load-test", "http://127.0.0.1:9/unused"))
        .transport(Arc::new(NoopTransport))
        .build()?;

    let layer_config = LayerConfig {
        enable_stdout: false,
        ..LayerConfig::default()
    };
    init_tracing_with_config(handler, layer_config)?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, payload = ?[i, i * 2], "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: accepted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Give spawned sends a little time to finish
    sleep(Duration::from_secs(2)).await;
    Ok(())
}
