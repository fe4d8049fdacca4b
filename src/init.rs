use crate::handler::LogHandler;
use crate::layer::RemoteLayer;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Options for installing the remote layer as the global subscriber.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt` layer is
///   stacked next to the remote layer so events keep reaching the console
///   whether or not remote delivery succeeds.
/// - `extra_ignored_targets`: target prefixes that must never be shipped,
///   in addition to [`crate::layer::DEFAULT_IGNORED_TARGETS`].
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
    pub extra_ignored_targets: Vec<String>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            extra_ignored_targets: Vec::new(),
        }
    }
}

/// Install a global `tracing` subscriber that forwards events to `handler`.
///
/// **Parameters**
/// - `handler`: any [`LogHandler`], usually an
///   [`HttpLogHandler`](crate::HttpLogHandler) or
///   [`SlackLogHandler`](crate::SlackLogHandler).
/// - `config`: [`LayerConfig`] controlling console output and ignored
///   targets.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config<H>(handler: H, config: LayerConfig) -> Result<(), SetGlobalDefaultError>
where
    H: LogHandler + 'static,
{
    let layer = config
        .extra_ignored_targets
        .into_iter()
        .fold(RemoteLayer::new(handler), |layer, target| layer.ignore_target(target));

    // Two shapes because the stacked subscriber types differ.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Install the remote layer with [`LayerConfig::default`], i.e. with
/// console output enabled. The recommended entry point for services.
pub fn init_tracing<H>(handler: H) -> Result<(), SetGlobalDefaultError>
where
    H: LogHandler + 'static,
{
    init_tracing_with_config(handler, LayerConfig::default())
}
