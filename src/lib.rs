//! Ship structured `tracing` events as JSON to HTTP log collectors and
//! Slack incoming webhooks.
//!
//! Events are filtered against a shared severity threshold, their metadata
//! is normalized into JSON-safe values, and each accepted event is POSTed
//! from its own Tokio task. Delivery failures are reported through
//! `tracing` diagnostics and an optional observer, never to the caller.

pub mod backend;
pub mod config;
pub mod controls;
pub mod env;
pub mod error;
pub mod format;
pub mod handler;
pub mod init;
pub mod layer;
pub mod metadata;
pub mod normalize;
pub mod record;
pub mod severity;
pub mod transport;

#[cfg(feature = "reqwest-transport")]
pub mod http;

pub use config::HandlerConfig;
pub use controls::{SendControls, SendObserver};
pub use error::{ConfigError, SendError};
pub use handler::{HandlerBuilder, HttpLogHandler, LogHandler, RemoteLogHandler, SlackLogHandler};
pub use layer::RemoteLayer;
pub use metadata::{Described, Metadata, MetadataValue};
pub use severity::Severity;
pub use transport::{Headers, NoopTransport, Transport};

#[cfg(feature = "reqwest-transport")]
pub use crate::http::HttpTransport;
