use crate::handler::LogHandler;
use crate::metadata::{Described, Metadata, MetadataValue};
use crate::record::SourceLocation;
use crate::severity::Severity;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Targets whose events never reach the remote handler: this crate's own
/// diagnostics and the HTTP stack used to deliver events.
pub const DEFAULT_IGNORED_TARGETS: &[&str] =
    &[env!("CARGO_CRATE_NAME"), "hyper", "reqwest", "h2", "rustls"];

/// `tracing_subscriber` layer that turns events into [`LogHandler::log`]
/// calls.
///
/// The `message` field becomes the log message, every other field becomes
/// metadata. The handler applies its threshold and ships accepted events
/// from a background task, so `on_event` never waits for the network.
pub struct RemoteLayer<H> {
    handler: H,
    ignored_targets: Vec<String>,
}

impl<H: LogHandler> RemoteLayer<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            ignored_targets: DEFAULT_IGNORED_TARGETS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Also drop events whose target starts with `prefix`.
    pub fn ignore_target(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_targets.push(prefix.into());
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    fn is_ignored(&self, target: &str) -> bool {
        self.ignored_targets.iter().any(|prefix| {
            target
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
        })
    }
}

impl<S, H> Layer<S> for RemoteLayer<H>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    H: LogHandler + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if self.is_ignored(meta.target()) {
            return;
        }

        let mut fields = Metadata::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let location = match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => Some(SourceLocation::new(
                file,
                meta.module_path().unwrap_or_else(|| meta.target()),
                line,
            )),
            _ => None,
        };

        self.handler.log(
            Severity::from(meta.level()),
            message.as_deref().unwrap_or_default(),
            (!fields.is_empty()).then_some(&fields),
            location,
        );
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Metadata,
    pub message: &'a mut Option<String>,
}

impl FieldVisitor<'_> {
    fn insert(&mut self, field: &Field, value: MetadataValue) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert(field, MetadataValue::Text(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_i128(&mut self, field: &Field, value: i128) {
        let described = i64::try_from(value)
            .map(Described::Int)
            .unwrap_or_else(|_| Described::display(value));
        self.insert(field, described.into());
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        let described = u64::try_from(value)
            .map(Described::UInt)
            .unwrap_or_else(|_| Described::display(value));
        self.insert(field, described.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, MetadataValue::Text(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, Described::Other(format!("{:?}", value)).into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        level: Severity,
        message: String,
        metadata: Option<Metadata>,
        location: Option<SourceLocation>,
    }

    #[derive(Clone, Default)]
    struct CapturingHandler {
        calls: Arc<Mutex<Vec<Call>>>,
        metadata: Metadata,
    }

    impl LogHandler for CapturingHandler {
        fn log(
            &self,
            level: Severity,
            message: &str,
            metadata: Option<&Metadata>,
            location: Option<SourceLocation>,
        ) {
            self.calls.lock().unwrap().push(Call {
                level,
                message: message.to_string(),
                metadata: metadata.cloned(),
                location,
            });
        }

        fn metadata_value(&self, key: &str) -> Option<&MetadataValue> {
            self.metadata.get(key)
        }

        fn set_metadata_value(&mut self, key: &str, value: Option<MetadataValue>) {
            match value {
                Some(value) => {
                    self.metadata.insert(key.to_string(), value);
                }
                None => {
                    self.metadata.remove(key);
                }
            }
        }

        fn log_level(&self) -> Severity {
            Severity::Info
        }

        fn set_log_level(&mut self, _level: Severity) {}
    }

    fn capture<F: FnOnce()>(emit: F) -> Vec<Call> {
        let handler = CapturingHandler::default();
        let calls = Arc::clone(&handler.calls);
        let subscriber = tracing_subscriber::registry().with(RemoteLayer::new(handler));
        tracing::subscriber::with_default(subscriber, emit);
        let calls = calls.lock().unwrap().clone();
        calls
    }

    #[test]
    fn event_fields_become_metadata() {
        let calls = capture(|| {
            tracing::error!(target: "app", user = "alice", retries = 3, ratio = 0.5, ok = false, "boom");
        });

        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.level, Severity::Error);
        assert_eq!(call.message, "boom");
        let metadata = call.metadata.as_ref().unwrap();
        assert_eq!(metadata.get("user"), Some(&MetadataValue::from("alice")));
        assert_eq!(metadata.get("retries"), Some(&MetadataValue::from(3_i64)));
        assert_eq!(metadata.get("ratio"), Some(&MetadataValue::from(0.5)));
        assert_eq!(metadata.get("ok"), Some(&MetadataValue::from(false)));
        let location = call.location.as_ref().unwrap();
        assert!(location.file.ends_with("layer.rs"));
        assert!(location.line > 0);
    }

    #[test]
    fn debug_fields_are_described() {
        let calls = capture(|| {
            tracing::warn!(target: "app", ids = ?vec![1, 2], "listed");
        });

        assert_eq!(calls[0].level, Severity::Warning);
        assert_eq!(
            calls[0].metadata.as_ref().unwrap().get("ids"),
            Some(&MetadataValue::Described(Described::Other("[1, 2]".into())))
        );
    }

    #[test]
    fn events_without_fields_pass_no_metadata() {
        let calls = capture(|| tracing::info!(target: "app", "plain"));
        assert_eq!(calls[0].metadata, None);
    }

    #[test]
    fn own_and_transport_targets_are_ignored() {
        let calls = capture(|| {
            tracing::error!(target: "http_log_sink::handler", "diagnostic");
            tracing::error!(target: "hyper::proto", "wire");
            tracing::error!(target: "hyperion", "kept");
        });

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message, "kept");
    }

    #[test]
    fn handler_metadata_is_reachable_through_the_layer() {
        let mut layer = RemoteLayer::new(CapturingHandler::default());
        layer
            .handler_mut()
            .set_metadata_value("request_id", Some("r-1".into()));
        assert_eq!(
            layer.handler().metadata_value("request_id"),
            Some(&MetadataValue::from("r-1"))
        );
    }
}
