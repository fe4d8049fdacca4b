use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::SendError;
use crate::severity::Severity;

/// Callback invoked once per completed send attempt.
pub type SendObserver = Arc<dyn Fn(&Result<(), SendError>) + Send + Sync>;

/// Shared send settings read on every log call: the severity threshold and
/// an optional observer for delivery outcomes.
///
/// Each wire format owns one process-wide instance, and handlers can also be
/// given their own. Configure before logging starts; updates made while
/// events are in flight may or may not be seen by those events.
pub struct SendControls {
    threshold: AtomicU8,
    observer: RwLock<Option<SendObserver>>,
}

impl SendControls {
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold: AtomicU8::new(threshold.as_u8()),
            observer: RwLock::new(None),
        }
    }

    pub fn shared(threshold: Severity) -> Arc<Self> {
        Arc::new(Self::new(threshold))
    }

    pub fn threshold(&self) -> Severity {
        Severity::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    pub fn set_threshold(&self, threshold: Severity) {
        self.threshold.store(threshold.as_u8(), Ordering::Relaxed);
    }

    /// Whether an event at `level` passes the threshold.
    pub fn accepts(&self, level: Severity) -> bool {
        level >= self.threshold()
    }

    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(&Result<(), SendError>) + Send + Sync + 'static,
    {
        self.replace_observer(Some(Arc::new(observer)));
    }

    pub fn clear_observer(&self) {
        self.replace_observer(None);
    }

    fn replace_observer(&self, observer: Option<SendObserver>) {
        match self.observer.write() {
            Ok(mut guard) => *guard = observer,
            Err(poisoned) => *poisoned.into_inner() = observer,
        }
    }

    pub(crate) fn observer(&self) -> Option<SendObserver> {
        match self.observer.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn notify(&self, result: &Result<(), SendError>) {
        if let Some(observer) = self.observer() {
            observer(result);
        }
    }
}

impl Default for SendControls {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl std::fmt::Debug for SendControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendControls")
            .field("threshold", &self.threshold())
            .field("observer", &self.observer().is_some())
            .finish()
    }
}
