//! User-facing notices emitted by the engine.
//!
//! The engine reports outcomes (item added, sync failed) through a
//! [`Notifier`] so the surface that shows them is pluggable. Delivery
//! must never block an engine operation.

use tidepool_core::CollectionKind;
use tokio::sync::mpsc;

/// How prominently the surface should render a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One user-facing message about an operation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    /// The collection the notice is about, when there is one.
    pub collection: Option<CollectionKind>,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(collection: CollectionKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            collection: Some(collection),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(collection: CollectionKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            collection: Some(collection),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(collection: CollectionKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            collection: Some(collection),
            message: message.into(),
        }
    }
}

/// Sink for engine notices. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default sink: notices become log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let collection = notice.collection.map_or("none", CollectionKind::as_str);
        match notice.severity {
            Severity::Info | Severity::Success => {
                tracing::info!(collection, message = %notice.message, "notice");
            }
            Severity::Warning => {
                tracing::warn!(collection, message = %notice.message, "notice");
            }
            Severity::Error => {
                tracing::error!(collection, message = %notice.message, "notice");
            }
        }
    }
}

/// Sink backed by an unbounded channel, for surfaces that render notices
/// themselves. Sending never blocks; notices after every receiver is
/// dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }
}
