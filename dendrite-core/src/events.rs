//! Events produced by the engine for a front-end to consume.
//!
//! The engine never talks to a UI directly; it emits [`IndexEvent`]s through an
//! injected [`EventSink`]. A headless embedder passes [`NullSink`], tests use
//! [`BufferSink`] to assert on the emitted sequence.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Events emitted during loading and refreshing a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexEvent {
    /// Reset the front-end's error counter before a refresh.
    ClearErrorCount,

    /// A refresh or load finished and the storage is readable again.
    FinishedParsing,

    /// Transient status line.
    Status {
        text: String,
        is_error: bool,
        show_loader: bool,
    },

    /// The project should be refreshed (emitted after loading stale state).
    Refresh,

    /// Show a blocking progress dialog.
    ShowStatusDialog { title: String, text: String },
}

impl IndexEvent {
    /// Plain status message without loader or error flag.
    pub fn status(text: impl Into<String>) -> Self {
        Self::Status {
            text: text.into(),
            is_error: false,
            show_loader: false,
        }
    }

    /// Status message with a busy indicator.
    pub fn status_busy(text: impl Into<String>) -> Self {
        Self::Status {
            text: text.into(),
            is_error: false,
            show_loader: true,
        }
    }

    /// Status message flagged as an error.
    pub fn status_error(text: impl Into<String>) -> Self {
        Self::Status {
            text: text.into(),
            is_error: true,
            show_loader: false,
        }
    }
}

/// Sink receiving engine events.
///
/// Implementations must be cheap; emission happens on scheduler and worker
/// threads and must not block on UI work.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: IndexEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: IndexEvent) {}
}

/// Sink that records events in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    events: Mutex<Vec<IndexEvent>>,
}

impl BufferSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<IndexEvent> {
        self.events.lock().clone()
    }

    /// Whether an event satisfying the predicate was emitted.
    pub fn contains(&self, predicate: impl Fn(&IndexEvent) -> bool) -> bool {
        self.events.lock().iter().any(predicate)
    }
}

impl EventSink for BufferSink {
    fn emit(&self, event: IndexEvent) {
        self.events.lock().push(event);
    }
}
