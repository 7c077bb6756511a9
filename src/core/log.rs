//! Optional diagnostic sink
//!
//! The store always reports through `tracing`. A caller may additionally
//! install a plain callback that receives a one-line message per mutation.
//! The sink never influences results.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Callback receiving diagnostic messages
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
pub(crate) struct DiagnosticLog {
    sink: RwLock<Option<LogSink>>,
}

impl DiagnosticLog {
    pub(crate) fn new(sink: Option<LogSink>) -> Self {
        DiagnosticLog {
            sink: RwLock::new(sink),
        }
    }

    pub(crate) fn set(&self, sink: Option<LogSink>) {
        *self.sink.write() = sink;
    }

    /// Forward a message; formatting only happens when a sink is installed
    pub(crate) fn emit(&self, message: impl FnOnce() -> String) {
        let sink = self.sink.read().clone();
        if let Some(sink) = sink {
            sink(&message());
        }
    }
}

impl fmt::Debug for DiagnosticLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticLog")
            .field("installed", &self.sink.read().is_some())
            .finish()
    }
}
