use crate::types::ProgressEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Write end of a crawl's progress stream
///
/// Sends never block and never fail the crawl: once the receiver is gone,
/// events are dropped and the crawl runs to completion anyway.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn new(tx: Option<UnboundedSender<ProgressEvent>>) -> Self {
        Self { tx }
    }

    /// A sink nobody listens to
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("Progress receiver dropped; event discarded");
            }
        }
    }
}
