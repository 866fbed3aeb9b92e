//! Channel sink: hands events to an async consumer without blocking.
//!
//! The caller side is synchronous (`UnboundedSender::send` never awaits), so
//! assignment code stays free of suspension points. The consumer task owns
//! the receiver and does the actual transport.

use tokio::sync::mpsc;

use super::{ExperimentEvent, ExposureSink};
use crate::{Error, Result};

/// Forwards every event into a tokio unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelExposureSink {
    tx: mpsc::UnboundedSender<ExperimentEvent>,
}

impl ChannelExposureSink {
    /// Create a sink and the receiver the delivery task should drain.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExperimentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: &ExperimentEvent) -> Result<()> {
        self.tx.send(event.clone()).map_err(|_| Error::SinkClosed)
    }
}

impl ExposureSink for ChannelExposureSink {
    fn report_exposure(&self, event: &ExperimentEvent) -> Result<()> {
        self.send(event)
    }

    fn report_conversion(&self, event: &ExperimentEvent) -> Result<()> {
        self.send(event)
    }
}
