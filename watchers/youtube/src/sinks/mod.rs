//! Where video summaries end up.

use std::future::Future;

use crate::error::WatcherError;
use crate::summary::VideoSummary;

pub mod kafka;

pub use kafka::KafkaSink;

/// The publishing stage of the pipeline.
///
/// `publish` only enqueues: it must not wait for the record to be acknowledged. `flush` is the
/// single barrier at the end of a run; it takes the sink by value so it can only happen once.
pub trait VideoSink {
    fn publish(&mut self, summary: &VideoSummary) -> Result<(), WatcherError>;

    fn flush(self) -> impl Future<Output = Result<DeliveryReport, WatcherError>> + Send;
}

/// What to do when a record is permanently rejected by the broker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryFailurePolicy {
    /// Log the failure and carry on. The run still succeeds.
    #[default]
    Ignore,
    /// Stop publishing once a failure has been observed and fail the run at the latest on flush.
    Abort,
}

/// Outcome of all deliveries in a run, as seen by the delivery callbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: u64,
    pub failed: u64,
}

impl DeliveryReport {
    /// Applies `policy` to the final tally.
    pub fn check(self, policy: DeliveryFailurePolicy) -> Result<Self, WatcherError> {
        match policy {
            DeliveryFailurePolicy::Abort if self.failed > 0 => Err(WatcherError::Delivery {
                delivered: self.delivered,
                failed: self.failed,
            }),
            _ => Ok(self),
        }
    }
}

/// Logs summaries instead of producing them.
#[derive(Debug, Default)]
pub struct PrintSink {
    published: u64,
}

impl VideoSink for PrintSink {
    fn publish(&mut self, summary: &VideoSummary) -> Result<(), WatcherError> {
        tracing::info!(
            key = summary.key(),
            value = ?summary.value(),
            "single record"
        );
        self.published += 1;
        Ok(())
    }

    async fn flush(self) -> Result<DeliveryReport, WatcherError> {
        Ok(DeliveryReport {
            delivered: self.published,
            failed: 0,
        })
    }
}
