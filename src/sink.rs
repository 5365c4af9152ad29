use crate::record::TelemetryRecord;
use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for [`TelemetryRecord`]s produced by the
/// formatting layer.
///
/// Implementations are responsible for transporting records to a concrete
/// backend (an OTLP collector, a database, stdout, etc). The layer calls
/// `send` from a background task and never awaits it on the application
/// thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single normalized record to the underlying backend.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was accepted by the backend.
    /// - `Err(..)` if the backend failed. The layer reports the error and
    ///   moves on to the next record.
    async fn send(&self, record: &TelemetryRecord) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered records, if the backend implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    /// Whether records of `level` should be sent to this sink at all.
    ///
    /// `level` is the original level text, see [`TelemetryRecord::level`].
    /// Default implementation accepts everything.
    fn enabled(&self, _level: &str) -> bool {
        true
    }
}
