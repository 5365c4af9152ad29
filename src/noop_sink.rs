use crate::record::TelemetryRecord;
use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;

/// A sink that accepts no level at all.
///
/// The dispatch task skips `send` for every record, which leaves only the
/// cost of formatting and queueing. The load demos measure exactly that.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _record: &TelemetryRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn enabled(&self, _level: &str) -> bool {
        false
    }
}
