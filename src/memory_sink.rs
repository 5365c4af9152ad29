use crate::record::TelemetryRecord;
use crate::severity::severity_number;
use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Sink that keeps every record in memory.
///
/// Clones share the same storage, so a test can hand one clone to the
/// layer and inspect the other. An optional minimum severity number turns
/// away records whose level is below it (or has no number at all).
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<TelemetryRecord>>>,
    min_severity: Option<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept levels whose severity number is at least `min`.
    pub fn with_min_severity(min: u8) -> Self {
        MemorySink {
            records: Arc::default(),
            min_severity: Some(min),
        }
    }

    /// Snapshot of the records received so far.
    pub async fn records(&self) -> Vec<TelemetryRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn send(&self, record: &TelemetryRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    fn enabled(&self, level: &str) -> bool {
        match self.min_severity {
            None => true,
            Some(min) => severity_number(level).is_some_and(|number| number >= min),
        }
    }
}
