use crate::formatter::LogFormatter;
use crate::init::LayerConfig;
use crate::record::{RawRecord, TelemetryRecord};
use crate::sink::LogSink;
use serde_json::{Map, Value};
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`TelemetryRecord`]s
/// and forwards them to an asynchronous [`LogSink`] via a bounded channel
/// and background task.
///
/// Formatting happens on the calling thread; sink I/O is fully decoupled
/// from application threads. Events more verbose than the configured
/// `max_level` are ignored.
pub struct FormatLayer {
    formatter: Arc<LogFormatter>,
    max_level: Level,
    sender: mpsc::Sender<TelemetryRecord>,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
}

impl FormatLayer {
    /// Create a new layer and spawn a background task that pulls
    /// [`TelemetryRecord`]s from a bounded channel and sends them to the
    /// provided [`LogSink`].
    ///
    /// Minimal thresholds are enforced for `channel_buffer`, `batch_size`
    /// and `flush_interval` to avoid degenerate configurations. The task
    /// drains what is left and exits once the layer is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        formatter: Arc<LogFormatter>,
        sink: Arc<dyn LogSink>,
        config: &LayerConfig,
    ) -> (Self, JoinHandle<()>) {
        let buffer = config.channel_buffer.max(16);
        let batch_size = config.batch_size.max(1);
        let flush_interval = config.flush_interval.max(Duration::from_millis(10));

        let (tx, mut rx) = mpsc::channel::<TelemetryRecord>(buffer);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            let mut flush_timer = interval(flush_interval);
            flush_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(record) => {
                            batch.push(record);
                            if batch.len() >= batch_size {
                                send_batch(&*sink, &mut batch).await;
                            }
                        }
                        None => {
                            send_batch(&*sink, &mut batch).await;
                            break;
                        }
                    },
                    _ = flush_timer.tick() => {
                        if !batch.is_empty() {
                            send_batch(&*sink, &mut batch).await;
                        }
                    }
                }
            }
        });

        (Self {
            formatter,
            max_level: config.max_level,
            sender: tx,
            total_events: Arc::new(AtomicU64::new(0)),
            enqueued_events: Arc::new(AtomicU64::new(0)),
            dropped_events: Arc::new(AtomicU64::new(0)),
        }, handle)
    }
}

/// Send every record the sink accepts, then flush it. Failures are
/// reported and skipped.
async fn send_batch(sink: &dyn LogSink, batch: &mut Vec<TelemetryRecord>) {
    for record in batch.drain(..) {
        if !sink.enabled(record.level()) {
            continue;
        }
        if let Err(e) = sink.send(&record).await {
            eprintln!("error sending log record: {}", e);
        }
    }
    if let Err(e) = sink.flush().await {
        eprintln!("error flushing log sink: {}", e);
    }
}

/// Level text used for `tracing` levels.
pub fn level_text(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warning",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        Level::TRACE => "trace",
    }
}

impl<S> Layer<S> for FormatLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }

        let mut fields = Map::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let mut raw = RawRecord::new(level_text(meta.level()), message.unwrap_or_default());
        if !fields.is_empty() {
            raw = raw.with_arg(Value::Object(fields));
        }

        let record = self.formatter.format(&raw, meta.file());

        if self.sender.try_send(record).is_ok() {
            self.enqueued_events.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("log channel full, dropping log record");
        }
    }
}

/// Collects event fields into a JSON map; the `message` field is kept
/// apart as the record message.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Map<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}
