use crate::config::FormatterConfig;
use crate::error::InitError;
use crate::formatter::LogFormatter;
use crate::layer::FormatLayer;
use crate::sink::LogSink;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the formatting layer.
///
/// Controls the size of the internal buffer, the maximum batch size when
/// sending to the sink, how often a partial batch is flushed, whether
/// events are also printed to the console, and the most verbose level
/// that is formatted at all.
///
/// **Fields**
/// - `channel_buffer`: maximum number of records queued before new ones
///   are dropped.
/// - `batch_size`: number of records handed to the sink per batch.
/// - `flush_interval`: maximum interval between flushes even when the
///   batch is not full.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   installed next to [`FormatLayer`].
/// - `max_level`: most verbose `tracing` level the layer formats.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub enable_stdout: bool,
    pub max_level: Level,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            enable_stdout: false,
            max_level: Level::DEBUG,
        }
    }
}

/// Install a global `tracing` subscriber that formats events with
/// `formatter_config` and delivers them to `sink`.
///
/// **Returns**
/// - The handle of the background dispatch task.
/// - [`InitError`] if a global subscriber was already installed.
///
/// Must be called from within a Tokio runtime.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    formatter_config: FormatterConfig,
    config: LayerConfig,
) -> Result<JoinHandle<()>, InitError> {
    let formatter = Arc::new(LogFormatter::new(formatter_config));
    let (layer, handle) = FormatLayer::new(formatter, sink, &config);

    // The two subscriber shapes have different types, so each branch
    // installs its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    tracing::debug!(
        channel_buffer = config.channel_buffer,
        batch_size = config.batch_size,
        max_level = %config.max_level,
        "otel log format layer installed"
    );
    Ok(handle)
}

/// Initialize tracing with [`LayerConfig::default`].
pub fn init_tracing(
    sink: Arc<dyn LogSink>,
    formatter_config: FormatterConfig,
) -> Result<JoinHandle<()>, InitError> {
    init_tracing_with_config(sink, formatter_config, LayerConfig::default())
}
