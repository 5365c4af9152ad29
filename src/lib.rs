pub mod attributes;
pub mod config;
pub mod env;
pub mod error;
pub mod formatter;
pub mod record;
pub mod severity;
pub mod trace;

pub mod sink;
pub mod layer;
pub mod init;
pub mod noop_sink;
pub mod memory_sink;

pub use config::FormatterConfig;
pub use formatter::LogFormatter;
pub use record::{RawRecord, TelemetryRecord};
