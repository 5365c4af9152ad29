use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;

/// Trace correlation fields attached to every record.
///
/// The default value (empty ids, zero flags) is used whenever no span is
/// active or trace lookup is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceData {
    pub trace_id: String,
    pub span_id: String,
    pub trace_flags: u8,
}

/// Source of the currently active span, if any.
///
/// Implementations must not fail; when nothing is active they return
/// [`TraceData::default`].
pub trait TraceContextProvider: Send + Sync {
    fn current(&self) -> TraceData;
}

/// Reads the active span from the current OpenTelemetry [`Context`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OtelTraceProvider;

impl TraceContextProvider for OtelTraceProvider {
    fn current(&self) -> TraceData {
        Context::map_current(|cx| {
            if !cx.has_active_span() {
                return TraceData::default();
            }
            let span = cx.span();
            let span_context = span.span_context();
            if !span_context.is_valid() {
                return TraceData::default();
            }
            TraceData {
                trace_id: span_context.trace_id().to_string(),
                span_id: span_context.span_id().to_string(),
                trace_flags: span_context.trace_flags().to_u8(),
            }
        })
    }
}

/// Never looks anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTraceProvider;

impl TraceContextProvider for DisabledTraceProvider {
    fn current(&self) -> TraceData {
        TraceData::default()
    }
}
