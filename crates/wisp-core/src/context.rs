/// Per-request trace identity, threaded through plugin calls so their log
/// lines can be tied back to the inbound message that caused them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
}

impl TraceContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Span carrying the trace id.
    #[must_use]
    pub fn span(&self, name: &'static str) -> tracing::Span {
        tracing::info_span!("wisp", op = name, trace_id = %self.trace_id)
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}
