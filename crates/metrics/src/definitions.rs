//! Metric name and label definitions.
//!
//! Every metric emitted by yatools is named here so the exported set stays
//! documented in one place.

/// Outbound message metrics
pub mod messages {
    /// Envelopes handed to the message store
    pub const PERSISTED_TOTAL: &str = "yatools_messages_persisted_total";
    /// Batch entries dropped because they failed structural validation
    pub const ITEMS_SKIPPED_TOTAL: &str = "yatools_items_skipped_total";
    /// Batch entries whose send or persist failed while the batch went on
    pub const ITEMS_FAILED_TOTAL: &str = "yatools_items_failed_total";
    /// Routed sends through a registered messaging client
    pub const ROUTED_SENDS_TOTAL: &str = "yatools_routed_sends_total";
}

/// Alert dispatcher metrics
pub mod alerts {
    /// Alert channel attempts, labelled by `channel` and `outcome`
    pub const CHANNELS_TOTAL: &str = "yatools_alert_channels_total";
}

/// Tool entrypoint metrics
pub mod tools {
    /// Total number of tool calls, labelled by `tool`
    pub const CALLS_TOTAL: &str = "yatools_tool_calls_total";
    /// Tool calls that produced an error-status result
    pub const ERRORS_TOTAL: &str = "yatools_tool_errors_total";
    /// Tool call duration in seconds
    pub const CALL_DURATION_SECONDS: &str = "yatools_tool_call_duration_seconds";
}

/// Common label keys
pub mod labels {
    pub const TOOL: &str = "tool";
    pub const KIND: &str = "kind";
    pub const CHANNEL: &str = "channel";
    pub const OUTCOME: &str = "outcome";
}
