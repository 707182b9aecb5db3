//! Metrics collection and export for yatools.
//!
//! Metric names live in [`definitions`]; call sites record through the
//! re-exported `metrics` facade macros. With the `prometheus` feature the
//! recorder renders the Prometheus text format for the HTTP `/metrics` route.
//!
//! ```rust,ignore
//! use yatools_metrics::{counter, messages};
//!
//! counter!(messages::PERSISTED_TOTAL, "kind" => "image").increment(1);
//! ```

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, init_metrics},
};

pub use metrics::{counter, gauge, histogram};
