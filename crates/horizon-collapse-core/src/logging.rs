//! Logging facilities for Horizon Collapse.
//!
//! Horizon Collapse uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_collapse=trace")
//!         .init();
//! }
//! ```

/// Span names used throughout Horizon Collapse for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Content height measurement span.
    pub const MEASURE: &str = "horizon_collapse::measure";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_collapse_core::signal";
    /// Frame scheduler target.
    pub const FRAME: &str = "horizon_collapse_core::frame";
    /// Transition controller target.
    pub const TRANSITION: &str = "horizon_collapse::transition";
    /// Collapse item facade target.
    pub const ITEM: &str = "horizon_collapse::item";
    /// Collapse group target.
    pub const GROUP: &str = "horizon_collapse::group";
}

/// A guard for performance tracing spans.
///
/// The span is entered on creation and exited when the guard is dropped.
///
/// ```
/// use horizon_collapse_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("measure_content");
///     // timed work
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_collapse::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}
