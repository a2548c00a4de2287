//! Metrics for store observability.
//!
//! The store records counters through the `metrics` facade. They are no-ops
//! until a recorder is installed; [`install_prometheus_recorder`] installs one
//! that renders the Prometheus text format on demand (no HTTP listener).
//!
//! # Example
//!
//! ```rust,no_run
//! use slicestore_runtime::metrics::install_prometheus_recorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = install_prometheus_recorder()?;
//! // ... dispatch actions ...
//! println!("{}", handle.render());
//! # Ok(())
//! # }
//! ```

use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Actions that went through the reducer
pub const ACTIONS_DISPATCHED: &str = "store_actions_dispatched_total";

/// Listener invocations, counted per notification pass
pub const LISTENERS_NOTIFIED: &str = "store_listeners_notified_total";

/// Listeners that panicked while being notified
pub const LISTENER_FAILURES: &str = "store_listener_failures_total";

/// Dispatches rejected because a reducer was running
pub const REENTRANT_DISPATCHES: &str = "store_reentrant_dispatch_total";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to install metrics recorder
    #[error("Failed to install metrics recorder: {0}")]
    Install(String),
}

/// Register all metric descriptions.
pub fn describe_metrics() {
    describe_counter!(
        ACTIONS_DISPATCHED,
        "Total number of actions reduced by stores"
    );
    describe_counter!(
        LISTENERS_NOTIFIED,
        "Total number of listener invocations during notification"
    );
    describe_counter!(
        LISTENER_FAILURES,
        "Total number of listeners that panicked during notification"
    );
    describe_counter!(
        REENTRANT_DISPATCHES,
        "Total number of dispatches rejected because a reducer was running"
    );
}

/// Install a global Prometheus recorder and describe the store metrics.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] if a global recorder is already installed.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    describe_metrics();
    tracing::info!("Prometheus metrics recorder installed");

    Ok(handle)
}
