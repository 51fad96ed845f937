//! Tracing setup and the per-request trace context.
//!
//! The HTTP layer stamps each request with a trace id (taken from the
//! `x-trace-id` header or freshly generated) and runs the handler inside
//! [`with_trace_context`]; error responses pull it back out through
//! [`current_trace_id`] so problem responses and logs correlate.

use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;
use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::Layer,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::AppConfig;

/// Request-scoped correlation metadata.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

task_local! {
    static ACTIVE_TRACE_CONTEXT: TraceContext;
}

static TELEMETRY_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the global tracing subscriber and the `log::` bridge.
///
/// Format and default level come from [`AppConfig`]; `RUST_LOG` overrides
/// the level. Safe to call more than once: repeated calls, and a subscriber
/// some other component already installed, are no-ops.
pub fn init_tracing(config: &AppConfig) {
    if TELEMETRY_INSTALLED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }

    // Route legacy `log::` macros (dependencies still emit them) through
    // tracing. Failure means a logger is already registered.
    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = match config.log_format.as_str() {
        "pretty" => fmt::layer().pretty().boxed(),
        _ => fmt::layer().json().boxed(),
    };

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        TELEMETRY_INSTALLED.store(false, Ordering::SeqCst);
    }
}

/// Run `future` with `context` visible to everything in the task.
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    ACTIVE_TRACE_CONTEXT.scope(context, future).await
}

/// The trace id of the active request, when called inside one.
pub fn current_trace_id() -> Option<String> {
    ACTIVE_TRACE_CONTEXT
        .try_with(|ctx| ctx.trace_id.clone())
        .ok()
}
