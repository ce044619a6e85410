use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber. A second call is a no-op, so tests and
/// embedding callers that already installed one are left alone.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
