use tracing_subscriber::EnvFilter;

/// Routes tracing output to stderr, filtered by `QUICKSET_LOG` (info when
/// unset) so normal runs stay quiet and `QUICKSET_LOG=trace` shows the exact
/// backend invocations.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("QUICKSET_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
