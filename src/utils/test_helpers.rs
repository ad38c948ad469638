use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Installs the tracing subscriber for test runs, exactly once.
///
/// Tests run in parallel and the global subscriber can only be set a single
/// time, hence the `Once` guard; `try_init` covers the case where another
/// crate in the test process got there first.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}
