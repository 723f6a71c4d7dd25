// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup and access to an optional Docker engine for integration tests.

use dockpanel::connector::Connector;
use dockpanel::dispatch::Dispatcher;
use std::sync::Once;
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Engine used by tests that need a real daemon.
pub const TEST_ENGINE_VAR: &str = "DOCKPANEL_TEST_ENGINE";

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("dockpanel=debug".parse().unwrap())
            .add_directive("russh=info".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// URI of the test engine (`tcp://localhost:2375` unless overridden).
#[allow(dead_code)]
pub fn test_engine_uri() -> String {
    std::env::var(TEST_ENGINE_VAR).unwrap_or_else(|_| "tcp://localhost:2375".to_string())
}

/// A dispatcher connected to the test engine, or `None` when it is unreachable.
#[allow(dead_code)]
pub async fn connected_dispatcher() -> Option<Dispatcher> {
    init_tracing();
    let mut dispatcher = Dispatcher::new(Connector::new(Duration::from_secs(60)));
    match dispatcher.connect_tcp(&test_engine_uri()).await {
        Ok(()) => Some(dispatcher),
        Err(e) => {
            eprintln!("Skipping test: {e}");
            None
        }
    }
}
