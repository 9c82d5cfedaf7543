#![allow(dead_code)]

// tests/common/mod.rs
use client::{ClientConfig, HttpGameClient};
use client_test_support::FakeServer;

pub mod proptest_prelude;

/// Logging for test binaries; safe to call from every test.
pub fn init_logging() {
    client_test_support::logging::init();
}

/// Client pointed at `server` with a short timeout.
pub fn client_for(server: &FakeServer) -> HttpGameClient {
    HttpGameClient::new(config_for(server)).expect("client config should be valid")
}

pub fn config_for(server: &FakeServer) -> ClientConfig {
    ClientConfig::default()
        .with_server_address(server.base_url())
        .with_timeout(Some(std::time::Duration::from_secs(5)))
}
