//! Test logging for the client crates.
//!
//! `TEST_LOG` takes either a bare level, which is applied to the client and
//! fake-server targets only, or full filter directives. `RUST_LOG` is used
//! verbatim when `TEST_LOG` is unset. With neither, only warnings show, so
//! the fake server's actix workers stay quiet.
//!
//! ```bash
//! TEST_LOG=debug cargo test -p client              # client + fake server
//! TEST_LOG=client::api=trace cargo test -p client  # explicit directives
//! ```

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

const CLIENT_TARGETS: [&str; 2] = ["client", "client_test_support"];

/// Install the test subscriber once per test binary.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let directives = filter_directives(
            std::env::var("TEST_LOG").ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
        );

        // Another subscriber may already be installed by the test harness.
        let _ = fmt()
            .with_env_filter(EnvFilter::new(directives))
            .with_test_writer()
            .without_time()
            .with_target(true)
            .try_init();
    });
}

fn filter_directives(test_log: Option<&str>, rust_log: Option<&str>) -> String {
    match test_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(level) if is_bare_level(level) => scoped(level),
        Some(directives) => directives.to_string(),
        None => rust_log
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| scoped("warn")),
    }
}

fn is_bare_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

fn scoped(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(CLIENT_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}
