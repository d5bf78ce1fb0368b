//! Test fixtures for common setups.

use std::sync::Once;

use honeytrap_config::MonitorSection;
use honeytrap_tokens::DecoyDirectory;
use tempfile::TempDir;

/// A temporary directory holding the default decoys under `tokens/`.
///
/// Keep the [`TempDir`] alive for as long as the decoys are used.
///
/// # Panics
///
/// Panics if the directory or the decoys cannot be created.
#[must_use]
#[allow(clippy::expect_used)]
pub fn decoy_dir() -> (TempDir, DecoyDirectory) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let decoys = DecoyDirectory::new(dir.path().join("tokens")).expect("decoy directory");
    decoys.create_all().expect("write decoys");
    (dir, decoys)
}

/// Monitor settings with millisecond-scale timings so supervision tests
/// finish quickly.
#[must_use]
pub fn fast_monitor_section() -> MonitorSection {
    MonitorSection {
        health_interval_secs: 1,
        max_restarts: 5,
        restart_base_delay_ms: 1,
        restart_max_delay_ms: 8,
        stability_secs: 300,
        start_grace_ms: 20,
        stop_timeout_ms: 2000,
        max_loop_errors: 10,
        auto_restart: true,
    }
}

/// Install a test log subscriber once per process. Honors `RUST_LOG`.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
