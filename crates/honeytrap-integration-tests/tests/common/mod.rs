//! Shared test harness for integration tests.

use std::path::PathBuf;
use std::time::Duration;

use honeytrap_config::Config;
use honeytrap_monitor::AppContext;
use tempfile::TempDir;

/// An application context rooted in a temporary directory.
///
/// Decoys live in `<tmp>/tokens`, the audit trail in `<tmp>/logs`. The
/// tempdir is cleaned up when the harness is dropped.
#[allow(dead_code)]
pub struct MonitorHarness {
    /// The wired-up application.
    pub ctx: AppContext,
    /// The configuration the context was built from.
    pub config: Config,
    dir: TempDir,
}

#[allow(dead_code)]
impl MonitorHarness {
    /// Build a harness with fast supervision timings and the JSON backend.
    pub fn new() -> Self {
        Self::with_auto_restart(false)
    }

    /// Build a harness, choosing whether `run_until` supervises.
    pub fn with_auto_restart(auto_restart: bool) -> Self {
        honeytrap_test::init_test_logging();
        let dir = TempDir::new().expect("failed to create tempdir");

        let mut config = Config::default();
        config.tokens.directory = dir.path().join("tokens");
        config.audit.directory = dir.path().join("logs");
        config.audit.backend = "json".to_owned();
        config.monitor = honeytrap_test::fast_monitor_section();
        config.monitor.auto_restart = auto_restart;

        let ctx = AppContext::initialize(config.clone()).expect("failed to initialize context");
        Self { ctx, config, dir }
    }

    /// Path of a decoy by file name.
    pub fn decoy(&self, name: &str) -> PathBuf {
        self.config.tokens.directory.join(name)
    }

    /// The audit directory.
    pub fn logs_dir(&self) -> PathBuf {
        self.dir.path().join("logs")
    }
}

/// Poll `pred` every 25ms until it holds or `timeout` elapses.
#[allow(dead_code)]
pub async fn wait_for(timeout: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now()
        .checked_add(timeout)
        .expect("timeout overflows the clock");
    loop {
        if pred() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
