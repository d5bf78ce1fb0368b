//! Supervisor lifecycle against real decoys: idempotent start, self-repair
//! through health checks and auto-restart of a crashed watch.

mod common;

use std::sync::Arc;
use std::time::Duration;

use honeytrap_monitor::{HealthState, Supervisor, SupervisorConfig, SupervisorError, SupervisorState};
use honeytrap_test::{ScriptedTokenStore, VerifyOutcome};
use honeytrap_tokens::TokenStore;

use common::{MonitorHarness, wait_for};

#[tokio::test]
async fn test_start_twice_attaches_one_watch() {
    let h = MonitorHarness::new();
    let supervisor = h.ctx.supervisor();

    supervisor.start().await.unwrap();
    let started_at = supervisor.status().started_at;
    supervisor.start().await.unwrap();

    let status = supervisor.status();
    assert!(status.is_running);
    assert_eq!(status.started_at, started_at);
    assert_eq!(status.monitored_files, 5);
    assert_eq!(supervisor.state(), SupervisorState::Running);

    supervisor.stop().await;
    assert_eq!(supervisor.health(), HealthState::Stopped);
}

#[tokio::test]
async fn test_health_check_recreates_deleted_decoy() {
    let h = MonitorHarness::new();
    let supervisor = h.ctx.supervisor();
    supervisor.start().await.unwrap();

    std::fs::remove_file(h.decoy("api_keys.json")).unwrap();
    let report = supervisor.check_health();

    assert!(report.is_healthy(), "{:?}", report.error_summary());
    assert!(h.decoy("api_keys.json").is_file());
    supervisor.stop().await;
}

#[tokio::test]
async fn test_start_rebuilds_removed_token_directory() {
    let h = MonitorHarness::new();
    h.ctx.decoys().cleanup().unwrap();
    std::fs::remove_dir(h.ctx.decoys().watch_root()).unwrap();

    // Recreation writes the decoys back, including the directory.
    h.ctx.supervisor().start().await.unwrap();
    assert!(h.ctx.decoys().watch_root().is_dir());
    h.ctx.supervisor().stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_auto_restart_revives_crashed_watch() {
    let h = MonitorHarness::with_auto_restart(true);
    let supervisor = Arc::clone(h.ctx.supervisor());
    supervisor.start_supervised().await.unwrap();
    assert!(supervisor.auto_restart_active());

    assert!(supervisor.kill_watch().await);
    let watcher = Arc::clone(&supervisor);
    assert!(wait_for(Duration::from_millis(200), || !watcher.is_running()).await);

    let revived = wait_for(Duration::from_secs(5), || watcher.is_running()).await;
    assert!(revived, "watch was not restarted");
    assert_eq!(supervisor.status().restart_count, 1);

    supervisor.stop().await;
    assert!(!supervisor.auto_restart_active());
    assert!(!h.ctx.audit().get_status().monitoring_active());
}

#[tokio::test]
async fn test_restart_budget_exhaustion_and_reset() {
    let h = MonitorHarness::new();
    let mut config = SupervisorConfig::from(&h.config.monitor);
    config.max_restarts = 2;

    let store = Arc::new(ScriptedTokenStore::new(
        h.ctx.decoys().watch_root(),
        h.ctx.decoys().list_protected_paths().unwrap(),
    ));
    let supervisor = Supervisor::new(
        config,
        Arc::clone(&store) as Arc<dyn TokenStore>,
        Arc::clone(h.ctx.audit()),
    );

    supervisor.start().await.unwrap();
    store.push_verify(VerifyOutcome::Unavailable("disk detached".into()));
    assert!(supervisor.restart().await.is_err());
    supervisor.restart().await.unwrap();

    let err = supervisor.restart().await.unwrap_err();
    assert!(matches!(
        err,
        SupervisorError::RestartBudgetExhausted { max_restarts: 2 }
    ));
    assert_eq!(supervisor.status().restart_count, 2);

    supervisor.reset_restart_budget();
    supervisor.restart().await.unwrap();
    assert!(supervisor.is_running());
    supervisor.stop().await;
}
