//! Shutdown signal shared by the `honeytrap` and `honeytrapd` binaries.

use tracing::warn;

/// Resolves on Ctrl+C. If the handler cannot be installed the process
/// runs until killed.
pub(crate) async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
