//! Periodic session eviction (spec §5's "session-eviction runs as a periodic background
//! task"), driven by `APP_SESSION_TIMEOUT_HOURS` / `APP_SESSION_CLEANUP_INTERVAL_HOURS`.

use std::sync::Arc;
use std::time::Duration;

use intake_core::Orchestrator;

const DEFAULT_SESSION_TIMEOUT_HOURS: i64 = 24;
const DEFAULT_CLEANUP_INTERVAL_HOURS: u64 = 6;

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Spawns the eviction loop. Runs until the process exits; there is no handle to stop it
/// early since the server itself is the only thing that outlives it.
pub fn spawn(orchestrator: Arc<Orchestrator>) {
    let cutoff_hours = env_i64("APP_SESSION_TIMEOUT_HOURS", DEFAULT_SESSION_TIMEOUT_HOURS);
    let interval_hours = env_u64(
        "APP_SESSION_CLEANUP_INTERVAL_HOURS",
        DEFAULT_CLEANUP_INTERVAL_HOURS,
    );
    let period = Duration::from_secs(interval_hours * 3600);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; skip it so eviction doesn't run at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = orchestrator.cleanup_sessions(cutoff_hours).await;
            if removed > 0 {
                tracing::info!(removed, cutoff_hours, "evicted stale sessions");
            }
        }
    });
}
