// src/sweeper.rs

use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::handlers::exam;

/// Background expiry sweep: periodically finalizes in-progress sessions
/// whose time budget elapsed without an explicit submit, so every attempt
/// ends in a statistics-correct terminal record.
///
/// Runs until the process exits. Spawn with `tokio::spawn(run(pool, secs))`.
pub async fn run(pool: SqlitePool, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // A missed tick (slow sweep, suspended VM) should not cause a burst.
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match sweep_once(&pool).await {
            Ok(0) => {}
            Ok(count) => tracing::info!("Expiry sweep finalized {} session(s)", count),
            Err(e) => tracing::error!("Expiry sweep failed to list sessions: {:?}", e),
        }
    }
}

/// One sweep pass. Each overdue session is finalized in its own transaction;
/// a failure on one is logged and the batch moves on.
pub async fn sweep_once(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let overdue: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM exam_sessions WHERE status = 'in_progress' AND expires_at < ?",
    )
    .bind(Utc::now())
    .fetch_all(pool)
    .await?;

    let mut finalized = 0;
    for session_id in overdue {
        match exam::finalize_expired(pool, session_id).await {
            Ok(true) => finalized += 1,
            // Someone finalized it between the scan and the transition.
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Failed to expire session {}: {:?}", session_id, e);
            }
        }
    }

    Ok(finalized)
}
