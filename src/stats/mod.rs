//! Statistics collaborator.
//!
//! The coordinator never talks to a store directly: it hands record/fetch requests to
//! the [`worker::StatsWorker`] actor, which performs them off the coordinator's
//! critical section and pushes `StatsUpdate` frames when they succeed.

pub mod store;
pub mod worker;

use std::future::Future;
use std::time::Duration;

pub use store::{GameResult, MemoryStatsStore, PlayerStats, StatsError, StatsStore};
pub use worker::{FetchStats, RecordOutcomes, RecordedResult, StatsWorker};

/// Run a store call with an upper bound on its duration.
pub async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, StatsError>>,
) -> Result<T, StatsError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| StatsError::Timeout)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_calls_time_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<(), StatsError>(())
        };
        assert_eq!(bounded(Duration::from_millis(10), slow).await, Err(StatsError::Timeout));
    }

    #[tokio::test]
    async fn store_errors_pass_through() {
        let failing = async { Err::<(), _>(StatsError::Unavailable("down".into())) };
        assert_eq!(
            bounded(Duration::from_secs(1), failing).await,
            Err(StatsError::Unavailable("down".into()))
        );
    }
}
