// src/engine/dashboard.rs

//! Short-lived memo of the dedup → rank pipeline, keyed by search string.

use std::sync::Arc;
use std::time::Duration;

use moka::{future::Cache, policy::EvictionPolicy};

use crate::{
    engine::{dedup, rank},
    error::AppError,
    models::attempt::{DashboardPayload, ResultSummary},
    source::RecordSource,
};

/// Trims and lowercases a search string into a cache key. Blank becomes "".
pub fn normalize_key(search: Option<&str>) -> String {
    search.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

/// Runs the pipeline uncached.
pub async fn compute(
    source: &dyn RecordSource,
    key: &str,
) -> Result<DashboardPayload, AppError> {
    let filter = (!key.is_empty()).then_some(key);
    let latest = dedup::latest_per_candidate(source, filter).await?;

    Ok(DashboardPayload {
        results: latest.iter().map(ResultSummary::from).collect(),
        leaderboard: rank::rank(&latest),
    })
}

/// Memoizes dashboard payloads for a fixed TTL.
///
/// A live entry is returned as is. A missing or expired one is recomputed;
/// concurrent misses on the same key share one computation. Failed
/// computations are not stored. With `max_entries` set, the least recently
/// used keys are evicted once the bound is reached.
#[derive(Clone)]
pub struct DashboardCache {
    entries: Cache<String, Arc<DashboardPayload>>,
}

impl DashboardCache {
    pub fn new(ttl: Duration, max_entries: Option<usize>) -> Self {
        let builder = Cache::builder()
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru());
        let entries = match max_entries {
            Some(max) => builder.max_capacity(max as u64).build(),
            None => builder.build(),
        };
        Self { entries }
    }

    pub async fn get(
        &self,
        source: &dyn RecordSource,
        search: Option<&str>,
    ) -> Result<Arc<DashboardPayload>, AppError> {
        let key = normalize_key(search);

        if let Some(payload) = self.entries.get(&key).await {
            tracing::debug!(key = %key, "Dashboard cache hit");
            return Ok(payload);
        }

        tracing::debug!(key = %key, "Dashboard cache miss, recomputing");
        self.entries
            .try_get_with(key.clone(), async {
                compute(source, &key).await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Live entries, after pending evictions have been applied.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}
