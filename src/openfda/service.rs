//! Label service: caching and request coalescing over the openFDA client.
//!
//! Fetched label sets are cached by search expression with a TTL. Queries
//! that matched nothing land in a short-lived negative cache so repeated
//! misses don't reach the upstream. Identical concurrent queries coalesce:
//! the first caller fetches, everyone else subscribes to a broadcast of the
//! result.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use tokio::sync::{broadcast, Mutex};
use tracing::instrument;

use crate::config::{
    AppConfig, CacheConfig, OpenFdaSettings, BROADCAST_CHANNEL_CAPACITY,
    NEGATIVE_CACHE_SIZE_DIVISOR, NEGATIVE_CACHE_TTL_SECS,
};

use super::client::{FetchError, OpenFdaClient};
use super::query::LabelQuery;
use super::records::{DrugInfoView, LabelRecord, LabelSection};

/// Pending fetch with timestamp for timeout checking
type PendingEntry = (
    broadcast::Sender<Result<Arc<Vec<LabelRecord>>, FetchError>>,
    Instant,
);

/// Cached, coalescing access to openFDA drug labels.
#[derive(Clone)]
pub struct OpenFdaService {
    client: OpenFdaClient,
    /// Cache for fetched label sets (key: search expression + limit)
    label_cache: Cache<String, Arc<Vec<LabelRecord>>>,
    /// Cache for queries that matched nothing (negative cache, short TTL)
    miss_cache: Cache<String, ()>,
    /// In-flight fetches for coalescing
    pending: Arc<Mutex<HashMap<String, PendingEntry>>>,
    /// How long a coalesced waiter will wait before giving up
    request_timeout: Duration,
}

impl OpenFdaService {
    /// Create the service from application configuration.
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let client = OpenFdaClient::new(&config.openfda)?;
        Ok(Self::with_client(client, &config.cache, &config.openfda))
    }

    /// Create the service with an explicit client and cache config.
    pub fn with_client(
        client: OpenFdaClient,
        cache_config: &CacheConfig,
        settings: &OpenFdaSettings,
    ) -> Self {
        let label_cache = Cache::builder()
            .max_capacity(cache_config.max_label_sets)
            .time_to_live(Duration::from_secs(cache_config.label_ttl_seconds))
            .build();

        let miss_cache = Cache::builder()
            .max_capacity(cache_config.max_label_sets / NEGATIVE_CACHE_SIZE_DIVISOR)
            .time_to_live(Duration::from_secs(NEGATIVE_CACHE_TTL_SECS))
            .build();

        // A coalesced waiter must outlast the primary's full retry budget
        let attempts = u64::from(settings.max_retries.max(1));
        let request_timeout = Duration::from_secs(settings.timeout_seconds * attempts + 5);

        Self {
            client,
            label_cache,
            miss_cache,
            pending: Arc::new(Mutex::new(HashMap::new())),
            request_timeout,
        }
    }

    /// Per-product drug info for the matching labels.
    pub async fn drug_info(&self, query: &LabelQuery) -> Result<Vec<DrugInfoView>, FetchError> {
        let records = self.fetch_labels(query).await?;
        Ok(records.iter().map(DrugInfoView::from).collect())
    }

    /// One label section's text blocks, concatenated across matching labels
    /// in upstream order.
    pub async fn section(
        &self,
        query: &LabelQuery,
        section: LabelSection,
    ) -> Result<Vec<String>, FetchError> {
        let records = self.fetch_labels(query).await?;
        Ok(records
            .iter()
            .flat_map(|record| section.extract(record).iter().cloned())
            .collect())
    }

    /// Fetch the label set for a query, consulting caches and coalescing
    /// identical in-flight fetches.
    #[instrument(
        name = "openfda.service.fetch_labels",
        skip(self, query),
        fields(cache_hit = false, coalesced = false)
    )]
    async fn fetch_labels(&self, query: &LabelQuery) -> Result<Arc<Vec<LabelRecord>>, FetchError> {
        let key = query.cache_key();

        if let Some(records) = self.label_cache.get(&key).await {
            tracing::Span::current().record("cache_hit", true);
            return Ok(records);
        }
        if self.miss_cache.get(&key).await.is_some() {
            tracing::Span::current().record("cache_hit", true);
            return Ok(Arc::new(Vec::new()));
        }

        // Check for an in-flight fetch of the same query (coalesce if fresh)
        let mut pending = self.pending.lock().await;
        if let Some((tx, started_at)) = pending.get(&key) {
            if started_at.elapsed() < self.request_timeout {
                let mut rx = tx.subscribe();
                drop(pending); // Release lock while waiting
                tracing::Span::current().record("coalesced", true);

                return match tokio::time::timeout(self.request_timeout, rx.recv()).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => Err(FetchError("broadcast channel closed".to_string())),
                    Err(_) => Err(FetchError("request timeout".to_string())),
                };
            }
            // Stale pending entry, take over as the primary fetcher
            tracing::debug!(%key, "pending fetch timed out, starting fresh");
            pending.remove(&key);
        }

        let (tx, _rx) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
        pending.insert(key.clone(), (tx.clone(), Instant::now()));
        drop(pending);

        let result = self
            .client
            .search(&query.search_expression(), query.limit)
            .await
            .map(|response| Arc::new(response.results));

        match &result {
            Ok(records) if records.is_empty() => {
                self.miss_cache.insert(key.clone(), ()).await;
            }
            Ok(records) => {
                self.label_cache.insert(key.clone(), Arc::clone(records)).await;
            }
            Err(_) => {}
        }

        self.pending.lock().await.remove(&key);
        let _ = tx.send(result.clone());
        result
    }
}
