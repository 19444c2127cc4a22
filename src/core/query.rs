//! Keyed query cache with coarse, per-entity invalidation
//!
//! Reads are cached under a [`QueryKey`] (`entity` + parameters) and served
//! from memory until a write on the same entity succeeds. Invalidation is
//! deliberately coarse: a successful write discards every cached read of
//! its entity, and the next read refetches.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::core::error::ClientError;
use crate::core::pagination::PaginationParams;

/// Identifies one cached read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    entity: String,
    params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Key for a paginated list read; unset parameters are left out
    pub fn list(entity: &str, params: &PaginationParams) -> Self {
        let mut key = Self::new(entity);
        if let Some(page) = params.page {
            key = key.param("page", page);
        }
        if let Some(limit) = params.limit {
            key = key.param("limit", limit);
        }
        key
    }

    /// Key for a single-entity read
    pub fn detail(entity: &str, id: &str) -> Self {
        Self::new(entity).param("id", id)
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}[{}]", self.entity, params.join(","))
    }
}

/// Lifecycle of a read as seen by a view
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Ready(Arc<T>),
    Failed(ClientError),
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            QueryState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Idle
    }
}

impl<T> From<Result<Arc<T>, ClientError>> for QueryState<T> {
    fn from(result: Result<Arc<T>, ClientError>) -> Self {
        match result {
            Ok(data) => QueryState::Ready(data),
            Err(err) => QueryState::Failed(err),
        }
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: DateTime<Utc>,
}

/// Per-entity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub hits: u64,
    pub fetches: u64,
    pub invalidations: u64,
}

/// Shared query cache
#[derive(Default)]
pub struct QueryClient {
    entries: DashMap<QueryKey, CacheEntry>,
    /// Bumped on every invalidation; guards against storing stale reads
    generations: DashMap<String, u64>,
    stats: DashMap<String, QueryStats>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `key` from cache, or run `fetcher` and cache its result
    ///
    /// Errors from the fetcher are returned unchanged and never cached. If
    /// the entity is invalidated while the fetcher runs, the result is still
    /// returned to this caller but not stored.
    pub fn fetch<T, F>(&self, key: &QueryKey, fetcher: F) -> Result<Arc<T>, ClientError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, ClientError>,
    {
        if let Some(hit) = self.cached::<T>(key) {
            trace!(%key, "cache hit");
            self.stats.entry(key.entity.clone()).or_default().hits += 1;
            return Ok(hit);
        }

        let generation = self.generation(&key.entity);
        debug!(%key, "cache miss, fetching");
        self.stats.entry(key.entity.clone()).or_default().fetches += 1;

        let value = Arc::new(fetcher().inspect_err(|e| {
            warn!(%key, error = %e, "query failed");
        })?);

        if self.generation(&key.entity) == generation {
            self.entries.insert(
                key.clone(),
                CacheEntry {
                    value: value.clone(),
                    fetched_at: Utc::now(),
                },
            );
        } else {
            debug!(%key, "discarding response that resolved after invalidation");
        }

        Ok(value)
    }

    /// Run a write; on success invalidate every read of `entity`
    pub fn mutate<T, F>(&self, entity: &str, op: F) -> Result<T, ClientError>
    where
        F: FnOnce() -> Result<T, ClientError>,
    {
        let result = op().inspect_err(|e| {
            warn!(entity, error = %e, "mutation failed");
        })?;
        self.invalidate(entity);
        Ok(result)
    }

    /// Drop every cached read of `entity`; returns how many were removed
    pub fn invalidate(&self, entity: &str) -> usize {
        *self.generations.entry(entity.to_string()).or_insert(0) += 1;

        let before = self.entries.len();
        self.entries.retain(|key, _| key.entity != entity);
        let removed = before.saturating_sub(self.entries.len());

        self.stats.entry(entity.to_string()).or_default().invalidations += 1;
        debug!(entity, removed, "invalidated cached queries");
        removed
    }

    /// Cached value for `key`, if present and of type `T`
    pub fn cached<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.entries.get(key)?.value.clone();
        value.downcast::<T>().ok()
    }

    pub fn is_cached(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// When `key` was last fetched
    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|e| e.fetched_at)
    }

    pub fn stats(&self, entity: &str) -> QueryStats {
        self.stats.get(entity).map(|s| *s).unwrap_or_default()
    }

    pub fn invalidation_count(&self, entity: &str) -> u64 {
        self.stats(entity).invalidations
    }

    fn generation(&self, entity: &str) -> u64 {
        self.generations.get(entity).map(|g| *g).unwrap_or(0)
    }
}
