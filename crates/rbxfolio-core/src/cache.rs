// ── TTL result cache ──
//
// Process-wide memoization of upstream results, shared by every
// aggregation. Entries expire a fixed time after insertion. Misses for the
// same key are single-flight: one caller computes while the rest wait on
// the key's gate and then read what it stored.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Canonical cache key: an operation name plus its rendered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    params: String,
}

impl CacheKey {
    pub fn new(operation: &'static str, params: impl fmt::Display) -> Self {
        Self {
            operation,
            params: params.to_string(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.params)
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Concurrent key → value cache with a time-to-live.
///
/// `V` is cloned out on every hit, so large payloads should be stored
/// behind an `Arc`.
pub struct TtlCache<V> {
    entries: DashMap<CacheKey, Entry<V>>,
    /// Per-key gates serializing computation of a missing entry.
    gates: DashMap<CacheKey, Arc<Mutex<()>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            gates: DashMap::new(),
            ttl,
        }
    }

    /// Default time-to-live for inserted entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key`. An expired entry is evicted on the way out.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.value.clone()));

        match hit {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key` with the default TTL. Last write wins.
    pub fn insert(&self, key: CacheKey, value: V) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    pub fn insert_with_ttl(&self, key: CacheKey, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Return the live value for `key`, computing and storing it on a miss.
    ///
    /// Errors from `compute` are returned to the caller and not cached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_compute_with_ttl(key, self.ttl, compute).await
    }

    /// [`get_or_compute`](Self::get_or_compute) with an explicit TTL.
    pub async fn get_or_compute_with_ttl<F, Fut, E>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            trace!(%key, "cache hit");
            return Ok(value);
        }

        let lease = GateLease::acquire(&self.gates, &key);
        let _held = lease.gate.lock().await;

        // A concurrent caller may have filled the entry while we waited.
        if let Some(value) = self.get(&key) {
            trace!(%key, "cache filled by concurrent caller");
            return Ok(value);
        }

        trace!(%key, "cache miss");
        let result = compute().await;
        if let Ok(ref value) = result {
            self.insert_with_ttl(key.clone(), value.clone(), ttl);
        }
        result
    }

    /// Drop `key` regardless of expiry.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    /// Sweep every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// One caller's hold on a key's gate. Dropping it removes the gate from the
/// map once no other caller references it, on every exit path including
/// cancellation while queued.
struct GateLease<'a> {
    gates: &'a DashMap<CacheKey, Arc<Mutex<()>>>,
    key: &'a CacheKey,
    gate: Arc<Mutex<()>>,
}

impl<'a> GateLease<'a> {
    fn acquire(gates: &'a DashMap<CacheKey, Arc<Mutex<()>>>, key: &'a CacheKey) -> Self {
        let gate = gates
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        Self { gates, key, gate }
    }
}

impl Drop for GateLease<'_> {
    fn drop(&mut self) {
        // Release our handle first so the last lease out sees only the
        // map's reference.
        drop(std::mem::take(&mut self.gate));
        self.gates
            .remove_if(self.key, |_, gate| Arc::strong_count(gate) == 1);
    }
}
