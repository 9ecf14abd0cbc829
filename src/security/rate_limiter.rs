use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fixed-window request counter keyed by client address and endpoint label
#[derive(Clone, Debug)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

#[derive(Debug)]
struct RateLimiterInner {
    buckets: Mutex<HashMap<String, Bucket>>,
    /// Requests allowed per window
    limit: u32,
    /// Window length in seconds
    window_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bucket {
    count: u32,
    /// Unix seconds; the window is over once now > reset_at
    reset_at: i64,
}

impl RateLimiter {
    pub fn new(limit: u32, window_secs: i64) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                buckets: Mutex::new(HashMap::new()),
                limit,
                window_secs: window_secs.max(1),
            }),
        }
    }

    /// Bucket key for a client address and endpoint label
    pub fn key(client_ip: &str, label: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}:{}", client_ip, label).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Count one request. `Err` carries the seconds until the window resets.
    pub async fn hit(&self, client_ip: &str, label: &str) -> Result<(), u64> {
        self.hit_at(&Self::key(client_ip, label), Utc::now().timestamp())
            .await
    }

    pub async fn hit_at(&self, key: &str, now: i64) -> Result<(), u64> {
        let mut buckets = self.inner.buckets.lock().await;
        let window = self.inner.window_secs;

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            reset_at: now + window,
        });

        if now > bucket.reset_at {
            bucket.count = 0;
            bucket.reset_at = now + window;
        }

        bucket.count = bucket.count.saturating_add(1);
        if bucket.count > self.inner.limit {
            Err((bucket.reset_at - now).max(1) as u64)
        } else {
            Ok(())
        }
    }

    /// Drop buckets whose window has closed
    pub async fn purge_expired(&self, now: i64) -> usize {
        let mut buckets = self.inner.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now <= bucket.reset_at);
        before - buckets.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.buckets.lock().await.len()
    }
}
