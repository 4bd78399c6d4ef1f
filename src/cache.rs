//! In-memory cache with TTL expiration
//!
//! Holds scan reports for remote frames and rendered swatch strips.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::image_processing::ScanReport;

/// A cached entry with expiration time
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Key for a remote scan: the URL and the strip fraction it was scanned with
pub fn remote_scan_key(url: &str, band_fraction: f64) -> String {
    format!("{}#{}", url, band_fraction)
}

pub struct ScanCache {
    ttl: Duration,
    /// Reports keyed by `remote_scan_key`
    reports: RwLock<HashMap<String, CacheEntry<Arc<ScanReport>>>>,
    /// Swatch PNGs keyed by comma-joined color names
    swatches: RwLock<HashMap<String, CacheEntry<Arc<Vec<u8>>>>>,
}

impl ScanCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            reports: RwLock::new(HashMap::new()),
            swatches: RwLock::new(HashMap::new()),
        }
    }

    /// Get cached report if not expired
    pub async fn get_report(&self, key: &str) -> Option<Arc<ScanReport>> {
        let cache = self.reports.read().await;
        cache.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    /// Store a report, dropping any expired entries on the way
    pub async fn set_report(&self, key: String, report: Arc<ScanReport>) {
        let mut cache = self.reports.write().await;
        cache.retain(|_, entry| !entry.is_expired());
        cache.insert(key, CacheEntry::new(report, self.ttl));
    }

    pub async fn get_swatch(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        let cache = self.swatches.read().await;
        cache.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    pub async fn set_swatch(&self, key: String, png: Arc<Vec<u8>>) {
        let mut cache = self.swatches.write().await;
        cache.retain(|_, entry| !entry.is_expired());
        cache.insert(key, CacheEntry::new(png, self.ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_swatch_round_trip() {
        let cache = ScanCache::new(Duration::from_secs(60));
        assert!(cache.get_swatch("brown,black,red").await.is_none());

        cache
            .set_swatch("brown,black,red".to_string(), Arc::new(vec![1, 2, 3]))
            .await;
        assert_eq!(
            cache.get_swatch("brown,black,red").await.as_deref(),
            Some(&vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn test_expired_entries_are_hidden() {
        let cache = ScanCache::new(Duration::ZERO);
        cache.set_swatch("red".to_string(), Arc::new(vec![9])).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get_swatch("red").await.is_none());
    }

    #[test]
    fn test_remote_scan_key() {
        assert_ne!(
            remote_scan_key("http://a/b.jpg", 0.2),
            remote_scan_key("http://a/b.jpg", 0.3)
        );
    }
}
