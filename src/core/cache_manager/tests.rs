//! Cache manager tests

#[cfg(test)]
mod tests {
    use crate::core::cache_manager::{CacheConfig, CacheEntry, ExpiringCache};
    use crate::utils::sys::MockClock;
    use std::sync::Arc;
    use std::time::Duration;

    fn mock_cache() -> (ExpiringCache<String, u32>, Arc<MockClock>) {
        let clock = MockClock::shared();
        let cache = ExpiringCache::with_clock(CacheConfig::default(), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_set_and_get() {
        let (cache, _clock) = mock_cache();

        assert_eq!(cache.get("alien|1979"), None);
        cache.set("alien|1979".to_string(), 348, Duration::from_secs(60));
        assert_eq!(cache.get("alien|1979"), Some(348));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_expired_entry_is_absent_before_any_sweep() {
        let (cache, clock) = mock_cache();
        cache.set("k".to_string(), 1, Duration::from_secs(10));

        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get("k"), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("k"), None);
        // lazy expiry removed it
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expired_on_read, 1);
    }

    #[test]
    fn test_reads_do_not_extend_ttl() {
        let (cache, clock) = mock_cache();
        cache.set("k".to_string(), 1, Duration::from_secs(10));

        for _ in 0..5 {
            clock.advance(Duration::from_secs(2));
            assert_eq!(cache.get("k"), Some(1));
        }
        clock.advance(Duration::from_millis(1));

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().hits, 5);
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let now = std::time::Instant::now();
        let entry = CacheEntry::new("v", now, Duration::from_secs(1));

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::from_secs(1)));
        assert!(entry.is_expired(now + Duration::from_millis(1001)));
    }

    #[test]
    fn test_set_replaces_and_restarts_ttl() {
        let (cache, clock) = mock_cache();
        cache.set("k".to_string(), 1, Duration::from_secs(5));
        clock.advance(Duration::from_secs(4));
        cache.set("k".to_string(), 2, Duration::from_secs(5));
        clock.advance(Duration::from_secs(4));

        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_insert_uses_default_ttl() {
        let clock = MockClock::shared();
        let cache: ExpiringCache<&'static str, &'static str> = ExpiringCache::with_clock(
            CacheConfig {
                default_ttl: Duration::from_secs(2),
                ..Default::default()
            },
            clock.clone(),
        );

        cache.insert("a", "b");
        clock.advance(Duration::from_secs(3));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_cleanup_expired_and_clear() {
        let (cache, clock) = mock_cache();
        cache.set("short".to_string(), 1, Duration::from_secs(1));
        cache.set("long".to_string(), 2, Duration::from_secs(100));
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().swept, 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove() {
        let (cache, _clock) = mock_cache();
        cache.set("k".to_string(), 9, Duration::from_secs(1));
        assert_eq!(cache.remove("k"), Some(9));
        assert_eq!(cache.remove("k"), None);
    }

    #[test]
    fn test_sweeper_requires_runtime() {
        let (cache, _clock) = mock_cache();
        assert!(cache.start_sweeper(Duration::from_secs(1)).is_err());
        assert!(!cache.is_sweeping());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_removes_expired_entries() {
        let (cache, clock) = mock_cache();
        cache.set("stale".to_string(), 1, Duration::from_secs(1));
        cache.set("fresh".to_string(), 2, Duration::from_secs(7200));
        clock.advance(Duration::from_secs(5));

        cache.start_sweeper(Duration::from_secs(1800)).unwrap();
        assert!(cache.is_sweeping());
        assert_eq!(cache.len(), 2);

        tokio::time::sleep(Duration::from_secs(1801)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().swept, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_sweeper() {
        let (cache, clock) = mock_cache();
        cache.set("stale".to_string(), 1, Duration::from_secs(1));
        clock.advance(Duration::from_secs(5));

        cache.start_sweeper(Duration::from_secs(60)).unwrap();
        cache.close();
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert!(!cache.is_sweeping());
        assert_eq!(cache.len(), 1);
        // reads still honour expiry
        assert_eq!(cache.get("stale"), None);
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let cache = Arc::new(ExpiringCache::<u32, u32>::new(CacheConfig::default()));
        let mut handles = Vec::new();
        for worker in 0..8u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    cache.set(worker * 1000 + i, i, Duration::from_secs(60));
                    assert_eq!(cache.get(&(worker * 1000 + i)), Some(i));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.len(), 800);
    }
}
