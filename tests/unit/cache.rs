use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::FlipbookError;

fn id(n: usize) -> FrameId {
    FrameId::new(format!("frame_{n:03}.png"))
}

#[test]
fn hit_does_not_recompute() {
    let cache = FrameCache::<String>::new(4, EvictionPolicy::AdmissionCapped);
    let runs = AtomicUsize::new(0);
    let compute = || {
        runs.fetch_add(1, Ordering::SeqCst);
        Ok("payload".to_string())
    };

    let a = cache.get_or_compute(&id(0), compute).unwrap();
    let b = cache
        .get_or_compute(&id(0), || panic!("hit must not compute"))
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.computes), (1, 1, 1));
}

#[test]
fn admission_cap_returns_but_does_not_retain() {
    let cap = 3;
    let cache = FrameCache::<usize>::new(cap, EvictionPolicy::AdmissionCapped);
    for n in 0..cap {
        cache.get_or_compute(&id(n), || Ok(n)).unwrap();
    }
    assert_eq!(cache.len(), cap);

    let over = cache.get_or_compute(&id(cap), || Ok(99)).unwrap();
    assert_eq!(*over, 99);
    assert_eq!(cache.len(), cap);
    assert!(!cache.contains(&id(cap)));

    // Same id again: recomputed, not a hit.
    let runs = AtomicUsize::new(0);
    cache
        .get_or_compute(&id(cap), || {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(100)
        })
        .unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stats().rejected, 2);

    // Earlier entries are never evicted.
    for n in 0..cap {
        assert_eq!(*cache.get_or_compute(&id(n), || Ok(0)).unwrap(), n);
    }
}

#[test]
fn lru_evicts_least_recently_used() {
    let cache = FrameCache::<usize>::new(2, EvictionPolicy::Lru);
    cache.get_or_compute(&id(0), || Ok(0)).unwrap();
    cache.get_or_compute(&id(1), || Ok(1)).unwrap();
    // Touch 0 so 1 becomes the oldest.
    cache.get_or_compute(&id(0), || Ok(0)).unwrap();
    cache.get_or_compute(&id(2), || Ok(2)).unwrap();

    assert!(cache.contains(&id(0)));
    assert!(!cache.contains(&id(1)));
    assert!(cache.contains(&id(2)));
    assert_eq!(cache.stats().evicted, 1);
    assert_eq!(cache.len(), 2);
}

#[test]
fn failed_compute_leaves_cache_untouched() {
    let cache = FrameCache::<usize>::new(2, EvictionPolicy::AdmissionCapped);
    let err = cache
        .get_or_compute(&id(0), || Err(FlipbookError::fetch_failed("timeout")))
        .unwrap_err();
    assert!(err.to_string().contains("timeout"));
    assert!(cache.is_empty());
    assert_eq!(cache.stats().computes, 0);

    assert_eq!(*cache.get_or_compute(&id(0), || Ok(5)).unwrap(), 5);
    assert_eq!(cache.len(), 1);
}

#[test]
fn concurrent_misses_never_exceed_capacity() {
    let cap = 8;
    let cache = Arc::new(FrameCache::<usize>::new(cap, EvictionPolicy::AdmissionCapped));

    let handles: Vec<_> = (0..32)
        .map(|n| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                // Two threads per id race the same miss.
                let key = id(n / 2);
                *cache.get_or_compute(&key, || Ok(n / 2)).unwrap()
            })
        })
        .collect();

    for (n, h) in handles.into_iter().enumerate() {
        assert_eq!(h.join().unwrap(), n / 2);
    }
    assert_eq!(cache.len(), cap);
}

#[derive(Clone, Default)]
struct LogBuf(Arc<parking_lot::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn misses_and_hits_are_logged_at_debug() {
    let buf = LogBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let cache = FrameCache::<usize>::new(2, EvictionPolicy::AdmissionCapped);
    tracing::subscriber::with_default(subscriber, || {
        cache.get_or_compute(&id(7), || Ok(7)).unwrap();
        cache.get_or_compute(&id(7), || Ok(7)).unwrap();
    });

    let logs = String::from_utf8(buf.0.lock().clone()).unwrap();
    assert!(logs.contains("frame cache miss"), "{logs}");
    assert!(logs.contains("frame cache hit"), "{logs}");
    assert!(logs.contains("frame_007.png"), "{logs}");
}
