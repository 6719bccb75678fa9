//! DHAT heap profiler for fifokit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use fifokit::policy::s3_fifo::S3FifoCache;
use fifokit::traits::CoreCache;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Run a hotset workload: 90% of accesses hit 10% of keys.
fn hotset_workload<C: CoreCache<u64, u64>>(
    cache: &mut C,
    operations: usize,
    universe: u64,
    seed: u64,
) {
    let mut rng = XorShift64::new(seed);
    let hot_size = (universe as f64 * 0.1) as u64;

    for _ in 0..operations {
        let key = if rng.next_f64() < 0.9 {
            rng.next_u64() % hot_size
        } else {
            hot_size + (rng.next_u64() % (universe - hot_size))
        };

        if cache.get(&key).is_none() {
            let _ = cache.insert(key, key);
        }
    }
}

/// Run a scan workload: sequential access pattern.
fn scan_workload<C: CoreCache<u64, u64>>(cache: &mut C, operations: usize, universe: u64) {
    for i in 0..operations {
        let key = (i as u64) % universe;
        if cache.get(&key).is_none() {
            let _ = cache.insert(key, key);
        }
    }
}

/// Run eviction churn: insert more items than capacity.
fn eviction_churn<C: CoreCache<u64, u64>>(cache: &mut C, operations: usize) {
    for i in 0..operations {
        let _ = cache.insert(i as u64, i as u64);
    }
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    const CAPACITY: usize = 16_384;
    const OPERATIONS: usize = 200_000;
    const UNIVERSE: u64 = 65_536;

    println!("fifokit dhat profile: capacity={CAPACITY}, operations={OPERATIONS}");

    let mut cache: S3FifoCache<u64, u64> = S3FifoCache::new(CAPACITY);
    hotset_workload(&mut cache, OPERATIONS, UNIVERSE, 0xF1F0);
    println!(
        "hotset:  len={} small={} main={} ghost={}",
        cache.len(),
        cache.small_len(),
        cache.main_len(),
        cache.ghost_len()
    );

    let mut cache: S3FifoCache<u64, u64> = S3FifoCache::new(CAPACITY);
    scan_workload(&mut cache, OPERATIONS, UNIVERSE);
    println!(
        "scan:    len={} small={} main={} ghost={}",
        cache.len(),
        cache.small_len(),
        cache.main_len(),
        cache.ghost_len()
    );

    let mut cache: S3FifoCache<u64, u64> = S3FifoCache::new(CAPACITY);
    eviction_churn(&mut cache, OPERATIONS);
    println!(
        "churn:   len={} small={} main={} ghost={}",
        cache.len(),
        cache.small_len(),
        cache.main_len(),
        cache.ghost_len()
    );

    assert!(cache.len() <= cache.capacity());
}
