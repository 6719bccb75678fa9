#![no_main]

use fifokit::policy::s3_fifo::S3FifoCache;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on S3FifoCache
//
// Tests random sequences of insert, get, get_mut, peek, contains, remove,
// and clear against the capacity bound and the internal invariant checker.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = ((data[0] as usize) % 32).max(1);
    let mut cache: S3FifoCache<u8, u32> = S3FifoCache::new(capacity);

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 8;
        let key = data[idx + 1] % 64;
        idx += 2;

        match op {
            0 | 1 => {
                // insert (weighted: the interesting paths are here)
                cache.insert(key, u32::from(key) * 10);
                assert!(cache.len() <= capacity);
            }
            2 => {
                let got = cache.get(&key).copied();
                if got.is_some() {
                    assert!(cache.contains(&key));
                }
            }
            3 => {
                if let Some(value) = cache.get_mut(&key) {
                    *value = value.wrapping_add(1);
                }
            }
            4 => {
                // peek never changes anything observable
                let before = cache.len();
                let _ = cache.peek(&key);
                assert_eq!(cache.len(), before);
            }
            5 => {
                let _ = cache.contains(&key);
            }
            6 => {
                let removed = cache.remove(&key);
                assert!(!cache.contains(&key));
                if removed.is_some() {
                    // A second remove of the same key is a no-op.
                    assert_eq!(cache.remove(&key), None);
                }
            }
            7 => {
                if key == 0 {
                    cache.clear();
                    assert_eq!(cache.len(), 0);
                    assert_eq!(cache.ghost_len(), 0);
                }
            }
            _ => unreachable!(),
        }

        assert!(cache.len() <= capacity);
        assert_eq!(cache.len(), cache.small_len() + cache.main_len());
        #[cfg(debug_assertions)]
        cache.check_invariants().unwrap();
    }
});
