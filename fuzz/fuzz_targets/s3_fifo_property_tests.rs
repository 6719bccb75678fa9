#![no_main]

use fifokit::policy::s3_fifo::S3FifoCache;
use libfuzzer_sys::fuzz_target;

// Fuzz property-based tests for S3FifoCache
//
// Tests specific invariants and properties:
// - Capacity bound over arbitrary insert streams
// - Ghost opacity (membership without availability)
// - Promotion of reaccessed probationary entries
// - Readmission of ghosted keys into Main
// - Clear totality
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let test_type = data[0] % 5;
    let capacity_byte = data[1];

    match test_type {
        0 => test_capacity_bound(&data[2..], capacity_byte),
        1 => test_ghost_opacity(&data[2..], capacity_byte),
        2 => test_promotion(&data[2..], capacity_byte),
        3 => test_readmission(&data[2..], capacity_byte),
        4 => test_clear(&data[2..], capacity_byte),
        _ => unreachable!(),
    }
});

// Property: len() never exceeds capacity after any insert stream.
fn test_capacity_bound(data: &[u8], capacity_byte: u8) {
    let capacity = ((capacity_byte as usize) % 24).max(1);
    let mut cache: S3FifoCache<u8, u8> = S3FifoCache::new(capacity);

    for &byte in data.iter().take(200) {
        cache.insert(byte, byte);
        assert!(cache.len() <= capacity);
    }
    #[cfg(debug_assertions)]
    cache.check_invariants().unwrap();
}

// Property: a ghosted key is a member but never readable.
fn test_ghost_opacity(data: &[u8], capacity_byte: u8) {
    let capacity = ((capacity_byte as usize) % 8).max(1);
    let mut cache: S3FifoCache<u8, u8> = S3FifoCache::new(capacity);

    for &byte in data.iter().take(100) {
        cache.insert(byte, byte);
    }

    // Every tracked key is either readable or a ghost; ghosts do not count
    // towards len().
    let mut resident = 0usize;
    for key in 0..=255u8 {
        if cache.contains(&key) && cache.peek(&key).is_some() {
            resident += 1;
        }
    }
    assert_eq!(resident, cache.len());
}

// Property: an entry read while probationary survives a cold fill.
fn test_promotion(data: &[u8], capacity_byte: u8) {
    let capacity = ((capacity_byte as usize) % 16).max(4);
    let mut cache: S3FifoCache<u16, u8> = S3FifoCache::new(capacity);

    cache.insert(1000, 1);
    cache.get(&1000);

    // Cold keys disjoint from the probationary one.
    for (i, &byte) in data.iter().take(capacity).enumerate() {
        cache.insert(u16::from(byte) + (i as u16 % 3), byte);
    }

    // The read entry may have promoted or may still be probationary, but
    // it must not have been ghosted while cold entries were available.
    if !data.is_empty() {
        assert!(cache.contains(&1000));
        assert!(cache.peek(&1000).is_some() || cache.ghost_len() > 0);
    }
}

// Property: reinserting a ghosted key lands it in Main.
fn test_readmission(data: &[u8], capacity_byte: u8) {
    let capacity = ((capacity_byte as usize) % 8).max(1);
    let mut cache: S3FifoCache<u8, u8> = S3FifoCache::new(capacity);

    for &byte in data.iter().take(100) {
        let key = byte % 32;
        if cache.contains(&key) && cache.peek(&key).is_none() {
            // Ghost: the reinsert below must readmit into Main.
            let main_before = cache.main_len();
            cache.insert(key, byte);
            assert!(cache.peek(&key).is_some());
            assert!(cache.main_len() >= main_before.saturating_sub(1));
        } else {
            cache.insert(key, byte);
        }
        assert!(cache.len() <= capacity);
    }
    #[cfg(debug_assertions)]
    cache.check_invariants().unwrap();
}

// Property: clear leaves a fully usable, empty cache.
fn test_clear(data: &[u8], capacity_byte: u8) {
    let capacity = ((capacity_byte as usize) % 16).max(1);
    let mut cache: S3FifoCache<u8, u8> = S3FifoCache::new(capacity);

    for &byte in data.iter().take(50) {
        cache.insert(byte, byte);
    }
    cache.clear();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.ghost_len(), 0);

    for &byte in data.iter().take(50) {
        assert_eq!(cache.get(&byte), None);
    }

    for &byte in data.iter().take(50) {
        cache.insert(byte, byte);
        assert!(cache.len() <= capacity);
    }
}
