//! Example demonstrating the S3-FIFO cache engine.
//!
//! Three FIFO queues cooperate:
//! - Small: new entries (filters one-hit wonders)
//! - Main: entries that were read while probationary (protected)
//! - Ghost: value-less markers for recently evicted keys
//!
//! Run with: cargo run --example basic_s3_fifo

use fifokit::policy::s3_fifo::S3FifoCache;

fn main() {
    println!("=== S3-FIFO Cache Example ===\n");

    // Capacity 10: Small limit 1, Main limit 9, Ghost limit 10.
    let mut cache: S3FifoCache<u64, String> = S3FifoCache::new(10);
    println!("Created cache: capacity={}\n", cache.capacity());

    for i in 1..=5 {
        cache.insert(i, format!("value-{}", i));
    }
    println!("Inserted keys 1-5 (all probationary)");
    println!("  len: {}", cache.len());

    // Read keys 1 and 2; when Small overflows they promote instead of
    // ghosting.
    cache.get(&1);
    cache.get(&2);
    println!("\nRead keys 1 and 2 (frequency bumped)");

    for i in 6..=12 {
        cache.insert(i, format!("value-{}", i));
    }
    println!("Inserted keys 6-12");
    println!("  contains 1? {} (promoted to Main)", cache.contains(&1));
    println!("  contains 2? {} (promoted to Main)", cache.contains(&2));
    println!("  len: {}", cache.len());

    // Ghosts are tracked but not readable.
    println!("\n=== Ghost Semantics ===\n");

    let mut cache: S3FifoCache<u64, String> = S3FifoCache::new(1);
    cache.insert(1, "first".to_string());
    cache.insert(2, "second".to_string());

    println!("Capacity 1; inserted keys 1 then 2 (key 1 demoted to Ghost)");
    println!("  contains 1? {} (membership)", cache.contains(&1));
    println!("  get 1 -> {:?} (no availability)", cache.get(&1));
    println!("  len: {} (ghosts are not resident)", cache.len());

    // A reinsert of a ghosted key is admitted straight into Main.
    cache.insert(1, "first-again".to_string());
    println!("\nReinserted key 1 (ghost readmission)");
    println!("  get 1 -> {:?}", cache.get(&1));
    println!("  main_len: {}", cache.main_len());

    println!("\n=== Scan Resistance ===\n");

    let mut cache: S3FifoCache<u64, u64> = S3FifoCache::new(100);
    for i in 0..30 {
        cache.insert(i, i);
        cache.get(&i);
    }
    println!("Built a 30-entry working set with reuse");

    for i in 1000..1200 {
        cache.insert(i, i);
    }
    let survivors = (0..30).filter(|key| cache.get(key).is_some()).count();
    println!("After a 200-key one-shot scan:");
    println!("  working-set survivors: {}/30", survivors);
    println!("  len: {}", cache.len());
}
