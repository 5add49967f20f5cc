//! Example demonstrating FIFO eviction order in a bounded map.
//!
//! Eviction depends only on insertion order: reads never refresh a key, and
//! overwriting a value keeps the key's original age.
//!
//! Run with: cargo run --example basic

use fifomap::FifoMap;

fn main() {
    println!("=== FIFO Map Example ===\n");

    // Create a map with a capacity of 3 entries
    let mut map = FifoMap::new(3);
    println!("Created map: capacity={}\n", map.capacity());

    map.insert("alpha", 1);
    map.insert("beta", 2);
    map.insert("gamma", 3);
    println!("Inserted alpha, beta, gamma");
    println!("  oldest: {:?}", map.peek_oldest());

    // Reads do not affect eviction order
    map.get(&"alpha");
    map.get(&"alpha");
    println!("\nRead alpha twice (no effect on eviction order)");

    // Overwrites keep the key's age
    map.insert("alpha", 100);
    println!("Overwrote alpha (still the oldest)");
    println!("  oldest: {:?}", map.peek_oldest());

    // A new key at capacity evicts the oldest
    map.insert("delta", 4);
    println!("\nInserted delta:");
    println!("  contains alpha? {}", map.contains(&"alpha"));
    println!("  len: {}", map.len());

    // Removal frees a slot without shifting the survivors' ages
    map.remove(&"beta");
    map.insert("epsilon", 5);
    println!("\nRemoved beta, inserted epsilon:");
    for (key, value) in map.iter() {
        println!("  {} = {}", key, value);
    }

    println!("\nDraining oldest first:");
    while let Some((key, value)) = map.pop_oldest() {
        println!("  popped {} = {}", key, value);
    }
}

// Expected output:
// === FIFO Map Example ===
//
// Created map: capacity=3
//
// Inserted alpha, beta, gamma
//   oldest: Some(("alpha", 1))
//
// Read alpha twice (no effect on eviction order)
// Overwrote alpha (still the oldest)
//   oldest: Some(("alpha", 100))
//
// Inserted delta:
//   contains alpha? false
//   len: 3
//
// Removed beta, inserted epsilon:
//   gamma = 3
//   delta = 4
//   epsilon = 5
//
// Draining oldest first:
//   popped gamma = 3
//   popped delta = 4
//   popped epsilon = 5
