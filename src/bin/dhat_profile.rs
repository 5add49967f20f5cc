//! DHAT heap profiler for fifomap.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::sync::Arc;

use fifomap::FifoMap;

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
fn hotset_workload(map: &mut FifoMap<u64, Arc<u64>>, operations: usize, universe: u64, seed: u64) {
    let mut rng = XorShift64::new(seed);
    let hot_size = (universe as f64 * 0.1) as u64;

    for _ in 0..operations {
        let key = if rng.next_f64() < 0.9 {
            // Hot key (10% of universe, 90% of accesses)
            rng.next_u64() % hot_size
        } else {
            // Cold key
            hot_size + (rng.next_u64() % (universe - hot_size))
        };

        if map.get(&key).is_none() {
            let _ = map.insert(key, Arc::new(key));
        }
    }
}

/// Run a scan workload: sequential access pattern.
fn scan_workload(map: &mut FifoMap<u64, Arc<u64>>, operations: usize, universe: u64) {
    for i in 0..operations {
        let key = (i as u64) % universe;
        if map.get(&key).is_none() {
            let _ = map.insert(key, Arc::new(key));
        }
    }
}

/// Run eviction churn: insert more items than capacity.
fn eviction_churn(map: &mut FifoMap<u64, Arc<u64>>, operations: usize) {
    for i in 0..operations {
        let _ = map.insert(i as u64, Arc::new(i as u64));
    }
}

/// Run removal churn: random inserts and removes that pile stale entries
/// onto the insertion order queue.
fn removal_churn(map: &mut FifoMap<u64, Arc<u64>>, operations: usize, universe: u64, seed: u64) {
    let mut rng = XorShift64::new(seed);
    for _ in 0..operations {
        let key = rng.next_u64() % universe;
        if rng.next_f64() < 0.5 {
            map.insert(key, Arc::new(key));
        } else {
            map.remove(&key);
        }
    }
}

fn profile_access_mix() {
    println!("=== Profiling access mix ===");
    let capacity = 4096;
    let operations = 100_000;
    let universe = 16_384;

    let mut map = FifoMap::new(capacity);

    // Warm up
    for i in 0..capacity as u64 {
        map.insert(i, Arc::new(i));
    }

    // Hotset workload
    hotset_workload(&mut map, operations, universe, 42);

    // Scan workload
    scan_workload(&mut map, operations / 2, universe);

    // Eviction churn
    eviction_churn(&mut map, operations / 4);

    println!("  Final size: {}", map.len());
    println!("  Approx bytes: {}", map.approx_bytes());
}

fn profile_removal_churn() {
    println!("=== Profiling removal churn ===");
    let capacity = 4096;
    let operations = 100_000;
    let universe = 8_192;

    let mut map = FifoMap::new(capacity);

    for i in 0..capacity as u64 {
        map.insert(i, Arc::new(i));
    }

    removal_churn(&mut map, operations, universe, 42);

    println!("  Final size: {}", map.len());
    println!("  Order queue length: {}", map.order_len());
    println!("  Approx bytes: {}", map.approx_bytes());
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("fifomap DHAT Heap Profiling");
    println!("===========================\n");

    profile_access_mix();
    profile_removal_churn();

    println!("\n===========================");
    println!("Profiling complete!");
    println!(
        "View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>"
    );
}
