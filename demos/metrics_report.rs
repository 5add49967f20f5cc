//! Example demonstrating metrics collection and Prometheus export.
//!
//! Runs a mixed workload, snapshots the operation counters, and writes them
//! to stdout in Prometheus text exposition format.
//!
//! Run with: cargo run --example metrics_report --features metrics

use fifomap::FifoMap;
use fifomap::metrics::PrometheusTextExporter;

fn main() {
    let mut map = FifoMap::new(64);

    // Mixed workload: fill past capacity, overwrite, read, remove
    for i in 0..100u32 {
        map.insert(i, i);
    }
    for i in 60..70u32 {
        map.insert(i, i * 2);
    }
    for i in 0..80u32 {
        map.get(&i);
    }
    for i in 64..68u32 {
        map.remove(&i);
    }
    map.pop_oldest();
    map.peek_oldest();
    map.age_rank(&99);

    println!("# fifomap workload metrics\n");

    let snapshot = map.metrics_snapshot();
    let exporter = PrometheusTextExporter::new("fifomap", std::io::stdout());
    exporter.export(&snapshot);
}
