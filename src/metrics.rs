//! Operation counters for [`FifoMap`](crate::FifoMap).
//!
//! Compiled in only with the `metrics` feature. Counters are recorded inline
//! by map operations; [`FifoMap::metrics_snapshot`](crate::FifoMap::metrics_snapshot)
//! copies them out together with size gauges, and
//! [`PrometheusTextExporter`] renders a snapshot in Prometheus text format.

use std::cell::Cell;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// MetricsCell
// ---------------------------------------------------------------------------

/// A metrics-only counter cell.
///
/// Lets read paths that take `&self` (`get`, `peek_oldest`, `age_rank`)
/// record without requiring a mutable borrow. Not synchronized; the map is
/// single-threaded and so are its counters.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }
}

// ---------------------------------------------------------------------------
// FifoMapMetrics
// ---------------------------------------------------------------------------

/// Live operation counters for a [`FifoMap`](crate::FifoMap).
///
/// Mutating operations record through `&mut self`; read paths record through
/// [`MetricsCell`]s.
#[derive(Debug, Default)]
pub struct FifoMapMetrics {
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub stale_skips: u64,
    pub evict_scan_steps: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub pop_oldest_calls: u64,
    pub pop_oldest_found: u64,
    pub pop_oldest_empty_or_stale: u64,
    pub peek_oldest_calls: MetricsCell,
    pub peek_oldest_found: MetricsCell,
    pub age_rank_calls: MetricsCell,
    pub age_rank_found: MetricsCell,
    pub age_rank_scan_steps: MetricsCell,
}

impl FifoMapMetrics {
    pub(crate) fn record_get_hit(&self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }

    pub(crate) fn record_get_miss(&self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }

    pub(crate) fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    pub(crate) fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    pub(crate) fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    pub(crate) fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    pub(crate) fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    pub(crate) fn record_evict_scan_steps(&mut self, steps: u64) {
        self.evict_scan_steps += steps;
    }

    pub(crate) fn record_stale_skips(&mut self, skips: u64) {
        self.stale_skips += skips;
    }

    pub(crate) fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    pub(crate) fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    pub(crate) fn record_pop_oldest_call(&mut self) {
        self.pop_oldest_calls += 1;
    }

    pub(crate) fn record_pop_oldest_found(&mut self) {
        self.pop_oldest_found += 1;
    }

    pub(crate) fn record_pop_oldest_empty_or_stale(&mut self) {
        self.pop_oldest_empty_or_stale += 1;
    }

    pub(crate) fn record_peek_oldest_call(&self) {
        self.peek_oldest_calls.incr();
    }

    pub(crate) fn record_peek_oldest_found(&self) {
        self.peek_oldest_found.incr();
    }

    pub(crate) fn record_age_rank_call(&self) {
        self.age_rank_calls.incr();
    }

    pub(crate) fn record_age_rank_found(&self) {
        self.age_rank_found.incr();
    }

    pub(crate) fn record_age_rank_scan_step(&self) {
        self.age_rank_scan_steps.incr();
    }
}

// ---------------------------------------------------------------------------
// FifoMapMetricsSnapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of all counters plus size gauges.
///
/// Returned by [`FifoMap::metrics_snapshot`](crate::FifoMap::metrics_snapshot).
#[derive(Debug, Default, Clone, Copy)]
pub struct FifoMapMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub stale_skips: u64, // queue entries popped that were already removed from the map
    pub evict_scan_steps: u64, // how many pop_front iterations inside eviction

    pub remove_calls: u64,
    pub remove_found: u64,

    pub pop_oldest_calls: u64,
    pub pop_oldest_found: u64,
    pub pop_oldest_empty_or_stale: u64,

    pub peek_oldest_calls: u64,
    pub peek_oldest_found: u64,

    pub age_rank_calls: u64,
    pub age_rank_found: u64,
    pub age_rank_scan_steps: u64,

    // gauges captured at snapshot time
    pub map_len: usize,
    pub insertion_order_len: usize,
    pub capacity: usize,
}

// ---------------------------------------------------------------------------
// PrometheusTextExporter
// ---------------------------------------------------------------------------

/// Prometheus text exporter for map metrics snapshots.
///
/// Writes in the Prometheus text exposition format so the output can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Writes all counters and gauges from `snapshot`.
    pub fn export(&self, snapshot: &FifoMapMetricsSnapshot) {
        self.write_counter(&self.metric_name("get_calls_total"), snapshot.get_calls);
        self.write_counter(&self.metric_name("get_hits_total"), snapshot.get_hits);
        self.write_counter(&self.metric_name("get_misses_total"), snapshot.get_misses);
        self.write_counter(
            &self.metric_name("insert_calls_total"),
            snapshot.insert_calls,
        );
        self.write_counter(
            &self.metric_name("insert_updates_total"),
            snapshot.insert_updates,
        );
        self.write_counter(&self.metric_name("insert_new_total"), snapshot.insert_new);
        self.write_counter(&self.metric_name("evict_calls_total"), snapshot.evict_calls);
        self.write_counter(
            &self.metric_name("evicted_entries_total"),
            snapshot.evicted_entries,
        );
        self.write_counter(&self.metric_name("stale_skips_total"), snapshot.stale_skips);
        self.write_counter(
            &self.metric_name("evict_scan_steps_total"),
            snapshot.evict_scan_steps,
        );
        self.write_counter(
            &self.metric_name("remove_calls_total"),
            snapshot.remove_calls,
        );
        self.write_counter(
            &self.metric_name("remove_found_total"),
            snapshot.remove_found,
        );
        self.write_counter(
            &self.metric_name("pop_oldest_calls_total"),
            snapshot.pop_oldest_calls,
        );
        self.write_counter(
            &self.metric_name("pop_oldest_found_total"),
            snapshot.pop_oldest_found,
        );
        self.write_counter(
            &self.metric_name("pop_oldest_empty_or_stale_total"),
            snapshot.pop_oldest_empty_or_stale,
        );
        self.write_counter(
            &self.metric_name("peek_oldest_calls_total"),
            snapshot.peek_oldest_calls,
        );
        self.write_counter(
            &self.metric_name("peek_oldest_found_total"),
            snapshot.peek_oldest_found,
        );
        self.write_counter(
            &self.metric_name("age_rank_calls_total"),
            snapshot.age_rank_calls,
        );
        self.write_counter(
            &self.metric_name("age_rank_found_total"),
            snapshot.age_rank_found,
        );
        self.write_counter(
            &self.metric_name("age_rank_scan_steps_total"),
            snapshot.age_rank_scan_steps,
        );
        self.write_gauge(&self.metric_name("map_len"), snapshot.map_len as u64);
        self.write_gauge(
            &self.metric_name("insertion_order_len"),
            snapshot.insertion_order_len as u64,
        );
        self.write_gauge(&self.metric_name("capacity"), snapshot.capacity as u64);
    }

    fn write_counter(&self, name: &str, value: u64) {
        let mut writer = self
            .writer
            .lock()
            .expect("metrics exporter writer poisoned");
        let _ = writeln!(writer, "# TYPE {} counter", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_gauge(&self, name: &str, value: u64) {
        let mut writer = self
            .writer
            .lock()
            .expect("metrics exporter writer poisoned");
        let _ = writeln!(writer, "# TYPE {} gauge", name);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
