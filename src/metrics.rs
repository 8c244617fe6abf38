//! Metrics collection and export for pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Point-in-time metrics of a pool
///
/// # Examples
///
/// ```
/// use lazy_objectpool::{Pool, PoolConfiguration};
///
/// let pool = Pool::new(PoolConfiguration::<_, String>::new().with_factory(|| Ok(1u32)))
///     .unwrap();
///
/// let item = pool.acquire().unwrap();
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_created, 1);
/// assert_eq!(metrics.checked_out, 1);
/// item.restore().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Values constructed by the factory
    pub total_created: usize,

    /// Factory invocations that failed
    pub factory_failures: usize,

    /// Successful acquisitions
    pub total_acquired: usize,

    /// Items restored to the pool
    pub total_restored: usize,

    /// Items removed from the pool, including dropped active items
    pub total_removed: usize,

    /// Acquisitions that timed out
    pub timeouts: usize,

    /// Idle values disposed at shutdown
    pub total_disposed: usize,

    /// Values currently constructed, idle or checked out
    pub live_values: usize,

    /// Values currently idle
    pub idle_values: usize,

    /// Values currently checked out
    pub checked_out: usize,

    /// Live values relative to capacity (0.0 to 1.0)
    pub utilization: f64,

    /// Configured capacity
    pub max_capacity: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("factory_failures".to_string(), self.factory_failures.to_string());
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_restored".to_string(), self.total_restored.to_string());
        metrics.insert("total_removed".to_string(), self.total_removed.to_string());
        metrics.insert("timeouts".to_string(), self.timeouts.to_string());
        metrics.insert("total_disposed".to_string(), self.total_disposed.to_string());
        metrics.insert("live_values".to_string(), self.live_values.to_string());
        metrics.insert("idle_values".to_string(), self.idle_values.to_string());
        metrics.insert("checked_out".to_string(), self.checked_out.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("max_capacity".to_string(), self.max_capacity.to_string());
        metrics
    }
}

/// Metrics exporter for the Prometheus text format
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_objectpool::{Pool, PoolConfiguration};
    /// use std::collections::HashMap;
    ///
    /// let pool = Pool::new(PoolConfiguration::<_, String>::new().with_factory(|| Ok(1u32)))
    ///     .unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = pool.export_metrics_prometheus("conns", Some(&tags));
    /// assert!(output.contains("objectpool_values_live"));
    /// assert!(output.contains("service=\"api\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let labels = Self::format_labels(pool_name, tags);
        let mut output = String::new();

        let gauges = [
            ("objectpool_values_live", "Values currently constructed", metrics.live_values as f64),
            ("objectpool_values_idle", "Values currently idle", metrics.idle_values as f64),
            ("objectpool_values_checked_out", "Values currently checked out", metrics.checked_out as f64),
            ("objectpool_utilization", "Live values relative to capacity", metrics.utilization),
        ];
        for (name, help, value) in gauges {
            output.push_str(&format!("# HELP {name} {help}\n"));
            output.push_str(&format!("# TYPE {name} gauge\n"));
            output.push_str(&format!("{name}{{{labels}}} {value}\n"));
        }

        let counters = [
            ("objectpool_values_created_total", "Values constructed by the factory", metrics.total_created),
            ("objectpool_factory_failures_total", "Failed factory invocations", metrics.factory_failures),
            ("objectpool_acquired_total", "Successful acquisitions", metrics.total_acquired),
            ("objectpool_restored_total", "Items restored", metrics.total_restored),
            ("objectpool_removed_total", "Items removed", metrics.total_removed),
            ("objectpool_timeouts_total", "Acquisitions that timed out", metrics.timeouts),
            ("objectpool_disposed_total", "Idle values disposed at shutdown", metrics.total_disposed),
        ];
        for (name, help, value) in counters {
            output.push_str(&format!("# HELP {name} {help}\n"));
            output.push_str(&format!("# TYPE {name} counter\n"));
            output.push_str(&format!("{name}{{{labels}}} {value}\n"));
        }

        output
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut sorted: Vec<_> = tags.iter().collect();
            sorted.sort();
            for (key, value) in sorted {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal metrics tracker
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub created: AtomicUsize,
    pub factory_failures: AtomicUsize,
    pub acquired: AtomicUsize,
    pub restored: AtomicUsize,
    pub removed: AtomicUsize,
    pub timeouts: AtomicUsize,
    pub disposed: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, live: usize, idle: usize, capacity: usize) -> PoolMetrics {
        let utilization = if capacity > 0 {
            live as f64 / capacity as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_created: self.created.load(Ordering::Relaxed),
            factory_failures: self.factory_failures.load(Ordering::Relaxed),
            total_acquired: self.acquired.load(Ordering::Relaxed),
            total_restored: self.restored.load(Ordering::Relaxed),
            total_removed: self.removed.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            total_disposed: self.disposed.load(Ordering::Relaxed),
            live_values: live,
            idle_values: idle,
            checked_out: live.saturating_sub(idle),
            utilization,
            max_capacity: capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_derives_gauges() {
        let tracker = MetricsTracker::new();
        MetricsTracker::bump(&tracker.created);
        MetricsTracker::bump(&tracker.created);
        MetricsTracker::bump(&tracker.timeouts);

        let metrics = tracker.get_metrics(2, 1, 4);
        assert_eq!(metrics.total_created, 2);
        assert_eq!(metrics.timeouts, 1);
        assert_eq!(metrics.checked_out, 1);
        assert_eq!(metrics.utilization, 0.5);
        assert_eq!(metrics.export()["utilization"], "0.50");
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_labels_are_sorted() {
        let metrics = MetricsTracker::new().get_metrics(0, 0, 1);
        let mut tags = HashMap::new();
        tags.insert("zone".to_string(), "b".to_string());
        tags.insert("app".to_string(), "a".to_string());

        let output = MetricsExporter::export_prometheus(&metrics, "p", Some(&tags));
        assert!(output.contains("objectpool_values_live{pool=\"p\",app=\"a\",zone=\"b\"} 0\n"));
        assert!(output.contains("# TYPE objectpool_timeouts_total counter"));
    }
}
