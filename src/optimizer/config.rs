//! Statistics configuration.

/// Configuration for statistics collection and cost estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsConfig {
    /// Cost charged for reading one page during a sequential scan.
    pub io_cost_per_page: f64,

    /// Number of buckets in each column histogram.
    pub histogram_buckets: usize,
}

impl StatsConfig {
    pub fn with_io_cost_per_page(mut self, cost: f64) -> Self {
        self.io_cost_per_page = cost;
        self
    }

    pub fn with_histogram_buckets(mut self, buckets: usize) -> Self {
        self.histogram_buckets = buckets;
        self
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            io_cost_per_page: 1000.0,
            histogram_buckets: 100,
        }
    }
}
