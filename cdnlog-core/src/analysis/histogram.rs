/// Fixed-bucket histogram with an implicit overflow bucket.
#[derive(Debug, Clone)]
pub(crate) struct Histogram {
    bounds: &'static [u64],
    counts: Vec<u64>,
}

impl Histogram {
    pub(crate) fn new(bounds: &'static [u64]) -> Self {
        Self {
            bounds,
            counts: vec![0; bounds.len() + 1],
        }
    }

    /// Count `value` in the first bucket whose inclusive upper bound holds it.
    pub(crate) fn record(&mut self, value: u64) {
        let slot = self
            .bounds
            .iter()
            .position(|upper| value <= *upper)
            .unwrap_or(self.bounds.len());
        self.counts[slot] += 1;
    }

    pub(crate) fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(label, count)` per bucket, e.g. `0-1ms`, `2-5ms`, `>1000ms`.
    pub(crate) fn labeled(&self) -> Vec<(String, u64)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let label = match (i.checked_sub(1).map(|p| self.bounds[p]), self.bounds.get(i)) {
                    (None, Some(upper)) => format!("0-{upper}ms"),
                    (Some(prev), Some(upper)) => format!("{}-{upper}ms", prev + 1),
                    (Some(prev), None) => format!(">{prev}ms"),
                    (None, None) => "all".to_string(),
                };
                (label, *count)
            })
            .collect()
    }

    /// Upper bound of the bucket holding the `pct` quantile.
    ///
    /// Values in the overflow bucket report one past the last bound. An empty
    /// histogram reports 0.
    pub(crate) fn percentile(&self, pct: f64) -> u64 {
        let total = self.total();
        if total == 0 {
            return 0;
        }

        let target = (total as f64 * pct).ceil().max(1.0) as u64;
        let mut running = 0;

        for (i, count) in self.counts.iter().enumerate() {
            running += count;
            if running >= target {
                return match self.bounds.get(i) {
                    Some(upper) => *upper,
                    None => self.bounds.last().map(|b| b.saturating_add(1)).unwrap_or(0),
                };
            }
        }

        0
    }
}
