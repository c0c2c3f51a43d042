use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shm_matmul_types::Dimensions;

/// Timings of one sequential vs. parallel comparison.
#[derive(Debug, Clone)]
pub struct TimingReport {
    pub finished_at: DateTime<Utc>,
    pub dims: Dimensions,
    pub workers: usize,
    pub sequential: Duration,
    pub parallel: Duration,
}

impl TimingReport {
    pub fn new(dims: Dimensions, workers: usize, sequential: Duration, parallel: Duration) -> Self {
        Self {
            finished_at: Utc::now(),
            dims,
            workers,
            sequential,
            parallel,
        }
    }

    /// Sequential time over parallel time; `None` if the parallel run took
    /// no measurable time.
    pub fn speedup(&self) -> Option<f64> {
        if self.parallel.is_zero() {
            return None;
        }
        Some(self.sequential.as_secs_f64() / self.parallel.as_secs_f64())
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Finished: {}", self.finished_at.to_rfc3339())?;
        writeln!(f, "Product: {}", self.dims)?;
        writeln!(f, "Sequential time: {:?}", self.sequential)?;
        writeln!(
            f,
            "Parallel time ({} workers): {:?}",
            self.workers, self.parallel
        )?;
        match self.speedup() {
            Some(speedup) => writeln!(f, "Speedup: {speedup:.2}x"),
            None => writeln!(f, "Speedup: n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_timings_and_speedup() {
        let dims = Dimensions { n: 2, m: 2, p: 2 };
        let report = TimingReport::new(dims, 4, Duration::from_millis(300), Duration::from_millis(100));
        let text = report.to_string();

        assert!((report.speedup().unwrap() - 3.0).abs() < 1e-9);
        assert!(text.contains("Product: A(2 x 2) * B(2 x 2)"));
        assert!(text.contains("Sequential time: 300ms"));
        assert!(text.contains("Parallel time (4 workers): 100ms"));
        assert!(text.ends_with("Speedup: 3.00x\n"));
    }

    #[test]
    fn zero_parallel_time_has_no_speedup() {
        let dims = Dimensions { n: 1, m: 1, p: 1 };
        let report = TimingReport::new(dims, 1, Duration::from_millis(5), Duration::ZERO);

        assert_eq!(report.speedup(), None);
        assert!(report.to_string().ends_with("Speedup: n/a\n"));
    }
}
