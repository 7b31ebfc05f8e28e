//! Wall-clock timing for simulation invocations and sweep totals.

use std::time::Instant;

/// Started on construction; read with [`Timer::elapsed_s`] or consume with [`Timer::stop`].
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn stop(self) -> f64 {
        self.elapsed_s()
    }
}

/// Sum and count of repeated measurements, in seconds.
#[derive(Clone, Debug, Default)]
pub struct AccumulatingTimer {
    total_s: f64,
    count: u64,
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_s: 0.0,
            count: 0,
        }
    }

    pub fn record(&mut self, duration_s: f64) {
        self.total_s += duration_s;
        self.count += 1;
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_s
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Zero when nothing was recorded.
    pub fn average_seconds(&self) -> f64 {
        match self.count {
            0 => 0.0,
            n => self.total_s / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_over_recorded_invocations() {
        let mut timer = AccumulatingTimer::new();
        assert_eq!(timer.average_seconds(), 0.0);
        timer.record(0.5);
        timer.record(1.5);
        timer.record(1.0);
        assert_eq!(timer.count(), 3);
        assert_eq!(timer.total_seconds(), 3.0);
        assert_eq!(timer.average_seconds(), 1.0);
    }

    #[test]
    fn elapsed_never_decreases() {
        let timer = Timer::start();
        let first = timer.elapsed_s();
        assert!(first >= 0.0);
        assert!(timer.stop() >= first);
    }
}
