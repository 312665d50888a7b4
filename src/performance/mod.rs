//! # Performance Metrics
//!
//! Frame timing for the viewer: a restartable [`Stopwatch`] measures the wall
//! clock time of a frame and [`FrameStatistics`] keeps the most recent frame
//! and GPU times for averaging.
//!
//! ## Usage
//!
//! ```rust
//! use viewer3d::performance::{FrameStatistics, Stopwatch};
//!
//! let mut stats = FrameStatistics::new();
//! let mut stopwatch = Stopwatch::new();
//!
//! stopwatch.restart();
//! // ... render frame ...
//! stats.record(stopwatch.elapsed_ms(), None);
//!
//! let metrics = stats.metrics();
//! assert_eq!(metrics.samples, 1);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frames kept for averaging, about two seconds at 60 fps
pub const DEFAULT_SAMPLES: usize = 120;

/// Measures elapsed wall clock time since the last restart
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the time since the previous restart and starts counting again
    pub fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start);
        self.start = now;
        elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

/// Summary of the recorded window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    /// Frames per second derived from the average frame time
    pub fps: f64,
    pub frame_time_ms: f64,
    pub min_frame_time_ms: f64,
    pub max_frame_time_ms: f64,
    /// Average GPU time over the frames that measured one
    pub gpu_time_ms: Option<f64>,
    pub samples: usize,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            gpu_time_ms: None,
            samples: 0,
        }
    }
}

/// Ring buffer of recent frame and GPU times
#[derive(Debug, Clone)]
pub struct FrameStatistics {
    frame_times: VecDeque<f64>,
    gpu_times: VecDeque<Option<f64>>,
    max_samples: usize,
}

impl Default for FrameStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStatistics {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLES)
    }

    /// Create statistics over a custom number of frames
    pub fn with_capacity(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            gpu_times: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Adds one frame, dropping the oldest when full
    pub fn record(&mut self, frame_ms: f64, gpu_ms: Option<f64>) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
            self.gpu_times.pop_front();
        }
        self.frame_times.push_back(frame_ms);
        self.gpu_times.push_back(gpu_ms);
    }

    /// Most recent frame and GPU time
    pub fn latest(&self) -> Option<(f64, Option<f64>)> {
        Some((*self.frame_times.back()?, *self.gpu_times.back()?))
    }

    pub fn metrics(&self) -> FrameMetrics {
        let samples = self.frame_times.len();
        if samples == 0 {
            return FrameMetrics::default();
        }

        let average = self.frame_times.iter().sum::<f64>() / samples as f64;
        let min = self.frame_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.frame_times.iter().copied().fold(0.0, f64::max);

        let measured: Vec<f64> = self.gpu_times.iter().flatten().copied().collect();
        let gpu_time_ms = (!measured.is_empty())
            .then(|| measured.iter().sum::<f64>() / measured.len() as f64);

        FrameMetrics {
            fps: if average > 0.0 { 1000.0 / average } else { 0.0 },
            frame_time_ms: average,
            min_frame_time_ms: min,
            max_frame_time_ms: max,
            gpu_time_ms,
            samples,
        }
    }

    /// Frame times in recording order, for graphing
    pub fn frame_time_history(&self) -> Vec<f64> {
        self.frame_times.iter().copied().collect()
    }

    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.gpu_times.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_average_the_window() {
        let mut stats = FrameStatistics::new();
        stats.record(10.0, Some(2.0));
        stats.record(20.0, None);
        stats.record(30.0, Some(4.0));

        let metrics = stats.metrics();
        assert_eq!(metrics.samples, 3);
        assert_eq!(metrics.frame_time_ms, 20.0);
        assert_eq!(metrics.fps, 50.0);
        assert_eq!(metrics.min_frame_time_ms, 10.0);
        assert_eq!(metrics.max_frame_time_ms, 30.0);
        assert_eq!(metrics.gpu_time_ms, Some(3.0));
        assert_eq!(stats.latest(), Some((30.0, Some(4.0))));
    }

    #[test]
    fn oldest_frames_are_dropped() {
        let mut stats = FrameStatistics::with_capacity(2);
        for ms in [100.0, 1.0, 3.0] {
            stats.record(ms, None);
        }
        assert_eq!(stats.frame_time_history(), vec![1.0, 3.0]);
        assert_eq!(stats.metrics().gpu_time_ms, None);

        stats.reset();
        assert_eq!(stats.metrics(), FrameMetrics::default());
    }

    #[test]
    fn stopwatch_restarts_from_zero() {
        let mut stopwatch = Stopwatch::new();
        std::thread::sleep(Duration::from_millis(5));
        let first = stopwatch.restart();
        assert!(first >= Duration::from_millis(5));
        assert!(stopwatch.elapsed() < first + Duration::from_secs(1));
    }
}
