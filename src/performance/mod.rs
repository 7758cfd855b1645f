//! # Frame Statistics
//!
//! Frame-time tracking for the render loop, shown as a small FPS overlay in the
//! corner of the window.
//!
//! ## Usage
//!
//! ```rust
//! use haunted_house::performance::PerformanceMonitor;
//!
//! let mut monitor = PerformanceMonitor::new();
//!
//! monitor.begin_frame();
//! // ... render frame ...
//! monitor.end_frame();
//!
//! let fps = monitor.get_metrics().fps;
//! # let _ = fps;
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    /// Current frames per second
    pub fps: f32,
    /// Average frame time in milliseconds
    pub frame_time_ms: f32,
    /// Minimum frame time in the current window
    pub min_frame_time_ms: f32,
    /// Maximum frame time in the current window
    pub max_frame_time_ms: f32,
    /// Number of draw calls in the last frame
    pub draw_calls: u32,
    /// Number of vertices submitted in the last frame
    pub vertex_count: u32,
}

impl PerformanceMetrics {
    /// Render a compact performance overlay in the top-right corner
    pub fn render_overlay(&self, ui: &imgui::Ui) {
        let display_size = ui.io().display_size;
        let metrics = self;

        ui.window("FPS")
            .size([140.0, 76.0], imgui::Condition::Always)
            .position([display_size[0] - 150.0, 10.0], imgui::Condition::Always)
            .no_decoration()
            .no_inputs()
            .bg_alpha(0.3)
            .build(|| {
                ui.text(format!("FPS: {:.0}", metrics.fps));
                ui.text(format!("{:.1}ms", metrics.frame_time_ms));
                ui.text(format!("{} draws", metrics.draw_calls));
            });
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: f32::MAX,
            max_frame_time_ms: 0.0,
            draw_calls: 0,
            vertex_count: 0,
        }
    }
}

pub struct PerformanceMonitor {
    /// Ring buffer of recent frame times for averaging
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    frame_start: Option<Instant>,
    current_metrics: PerformanceMetrics,
    last_update: Instant,
    /// Metrics are recomputed at most this often
    update_interval: Duration,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_config(120, Duration::from_millis(100))
    }

    pub fn with_config(max_samples: usize, update_interval: Duration) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            frame_start: None,
            current_metrics: PerformanceMetrics::default(),
            last_update: Instant::now(),
            update_interval,
        }
    }

    /// Mark the beginning of a frame
    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Mark the end of a frame and update metrics
    pub fn end_frame(&mut self) {
        if let Some(start) = self.frame_start.take() {
            self.record_frame(start.elapsed());
        }
    }

    /// Adds one frame duration sample
    pub fn record_frame(&mut self, frame_time: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        if self.last_update.elapsed() >= self.update_interval {
            self.update_metrics();
            self.last_update = Instant::now();
        }
    }

    fn update_metrics(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let total_time: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total_time / self.frame_times.len() as u32;
        let avg_frame_time_ms = avg_frame_time.as_secs_f32() * 1000.0;

        self.current_metrics.frame_time_ms = avg_frame_time_ms;
        self.current_metrics.fps = if avg_frame_time_ms > 0.0 {
            1000.0 / avg_frame_time_ms
        } else {
            0.0
        };

        if let (Some(min_time), Some(max_time)) =
            (self.frame_times.iter().min(), self.frame_times.iter().max())
        {
            self.current_metrics.min_frame_time_ms = min_time.as_secs_f32() * 1000.0;
            self.current_metrics.max_frame_time_ms = max_time.as_secs_f32() * 1000.0;
        }
    }

    pub fn update_render_stats(&mut self, draw_calls: u32, vertex_count: u32) {
        self.current_metrics.draw_calls = draw_calls;
        self.current_metrics.vertex_count = vertex_count;
    }

    pub fn get_metrics(&self) -> &PerformanceMetrics {
        &self.current_metrics
    }

    pub fn sample_count(&self) -> usize {
        self.frame_times.len()
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_average_recorded_frames() {
        let mut monitor = PerformanceMonitor::with_config(4, Duration::ZERO);
        for ms in [10, 20, 30] {
            monitor.record_frame(Duration::from_millis(ms));
        }
        let metrics = monitor.get_metrics();
        assert!((metrics.frame_time_ms - 20.0).abs() < 1e-3);
        assert!((metrics.fps - 50.0).abs() < 1e-2);
        assert!((metrics.min_frame_time_ms - 10.0).abs() < 1e-3);
        assert!((metrics.max_frame_time_ms - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut monitor = PerformanceMonitor::with_config(3, Duration::ZERO);
        for _ in 0..10 {
            monitor.record_frame(Duration::from_millis(5));
        }
        assert_eq!(monitor.sample_count(), 3);
    }

    #[test]
    fn test_end_without_begin_is_ignored() {
        let mut monitor = PerformanceMonitor::new();
        monitor.end_frame();
        assert_eq!(monitor.sample_count(), 0);
    }
}
