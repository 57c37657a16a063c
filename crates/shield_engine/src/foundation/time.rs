//! Frame timing for hosts

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of recent frames used for `recent_fps`
const RECENT_WINDOW: usize = 60;

/// Frame clock used by hosts to report how fast the frame loop runs
///
/// The visualization itself is frame-count driven; wall time never feeds
/// into the animation.
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    total: Duration,
    frame_count: u64,
    recent: VecDeque<Duration>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Start the clock now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            total: Duration::ZERO,
            frame_count: 0,
            recent: VecDeque::with_capacity(RECENT_WINDOW),
        }
    }

    /// Mark the start of a frame; returns seconds since the previous one
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.record(delta);
        delta.as_secs_f32()
    }

    fn record(&mut self, delta: Duration) {
        self.total += delta;
        self.frame_count += 1;
        if self.recent.len() == RECENT_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(delta);
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.recent.back().map_or(0.0, Duration::as_secs_f32)
    }

    /// Seconds elapsed over all recorded frames
    pub fn total_time(&self) -> f32 {
        self.total.as_secs_f32()
    }

    /// Frames recorded
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// FPS over the whole run
    pub fn average_fps(&self) -> f32 {
        let seconds = self.total.as_secs_f32();
        if seconds > 0.0 {
            self.frame_count as f32 / seconds
        } else {
            0.0
        }
    }

    /// FPS over the last few frames
    pub fn recent_fps(&self) -> f32 {
        let seconds: f32 = self.recent.iter().map(Duration::as_secs_f32).sum();
        if seconds > 0.0 {
            self.recent.len() as f32 / seconds
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average_and_recent_fps() {
        let mut timer = Timer::new();
        for _ in 0..100 {
            timer.record(Duration::from_millis(20));
        }
        for _ in 0..RECENT_WINDOW {
            timer.record(Duration::from_millis(10));
        }

        assert_eq!(timer.frame_count(), 160);
        assert_relative_eq!(timer.total_time(), 2.6, epsilon = 1e-4);
        assert_relative_eq!(timer.average_fps(), 160.0 / 2.6, epsilon = 1e-2);
        assert_relative_eq!(timer.recent_fps(), 100.0, epsilon = 1e-2);
        assert_relative_eq!(timer.delta_time(), 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_fresh_timer_reports_zero() {
        let timer = Timer::new();
        assert_eq!(timer.average_fps(), 0.0);
        assert_eq!(timer.recent_fps(), 0.0);
        assert_eq!(timer.delta_time(), 0.0);
    }
}
