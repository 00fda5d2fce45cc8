use std::time::{Duration, Instant};

/// Loop health over one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LoopMetricsSnapshot {
    pub(crate) fps: f32,
    pub(crate) tps: f32,
    pub(crate) avg_frame_ms: f32,
    pub(crate) worst_frame_ms: f32,
    /// Frames whose tick backlog was cut by the per-frame tick cap.
    pub(crate) clamped_frames: u32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    window_start: Instant,
    window: Duration,
    frames: u32,
    ticks: u32,
    frame_time_total: Duration,
    worst_frame: Duration,
    clamped_frames: u32,
}

impl MetricsAccumulator {
    pub(crate) fn new(window: Duration) -> Self {
        Self::starting_at(Instant::now(), window)
    }

    fn starting_at(window_start: Instant, window: Duration) -> Self {
        Self {
            window_start,
            window,
            frames: 0,
            ticks: 0,
            frame_time_total: Duration::ZERO,
            worst_frame: Duration::ZERO,
            clamped_frames: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, ticks_run: u32, clamped: bool) {
        self.frames = self.frames.saturating_add(1);
        self.ticks = self.ticks.saturating_add(ticks_run);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
        self.worst_frame = self.worst_frame.max(frame_dt);
        if clamped {
            self.clamped_frames = self.clamped_frames.saturating_add(1);
        }
    }

    /// Closes the window once it has run its length and starts the next one
    /// at `now`.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let avg_frame_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            avg_frame_ms,
            worst_frame_ms: self.worst_frame.as_secs_f32() * 1000.0,
            clamped_frames: self.clamped_frames,
        };
        *self = Self::starting_at(now, self.window);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_from(base: Instant) -> MetricsAccumulator {
        MetricsAccumulator::starting_at(base, Duration::from_secs(1))
    }

    #[test]
    fn reports_rates_and_frame_times_for_window() {
        let base = Instant::now();
        let mut metrics = window_from(base);
        metrics.record_frame(Duration::from_millis(10), 1, false);
        metrics.record_frame(Duration::from_millis(30), 3, true);

        let snapshot = metrics
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("window closed");

        assert!((snapshot.fps - 1.0).abs() < 0.01);
        assert!((snapshot.tps - 2.0).abs() < 0.01);
        assert!((snapshot.avg_frame_ms - 20.0).abs() < 0.01);
        assert!((snapshot.worst_frame_ms - 30.0).abs() < 0.01);
        assert_eq!(snapshot.clamped_frames, 1);
    }

    #[test]
    fn open_window_reports_nothing() {
        let base = Instant::now();
        let mut metrics = window_from(base);
        metrics.record_frame(Duration::from_millis(16), 1, false);

        assert_eq!(metrics.maybe_snapshot(base + Duration::from_millis(999)), None);
    }

    #[test]
    fn next_window_starts_empty() {
        let base = Instant::now();
        let mut metrics = window_from(base);
        metrics.record_frame(Duration::from_millis(50), 4, true);
        assert!(metrics.maybe_snapshot(base + Duration::from_secs(1)).is_some());

        let next = metrics
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second window");
        assert_eq!(next, LoopMetricsSnapshot::default());
    }
}
