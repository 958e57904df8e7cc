//! Fixed-interval tick schedule for the auto-rotate loop.
//!
//! The host drives time: it calls `poll(now)` once per paint and asks
//! `time_until(now)` how long it may sleep before the next repaint. That keeps
//! painting vsync-aligned (egui repaints) while the advance rate follows the
//! interval, not the display refresh rate.
//!
//! One pending tick at most. `cancel()` is the single stop call; a fired tick
//! is not re-armed until the owner calls `reschedule(now)`.
//!
//! # Usage
//! ```ignore
//! schedule.start(now);
//! // every paint:
//! if schedule.poll(now) {
//!     advance_one_frame();
//!     schedule.reschedule(now);
//! }
//! ctx.request_repaint_after(schedule.time_until(now).unwrap_or_default());
//! ```

use std::time::{Duration, Instant};

/// Default auto-rotate rate (frames per second)
pub const DEFAULT_FPS: f32 = 30.0;

#[derive(Debug, Clone)]
pub struct TickSchedule {
    interval: Duration,
    due: Option<Instant>,
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::from_fps(DEFAULT_FPS)
    }
}

impl TickSchedule {
    pub fn new(interval: Duration) -> Self {
        Self { interval, due: None }
    }

    /// Interval for a target rate; non-positive rates fall back to the default
    pub fn from_fps(fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { DEFAULT_FPS };
        Self::new(Duration::from_secs_f64(1.0 / fps as f64))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the first tick one interval from `now` (replaces any pending tick)
    pub fn start(&mut self, now: Instant) {
        self.due = Some(now + self.interval);
        log::trace!("TickSchedule: started, interval {:?}", self.interval);
    }

    /// Re-arm after a tick fired
    pub fn reschedule(&mut self, now: Instant) {
        self.due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        if self.due.take().is_some() {
            log::trace!("TickSchedule: cancelled pending tick");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.due.is_some()
    }

    /// True if the pending tick is due. Consumes it: at most one tick per call,
    /// late polls never produce catch-up bursts.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    /// Remaining delay until the pending tick (zero if overdue)
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_interval() {
        let mut s = TickSchedule::new(Duration::from_millis(100));
        let t0 = Instant::now();
        s.start(t0);
        assert!(s.is_scheduled());
        assert!(!s.poll(t0));
        assert!(!s.poll(t0 + Duration::from_millis(99)));
        assert!(s.poll(t0 + Duration::from_millis(100)));
        assert!(!s.is_scheduled());
    }

    #[test]
    fn test_single_tick_when_late() {
        let mut s = TickSchedule::new(Duration::from_millis(10));
        let t0 = Instant::now();
        s.start(t0);
        let late = t0 + Duration::from_secs(1);
        assert!(s.poll(late));
        assert!(!s.poll(late));
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let mut s = TickSchedule::new(Duration::from_millis(10));
        let t0 = Instant::now();
        s.start(t0);
        s.cancel();
        assert!(!s.poll(t0 + Duration::from_secs(1)));
        assert_eq!(s.time_until(t0), None);
    }

    #[test]
    fn test_time_until() {
        let mut s = TickSchedule::new(Duration::from_millis(40));
        let t0 = Instant::now();
        s.start(t0);
        assert_eq!(s.time_until(t0 + Duration::from_millis(15)), Some(Duration::from_millis(25)));
        assert_eq!(s.time_until(t0 + Duration::from_millis(90)), Some(Duration::ZERO));
    }

    #[test]
    fn test_from_fps() {
        let s = TickSchedule::from_fps(25.0);
        assert_eq!(s.interval().as_micros(), 40_000);
        let s = TickSchedule::from_fps(0.0);
        assert_eq!(s.interval(), TickSchedule::from_fps(DEFAULT_FPS).interval());
    }
}
