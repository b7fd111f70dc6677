use std::time::{Duration, Instant};

/// Frame timing snapshot handed to `Scene::advance_frame`.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds since the clock was last reset (sum of clamped `dt`s).
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Frames ticked since the last reset. The first frame of a scene is `0`.
    pub frame_index: u64,
}

/// Produces `FrameTime` snapshots for the render loop.
///
/// The lifecycle manager owns one clock and resets it on every scene start, so
/// each scene sees its own timeline starting at frame `0`.
///
/// Delta time is clamped: the lower bound keeps animation steps non-zero when
/// the platform delivers redraws back to back, the upper bound keeps a stalled
/// window (debugger, minimized, slow surface reconfigure) from producing one
/// huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f32,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts the timeline: next tick reports frame `0` and a small `dt`.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.elapsed = 0.0;
        self.frame_index = 0;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();

        self.last = now;
        self.elapsed += dt;

        let ft = FrameTime {
            dt,
            elapsed: self.elapsed,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── clamping ──────────────────────────────────────────────────────────

    #[test]
    fn dt_clamped_to_max_after_stall() {
        let mut clock = FrameClock::new();
        let later = clock.last + Duration::from_secs(5);
        let ft = clock.tick_at(later);
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn dt_clamped_to_min_for_back_to_back_ticks() {
        let mut clock = FrameClock::new();
        let same = clock.last;
        let ft = clock.tick_at(same);
        assert!((ft.dt - 0.0001).abs() < 1e-7);
    }

    // ── frame index / reset ───────────────────────────────────────────────

    #[test]
    fn frame_index_counts_from_zero() {
        let mut clock = FrameClock::new();
        let t0 = clock.last;
        assert_eq!(clock.tick_at(t0 + Duration::from_millis(16)).frame_index, 0);
        assert_eq!(clock.tick_at(t0 + Duration::from_millis(32)).frame_index, 1);
    }

    #[test]
    fn reset_restarts_timeline() {
        let mut clock = FrameClock::new();
        let t0 = clock.last;
        clock.tick_at(t0 + Duration::from_millis(16));
        clock.tick_at(t0 + Duration::from_millis(32));

        clock.reset();
        let ft = clock.tick();
        assert_eq!(ft.frame_index, 0);
        assert!(ft.elapsed <= 0.25);
    }
}
