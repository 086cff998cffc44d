use std::time::{Duration, Instant};

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Seconds since the previous tick.
    pub delta: f32,
    /// Zero-based frame counter.
    pub frame: u64,
}

/// Monotonic frame clock feeding the light orbit.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frames: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`. Instants earlier than the previous tick count as zero delta.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let delta = now.saturating_duration_since(self.last);
        if now > self.last {
            self.last = now;
        }
        let time = FrameTime {
            elapsed: self.last.duration_since(self.start).as_secs_f64(),
            delta: delta.as_secs_f32(),
            frame: self.frames,
        };
        self.frames += 1;
        time
    }

    pub fn elapsed(&self) -> Duration {
        self.last.duration_since(self.start)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_accumulate() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let first = clock.tick_at(start + Duration::from_millis(16));
        assert_eq!(first.frame, 0);
        assert!((first.delta - 0.016).abs() < 1e-6);

        let second = clock.tick_at(start + Duration::from_millis(50));
        assert_eq!(second.frame, 1);
        assert!((second.elapsed - 0.05).abs() < 1e-9);
        assert!((second.delta - 0.034).abs() < 1e-6);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn backwards_instant_is_zero_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(100));
        let t = clock.tick_at(start + Duration::from_millis(40));
        assert_eq!(t.delta, 0.0);
        assert!((t.elapsed - 0.1).abs() < 1e-9);
    }
}
