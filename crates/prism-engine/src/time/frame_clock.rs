use std::time::{Duration, Instant};

/// Timing snapshot for one redraw cycle.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Timestamp taken at the tick.
    pub now: Instant,

    /// Zero-based index of this redraw cycle.
    pub frame_index: u64,
}

/// Produces `FrameTime` snapshots.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    next_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose baseline is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            next_index: 0,
            dt_min: DEFAULT_DT_MIN,
            dt_max: DEFAULT_DT_MAX,
        }
    }

    /// Replaces the delta clamps.
    pub fn with_clamps(mut self, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        self.dt_min = dt_min;
        self.dt_max = dt_max;
        self
    }

    /// Number of ticks taken so far.
    pub fn frames(&self) -> u64 {
        self.next_index
    }

    /// Moves the baseline to now without counting a frame.
    ///
    /// Used after the window is re-exposed so the first delta is not the
    /// whole time it was hidden.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.next_index,
        };
        self.next_index = self.next_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
