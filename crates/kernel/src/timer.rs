use std::time::{Duration, Instant};

/// Ring buffer of recent frame intervals.
#[derive(Debug)]
pub struct FrameTimer {
    history: Vec<Duration>,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    /// Keep the last `capacity` intervals (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            index: 0,
            filled: false,
        }
    }

    /// Push an interval, overwriting the oldest once full.
    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
    }

    /// Number of intervals held.
    pub fn count(&self) -> usize {
        if self.filled {
            self.history.len()
        } else {
            self.index
        }
    }

    fn recorded(&self) -> &[Duration] {
        &self.history[..self.count()]
    }

    /// Mean interval, zero with no samples.
    pub fn average(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        self.recorded().iter().sum::<Duration>() / count as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.recorded().iter().copied().min().unwrap_or(Duration::ZERO)
    }

    /// Frames per second implied by the average interval, 0 with no samples.
    pub fn rate(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

/// A frame-rate readout that only changes once per refresh period, so it
/// stays readable.
#[derive(Debug)]
pub struct RateDisplay {
    period: Duration,
    last_refresh: Option<Instant>,
    shown: u32,
}

impl RateDisplay {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

    /// Refresh the readout at most once per `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_refresh: None,
            shown: 0,
        }
    }

    /// Begin counting the first period at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last_refresh = Some(now);
        self.shown = 0;
    }

    /// Take `rate` as the shown value if a full period has passed. Returns
    /// true when the shown value was refreshed.
    pub fn sample(&mut self, now: Instant, rate: f64) -> bool {
        let last = *self.last_refresh.get_or_insert(now);
        if now.duration_since(last) < self.period {
            return false;
        }
        self.shown = rate.round() as u32;
        self.last_refresh = Some(now);
        true
    }

    /// Rate currently on display, rounded to whole frames per second.
    pub fn shown(&self) -> u32 {
        self.shown
    }
}

impl Default for RateDisplay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_timer_tracks_history() {
        let mut timer = FrameTimer::new(3);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));

        assert_eq!(timer.count(), 3);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert_eq!(timer.max(), Duration::from_millis(30));
        assert_eq!(timer.min(), Duration::from_millis(10));
        assert_eq!(timer.rate().round(), 50.0);
    }

    #[test]
    fn frame_timer_wraps_around() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(25));
    }

    #[test]
    fn empty_timer_has_no_rate() {
        let timer = FrameTimer::new(4);
        assert_eq!(timer.rate(), 0.0);
        assert_eq!(timer.max(), Duration::ZERO);
    }

    #[test]
    fn display_refreshes_once_per_period() {
        let t0 = Instant::now();
        let mut display = RateDisplay::default();
        display.reset(t0);
        assert!(!display.sample(t0 + Duration::from_secs(1), 60.0));
        assert_eq!(display.shown(), 0);
        assert!(display.sample(t0 + Duration::from_secs(5), 59.6));
        assert_eq!(display.shown(), 60);
        assert!(!display.sample(t0 + Duration::from_secs(9), 30.0));
        assert_eq!(display.shown(), 60);
    }
}
