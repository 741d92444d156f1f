use std::time::Duration;

/// Countdown counter clocked by accumulated wall-clock time.
///
/// Each time the accumulated delta reaches one period the timer steps once:
/// it decrements, or wraps from 0 back to its frequency. A single oversized
/// delta still produces only one step.
pub struct Timer {
    value: u32,
    frequency: u32,
    accumulated: Duration,
    period: Duration,
}

impl Timer {
    pub fn new(frequency: u32) -> Self {
        Self {
            value: 0,
            frequency,
            accumulated: Duration::ZERO,
            // A zero frequency never fires
            period: Duration::from_secs(1)
                .checked_div(frequency)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Accumulates `delta` and returns true if the timer stepped.
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.accumulated = self.accumulated.saturating_add(delta);

        if self.accumulated < self.period {
            return false;
        }

        self.accumulated = Duration::ZERO;
        self.value = match self.value {
            0 => self.frequency,
            value => value - 1,
        };
        true
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn set_value(&mut self, value: u32) {
        self.value = value;
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}
