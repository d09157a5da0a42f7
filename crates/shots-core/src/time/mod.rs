use std::time::{Duration, SystemTime, UNIX_EPOCH};

const EPSILON: Duration = Duration::from_nanos(1);

/// Source of wall-clock time, expressed as the offset from the Unix epoch.
pub trait Clock {
    fn now(&mut self) -> Duration;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Wraps a clock so that successive readings never go backwards.
///
/// A regression (NTP step, manual clock change) is clamped to the previous
/// reading plus one nanosecond, so elapsed deltas computed from two readings
/// are always non-negative.
#[derive(Debug, Clone)]
pub struct MonotonicWallClock<C: Clock = SystemClock> {
    clock: C,
    last: Option<Duration>,
}

impl<C: Clock> MonotonicWallClock<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock, last: None }
    }

    pub fn now(&mut self) -> Duration {
        let candidate = self.clock.now();
        let next = match self.last {
            Some(prev) if candidate < prev => {
                log::warn!(
                    target: "shots_core::time",
                    "Wall clock went backwards by {:?}; clamping",
                    prev - candidate
                );
                prev.checked_add(EPSILON).unwrap_or(prev)
            }
            _ => candidate,
        };
        self.last = Some(next);
        next
    }
}

pub fn to_system_time(since_epoch: Duration) -> SystemTime {
    UNIX_EPOCH + since_epoch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct MockClock {
        times: RefCell<Vec<Duration>>,
    }

    impl MockClock {
        fn new(times: Vec<Duration>) -> Self {
            Self {
                times: RefCell::new(times),
            }
        }
    }

    impl Clock for MockClock {
        fn now(&mut self) -> Duration {
            let mut times = self.times.borrow_mut();
            if times.len() == 1 {
                times[0]
            } else {
                times.remove(0)
            }
        }
    }

    #[test]
    fn regressions_are_clamped() {
        let clock = MockClock::new(vec![
            Duration::from_secs(10),
            Duration::from_secs(8),
            Duration::from_secs(12),
        ]);
        let mut wall = MonotonicWallClock::with_clock(clock);

        let a = wall.now();
        let b = wall.now();
        let c = wall.now();

        assert_eq!(a, Duration::from_secs(10));
        assert_eq!(b, Duration::from_secs(10) + EPSILON);
        assert_eq!(c, Duration::from_secs(12));
    }

    #[test]
    fn system_time_matches_epoch_offset() {
        let clock = MockClock::new(vec![Duration::from_secs(1_600_000_000)]);
        let mut wall = MonotonicWallClock::with_clock(clock);
        let instant = to_system_time(wall.now());
        assert_eq!(
            instant.duration_since(UNIX_EPOCH).unwrap(),
            Duration::from_secs(1_600_000_000)
        );
    }
}
