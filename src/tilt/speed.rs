use shakmaty::Color;

/// Running mean of one player's time spent per move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollingSpeed {
    total_secs: i64,
    samples: u32,
}

impl RollingSpeed {
    pub fn push(&mut self, time_spent: i64) {
        self.total_secs += time_spent;
        self.samples += 1;
    }

    /// Arithmetic mean, or `fallback` before the first sample.
    pub fn average_or(&self, fallback: f64) -> f64 {
        if self.samples == 0 {
            fallback
        } else {
            self.total_secs as f64 / f64::from(self.samples)
        }
    }
}

/// One [`RollingSpeed`] per colour, owned by a single analysis run.
#[derive(Debug, Clone, Default)]
pub struct SpeedTracker {
    white: RollingSpeed,
    black: RollingSpeed,
}

impl SpeedTracker {
    pub fn get(&self, color: Color) -> &RollingSpeed {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn record(&mut self, color: Color, time_spent: i64) {
        match color {
            Color::White => self.white.push(time_spent),
            Color::Black => self.black.push(time_spent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_uses_fallback() {
        let speed = RollingSpeed::default();
        assert_eq!(speed.average_or(10.0), 10.0);
    }

    #[test]
    fn test_mean() {
        let mut speed = RollingSpeed::default();
        for t in [4, 9, 2] {
            speed.push(t);
        }
        assert_eq!(speed.average_or(10.0), 5.0);
    }

    #[test]
    fn test_negative_samples_are_kept() {
        let mut speed = RollingSpeed::default();
        speed.push(-3);
        speed.push(7);
        assert_eq!(speed.average_or(10.0), 2.0);
    }

    #[test]
    fn test_tracker_keeps_colors_apart() {
        let mut tracker = SpeedTracker::default();
        tracker.record(Color::White, 6);
        tracker.record(Color::Black, 20);
        tracker.record(Color::White, 2);

        assert_eq!(tracker.get(Color::White).average_or(10.0), 4.0);
        assert_eq!(tracker.get(Color::Black).average_or(10.0), 20.0);
    }
}
