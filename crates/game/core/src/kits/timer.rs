/// Countdown for time-boxed effects and cooldowns.
///
/// Inactive until started; `advance` reports the frame on which it runs out.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Countdown {
    remaining: Option<f32>,
}

impl Countdown {
    pub fn start(&mut self, duration: f32) {
        self.remaining = Some(duration.max(0.0));
    }

    /// Stops the countdown. Returns true if it was running.
    pub fn stop(&mut self) -> bool {
        self.remaining.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds left, zero when inactive.
    pub fn remaining(&self) -> f32 {
        self.remaining.unwrap_or(0.0)
    }

    /// Adds time to a running countdown. No-op when inactive.
    pub fn extend(&mut self, seconds: f32) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining += seconds;
        }
    }

    /// Counts down; returns true on the frame the countdown expires.
    pub fn advance(&mut self, delta_time: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= delta_time;
        if *remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn repair(&mut self) -> bool {
        match self.remaining {
            Some(r) if !r.is_finite() || r <= 0.0 => {
                self.remaining = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_exactly_once() {
        let mut timer = Countdown::default();
        assert!(!timer.advance(1.0));
        timer.start(1.0);
        assert!(!timer.advance(0.5));
        assert!(timer.advance(0.5));
        assert!(!timer.is_active());
        assert!(!timer.advance(0.5));
    }

    #[test]
    fn extend_only_running_timers() {
        let mut timer = Countdown::default();
        timer.extend(5.0);
        assert!(!timer.is_active());
        timer.start(2.0);
        timer.extend(5.0);
        assert_eq!(timer.remaining(), 7.0);
    }
}
