//! Channelable resource pool with an edge-triggered buildup threshold.
//!
//! Light resonance and void corruption share this shape:
//!
//! - `power` fills while channeling and drifts at an idle rate otherwise
//!   (negative for light, positive for void)
//! - `buildup` grows while channeling or when abilities add to it, and decays
//!   linearly toward zero when idle
//! - crossing `buildup >= threshold` latches the pool active; the crossing is
//!   reported once per rising edge and re-arms only after buildup falls back
//!   below the threshold

/// Fixed tuning of a pool.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    pub max_power: f32,
    pub threshold: f32,
    /// Power gained per second while channeling.
    pub channel_rate: f32,
    /// Buildup gained per second while channeling.
    pub buildup_rate: f32,
    /// Buildup lost per second while idle.
    pub buildup_decay: f32,
    /// Power change per second while idle. Negative drains.
    pub idle_power_rate: f32,
    /// Capacity multiplier while the threshold state is active.
    pub active_capacity: f32,
    /// Upper bound for buildup, as a multiple of the threshold.
    pub buildup_cap: f32,
}

/// Timeline-dependent multipliers for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoolRates {
    pub channel: f32,
    pub buildup: f32,
}

impl PoolRates {
    pub const NEUTRAL: PoolRates = PoolRates {
        channel: 1.0,
        buildup: 1.0,
    };
}

/// Threshold crossing reported by [`ThresholdPool::advance`] and friends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThresholdEdge {
    Rising,
    Falling,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdPool {
    config: PoolConfig,
    power: f32,
    buildup: f32,
    channeling: bool,
    latched: bool,
}

impl ThresholdPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            power: 0.0,
            buildup: 0.0,
            channeling: false,
            latched: false,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn buildup(&self) -> f32 {
        self.buildup
    }

    pub fn is_channeling(&self) -> bool {
        self.channeling
    }

    /// Latched threshold state (resonating / corrupted).
    pub fn is_active(&self) -> bool {
        self.latched
    }

    /// Current capacity, raised while active.
    pub fn max_power(&self) -> f32 {
        if self.latched {
            self.config.max_power * self.config.active_capacity
        } else {
            self.config.max_power
        }
    }

    /// `power / max_power` against the base capacity.
    pub fn power_ratio(&self) -> f32 {
        if self.config.max_power > 0.0 {
            self.power / self.config.max_power
        } else {
            0.0
        }
    }

    pub(crate) fn set_channeling(&mut self, channeling: bool) -> bool {
        let changed = self.channeling != channeling;
        self.channeling = channeling;
        changed
    }

    /// Deducts `amount` power if available.
    pub fn spend(&mut self, amount: f32) -> bool {
        if self.power < amount {
            return false;
        }
        self.power -= amount;
        true
    }

    /// Adds buildup and reports a crossing caused by it.
    pub fn add_buildup(&mut self, amount: f32) -> Option<ThresholdEdge> {
        self.buildup = (self.buildup + amount).clamp(0.0, self.buildup_cap());
        self.detect_edge()
    }

    /// Advances one frame of channeling or idle drift.
    pub fn advance(&mut self, delta_time: f32, rates: PoolRates) -> Option<ThresholdEdge> {
        if self.channeling {
            self.power += self.config.channel_rate * rates.channel * delta_time;
            self.buildup += self.config.buildup_rate * rates.buildup * delta_time;
        } else {
            self.power += self.config.idle_power_rate * delta_time;
            self.buildup -= self.config.buildup_decay * delta_time;
        }
        self.buildup = self.buildup.clamp(0.0, self.buildup_cap());
        let edge = self.detect_edge();
        self.power = self.power.clamp(0.0, self.max_power());
        edge
    }

    /// Clamps persisted values back into range. Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        let before = self.clone();
        self.buildup = finite_or_zero(self.buildup).clamp(0.0, self.buildup_cap());
        self.latched = self.buildup >= self.config.threshold;
        self.power = finite_or_zero(self.power).clamp(0.0, self.max_power());
        *self != before
    }

    fn buildup_cap(&self) -> f32 {
        self.config.threshold * self.config.buildup_cap
    }

    fn detect_edge(&mut self) -> Option<ThresholdEdge> {
        let above = self.buildup >= self.config.threshold;
        match (above, self.latched) {
            (true, false) => {
                self.latched = true;
                Some(ThresholdEdge::Rising)
            }
            (false, true) => {
                self.latched = false;
                Some(ThresholdEdge::Falling)
            }
            _ => None,
        }
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx;

    fn config() -> PoolConfig {
        PoolConfig {
            max_power: 200.0,
            threshold: 100.0,
            channel_rate: 10.0,
            buildup_rate: 5.0,
            buildup_decay: 5.0,
            idle_power_rate: 0.0,
            active_capacity: 1.0,
            buildup_cap: 2.0,
        }
    }

    #[test]
    fn channeling_fills_power_and_buildup() {
        let mut pool = ThresholdPool::new(config());
        pool.set_channeling(true);
        pool.advance(2.0, PoolRates::NEUTRAL);
        assert_approx!(pool.power(), 20.0);
        assert_approx!(pool.buildup(), 10.0);

        pool.set_channeling(false);
        pool.advance(1.0, PoolRates::NEUTRAL);
        assert_approx!(pool.buildup(), 5.0);
        assert_approx!(pool.power(), 20.0);
    }

    #[test]
    fn threshold_fires_once_per_rising_edge() {
        let mut pool = ThresholdPool::new(config());
        assert_eq!(pool.add_buildup(100.0), Some(ThresholdEdge::Rising));
        assert!(pool.is_active());
        assert_eq!(pool.add_buildup(10.0), None);
        assert_eq!(pool.advance(0.5, PoolRates::NEUTRAL), None);

        // decay below the threshold re-arms the notification
        assert_eq!(pool.advance(10.0, PoolRates::NEUTRAL), Some(ThresholdEdge::Falling));
        assert!(!pool.is_active());
        assert_eq!(pool.add_buildup(100.0), Some(ThresholdEdge::Rising));
    }

    #[test]
    fn power_is_capped_by_capacity() {
        let mut pool = ThresholdPool::new(PoolConfig {
            active_capacity: 1.2,
            ..config()
        });
        pool.set_channeling(true);
        pool.advance(100.0, PoolRates::NEUTRAL);
        // buildup 500 capped at 200, so the pool is active with the raised cap
        assert!(pool.is_active());
        assert_approx!(pool.power(), 240.0);
        assert!(!pool.spend(250.0));
        assert!(pool.spend(40.0));
    }

    #[test]
    fn repair_relatches_from_buildup() {
        let mut pool = ThresholdPool::new(config());
        pool.buildup = 150.0;
        pool.power = -4.0;
        assert!(pool.repair());
        assert!(pool.is_active());
        assert_eq!(pool.power(), 0.0);
    }
}
