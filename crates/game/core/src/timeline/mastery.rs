use super::Timeline;

/// Per-timeline mastery, each value held in `[0, 1]`.
///
/// Mastery accelerates energy regeneration while its timeline is current:
/// the regen rate is multiplied by `1 + mastery`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mastery {
    levels: [f32; 3],
}

impl Mastery {
    pub const MAX: f32 = 1.0;

    pub fn get(&self, timeline: Timeline) -> f32 {
        self.levels[timeline.index()]
    }

    /// Adds `amount` (which may be negative) and clamps into `[0, 1]`.
    ///
    /// Returns the applied delta after clamping. Non-finite amounts are ignored.
    pub fn add(&mut self, timeline: Timeline, amount: f32) -> f32 {
        if !amount.is_finite() {
            return 0.0;
        }
        let slot = &mut self.levels[timeline.index()];
        let before = *slot;
        *slot = (before + amount).clamp(0.0, Self::MAX);
        *slot - before
    }

    /// Overwrites a level, clamping into `[0, 1]`.
    pub fn set(&mut self, timeline: Timeline, value: f32) {
        self.levels[timeline.index()] = sanitize(value);
    }

    /// Clamps every level into range, replacing non-finite values with zero.
    ///
    /// Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;
        for level in &mut self.levels {
            let fixed = sanitize(*level);
            if fixed != *level {
                *level = fixed;
                changed = true;
            }
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timeline, f32)> + '_ {
        [Timeline::BrightWorld, Timeline::DarkWorld, Timeline::Any]
            .into_iter()
            .map(|timeline| (timeline, self.get(timeline)))
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, Mastery::MAX)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_clamps_at_both_ends() {
        let mut mastery = Mastery::default();
        assert_eq!(mastery.add(Timeline::DarkWorld, 0.4), 0.4);
        let applied = mastery.add(Timeline::DarkWorld, 5.0);
        assert!((applied - 0.6).abs() < 1e-6);
        assert_eq!(mastery.get(Timeline::DarkWorld), 1.0);

        mastery.add(Timeline::DarkWorld, -3.0);
        assert_eq!(mastery.get(Timeline::DarkWorld), 0.0);
        assert_eq!(mastery.get(Timeline::BrightWorld), 0.0);
    }

    #[test]
    fn repair_fixes_out_of_range_levels() {
        let mut mastery = Mastery::default();
        mastery.levels = [1.7, f32::NAN, -0.2];
        assert!(mastery.repair());
        assert_eq!(mastery.get(Timeline::BrightWorld), 1.0);
        assert_eq!(mastery.get(Timeline::DarkWorld), 0.0);
        assert_eq!(mastery.get(Timeline::Any), 0.0);
        assert!(!mastery.repair());
    }
}
