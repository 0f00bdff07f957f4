use crate::error::ConfigError;

/// Tunables for the shared timeline resource.
///
/// Defaults match the shipped balance: a one-second transition that costs 25 of
/// 100 energy, regenerating 10 energy per second before mastery scaling.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimelineConfig {
    /// Seconds a transition takes from request to completion.
    pub transition_duration: f32,
    /// Energy deducted when a transition starts.
    pub min_transition_energy: f32,
    /// Energy regenerated per second at zero mastery.
    pub energy_regen_rate: f32,
    /// Energy capacity.
    pub max_energy: f32,
    /// Mastery gained per point of activity reported by callers.
    pub mastery_gain_rate: f32,
}

impl TimelineConfig {
    pub const DEFAULT_TRANSITION_DURATION: f32 = 1.0;
    pub const DEFAULT_MIN_TRANSITION_ENERGY: f32 = 25.0;
    pub const DEFAULT_ENERGY_REGEN_RATE: f32 = 10.0;
    pub const DEFAULT_MAX_ENERGY: f32 = 100.0;
    pub const DEFAULT_MASTERY_GAIN_RATE: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            transition_duration: Self::DEFAULT_TRANSITION_DURATION,
            min_transition_energy: Self::DEFAULT_MIN_TRANSITION_ENERGY,
            energy_regen_rate: Self::DEFAULT_ENERGY_REGEN_RATE,
            max_energy: Self::DEFAULT_MAX_ENERGY,
            mastery_gain_rate: Self::DEFAULT_MASTERY_GAIN_RATE,
        }
    }

    /// Checks that every tunable is usable.
    ///
    /// The transition duration must be strictly positive since progress is
    /// computed as `dt / duration`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("transition_duration", self.transition_duration)?;
        positive("max_energy", self.max_energy)?;
        non_negative("min_transition_energy", self.min_transition_energy)?;
        non_negative("energy_regen_rate", self.energy_regen_rate)?;
        non_negative("mastery_gain_rate", self.mastery_gain_rate)?;

        if self.min_transition_energy > self.max_energy {
            return Err(ConfigError::CostExceedsCapacity {
                cost: self.min_transition_energy,
                max: self.max_energy,
            });
        }
        Ok(())
    }

    /// Mastery earned for `activity` units of in-timeline action.
    pub fn mastery_for(&self, activity: f32) -> f32 {
        activity * self.mastery_gain_rate
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(TimelineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let config = TimelineConfig {
            transition_duration: 0.0,
            ..TimelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "transition_duration",
                ..
            })
        ));
    }

    #[test]
    fn transition_cost_cannot_exceed_capacity() {
        let config = TimelineConfig {
            min_transition_energy: 150.0,
            ..TimelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CostExceedsCapacity { .. })
        ));
    }
}
