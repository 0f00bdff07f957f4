//! Character statistics: base stats, timeline affinity, meters and the
//! specialization bonus tables.
//!
//! Stats are layered and always derived fresh from stored inputs:
//!
//! ```text
//! base (class template) → level growth → specialization bonuses
//!     → current-timeline effects → clamp
//! ```
//!
//! Nothing here is mutated in place by level-ups or specialization unlocks,
//! so re-deriving never compounds a bonus.
mod meter;
mod specialization;

pub use meter::Meter;
pub use specialization::{
    ElementalBias, Specialization, SpecializationTable, StatMultipliers, SynergyScaling,
};

use crate::timeline::Timeline;

/// Core numbers of a character. All values are kept non-negative; the two
/// chances additionally stay within `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassStats {
    pub health: f32,
    pub timeline_energy: f32,
    /// Timeline energy regenerated per second.
    pub stamina_regen: f32,
    pub timeline_power: f32,
    pub critical_chance: f32,
    pub dodge_chance: f32,
}

impl ClassStats {
    /// Per-level growth multipliers and additive chance gains.
    pub const HEALTH_GROWTH: f32 = 1.1;
    pub const ENERGY_GROWTH: f32 = 1.05;
    pub const POWER_GROWTH: f32 = 1.08;
    pub const CHANCE_GROWTH: f32 = 0.002;

    pub const fn new(
        health: f32,
        timeline_energy: f32,
        stamina_regen: f32,
        timeline_power: f32,
        critical_chance: f32,
        dodge_chance: f32,
    ) -> Self {
        Self {
            health,
            timeline_energy,
            stamina_regen,
            timeline_power,
            critical_chance,
            dodge_chance,
        }
    }

    /// Stats after `level - 1` level-ups. Level 1 (or 0) returns `self`.
    pub fn at_level(&self, level: u32) -> Self {
        let ups = level.saturating_sub(1);
        let exp = i32::try_from(ups).unwrap_or(i32::MAX);
        Self {
            health: self.health * Self::HEALTH_GROWTH.powi(exp),
            timeline_energy: self.timeline_energy * Self::ENERGY_GROWTH.powi(exp),
            stamina_regen: self.stamina_regen,
            timeline_power: self.timeline_power * Self::POWER_GROWTH.powi(exp),
            critical_chance: self.critical_chance + Self::CHANCE_GROWTH * ups as f32,
            dodge_chance: self.dodge_chance + Self::CHANCE_GROWTH * ups as f32,
        }
    }

    pub fn scaled(&self, multipliers: &StatMultipliers) -> Self {
        Self {
            health: self.health * multipliers.health,
            timeline_energy: self.timeline_energy * multipliers.timeline_energy,
            stamina_regen: self.stamina_regen * multipliers.stamina_regen,
            timeline_power: self.timeline_power * multipliers.timeline_power,
            critical_chance: self.critical_chance * multipliers.critical_chance,
            dodge_chance: self.dodge_chance * multipliers.dodge_chance,
        }
    }

    /// Current-timeline effects.
    ///
    /// DarkWorld sharpens crit and dodge, BrightWorld hardens health and
    /// stamina; both scale power by `1 + synergy`. No context, no change.
    pub fn with_timeline_effects(&self, current: Option<Timeline>, synergy: f32) -> Self {
        let mut stats = *self;
        match current {
            Some(Timeline::DarkWorld) => {
                stats.critical_chance *= 1.3;
                stats.dodge_chance *= 1.2;
                stats.timeline_power *= 1.0 + synergy;
            }
            Some(Timeline::BrightWorld) => {
                stats.health *= 1.2;
                stats.stamina_regen *= 1.3;
                stats.timeline_power *= 1.0 + synergy;
            }
            Some(Timeline::Any) | None => {}
        }
        stats
    }

    /// Clamps every value to `>= 0` and the chances to `[0, 1]`.
    /// Non-finite values become zero.
    pub fn clamped(&self) -> Self {
        Self {
            health: non_negative(self.health),
            timeline_energy: non_negative(self.timeline_energy),
            stamina_regen: non_negative(self.stamina_regen),
            timeline_power: non_negative(self.timeline_power),
            critical_chance: non_negative(self.critical_chance).min(1.0),
            dodge_chance: non_negative(self.dodge_chance).min(1.0),
        }
    }
}

impl Default for ClassStats {
    /// Baseline adventurer stats.
    fn default() -> Self {
        Self::new(1000.0, 100.0, 10.0, 50.0, 0.05, 0.05)
    }
}

/// How a character relates to the two timelines. Every field is a multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineAffinity {
    pub preferred_timeline: Timeline,
    pub energy_efficiency: f32,
    pub damage_bonus: f32,
    pub resistance: f32,
}

impl TimelineAffinity {
    pub const fn new(
        preferred_timeline: Timeline,
        energy_efficiency: f32,
        damage_bonus: f32,
        resistance: f32,
    ) -> Self {
        Self {
            preferred_timeline,
            energy_efficiency,
            damage_bonus,
            resistance,
        }
    }

    pub fn scaled(&self, multipliers: &StatMultipliers) -> Self {
        Self {
            preferred_timeline: self.preferred_timeline,
            energy_efficiency: self.energy_efficiency * multipliers.energy_efficiency,
            damage_bonus: self.damage_bonus * multipliers.damage_bonus,
            resistance: self.resistance * multipliers.resistance,
        }
    }

    /// Replaces negative or non-finite multipliers with zero.
    pub fn clamped(&self) -> Self {
        Self {
            preferred_timeline: self.preferred_timeline,
            energy_efficiency: non_negative(self.energy_efficiency),
            damage_bonus: non_negative(self.damage_bonus),
            resistance: non_negative(self.resistance),
        }
    }
}

impl Default for TimelineAffinity {
    fn default() -> Self {
        Self::new(Timeline::Any, 1.0, 1.0, 1.0)
    }
}

pub(crate) fn non_negative(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
