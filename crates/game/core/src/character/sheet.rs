use crate::modifier::ModifierPipeline;
use crate::stats::{ClassStats, Specialization, TimelineAffinity};
use crate::timeline::{Timeline, TimelineContext};

/// Playable classes. `Adventurer` is the kit-less base class.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassKind {
    #[default]
    Adventurer,
    LightPaladin,
    VoidMage,
    TimeWarrior,
    TimelineAssassin,
}

/// Data that defines a class: starting stats, affinity and the
/// specializations it may unlock.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassTemplate {
    pub kind: ClassKind,
    pub stats: ClassStats,
    pub affinity: TimelineAffinity,
    pub specializations: Vec<Specialization>,
}

impl ClassTemplate {
    /// Built-in template for `kind`.
    pub fn builtin(kind: ClassKind) -> Self {
        use Specialization::{ChronoMaster, LightBringer, TimelineWeaver, VoidWalker};

        let (stats, affinity, specializations) = match kind {
            ClassKind::Adventurer => (
                ClassStats::default(),
                TimelineAffinity::default(),
                vec![TimelineWeaver, VoidWalker, LightBringer, ChronoMaster],
            ),
            ClassKind::LightPaladin => (
                ClassStats::new(1200.0, 150.0, 12.0, 70.0, 0.05, 0.08),
                TimelineAffinity::new(Timeline::BrightWorld, 1.3, 1.2, 1.4),
                vec![LightBringer, TimelineWeaver],
            ),
            ClassKind::VoidMage => (
                ClassStats::new(700.0, 200.0, 8.0, 80.0, 0.08, 0.05),
                TimelineAffinity::new(Timeline::DarkWorld, 1.5, 1.4, 0.7),
                vec![VoidWalker, ChronoMaster],
            ),
            ClassKind::TimeWarrior => (
                ClassStats::new(1000.0, 180.0, 15.0, 75.0, 0.10, 0.08),
                TimelineAffinity::new(Timeline::Any, 1.4, 1.3, 1.2),
                vec![ChronoMaster, TimelineWeaver],
            ),
            ClassKind::TimelineAssassin => (
                ClassStats::new(800.0, 150.0, 15.0, 60.0, 0.15, 0.10),
                TimelineAffinity::new(Timeline::DarkWorld, 1.2, 1.3, 0.8),
                vec![VoidWalker, TimelineWeaver],
            ),
        };

        Self {
            kind,
            stats,
            affinity,
            specializations,
        }
    }
}

/// Stored progression of a character.
///
/// Only inputs are stored (template stats, level, chosen specialization).
/// Every derived value is recomputed on request, so a bonus can never be
/// applied twice.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterSheet {
    base_stats: ClassStats,
    base_affinity: TimelineAffinity,
    level: u32,
    specialization: Specialization,
    available: Vec<Specialization>,
}

impl CharacterSheet {
    pub fn from_template(template: &ClassTemplate) -> Self {
        Self {
            base_stats: template.stats,
            base_affinity: template.affinity,
            level: 1,
            specialization: Specialization::None,
            available: template.specializations.clone(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn specialization(&self) -> Specialization {
        self.specialization
    }

    pub fn available_specializations(&self) -> &[Specialization] {
        &self.available
    }

    pub fn base_stats(&self) -> &ClassStats {
        &self.base_stats
    }

    /// Level growth and specialization bonuses, without timeline effects.
    pub fn stats(&self) -> ClassStats {
        self.base_stats
            .at_level(self.level)
            .scaled(&self.specialization.table().bonuses)
            .clamped()
    }

    /// Affinity with specialization bonuses applied.
    pub fn affinity(&self) -> TimelineAffinity {
        self.base_affinity
            .scaled(&self.specialization.table().bonuses)
            .clamped()
    }

    /// Modifier pipeline for this sheet as seen from `context`.
    pub fn pipeline(&self, context: TimelineContext) -> ModifierPipeline<'static> {
        ModifierPipeline::new(self.affinity(), self.specialization, context)
    }

    /// Stats including current-timeline effects.
    pub fn effective_stats(&self, context: TimelineContext) -> ClassStats {
        let synergy = self.pipeline(context).synergy();
        self.stats()
            .with_timeline_effects(context.current(), synergy)
            .clamped()
    }

    pub fn level_up(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.level
    }

    /// Switches to `specialization` if this class offers it.
    pub fn unlock_specialization(&mut self, specialization: Specialization) -> bool {
        if !self.available.contains(&specialization) {
            return false;
        }
        self.specialization = specialization;
        true
    }

    /// Clamps persisted values back into range. Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        let before = self.clone();
        self.base_stats = self.base_stats.clamped();
        self.base_affinity = self.base_affinity.clamped();
        self.level = self.level.max(1);
        if self.specialization != Specialization::None
            && !self.available.contains(&self.specialization)
        {
            self.specialization = Specialization::None;
        }
        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx;

    #[test]
    fn specialization_requires_availability() {
        let mut sheet = CharacterSheet::from_template(&ClassTemplate::builtin(ClassKind::VoidMage));
        assert!(!sheet.unlock_specialization(Specialization::LightBringer));
        assert_eq!(sheet.specialization(), Specialization::None);
        assert!(sheet.unlock_specialization(Specialization::VoidWalker));
        assert_eq!(sheet.specialization(), Specialization::VoidWalker);
    }

    #[test]
    fn specialization_bonus_applies_once() {
        let mut sheet =
            CharacterSheet::from_template(&ClassTemplate::builtin(ClassKind::LightPaladin));
        sheet.unlock_specialization(Specialization::LightBringer);
        let first = sheet.stats();
        sheet.unlock_specialization(Specialization::LightBringer);
        sheet.level_up();
        sheet.unlock_specialization(Specialization::LightBringer);
        assert_approx!(first.health, 1200.0 * 1.3, 1e-2);
        assert_approx!(sheet.stats().health, 1200.0 * 1.1 * 1.3, 1e-2);
    }

    #[test]
    fn weaver_raises_affinity_multipliers() {
        let mut sheet = CharacterSheet::from_template(&ClassTemplate::builtin(ClassKind::Adventurer));
        sheet.unlock_specialization(Specialization::TimelineWeaver);
        let affinity = sheet.affinity();
        assert_approx!(affinity.energy_efficiency, 1.5);
        assert_approx!(affinity.damage_bonus, 1.3);
        assert_approx!(affinity.resistance, 1.0);
    }

    #[test]
    fn effective_stats_follow_current_timeline() {
        let sheet = CharacterSheet::from_template(&ClassTemplate::builtin(ClassKind::VoidMage));
        let dark = sheet.effective_stats(TimelineContext::bound(Timeline::DarkWorld));
        // preferred timeline gives 0.3 synergy
        assert_approx!(dark.timeline_power, 80.0 * 1.3);
        assert_approx!(dark.critical_chance, 0.08 * 1.3);

        let unbound = sheet.effective_stats(TimelineContext::UNBOUND);
        assert_eq!(unbound, sheet.stats());
    }

    #[test]
    fn repair_resets_unknown_specialization() {
        let mut sheet = CharacterSheet::from_template(&ClassTemplate::builtin(ClassKind::VoidMage));
        sheet.specialization = Specialization::LightBringer;
        sheet.level = 0;
        assert!(sheet.repair());
        assert_eq!(sheet.specialization(), Specialization::None);
        assert_eq!(sheet.level(), 1);
    }
}
