//! Per-character damage, defense and energy math.
//!
//! [`ModifierPipeline`] turns a base number into a final one by building a
//! [`ModifierStack`] in fixed stages:
//!
//! 1. timeline term (synergy / opposition for damage, preferred-timeline
//!    resistance for defense)
//! 2. specialization term, read from the [`SpecializationTable`]
//! 3. class-kit terms, supplied by a [`ModifierContributor`]
//!
//! Every term is multiplicative. Terms that need the current timeline are
//! skipped when the character has no bound [`TimelineContext`].
mod stack;

pub use stack::{Modifier, ModifierSource, ModifierStack};

use crate::stats::{Specialization, SpecializationTable, TimelineAffinity};
use crate::timeline::{Timeline, TimelineContext};

/// Damage multiplier when the current and damage timelines are distinct
/// concrete timelines.
pub const OPPOSITION_PENALTY: f32 = 0.7;
/// Synergy gained while in the preferred timeline.
pub const PREFERRED_SYNERGY: f32 = 0.3;
/// Energy-efficiency multiplier while in the preferred timeline.
pub const PREFERRED_EFFICIENCY: f32 = 1.5;

/// Class-kit stage of the pipeline.
///
/// Kits push their own factors after the base stages have been applied.
pub trait ModifierContributor {
    fn contribute_damage(
        &self,
        _context: TimelineContext,
        _damage_timeline: Timeline,
        _stack: &mut ModifierStack,
    ) {
    }

    fn contribute_defense(
        &self,
        _context: TimelineContext,
        _attack_timeline: Timeline,
        _stack: &mut ModifierStack,
    ) {
    }
}

/// Pipeline bound to one character's affinity, specialization and timeline view.
#[derive(Clone, Copy)]
pub struct ModifierPipeline<'a> {
    affinity: TimelineAffinity,
    specialization: Specialization,
    context: TimelineContext,
    contributor: Option<&'a dyn ModifierContributor>,
}

impl<'a> ModifierPipeline<'a> {
    pub fn new(
        affinity: TimelineAffinity,
        specialization: Specialization,
        context: TimelineContext,
    ) -> Self {
        Self {
            affinity,
            specialization,
            context,
            contributor: None,
        }
    }

    /// Adds the class-kit stage.
    pub fn with_contributor(mut self, contributor: &'a dyn ModifierContributor) -> Self {
        self.contributor = Some(contributor);
        self
    }

    fn table(&self) -> &'static SpecializationTable {
        self.specialization.table()
    }

    fn in_preferred_timeline(&self) -> bool {
        self.context.is(self.affinity.preferred_timeline)
    }

    /// Additive synergy score, zero without a bound timeline.
    pub fn synergy(&self) -> f32 {
        let Some(current) = self.context.current() else {
            return 0.0;
        };
        let preferred = if current == self.affinity.preferred_timeline {
            PREFERRED_SYNERGY
        } else {
            0.0
        };
        preferred + self.table().synergy(current)
    }

    pub fn damage_stack(&self, damage_timeline: Timeline) -> ModifierStack {
        let mut stack = ModifierStack::new();
        if let Some(current) = self.context.current() {
            if current == damage_timeline {
                stack.push(ModifierSource::TimelineSynergy, self.affinity.damage_bonus);
            } else if current.opposes(damage_timeline) {
                stack.push(ModifierSource::TimelineOpposition, OPPOSITION_PENALTY);
            }
        }
        stack.push(
            ModifierSource::Specialization,
            self.table().damage_term(damage_timeline, self.synergy()),
        );
        if let Some(contributor) = self.contributor {
            contributor.contribute_damage(self.context, damage_timeline, &mut stack);
        }
        stack
    }

    pub fn defense_stack(&self, attack_timeline: Timeline) -> ModifierStack {
        let mut stack = ModifierStack::new();
        stack.push_if(
            self.in_preferred_timeline(),
            ModifierSource::PreferredResistance,
            self.affinity.resistance,
        );
        stack.push(
            ModifierSource::Specialization,
            self.table().defense_term(attack_timeline, self.synergy()),
        );
        if let Some(contributor) = self.contributor {
            contributor.contribute_defense(self.context, attack_timeline, &mut stack);
        }
        stack
    }

    pub fn modify_damage(&self, base: f32, damage_timeline: Timeline) -> f32 {
        self.damage_stack(damage_timeline).apply(base)
    }

    pub fn modify_defense(&self, base: f32, attack_timeline: Timeline) -> f32 {
        self.defense_stack(attack_timeline).apply(base)
    }

    /// Multiplier applied to ability energy costs.
    pub fn energy_modifier(&self) -> f32 {
        let mut stack = ModifierStack::new();
        stack.push(
            ModifierSource::AffinityEfficiency,
            self.affinity.energy_efficiency,
        );
        stack.push_if(
            self.in_preferred_timeline(),
            ModifierSource::PreferredEfficiency,
            PREFERRED_EFFICIENCY,
        );
        stack.push(
            ModifierSource::Specialization,
            self.table().energy_term(self.synergy()),
        );
        stack.product()
    }

    /// Whether an ability gated on `required` may be used now.
    ///
    /// Always false without a bound timeline.
    pub fn can_use_timeline_ability(&self, required: Timeline) -> bool {
        let Some(current) = self.context.current() else {
            return false;
        };
        self.table().unrestricted_abilities || required.accepts(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx;

    fn pipeline(
        affinity: TimelineAffinity,
        specialization: Specialization,
        current: Option<Timeline>,
    ) -> ModifierPipeline<'static> {
        let context = current.map_or(TimelineContext::UNBOUND, TimelineContext::bound);
        ModifierPipeline::new(affinity, specialization, context)
    }

    fn bonus(damage_bonus: f32) -> TimelineAffinity {
        TimelineAffinity {
            damage_bonus,
            ..TimelineAffinity::default()
        }
    }

    #[test]
    fn matching_timeline_applies_damage_bonus() {
        let p = pipeline(bonus(1.3), Specialization::None, Some(Timeline::DarkWorld));
        assert_approx!(p.modify_damage(100.0, Timeline::DarkWorld), 130.0);
    }

    #[test]
    fn opposing_timeline_applies_penalty() {
        let p = pipeline(bonus(1.3), Specialization::None, Some(Timeline::DarkWorld));
        assert_approx!(p.modify_damage(100.0, Timeline::BrightWorld), 70.0);
    }

    #[test]
    fn wildcard_on_either_side_is_neutral() {
        let p = pipeline(bonus(1.3), Specialization::None, Some(Timeline::DarkWorld));
        assert_approx!(p.modify_damage(100.0, Timeline::Any), 100.0);

        let p = pipeline(bonus(1.3), Specialization::None, Some(Timeline::Any));
        assert_approx!(p.modify_damage(100.0, Timeline::DarkWorld), 100.0);
    }

    #[test]
    fn void_walker_stacks_elemental_term() {
        let p = pipeline(bonus(1.3), Specialization::VoidWalker, Some(Timeline::DarkWorld));
        let stack = p.damage_stack(Timeline::DarkWorld);
        assert_approx!(stack.factor_of(ModifierSource::TimelineSynergy), 1.3);
        assert_approx!(stack.factor_of(ModifierSource::Specialization), 1.3);
        assert_approx!(stack.apply(100.0), 169.0, 1e-3);
    }

    #[test]
    fn chrono_master_damage_uses_synergy() {
        let affinity = TimelineAffinity {
            preferred_timeline: Timeline::DarkWorld,
            ..TimelineAffinity::default()
        };
        let p = pipeline(affinity, Specialization::ChronoMaster, Some(Timeline::DarkWorld));
        assert_approx!(p.synergy(), 0.6);
        // damage bonus 1.0, chrono 1.6
        assert_approx!(p.modify_damage(100.0, Timeline::DarkWorld), 160.0, 1e-3);
    }

    #[test]
    fn resistance_applies_only_in_preferred_timeline() {
        let affinity = TimelineAffinity::new(Timeline::BrightWorld, 1.0, 1.0, 1.4);
        let bright = pipeline(affinity, Specialization::None, Some(Timeline::BrightWorld));
        assert_approx!(bright.modify_defense(100.0, Timeline::DarkWorld), 140.0);

        let dark = pipeline(affinity, Specialization::None, Some(Timeline::DarkWorld));
        assert_approx!(dark.modify_defense(100.0, Timeline::BrightWorld), 100.0);
    }

    #[test]
    fn light_bringer_is_weak_to_darkness() {
        let p = pipeline(
            TimelineAffinity::default(),
            Specialization::LightBringer,
            Some(Timeline::BrightWorld),
        );
        assert_approx!(p.modify_defense(100.0, Timeline::DarkWorld), 80.0);
        assert_approx!(p.modify_defense(100.0, Timeline::BrightWorld), 100.0);
    }

    #[test]
    fn energy_modifier_stacks_preference_and_weaver() {
        let affinity = TimelineAffinity::new(Timeline::DarkWorld, 1.2, 1.0, 1.0);
        let p = pipeline(affinity, Specialization::TimelineWeaver, Some(Timeline::DarkWorld));
        assert_approx!(p.energy_modifier(), 1.2 * 1.5 * 1.3);

        let away = pipeline(affinity, Specialization::None, Some(Timeline::BrightWorld));
        assert_approx!(away.energy_modifier(), 1.2);
    }

    #[test]
    fn unbound_character_is_neutral() {
        let p = pipeline(bonus(1.3), Specialization::None, None);
        assert_eq!(p.modify_damage(100.0, Timeline::DarkWorld), 100.0);
        assert_eq!(p.modify_defense(100.0, Timeline::DarkWorld), 100.0);
        assert_eq!(p.synergy(), 0.0);
        assert!(!p.can_use_timeline_ability(Timeline::Any));
    }

    #[test]
    fn ability_gating_respects_specialization() {
        let plain = pipeline(
            TimelineAffinity::default(),
            Specialization::VoidWalker,
            Some(Timeline::BrightWorld),
        );
        assert!(!plain.can_use_timeline_ability(Timeline::DarkWorld));
        assert!(plain.can_use_timeline_ability(Timeline::Any));
        assert!(plain.can_use_timeline_ability(Timeline::BrightWorld));

        let weaver = pipeline(
            TimelineAffinity::default(),
            Specialization::TimelineWeaver,
            Some(Timeline::BrightWorld),
        );
        assert!(weaver.can_use_timeline_ability(Timeline::DarkWorld));

        // no bound timeline gates everything, unrestricted or not
        let unbound = pipeline(
            TimelineAffinity::default(),
            Specialization::TimelineWeaver,
            None,
        );
        assert!(!unbound.can_use_timeline_ability(Timeline::Any));
    }

    struct Doubler;

    impl ModifierContributor for Doubler {
        fn contribute_damage(&self, _: TimelineContext, _: Timeline, stack: &mut ModifierStack) {
            stack.push(ModifierSource::Stealth, 2.0);
        }
    }

    #[test]
    fn contributor_terms_come_after_base_terms() {
        let p = pipeline(bonus(1.3), Specialization::None, Some(Timeline::DarkWorld))
            .with_contributor(&Doubler);
        let stack = p.damage_stack(Timeline::DarkWorld);
        let sources: Vec<_> = stack.iter().map(|m| m.source).collect();
        assert_eq!(
            sources,
            vec![ModifierSource::TimelineSynergy, ModifierSource::Stealth]
        );
        assert_approx!(stack.apply(100.0), 260.0, 1e-3);
    }
}
