//! Class kits: per-class resources, timed effects and abilities.
//!
//! A kit never owns the character it belongs to. Commands and frame updates
//! receive a [`KitContext`] that borrows the rest of the character (sheet,
//! vitals, observers) together with the timeline view for this call.
mod light_paladin;
mod pool;
mod time_warrior;
mod timeline_assassin;
mod timer;
mod void_mage;

pub use light_paladin::{LightAbility, LightAbilityProfile, LightPaladin, LightPaladinConfig};
pub use pool::{PoolConfig, PoolRates, ThresholdEdge, ThresholdPool};
pub use time_warrior::{
    ComboProfile, MAX_COMBO_LENGTH, Stance, TimeWarrior, TimeWarriorConfig, WarriorCombo,
};
pub use timeline_assassin::{TimelineAssassin, TimelineAssassinConfig};
pub use timer::Countdown;
pub use void_mage::{VoidAbility, VoidAbilityProfile, VoidMage, VoidMageConfig};

use crate::character::{
    self, CharacterId, CharacterSheet, ClassEvent, ClassKind, ClassObserver, Vitals,
};
use crate::error::AbilityError;
use crate::modifier::{ModifierContributor, ModifierStack};
use crate::observer::ObserverList;
use crate::timeline::{Timeline, TimelineContext};

/// Borrowed view of a character handed to kit operations.
pub struct KitContext<'a> {
    id: CharacterId,
    timeline: TimelineContext,
    sheet: &'a CharacterSheet,
    vitals: &'a mut Vitals,
    observers: &'a ObserverList<dyn ClassObserver>,
}

impl<'a> KitContext<'a> {
    pub(crate) fn new(
        id: CharacterId,
        timeline: TimelineContext,
        sheet: &'a CharacterSheet,
        vitals: &'a mut Vitals,
        observers: &'a ObserverList<dyn ClassObserver>,
    ) -> Self {
        Self {
            id,
            timeline,
            sheet,
            vitals,
            observers,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn timeline(&self) -> TimelineContext {
        self.timeline
    }

    pub fn sheet(&self) -> &CharacterSheet {
        self.sheet
    }

    pub fn vitals(&self) -> &Vitals {
        self.vitals
    }

    pub fn vitals_mut(&mut self) -> &mut Vitals {
        self.vitals
    }

    /// Ability energy-cost multiplier for the current timeline.
    pub fn energy_modifier(&self) -> f32 {
        self.sheet.pipeline(self.timeline).energy_modifier()
    }

    /// Pays `cost` from the timeline-energy meter, or reports the shortfall.
    pub fn spend_energy(&mut self, cost: f32) -> Result<(), AbilityError> {
        let energy = &mut self.vitals.energy;
        if !energy.spend(cost) {
            return Err(AbilityError::energy(cost, energy.current()));
        }
        Ok(())
    }

    pub fn emit(&self, event: ClassEvent) {
        character::publish(self.observers, self.id, &event);
    }
}

/// The class-specific half of a character.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassKit {
    /// Base class without a kit.
    #[default]
    None,
    LightPaladin(LightPaladin),
    VoidMage(VoidMage),
    TimeWarrior(TimeWarrior),
    TimelineAssassin(TimelineAssassin),
}

impl ClassKit {
    /// Fresh kit with default tuning for `kind`.
    pub fn for_class(kind: ClassKind) -> Self {
        match kind {
            ClassKind::Adventurer => ClassKit::None,
            ClassKind::LightPaladin => ClassKit::LightPaladin(LightPaladin::default()),
            ClassKind::VoidMage => ClassKit::VoidMage(VoidMage::default()),
            ClassKind::TimeWarrior => ClassKit::TimeWarrior(TimeWarrior::default()),
            ClassKind::TimelineAssassin => ClassKit::TimelineAssassin(TimelineAssassin::default()),
        }
    }

    pub fn kind(&self) -> ClassKind {
        match self {
            ClassKit::None => ClassKind::Adventurer,
            ClassKit::LightPaladin(_) => ClassKind::LightPaladin,
            ClassKit::VoidMage(_) => ClassKind::VoidMage,
            ClassKit::TimeWarrior(_) => ClassKind::TimeWarrior,
            ClassKit::TimelineAssassin(_) => ClassKind::TimelineAssassin,
        }
    }

    pub fn movement_speed(&self) -> f32 {
        match self {
            ClassKit::TimeWarrior(kit) => kit.movement_speed(),
            ClassKit::TimelineAssassin(kit) => kit.movement_speed(),
            _ => 1.0,
        }
    }

    pub(crate) fn advance(&mut self, delta_time: f32, cx: &mut KitContext<'_>) {
        match self {
            ClassKit::None => {}
            ClassKit::LightPaladin(kit) => kit.advance(delta_time, cx),
            ClassKit::VoidMage(kit) => kit.advance(delta_time, cx),
            ClassKit::TimeWarrior(kit) => kit.advance(delta_time, cx),
            ClassKit::TimelineAssassin(kit) => kit.advance(delta_time, cx),
        }
    }

    pub(crate) fn on_timeline_changed(&mut self, new_state: Timeline, cx: &mut KitContext<'_>) {
        match self {
            ClassKit::LightPaladin(kit) => kit.on_timeline_changed(new_state, cx),
            ClassKit::VoidMage(kit) => kit.on_timeline_changed(new_state, cx),
            ClassKit::TimeWarrior(kit) => kit.on_timeline_changed(new_state, cx),
            ClassKit::None | ClassKit::TimelineAssassin(_) => {}
        }
    }

    /// Clamps persisted kit state back into range. Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        match self {
            ClassKit::None => false,
            ClassKit::LightPaladin(kit) => kit.repair(),
            ClassKit::VoidMage(kit) => kit.repair(),
            ClassKit::TimeWarrior(kit) => kit.repair(),
            ClassKit::TimelineAssassin(kit) => kit.repair(),
        }
    }

    pub fn as_light_paladin(&self) -> Option<&LightPaladin> {
        match self {
            ClassKit::LightPaladin(kit) => Some(kit),
            _ => None,
        }
    }

    pub fn as_void_mage(&self) -> Option<&VoidMage> {
        match self {
            ClassKit::VoidMage(kit) => Some(kit),
            _ => None,
        }
    }

    pub fn as_time_warrior(&self) -> Option<&TimeWarrior> {
        match self {
            ClassKit::TimeWarrior(kit) => Some(kit),
            _ => None,
        }
    }

    pub fn as_timeline_assassin(&self) -> Option<&TimelineAssassin> {
        match self {
            ClassKit::TimelineAssassin(kit) => Some(kit),
            _ => None,
        }
    }

    fn contributor(&self) -> Option<&dyn ModifierContributor> {
        match self {
            ClassKit::None => None,
            ClassKit::LightPaladin(kit) => Some(kit),
            ClassKit::VoidMage(kit) => Some(kit),
            ClassKit::TimeWarrior(kit) => Some(kit),
            ClassKit::TimelineAssassin(kit) => Some(kit),
        }
    }
}

impl ModifierContributor for ClassKit {
    fn contribute_damage(
        &self,
        context: TimelineContext,
        damage_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        if let Some(kit) = self.contributor() {
            kit.contribute_damage(context, damage_timeline, stack);
        }
    }

    fn contribute_defense(
        &self,
        context: TimelineContext,
        attack_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        if let Some(kit) = self.contributor() {
            kit.contribute_defense(context, attack_timeline, stack);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn kit_matches_class() {
        for kind in ClassKind::iter() {
            assert_eq!(ClassKit::for_class(kind).kind(), kind);
        }
    }

    #[test]
    fn base_class_contributes_nothing() {
        let mut stack = ModifierStack::new();
        ClassKit::None.contribute_damage(
            TimelineContext::bound(Timeline::DarkWorld),
            Timeline::DarkWorld,
            &mut stack,
        );
        assert!(stack.is_empty());
        assert_eq!(ClassKit::None.movement_speed(), 1.0);
    }
}
